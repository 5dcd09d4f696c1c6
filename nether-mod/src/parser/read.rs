//! MOD file parsing

use nether_tracker::{
    FormatError, FormatHints, FrequencyModel, LoadWarning, SampleData, SampleLoop, SourceFormat,
    TrackerEffect, TrackerInstrument, TrackerModule, TrackerNote, TrackerPattern, TrackerSample,
    finetune_to_signed, period_to_note,
};
use tracing::{debug, warn};

use crate::cursor::BinaryReader;
use crate::effects::{self, extended};
use crate::signature::{channels_for_signature, signature_of};
use crate::{
    AMIGA_PANNING, CELL_SIZE, MIN_LOOP_LENGTH, MOD_HEADER_SIZE, NUM_SAMPLES, ORDER_TABLE_SIZE,
    ROWS_PER_PATTERN, SAMPLE_NAME_LENGTH, TITLE_LENGTH,
};

/// Sample header as stored in the file, lengths already in bytes
#[derive(Debug, Clone)]
struct SampleHeader {
    name: String,
    length: u32,
    finetune: u8,
    volume: u8,
    loop_start: u32,
    loop_length: u32,
}

/// Parse a MOD file into a TrackerModule
///
/// Header-region problems fail before anything is built. Short pattern or
/// sample data is tolerated: missing cells are empty and missing PCM is
/// dropped. Loops running past the loaded PCM are clamped and reported in
/// `TrackerModule::warnings`.
///
/// # Example
/// ```ignore
/// let data = std::fs::read("song.mod")?;
/// let module = parse_mod(&data)?;
/// println!("Loaded: {} ({} channels)", module.title, module.num_channels);
/// ```
pub fn parse_mod(data: &[u8]) -> Result<TrackerModule, FormatError> {
    if data.len() < MOD_HEADER_SIZE {
        return Err(FormatError::TruncatedFile);
    }
    let signature = signature_of(data).ok_or(FormatError::TruncatedFile)?;
    let num_channels = channels_for_signature(&signature).ok_or(FormatError::UnrecognizedFormat)?;

    let mut reader = BinaryReader::new(data);

    let title = reader.read_string(TITLE_LENGTH)?;

    let mut headers = Vec::with_capacity(NUM_SAMPLES);
    for _ in 0..NUM_SAMPLES {
        headers.push(read_sample_header(&mut reader)?);
    }

    let song_length = reader.read_u8()?;
    let restart_position = reader.read_u8()?;
    let mut order_table = reader.read_bytes(ORDER_TABLE_SIZE)?.to_vec();
    order_table.truncate((song_length as usize).min(ORDER_TABLE_SIZE));

    // Signature, already decoded
    reader.skip(4);

    let num_patterns = order_table.iter().copied().max().map_or(1, |max| max as usize + 1);
    let mut patterns = Vec::with_capacity(num_patterns);
    for pattern_idx in 0..num_patterns {
        patterns.push(read_pattern(&mut reader, pattern_idx, num_channels));
    }

    let mut warnings = Vec::new();
    let mut instruments = Vec::with_capacity(NUM_SAMPLES);
    for (sample_index, header) in headers.into_iter().enumerate() {
        let sample = read_sample(&mut reader, sample_index, header, &mut warnings)?;
        instruments.push(TrackerInstrument::from_sample(sample));
    }

    let mut module = TrackerModule::new(
        title,
        num_channels,
        FormatHints {
            source_format: SourceFormat::Mod,
            frequency_model: FrequencyModel::AmigaPeriods,
            amiga_limits: true,
            zero_volume_optimization: false,
        },
    );
    module.format_description = format!(
        "ProTracker MOD ({})",
        String::from_utf8_lossy(&signature)
    );
    module.order_table = order_table;
    module.restart_position = restart_position;
    module.patterns = patterns;
    module.instruments = instruments;
    module.default_panning = (0..num_channels as usize)
        .map(|ch| AMIGA_PANNING[ch % AMIGA_PANNING.len()])
        .collect();
    module.warnings = warnings;

    debug!(
        title = %module.title,
        channels = num_channels,
        patterns = module.patterns.len(),
        orders = module.order_table.len(),
        warnings = module.warnings.len(),
        "Loaded MOD"
    );

    Ok(module)
}

fn read_sample_header(reader: &mut BinaryReader<'_>) -> Result<SampleHeader, FormatError> {
    let name = reader.read_string(SAMPLE_NAME_LENGTH)?;
    let length = reader.read_u16_be()? as u32 * 2;
    let finetune = reader.read_u8()? & 0x0F;
    let volume = reader.read_u8()?.min(64);
    let loop_start = reader.read_u16_be()? as u32 * 2;
    let loop_length = reader.read_u16_be()? as u32 * 2;

    Ok(SampleHeader {
        name,
        length,
        finetune,
        volume,
        loop_start,
        loop_length,
    })
}

/// Read one 64-row pattern. Cells past the end of the data stay empty.
fn read_pattern(
    reader: &mut BinaryReader<'_>,
    pattern_idx: usize,
    num_channels: u8,
) -> TrackerPattern {
    let mut pattern = TrackerPattern::empty(ROWS_PER_PATTERN, num_channels);

    for row in pattern.notes.iter_mut() {
        for note in row.iter_mut() {
            match reader.read_array::<CELL_SIZE>() {
                Ok(cell) => *note = decode_note(cell),
                Err(_) => {
                    warn!(pattern = pattern_idx, "Pattern data truncated, padding with empty rows");
                    let rest = reader.remaining();
                    reader.skip(rest);
                    return pattern;
                }
            }
        }
    }

    pattern
}

fn read_sample(
    reader: &mut BinaryReader<'_>,
    sample_index: usize,
    header: SampleHeader,
    warnings: &mut Vec<LoadWarning>,
) -> Result<TrackerSample, FormatError> {
    let available = (header.length as usize).min(reader.remaining());
    let pcm = reader.read_i8_vec(available)?;
    let frames = pcm.len() as u32;

    let mut sample_loop = (header.loop_length > MIN_LOOP_LENGTH)
        .then(|| SampleLoop::forward(header.loop_start, header.loop_length));

    let clamped = sample_loop.and_then(|original| Some((original, original.clamped_to(frames)?)));
    if let Some((original, clamped)) = clamped {
        let warning = LoadWarning::LoopExceedsSampleLength {
            sample_index,
            original_start: original.start,
            original_length: original.length,
            clamped_start: clamped.start,
            clamped_length: clamped.length,
        };
        warn!("{warning}");
        warnings.push(warning);
        sample_loop = (clamped.length > 0).then_some(clamped);
    }

    Ok(TrackerSample {
        name: header.name,
        data: SampleData::I8(pcm),
        volume: header.volume,
        sample_loop,
        finetune: finetune_to_signed(header.finetune),
        ..Default::default()
    })
}

/// Decode a 4-byte pattern cell
pub fn decode_note(cell: [u8; CELL_SIZE]) -> TrackerNote {
    let [b0, b1, b2, b3] = cell;

    let instrument = (b0 & 0xF0) | (b2 >> 4);
    let period = ((b0 as u16 & 0x0F) << 8) | b1 as u16;
    let command = b2 & 0x0F;
    let param = b3;

    TrackerNote {
        note: period_to_note(period, 0),
        period: (period > 0).then_some(period),
        instrument: (instrument > 0).then_some(instrument),
        volume: None,
        volume_effect: None,
        effect: decode_effect(command, param),
        raw_effect: (command != 0 || param != 0).then_some((command, param)),
    }
}

/// Decode a main effect command (0x0-0xF) and its parameter
pub fn decode_effect(command: u8, param: u8) -> TrackerEffect {
    let x = param >> 4;
    let y = param & 0x0F;

    match command {
        effects::ARPEGGIO if param != 0 => TrackerEffect::Arpeggio { note1: x, note2: y },
        effects::ARPEGGIO => TrackerEffect::None,
        effects::PORTA_UP => TrackerEffect::PortamentoUp(param),
        effects::PORTA_DOWN => TrackerEffect::PortamentoDown(param),
        effects::TONE_PORTA => TrackerEffect::TonePortamento(param),
        effects::VIBRATO => TrackerEffect::Vibrato { speed: x, depth: y },
        effects::TONE_PORTA_VOL_SLIDE => TrackerEffect::TonePortaVolSlide {
            vol_up: x,
            vol_down: y,
        },
        effects::VIBRATO_VOL_SLIDE => TrackerEffect::VibratoVolSlide {
            vol_up: x,
            vol_down: y,
        },
        effects::TREMOLO => TrackerEffect::Tremolo { speed: x, depth: y },
        effects::SET_PANNING => TrackerEffect::SetPanning(param),
        effects::SAMPLE_OFFSET => TrackerEffect::SampleOffset(param),
        effects::VOLUME_SLIDE => TrackerEffect::VolumeSlide { up: x, down: y },
        effects::POSITION_JUMP => TrackerEffect::PositionJump(param),
        effects::SET_VOLUME => TrackerEffect::SetVolume(param),
        // Row number is stored as two decimal digits
        effects::PATTERN_BREAK => TrackerEffect::PatternBreak(x * 10 + y),
        effects::EXTENDED => decode_extended(x, y),
        effects::SET_SPEED_TEMPO => match param {
            0 => TrackerEffect::None,
            p if p <= effects::SPEED_TEMPO_SPLIT => TrackerEffect::SetSpeed(p),
            p => TrackerEffect::SetTempo(p),
        },
        _ => TrackerEffect::None,
    }
}

fn decode_extended(sub: u8, value: u8) -> TrackerEffect {
    match sub {
        extended::FILTER => TrackerEffect::SetFilter(value == 0),
        extended::FINE_PORTA_UP => TrackerEffect::FinePortaUp(value),
        extended::FINE_PORTA_DOWN => TrackerEffect::FinePortaDown(value),
        extended::GLISSANDO => TrackerEffect::SetGlissando(value != 0),
        extended::VIBRATO_WAVEFORM => TrackerEffect::VibratoWaveform(value),
        extended::SET_FINETUNE => TrackerEffect::SetFinetune(value),
        extended::PATTERN_LOOP => TrackerEffect::PatternLoop(value),
        extended::TREMOLO_WAVEFORM => TrackerEffect::TremoloWaveform(value),
        extended::RETRIGGER => TrackerEffect::Retrigger(value),
        extended::FINE_VOLUME_UP => TrackerEffect::FineVolumeUp(value),
        extended::FINE_VOLUME_DOWN => TrackerEffect::FineVolumeDown(value),
        extended::NOTE_CUT => TrackerEffect::NoteCut(value),
        extended::NOTE_DELAY => TrackerEffect::NoteDelay(value),
        extended::PATTERN_DELAY => TrackerEffect::PatternDelay(value),
        _ => TrackerEffect::None,
    }
}
