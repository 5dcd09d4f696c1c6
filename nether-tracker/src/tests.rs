//! Tests for nether-tracker types

use crate::effects::TrackerEffect;
use crate::instrument::{TrackerEnvelope, TrackerInstrument};
use crate::pattern::{NoteValue, TrackerNote, TrackerPattern};
use crate::registry::{FormatError, FormatLoader, FormatRegistry};
use crate::sample::{SampleData, SampleLoop, TrackerSample};
use crate::{FormatHints, LoadWarning, SourceFormat, TrackerModule};

/// Loader that recognizes a fixed prefix with a fixed score
struct PrefixLoader {
    name: &'static str,
    prefix: &'static [u8],
    score: u32,
}

impl FormatLoader for PrefixLoader {
    fn name(&self) -> &'static str {
        self.name
    }

    fn identify(&self, data: &[u8]) -> u32 {
        if data.starts_with(self.prefix) {
            self.score
        } else {
            0
        }
    }

    fn load(&self, _data: &[u8]) -> Result<TrackerModule, FormatError> {
        Ok(TrackerModule::new(self.name, 4, FormatHints::new(SourceFormat::Mod)))
    }
}

fn single_pattern_module() -> TrackerModule {
    let mut module = TrackerModule::new("test", 2, FormatHints::new(SourceFormat::Mod));
    module.patterns.push(TrackerPattern::empty(4, 2));
    module.order_table = vec![0];
    module
}

#[test]
fn test_tracker_note_methods() {
    let note = TrackerNote {
        note: Some(NoteValue::Note(12)),
        period: Some(428),
        instrument: Some(1),
        effect: TrackerEffect::SetVolume(32),
        raw_effect: Some((0xC, 0x20)),
        ..Default::default()
    };
    assert!(note.has_period());
    assert!(note.has_instrument());
    assert!(note.has_effect());
    assert!(!note.is_empty());

    assert!(TrackerNote::default().is_empty());
    assert!(!TrackerNote::with_effect(TrackerEffect::NoteCut(2)).has_period());
}

#[test]
fn test_envelope_interpolation() {
    let env = TrackerEnvelope {
        points: vec![(0, 64), (10, 32), (20, 0)],
        ..Default::default()
    };

    assert_eq!(env.value_at(0), 64);
    assert_eq!(env.value_at(5), 48);
    assert_eq!(env.value_at(10), 32);
    assert_eq!(env.value_at(15), 16);
    assert_eq!(env.value_at(20), 0);
    assert_eq!(env.value_at(30), 0); // Past end
}

#[test]
fn test_pattern_empty() {
    let pattern = TrackerPattern::empty(64, 8);
    assert_eq!(pattern.num_rows, 64);
    assert_eq!(pattern.notes.len(), 64);
    assert_eq!(pattern.notes[0].len(), 8);
    assert!(pattern.get_note(63, 7).is_some());
    assert!(pattern.get_note(64, 0).is_none());
}

#[test]
fn test_instrument_from_sample() {
    let sample = TrackerSample {
        name: "bass".to_string(),
        volume: 40,
        data: SampleData::I8(vec![0; 16]),
        ..Default::default()
    };
    let instr = TrackerInstrument::from_sample(sample);
    assert_eq!(instr.name, "bass");
    assert_eq!(instr.default_volume(), 40);
    assert_eq!(instr.sample_for_note(60), Some(0));
    assert_eq!(instr.sample_for_note(200), None);

    assert_eq!(TrackerInstrument::default().default_volume(), 64);
}

#[test]
fn test_loop_clamping() {
    let inside = SampleLoop::forward(10, 20);
    assert_eq!(inside.clamped_to(30), None);

    let overlong = SampleLoop::forward(10, 40);
    assert_eq!(overlong.clamped_to(30), Some(SampleLoop::forward(10, 20)));

    let past_end = SampleLoop::forward(50, 10);
    assert_eq!(past_end.clamped_to(30), Some(SampleLoop::forward(30, 0)));
}

#[test]
fn test_load_warning_display() {
    let warning = LoadWarning::LoopExceedsSampleLength {
        sample_index: 2,
        original_start: 100,
        original_length: 400,
        clamped_start: 100,
        clamped_length: 156,
    };
    assert_eq!(
        warning.to_string(),
        "Sample 3: loop 100..+400 exceeds sample length, clamped to 100..+156"
    );
}

#[test]
fn test_module_lookup_helpers() {
    let mut module = single_pattern_module();
    module.default_panning = vec![64];
    module
        .instruments
        .push(TrackerInstrument::from_sample(TrackerSample::default()));

    assert!(module.pattern_at_order(0).is_some());
    assert!(module.pattern_at_order(1).is_none());
    assert_eq!(module.channel_panning(0), 64);
    assert_eq!(module.channel_panning(1), crate::PAN_CENTER);
    assert!(module.instrument(0).is_none());
    assert!(module.instrument(1).is_some());
    assert!(module.instrument(2).is_none());
}

#[test]
fn test_module_validate() {
    let module = single_pattern_module();
    assert!(module.validate().is_ok());

    let mut bad_order = single_pattern_module();
    bad_order.order_table.push(3);
    assert!(matches!(
        bad_order.validate(),
        Err(FormatError::InvalidData(_))
    ));

    let mut bad_row = single_pattern_module();
    bad_row.patterns[0].notes[1].pop();
    assert!(bad_row.validate().is_err());
}

#[test]
fn test_registry_picks_highest_score() {
    let registry = FormatRegistry::new()
        .with(PrefixLoader {
            name: "low",
            prefix: b"AB",
            score: 10,
        })
        .with(PrefixLoader {
            name: "high",
            prefix: b"ABC",
            score: 90,
        });

    assert_eq!(registry.len(), 2);
    let module = registry.load(b"ABCD").unwrap();
    assert_eq!(module.title, "high");

    let module = registry.load(b"ABXX").unwrap();
    assert_eq!(module.title, "low");
}

#[test]
fn test_registry_unrecognized() {
    let registry = FormatRegistry::new().with(PrefixLoader {
        name: "only",
        prefix: b"ZZ",
        score: 100,
    });
    assert_eq!(
        registry.load(b"nope").unwrap_err(),
        FormatError::UnrecognizedFormat
    );
    assert!(
        FormatRegistry::new().load(b"anything").is_err(),
        "an empty registry recognizes nothing"
    );
}

#[test]
fn test_format_error_display() {
    assert_eq!(
        FormatError::UnrecognizedFormat.to_string(),
        "unrecognized module format"
    );
    assert_eq!(
        FormatError::InvalidData("bad".into()).to_string(),
        "invalid module data: bad"
    );
    assert_eq!(FormatError::TruncatedFile.to_string(), "file is truncated");
}
