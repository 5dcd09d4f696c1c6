//! Effect processing at tick 0 (row start)

use nether_tracker::TrackerEffect;

use super::Sequencer;
use crate::channels::ChannelState;
use crate::utils::clamp_volume;

impl Sequencer {
    /// Apply the tick-0 part of `effect` on channel `ch`.
    ///
    /// Flow control is only recorded here and resolved once the whole row
    /// has been processed.
    pub(crate) fn apply_row_effect(&mut self, ch: usize, effect: TrackerEffect) {
        match effect {
            TrackerEffect::SetSpeed(speed) => {
                self.speed = speed.max(1) as u16;
            }
            TrackerEffect::SetTempo(tempo) => {
                self.set_tempo(tempo as u16);
            }
            TrackerEffect::PositionJump(order) => {
                self.pending_jump = Some(order);
            }
            TrackerEffect::PatternBreak(row) => {
                self.pending_break = Some(row);
            }
            TrackerEffect::PatternDelay(rows) => {
                if self.pattern_delay == 0 && !self.repeating_row {
                    self.pattern_delay = rows;
                }
            }
            TrackerEffect::PatternLoop(count) => {
                if !self.repeating_row {
                    self.pattern_loop(ch, count);
                }
            }
            other => apply_channel_effect(&mut self.channels[ch], other),
        }
    }

    fn pattern_loop(&mut self, ch: usize, count: u8) {
        let row = self.row;
        let channel = &mut self.channels[ch];
        if count == 0 {
            channel.pattern_loop_row = row;
            return;
        }

        if channel.pattern_loop_count == 0 {
            channel.pattern_loop_count = count;
            self.pending_loop_row = Some(channel.pattern_loop_row);
        } else {
            channel.pattern_loop_count -= 1;
            if channel.pattern_loop_count > 0 {
                self.pending_loop_row = Some(channel.pattern_loop_row);
            }
        }
    }
}

/// Tick-0 effects that only touch one channel's registers
fn apply_channel_effect(channel: &mut ChannelState, effect: TrackerEffect) {
    match effect {
        // Volume
        TrackerEffect::SetVolume(volume) => {
            channel.volume = clamp_volume(volume as i32);
        }
        TrackerEffect::VolumeSlide { up, down } => {
            channel.remember_volume_slide(up, down);
        }
        TrackerEffect::FineVolumeUp(amount) => {
            channel.volume = clamp_volume(channel.volume + amount as i32);
        }
        TrackerEffect::FineVolumeDown(amount) => {
            channel.volume = clamp_volume(channel.volume - amount as i32);
        }

        // Pitch
        TrackerEffect::PortamentoUp(speed) => {
            if speed != 0 {
                channel.slide_up_speed = speed as i32;
            }
        }
        TrackerEffect::PortamentoDown(speed) => {
            if speed != 0 {
                channel.slide_down_speed = speed as i32;
            }
        }
        TrackerEffect::FinePortaUp(amount) => {
            if amount > 0 {
                channel.slide_period_up(amount as i32);
            }
        }
        TrackerEffect::FinePortaDown(amount) => {
            if amount > 0 {
                channel.slide_period_down(amount as i32);
            }
        }
        TrackerEffect::TonePortamento(speed) => {
            if speed != 0 {
                channel.porta_speed = speed as i32;
            }
        }
        TrackerEffect::TonePortaVolSlide { vol_up, vol_down }
        | TrackerEffect::VibratoVolSlide { vol_up, vol_down } => {
            channel.remember_volume_slide(vol_up, vol_down);
        }

        // Modulation
        TrackerEffect::Vibrato { speed, depth } => {
            channel.vibrato.remember(speed, depth);
        }
        TrackerEffect::Tremolo { speed, depth } => {
            channel.tremolo.remember(speed, depth);
        }
        TrackerEffect::VibratoWaveform(param) => {
            channel.vibrato.set_waveform(param);
        }
        TrackerEffect::TremoloWaveform(param) => {
            channel.tremolo.set_waveform(param);
        }
        TrackerEffect::Arpeggio { note1, note2 } => {
            channel.arpeggio_x = note1;
            channel.arpeggio_y = note2;
            channel.arpeggio_base = channel.period;
        }

        // Panning and sample
        TrackerEffect::SetPanning(pan) => {
            channel.panning = pan;
        }
        TrackerEffect::SampleOffset(offset) => {
            if offset != 0 {
                channel.sample_offset_memory = offset as u32 * 256;
            }
            channel.position = channel.sample_offset_memory as f64;
        }
        TrackerEffect::Retrigger(interval) => {
            if interval != 0 {
                channel.retrigger_interval = interval;
            }
        }

        // Tick-N only, or accepted without effect on playback
        TrackerEffect::None
        | TrackerEffect::NoteCut(_)
        | TrackerEffect::NoteDelay(_)
        | TrackerEffect::SetFinetune(_)
        | TrackerEffect::SetFilter(_)
        | TrackerEffect::SetGlissando(_) => {}

        // Handled by the sequencer
        TrackerEffect::SetSpeed(_)
        | TrackerEffect::SetTempo(_)
        | TrackerEffect::PositionJump(_)
        | TrackerEffect::PatternBreak(_)
        | TrackerEffect::PatternDelay(_)
        | TrackerEffect::PatternLoop(_) => {}
    }
}
