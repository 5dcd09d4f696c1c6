//! Per-tick effect processing (every tick except tick 0)

use nether_tracker::TrackerEffect;

use super::Sequencer;
use crate::utils::period_for_semitone_offset;

impl Sequencer {
    /// Continue `effect` on channel `ch` at `tick` (1..speed)
    pub(crate) fn tick_effect(&mut self, ch: usize, effect: TrackerEffect, tick: u16) {
        let channel = &mut self.channels[ch];

        match effect {
            TrackerEffect::PortamentoUp(_) => {
                channel.slide_period_up(channel.slide_up_speed);
            }
            TrackerEffect::PortamentoDown(_) => {
                channel.slide_period_down(channel.slide_down_speed);
            }
            TrackerEffect::TonePortamento(_) => {
                channel.tone_portamento();
            }
            TrackerEffect::TonePortaVolSlide { .. } => {
                channel.tone_portamento();
                channel.slide_volume();
            }

            TrackerEffect::Vibrato { .. } => {
                channel.vibrato.step(&mut self.rng);
            }
            TrackerEffect::VibratoVolSlide { .. } => {
                channel.vibrato.step(&mut self.rng);
                channel.slide_volume();
            }
            TrackerEffect::Tremolo { .. } => {
                channel.tremolo.step(&mut self.rng);
            }

            TrackerEffect::VolumeSlide { .. } => {
                channel.slide_volume();
            }

            TrackerEffect::Arpeggio { .. } => {
                let base = channel.arpeggio_base;
                if base > 0 {
                    channel.period = match tick % 3 {
                        0 => base,
                        1 => period_for_semitone_offset(base, channel.arpeggio_x),
                        _ => period_for_semitone_offset(base, channel.arpeggio_y),
                    };
                }
            }

            TrackerEffect::NoteCut(cut_tick) => {
                if tick == cut_tick as u16 {
                    channel.volume = 0;
                }
            }
            TrackerEffect::NoteDelay(delay_tick) => {
                if tick == delay_tick as u16 {
                    self.trigger_delayed_note(ch);
                }
            }
            TrackerEffect::Retrigger(_) => {
                let interval = channel.retrigger_interval as u16;
                if interval > 0 && tick % interval == 0 {
                    channel.position = 0.0;
                }
            }

            _ => {}
        }
    }

    /// Play the instrument and period held back by a note delay
    fn trigger_delayed_note(&mut self, ch: usize) {
        let instrument = self.channels[ch].delayed_instrument.take();
        if let Some((index, volume)) = instrument.and_then(|n| self.instrument_volume(n)) {
            self.channels[ch].select_instrument(index, volume);
        }

        let channel = &mut self.channels[ch];
        if let Some(period) = channel.delayed_period.take().filter(|&p| p > 0) {
            channel.trigger(period as i32);
            channel.arpeggio_base = period as i32;
        }
    }
}
