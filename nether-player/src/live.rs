//! Live sequencer
//!
//! Plays notes entered at runtime instead of pattern data. There is no song
//! position: every channel counts its own ticks and rows from the moment its
//! note was triggered, and re-applies its effect at each of its own row
//! boundaries without retriggering the note.
//!
//! Control threads queue events through a [`LiveInput`]; the audio thread
//! drains the queue once per tick.

use std::mem;
use std::sync::{Arc, Mutex, MutexGuard};

use nether_tracker::{TrackerEffect, TrackerModule, TrackerNote};
use smallvec::SmallVec;

use crate::channels::ChannelState;
use crate::render::TickSource;
use crate::sequencer::Sequencer;

/// Start a note on a channel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoteEvent {
    pub channel: usize,
    pub period: u16,
    /// 1-based instrument number
    pub instrument: u8,
    pub effect: TrackerEffect,
}

impl NoteEvent {
    pub fn new(channel: usize, period: u16, instrument: u8) -> Self {
        Self {
            channel,
            period,
            instrument,
            effect: TrackerEffect::None,
        }
    }

    pub fn with_effect(mut self, effect: TrackerEffect) -> Self {
        self.effect = effect;
        self
    }
}

/// Stop the note on a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReleaseEvent {
    pub channel: usize,
}

#[derive(Debug, Default)]
struct PendingEvents {
    notes: SmallVec<[NoteEvent; 8]>,
    releases: SmallVec<[ReleaseEvent; 8]>,
}

/// Cloneable handle for queueing live events from any thread
#[derive(Debug, Clone, Default)]
pub struct LiveInput {
    pending: Arc<Mutex<PendingEvents>>,
}

impl LiveInput {
    /// Queue a note for the next tick
    pub fn trigger_note(&self, event: NoteEvent) {
        self.lock().notes.push(event);
    }

    /// Queue a release for the next tick
    pub fn release_note(&self, event: ReleaseEvent) {
        self.lock().releases.push(event);
    }

    fn lock(&self) -> MutexGuard<'_, PendingEvents> {
        self.pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn drain(&self) -> PendingEvents {
        mem::take(&mut *self.lock())
    }
}

/// Free-running sequencer driven by [`NoteEvent`]s
#[derive(Debug)]
pub struct LiveSequencer {
    sequencer: Sequencer,
    input: LiveInput,
}

impl LiveSequencer {
    /// Create a live sequencer with every channel silent
    pub fn new(module: Arc<TrackerModule>, sample_rate: u32) -> Self {
        let mut sequencer = Sequencer::new(module, sample_rate);
        for channel in &mut sequencer.channels {
            channel.silence();
        }
        sequencer.tick = 0;

        Self {
            sequencer,
            input: LiveInput::default(),
        }
    }

    /// Handle for queueing events, cheap to clone and send to other threads
    pub fn input(&self) -> LiveInput {
        self.input.clone()
    }

    pub fn trigger_note(&self, event: NoteEvent) {
        self.input.trigger_note(event);
    }

    pub fn release_note(&self, event: ReleaseEvent) {
        self.input.release_note(event);
    }

    pub fn set_tempo(&mut self, tempo: u16) {
        self.sequencer.set_tempo(tempo);
    }

    /// Ticks per channel row
    pub fn set_speed(&mut self, speed: u16) {
        self.sequencer.speed = speed.max(1);
    }

    pub fn speed(&self) -> u16 {
        self.sequencer.speed()
    }

    pub fn tempo(&self) -> u16 {
        self.sequencer.tempo()
    }

    pub fn samples_per_tick(&self) -> u32 {
        self.sequencer.samples_per_tick()
    }

    pub fn channels(&self) -> &[ChannelState] {
        self.sequencer.channels()
    }

    pub fn module(&self) -> &Arc<TrackerModule> {
        self.sequencer.module()
    }

    /// Apply queued events, then advance every sounding channel one tick
    pub fn advance_tick(&mut self) {
        let PendingEvents { notes, releases } = self.input.drain();
        let seq = &mut self.sequencer;

        for release in releases {
            if let Some(channel) = seq.channels.get_mut(release.channel) {
                channel.playing = false;
                channel.current_effect = TrackerEffect::None;
                channel.channel_tick = 0;
            }
        }

        // A new note is tick 0 of that channel's first row
        for event in notes {
            let ch = event.channel;
            if ch >= seq.channels.len() {
                continue;
            }
            let note = TrackerNote {
                period: Some(event.period),
                instrument: Some(event.instrument),
                effect: event.effect,
                ..Default::default()
            };
            seq.channels[ch].begin_row();
            seq.process_note(ch, &note);

            let channel = &mut seq.channels[ch];
            channel.current_effect = event.effect;
            channel.channel_tick = 0;
            channel.channel_row = 0;
        }

        let speed = seq.speed;
        for ch in 0..seq.channels.len() {
            let channel = &mut seq.channels[ch];
            // A delayed note has to keep counting before it sounds
            if !channel.playing && channel.delayed_period.is_none() {
                continue;
            }

            channel.channel_tick += 1;
            let effect = channel.current_effect;
            if channel.channel_tick >= speed {
                channel.channel_tick = 0;
                channel.channel_row += 1;
                channel.begin_row();
                if effect != TrackerEffect::None {
                    seq.process_note(ch, &TrackerNote::with_effect(effect));
                }
            } else {
                let tick = channel.channel_tick;
                seq.tick_effect(ch, effect, tick);
            }
        }

        // Song flow has no meaning without a song position
        seq.pending_jump = None;
        seq.pending_break = None;
        seq.pending_loop_row = None;
        seq.pattern_delay = 0;
    }
}

impl TickSource for LiveSequencer {
    fn module(&self) -> &Arc<TrackerModule> {
        self.sequencer.module()
    }

    fn advance_tick(&mut self) {
        LiveSequencer::advance_tick(self);
    }

    fn samples_per_tick(&self) -> u32 {
        self.sequencer.samples_per_tick()
    }

    fn is_finished(&self) -> bool {
        false
    }

    fn channels_mut(&mut self) -> &mut [ChannelState] {
        self.sequencer.channels_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    use nether_tracker::{
        FormatHints, SampleData, SourceFormat, TrackerInstrument, TrackerPattern, TrackerSample,
    };

    fn live_module() -> Arc<TrackerModule> {
        let mut module = TrackerModule::new("Live", 4, FormatHints::new(SourceFormat::Mod));
        let mut pattern = TrackerPattern::empty(64, 4);
        pattern.notes[0][0] = TrackerNote {
            period: Some(428),
            instrument: Some(1),
            ..Default::default()
        };
        module.patterns = vec![pattern];
        module.order_table = vec![0];
        module.instruments = vec![TrackerInstrument::from_sample(TrackerSample {
            data: SampleData::I8(vec![32; 512]),
            volume: 48,
            ..Default::default()
        })];
        Arc::new(module)
    }

    #[test]
    fn test_starts_silent() {
        let live = LiveSequencer::new(live_module(), 44_100);
        assert!(live.channels().iter().all(|ch| !ch.playing && ch.volume == 0));
        assert!(!TickSource::is_finished(&live));
    }

    #[test]
    fn test_note_plays_on_next_tick() {
        let mut live = LiveSequencer::new(live_module(), 44_100);
        live.trigger_note(NoteEvent::new(2, 320, 1));
        assert!(!live.channels()[2].playing);

        live.advance_tick();
        let ch = &live.channels()[2];
        assert!(ch.playing);
        assert_eq!(ch.period, 320);
        assert_eq!(ch.volume, 48);
        assert_eq!(ch.channel_tick, 1);
    }

    #[test]
    fn test_release_stops_channel() {
        let mut live = LiveSequencer::new(live_module(), 44_100);
        live.trigger_note(NoteEvent::new(0, 428, 1).with_effect(TrackerEffect::Vibrato {
            speed: 4,
            depth: 4,
        }));
        live.advance_tick();

        live.release_note(ReleaseEvent { channel: 0 });
        live.advance_tick();
        let ch = &live.channels()[0];
        assert!(!ch.playing);
        assert_eq!(ch.current_effect, TrackerEffect::None);
    }

    #[test]
    fn test_out_of_range_events_are_ignored() {
        let mut live = LiveSequencer::new(live_module(), 44_100);
        live.trigger_note(NoteEvent::new(9, 428, 1));
        live.release_note(ReleaseEvent { channel: 12 });
        live.advance_tick();
        assert!(live.channels().iter().all(|ch| !ch.playing));
    }

    #[test]
    fn test_effect_continues_across_channel_rows() {
        let mut live = LiveSequencer::new(live_module(), 44_100);
        live.trigger_note(
            NoteEvent::new(1, 428, 1).with_effect(TrackerEffect::VolumeSlide { up: 2, down: 0 }),
        );
        live.advance_tick();
        assert_eq!(live.channels()[1].volume, 50);
        live.sequencer.channels[1].position = 100.0;

        // Ticks 2..5 slide, tick 6 is the channel's next row
        for _ in 0..5 {
            live.advance_tick();
        }
        let ch = &live.channels()[1];
        assert_eq!(ch.channel_row, 1);
        assert_eq!(ch.channel_tick, 0);
        assert_eq!(ch.volume, 58);
        assert_eq!(ch.position, 100.0);
        assert!(ch.playing);

        live.advance_tick();
        assert_eq!(live.channels()[1].volume, 60);
    }

    #[test]
    fn test_delayed_note_triggers() {
        let mut live = LiveSequencer::new(live_module(), 44_100);
        live.trigger_note(NoteEvent::new(0, 428, 1).with_effect(TrackerEffect::NoteDelay(2)));

        live.advance_tick();
        assert!(!live.channels()[0].playing);
        live.advance_tick();
        assert!(live.channels()[0].playing);
        assert_eq!(live.channels()[0].period, 428);
    }

    #[test]
    fn test_flow_effects_are_discarded() {
        let mut live = LiveSequencer::new(live_module(), 44_100);
        live.trigger_note(NoteEvent::new(0, 428, 1).with_effect(TrackerEffect::PatternDelay(4)));
        live.trigger_note(NoteEvent::new(1, 428, 1).with_effect(TrackerEffect::PositionJump(3)));
        live.advance_tick();

        assert_eq!(live.sequencer.pattern_delay, 0);
        assert_eq!(live.sequencer.pending_jump, None);
        assert!(!TickSource::is_finished(&live));
    }

    #[test]
    fn test_tempo_and_speed() {
        let mut live = LiveSequencer::new(live_module(), 44_100);
        live.set_tempo(150);
        assert_eq!(live.tempo(), 150);
        assert_eq!(live.samples_per_tick(), 735);

        live.set_speed(0);
        assert_eq!(live.speed(), 1);
    }

    #[test]
    fn test_input_from_other_threads() {
        let mut live = LiveSequencer::new(live_module(), 44_100);

        let handles: Vec<_> = (0..4)
            .map(|ch| {
                let input = live.input();
                thread::spawn(move || input.trigger_note(NoteEvent::new(ch, 254, 1)))
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        live.advance_tick();
        assert!(live.channels().iter().all(|ch| ch.playing && ch.period == 254));
    }
}
