//! Row and note processing at tick 0

use std::sync::Arc;

use nether_tracker::{TrackerEffect, TrackerNote};
use tracing::{trace, warn};

use super::Sequencer;
use crate::utils::clamp_volume;

/// Jumps and breaks that land on a row which jumps again stop after this many hops
const MAX_FLOW_CHAIN: u8 = 16;

impl Sequencer {
    /// Process the current row at tick 0.
    ///
    /// The row callback fires once, for the position playback settles on
    /// after any jump or break. Pattern-delay repeats are not reported.
    pub(crate) fn process_row(&mut self) {
        self.process_row_chained(0);

        if !self.seeking
            && !self.repeating_row
            && !self.finished
            && let Some(on_row) = self.on_row.as_mut()
        {
            on_row(self.order, self.row);
        }
    }

    fn process_row_chained(&mut self, depth: u8) {
        // Hold the module separately so channels can be mutated while reading the row
        let module = Arc::clone(&self.module);
        let Some(notes) = module
            .pattern_at_order(self.order)
            .and_then(|pattern| pattern.row(self.row))
        else {
            return;
        };

        for (ch, note) in notes.iter().enumerate().take(self.channels.len()) {
            self.channels[ch].begin_row();
            self.process_note(ch, note);
            self.channels[ch].current_effect = note.effect;
        }

        trace!(order = self.order, row = self.row, "Row");
        self.apply_pending_flow(depth);
    }

    /// Apply a note cell to one channel: instrument, pitch, volume column and
    /// the tick-0 part of its effect
    pub(crate) fn process_note(&mut self, ch: usize, note: &TrackerNote) {
        if let TrackerEffect::NoteDelay(delay) = note.effect
            && delay > 0
        {
            let channel = &mut self.channels[ch];
            channel.delayed_instrument = note.instrument;
            channel.delayed_period = note.period;
            self.apply_row_effect(ch, note.effect);
            return;
        }

        // Unknown instrument numbers leave the channel untouched
        if let Some((index, volume)) = note.instrument.and_then(|n| self.instrument_volume(n)) {
            self.channels[ch].select_instrument(index, volume);
        }

        if let Some(period) = note.period.filter(|&p| p > 0) {
            let channel = &mut self.channels[ch];
            if note.effect.is_tone_portamento() {
                channel.target_period = period as i32;
            } else {
                channel.trigger(period as i32);
            }
        }

        if let Some(volume) = note.volume {
            self.channels[ch].volume = clamp_volume(volume as i32);
        }

        self.apply_row_effect(ch, note.effect);
    }

    /// 0-based index and default volume of a 1-based instrument number
    pub(crate) fn instrument_volume(&self, number: u8) -> Option<(usize, u8)> {
        let instrument = self.module.instrument(number)?;
        Some((number as usize - 1, instrument.default_volume()))
    }

    /// Resolve position jump and pattern break requested by the row just
    /// processed, then process the landing row
    fn apply_pending_flow(&mut self, depth: u8) {
        let jump = self.pending_jump.take();
        let pattern_break = self.pending_break.take();
        if jump.is_none() && pattern_break.is_none() {
            return;
        }

        if depth >= MAX_FLOW_CHAIN {
            warn!(
                order = self.order,
                row = self.row,
                "Flow control chain too long, continuing normally"
            );
            return;
        }

        let song_length = self.module.song_length();
        let target_order = match jump {
            Some(order) => order as u16,
            None => self.order + 1,
        };
        if target_order >= song_length {
            self.finished = true;
            return;
        }

        self.order = target_order;
        let rows = self.pattern_rows_at(target_order);
        self.row = pattern_break.map_or(0, |row| (row as u16).min(rows.saturating_sub(1)));
        self.tick = 0;
        self.pending_loop_row = None;

        self.process_row_chained(depth + 1);
    }
}
