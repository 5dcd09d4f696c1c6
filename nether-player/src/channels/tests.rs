//! Tests for channel registers

use super::*;
use rand::SeedableRng;
use rand_pcg::Pcg32;

fn playing_channel(period: i32, volume: i32) -> ChannelState {
    let mut ch = ChannelState::default();
    ch.trigger(period);
    ch.volume = volume;
    ch
}

#[test]
fn test_new_channel_is_silent() {
    let ch = ChannelState::new(64);
    assert!(!ch.playing);
    assert_eq!(ch.panning, 64);
    assert_eq!(ch.volume, 0);
    assert_eq!(ChannelState::default().panning, PAN_CENTER);
}

#[test]
fn test_trigger_resets_position_and_phase() {
    let mut ch = ChannelState::default();
    ch.position = 100.5;
    ch.vibrato.position = 20;
    ch.tremolo.position = 30;
    ch.tremolo.no_retrigger = true;

    ch.trigger(428);

    assert!(ch.playing);
    assert_eq!(ch.period, 428);
    assert_eq!(ch.target_period, 428);
    assert_eq!(ch.position, 0.0);
    assert_eq!(ch.vibrato.position, 0);
    // No-retrigger flag keeps the phase
    assert_eq!(ch.tremolo.position, 30);
}

#[test]
fn test_select_instrument_keeps_playback() {
    let mut ch = playing_channel(428, 10);
    ch.position = 12.0;
    ch.select_instrument(3, 48);

    assert_eq!(ch.instrument_index, 3);
    assert_eq!(ch.sample_index, 0);
    assert_eq!(ch.volume, 48);
    assert_eq!(ch.position, 12.0);
    assert!(ch.playing);
}

#[test]
fn test_begin_row_restores_arpeggio_base() {
    let mut ch = playing_channel(300, 64);
    ch.arpeggio_base = 428;
    ch.vibrato.offset = 5;
    ch.tremolo.offset = -3;

    ch.begin_row();

    assert_eq!(ch.period, 428);
    assert_eq!(ch.arpeggio_base, 0);
    assert_eq!(ch.vibrato.offset, 0);
    assert_eq!(ch.tremolo.offset, 0);
}

#[test]
fn test_volume_slide_memory() {
    let mut ch = playing_channel(428, 32);
    ch.remember_volume_slide(3, 0);
    ch.slide_volume();
    assert_eq!(ch.volume, 35);

    // Zero parameter keeps the previous slide
    ch.remember_volume_slide(0, 0);
    ch.slide_volume();
    assert_eq!(ch.volume, 38);

    ch.remember_volume_slide(0, 15);
    for _ in 0..5 {
        ch.slide_volume();
    }
    assert_eq!(ch.volume, 0);
}

#[test]
fn test_volume_slide_up_wins() {
    let mut ch = playing_channel(428, 62);
    ch.remember_volume_slide(4, 2);
    ch.slide_volume();
    assert_eq!(ch.volume, 64);
}

#[test]
fn test_tone_portamento_never_overshoots() {
    let mut ch = playing_channel(428, 64);
    ch.target_period = 420;
    ch.porta_speed = 3;

    ch.tone_portamento();
    assert_eq!(ch.period, 425);
    ch.tone_portamento();
    assert_eq!(ch.period, 422);
    ch.tone_portamento();
    assert_eq!(ch.period, 420);
    ch.tone_portamento();
    assert_eq!(ch.period, 420);
}

#[test]
fn test_tone_portamento_needs_target() {
    let mut ch = playing_channel(428, 64);
    ch.target_period = 0;
    ch.porta_speed = 8;
    ch.tone_portamento();
    assert_eq!(ch.period, 428);
}

#[test]
fn test_period_slides_clamp() {
    let mut ch = playing_channel(10, 64);
    ch.slide_period_up(8);
    assert_eq!(ch.period, MIN_PERIOD);

    ch.period = 850;
    ch.slide_period_down(10);
    assert_eq!(ch.period, MAX_PERIOD);
}

#[test]
fn test_slide_down_keeps_low_finetune_pitch() {
    // Finetune -8 puts the lowest note at 907, below the finetune-0 bottom
    let mut ch = playing_channel(907, 64);
    ch.slide_period_down(4);
    assert_eq!(ch.period, 907);

    ch.slide_period_up(7);
    assert_eq!(ch.period, 900);
    ch.slide_period_down(4);
    assert_eq!(ch.period, 904);
}

#[test]
fn test_effective_values() {
    let mut ch = playing_channel(428, 60);
    ch.vibrato.offset = -10;
    ch.tremolo.offset = 8;
    assert_eq!(ch.effective_period(), 418);
    assert_eq!(ch.effective_volume(), 64);

    ch.period = 5;
    ch.vibrato.offset = 0;
    assert_eq!(ch.effective_period(), MIN_PERIOD);
}

#[test]
fn test_oscillator_step() {
    let mut rng = Pcg32::seed_from_u64(0);
    let mut osc = Oscillator::default();
    osc.remember(4, 8);

    // Sine at phase 0 is zero
    assert_eq!(osc.step(&mut rng), 0);
    assert_eq!(osc.position, 4);
    // sin table[4] = 97, 97 * 8 / 128 = 6
    assert_eq!(osc.step(&mut rng), 6);
    assert_eq!(osc.position, 8);

    osc.remember(0, 0);
    assert_eq!((osc.speed, osc.depth), (4, 8));

    osc.position = 62;
    osc.step(&mut rng);
    assert_eq!(osc.position, 2);
}

#[test]
fn test_oscillator_waveform_flags() {
    let mut osc = Oscillator::default();
    osc.set_waveform(0x6);
    assert_eq!(osc.waveform, WaveformType::Square);
    assert!(osc.no_retrigger);

    osc.position = 10;
    osc.retrigger();
    assert_eq!(osc.position, 10);

    osc.set_waveform(0x1);
    assert_eq!(osc.waveform, WaveformType::RampDown);
    osc.retrigger();
    assert_eq!(osc.position, 0);
}

#[test]
fn test_silence_keeps_memory() {
    let mut ch = playing_channel(428, 64);
    ch.slide_up_speed = 4;
    ch.current_effect = TrackerEffect::PortamentoUp(4);
    ch.silence();

    assert!(!ch.playing);
    assert_eq!(ch.volume, 0);
    assert_eq!(ch.period, 0);
    assert_eq!(ch.current_effect, TrackerEffect::None);
    assert_eq!(ch.slide_up_speed, 4);
}
