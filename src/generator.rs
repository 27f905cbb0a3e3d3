//! Waveform oscillators and finite sample generators.
//!
//! Generators are plain finite iterators over samples in [-1, 1]; tracks box
//! them as lazy sources. Oscillator state (phase, tick count) lives in
//! explicit struct fields. Frequencies are the generator's contract: they
//! are asserted to the audible range [20, 20000] Hz here, not re-checked by
//! the composition engine.

use std::f64::consts::TAU;

/// Audible frequency range in Hz.
pub const FREQ_RANGE: (f64, f64) = (20.0, 20_000.0);

/// Supported waveform shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Triangle,
    Square,
    Sawtooth,
}

impl Waveform {
    /// Waveform value for a phase in [0, 1).
    pub fn eval(self, phase: f64) -> f64 {
        match self {
            Waveform::Sine => (TAU * phase).sin(),
            Waveform::Triangle => 1.0 - (2.0 - (4.0 * phase - 3.0).abs()).abs(),
            Waveform::Square => {
                if phase < 0.5 {
                    -1.0
                } else {
                    1.0
                }
            }
            Waveform::Sawtooth => 2.0 * phase - 1.0,
        }
    }

    /// Parse a waveform name as used in score descriptions.
    pub fn from_name(name: &str) -> Option<Waveform> {
        Some(match name {
            "sine" => Waveform::Sine,
            "triangle" => Waveform::Triangle,
            "square" => Waveform::Square,
            "sawtooth" | "saw" => Waveform::Sawtooth,
            _ => return None,
        })
    }
}

fn sample_count(dur_s: f64, sample_rate: u32) -> usize {
    (dur_s * sample_rate as f64) as usize
}

fn assert_audible(freq: f64) {
    assert!(
        (FREQ_RANGE.0..=FREQ_RANGE.1).contains(&freq),
        "frequency {freq} Hz outside audible range"
    );
}

/// `dur_s` seconds of zero samples.
pub fn silence(dur_s: f64, sample_rate: u32) -> impl Iterator<Item = f64> {
    std::iter::repeat(0.0).take(sample_count(dur_s, sample_rate))
}

/// A single fixed-frequency oscillator, `dur_s` seconds long.
pub struct Tone {
    waveform: Waveform,
    phase: f64,
    phase_inc: f64,
    vol: f64,
    remaining: usize,
}

impl Iterator for Tone {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let y = self.waveform.eval(self.phase);
        self.phase = (self.phase + self.phase_inc) % 1.0;
        Some(self.vol * y)
    }
}

pub fn tone(waveform: Waveform, freq: f64, dur_s: f64, vol: f64, sample_rate: u32) -> Tone {
    tone_with_phase(waveform, freq, dur_s, vol, 0.0, sample_rate)
}

pub fn tone_with_phase(
    waveform: Waveform,
    freq: f64,
    dur_s: f64,
    vol: f64,
    phase: f64,
    sample_rate: u32,
) -> Tone {
    assert_audible(freq);
    Tone {
        waveform,
        phase,
        phase_inc: freq / sample_rate as f64,
        vol,
        remaining: sample_count(dur_s, sample_rate),
    }
}

/// Several oscillators of one waveform summed and normalized by the sum of
/// their volumes.
pub struct Chord {
    waveform: Waveform,
    /// Per-voice (phase, phase increment, volume).
    voices: Vec<(f64, f64, f64)>,
    inv_vol_sum: f64,
    remaining: usize,
}

impl Iterator for Chord {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let mut y = 0.0;
        for (phase, inc, vol) in &mut self.voices {
            y += *vol * self.waveform.eval(*phase);
            *phase = (*phase + *inc) % 1.0;
        }
        Some(y * self.inv_vol_sum)
    }
}

/// Build a chord generator. `vols` and `phases`, when given, must match
/// `freqs` in length (a construction error otherwise).
pub fn chord(
    waveform: Waveform,
    freqs: &[f64],
    dur_s: f64,
    vols: Option<&[f64]>,
    phases: Option<&[f64]>,
    sample_rate: u32,
) -> Chord {
    assert!(!freqs.is_empty(), "chord needs at least one frequency");
    if let Some(vols) = vols {
        assert_eq!(vols.len(), freqs.len(), "vols length must match freqs");
    }
    if let Some(phases) = phases {
        assert_eq!(phases.len(), freqs.len(), "phases length must match freqs");
    }
    for &f in freqs {
        assert_audible(f);
    }

    let voices: Vec<(f64, f64, f64)> = freqs
        .iter()
        .enumerate()
        .map(|(i, &f)| {
            let phase = phases.map_or(0.0, |p| p[i]);
            let vol = vols.map_or(1.0, |v| v[i]);
            (phase, f / sample_rate as f64, vol)
        })
        .collect();
    let vol_sum: f64 = voices.iter().map(|&(_, _, v)| v).sum();
    assert!(vol_sum > 0.0, "chord volumes must sum above zero");

    Chord {
        waveform,
        voices,
        inv_vol_sum: 1.0 / vol_sum,
        remaining: sample_count(dur_s, sample_rate),
    }
}

/// A sine whose frequency follows `freq_fn(elapsed_seconds)`, integrated as
/// a running phase so frequency changes never produce clicks. Out-of-range
/// frequencies are clamped to the audible range.
pub struct Sweep {
    freq_fn: Box<dyn Fn(f64) -> f64>,
    phase: f64,
    ticks: u64,
    sample_rate: u32,
    vol: f64,
    remaining: usize,
}

impl Iterator for Sweep {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let t = self.ticks as f64 / self.sample_rate as f64;
        self.ticks += 1;
        let freq = (self.freq_fn)(t).clamp(FREQ_RANGE.0, FREQ_RANGE.1);
        let y = self.vol * (TAU * self.phase).sin();
        self.phase = (self.phase + freq / self.sample_rate as f64) % 1.0;
        Some(y)
    }
}

pub fn sweep<F>(freq_fn: F, dur_s: f64, vol: f64, sample_rate: u32) -> Sweep
where
    F: Fn(f64) -> f64 + 'static,
{
    Sweep {
        freq_fn: Box::new(freq_fn),
        phase: 0.0,
        ticks: 0,
        sample_rate,
        vol,
        remaining: sample_count(dur_s, sample_rate),
    }
}

/// A sine stack at integer multiples of `fundamental`, with per-harmonic
/// volume given by `vol_fn(harmonic_number)`. Harmonics above the audible
/// range are dropped.
pub fn harmonics<F>(fundamental: f64, count: usize, vol_fn: F, dur_s: f64, sample_rate: u32) -> Chord
where
    F: Fn(f64) -> f64,
{
    assert_audible(fundamental);
    assert!(count >= 1, "need at least the fundamental");
    let mut freqs = Vec::new();
    let mut vols = Vec::new();
    for i in 1..=count {
        let f = fundamental * i as f64;
        if f > FREQ_RANGE.1 {
            break;
        }
        freqs.push(f);
        vols.push(vol_fn(i as f64));
    }
    chord(Waveform::Sine, &freqs, dur_s, Some(&vols), None, sample_rate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn silence_is_zeros_of_exact_length() {
        let samples: Vec<f64> = silence(0.5, 100).collect();
        assert_eq!(samples.len(), 50);
        assert!(samples.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn tone_has_exact_length() {
        let samples: Vec<f64> = tone(Waveform::Sine, 440.0, 0.25, 1.0, 48000).collect();
        assert_eq!(samples.len(), 12000);
    }

    #[test]
    fn tone_stays_in_range() {
        for wf in [
            Waveform::Sine,
            Waveform::Triangle,
            Waveform::Square,
            Waveform::Sawtooth,
        ] {
            for s in tone(wf, 440.0, 0.1, 1.0, 44100) {
                assert!((-1.0..=1.0).contains(&s), "{wf:?} out of range: {s}");
            }
        }
    }

    #[test]
    fn sine_starts_at_zero_and_oscillates() {
        let samples: Vec<f64> = tone(Waveform::Sine, 100.0, 0.1, 1.0, 48000).collect();
        assert!(samples[0].abs() < 1e-10);
        assert!(samples.iter().any(|&s| s > 0.9));
        assert!(samples.iter().any(|&s| s < -0.9));
    }

    #[test]
    fn waveform_shapes_at_key_phases() {
        assert!((Waveform::Triangle.eval(0.0)).abs() < 1e-12);
        assert!((Waveform::Triangle.eval(0.25) - 1.0).abs() < 1e-12);
        assert!((Waveform::Triangle.eval(0.75) + 1.0).abs() < 1e-12);
        assert_eq!(Waveform::Square.eval(0.25), -1.0);
        assert_eq!(Waveform::Square.eval(0.75), 1.0);
        assert!((Waveform::Sawtooth.eval(0.0) + 1.0).abs() < 1e-12);
        assert!((Waveform::Sawtooth.eval(0.5)).abs() < 1e-12);
    }

    #[test]
    #[should_panic(expected = "outside audible range")]
    fn subsonic_frequency_is_rejected() {
        tone(Waveform::Sine, 5.0, 1.0, 1.0, 48000);
    }

    #[test]
    fn chord_is_volume_normalized() {
        // Two equal sines in phase: normalized sum equals a single sine.
        let chord_samples: Vec<f64> = chord(
            Waveform::Sine,
            &[440.0, 440.0],
            0.01,
            None,
            None,
            48000,
        )
        .collect();
        let tone_samples: Vec<f64> = tone(Waveform::Sine, 440.0, 0.01, 1.0, 48000).collect();
        assert_eq!(chord_samples.len(), tone_samples.len());
        for (c, t) in chord_samples.iter().zip(&tone_samples) {
            assert!((c - t).abs() < 1e-9);
        }
    }

    #[test]
    #[should_panic(expected = "vols length must match freqs")]
    fn chord_rejects_mismatched_volumes() {
        chord(Waveform::Sine, &[440.0, 660.0], 1.0, Some(&[1.0]), None, 48000);
    }

    #[test]
    #[should_panic(expected = "volumes must sum above zero")]
    fn chord_rejects_silent_volumes() {
        chord(
            Waveform::Sine,
            &[440.0, 660.0],
            1.0,
            Some(&[0.0, 0.0]),
            None,
            48000,
        );
    }

    #[test]
    fn sweep_clamps_frequency_and_runs_to_length() {
        // The function dives below the audible range; the sweep must clamp
        // rather than stall or alias wildly.
        let samples: Vec<f64> = sweep(|t| 10000.0 * (0.001 - t), 0.1, 1.0, 48000).collect();
        assert_eq!(samples.len(), 4800);
        assert!(samples.iter().all(|s| (-1.0..=1.0).contains(s)));
    }

    #[test]
    fn harmonics_drop_above_audible_range() {
        // 12 kHz fundamental: only the 12 kHz harmonic survives.
        let stack = harmonics(12_000.0, 8, |_| 1.0, 0.001, 48000);
        assert_eq!(stack.voices.len(), 1);
    }

    #[test]
    fn waveform_names_parse() {
        assert_eq!(Waveform::from_name("sine"), Some(Waveform::Sine));
        assert_eq!(Waveform::from_name("saw"), Some(Waveform::Sawtooth));
        assert_eq!(Waveform::from_name("sawtooth"), Some(Waveform::Sawtooth));
        assert_eq!(Waveform::from_name("noise"), None);
    }
}
