//! Spectrum analysis — FFT, windowing and peak picking over frozen tracks.

use std::f64::consts::TAU;

use crate::track::FrozenTrack;

/// Complex value as (re, im).
pub type Complex = (f64, f64);

/// Radix-2 iterative FFT. The input is zero-padded to the next power of two.
pub fn fft(samples: &[f64]) -> Vec<Complex> {
    let n = samples.len().max(1).next_power_of_two();
    let mut buf: Vec<Complex> = vec![(0.0, 0.0); n];
    for (i, &s) in samples.iter().enumerate() {
        buf[i] = (s, 0.0);
    }

    // Bit-reversal permutation.
    let bits = n.trailing_zeros();
    if bits > 0 {
        for i in 0..n {
            let j = (i.reverse_bits() >> (usize::BITS - bits)) & (n - 1);
            if i < j {
                buf.swap(i, j);
            }
        }
    }

    // Butterfly passes.
    let mut len = 2;
    while len <= n {
        let angle = -TAU / len as f64;
        let (w_re, w_im) = (angle.cos(), angle.sin());
        for start in (0..n).step_by(len) {
            let (mut cur_re, mut cur_im) = (1.0, 0.0);
            for k in start..start + len / 2 {
                let (a_re, a_im) = buf[k];
                let (b_re, b_im) = buf[k + len / 2];
                let t_re = b_re * cur_re - b_im * cur_im;
                let t_im = b_re * cur_im + b_im * cur_re;
                buf[k] = (a_re + t_re, a_im + t_im);
                buf[k + len / 2] = (a_re - t_re, a_im - t_im);
                let next_re = cur_re * w_re - cur_im * w_im;
                cur_im = cur_re * w_im + cur_im * w_re;
                cur_re = next_re;
            }
        }
        len <<= 1;
    }

    buf
}

/// Magnitude spectrum of a frozen track, up to the Nyquist frequency.
///
/// Frequency resolution is `sample_rate / fft_len` Hz per bin; use
/// [`bin_frequency`] to translate bins.
pub fn spectrum(track: &FrozenTrack) -> Vec<f64> {
    magnitudes(&fft(track.samples()))
}

/// Magnitude spectrum with a Blackman window applied first, for cleaner
/// peaks on non-bin-aligned frequencies.
pub fn windowed_spectrum(track: &FrozenTrack) -> Vec<f64> {
    let window = blackman(track.len());
    let windowed: Vec<f64> = track
        .samples()
        .iter()
        .zip(&window)
        .map(|(s, w)| s * w)
        .collect();
    magnitudes(&fft(&windowed))
}

/// Short-time magnitude spectra: a Blackman-windowed spectrum for each
/// `window_size` slice of the track, hopping `step` samples between slices.
/// Only full windows are analyzed, so a track shorter than `window_size`
/// yields no frames.
pub fn short_time_spectrum(
    track: &FrozenTrack,
    window_size: usize,
    step: usize,
) -> Vec<Vec<f64>> {
    assert!(window_size >= 1, "window must hold at least one sample");
    assert!(step >= 1, "step must advance");

    let window = blackman(window_size);
    let samples = track.samples();
    let mut frames = Vec::new();
    let mut start = 0;
    while start + window_size <= samples.len() {
        let windowed: Vec<f64> = samples[start..start + window_size]
            .iter()
            .zip(&window)
            .map(|(s, w)| s * w)
            .collect();
        frames.push(magnitudes(&fft(&windowed)));
        start += step;
    }
    frames
}

fn magnitudes(bins: &[Complex]) -> Vec<f64> {
    bins[..bins.len() / 2]
        .iter()
        .map(|(re, im)| (re * re + im * im).sqrt())
        .collect()
}

/// The Blackman window of length `n`.
pub fn blackman(n: usize) -> Vec<f64> {
    if n < 2 {
        return vec![1.0; n];
    }
    (0..n)
        .map(|k| {
            let x = k as f64 / (n - 1) as f64;
            0.42 - 0.5 * (TAU * x).cos() + 0.08 * (2.0 * TAU * x).cos()
        })
        .collect()
}

/// Center frequency of an FFT bin.
pub fn bin_frequency(bin: usize, fft_len: usize, sample_rate: u32) -> f64 {
    bin as f64 * sample_rate as f64 / fft_len as f64
}

/// Local maxima above `lo_threshold`: samples strictly higher than both
/// neighbors. Returns (index, height) pairs.
pub fn peaks(values: &[f64], lo_threshold: f64) -> Vec<(usize, f64)> {
    let mut found = Vec::new();
    for i in 1..values.len().saturating_sub(1) {
        let v = values[i];
        if v >= lo_threshold && values[i - 1] < v && v > values[i + 1] {
            found.push((i, v));
        }
    }
    found
}
