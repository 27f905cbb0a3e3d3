pub mod analysis;
pub mod error;
pub mod generator;
pub mod note;
pub mod score;
pub mod track;
pub mod wav;

use crate::error::KlangError;
use crate::score::Score;
use crate::track::MultiTrack;
use crate::wav::AudioData;
use wasm_bindgen::prelude::*;

/// The crate version, read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// WASM-exposed: return the klangwerk version string.
#[wasm_bindgen]
pub fn core_version() -> String {
    VERSION.to_string()
}

/// Parse a JSON score description.
pub fn parse_score(json: &str) -> Result<Score, KlangError> {
    Score::from_json(json)
}

/// WASM-exposed: parse a JSON score and hand it back as a JS object, so
/// editors can validate and inspect the normalized form.
#[wasm_bindgen]
pub fn score_to_js(json: &str) -> Result<JsValue, JsValue> {
    let score = parse_score(json).map_err(|e| JsValue::from_str(&format!("{e}")))?;
    serde_wasm_bindgen::to_value(&score).map_err(|e| JsValue::from_str(&format!("{e}")))
}

/// Render a JSON score to a WAV byte buffer (16-bit stereo PCM).
pub fn render_score_wav_bytes(json: &str) -> Result<Vec<u8>, KlangError> {
    let score = parse_score(json)?;
    let track = score.to_track()?;
    let mut multi = MultiTrack::from_mono(track, 2)?;
    let audio = AudioData::from_multi(&mut multi, None)?;
    Ok(audio.encode())
}

/// WASM-exposed: render a JSON score to a WAV byte array.
#[wasm_bindgen]
pub fn render_score_wav(json: &str) -> Result<Vec<u8>, JsValue> {
    render_score_wav_bytes(json).map_err(|e| JsValue::from_str(&format!("{e}")))
}

/// WASM-exposed: render a JSON score to mono f32 samples.
/// Returns the raw audio buffer for AudioWorklet playback.
#[wasm_bindgen]
pub fn render_score_samples(json: &str) -> Result<Vec<f32>, JsValue> {
    let samples = parse_score(json)
        .and_then(|score| Ok(score.to_track()?.render(None)?))
        .map_err(|e| JsValue::from_str(&format!("{e}")))?;
    Ok(samples.iter().map(|&s| s as f32).collect())
}
