//! Score descriptions — a small serializable front end to the track algebra.
//!
//! A score is a flat list of chord events. Events without an `offset` play
//! one after another; events with an `offset` are mixed in at that many
//! seconds from the start (padded with leading silence). This is enough to
//! describe chord progressions and layered voices without a language.

use serde::{Deserialize, Serialize};

use crate::error::{KlangError, ScoreError};
use crate::generator::{self, Waveform};
use crate::note::chord_frequencies;
use crate::track::MonoTrack;

fn default_sample_rate() -> u32 {
    48000
}

fn default_a4() -> f64 {
    440.0
}

fn default_volume() -> f64 {
    1.0
}

fn default_waveform() -> String {
    "sine".to_string()
}

/// Linear ADSR envelope parameters for one event.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct AdsrConfig {
    /// Attack time in seconds.
    pub attack: f64,
    /// Decay time in seconds.
    pub decay: f64,
    /// Sustain level [0, 1].
    pub sustain: f64,
    /// Release time in seconds.
    pub release: f64,
    /// Seconds from event start until the release begins.
    #[serde(rename = "hitTime")]
    pub hit_time: f64,
}

impl Default for AdsrConfig {
    fn default() -> Self {
        Self {
            attack: 0.01,
            decay: 0.1,
            sustain: 0.7,
            release: 0.3,
            hit_time: 1.0,
        }
    }
}

/// One chord event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoreEvent {
    /// Space-separated note names, e.g. `"c e g"`.
    pub notes: String,
    /// Duration in seconds.
    pub duration: f64,
    #[serde(default = "default_waveform")]
    pub waveform: String,
    #[serde(default = "default_volume")]
    pub volume: f64,
    /// Seconds from track start. Offset events are mixed in; events without
    /// an offset are sequenced after the previous one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub envelope: Option<AdsrConfig>,
}

/// A complete score.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Score {
    #[serde(default = "default_sample_rate", rename = "sampleRate")]
    pub sample_rate: u32,
    /// Tuning pitch of A4 in Hz.
    #[serde(default = "default_a4")]
    pub a4: f64,
    pub events: Vec<ScoreEvent>,
}

impl Score {
    /// Parse a score from JSON.
    pub fn from_json(json: &str) -> Result<Score, KlangError> {
        serde_json::from_str(json).map_err(|e| {
            KlangError::Score(ScoreError::BadEvent {
                index: 0,
                detail: e.to_string(),
            })
        })
    }

    /// Compile the score into a live track.
    pub fn to_track(&self) -> Result<MonoTrack, KlangError> {
        if self.events.is_empty() {
            return Err(ScoreError::NoEvents.into());
        }

        let mut sequenced = MonoTrack::new(self.sample_rate);
        let mut overlays: Vec<MonoTrack> = Vec::new();

        for (index, event) in self.events.iter().enumerate() {
            let voice = self.event_track(index, event)?;
            match event.offset {
                None => sequenced = sequenced.then(voice),
                Some(offset) => {
                    let padded = MonoTrack::from_iter(
                        generator::silence(offset, self.sample_rate),
                        self.sample_rate,
                    )
                    .then(voice);
                    overlays.push(padded);
                }
            }
        }

        let mut track = sequenced;
        for overlay in overlays {
            track = track.mix(overlay);
        }
        Ok(track)
    }

    fn event_track(&self, index: usize, event: &ScoreEvent) -> Result<MonoTrack, KlangError> {
        let waveform = Waveform::from_name(&event.waveform).ok_or_else(|| {
            KlangError::Score(ScoreError::UnknownWaveform {
                name: event.waveform.clone(),
            })
        })?;
        if event.duration <= 0.0 {
            return Err(ScoreError::BadEvent {
                index,
                detail: format!("non-positive duration {}", event.duration),
            }
            .into());
        }
        let freqs = chord_frequencies(&event.notes, self.a4)?;
        if freqs.is_empty() {
            return Err(ScoreError::BadEvent {
                index,
                detail: "no notes".to_string(),
            }
            .into());
        }

        let voice = generator::chord(waveform, &freqs, event.duration, None, None, self.sample_rate);
        let mut track = MonoTrack::from_iter(voice, self.sample_rate);
        if let Some(env) = event.envelope {
            track = track.adsr(env.attack, env.decay, env.sustain, env.release, env.hit_time);
        }
        if event.volume != 1.0 {
            track = track.scale(event.volume);
        }
        Ok(track)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(notes: &str, duration: f64) -> ScoreEvent {
        ScoreEvent {
            notes: notes.to_string(),
            duration,
            waveform: "sine".to_string(),
            volume: 1.0,
            offset: None,
            envelope: None,
        }
    }

    #[test]
    fn sequenced_events_concatenate() {
        let score = Score {
            sample_rate: 1000,
            a4: 440.0,
            events: vec![event("c", 0.5), event("e", 0.25)],
        };
        let out = score.to_track().unwrap().render(None).unwrap();
        assert_eq!(out.len(), 750);
    }

    #[test]
    fn offset_events_overlay() {
        // One second of c, with e mixed in half a second from the start for
        // one second: total length 1.5 s.
        let mut late = event("e", 1.0);
        late.offset = Some(0.5);
        let score = Score {
            sample_rate: 1000,
            a4: 440.0,
            events: vec![event("c", 1.0), late],
        };
        let out = score.to_track().unwrap().render(None).unwrap();
        assert_eq!(out.len(), 1500);
    }

    #[test]
    fn empty_score_is_an_error() {
        let score = Score {
            sample_rate: 48000,
            a4: 440.0,
            events: vec![],
        };
        assert!(matches!(
            score.to_track(),
            Err(KlangError::Score(ScoreError::NoEvents))
        ));
    }

    #[test]
    fn unknown_waveform_is_an_error() {
        let mut bad = event("c", 1.0);
        bad.waveform = "noise".to_string();
        let score = Score {
            sample_rate: 48000,
            a4: 440.0,
            events: vec![bad],
        };
        assert!(matches!(
            score.to_track(),
            Err(KlangError::Score(ScoreError::UnknownWaveform { .. }))
        ));
    }

    #[test]
    fn empty_notes_string_is_an_error() {
        let score = Score {
            sample_rate: 48000,
            a4: 440.0,
            events: vec![event("", 1.0)],
        };
        assert!(matches!(
            score.to_track(),
            Err(KlangError::Score(ScoreError::BadEvent { .. }))
        ));
    }

    #[test]
    fn bad_note_surfaces_as_note_error() {
        let score = Score {
            sample_rate: 48000,
            a4: 440.0,
            events: vec![event("c x g", 1.0)],
        };
        assert!(matches!(score.to_track(), Err(KlangError::Note(_))));
    }

    #[test]
    fn json_defaults_apply() {
        let score = Score::from_json(
            r#"{ "events": [ { "notes": "c e g", "duration": 2.5 } ] }"#,
        )
        .unwrap();
        assert_eq!(score.sample_rate, 48000);
        assert_eq!(score.a4, 440.0);
        assert_eq!(score.events[0].waveform, "sine");
        assert_eq!(score.events[0].volume, 1.0);
        assert_eq!(score.events[0].offset, None);
    }

    #[test]
    fn json_round_trip() {
        let score = Score {
            sample_rate: 44100,
            a4: 432.0,
            events: vec![ScoreEvent {
                notes: "a3 cis e".to_string(),
                duration: 1.8,
                waveform: "triangle".to_string(),
                volume: 0.7,
                offset: Some(0.9),
                envelope: Some(AdsrConfig::default()),
            }],
        };
        let json = serde_json::to_string(&score).unwrap();
        let back = Score::from_json(&json).unwrap();
        assert_eq!(back, score);
    }

    #[test]
    fn progression_renders_enveloped_chords() {
        // Four chords, 1 s each, sequenced: the classic I-V-vi-IV test.
        let chords = ["c e g", "g h e4", "a c e", "f a c4"];
        let events = chords
            .iter()
            .map(|c| {
                let mut e = event(c, 1.0);
                e.envelope = Some(AdsrConfig {
                    attack: 0.05,
                    decay: 0.2,
                    sustain: 0.5,
                    release: 0.2,
                    hit_time: 0.8,
                });
                e
            })
            .collect();
        let score = Score {
            sample_rate: 8000,
            a4: 440.0,
            events,
        };
        let out = score.to_track().unwrap().render(None).unwrap();
        assert_eq!(out.len(), 4 * 8000);
        assert!(out.iter().any(|&s| s.abs() > 0.1), "should not be silent");
        assert!(out.iter().all(|&s| (-1.0..=1.0).contains(&s)));
    }
}
