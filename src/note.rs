//! Note names and equal-temperament frequencies.
//!
//! Note strings use solfège-free European names: plain letters `c d e f g a h`
//! with `is`-suffixed sharps (`cis`, `gis`, ...), optionally followed by an
//! octave digit (`a4`, `gis3`). Without a digit the octave defaults to 4.

use crate::error::NoteError;

/// Semitone within an octave, counted from C.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Note {
    C = 0,
    Cis = 1,
    D = 2,
    Dis = 3,
    E = 4,
    F = 5,
    Fis = 6,
    G = 7,
    Gis = 8,
    A = 9,
    Ais = 10,
    H = 11,
}

impl Note {
    fn from_name(name: &str) -> Option<Note> {
        Some(match name {
            "c" => Note::C,
            "cis" => Note::Cis,
            "d" => Note::D,
            "dis" => Note::Dis,
            "e" => Note::E,
            "f" => Note::F,
            "fis" => Note::Fis,
            "g" => Note::G,
            "gis" => Note::Gis,
            "a" => Note::A,
            "ais" => Note::Ais,
            "h" => Note::H,
            _ => return None,
        })
    }
}

/// Parse one note token into note and octave.
pub fn parse_note(text: &str) -> Result<(Note, i32), NoteError> {
    if text.is_empty() {
        return Err(NoteError::Empty);
    }
    let lower = text.to_lowercase();
    let (name, octave) = match lower.rfind(|c: char| !c.is_ascii_digit()) {
        Some(last_alpha) => {
            let (name, digits) = lower.split_at(last_alpha + 1);
            let octave = if digits.is_empty() {
                4
            } else {
                digits.parse().map_err(|_| NoteError::BadOctave {
                    text: text.to_string(),
                })?
            };
            (name, octave)
        }
        None => {
            return Err(NoteError::UnknownNote {
                text: text.to_string(),
            });
        }
    };
    let note = Note::from_name(name).ok_or_else(|| NoteError::UnknownNote {
        text: text.to_string(),
    })?;
    Ok((note, octave))
}

/// Frequency of a note in a given octave, tuned around A4 = `a4` Hz.
pub fn note_to_frequency(note: Note, octave: i32, a4: f64) -> f64 {
    let semitones_from_a4 = (octave - 4) * 12 + note as i32 - Note::A as i32;
    a4 * (2.0_f64).powf(semitones_from_a4 as f64 / 12.0)
}

/// Frequencies of a space-separated chord string like `"c e g"` or
/// `"c2 a3 gis"`.
pub fn chord_frequencies(chord: &str, a4: f64) -> Result<Vec<f64>, NoteError> {
    chord
        .split_whitespace()
        .map(|token| {
            let (note, octave) = parse_note(token)?;
            Ok(note_to_frequency(note, octave, a4))
        })
        .collect()
}
