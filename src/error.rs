use std::fmt;

/// Top-level crate error.
#[derive(Debug)]
pub enum KlangError {
    Note(NoteError),
    Wav(WavError),
    Render(RenderError),
    Score(ScoreError),
}

/// Note-string parsing errors.
#[derive(Debug, PartialEq)]
pub enum NoteError {
    UnknownNote { text: String },
    BadOctave { text: String },
    Empty,
}

/// WAV container decode / I/O errors.
#[derive(Debug)]
pub enum WavError {
    BadMagic { expected: &'static str },
    UnsupportedFormat { audio_format: u16 },
    UnsupportedBitDepth { bits: u16 },
    BadHeader { detail: &'static str },
    Truncated { at: usize },
    Io(std::io::Error),
}

/// Faults raised while pulling samples from a composition tree.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderError {
    /// A user-supplied factor function produced NaN or infinity.
    NonFiniteFactor {
        node: &'static str,
        tick: u64,
        value: f64,
    },
    /// A hard-capped capture ran out of room before the track finished.
    CaptureOverflow { limit: usize },
    /// Multi-channel construction with no lanes or mismatched sample rates.
    BadChannels { detail: String },
}

/// Score description errors.
#[derive(Debug, PartialEq)]
pub enum ScoreError {
    NoEvents,
    UnknownWaveform { name: String },
    BadEvent { index: usize, detail: String },
}

impl fmt::Display for KlangError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KlangError::Note(e) => write!(f, "Note error: {e}"),
            KlangError::Wav(e) => write!(f, "WAV error: {e}"),
            KlangError::Render(e) => write!(f, "Render error: {e}"),
            KlangError::Score(e) => write!(f, "Score error: {e}"),
        }
    }
}

impl std::error::Error for KlangError {}

impl fmt::Display for NoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoteError::UnknownNote { text } => write!(f, "`{text}` is not a valid note name"),
            NoteError::BadOctave { text } => write!(f, "`{text}` has an invalid octave suffix"),
            NoteError::Empty => write!(f, "empty note string"),
        }
    }
}

impl std::error::Error for NoteError {}

impl fmt::Display for WavError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WavError::BadMagic { expected } => write!(f, "missing `{expected}` chunk marker"),
            WavError::UnsupportedFormat { audio_format } => {
                write!(f, "audio format {audio_format} not supported (PCM only)")
            }
            WavError::UnsupportedBitDepth { bits } => {
                write!(f, "{bits} bits per sample not supported (16-bit only)")
            }
            WavError::BadHeader { detail } => write!(f, "malformed header: {detail}"),
            WavError::Truncated { at } => write!(f, "file truncated at byte {at}"),
            WavError::Io(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for WavError {}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::NonFiniteFactor { node, tick, value } => {
                write!(f, "non-finite factor {value} in {node} node at tick {tick}")
            }
            RenderError::CaptureOverflow { limit } => {
                write!(f, "track still producing after {limit} samples")
            }
            RenderError::BadChannels { detail } => write!(f, "{detail}"),
        }
    }
}

impl std::error::Error for RenderError {}

impl fmt::Display for ScoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoreError::NoEvents => write!(f, "score contains no events"),
            ScoreError::UnknownWaveform { name } => write!(f, "unknown waveform `{name}`"),
            ScoreError::BadEvent { index, detail } => {
                write!(f, "event {index}: {detail}")
            }
        }
    }
}

impl std::error::Error for ScoreError {}

impl From<NoteError> for KlangError {
    fn from(e: NoteError) -> Self {
        KlangError::Note(e)
    }
}

impl From<WavError> for KlangError {
    fn from(e: WavError) -> Self {
        KlangError::Wav(e)
    }
}

impl From<RenderError> for KlangError {
    fn from(e: RenderError) -> Self {
        KlangError::Render(e)
    }
}

impl From<ScoreError> for KlangError {
    fn from(e: ScoreError) -> Self {
        KlangError::Score(e)
    }
}

impl From<std::io::Error> for WavError {
    fn from(e: std::io::Error) -> Self {
        WavError::Io(e)
    }
}
