use thiserror::Error;

/// Errors raised while setting up or playing a round
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("invalid level config: {0}")]
    UnknownLevel(String),
    #[error("invalid number range {min}..={max}")]
    InvalidRange { min: u32, max: u32 },
    #[error("a puzzle needs at least one pair")]
    ZeroPairs,
    #[error("a puzzle holds at most {max} pairs, got {count}")]
    TooManyPairs { count: usize, max: usize },
    #[error("max_mistakes must be at least 1")]
    ZeroMistakes,
    #[error("game generation failed after {attempts} attempts")]
    GenerationExhausted { attempts: usize },
    #[error("strip index {0} is out of range")]
    StripIndexOutOfRange(usize),
    #[error("grid index {0} is out of range")]
    GridIndexOutOfRange(usize),
}

/// Errors raised by ranking stores and the ranking API
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RankingError {
    #[error("Missing required fields")]
    MissingFields,
    #[error("invalid field `{0}`: {1}")]
    InvalidField(&'static str, String),
    #[error("storage error: {0}")]
    Storage(String),
}

impl RankingError {
    /// HTTP status code this error maps to
    pub fn status(&self) -> u16 {
        match self {
            Self::MissingFields | Self::InvalidField(..) => 400,
            Self::Storage(_) => 500,
        }
    }
}
