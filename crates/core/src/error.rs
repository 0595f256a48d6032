//! Error taxonomy for configuration loading and the generation pipeline.

use std::io;

use thiserror::Error;

use crate::types::{GridPos, RoomKind};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{field}: range {min}..={max} is invalid ({reason})")]
    InvalidRange { field: &'static str, min: i32, max: i32, reason: &'static str },

    #[error("{field}: range {min}..={max} contains no odd value")]
    NoOddValue { field: &'static str, min: i32, max: i32 },

    #[error("{field}: value {value} is outside {expected}")]
    OutOfBounds { field: &'static str, value: f32, expected: &'static str },

    #[error("failed to parse configuration: {0}")]
    Parse(String),

    #[error("failed to read configuration: {0}")]
    Io(String),
}

impl From<io::Error> for ConfigError {
    fn from(err: io::Error) -> Self {
        ConfigError::Io(err.to_string())
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GenerationError {
    #[error("overlap resolution did not settle within {steps} steps")]
    ConvergenceTimeout { steps: u32 },

    #[error("only {found} rooms qualified as main rooms, {wanted} required")]
    InsufficientMainRooms { wanted: usize, found: usize },

    #[error("no eligible main room for {kind} after {attempts} attempts")]
    UnterminatedPlacementSearch { kind: RoomKind, attempts: u32 },

    #[error("corridor line {start} -> {end} is not axis aligned")]
    MalformedLine { start: GridPos, end: GridPos },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl GenerationError {
    /// Whether a fresh sampling pass can be expected to get past this error.
    pub fn is_recoverable(&self) -> bool {
        match self {
            GenerationError::ConvergenceTimeout { .. }
            | GenerationError::InsufficientMainRooms { .. }
            | GenerationError::UnterminatedPlacementSearch { .. } => true,
            GenerationError::MalformedLine { .. } | GenerationError::Config(_) => false,
        }
    }
}
