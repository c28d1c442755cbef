//! EVA crew identifiers

use std::str::FromStr;

use crate::TssError;

/// One of the two suited crew members
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EvaId {
    Eva1,
    Eva2,
}

impl EvaId {
    pub const ALL: [EvaId; 2] = [EvaId::Eva1, EvaId::Eva2];

    /// Key used for this crew member inside telemetry mappings
    pub fn as_str(self) -> &'static str {
        match self {
            EvaId::Eva1 => "eva1",
            EvaId::Eva2 => "eva2",
        }
    }
}

impl FromStr for EvaId {
    type Err = TssError;

    /// Case-insensitive, surrounding whitespace ignored
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "eva1" => Ok(EvaId::Eva1),
            "eva2" => Ok(EvaId::Eva2),
            _ => Err(TssError::BadEvaId(s.to_string())),
        }
    }
}

impl std::fmt::Display for EvaId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
