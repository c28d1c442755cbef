//! Source command identifiers
//!
//! Every request to the source carries one of these as a big-endian u32.
//! Values below 1000 are read-only queries.

/// Telemetry query understood by the source
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum Command {
    /// Pressurized rover telemetry
    GetRover = 0,
    /// Suit and crew telemetry
    GetEva = 1,
    /// Vehicle location, signal and error telemetry
    GetLtv = 2,
}

impl Command {
    /// Parse from the wire value
    pub fn from_u32(v: u32) -> Option<Self> {
        match v {
            0 => Some(Command::GetRover),
            1 => Some(Command::GetEva),
            2 => Some(Command::GetLtv),
            _ => None,
        }
    }

    /// Convert to the wire value
    #[inline]
    pub fn to_u32(self) -> u32 {
        self as u32
    }

    pub fn name(self) -> &'static str {
        match self {
            Command::GetRover => "GET_ROVER",
            Command::GetEva => "GET_EVA",
            Command::GetLtv => "GET_LTV",
        }
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.name(), self.to_u32())
    }
}
