//! AAC output bitrates
//!
//! Spoken word compresses well, so the choices stop at 128 kbps.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConvertError;

/// Supported output bitrate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Bitrate {
    K32,
    K48,
    #[default]
    K64,
    K96,
    K128,
}

impl Bitrate {
    pub const ALL: [Bitrate; 5] = [
        Bitrate::K32,
        Bitrate::K48,
        Bitrate::K64,
        Bitrate::K96,
        Bitrate::K128,
    ];

    pub fn kbps(self) -> u32 {
        match self {
            Bitrate::K32 => 32,
            Bitrate::K48 => 48,
            Bitrate::K64 => 64,
            Bitrate::K96 => 96,
            Bitrate::K128 => 128,
        }
    }

    /// Token passed to the encoder's `-b:a`
    pub fn token(self) -> String {
        format!("{}k", self.kbps())
    }
}

impl fmt::Display for Bitrate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}k", self.kbps())
    }
}

impl FromStr for Bitrate {
    type Err = ConvertError;

    /// Accepts "64k", "64K" or a bare "64"
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_suffix('k')
            .or_else(|| trimmed.strip_suffix('K'))
            .unwrap_or(trimmed);
        let kbps: u32 = digits
            .parse()
            .map_err(|_| ConvertError::InvalidBitrate(s.to_string()))?;
        Bitrate::ALL
            .into_iter()
            .find(|b| b.kbps() == kbps)
            .ok_or_else(|| ConvertError::InvalidBitrate(s.to_string()))
    }
}

impl TryFrom<String> for Bitrate {
    type Error = ConvertError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Bitrate> for String {
    fn from(value: Bitrate) -> Self {
        value.token()
    }
}
