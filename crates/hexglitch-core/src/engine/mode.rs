//! Per-byte transforms applied by random corruption.

use crate::error::{Error, Result};
use rand::Rng;
use std::fmt;
use std::str::FromStr;

/// Byte operation applied to each index selected for corruption
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GlitchMode {
    /// Replace with a uniformly random byte
    #[default]
    Random,
    /// Add one, wrapping 255 to 0
    Increment,
    /// Subtract one, wrapping 0 to 255
    Decrement,
    /// Set to zero
    Zero,
    /// Flip every bit (`byte ^ 0xFF`)
    BitwiseXor,
}

impl GlitchMode {
    /// All modes, in display order
    pub const ALL: [GlitchMode; 5] = [
        GlitchMode::Random,
        GlitchMode::Increment,
        GlitchMode::Decrement,
        GlitchMode::Zero,
        GlitchMode::BitwiseXor,
    ];

    /// Returns the canonical name of the mode
    pub fn as_str(&self) -> &'static str {
        match self {
            GlitchMode::Random => "random",
            GlitchMode::Increment => "increment",
            GlitchMode::Decrement => "decrement",
            GlitchMode::Zero => "zero",
            GlitchMode::BitwiseXor => "bitwise-xor",
        }
    }

    /// Transforms a single byte
    pub fn apply<R: Rng + ?Sized>(self, byte: u8, rng: &mut R) -> u8 {
        match self {
            GlitchMode::Random => rng.gen(),
            GlitchMode::Increment => byte.wrapping_add(1),
            GlitchMode::Decrement => byte.wrapping_sub(1),
            GlitchMode::Zero => 0,
            GlitchMode::BitwiseXor => byte ^ 0xFF,
        }
    }

    /// Returns true if applying this mode always changes the byte
    pub fn always_changes(&self) -> bool {
        matches!(
            self,
            GlitchMode::Increment | GlitchMode::Decrement | GlitchMode::BitwiseXor
        )
    }
}

impl fmt::Display for GlitchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GlitchMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "random" => Ok(GlitchMode::Random),
            "increment" | "inc" => Ok(GlitchMode::Increment),
            "decrement" | "dec" => Ok(GlitchMode::Decrement),
            "zero" => Ok(GlitchMode::Zero),
            "bitwise-xor" | "bitwise xor" | "bitwise_xor" | "xor" => Ok(GlitchMode::BitwiseXor),
            _ => Err(Error::validation(
                "mode",
                format!(
                    "unknown mode '{}' (expected one of: random, increment, decrement, zero, bitwise-xor)",
                    s
                ),
            )),
        }
    }
}
