//! Byte corruption engine.
//!
//! Every function here is pure: it reads the buffer it is given and returns
//! a new one. Randomness comes from a caller-supplied [`Rng`], so seeding it
//! makes a glitch reproducible.
//!
//! ## Buffer Layout
//!
//! A buffer is split at the header length into a protected header and a
//! mutable body. Operations only ever transform the body; the header is
//! copied through untouched:
//!
//! ```text
//! | header (protected) | body (glitched) |
//! 0               header_len          len
//! ```
//!
//! ## Example
//!
//! ```
//! use hexglitch_core::{GlitchMode, Operation};
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! let original = vec![0x89, b'P', b'N', b'G', 0xFF, 0x00, 0xFF, 0x10];
//! let op = Operation::find_replace_hex("FF", "00")?;
//! let outcome = op.apply(&original, 4, &mut StdRng::seed_from_u64(7))?;
//! assert_eq!(outcome.data, vec![0x89, b'P', b'N', b'G', 0x00, 0x00, 0x00, 0x10]);
//! assert_eq!(outcome.affected, 2);
//!
//! let op = Operation::corrupt(1, GlitchMode::BitwiseXor)?;
//! let outcome = op.apply(&original, 4, &mut StdRng::seed_from_u64(7))?;
//! assert_eq!(&outcome.data[..4], &original[..4]);
//! # Ok::<(), hexglitch_core::Error>(())
//! ```

pub mod hex;
mod mode;

use crate::error::{Error, Result};
use rand::Rng;
use tracing::{debug, trace};

pub use self::hex::{hex_preview, parse_hex_field, DEFAULT_PREVIEW_BYTES};
pub use mode::GlitchMode;

/// Split a buffer into its protected header and mutable body.
///
/// `header_len` is clamped to the buffer length.
pub fn split(buffer: &[u8], header_len: usize) -> (&[u8], &[u8]) {
    buffer.split_at(header_len.min(buffer.len()))
}

/// Join a header and a transformed body into a new buffer
pub fn assemble(header: &[u8], body: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(header.len() + body.len());
    out.extend_from_slice(header);
    out.extend_from_slice(body);
    out
}

/// Replace every non-overlapping occurrence of `find` in `body`.
///
/// Matches are taken left to right and scanning resumes after each match,
/// so inserted replacement bytes are never rescanned. Returns the new body
/// and the number of replacements made.
pub fn find_replace(body: &[u8], find: &[u8], replace: &[u8]) -> Result<(Vec<u8>, usize)> {
    if find.is_empty() {
        return Err(Error::validation("find", "pattern must not be empty"));
    }

    let mut out = Vec::with_capacity(body.len());
    let mut position = 0;
    let mut replacements = 0;

    while let Some(relative) = find_subsequence(&body[position..], find) {
        let start = position + relative;
        trace!("Pattern match at body offset {}", start);

        out.extend_from_slice(&body[position..start]);
        out.extend_from_slice(replace);
        position = start + find.len();
        replacements += 1;
    }
    out.extend_from_slice(&body[position..]);

    debug!(
        "Replaced {} occurrence(s) ({} -> {} bytes)",
        replacements,
        body.len(),
        out.len()
    );
    Ok((out, replacements))
}

/// Number of bytes [`random_corrupt`] will select for a body of `len` bytes.
///
/// This is `max(1, min(len, len / intensity))` for a non-empty body and 0
/// for an empty one. `intensity` must be positive.
pub fn corruption_count(len: usize, intensity: usize) -> usize {
    if len == 0 || intensity == 0 {
        return 0;
    }
    (len / intensity).min(len).max(1)
}

/// Corrupt roughly one in `intensity` bytes of `body` using `mode`.
///
/// Exactly [`corruption_count`] distinct indices are sampled without
/// replacement and each selected byte is transformed once. Bytes outside
/// the sample are left as they are.
pub fn random_corrupt<R: Rng + ?Sized>(
    body: &[u8],
    intensity: usize,
    mode: GlitchMode,
    rng: &mut R,
) -> Result<Vec<u8>> {
    validate_intensity(intensity)?;

    let mut out = body.to_vec();
    if out.is_empty() {
        return Ok(out);
    }

    let count = corruption_count(out.len(), intensity);
    debug!("Glitching {} of {} bytes with mode {}", count, out.len(), mode);

    for index in rand::seq::index::sample(rng, out.len(), count) {
        out[index] = mode.apply(out[index], rng);
    }

    Ok(out)
}

fn validate_intensity(intensity: usize) -> Result<()> {
    if intensity == 0 {
        return Err(Error::validation(
            "intensity",
            "must be a positive integer (1 in N bytes changed)",
        ));
    }
    Ok(())
}

/// A validated glitch operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Substitute a byte pattern throughout the body
    FindReplace {
        /// Pattern to search for (never empty)
        find: Vec<u8>,
        /// Bytes written in place of each match
        replace: Vec<u8>,
    },
    /// Randomly corrupt a sample of body bytes
    Corrupt {
        /// One in `intensity` bytes is selected (always positive)
        intensity: usize,
        /// Transform applied to each selected byte
        mode: GlitchMode,
    },
}

impl Operation {
    /// Builds a find/replace operation from raw byte patterns
    pub fn find_replace(find: impl Into<Vec<u8>>, replace: impl Into<Vec<u8>>) -> Result<Self> {
        let find = find.into();
        if find.is_empty() {
            return Err(Error::validation("find", "pattern must not be empty"));
        }
        Ok(Self::FindReplace {
            find,
            replace: replace.into(),
        })
    }

    /// Builds a find/replace operation from user-entered hex text
    pub fn find_replace_hex(find: &str, replace: &str) -> Result<Self> {
        let find = parse_hex_field("find", find)?;
        let replace = parse_hex_field("replace", replace)?;
        Self::find_replace(find, replace)
    }

    /// Builds a random corruption operation
    pub fn corrupt(intensity: usize, mode: GlitchMode) -> Result<Self> {
        validate_intensity(intensity)?;
        Ok(Self::Corrupt { intensity, mode })
    }

    /// Short human readable description, used in logs
    pub fn describe(&self) -> String {
        match self {
            Self::FindReplace { find, replace } => format!(
                "find/replace {} -> {}",
                hex_preview(find, find.len()),
                hex_preview(replace, replace.len())
            ),
            Self::Corrupt { intensity, mode } => {
                format!("corrupt 1/{} bytes with {}", intensity, mode)
            }
        }
    }

    /// Apply the operation to `buffer`, protecting the first `header_len` bytes.
    ///
    /// The input is never modified; a new buffer is returned.
    pub fn apply<R: Rng + ?Sized>(
        &self,
        buffer: &[u8],
        header_len: usize,
        rng: &mut R,
    ) -> Result<GlitchOutcome> {
        let (header, body) = split(buffer, header_len);
        trace!(
            "Applying {} (header {} bytes, body {} bytes)",
            self.describe(),
            header.len(),
            body.len()
        );

        let (new_body, affected) = match self {
            Self::FindReplace { find, replace } => find_replace(body, find, replace)?,
            Self::Corrupt { intensity, mode } => {
                let new_body = random_corrupt(body, *intensity, *mode, rng)?;
                (new_body, corruption_count(body.len(), *intensity))
            }
        };

        Ok(GlitchOutcome {
            data: assemble(header, &new_body),
            header_len: header.len(),
            affected,
        })
    }
}

/// Result of applying an [`Operation`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlitchOutcome {
    /// The complete glitched buffer (header followed by new body)
    pub data: Vec<u8>,
    /// Header length actually protected, after clamping
    pub header_len: usize,
    /// Replacements made, or bytes selected for corruption
    pub affected: usize,
}

/// Find a subsequence within a byte slice
fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
