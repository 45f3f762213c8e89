//! Explicit original/glitched buffer pair for a loaded file.
//!
//! The engine is stateless; a [`GlitchSession`] is the state a caller keeps
//! between operations. Every operation starts again from the pristine
//! original, so glitches never compound.

use crate::engine::{hex_preview, GlitchMode, GlitchOutcome, Operation, DEFAULT_PREVIEW_BYTES};
use crate::error::Result;
use rand::Rng;
use tracing::{debug, info};

/// Default number of leading bytes protected from glitching
pub const DEFAULT_HEADER_LEN: usize = 500;

/// Default corruption intensity (1 in N bytes)
pub const DEFAULT_INTENSITY: usize = 1000;

/// Configuration for a glitch session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlitchConfig {
    /// Number of leading bytes never modified
    pub header_len: usize,
    /// Corruption intensity used by [`GlitchSession::corrupt`]
    pub intensity: usize,
    /// Number of bytes rendered by [`GlitchSession::preview`]
    pub preview_bytes: usize,
}

impl Default for GlitchConfig {
    fn default() -> Self {
        Self {
            header_len: DEFAULT_HEADER_LEN,
            intensity: DEFAULT_INTENSITY,
            preview_bytes: DEFAULT_PREVIEW_BYTES,
        }
    }
}

impl GlitchConfig {
    /// Creates a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the protected header length
    pub fn header_len(mut self, len: usize) -> Self {
        self.header_len = len;
        self
    }

    /// Sets the intensity used by [`GlitchSession::corrupt`]
    pub fn intensity(mut self, intensity: usize) -> Self {
        self.intensity = intensity;
        self
    }

    /// Sets the number of bytes shown in previews
    pub fn preview_bytes(mut self, bytes: usize) -> Self {
        self.preview_bytes = bytes;
        self
    }
}

/// A loaded file and its current glitched version
#[derive(Debug, Clone)]
pub struct GlitchSession {
    original: Vec<u8>,
    glitched: Vec<u8>,
    config: GlitchConfig,
    last: Option<Operation>,
}

impl GlitchSession {
    /// Starts a session; the glitched copy begins equal to the original
    pub fn new(original: Vec<u8>) -> Self {
        Self::with_config(original, GlitchConfig::default())
    }

    /// Starts a session with custom configuration
    pub fn with_config(original: Vec<u8>, config: GlitchConfig) -> Self {
        debug!("Session started with {} bytes", original.len());
        Self {
            glitched: original.clone(),
            original,
            config,
            last: None,
        }
    }

    /// The pristine loaded bytes
    pub fn original(&self) -> &[u8] {
        &self.original
    }

    /// The current glitched bytes
    pub fn glitched(&self) -> &[u8] {
        &self.glitched
    }

    /// Consumes the session, returning the glitched bytes
    pub fn into_glitched(self) -> Vec<u8> {
        self.glitched
    }

    /// The session configuration
    pub fn config(&self) -> &GlitchConfig {
        &self.config
    }

    /// The configured header length, clamped to the original's size
    pub fn header_len(&self) -> usize {
        self.config.header_len.min(self.original.len())
    }

    /// Changes the protected header length for subsequent operations
    pub fn set_header_len(&mut self, len: usize) {
        self.config.header_len = len;
    }

    /// The most recently applied operation, if any
    pub fn last_operation(&self) -> Option<&Operation> {
        self.last.as_ref()
    }

    /// Returns true if the glitched bytes differ from the original
    pub fn is_modified(&self) -> bool {
        self.original != self.glitched
    }

    /// Apply `op` to the original bytes and replace the glitched copy.
    ///
    /// On error the glitched copy is left as it was.
    pub fn apply<R: Rng + ?Sized>(&mut self, op: &Operation, rng: &mut R) -> Result<usize> {
        let GlitchOutcome {
            data,
            header_len,
            affected,
        } = op.apply(&self.original, self.config.header_len, rng)?;

        info!(
            "{}: {} affected, {} header bytes protected",
            op.describe(),
            affected,
            header_len
        );

        self.glitched = data;
        self.last = Some(op.clone());
        Ok(affected)
    }

    /// Randomly corrupt the original at the configured intensity.
    ///
    /// Shorthand for [`Operation::corrupt`] with [`GlitchConfig::intensity`].
    pub fn corrupt<R: Rng + ?Sized>(&mut self, mode: GlitchMode, rng: &mut R) -> Result<usize> {
        let op = Operation::corrupt(self.config.intensity, mode)?;
        self.apply(&op, rng)
    }

    /// Discard all glitches
    pub fn reset(&mut self) {
        self.glitched.clone_from(&self.original);
        self.last = None;
    }

    /// Hex preview of the start of the glitched bytes
    pub fn preview(&self) -> String {
        hex_preview(&self.glitched, self.config.preview_bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn png_like(len: usize) -> Vec<u8> {
        let mut data = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
        data.extend((0..len).map(|i| (i % 256) as u8));
        data
    }

    #[test]
    fn test_config_builder() {
        let config = GlitchConfig::new()
            .header_len(8)
            .intensity(50)
            .preview_bytes(16);

        assert_eq!(config.header_len, 8);
        assert_eq!(config.intensity, 50);
        assert_eq!(config.preview_bytes, 16);
        assert_eq!(GlitchConfig::default().header_len, 500);
        assert_eq!(GlitchConfig::default().intensity, 1000);
    }

    #[test]
    fn test_new_session_is_unmodified() {
        let session = GlitchSession::new(png_like(32));
        assert_eq!(session.glitched(), session.original());
        assert!(!session.is_modified());
        assert!(session.last_operation().is_none());
    }

    #[test]
    fn test_operations_do_not_compound() {
        let config = GlitchConfig::new().header_len(8);
        let mut session = GlitchSession::with_config(png_like(64), config);
        let mut rng = StdRng::seed_from_u64(3);
        let op = Operation::corrupt(1, GlitchMode::BitwiseXor).unwrap();

        session.apply(&op, &mut rng).unwrap();
        let first = session.glitched().to_vec();
        session.apply(&op, &mut rng).unwrap();

        // A second XOR pass would restore the original if it compounded.
        assert_eq!(session.glitched(), &first[..]);
        assert!(session.is_modified());
    }

    #[test]
    fn test_failed_operation_keeps_state() {
        let config = GlitchConfig::new().header_len(4);
        let mut session = GlitchSession::with_config(png_like(64), config);
        let mut rng = StdRng::seed_from_u64(3);

        let op = Operation::corrupt(1, GlitchMode::Zero).unwrap();
        session.apply(&op, &mut rng).unwrap();
        let before = session.glitched().to_vec();

        let bad = Operation::Corrupt {
            intensity: 0,
            mode: GlitchMode::Zero,
        };
        let err = session.apply(&bad, &mut rng).unwrap_err();
        assert_eq!(err.field(), Some("intensity"));
        assert_eq!(session.glitched(), &before[..]);
        assert_eq!(session.last_operation(), Some(&op));
    }

    #[test]
    fn test_header_is_protected() {
        let original = png_like(128);
        let config = GlitchConfig::new().header_len(8);
        let mut session = GlitchSession::with_config(original.clone(), config);
        let mut rng = StdRng::seed_from_u64(11);

        let op = Operation::corrupt(1, GlitchMode::Random).unwrap();
        session.apply(&op, &mut rng).unwrap();
        assert_eq!(&session.glitched()[..8], &original[..8]);
    }

    #[test]
    fn test_find_replace_reports_count() {
        let config = GlitchConfig::new().header_len(8);
        let mut session = GlitchSession::with_config(png_like(256), config);
        let mut rng = StdRng::seed_from_u64(0);

        let op = Operation::find_replace_hex("FF", "00").unwrap();
        assert_eq!(session.apply(&op, &mut rng).unwrap(), 1);
    }

    #[test]
    fn test_header_len_clamps_and_updates() {
        let mut session = GlitchSession::new(png_like(10));
        assert_eq!(session.header_len(), 18);
        session.set_header_len(4);
        assert_eq!(session.header_len(), 4);
    }

    #[test]
    fn test_corrupt_uses_configured_intensity() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut affected = Vec::new();

        for intensity in [1, 10, 10_000] {
            let config = GlitchConfig::new().header_len(8).intensity(intensity);
            let mut session = GlitchSession::with_config(png_like(10_000), config);
            assert_eq!(session.config().intensity, intensity);

            let count = session.corrupt(GlitchMode::BitwiseXor, &mut rng).unwrap();
            let changed = session
                .original()
                .iter()
                .zip(session.glitched())
                .filter(|(a, b)| a != b)
                .count();
            assert_eq!(changed, count);
            assert_eq!(
                session.last_operation(),
                Some(&Operation::Corrupt {
                    intensity,
                    mode: GlitchMode::BitwiseXor
                })
            );
            affected.push(count);
        }

        assert_eq!(affected, vec![10_000, 1_000, 1]);
    }

    #[test]
    fn test_corrupt_rejects_zero_intensity() {
        let config = GlitchConfig::new().intensity(0);
        let mut session = GlitchSession::with_config(png_like(64), config);
        let err = session
            .corrupt(GlitchMode::Zero, &mut StdRng::seed_from_u64(1))
            .unwrap_err();
        assert_eq!(err.field(), Some("intensity"));
        assert!(!session.is_modified());
    }

    #[test]
    fn test_into_glitched() {
        let config = GlitchConfig::new().header_len(0).intensity(1);
        let mut session = GlitchSession::with_config(vec![0x00, 0x0F], config);
        session
            .corrupt(GlitchMode::BitwiseXor, &mut StdRng::seed_from_u64(2))
            .unwrap();
        assert_eq!(session.into_glitched(), vec![0xFF, 0xF0]);
    }

    #[test]
    fn test_reset() {
        let mut session = GlitchSession::with_config(png_like(64), GlitchConfig::new().header_len(0));
        let mut rng = StdRng::seed_from_u64(5);
        let op = Operation::corrupt(1, GlitchMode::Increment).unwrap();
        session.apply(&op, &mut rng).unwrap();
        assert!(session.is_modified());

        session.reset();
        assert!(!session.is_modified());
        assert!(session.last_operation().is_none());
    }

    #[test]
    fn test_preview() {
        let session = GlitchSession::with_config(png_like(0), GlitchConfig::new().preview_bytes(4));
        assert_eq!(session.preview(), "89 50 4E 47");
    }
}
