//! # hexglitch-core
//!
//! A library for glitching image files at the raw byte level while keeping
//! their headers intact.
//!
//! This crate provides the core functionality for:
//! - Splitting a buffer into a protected header and a mutable body
//! - Find/replace of hex byte patterns across the body
//! - Randomized corruption of a sampled set of body bytes
//! - Loading and saving files under a size/extension/location policy
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`engine`]: Stateless byte corruption functions and [`Operation`]
//! - [`session`]: Original/glitched buffer pair kept by the caller
//! - [`file`]: File loading and saving policy
//! - [`error`]: Error types and handling
//!
//! ## Example
//!
//! ```no_run
//! use hexglitch_core::{file, FilePolicy, GlitchMode, GlitchSession, Operation};
//! use rand::thread_rng;
//!
//! let policy = FilePolicy::default();
//! let data = file::load_image("photo.jpg", &policy)?;
//!
//! let mut session = GlitchSession::new(data);
//! let op = Operation::corrupt(500, GlitchMode::Increment)?;
//! session.apply(&op, &mut thread_rng())?;
//!
//! file::save_image("photo-glitched.jpg", session.glitched(), &policy, false)?;
//! # Ok::<(), hexglitch_core::Error>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unreachable_pub)]

pub mod engine;
pub mod error;
pub mod file;
pub mod session;

// Re-export primary types for convenience
pub use engine::{
    assemble, corruption_count, find_replace, hex_preview, parse_hex_field, random_corrupt, split,
    GlitchMode, GlitchOutcome, Operation,
};
pub use error::{Error, Result};
pub use file::FilePolicy;
pub use session::{GlitchConfig, GlitchSession, DEFAULT_HEADER_LEN, DEFAULT_INTENSITY};

/// Crate version for programmatic access
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
