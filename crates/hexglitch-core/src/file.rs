//! Loading and saving image files.
//!
//! The engine itself never touches the filesystem. These helpers apply the
//! checks a caller wants before handing bytes to it and before writing the
//! glitched result back out.

use crate::error::{Error, Result};
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};

/// Default maximum input size (100 MiB)
pub const DEFAULT_MAX_FILE_SIZE: u64 = 100 * 1024 * 1024;

/// Image extensions accepted by default
pub const DEFAULT_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "gif", "webp"];

/// Directories that glitched output is never written into
pub const DEFAULT_PROTECTED_DIRS: &[&str] = &[
    "/etc", "/bin", "/sbin", "/usr/bin", "/usr/sbin", "/boot", "/sys", "/proc",
];

/// Rules applied when loading and saving files
#[derive(Debug, Clone)]
pub struct FilePolicy {
    /// Largest input accepted, in bytes
    pub max_file_size: u64,
    /// Accepted extensions, lower case and without the dot
    pub allowed_extensions: Vec<String>,
    /// Directories that may not be written into
    pub protected_dirs: Vec<PathBuf>,
}

impl Default for FilePolicy {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            allowed_extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            protected_dirs: DEFAULT_PROTECTED_DIRS.iter().map(|d| PathBuf::from(*d)).collect(),
        }
    }
}

impl FilePolicy {
    /// Creates a new policy with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum input size
    pub fn max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = bytes;
        self
    }

    /// Replaces the accepted extensions
    pub fn allowed_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.allowed_extensions = extensions
            .into_iter()
            .map(|e| e.as_ref().trim_start_matches('.').to_ascii_lowercase())
            .collect();
        self
    }

    /// Replaces the protected directories
    pub fn protected_dirs<I, P>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.protected_dirs = dirs.into_iter().map(Into::into).collect();
        self
    }

    /// Returns true if the path has an accepted image extension
    pub fn is_supported_image(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| {
                let ext = e.to_ascii_lowercase();
                self.allowed_extensions.iter().any(|a| *a == ext)
            })
            .unwrap_or(false)
    }

    /// Returns true if the path lies inside a protected directory
    pub fn is_protected(&self, path: &Path) -> bool {
        let absolute = absolutize(path);
        self.protected_dirs.iter().any(|dir| absolute.starts_with(dir))
    }
}

/// Read an image file after checking its extension and size
pub fn load_image(path: impl AsRef<Path>, policy: &FilePolicy) -> Result<Vec<u8>> {
    let path = path.as_ref();

    if !policy.is_supported_image(path) {
        warn!("Invalid file type attempted: {}", path.display());
        return Err(Error::UnsupportedExtension {
            path: path.to_path_buf(),
            allowed: policy.allowed_extensions.join(", "),
        });
    }

    let size = fs::metadata(path)
        .map_err(|e| Error::file_read(path, e))?
        .len();
    if size > policy.max_file_size {
        warn!("File too large: {} ({} bytes)", path.display(), size);
        return Err(Error::FileTooLarge {
            path: path.to_path_buf(),
            size,
            max: policy.max_file_size,
        });
    }

    debug!("Loading {} ({} bytes)", path.display(), size);
    fs::read(path).map_err(|e| Error::file_read(path, e))
}

/// Write glitched bytes to `path`.
///
/// Refuses protected directories, and existing files unless `force` is set.
/// Missing parent directories are created.
pub fn save_image(
    path: impl AsRef<Path>,
    data: &[u8],
    policy: &FilePolicy,
    force: bool,
) -> Result<()> {
    let path = path.as_ref();

    if policy.is_protected(path) {
        warn!("Attempted save to system directory: {}", path.display());
        return Err(Error::protected_path(path));
    }

    if path.exists() && !force {
        return Err(Error::FileExists {
            path: path.to_path_buf(),
        });
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| Error::directory_create(parent, e))?;
    }

    fs::write(path, data).map_err(|e| Error::file_write(path, e))?;
    debug!("Saved {} bytes to {}", data.len(), path.display());
    Ok(())
}

/// Make a path absolute and drop `.`/`..` components without touching the filesystem
fn absolutize(path: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };

    let mut out = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
