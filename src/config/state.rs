// Application state module
// Holds the per-process state shared by every connection

use std::io;
use std::path::PathBuf;

use super::types::Config;

/// Shared application state: the loaded configuration and the canonicalized
/// served root. Read-only for the process lifetime, so connections share it
/// without any locking.
pub struct AppState {
    pub config: Config,
    /// Absolute served root. Request paths resolve beneath this boundary.
    pub root: PathBuf,
}

impl AppState {
    /// Create `AppState`, canonicalizing `server.root` once at startup.
    ///
    /// Fails if the root does not exist or is not a directory, so requests
    /// never race a missing root.
    pub fn new(config: &Config) -> io::Result<Self> {
        let root = PathBuf::from(&config.server.root).canonicalize()?;
        if !root.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("served root is not a directory: {}", root.display()),
            ));
        }

        Ok(Self {
            config: config.clone(),
            root,
        })
    }
}
