//! Persisted display name.
//!
//! A single local file holds the username chosen by the user. When the file
//! is absent, empty or holds a name the server would reject, a default
//! `匿名<0-999>` name is generated and written.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use kaiwa_shared::protocol::validate_username;

use crate::error::ClientError;

/// Default file name, relative to the working directory
pub const DEFAULT_USERNAME_FILE: &str = ".kaiwa-username";

const DEFAULT_USERNAME_PREFIX: &str = "匿名";

/// `匿名` followed by a random 0-999 suffix
pub fn default_username() -> String {
    let suffix: u32 = rand::random_range(0..1000);
    format!("{}{}", DEFAULT_USERNAME_PREFIX, suffix)
}

/// File-backed username store
#[derive(Debug, Clone)]
pub struct UsernameStore {
    path: PathBuf,
}

impl UsernameStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored username. `None` when the file is missing or blank.
    pub fn load(&self) -> io::Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(content) => {
                let username = content.trim();
                Ok((!username.is_empty()).then(|| username.to_string()))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Read the stored username, generating and persisting a default when it
    /// is absent or invalid
    pub fn load_or_init(&self) -> Result<String, ClientError> {
        if let Some(username) = self.load()? {
            match validate_username(&username) {
                Ok(()) => return Ok(username),
                Err(e) => tracing::warn!(
                    "Ignoring stored username in {}: {}",
                    self.path.display(),
                    e
                ),
            }
        }
        let username = default_username();
        self.save(&username)?;
        tracing::debug!(
            "Generated username '{}' in {}",
            username,
            self.path.display()
        );
        Ok(username)
    }

    pub fn save(&self, username: &str) -> Result<(), ClientError> {
        fs::write(&self.path, username)?;
        Ok(())
    }
}
