use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use applybot_engine::CredentialStore;
use applybot_logging::{applybot_info, applybot_warn};
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("credential file is malformed: {0}")]
    Parse(String),
    #[error("could not serialise credentials: {0}")]
    Serialize(String),
}

/// Bearer tokens kept in a RON map on disk.
///
/// Every lookup reads the file again so a token set from another shell is
/// picked up without restarting.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn set(&self, key: &str, token: &str) -> Result<(), CredentialError> {
        let mut tokens = self.read()?;
        tokens.insert(key.to_string(), token.trim().to_string());
        self.write(&tokens)?;
        applybot_info!("Stored credential '{}' in {:?}", key, self.path);
        Ok(())
    }

    /// Returns whether a token was present.
    pub fn clear(&self, key: &str) -> Result<bool, CredentialError> {
        let mut tokens = self.read()?;
        let removed = tokens.remove(key).is_some();
        if removed {
            self.write(&tokens)?;
            applybot_info!("Removed credential '{}' from {:?}", key, self.path);
        }
        Ok(removed)
    }

    fn read(&self) -> Result<BTreeMap<String, String>, CredentialError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(err) => return Err(err.into()),
        };
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        ron::from_str(&content).map_err(|err| CredentialError::Parse(err.to_string()))
    }

    fn write(&self, tokens: &BTreeMap<String, String>) -> Result<(), CredentialError> {
        let content = ron::ser::to_string_pretty(tokens, ron::ser::PrettyConfig::new())
            .map_err(|err| CredentialError::Serialize(err.to_string()))?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        let mut tmp = NamedTempFile::new_in(&dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;
        tmp.persist(&self.path).map_err(|err| CredentialError::Io(err.error))?;
        Ok(())
    }
}

impl CredentialStore for FileCredentialStore {
    fn bearer_token(&self, key: &str) -> Option<String> {
        match self.read() {
            Ok(mut tokens) => tokens
                .remove(key)
                .filter(|token| !token.trim().is_empty()),
            Err(err) => {
                applybot_warn!("Failed to read credentials from {:?}: {}", self.path, err);
                None
            }
        }
    }
}
