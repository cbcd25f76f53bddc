//! Credential file handling.
//!
//! Credentials live in a YAML dotfile in the user's home directory rather
//! than in environment variables, so the password never shows up in shell
//! history or process listings.

use crate::StepsError;
use crate::http_client::DEFAULT_BASE_URL;
use secrecy::SecretString;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// File name of the credential file under the home directory.
pub const CONFIG_FILE_NAME: &str = ".tenkstepsrc";

const TEMPLATE: &str = "\
# Credentials for the 10,000 Steps UK member site.
auth:
  username: my_username
  password: my_password
";

#[derive(Clone, Debug)]
pub struct Config {
    pub username: String,
    pub password: SecretString,
    pub base_url: String,
}

#[derive(Deserialize)]
struct ConfigFile {
    auth: AuthSection,
    #[serde(default)]
    base_url: Option<String>,
}

#[derive(Deserialize)]
struct AuthSection {
    username: String,
    password: String,
}

impl Config {
    /// Resolve the credential file location: `TENKSTEPS_CONFIG` when set,
    /// otherwise [`CONFIG_FILE_NAME`] in the home directory.
    pub fn default_path() -> Result<PathBuf, StepsError> {
        Self::default_path_with(|k| std::env::var(k).ok(), dirs::home_dir)
    }

    /// Testable helper that resolves the path using the provided lookups.
    /// This avoids mutating the global environment in tests and keeps
    /// `default_path()` small and safe.
    fn default_path_with<F, H>(mut get: F, home: H) -> Result<PathBuf, StepsError>
    where
        F: FnMut(&str) -> Option<String>,
        H: FnOnce() -> Option<PathBuf>,
    {
        if let Some(path) = get("TENKSTEPS_CONFIG") {
            return Ok(PathBuf::from(path));
        }
        home()
            .map(|h| h.join(CONFIG_FILE_NAME))
            .ok_or_else(|| StepsError::Config("cannot determine home directory".into()))
    }

    /// Load and parse the credential file.
    pub fn load(path: &Path) -> Result<Self, StepsError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| StepsError::Config(format!("reading {}: {e}", path.display())))?;
        Self::from_yaml(&raw)
    }

    fn from_yaml(raw: &str) -> Result<Self, StepsError> {
        let file: ConfigFile = serde_yaml::from_str(raw)
            .map_err(|e| StepsError::Config(format!("parsing credentials: {e}")))?;
        Ok(Self {
            username: file.auth.username.trim().to_string(),
            password: SecretString::new(file.auth.password.trim().to_string().into()),
            base_url: file
                .base_url
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        })
    }

    /// Write a placeholder credential file for the user to edit, readable
    /// and writable by the owner only.
    pub fn write_template(path: &Path) -> Result<(), StepsError> {
        std::fs::write(path, TEMPLATE)
            .map_err(|e| StepsError::Config(format!("writing {}: {e}", path.display())))?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)).map_err(
                |e| StepsError::Config(format!("setting mode on {}: {e}", path.display())),
            )?;
        }
        Ok(())
    }
}
