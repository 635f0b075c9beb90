use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

const PROFILE_DIR_NAME: &str = "geda-cli";
const PROFILE_FILE_NAME: &str = "config.json";

/// Session saved by `auth login`. The access token is a bearer secret, so
/// the file is written with owner-only permissions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub user_email: String,
    #[serde(default)]
    pub last_login_at: String,
}

pub fn default_path() -> Result<PathBuf> {
    let home = dirs::home_dir().context("could not determine the home directory")?;
    Ok(home
        .join(".config")
        .join(PROFILE_DIR_NAME)
        .join(PROFILE_FILE_NAME))
}

/// Returns `None` when no profile has been saved yet.
pub fn load(path: &Path) -> Result<Option<Profile>> {
    let data = match fs::read(path) {
        Ok(data) => data,
        Err(error) if error.kind() == ErrorKind::NotFound => return Ok(None),
        Err(error) => {
            return Err(error)
                .with_context(|| format!("failed to read profile {}", path.display()));
        }
    };
    let profile = serde_json::from_slice(&data)
        .with_context(|| format!("failed to parse profile {}", path.display()))?;
    Ok(Some(profile))
}

/// Writes the profile, filling `last_login_at` with the current UTC time
/// when blank.
pub fn save(path: &Path, profile: &Profile) -> Result<()> {
    let mut profile = profile.clone();
    if profile.last_login_at.is_empty() {
        profile.last_login_at = OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .context("failed to format login timestamp")?;
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create profile directory {}", parent.display()))?;
        restrict_permissions(parent, 0o700)?;
    }
    let data = serde_json::to_string_pretty(&profile).context("failed to serialize profile")?;
    fs::write(path, data).with_context(|| format!("failed to write profile {}", path.display()))?;
    restrict_permissions(path, 0o600)?;
    Ok(())
}

/// Removes the profile; a profile that never existed is fine.
pub fn clear(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(error) if error.kind() == ErrorKind::NotFound => Ok(()),
        Err(error) => {
            Err(error).with_context(|| format!("failed to remove profile {}", path.display()))
        }
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(mode))
        .with_context(|| format!("failed to set permissions on {}", path.display()))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path, _mode: u32) -> Result<()> {
    Ok(())
}
