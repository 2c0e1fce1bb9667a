use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Result};
use dirs_next::config_dir;
use playlist_core::SortDirection;

const APP_DIR: &str = "playlist_date_sorter";
pub const CLIENT_SECRET_NAME: &str = "client_secret.json";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// How the run obtains its bearer token.
#[derive(Debug, Clone)]
pub enum CredentialSource {
    AccessToken(String),
    ClientSecrets(PathBuf),
}

impl CredentialSource {
    pub fn label(&self) -> &'static str {
        match self {
            CredentialSource::AccessToken(_) => "access-token",
            CredentialSource::ClientSecrets(_) => "client-secrets",
        }
    }
}

#[derive(Debug, Clone)]
pub struct SorterConfig {
    pub credentials: CredentialSource,
    pub redirect_port: u16,
    pub timeout_secs: u64,
    pub direction: SortDirection,
    pub dry_run: bool,
    pub api_base_url: Option<String>,
}

impl SorterConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

/// An access token wins over a secrets file. Otherwise the secrets file is
/// looked up at the explicit path, then the working directory, then the
/// platform config directory.
pub fn resolve_credentials(
    access_token: Option<String>,
    client_secret: Option<PathBuf>,
) -> Result<CredentialSource> {
    if let Some(token) = access_token.filter(|token| !token.trim().is_empty()) {
        return Ok(CredentialSource::AccessToken(token.trim().to_string()));
    }
    if let Some(path) = client_secret {
        return Ok(CredentialSource::ClientSecrets(path));
    }

    let candidates = [PathBuf::from(CLIENT_SECRET_NAME), default_client_secret_path()];
    candidates
        .iter()
        .find(|path| path.exists())
        .cloned()
        .map(CredentialSource::ClientSecrets)
        .ok_or_else(|| {
            let searched: Vec<String> = candidates
                .iter()
                .map(|path| path.display().to_string())
                .collect();
            anyhow!(
                "no access token given and no client secrets found (searched: {})",
                searched.join(", ")
            )
        })
}

fn default_client_secret_path() -> PathBuf {
    let mut base = config_dir().unwrap_or_else(|| PathBuf::from("."));
    base.push(APP_DIR);
    base.push(CLIENT_SECRET_NAME);
    base
}
