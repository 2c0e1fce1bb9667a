//! Authorization for the playlist API.
//!
//! Two collaborators implement [`Authenticator`]: [`StaticToken`] for a token
//! issued elsewhere, and [`InstalledAppFlow`] for the OAuth 2.0 installed
//! application flow with a loopback redirect. The loopback listener speaks
//! plain HTTP on `127.0.0.1`; that detail stays inside this module.

use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::Deserialize;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tracing::{debug, info, instrument};
use url::Url;

use crate::errors::AuthError;

pub const YOUTUBE_SCOPE: &str = "https://www.googleapis.com/auth/youtube";
pub const DEFAULT_REDIRECT_PORT: u16 = 8080;

const CALLBACK_RESPONSE: &str = "<!doctype html>\n<html><head><title>Authorized</title></head>\
<body><h1>Authorization complete.</h1><p>You can close this window.</p></body></html>";

/// Bearer token for the playlist API. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authorize(&self) -> Result<AccessToken, AuthError>;
}

/// A token obtained outside this program.
#[derive(Debug, Clone)]
pub struct StaticToken(AccessToken);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(AccessToken::new(token))
    }
}

#[async_trait]
impl Authenticator for StaticToken {
    async fn authorize(&self) -> Result<AccessToken, AuthError> {
        if self.0.secret().trim().is_empty() {
            return Err(AuthError::MissingCredentials(
                "access token is empty".to_string(),
            ));
        }
        Ok(self.0.clone())
    }
}

/// The `installed` (or `web`) section of a Google client secrets file.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientSecrets {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_auth_uri() -> String {
    "https://accounts.google.com/o/oauth2/auth".to_string()
}

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

#[derive(Debug, Deserialize)]
struct ClientSecretsFile {
    installed: Option<ClientSecrets>,
    web: Option<ClientSecrets>,
}

impl ClientSecrets {
    pub fn from_json(content: &str) -> Result<Self, AuthError> {
        let file: ClientSecretsFile = serde_json::from_str(content)
            .map_err(|err| AuthError::InvalidSecrets(err.to_string()))?;
        file.installed.or(file.web).ok_or_else(|| {
            AuthError::InvalidSecrets("expected an `installed` or `web` section".to_string())
        })
    }

    pub fn load(path: &Path) -> Result<Self, AuthError> {
        if !path.exists() {
            return Err(AuthError::MissingCredentials(format!(
                "client secrets file not found: {}",
                path.display()
            )));
        }
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

pub type AuthorizeUrlCallback = Arc<dyn Fn(&str) + Send + Sync + 'static>;

/// OAuth 2.0 authorization code flow for installed applications.
#[derive(Clone)]
pub struct InstalledAppFlow {
    secrets: ClientSecrets,
    port: u16,
    scopes: Vec<String>,
    timeout: Duration,
    on_authorize_url: Option<AuthorizeUrlCallback>,
}

impl InstalledAppFlow {
    pub fn new(secrets: ClientSecrets) -> Self {
        Self {
            secrets,
            port: DEFAULT_REDIRECT_PORT,
            scopes: vec![YOUTUBE_SCOPE.to_string()],
            timeout: Duration::from_secs(30),
            on_authorize_url: None,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Called with the consent URL the operator must open.
    pub fn on_authorize_url(mut self, callback: AuthorizeUrlCallback) -> Self {
        self.on_authorize_url = Some(callback);
        self
    }

    pub fn redirect_uri(&self) -> String {
        format!("http://127.0.0.1:{}/", self.port)
    }

    pub fn authorization_url(&self, state: &str) -> Result<Url, AuthError> {
        Url::parse_with_params(
            &self.secrets.auth_uri,
            &[
                ("client_id", self.secrets.client_id.as_str()),
                ("redirect_uri", self.redirect_uri().as_str()),
                ("response_type", "code"),
                ("scope", self.scopes.join(" ").as_str()),
                ("access_type", "offline"),
                ("prompt", "select_account"),
                ("state", state),
            ],
        )
        .map_err(|err| AuthError::InvalidSecrets(format!("auth_uri is invalid: {err}")))
    }

    async fn wait_for_code(&self, listener: TcpListener, state: &str) -> Result<String, AuthError> {
        loop {
            let (mut stream, peer) = listener.accept().await?;
            let mut buffer = vec![0u8; 8192];
            let read = stream.read(&mut buffer).await?;
            let request = String::from_utf8_lossy(&buffer[..read]);
            let request_line = request.lines().next().unwrap_or_default();
            debug!(%peer, "received redirect request");

            match parse_callback(request_line, state) {
                Ok(None) => {
                    let response = "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n";
                    stream.write_all(response.as_bytes()).await?;
                }
                outcome => {
                    let response = format!(
                        "HTTP/1.1 200 OK\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                        CALLBACK_RESPONSE.len(),
                        CALLBACK_RESPONSE
                    );
                    stream.write_all(response.as_bytes()).await?;
                    stream.shutdown().await.ok();
                    if let Some(code) = outcome? {
                        return Ok(code);
                    }
                }
            }
        }
    }

    async fn exchange_code(&self, code: &str) -> Result<AccessToken, AuthError> {
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|err| AuthError::TokenExchange(err.to_string()))?;
        let redirect_uri = self.redirect_uri();
        let response = client
            .post(&self.secrets.token_uri)
            .form(&[
                ("code", code),
                ("client_id", self.secrets.client_id.as_str()),
                ("client_secret", self.secrets.client_secret.as_str()),
                ("redirect_uri", redirect_uri.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .map_err(|err| AuthError::TokenExchange(err.to_string()))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|err| AuthError::TokenExchange(err.to_string()))?;
        if !status.is_success() {
            let message = match serde_json::from_slice::<TokenErrorResponse>(&bytes) {
                Ok(body) => match body.error_description {
                    Some(description) => format!("{}: {description}", body.error),
                    None => body.error,
                },
                Err(_) => format!("HTTP {status}"),
            };
            return Err(AuthError::TokenExchange(message));
        }
        let token: TokenResponse = serde_json::from_slice(&bytes)
            .map_err(|err| AuthError::TokenExchange(format!("malformed token response: {err}")))?;
        Ok(AccessToken::new(token.access_token))
    }
}

#[async_trait]
impl Authenticator for InstalledAppFlow {
    #[instrument(skip(self), fields(port = self.port))]
    async fn authorize(&self) -> Result<AccessToken, AuthError> {
        let state: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(32)
            .map(char::from)
            .collect();
        let url = self.authorization_url(&state)?;
        let listener = TcpListener::bind(("127.0.0.1", self.port)).await?;

        info!("waiting for OAuth redirect");
        if let Some(callback) = &self.on_authorize_url {
            callback(url.as_str());
        }

        let code = self.wait_for_code(listener, &state).await?;
        let token = self.exchange_code(&code).await?;
        info!("authorization complete");
        Ok(token)
    }
}

/// Reads the redirect request line.
///
/// `Ok(None)` means the request is not the redirect (favicon and the like).
fn parse_callback(request_line: &str, expected_state: &str) -> Result<Option<String>, AuthError> {
    let mut parts = request_line.split_whitespace();
    let (Some("GET"), Some(target)) = (parts.next(), parts.next()) else {
        return Ok(None);
    };
    let url = Url::parse(&format!("http://localhost{target}"))
        .map_err(|err| AuthError::Callback(format!("malformed redirect: {err}")))?;

    let mut code = None;
    let mut state = None;
    let mut error = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.into_owned()),
            "state" => state = Some(value.into_owned()),
            "error" => error = Some(value.into_owned()),
            _ => {}
        }
    }

    if code.is_none() && error.is_none() {
        return Ok(None);
    }
    if state.as_deref() != Some(expected_state) {
        return Err(AuthError::Callback("state parameter mismatch".to_string()));
    }
    if let Some(error) = error {
        return Err(AuthError::Denied(error));
    }
    Ok(code)
}
