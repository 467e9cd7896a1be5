//! OAuth2 credentials for the remote sheet.
//!
//! Only the stored-credential path is supported: a client secret file as
//! downloaded for an installed application and a token file produced by an
//! earlier consent flow.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::error::{Result, ToolError};

/// Scope needed to read and write spreadsheet values.
pub const SPREADSHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

/// Supplies an authorized client for the tabular store.
pub trait CredentialProvider {
    fn authorize(&self) -> Result<AuthorizedClient>;
}

/// Client secret entry of a `credentials.json` file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientSecret {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default)]
    pub redirect_uris: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ClientSecretFile {
    installed: Option<ClientSecret>,
    web: Option<ClientSecret>,
}

/// Token persisted after the consent flow.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredToken {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    /// Expiry as milliseconds since the Unix epoch.
    #[serde(default)]
    pub expiry_date: Option<u64>,
}

impl fmt::Debug for StoredToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredToken")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .field("scope", &self.scope)
            .field("token_type", &self.token_type)
            .field("expiry_date", &self.expiry_date)
            .finish()
    }
}

/// Opaque handle proving that credentials and a token were loaded.
#[derive(Debug, Clone)]
pub struct AuthorizedClient {
    client_id: String,
    redirect_uri: String,
    token: StoredToken,
}

impl AuthorizedClient {
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    /// Value for an `Authorization` header.
    pub fn authorization_header(&self) -> String {
        let kind = self.token.token_type.as_deref().unwrap_or("Bearer");
        format!("{kind} {}", self.token.access_token)
    }

    /// Whether the token expired at `now_ms` (milliseconds since the epoch).
    /// Tokens without an expiry never expire.
    pub fn is_expired_at(&self, now_ms: u64) -> bool {
        self.token.expiry_date.is_some_and(|expiry| expiry <= now_ms)
    }

    pub fn can_refresh(&self) -> bool {
        self.token.refresh_token.is_some()
    }

    /// Whether the granted scopes cover spreadsheet access. A token that does
    /// not list its scopes is assumed to cover it.
    pub fn has_spreadsheet_scope(&self) -> bool {
        self.token
            .scope
            .as_deref()
            .is_none_or(|scope| scope.split_whitespace().any(|s| s == SPREADSHEETS_SCOPE))
    }
}

/// Loads credentials from `credentials.json` and `token.json` style files.
#[derive(Debug, Clone)]
pub struct FileCredentialProvider {
    credentials: PathBuf,
    token: PathBuf,
}

impl FileCredentialProvider {
    pub fn new(credentials: impl Into<PathBuf>, token: impl Into<PathBuf>) -> Self {
        Self {
            credentials: credentials.into(),
            token: token.into(),
        }
    }
}

impl CredentialProvider for FileCredentialProvider {
    #[instrument(
        level = "info",
        skip_all,
        fields(credentials = %self.credentials.display(), token = %self.token.display())
    )]
    fn authorize(&self) -> Result<AuthorizedClient> {
        let secret = load_client_secret(&self.credentials)?;
        let redirect_uri = secret.redirect_uris.first().cloned().ok_or_else(|| {
            ToolError::InvalidCredentials("client secret has no redirect URI".into())
        })?;

        if !self.token.exists() {
            return Err(ToolError::MissingToken(self.token.clone()));
        }
        let token: StoredToken = serde_json::from_str(&fs::read_to_string(&self.token)?)?;

        let client = AuthorizedClient {
            client_id: secret.client_id,
            redirect_uri,
            token,
        };

        if client.is_expired_at(now_millis()) {
            if client.can_refresh() {
                info!("stored access token expired, refresh token available");
            } else {
                warn!("stored access token expired and cannot be refreshed");
            }
        }
        if !client.has_spreadsheet_scope() {
            warn!(scope = SPREADSHEETS_SCOPE, "stored token does not grant spreadsheet access");
        }
        info!(client_id = %client.client_id, "client authorized");
        Ok(client)
    }
}

/// Reads the client secret, preferring the `installed` entry over `web`.
pub fn load_client_secret(path: &Path) -> Result<ClientSecret> {
    if !path.exists() {
        return Err(ToolError::MissingCredentials(path.to_path_buf()));
    }
    let file: ClientSecretFile = serde_json::from_str(&fs::read_to_string(path)?)?;
    file.installed.or(file.web).ok_or_else(|| {
        ToolError::InvalidCredentials("expected an 'installed' or 'web' client entry".into())
    })
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write(path: &Path, value: serde_json::Value) {
        fs::write(path, serde_json::to_string(&value).unwrap()).unwrap();
    }

    #[test]
    fn loads_installed_client_and_token() {
        let dir = tempdir().unwrap();
        let credentials = dir.path().join("credentials.json");
        let token = dir.path().join("token.json");
        write(
            &credentials,
            serde_json::json!({
                "installed": {
                    "client_id": "id-123",
                    "client_secret": "s3cret",
                    "redirect_uris": ["urn:ietf:wg:oauth:2.0:oob", "http://localhost"]
                }
            }),
        );
        write(
            &token,
            serde_json::json!({
                "access_token": "ya29.token",
                "refresh_token": "1//refresh",
                "scope": SPREADSHEETS_SCOPE,
                "token_type": "Bearer",
                "expiry_date": 1_000u64
            }),
        );

        let client = FileCredentialProvider::new(&credentials, &token)
            .authorize()
            .unwrap();

        assert_eq!(client.client_id(), "id-123");
        assert_eq!(client.redirect_uri(), "urn:ietf:wg:oauth:2.0:oob");
        assert_eq!(client.authorization_header(), "Bearer ya29.token");
        assert!(client.is_expired_at(1_000));
        assert!(!client.is_expired_at(999));
        assert!(client.can_refresh());
        assert!(client.has_spreadsheet_scope());
        assert!(!format!("{client:?}").contains("ya29"));
    }

    #[test]
    fn missing_files_are_reported_separately() {
        let dir = tempdir().unwrap();
        let credentials = dir.path().join("credentials.json");
        let token = dir.path().join("token.json");

        let error = FileCredentialProvider::new(&credentials, &token)
            .authorize()
            .unwrap_err();
        assert!(matches!(error, ToolError::MissingCredentials(_)));

        write(
            &credentials,
            serde_json::json!({
                "web": { "client_id": "id", "client_secret": "s", "redirect_uris": ["http://x"] }
            }),
        );
        let error = FileCredentialProvider::new(&credentials, &token)
            .authorize()
            .unwrap_err();
        assert!(matches!(error, ToolError::MissingToken(_)));
    }

    #[test]
    fn client_secret_needs_a_redirect_uri() {
        let dir = tempdir().unwrap();
        let credentials = dir.path().join("credentials.json");
        write(
            &credentials,
            serde_json::json!({ "installed": { "client_id": "id", "client_secret": "s" } }),
        );

        let error = FileCredentialProvider::new(&credentials, dir.path().join("token.json"))
            .authorize()
            .unwrap_err();
        assert!(matches!(error, ToolError::InvalidCredentials(_)));
    }
}
