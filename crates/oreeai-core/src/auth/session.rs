use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::token::{decode_token_claims, TokenClaims};
use crate::api::client::email_local_part;

/// Session file name in the config directory
const SESSION_FILE: &str = "session.json";

/// The signed-in client as shown in the header bar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: String,
    pub email: String,
    pub name: String,
}

impl SessionUser {
    pub fn from_claims(claims: &TokenClaims) -> Self {
        let email = claims.email.clone().unwrap_or_default();
        let name = claims
            .company_name
            .clone()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| email_local_part(&email));
        Self {
            id: claims.client_id().unwrap_or_else(|| "unknown".to_string()),
            email,
            name,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionData {
    pub token: String,
    pub user: SessionUser,
    pub created_at: DateTime<Utc>,
}

impl SessionData {
    /// Expired when the token's `exp` claim has passed. Tokens whose payload
    /// cannot be read are treated as expired.
    pub fn is_expired(&self) -> bool {
        decode_token_claims(&self.token)
            .map(|claims| claims.is_expired())
            .unwrap_or(true)
    }
}

pub struct Session {
    config_dir: PathBuf,
    pub data: Option<SessionData>,
}

impl Session {
    pub fn new(config_dir: PathBuf) -> Self {
        Self {
            config_dir,
            data: None,
        }
    }

    /// Load session from disk.
    ///
    /// A stored token that is expired or undecodable is deleted. The user is
    /// rebuilt from the token claims so it always matches the token.
    pub fn load(&mut self) -> Result<bool> {
        let path = self.session_path();
        if !path.exists() {
            return Ok(false);
        }
        let contents = std::fs::read_to_string(&path).context("Failed to read session file")?;
        let data: SessionData =
            serde_json::from_str(&contents).context("Failed to parse session file")?;

        match decode_token_claims(&data.token) {
            Some(claims) if !claims.is_expired() => {
                debug!(client_id = ?claims.client_id(), "Restored session");
                self.data = Some(SessionData {
                    user: SessionUser::from_claims(&claims),
                    ..data
                });
                Ok(true)
            }
            _ => {
                info!("Stored session expired or unreadable, removing");
                self.clear()?;
                Ok(false)
            }
        }
    }

    /// Save session to disk
    pub fn save(&self) -> Result<()> {
        if let Some(ref data) = self.data {
            let path = self.session_path();
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let contents = serde_json::to_string_pretty(data)?;
            std::fs::write(path, contents)?;
        }
        Ok(())
    }

    /// Clear session data
    pub fn clear(&mut self) -> Result<()> {
        self.data = None;
        let path = self.session_path();
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }

    /// Update session with new data
    pub fn update(&mut self, data: SessionData) {
        self.data = Some(data);
    }

    /// Get the bearer token if a session exists
    pub fn token(&self) -> Option<&str> {
        self.data.as_ref().map(|d| d.token.as_str())
    }

    pub fn user(&self) -> Option<&SessionUser> {
        self.data.as_ref().map(|d| &d.user)
    }

    /// Check if session is valid (exists and not expired)
    pub fn is_valid(&self) -> bool {
        self.data.as_ref().map(|d| !d.is_expired()).unwrap_or(false)
    }

    fn session_path(&self) -> PathBuf {
        self.config_dir.join(SESSION_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::token::encode_test_token;
    use serde_json::json;

    fn session_with(token: String) -> SessionData {
        SessionData {
            token,
            user: SessionUser {
                id: "stale".into(),
                email: "stale@x.io".into(),
                name: "Stale".into(),
            },
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_user_from_claims() {
        let claims = TokenClaims {
            email: Some("ana@acme.com".into()),
            ..Default::default()
        };
        let user = SessionUser::from_claims(&claims);
        assert_eq!(user.id, "unknown");
        assert_eq!(user.name, "ana");
    }

    #[test]
    fn test_save_and_load_rebuilds_user() {
        let dir = tempfile::tempdir().unwrap();
        let token = encode_test_token(&json!({
            "client_id": "c-1", "email": "ops@acme.com", "company_name": "Acme", "exp": 4102444800u64
        }));

        let mut session = Session::new(dir.path().to_path_buf());
        session.update(session_with(token.clone()));
        session.save().unwrap();

        let mut restored = Session::new(dir.path().to_path_buf());
        assert!(restored.load().unwrap());
        assert_eq!(restored.token(), Some(token.as_str()));
        let user = restored.user().unwrap();
        assert_eq!(user.id, "c-1");
        assert_eq!(user.name, "Acme");
        assert!(restored.is_valid());
    }

    #[test]
    fn test_expired_token_is_removed() {
        let dir = tempfile::tempdir().unwrap();
        let token = encode_test_token(&json!({ "client_id": 1, "exp": 1000 }));

        let mut session = Session::new(dir.path().to_path_buf());
        session.update(session_with(token));
        session.save().unwrap();
        assert!(dir.path().join(SESSION_FILE).exists());

        let mut restored = Session::new(dir.path().to_path_buf());
        assert!(!restored.load().unwrap());
        assert!(restored.data.is_none());
        assert!(!dir.path().join(SESSION_FILE).exists());
    }

    #[test]
    fn test_garbage_token_is_removed() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = Session::new(dir.path().to_path_buf());
        session.update(session_with("opaque".into()));
        assert!(!session.is_valid());
        session.save().unwrap();

        let mut restored = Session::new(dir.path().to_path_buf());
        assert!(!restored.load().unwrap());
        assert!(!dir.path().join(SESSION_FILE).exists());
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = Session::new(dir.path().to_path_buf());
        assert!(!session.load().unwrap());
        session.clear().unwrap();
    }
}
