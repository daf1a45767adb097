use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use wiki_shared::User;

use super::{ApiError, IdentityService};

/// Signed-in user plus the bearer token every authenticated call carries.
/// Passed explicitly to each store call.
#[derive(Debug, Clone)]
pub struct Session {
    token: String,
    user: User,
}

impl Session {
    pub fn new(token: String, user: User) -> Self {
        Self { token, user }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn user(&self) -> &User {
        &self.user
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredToken {
    token: String,
}

/// The single "current token" slot kept across runs
#[derive(Debug, Clone)]
pub struct TokenSlot {
    path: PathBuf,
}

impl TokenSlot {
    /// Slot in the user's config directory
    pub fn default_location() -> Result<Self> {
        let config_dir = dirs::config_dir()
            .context("Could not find config directory")?
            .join("wiki");

        Ok(Self::at(config_dir.join("auth.json")))
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the token from disk
    pub fn load(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&self.path)
            .context("Could not read auth file")?;

        let stored: StoredToken = serde_json::from_str(&contents)
            .context("Could not parse auth file")?;

        Ok(Some(stored.token))
    }

    /// Save the token to disk, replacing any previous one
    pub fn save(&self, token: &str) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)
                .context("Could not create config directory")?;
        }

        let contents = serde_json::to_string_pretty(&StoredToken {
            token: token.to_string(),
        })
        .context("Could not serialize token")?;

        fs::write(&self.path, contents)
            .context("Could not write auth file")?;

        Ok(())
    }

    /// Delete the stored token
    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)
                .context("Could not delete auth file")?;
        }

        Ok(())
    }
}

/// JWT payload claims we need for expiry checking
#[derive(Deserialize)]
struct JwtClaims {
    exp: i64,
}

/// Decode JWT payload and extract expiration time
fn decode_token_exp(token: &str) -> Option<i64> {
    // JWT format: header.payload.signature
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return None;
    }

    let payload = URL_SAFE_NO_PAD.decode(parts[1]).ok()?;
    let claims: JwtClaims = serde_json::from_slice(&payload).ok()?;

    Some(claims.exp)
}

/// Whether the token is past its `exp` claim. Tokens we cannot decode are
/// left for the server to judge.
pub fn token_expired(token: &str, now: DateTime<Utc>) -> bool {
    decode_token_exp(token).is_some_and(|exp| exp <= now.timestamp())
}

/// Rebuild the session from the stored token, if it is still accepted.
/// Any failure to confirm the token removes it from the slot. A rejected
/// token means signed out; other failures are still returned.
pub async fn resume<I>(identity: &I, slot: &TokenSlot) -> Result<Option<Session>, ApiError>
where
    I: IdentityService + ?Sized,
{
    let Some(token) = slot.load()? else {
        return Ok(None);
    };

    if token_expired(&token, Utc::now()) {
        tracing::info!("stored token expired");
        slot.clear()?;
        return Ok(None);
    }

    match identity.me(&token).await {
        Ok(user) => Ok(Some(Session::new(token, user))),
        Err(err) => {
            tracing::info!("stored token not confirmed: {}", err);
            slot.clear()?;
            if err.is_unauthorized() {
                Ok(None)
            } else {
                Err(err)
            }
        }
    }
}
