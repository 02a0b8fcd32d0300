//! Session state over an injected token store.
//!
//! The store is a capability: the browser build hands in `localStorage`,
//! the CLI a file under the config directory, tests a hash map. The
//! session itself never touches a global and never reads a clock; expiry
//! checks take `now` from the caller.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;

use crate::error::SessionError;

/// Storage key for the bearer token.
pub const TOKEN_KEY: &str = "beejak_token";
/// Storage key for the signed-in user profile.
pub const PROFILE_KEY: &str = "beejak_user";

/// Minimal key-value storage the session persists itself into.
pub trait TokenStore {
    fn get(&self, key: &str) -> Result<Option<String>, SessionError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), SessionError>;
    fn remove(&mut self, key: &str) -> Result<(), SessionError>;
}

/// In-memory store for tests and short-lived tools.
#[derive(Debug, Default, Clone)]
pub struct MemoryTokenStore {
    entries: HashMap<String, String>,
}

impl TokenStore for MemoryTokenStore {
    fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), SessionError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), SessionError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// The signed-in user as returned by the backend on login.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

#[derive(Deserialize)]
struct Claims {
    exp: Option<i64>,
}

/// Decode the `exp` claim of a JWT without verifying its signature.
///
/// Returns `Ok(None)` for a well-formed token that carries no expiry.
pub fn decode_expiry(token: &str) -> Result<Option<i64>, SessionError> {
    let mut parts = token.split('.');
    let payload = match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(_), Some(payload), Some(_), None) => payload,
        _ => return Err(SessionError::MalformedToken),
    };
    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|_| SessionError::MalformedToken)?;
    let claims: Claims =
        serde_json::from_slice(&bytes).map_err(|_| SessionError::MalformedToken)?;
    Ok(claims.exp)
}

/// Authentication state persisted in a [`TokenStore`].
#[derive(Debug)]
pub struct Session<S: TokenStore> {
    store: S,
}

impl<S: TokenStore> Session<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// The stored bearer token, if any.
    pub fn token(&self) -> Result<Option<String>, SessionError> {
        self.store.get(TOKEN_KEY)
    }

    /// The stored user profile, if any.
    pub fn user(&self) -> Result<Option<UserProfile>, SessionError> {
        match self.store.get(PROFILE_KEY)? {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|e| SessionError::CorruptProfile(e.to_string())),
            None => Ok(None),
        }
    }

    /// Persist a fresh login.
    pub fn login(&mut self, token: &str, user: &UserProfile) -> Result<(), SessionError> {
        let profile =
            serde_json::to_string(user).map_err(|e| SessionError::Storage(e.to_string()))?;
        self.store.set(TOKEN_KEY, token)?;
        self.store.set(PROFILE_KEY, &profile)?;
        debug!("Stored session for user {}", user.email);
        Ok(())
    }

    /// Drop token and profile. Used on logout and on a 401 from the API.
    pub fn clear(&mut self) -> Result<(), SessionError> {
        self.store.remove(TOKEN_KEY)?;
        self.store.remove(PROFILE_KEY)?;
        Ok(())
    }

    /// Whether a token is stored at all.
    pub fn is_authenticated(&self) -> Result<bool, SessionError> {
        Ok(self.token()?.is_some())
    }

    /// Whether the stored token is expired at `now` (Unix seconds).
    ///
    /// A missing token counts as expired; a token without an `exp` claim
    /// never expires. Only a malformed token is an error.
    pub fn is_expired(&self, now: i64) -> Result<bool, SessionError> {
        match self.token()? {
            None => Ok(true),
            Some(token) => match decode_expiry(&token)? {
                Some(exp) => Ok(exp <= now),
                None => Ok(false),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn token_with_claims(claims: &str) -> String {
        format!(
            "{}.{}.{}",
            URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#),
            URL_SAFE_NO_PAD.encode(claims),
            URL_SAFE_NO_PAD.encode("sig")
        )
    }

    fn test_user() -> UserProfile {
        UserProfile {
            id: Uuid::new_v4(),
            name: "Asha Patel".to_string(),
            email: "asha@beejak.example".to_string(),
        }
    }

    #[test]
    fn test_login_roundtrip() {
        let mut session = Session::new(MemoryTokenStore::default());
        let user = test_user();
        let token = token_with_claims(r#"{"exp": 2000000000}"#);

        session.login(&token, &user).unwrap();

        assert!(session.is_authenticated().unwrap());
        assert_eq!(session.token().unwrap(), Some(token));
        assert_eq!(session.user().unwrap(), Some(user));
    }

    #[test]
    fn test_clear_removes_everything() {
        let mut session = Session::new(MemoryTokenStore::default());
        session
            .login(&token_with_claims(r#"{"exp": 2000000000}"#), &test_user())
            .unwrap();

        session.clear().unwrap();

        assert!(!session.is_authenticated().unwrap());
        assert_eq!(session.user().unwrap(), None);
    }

    #[test]
    fn test_expiry_against_injected_clock() {
        let mut session = Session::new(MemoryTokenStore::default());
        session
            .login(&token_with_claims(r#"{"exp": 1700000000}"#), &test_user())
            .unwrap();

        assert!(!session.is_expired(1699999999).unwrap());
        assert!(session.is_expired(1700000000).unwrap());
        assert!(session.is_expired(1800000000).unwrap());
    }

    #[test]
    fn test_token_without_exp_never_expires() {
        let mut session = Session::new(MemoryTokenStore::default());
        session
            .login(&token_with_claims(r#"{"sub": "user-1"}"#), &test_user())
            .unwrap();

        assert!(!session.is_expired(i64::MAX).unwrap());
    }

    #[test]
    fn test_missing_token_counts_as_expired() {
        let session = Session::new(MemoryTokenStore::default());
        assert!(session.is_expired(0).unwrap());
    }

    #[test]
    fn test_malformed_tokens_are_errors() {
        assert!(matches!(
            decode_expiry("only-one-part"),
            Err(SessionError::MalformedToken)
        ));
        assert!(matches!(
            decode_expiry("two.parts"),
            Err(SessionError::MalformedToken)
        ));
        assert!(matches!(
            decode_expiry("a.!!!not-base64!!!.c"),
            Err(SessionError::MalformedToken)
        ));

        let not_json = format!("a.{}.c", URL_SAFE_NO_PAD.encode("plain text"));
        assert!(matches!(
            decode_expiry(&not_json),
            Err(SessionError::MalformedToken)
        ));
    }

    #[test]
    fn test_corrupt_profile_is_an_error() {
        let mut store = MemoryTokenStore::default();
        store.set(PROFILE_KEY, "{not json").unwrap();
        let session = Session::new(store);

        assert!(matches!(
            session.user(),
            Err(SessionError::CorruptProfile(_))
        ));
    }
}
