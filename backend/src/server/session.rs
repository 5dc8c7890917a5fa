//! Session cookie settings: signing key, `Secure` flag and SameSite policy.
//!
//! Release builds insist on a real key file and a coherent cookie policy;
//! debug builds fall back to a generated key and log what they assumed.

use std::path::{Path, PathBuf};

use actix_web::cookie::{Key, SameSite};
use sha2::{Digest, Sha256};
use tracing::{info, warn};
use zeroize::Zeroize;

use super::settings::AppSettings;

/// Below this, `Key::derive_from` refuses the material.
const SESSION_KEY_HARD_MIN_LEN: usize = 32;
const SESSION_KEY_RELEASE_MIN_LEN: usize = 64;
const SAMESITE_EXPECTED: &str = "Strict|Lax|None";
const FINGERPRINT_BYTES: usize = 8;

/// Build mode for session configuration validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    Debug,
    Release,
}

impl BuildMode {
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    fn is_debug(self) -> bool {
        matches!(self, Self::Debug)
    }
}

/// Validated cookie session settings.
pub struct SessionSettings {
    pub key: Key,
    pub cookie_secure: bool,
    pub same_site: SameSite,
}

/// Errors raised while validating session configuration.
#[derive(thiserror::Error, Debug)]
pub enum SessionConfigError {
    #[error("invalid value for same_site='{value}'; expected {expected}")]
    InvalidSameSite {
        value: String,
        expected: &'static str,
    },
    #[error("failed to read session key at {path}: {source}")]
    KeyRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("session key at {path} too short: need >= {min_len} bytes, got {length}")]
    KeyTooShort {
        path: PathBuf,
        length: usize,
        min_len: usize,
    },
    #[error("same_site=None requires cookie_secure")]
    InsecureSameSiteNone,
    #[error("session_allow_ephemeral must be false in release builds")]
    EphemeralNotAllowed,
}

/// Derive session settings from the loaded application settings.
pub fn session_settings(
    settings: &AppSettings,
    mode: BuildMode,
) -> Result<SessionSettings, SessionConfigError> {
    if settings.session_allow_ephemeral && !mode.is_debug() {
        return Err(SessionConfigError::EphemeralNotAllowed);
    }
    let cookie_secure = settings.cookie_secure;
    let same_site = parse_same_site(settings.same_site.as_deref(), cookie_secure, mode)?;
    let key = load_key(
        &settings.session_key_file(),
        settings.session_allow_ephemeral,
        mode,
    )?;
    info!(fingerprint = %key_fingerprint(&key), "session key loaded");
    Ok(SessionSettings {
        key,
        cookie_secure,
        same_site,
    })
}

fn parse_same_site(
    value: Option<&str>,
    cookie_secure: bool,
    mode: BuildMode,
) -> Result<SameSite, SessionConfigError> {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(SameSite::Lax);
    };
    match value.to_ascii_lowercase().as_str() {
        "lax" => Ok(SameSite::Lax),
        "strict" => Ok(SameSite::Strict),
        "none" if cookie_secure => Ok(SameSite::None),
        "none" if mode.is_debug() => {
            warn!("same_site=None without cookie_secure; browsers may reject the cookie");
            Ok(SameSite::None)
        }
        "none" => Err(SessionConfigError::InsecureSameSiteNone),
        _ => Err(SessionConfigError::InvalidSameSite {
            value: value.to_owned(),
            expected: SAMESITE_EXPECTED,
        }),
    }
}

fn load_key(path: &Path, allow_ephemeral: bool, mode: BuildMode) -> Result<Key, SessionConfigError> {
    match std::fs::read(path) {
        Ok(mut bytes) => {
            let length = bytes.len();
            let min_len = if mode.is_debug() {
                SESSION_KEY_HARD_MIN_LEN
            } else {
                SESSION_KEY_RELEASE_MIN_LEN
            };
            if length < min_len {
                bytes.zeroize();
                return Err(SessionConfigError::KeyTooShort {
                    path: path.to_path_buf(),
                    length,
                    min_len,
                });
            }
            let key = Key::derive_from(&bytes);
            bytes.zeroize();
            Ok(key)
        }
        Err(error) if mode.is_debug() || allow_ephemeral => {
            warn!(
                path = %path.display(),
                error = %error,
                "using temporary session key (dev only)"
            );
            Ok(Key::generate())
        }
        Err(error) => Err(SessionConfigError::KeyRead {
            path: path.to_path_buf(),
            source: error,
        }),
    }
}

/// Truncated SHA-256 of the signing key, safe to log.
#[must_use]
pub fn key_fingerprint(key: &Key) -> String {
    let digest = Sha256::digest(key.signing());
    hex::encode(&digest[..FINGERPRINT_BYTES])
}
