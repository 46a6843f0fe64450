//! Durable session persistence
//!
//! The session record lives in a single cookie whose value is the JSON
//! encoding of [`Session`], URL-encoded. Storage is split in two layers:
//! [`CookieJar`] is the medium (memory, a file on disk, a browser jar) and
//! [`SessionRepository`] is the port the credential store talks to.
//!
//! Reading never fails. A missing, expired, malformed or otherwise
//! undecodable value is reported as "no session".

use crate::config::AuthConfig;
use crate::error::CoreResult;
use crate::session::{Role, Session};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::ffi::OsString;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};
use tracing::{debug, warn};

/// A single cookie as held by a jar
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCookie {
    pub name: String,
    pub value: String,
    pub expires_at: DateTime<Utc>,
}

impl StoredCookie {
    /// Create a cookie expiring `days` from now
    pub fn expiring_in_days(name: impl Into<String>, value: impl Into<String>, days: i64) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            expires_at: Utc::now() + Duration::days(days),
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// `name=value` pair as sent in a `Cookie` request header
    pub fn to_cookie_pair(&self) -> String {
        format!("{}={}", self.name, self.value)
    }
}

/// Storage medium for cookies
pub trait CookieJar: Send + Sync {
    /// Value of a live (non-expired) cookie
    fn get(&self, name: &str) -> Option<String>;

    /// Insert or overwrite a cookie
    fn set(&self, cookie: StoredCookie) -> CoreResult<()>;

    /// Remove a cookie; removing an absent cookie is not an error
    fn remove(&self, name: &str) -> CoreResult<()>;
}

/// Process-local cookie jar
#[derive(Debug, Default)]
pub struct MemoryCookieJar {
    cookies: Mutex<HashMap<String, StoredCookie>>,
}

impl MemoryCookieJar {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CookieJar for MemoryCookieJar {
    fn get(&self, name: &str) -> Option<String> {
        let cookies = self.cookies.lock().unwrap_or_else(PoisonError::into_inner);
        cookies
            .get(name)
            .filter(|cookie| !cookie.is_expired_at(Utc::now()))
            .map(|cookie| cookie.value.clone())
    }

    fn set(&self, cookie: StoredCookie) -> CoreResult<()> {
        let mut cookies = self.cookies.lock().unwrap_or_else(PoisonError::into_inner);
        cookies.insert(cookie.name.clone(), cookie);
        Ok(())
    }

    fn remove(&self, name: &str) -> CoreResult<()> {
        let mut cookies = self.cookies.lock().unwrap_or_else(PoisonError::into_inner);
        cookies.remove(name);
        Ok(())
    }
}

/// Cookie jar persisted as a JSON file, surviving process restarts
#[derive(Debug)]
pub struct FileCookieJar {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileCookieJar {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    fn read_all(&self) -> HashMap<String, StoredCookie> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return HashMap::new(),
            Err(e) => {
                warn!(path = %self.path.display(), "Failed to read cookie jar: {e}");
                return HashMap::new();
            }
        };

        serde_json::from_str(&content).unwrap_or_else(|e| {
            warn!(path = %self.path.display(), "Ignoring corrupted cookie jar: {e}");
            HashMap::new()
        })
    }

    /// Sibling file the next jar is written to before it replaces the old one
    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_else(|| OsString::from("cookies"));
        name.push(".next");
        self.path.with_file_name(name)
    }

    fn write_all(&self, cookies: &HashMap<String, StoredCookie>) -> CoreResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(cookies)?;

        // A crash mid-write must leave the previous jar intact
        let staging = self.staging_path();
        {
            let mut file = File::create(&staging)?;
            file.write_all(content.as_bytes())?;
            file.sync_all()?;
        }
        std::fs::rename(&staging, &self.path)?;
        Ok(())
    }
}

impl CookieJar for FileCookieJar {
    fn get(&self, name: &str) -> Option<String> {
        self.read_all()
            .remove(name)
            .filter(|cookie| !cookie.is_expired_at(Utc::now()))
            .map(|cookie| cookie.value)
    }

    fn set(&self, cookie: StoredCookie) -> CoreResult<()> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut cookies = self.read_all();
        cookies.insert(cookie.name.clone(), cookie);
        self.write_all(&cookies)
    }

    fn remove(&self, name: &str) -> CoreResult<()> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut cookies = self.read_all();
        if cookies.remove(name).is_some() {
            self.write_all(&cookies)?;
        }
        Ok(())
    }
}

/// Port between the credential store and its storage medium
pub trait SessionRepository: Send + Sync {
    /// Last persisted session, `None` if absent or unreadable
    fn load(&self) -> Option<Session>;

    /// Overwrite the persisted session
    fn save(&self, session: &Session) -> CoreResult<()>;

    /// Remove the persisted session
    fn clear(&self) -> CoreResult<()>;
}

/// Encode a session the way it is stored in the cookie
pub fn encode_session_cookie(session: &Session) -> CoreResult<String> {
    let json = serde_json::to_string(session)?;
    Ok(urlencoding::encode(&json).into_owned())
}

/// Decode a raw cookie value into a session
pub fn decode_session_cookie(raw: &str) -> Option<Session> {
    let json = match urlencoding::decode(raw) {
        Ok(json) => json,
        Err(e) => {
            debug!("Session cookie is not valid UTF-8 after decoding: {e}");
            return None;
        }
    };

    match serde_json::from_str(&json) {
        Ok(session) => Some(session),
        Err(e) => {
            debug!("Session cookie does not hold a session record: {e}");
            None
        }
    }
}

#[derive(Deserialize)]
struct RoleClaim {
    role: Role,
}

/// Decode only the role out of a raw cookie value
///
/// Anything other than one of the known role tags yields `None`.
pub fn decode_role(raw: &str) -> Option<Role> {
    let json = urlencoding::decode(raw).ok()?;
    serde_json::from_str::<RoleClaim>(&json)
        .map(|claim| claim.role)
        .ok()
}

/// Session repository backed by a cookie jar
pub struct CookieSessionRepository<J> {
    jar: J,
}

impl<J: CookieJar> CookieSessionRepository<J> {
    /// Repository using the standard session cookie and lifetime
    pub fn new(jar: J) -> Self {
        Self { jar }
    }

    /// Raw, still encoded cookie value
    pub fn raw_value(&self) -> Option<String> {
        self.jar.get(AuthConfig::SESSION_COOKIE)
    }

    pub fn jar(&self) -> &J {
        &self.jar
    }
}

impl<J: CookieJar> SessionRepository for CookieSessionRepository<J> {
    fn load(&self) -> Option<Session> {
        self.raw_value().as_deref().and_then(decode_session_cookie)
    }

    fn save(&self, session: &Session) -> CoreResult<()> {
        let value = encode_session_cookie(session)?;
        self.jar.set(StoredCookie::expiring_in_days(
            AuthConfig::SESSION_COOKIE,
            value,
            AuthConfig::SESSION_COOKIE_DAYS,
        ))
    }

    fn clear(&self) -> CoreResult<()> {
        self.jar.remove(AuthConfig::SESSION_COOKIE)
    }
}

/// In-memory repository with no encoding step
#[derive(Debug, Default)]
pub struct MemorySessionRepository {
    session: Mutex<Option<Session>>,
}

impl MemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionRepository for MemorySessionRepository {
    fn load(&self) -> Option<Session> {
        self.session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn save(&self, session: &Session) -> CoreResult<()> {
        *self.session.lock().unwrap_or_else(PoisonError::into_inner) = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> CoreResult<()> {
        *self.session.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}
