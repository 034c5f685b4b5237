//! Client session mirror.
//!
//! A display-only copy of the signed-in user kept in a script-readable
//! cookie: URL-escaped base64 of `{id, name, email, role, avatarUrl}`. It
//! personalizes navigation and pre-fills forms. Nothing reads it to make an
//! access decision; the token cookie and the gate do that.

mod jar;
pub mod navigation;
mod observers;

use std::sync::Arc;

use base64::{Engine, engine::general_purpose::STANDARD};
#[cfg(feature = "wasm")]
pub use jar::DocumentJar;
pub use jar::{CookieJar, MemoryJar};
pub use observers::{SESSION_UPDATED_EVENT, SessionChange, SessionObservers, Subscription};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tower_cookies::{
    Cookie,
    cookie::{SameSite, time::Duration as CookieDuration},
};

use crate::{
    config::SessionCookieConfig,
    models::{Role, UserView},
};

/// The mirrored identity. Every field is display data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub avatar_url: String,
}

impl SessionUser {
    /// Build from a loosely-shaped user object.
    ///
    /// Accepts `id` or the legacy `_id`; missing or falsy fields become
    /// empty strings. The role is upper-cased (numbers and booleans are
    /// stringified first) and defaults to `STUDENT`. Returns `None` for a
    /// falsy `user`.
    pub fn from_user_value(user: &Value) -> Option<Self> {
        if !is_truthy(user) {
            return None;
        }
        let field = |name: &str| user.get(name).and_then(scalar_string);

        Some(Self {
            id: field("id").or_else(|| field("_id")).unwrap_or_default(),
            name: field("name").unwrap_or_default(),
            email: field("email").unwrap_or_default(),
            role: user
                .get("role")
                .and_then(Role::normalize)
                .unwrap_or_else(|| Role::Student.as_str().to_string()),
            avatar_url: field("avatarUrl").unwrap_or_default(),
        })
    }

    pub fn from_view(view: &UserView) -> Self {
        Self {
            id: view.id.to_string(),
            name: view.name.clone(),
            email: view.email.clone(),
            role: view.role.as_str().to_string(),
            avatar_url: view.avatar_url.clone(),
        }
    }

    /// The mirrored role, if it names one. Display use only.
    pub fn role(&self) -> Option<Role> {
        Role::parse(&self.role)
    }
}

/// JavaScript truthiness for JSON values.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Truthy strings as-is, truthy numbers and booleans stringified.
fn scalar_string(value: &Value) -> Option<String> {
    if !is_truthy(value) {
        return None;
    }
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// URL-escaped standard base64 of the JSON form.
pub fn encode(user: &SessionUser) -> Result<String, serde_json::Error> {
    let json = serde_json::to_vec(user)?;
    Ok(urlencoding::encode(&STANDARD.encode(json)).into_owned())
}

/// Reverse [`encode`]. Any failure is logged and yields `None`.
pub fn decode(raw: &str) -> Option<SessionUser> {
    let unescaped = match urlencoding::decode(raw) {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!(error = %e, "Unable to read session: bad URL escaping");
            return None;
        }
    };
    let bytes = match STANDARD.decode(unescaped.as_bytes()) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(error = %e, "Unable to read session: bad base64");
            return None;
        }
    };
    match serde_json::from_slice(&bytes) {
        Ok(user) => Some(user),
        Err(e) => {
            tracing::warn!(error = %e, "Unable to read session: bad JSON");
            None
        }
    }
}

/// Reads and writes the advisory cookie and tells listeners about changes.
///
/// A mirror without a jar (no document context) ignores writes and reads
/// as signed out.
#[derive(Clone)]
pub struct SessionMirror {
    jar: Option<Arc<dyn CookieJar>>,
    observers: SessionObservers,
    cookie_name: String,
    max_age_secs: i64,
}

impl SessionMirror {
    pub fn new(
        jar: Arc<dyn CookieJar>,
        observers: SessionObservers,
        config: &SessionCookieConfig,
    ) -> Self {
        Self {
            jar: Some(jar),
            ..Self::detached(observers, config)
        }
    }

    pub fn detached(observers: SessionObservers, config: &SessionCookieConfig) -> Self {
        Self {
            jar: None,
            observers,
            cookie_name: config.name.clone(),
            max_age_secs: i64::try_from(config.max_age_secs).unwrap_or(i64::MAX),
        }
    }

    pub fn observers(&self) -> &SessionObservers {
        &self.observers
    }

    /// Mirror a user-like object. No-op for `None`, a falsy value, or a
    /// detached mirror.
    pub fn persist(&self, user: Option<&Value>) {
        if self.jar.is_none() {
            return;
        }
        if let Some(user) = user.and_then(SessionUser::from_user_value) {
            self.persist_user(&user);
        }
    }

    pub fn persist_user(&self, user: &SessionUser) {
        let Some(jar) = &self.jar else {
            return;
        };
        let encoded = match encode(user) {
            Ok(encoded) => encoded,
            Err(e) => {
                tracing::error!(error = %e, "Unable to persist session");
                return;
            }
        };

        jar.set(self.cookie(encoded, CookieDuration::seconds(self.max_age_secs)));
        tracing::debug!(user_id = %user.id, role = %user.role, "Session mirror persisted");
        self.observers.notify(&SessionChange::Persisted(user.clone()));
    }

    pub fn read(&self) -> Option<SessionUser> {
        let raw = self.jar.as_ref()?.get(&self.cookie_name)?;
        if raw.is_empty() {
            return None;
        }
        decode(&raw)
    }

    /// Expire the cookie and notify listeners.
    pub fn clear(&self) {
        let Some(jar) = &self.jar else {
            return;
        };
        jar.set(self.cookie(String::new(), CookieDuration::ZERO));
        tracing::debug!("Session mirror cleared");
        self.observers.notify(&SessionChange::Cleared);
    }

    fn cookie(&self, value: String, max_age: CookieDuration) -> Cookie<'static> {
        Cookie::build((self.cookie_name.clone(), value))
            .path("/")
            .http_only(false)
            .same_site(SameSite::Lax)
            .max_age(max_age)
            .build()
    }
}

impl std::fmt::Debug for SessionMirror {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionMirror")
            .field("attached", &self.jar.is_some())
            .field("cookie_name", &self.cookie_name)
            .finish()
    }
}

/// Re-dispatch every session change as a `session-user:updated` window event.
#[cfg(feature = "wasm")]
pub fn bridge_to_dom(observers: &SessionObservers) -> Subscription {
    observers.subscribe(|_| {
        let Some(window) = web_sys::window() else {
            return;
        };
        match web_sys::Event::new(SESSION_UPDATED_EVENT) {
            Ok(event) => {
                if let Err(e) = window.dispatch_event(&event) {
                    tracing::error!(error = ?e, "Unable to dispatch session event");
                }
            }
            Err(e) => tracing::error!(error = ?e, "Unable to create session event"),
        }
    })
}

#[cfg(test)]
mod tests {
    use parking_lot::Mutex;
    use serde_json::json;

    use super::*;

    fn attached() -> (SessionMirror, Arc<MemoryJar>) {
        let jar = Arc::new(MemoryJar::new());
        let mirror = SessionMirror::new(
            jar.clone(),
            SessionObservers::new(),
            &SessionCookieConfig::default(),
        );
        (mirror, jar)
    }

    #[test]
    fn test_persist_then_read() {
        let (mirror, _) = attached();
        mirror.persist(Some(&json!({
            "id": "1",
            "name": "A",
            "email": "a@x.com",
            "role": "teacher"
        })));

        assert_eq!(
            mirror.read(),
            Some(SessionUser {
                id: "1".into(),
                name: "A".into(),
                email: "a@x.com".into(),
                role: "TEACHER".into(),
                avatar_url: String::new(),
            })
        );
    }

    #[test]
    fn test_cookie_attributes() {
        let (mirror, jar) = attached();
        mirror.persist(Some(&json!({"id": "1", "role": "ADMIN"})));

        let cookie = jar.cookie("sessionUser").unwrap();
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.http_only(), Some(false));
        assert_eq!(cookie.max_age(), Some(CookieDuration::seconds(604800)));
        assert!(!cookie.value().contains('='));
        assert!(!cookie.value().contains('+'));
    }

    #[test]
    fn test_clear_then_read_is_absent() {
        let (mirror, jar) = attached();
        mirror.persist(Some(&json!({"id": "1"})));
        mirror.clear();
        assert_eq!(mirror.read(), None);
        assert!(jar.cookie("sessionUser").is_none());
    }

    #[test]
    fn test_malformed_cookie_reads_as_absent() {
        let (mirror, jar) = attached();
        for raw in ["%%%", "not-base64!", "bm90IGpzb24%3D"] {
            jar.insert_raw("sessionUser", raw);
            assert_eq!(mirror.read(), None, "{raw}");
        }
    }

    #[test]
    fn test_legacy_id_and_defaults() {
        let user = SessionUser::from_user_value(&json!({"_id": 42, "name": "B"})).unwrap();
        assert_eq!(user.id, "42");
        assert_eq!(user.role, "STUDENT");
        assert_eq!(user.email, "");
        assert_eq!(user.avatar_url, "");

        let user = SessionUser::from_user_value(&json!({"id": "", "_id": "legacy"})).unwrap();
        assert_eq!(user.id, "legacy");
    }

    #[test]
    fn test_role_stringified_and_uppercased() {
        let user = SessionUser::from_user_value(&json!({"role": "Parent"})).unwrap();
        assert_eq!(user.role, "PARENT");
        assert_eq!(user.role(), Some(Role::Parent));

        let user = SessionUser::from_user_value(&json!({"role": 7})).unwrap();
        assert_eq!(user.role, "7");
        assert_eq!(user.role(), None);
    }

    #[test]
    fn test_falsy_user_is_ignored() {
        let (mirror, jar) = attached();
        mirror.persist(None);
        mirror.persist(Some(&Value::Null));
        mirror.persist(Some(&json!("")));
        assert!(jar.cookie("sessionUser").is_none());
        assert_eq!(mirror.observers().notification_count(), 0);
    }

    #[test]
    fn test_detached_mirror_is_a_noop() {
        let observers = SessionObservers::new();
        let mirror = SessionMirror::detached(observers.clone(), &SessionCookieConfig::default());
        mirror.persist(Some(&json!({"id": "1"})));
        mirror.clear();
        assert_eq!(mirror.read(), None);
        assert_eq!(observers.notification_count(), 0);
    }

    #[test]
    fn test_listeners_see_changes_synchronously() {
        let (mirror, _) = attached();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&seen);
        mirror.observers().subscribe(move |change| log.lock().push(change.clone()));

        mirror.persist(Some(&json!({"id": "1", "role": "admin"})));
        assert_eq!(seen.lock().len(), 1);
        mirror.clear();

        let seen = seen.lock();
        assert!(matches!(&seen[0], SessionChange::Persisted(u) if u.role == "ADMIN"));
        assert_eq!(seen[1], SessionChange::Cleared);
    }

    #[test]
    fn test_listener_reads_new_state() {
        let (mirror, jar) = attached();
        let seen = Arc::new(Mutex::new(None));
        let slot = Arc::clone(&seen);
        let cookies = Arc::clone(&jar);
        // The listener re-reads the cookie, as a mounted component would.
        mirror.observers().subscribe(move |_| {
            *slot.lock() = CookieJar::get(cookies.as_ref(), "sessionUser").and_then(|raw| decode(&raw));
        });

        mirror.persist(Some(&json!({"id": "9", "name": "Z"})));
        assert_eq!(seen.lock().as_ref().map(|u| u.id.as_str()), Some("9"));

        mirror.clear();
        assert_eq!(*seen.lock(), None);
    }

    #[test]
    fn test_non_ascii_names_survive() {
        let user = SessionUser {
            name: "Zoë Ångström".into(),
            ..Default::default()
        };
        let encoded = encode(&user).unwrap();
        assert_eq!(decode(&encoded), Some(user));
    }
}
