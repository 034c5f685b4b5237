//! Cookie storage the session mirror writes through.

use std::collections::HashMap;

use parking_lot::Mutex;
use tower_cookies::{Cookie, Cookies};

/// Minimal cookie store: look up a value by name, write a cookie.
///
/// Writing a cookie whose max-age is zero removes it, as a browser would.
pub trait CookieJar {
    fn get(&self, name: &str) -> Option<String>;
    fn set(&self, cookie: Cookie<'static>);
}

fn is_expired(cookie: &Cookie<'_>) -> bool {
    cookie.max_age().is_some_and(|age| age.is_zero() || age.is_negative())
}

/// In-process jar, for tests and non-browser clients.
#[derive(Debug, Default)]
pub struct MemoryJar {
    cookies: Mutex<HashMap<String, Cookie<'static>>>,
}

impl MemoryJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// The stored cookie with all its attributes.
    pub fn cookie(&self, name: &str) -> Option<Cookie<'static>> {
        self.cookies.lock().get(name).cloned()
    }

    /// Store a raw value, bypassing any encoding.
    pub fn insert_raw(&self, name: &str, value: &str) {
        self.set(Cookie::new(name.to_string(), value.to_string()));
    }
}

impl CookieJar for MemoryJar {
    fn get(&self, name: &str) -> Option<String> {
        self.cookies
            .lock()
            .get(name)
            .map(|cookie| cookie.value().to_string())
    }

    fn set(&self, cookie: Cookie<'static>) {
        let mut cookies = self.cookies.lock();
        if is_expired(&cookie) {
            cookies.remove(cookie.name());
        } else {
            cookies.insert(cookie.name().to_string(), cookie);
        }
    }
}

/// Server side: reads the request cookies, writes `Set-Cookie` headers.
impl CookieJar for Cookies {
    fn get(&self, name: &str) -> Option<String> {
        Cookies::get(self, name).map(|cookie| cookie.value().to_string())
    }

    fn set(&self, cookie: Cookie<'static>) {
        self.add(cookie);
    }
}

/// Browser side: `document.cookie`.
#[cfg(feature = "wasm")]
pub struct DocumentJar {
    document: web_sys::HtmlDocument,
}

#[cfg(feature = "wasm")]
impl DocumentJar {
    /// `None` outside a browser document context.
    pub fn from_window() -> Option<Self> {
        use wasm_bindgen::JsCast;

        let document = web_sys::window()?
            .document()?
            .dyn_into::<web_sys::HtmlDocument>()
            .ok()?;
        Some(Self { document })
    }
}

#[cfg(feature = "wasm")]
impl CookieJar for DocumentJar {
    fn get(&self, name: &str) -> Option<String> {
        let all = self.document.cookie().ok()?;
        Cookie::split_parse(all.as_str())
            .filter_map(Result::ok)
            .find(|cookie| cookie.name() == name)
            .map(|cookie| cookie.value().to_string())
    }

    fn set(&self, cookie: Cookie<'static>) {
        if let Err(e) = self.document.set_cookie(&cookie.to_string()) {
            tracing::error!(error = ?e, name = %cookie.name(), "Unable to write document cookie");
        }
    }
}

#[cfg(test)]
mod tests {
    use tower_cookies::cookie::time::Duration;

    use super::*;

    #[test]
    fn test_memory_jar_set_get() {
        let jar = MemoryJar::new();
        jar.insert_raw("a", "1");
        assert_eq!(CookieJar::get(&jar, "a").as_deref(), Some("1"));
        assert_eq!(CookieJar::get(&jar, "b"), None);
    }

    #[test]
    fn test_memory_jar_zero_max_age_removes() {
        let jar = MemoryJar::new();
        jar.insert_raw("a", "1");
        jar.set(Cookie::build(("a", "")).max_age(Duration::ZERO).build());
        assert_eq!(CookieJar::get(&jar, "a"), None);
        assert!(jar.cookie("a").is_none());
    }
}
