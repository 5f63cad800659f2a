//! Where the client sends the user when the session cannot be recovered.
//!
//! In a browser this is a full page navigation. Native hosts plug in their
//! own [`Navigator`]; [`HeadlessNavigator`] keeps the location in memory.

use std::sync::{Mutex, PoisonError};

use tracing::info;

pub trait Navigator: Send + Sync {
    /// Path of the current location, without query string.
    fn current_path(&self) -> String;

    /// Perform a full navigation to `url`.
    fn navigate(&self, url: &str);
}

/// In-memory location that behaves like a browser tab: navigating replaces
/// the current location, so a second redirect from the login page is a no-op.
#[derive(Debug)]
pub struct HeadlessNavigator {
    location: Mutex<String>,
    visits: Mutex<Vec<String>>,
}

impl HeadlessNavigator {
    pub fn at(location: impl Into<String>) -> Self {
        Self {
            location: Mutex::new(location.into()),
            visits: Mutex::new(Vec::new()),
        }
    }

    pub fn location(&self) -> String {
        self.location
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Every navigation performed so far, oldest first.
    pub fn visits(&self) -> Vec<String> {
        self.visits
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Default for HeadlessNavigator {
    fn default() -> Self {
        Self::at("/")
    }
}

impl Navigator for HeadlessNavigator {
    fn current_path(&self) -> String {
        let location = self.location();
        match location.split_once('?') {
            Some((path, _)) => path.to_string(),
            None => location,
        }
    }

    fn navigate(&self, url: &str) {
        info!(%url, "navigating");
        *self.location.lock().unwrap_or_else(PoisonError::into_inner) = url.to_string();
        self.visits
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(url.to_string());
    }
}

/// `<login_path>?redirect=<current path>`, or `None` when already on the
/// login page.
pub fn login_redirect_url(login_path: &str, current_path: &str) -> Option<String> {
    let login = login_path.trim_end_matches('/');
    if current_path.trim_end_matches('/') == login {
        return None;
    }
    Some(format!(
        "{login}?redirect={}",
        urlencoding::encode(current_path)
    ))
}

pub(crate) fn redirect_to_login(navigator: &dyn Navigator, login_path: &str) {
    let current = navigator.current_path();
    if let Some(url) = login_redirect_url(login_path, &current) {
        navigator.navigate(&url);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_current_path() {
        assert_eq!(
            login_redirect_url("/login", "/productos").as_deref(),
            Some("/login?redirect=%2Fproductos")
        );
        assert_eq!(
            login_redirect_url("/login", "/ventas/12 nueva").as_deref(),
            Some("/login?redirect=%2Fventas%2F12%20nueva")
        );
    }

    #[test]
    fn no_redirect_from_login_page() {
        assert_eq!(login_redirect_url("/login", "/login"), None);
        assert_eq!(login_redirect_url("/login", "/login/"), None);
        assert!(login_redirect_url("/login", "/login-help").is_some());
    }

    #[test]
    fn headless_navigation_replaces_location() {
        let nav = HeadlessNavigator::at("/productos");
        redirect_to_login(&nav, "/login");
        redirect_to_login(&nav, "/login");

        assert_eq!(nav.current_path(), "/login");
        assert_eq!(nav.visits(), vec!["/login?redirect=%2Fproductos".to_string()]);
    }
}
