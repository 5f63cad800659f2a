//! Session cookies: reading them from requests and rendering `Set-Cookie`.

use axum::http::header::{self, HeaderMap, HeaderValue};
use axum::response::AppendHeaders;
use tracing::error;

use crate::error::AppError;

pub const ACCESS_TOKEN_COOKIE: &str = "access_token";
pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";

type SetCookies = AppendHeaders<[(header::HeaderName, HeaderValue); 2]>;

/// Attributes shared by both session cookies.
///
/// Both cookies live as long as the refresh token. The access JWT carries
/// its own `exp`, so an expired token is still presented and reported as
/// expired rather than missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CookieSettings {
    pub secure: bool,
    pub max_age_seconds: u64,
}

impl CookieSettings {
    pub fn render(&self, name: &str, value: &str, max_age_seconds: u64) -> String {
        let mut cookie =
            format!("{name}={value}; Path=/; HttpOnly; SameSite=Strict; Max-Age={max_age_seconds}");
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }

    /// `Set-Cookie` headers for a freshly issued token pair.
    pub fn session(&self, access_token: &str, refresh_token: &str) -> Result<SetCookies, AppError> {
        Ok(AppendHeaders([
            (
                header::SET_COOKIE,
                header_value(self.render(ACCESS_TOKEN_COOKIE, access_token, self.max_age_seconds))?,
            ),
            (
                header::SET_COOKIE,
                header_value(self.render(REFRESH_TOKEN_COOKIE, refresh_token, self.max_age_seconds))?,
            ),
        ]))
    }

    /// `Set-Cookie` headers that delete both cookies.
    pub fn cleared(&self) -> Result<SetCookies, AppError> {
        Ok(AppendHeaders([
            (
                header::SET_COOKIE,
                header_value(self.render(ACCESS_TOKEN_COOKIE, "", 0))?,
            ),
            (
                header::SET_COOKIE,
                header_value(self.render(REFRESH_TOKEN_COOKIE, "", 0))?,
            ),
        ]))
    }
}

fn header_value(cookie: String) -> Result<HeaderValue, AppError> {
    HeaderValue::try_from(cookie).map_err(|e| {
        error!(error = %e, "cookie is not a valid header value");
        AppError::Internal
    })
}

/// Value of the named cookie across all `Cookie` headers. Empty values
/// count as absent.
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim().trim_matches('"').to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(cookies: &[&str]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for c in cookies {
            map.append(header::COOKIE, HeaderValue::from_str(c).unwrap());
        }
        map
    }

    #[test]
    fn reads_named_cookie() {
        let map = headers(&["theme=dark; access_token=abc.def.ghi", "refresh_token=r1"]);
        assert_eq!(read_cookie(&map, ACCESS_TOKEN_COOKIE).as_deref(), Some("abc.def.ghi"));
        assert_eq!(read_cookie(&map, REFRESH_TOKEN_COOKIE).as_deref(), Some("r1"));
        assert_eq!(read_cookie(&map, "missing"), None);
    }

    #[test]
    fn empty_cookie_is_absent() {
        let map = headers(&["access_token=; other=1"]);
        assert_eq!(read_cookie(&map, ACCESS_TOKEN_COOKIE), None);
    }

    #[test]
    fn prefix_names_do_not_match() {
        let map = headers(&["my_access_token=x"]);
        assert_eq!(read_cookie(&map, ACCESS_TOKEN_COOKIE), None);
    }

    #[test]
    fn renders_attributes() {
        let dev = CookieSettings {
            secure: false,
            max_age_seconds: 60,
        };
        assert_eq!(
            dev.render("access_token", "t", 60),
            "access_token=t; Path=/; HttpOnly; SameSite=Strict; Max-Age=60"
        );

        let prod = CookieSettings {
            secure: true,
            ..dev
        };
        assert!(prod.render("refresh_token", "r", 60).ends_with("; Secure"));
    }

    #[test]
    fn cleared_cookies_expire_immediately() {
        let settings = CookieSettings {
            secure: false,
            max_age_seconds: 60,
        };
        let AppendHeaders(pairs) = settings.cleared().unwrap();
        for (_, value) in pairs {
            assert!(value.to_str().unwrap().contains("Max-Age=0"));
        }
    }
}
