// HttpOnly cookie carrying the role credential
//
// The token minted by the relay protocol never appears in a response body;
// it only travels in this cookie.

use actix_web::cookie::time::{Duration as CookieDuration, OffsetDateTime};
use actix_web::cookie::{Cookie, SameSite};

/// Default cookie name for the credential
pub const AUTH_COOKIE_NAME: &str = "jwt";

/// Configuration for authentication cookies
#[derive(Debug, Clone)]
pub struct CookieConfig {
    pub name: String,
    /// Whether to set the Secure flag
    pub secure: bool,
    /// Cookie path (default: "/")
    pub path: String,
    pub same_site: SameSite,
    /// Domain (None = current domain)
    pub domain: Option<String>,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            name: AUTH_COOKIE_NAME.to_string(),
            secure: true,
            path: "/".to_string(),
            same_site: SameSite::Strict,
            domain: None,
        }
    }
}

impl CookieConfig {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// Create the credential cookie.
///
/// Renders as `jwt=<token>; HttpOnly; SameSite=Strict; Secure; Path=/; Max-Age=<secs>`.
pub fn create_auth_cookie<'a>(token: &str, max_age_secs: i64, config: &CookieConfig) -> Cookie<'a> {
    let mut cookie = Cookie::build(config.name.clone(), token.to_string())
        .path(config.path.clone())
        .http_only(true)
        .secure(config.secure)
        .same_site(config.same_site)
        .max_age(CookieDuration::seconds(max_age_secs))
        .finish();

    if let Some(ref domain) = config.domain {
        cookie.set_domain(domain.clone());
    }

    cookie
}

/// Create a cookie that expires the credential cookie.
pub fn create_logout_cookie<'a>(config: &CookieConfig) -> Cookie<'a> {
    let mut cookie = Cookie::build(config.name.clone(), "")
        .path(config.path.clone())
        .http_only(true)
        .secure(config.secure)
        .same_site(config.same_site)
        .max_age(CookieDuration::ZERO)
        .expires(OffsetDateTime::UNIX_EPOCH)
        .finish();

    if let Some(ref domain) = config.domain {
        cookie.set_domain(domain.clone());
    }

    cookie
}

/// Find the credential among request cookies.
pub fn extract_auth_token<'a, I>(cookies: I, name: &str) -> Option<String>
where
    I: IntoIterator<Item = Cookie<'a>>,
{
    cookies
        .into_iter()
        .find(|c| c.name() == name)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_auth_cookie() {
        let config = CookieConfig::default();
        let cookie = create_auth_cookie("test.jwt.token", 3600, &config);

        assert_eq!(cookie.name(), "jwt");
        assert_eq!(cookie.value(), "test.jwt.token");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Strict));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(CookieDuration::seconds(3600)));

        let header = cookie.to_string();
        assert!(header.starts_with("jwt=test.jwt.token"));
        assert!(header.contains("Max-Age=3600"));
    }

    #[test]
    fn test_create_logout_cookie() {
        let config = CookieConfig::named("session");
        let cookie = create_logout_cookie(&config);

        assert_eq!(cookie.name(), "session");
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(CookieDuration::ZERO));
    }

    #[test]
    fn test_extract_auth_token() {
        let cookies = vec![Cookie::new("other", "x"), Cookie::new("jwt", "abc")];
        assert_eq!(extract_auth_token(cookies, "jwt"), Some("abc".to_string()));

        let cookies = vec![Cookie::new("jwt", "")];
        assert_eq!(extract_auth_token(cookies, "jwt"), None);
    }
}
