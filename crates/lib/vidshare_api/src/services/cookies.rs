//! Cookie service: set/clear the httpOnly auth cookies.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;
use vidshare_core::auth::TokenSettings;
use vidshare_core::models::auth::TokenPair;

/// Cookie name for the access token.
pub const ACCESS_COOKIE: &str = "accessToken";
/// Cookie name for the refresh token.
pub const REFRESH_COOKIE: &str = "refreshToken";

fn build(name: &'static str, value: String, max_age: Duration, secure: bool) -> Cookie<'static> {
    Cookie::build((name, value))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Strict)
        .path("/")
        .max_age(max_age)
        .build()
}

/// Build a httpOnly cookie for the access token.
pub fn access_cookie(token: &str, max_age_secs: i64, secure: bool) -> Cookie<'static> {
    build(
        ACCESS_COOKIE,
        token.to_string(),
        Duration::seconds(max_age_secs),
        secure,
    )
}

/// Build a httpOnly cookie for the refresh token.
pub fn refresh_cookie(token: &str, max_age_secs: i64, secure: bool) -> Cookie<'static> {
    build(
        REFRESH_COOKIE,
        token.to_string(),
        Duration::seconds(max_age_secs),
        secure,
    )
}

/// Add both token cookies to the jar.
pub fn set_token_cookies(
    jar: CookieJar,
    pair: &TokenPair,
    settings: &TokenSettings,
    secure: bool,
) -> CookieJar {
    jar.add(access_cookie(
        &pair.access_token,
        settings.access_ttl_secs,
        secure,
    ))
    .add(refresh_cookie(
        &pair.refresh_token,
        settings.refresh_ttl_secs,
        secure,
    ))
}

/// Expire both token cookies.
pub fn clear_token_cookies(jar: CookieJar, secure: bool) -> CookieJar {
    jar.add(build(ACCESS_COOKIE, String::new(), Duration::ZERO, secure))
        .add(build(REFRESH_COOKIE, String::new(), Duration::ZERO, secure))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_cookie_attributes() {
        let cookie = access_cookie("tok", 86_400, true);
        assert_eq!(cookie.name(), "accessToken");
        assert_eq!(cookie.value(), "tok");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Strict));
        assert_eq!(cookie.max_age(), Some(Duration::days(1)));
    }

    #[test]
    fn clearing_expires_both() {
        let jar = clear_token_cookies(CookieJar::new(), false);
        for name in [ACCESS_COOKIE, REFRESH_COOKIE] {
            let cookie = jar.get(name).unwrap();
            assert_eq!(cookie.value(), "");
            assert_eq!(cookie.max_age(), Some(Duration::ZERO));
        }
    }
}
