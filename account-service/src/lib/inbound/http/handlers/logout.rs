use axum::http::StatusCode;
use axum_extra::extract::cookie::Cookie;
use axum_extra::extract::cookie::CookieJar;

use crate::inbound::http::middleware::ACCESS_TOKEN_COOKIE;

/// Clears the access token cookie. Tokens are stateless, so a bearer token
/// held by the client stays valid until it expires.
pub async fn logout(jar: CookieJar) -> (CookieJar, StatusCode) {
    (jar.add(removal_cookie()), StatusCode::NO_CONTENT)
}

fn removal_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::new(ACCESS_TOKEN_COOKIE, "");
    cookie.set_path("/");
    cookie.make_removal();
    cookie
}
