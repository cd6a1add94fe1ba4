//! One-shot notices carried across a redirect in a cookie.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::services::guard::GuardedAction;

pub const FLASH_COOKIE: &str = "flash";

pub fn set_guard_notice(jar: CookieJar, action: GuardedAction) -> CookieJar {
    let mut cookie = Cookie::new(FLASH_COOKIE, action.notice_key());
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_path("/");
    jar.add(cookie)
}

/// Reads the pending notice, if any, and clears the cookie.
pub fn take_notice(jar: CookieJar) -> (CookieJar, Option<&'static str>) {
    let Some(raw) = jar.get(FLASH_COOKIE).map(|c| c.value().to_string()) else {
        return (jar, None);
    };

    let notice = GuardedAction::from_notice_key(&raw).map(GuardedAction::message);

    let mut cookie = Cookie::from(FLASH_COOKIE);
    cookie.set_path("/");
    (jar.remove(cookie), notice)
}
