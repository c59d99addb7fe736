//! Userinfo encoding for URLs that carry credentials

use once_cell::sync::Lazy;
use url::Url;

static BASE: Lazy<Url> = Lazy::new(|| Url::parse("https://localhost").expect("valid url"));

/// `user:password`, percent-encoded for the userinfo part of a URL.
///
/// `%` is encoded too, so consumers that decode the URL get the input back.
pub fn userinfo(user: &str, password: &str) -> String {
    let mut url = BASE.clone();
    // Only fails for URLs without a host.
    let _ = url.set_username(&user.replace('%', "%25"));
    let _ = url.set_password(Some(&password.replace('%', "%25")));
    format!("{}:{}", url.username(), url.password().unwrap_or_default())
}
