pub mod ask;
pub mod health;
pub mod score;

use axum::http::HeaderMap;

/// Read a single value out of the Cookie header.
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let cookies = headers.get(axum::http::header::COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        if key == name && !value.is_empty() {
            Some(value.to_string())
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn cookie_value_finds_named_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::COOKIE,
            HeaderValue::from_static("session=abc; user_id=u-123; theme=dark"),
        );

        assert_eq!(cookie_value(&headers, "user_id").as_deref(), Some("u-123"));
        assert_eq!(cookie_value(&headers, "theme").as_deref(), Some("dark"));
        assert!(cookie_value(&headers, "missing").is_none());
    }

    #[test]
    fn cookie_value_handles_absent_header() {
        let headers = HeaderMap::new();
        assert!(cookie_value(&headers, "user_id").is_none());
    }
}
