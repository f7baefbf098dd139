use serde_json::json;
use video_companion::validation::{
    sanitize_title, validate_url, UrlError, DEFAULT_TITLE, MAX_TITLE_LENGTH, MAX_URL_LENGTH,
};

#[test]
fn test_url_length_counts_characters() {
    // 2-byte characters: under the cap in characters, over it in bytes
    let path = "é".repeat(MAX_URL_LENGTH - 30);
    let url = format!("https://example.com/{}", path);
    assert!(url.len() > MAX_URL_LENGTH);
    assert!(url.chars().count() <= MAX_URL_LENGTH);

    assert!(validate_url(&url).is_ok());
}

#[test]
fn test_url_over_character_cap_rejected() {
    let url = format!("https://example.com/{}", "é".repeat(MAX_URL_LENGTH));

    assert_eq!(validate_url(&url), Err(UrlError::TooLong));
}

#[test]
fn test_url_errors() {
    assert_eq!(validate_url(""), Err(UrlError::Empty));
    assert_eq!(validate_url("javascript:alert(1)"), Err(UrlError::Protocol));
    assert_eq!(validate_url("not a url"), Err(UrlError::Malformed));
    assert_eq!(
        validate_url("HTTPS://Example.COM/watch").as_deref(),
        Ok("https://example.com/watch")
    );
}

#[test]
fn test_title_sanitizing() {
    assert_eq!(sanitize_title(None), DEFAULT_TITLE);
    assert_eq!(sanitize_title(Some(&json!(42))), DEFAULT_TITLE);
    assert_eq!(sanitize_title(Some(&json!("<>"))), DEFAULT_TITLE);
    assert_eq!(sanitize_title(Some(&json!("  a<b>c  "))), "abc");

    let long = "x".repeat(MAX_TITLE_LENGTH + 50);
    assert_eq!(
        sanitize_title(Some(&json!(long))).chars().count(),
        MAX_TITLE_LENGTH
    );
}
