use songshop::utils::*;

#[test]
fn test_generate_state_token() {
    let token = generate_state_token();

    assert_eq!(token.len(), STATE_TOKEN_LENGTH);
    assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));

    // Two generated tokens should be different
    assert_ne!(token, generate_state_token());
}

#[test]
fn test_generate_session_id() {
    let id = generate_session_id();
    assert_eq!(id.len(), SESSION_ID_LENGTH);
    assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));
    assert_ne!(id, generate_session_id());
}

#[test]
fn test_basic_auth_header() {
    // RFC 7617 example
    assert_eq!(
        basic_auth_header("Aladdin", "open sesame"),
        "Basic QWxhZGRpbjpvcGVuIHNlc2FtZQ=="
    );
}

#[test]
fn test_constant_time_eq() {
    assert!(constant_time_eq(b"abc", b"abc"));
    assert!(constant_time_eq(b"", b""));
    assert!(!constant_time_eq(b"abc", b"abd"));
    assert!(!constant_time_eq(b"abc", b"ab"));
    assert!(!constant_time_eq(b"abc", b""));
}

#[test]
fn test_encode() {
    assert_eq!(encode("a b"), "a%20b");
    assert_eq!(encode("http://x/y?a=b"), "http%3A%2F%2Fx%2Fy%3Fa%3Db");
    assert_eq!(encode("safe-_.~AZaz09"), "safe-_.~AZaz09");
    assert_eq!(encode("\"quoted\""), "%22quoted%22");
}

#[test]
fn test_known_genres() {
    assert_eq!(KNOWN_GENRES.len(), 6);
    assert!(KNOWN_GENRES.contains(&"hip-hop"));
}
