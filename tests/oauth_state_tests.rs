// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! OAuth state encoding/decoding tests.
//!
//! These tests verify that the Telegram chat ID survives the signed
//! encode/decode roundtrip through the OAuth state parameter, and that
//! tampering is detected.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use fatburn_relay::routes::auth::verify_and_decode_state;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Encode a chat ID into a signed OAuth state (mirrors auth.rs logic).
fn encode_state(chat_id: &str, secret: &[u8]) -> String {
    use std::time::{SystemTime, UNIX_EPOCH};

    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_millis();
    let payload = format!("{}|{:x}", chat_id, timestamp);

    let mut mac = HmacSha256::new_from_slice(secret).unwrap();
    mac.update(payload.as_bytes());
    let signature = hex::encode(mac.finalize().into_bytes());

    URL_SAFE_NO_PAD.encode(format!("{}|{}", payload, signature).as_bytes())
}

#[test]
fn test_oauth_state_roundtrip() {
    let secret = b"test_state_key";
    let state = encode_state("987654321", secret);

    assert_eq!(
        verify_and_decode_state(&state, secret),
        Some("987654321".to_string())
    );
}

#[test]
fn test_oauth_state_roundtrip_empty_chat_id() {
    let secret = b"test_state_key";
    let state = encode_state("", secret);

    assert_eq!(verify_and_decode_state(&state, secret), Some(String::new()));
}

#[test]
fn test_oauth_state_rejects_wrong_key() {
    let state = encode_state("987654321", b"test_state_key");
    assert_eq!(verify_and_decode_state(&state, b"another_key"), None);
}

#[test]
fn test_oauth_state_rejects_tampered_chat_id() {
    let secret = b"test_state_key";
    let state = encode_state("987654321", secret);

    // Re-encode with a different chat ID but the original signature
    let decoded = String::from_utf8(URL_SAFE_NO_PAD.decode(&state).unwrap()).unwrap();
    let parts: Vec<&str> = decoded.splitn(3, '|').collect();
    let tampered = format!("attacker|{}|{}", parts[1], parts[2]);
    let tampered_state = URL_SAFE_NO_PAD.encode(tampered.as_bytes());

    assert_eq!(verify_and_decode_state(&tampered_state, secret), None);
}

#[test]
fn test_oauth_state_decode_invalid() {
    let secret = b"test_state_key";

    // Invalid base64 should return None
    assert_eq!(verify_and_decode_state("not-valid-base64!!!", secret), None);

    // Too few parts
    let malformed = URL_SAFE_NO_PAD.encode("only|two".as_bytes());
    assert_eq!(verify_and_decode_state(&malformed, secret), None);
}

#[test]
fn test_oauth_state_base64_url_safe() {
    // Verify we're using URL-safe base64 (no + or /)
    let state = encode_state("987654321", b"test_state_key");

    assert!(!state.contains('+'), "State should not contain '+'");
    assert!(!state.contains('/'), "State should not contain '/'");
    assert!(!state.contains('='), "State should not contain '=' padding");
}
