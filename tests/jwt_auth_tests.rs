// SPDX-License-Identifier: MIT

//! JWT session token tests.
//!
//! Verifies that tokens created by the sign-in route can be decoded by the
//! auth middleware, catching claim/algorithm drift early.

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use tubefeed::middleware::auth::{create_jwt, Claims};

#[test]
fn test_jwt_roundtrip() {
    let signing_key = b"test_signing_key_32_bytes_long!!";
    let uid = "google-oauth2|113937281723";

    // Create token (like the sign-in route does)
    let token = create_jwt(uid, signing_key).expect("Failed to create JWT");

    // Decode token (like the middleware does)
    let key = DecodingKey::from_secret(signing_key);
    let validation = Validation::new(Algorithm::HS256);
    let decoded = decode::<Claims>(&token, &key, &validation).expect("Token should decode");

    assert_eq!(decoded.claims.sub, uid);
    assert!(decoded.claims.exp > decoded.claims.iat);
}

#[test]
fn test_jwt_rejects_tampered_signature() {
    let token = create_jwt("user-1", b"key_one_32_bytes_long_padding!!!").unwrap();

    let key = DecodingKey::from_secret(b"key_two_32_bytes_long_padding!!!");
    let validation = Validation::new(Algorithm::HS256);
    assert!(decode::<Claims>(&token, &key, &validation).is_err());
}
