// SPDX-License-Identifier: MIT

//! Hardening headers applied to every response.

use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};

/// The API serves JSON only; lock the browser-facing surface down entirely.
/// Embedding happens in the frontend against youtube-nocookie.com, never here.
const SECURITY_HEADERS: &[(&str, &str)] = &[
    ("X-Content-Type-Options", "nosniff"),
    ("X-Frame-Options", "DENY"),
    (
        "Strict-Transport-Security",
        "max-age=31536000; includeSubDomains",
    ),
    (
        "Content-Security-Policy",
        "default-src 'none'; frame-ancestors 'none'",
    ),
    ("Referrer-Policy", "no-referrer"),
    (
        "Permissions-Policy",
        "autoplay=(), camera=(), geolocation=(), microphone=(), payment=(), usb=()",
    ),
];

pub async fn add_security_headers(req: Request, next: Next) -> Response {
    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    for (name, value) in SECURITY_HEADERS {
        headers.insert(*name, HeaderValue::from_static(value));
    }

    response
}
