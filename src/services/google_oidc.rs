// SPDX-License-Identifier: MIT

//! Google sign-in ID token verification.
//!
//! The popup sign-in flow runs in the frontend and posts us a Google ID
//! token. Verification checks the RS256 signature against Google's JWKS
//! (resolved via OIDC discovery and cached per Cache-Control), pins the
//! issuer and audience, and extracts the profile claims the user document
//! is seeded from.

use crate::config::Config;
use anyhow::Context;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tokio::sync::{Mutex, RwLock};

const DISCOVERY_URL: &str = "https://accounts.google.com/.well-known/openid-configuration";
const FALLBACK_JWKS_URL: &str = "https://www.googleapis.com/oauth2/v3/certs";
const HTTP_TIMEOUT: Duration = Duration::from_secs(5);
const FALLBACK_CACHE_TTL: Duration = Duration::from_secs(300);
const CLOCK_SKEW_SECS: u64 = 60;

/// Identity extracted from a valid sign-in token.
#[derive(Debug, Clone)]
pub struct VerifiedIdentity {
    /// Opaque Google user ID (`sub` claim); keys the user document
    pub uid: String,
    pub email: Option<String>,
    pub name: String,
    pub picture: Option<String>,
}

#[derive(Debug, Clone)]
pub enum OidcError {
    /// The token is missing/invalid or its claims do not match.
    Forbidden(String),
    /// Key fetching failed; the token itself was never judged.
    Transient(String),
}

/// Where signing keys come from: live Google JWKS, or a fixed RSA key for
/// deterministic tests.
enum KeySource {
    Google(JwksCache),
    Static {
        kid: String,
        key: Arc<DecodingKey>,
    },
}

/// Verifier for Google-issued sign-in ID tokens.
pub struct GoogleIdVerifier {
    http: reqwest::Client,
    audience: String,
    keys: KeySource,
}

impl GoogleIdVerifier {
    /// Production verifier: discovers and caches Google's JWKS.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        tracing::info!(
            audience = %config.google_client_id,
            "Initialized Google sign-in verifier"
        );
        Ok(Self {
            http: build_http_client()?,
            audience: config.google_client_id.clone(),
            keys: KeySource::Google(JwksCache::default()),
        })
    }

    /// Verifier pinned to one RSA public key, for integration tests.
    pub fn new_with_static_key(
        config: &Config,
        kid: impl Into<String>,
        key: DecodingKey,
    ) -> anyhow::Result<Self> {
        let kid = kid.into();
        if kid.trim().is_empty() {
            anyhow::bail!("static OIDC kid must not be empty");
        }
        Ok(Self {
            http: build_http_client()?,
            audience: config.google_client_id.clone(),
            keys: KeySource::Static {
                kid,
                key: Arc::new(key),
            },
        })
    }

    /// Verify a sign-in ID token and extract the user's identity.
    pub async fn verify_id_token(&self, token: &str) -> Result<VerifiedIdentity, OidcError> {
        if token.is_empty() {
            return Err(OidcError::Forbidden("ID token is empty".to_string()));
        }

        let header = decode_header(token)
            .map_err(|e| OidcError::Forbidden(format!("invalid JWT header: {e}")))?;
        if header.alg != Algorithm::RS256 {
            return Err(OidcError::Forbidden(format!(
                "unexpected JWT alg: {:?}",
                header.alg
            )));
        }
        let kid = header
            .kid
            .ok_or_else(|| OidcError::Forbidden("missing JWT kid".to_string()))?;

        let key = self.key_for(&kid).await?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);
        validation.set_issuer(&["https://accounts.google.com", "accounts.google.com"]);
        validation.set_audience(&[self.audience.as_str()]);
        validation.validate_nbf = true;
        validation.leeway = CLOCK_SKEW_SECS;

        let claims = decode::<IdTokenClaims>(token, key.as_ref(), &validation)
            .map_err(|e| OidcError::Forbidden(format!("JWT validation failed: {e}")))?
            .claims;

        tracing::debug!(
            subject = %claims.sub,
            issuer = %claims.iss,
            audience = %claims.aud,
            email_verified = ?claims.email_verified,
            "Google sign-in claims verified"
        );

        reject_future_iat(claims.iat)?;
        Ok(claims.into_identity())
    }

    async fn key_for(&self, kid: &str) -> Result<Arc<DecodingKey>, OidcError> {
        let cache = match &self.keys {
            KeySource::Static { kid: pinned, key } => {
                return if kid == pinned {
                    Ok(key.clone())
                } else {
                    Err(OidcError::Forbidden(format!(
                        "unknown JWT kid for static verifier: {kid}"
                    )))
                };
            }
            KeySource::Google(cache) => cache,
        };

        if let Some(key) = cache.lookup(kid).await {
            return Ok(key);
        }

        // Refresh once normally, then once more bypassing the TTL: a signing
        // key rotated mid-TTL only shows up on a forced refetch.
        for force in [false, true] {
            cache.refresh(&self.http, force).await?;
            if let Some(key) = cache.lookup(kid).await {
                return Ok(key);
            }
        }

        Err(OidcError::Forbidden(format!(
            "JWT kid not found in JWKS after refresh: {kid}"
        )))
    }
}

fn build_http_client() -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .context("failed building OIDC HTTP client")
}

// ─── JWKS cache ──────────────────────────────────────────────

struct Keys {
    by_kid: HashMap<String, Arc<DecodingKey>>,
    fresh_until: Instant,
}

#[derive(Default)]
struct JwksCache {
    jwks_uri: RwLock<Option<(String, Instant)>>,
    keys: RwLock<Option<Keys>>,
    refresh_lock: Mutex<()>,
}

impl JwksCache {
    async fn lookup(&self, kid: &str) -> Option<Arc<DecodingKey>> {
        let keys = self.keys.read().await;
        keys.as_ref()
            .filter(|k| k.fresh_until > Instant::now())
            .and_then(|k| k.by_kid.get(kid))
            .cloned()
    }

    async fn refresh(&self, http: &reqwest::Client, force: bool) -> Result<(), OidcError> {
        let _guard = self.refresh_lock.lock().await;

        // Another task may have refreshed while we waited for the lock
        if !force {
            let keys = self.keys.read().await;
            if keys
                .as_ref()
                .is_some_and(|k| k.fresh_until > Instant::now())
            {
                return Ok(());
            }
        }

        let uri = self.jwks_uri(http, force).await?;
        tracing::debug!(jwks_uri = %uri, "Refreshing Google JWKS cache");

        let response = http
            .get(&uri)
            .send()
            .await
            .map_err(|e| OidcError::Transient(format!("JWKS request failed: {e}")))?;
        if !response.status().is_success() {
            return Err(OidcError::Transient(format!(
                "JWKS request returned status {}",
                response.status()
            )));
        }

        let ttl = ttl_from_cache_control(response.headers());
        let jwks: JwksDocument = response
            .json()
            .await
            .map_err(|e| OidcError::Transient(format!("invalid JWKS JSON: {e}")))?;

        let by_kid: HashMap<String, Arc<DecodingKey>> = jwks
            .keys
            .into_iter()
            .filter_map(|jwk| {
                let key = jwk.to_decoding_key()?;
                Some((jwk.kid, Arc::new(key)))
            })
            .collect();

        if by_kid.is_empty() {
            return Err(OidcError::Transient(
                "JWKS response did not include any usable RSA keys".to_string(),
            ));
        }

        tracing::debug!(keys = by_kid.len(), ttl_secs = ttl.as_secs(), "JWKS cache refreshed");
        *self.keys.write().await = Some(Keys {
            by_kid,
            fresh_until: Instant::now() + ttl,
        });
        Ok(())
    }

    /// The JWKS endpoint from OIDC discovery, cached; a failed discovery
    /// falls back to the last known (or well-known) endpoint rather than
    /// failing the sign-in.
    async fn jwks_uri(&self, http: &reqwest::Client, force: bool) -> Result<String, OidcError> {
        let cached = {
            let uri = self.jwks_uri.read().await;
            uri.clone()
        };
        if !force {
            if let Some((uri, fresh_until)) = &cached {
                if *fresh_until > Instant::now() {
                    return Ok(uri.clone());
                }
            }
        }

        match http.get(DISCOVERY_URL).send().await {
            Ok(resp) if resp.status().is_success() => {
                let ttl = ttl_from_cache_control(resp.headers());
                let discovery: DiscoveryDocument = resp
                    .json()
                    .await
                    .map_err(|e| OidcError::Transient(format!("invalid discovery JSON: {e}")))?;
                *self.jwks_uri.write().await =
                    Some((discovery.jwks_uri.clone(), Instant::now() + ttl));
                Ok(discovery.jwks_uri)
            }
            Ok(resp) => {
                tracing::warn!(status = %resp.status(), "OIDC discovery failed; using fallback JWKS URI");
                Ok(stale_or_fallback(cached))
            }
            Err(e) => {
                tracing::warn!(error = %e, "OIDC discovery unreachable; using fallback JWKS URI");
                Ok(stale_or_fallback(cached))
            }
        }
    }
}

fn stale_or_fallback(cached: Option<(String, Instant)>) -> String {
    cached
        .map(|(uri, _)| uri)
        .unwrap_or_else(|| FALLBACK_JWKS_URL.to_string())
}

// ─── Wire documents ──────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct DiscoveryDocument {
    jwks_uri: String,
}

#[derive(Debug, Deserialize)]
struct JwksDocument {
    keys: Vec<Jwk>,
}

#[derive(Debug, Deserialize)]
struct Jwk {
    kid: String,
    kty: String,
    alg: Option<String>,
    n: String,
    e: String,
    #[serde(rename = "use")]
    use_: Option<String>,
}

impl Jwk {
    /// Build a decoding key, skipping anything that is not an RS256 signing
    /// key (Google also publishes keys we cannot use).
    fn to_decoding_key(&self) -> Option<DecodingKey> {
        if self.kty != "RSA" || self.kid.trim().is_empty() {
            return None;
        }
        if self.alg.as_deref().is_some_and(|alg| alg != "RS256") {
            return None;
        }
        if self.use_.as_deref().is_some_and(|u| u != "sig") {
            return None;
        }
        match DecodingKey::from_rsa_components(&self.n, &self.e) {
            Ok(key) => Some(key),
            Err(e) => {
                tracing::warn!(error = %e, kid = %self.kid, "Skipping invalid RSA JWKS key");
                None
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct IdTokenClaims {
    iss: String,
    aud: String,
    sub: String,
    #[allow(dead_code)]
    exp: usize,
    iat: Option<usize>,
    email: Option<String>,
    email_verified: Option<bool>,
    name: Option<String>,
    given_name: Option<String>,
    picture: Option<String>,
}

impl IdTokenClaims {
    fn into_identity(self) -> VerifiedIdentity {
        // Only surface the email when Google has verified it
        let email = match self.email_verified {
            Some(true) => self.email,
            _ => None,
        };
        let name = self
            .name
            .or(self.given_name)
            .unwrap_or_else(|| "YouTube User".to_string());
        VerifiedIdentity {
            uid: self.sub,
            email,
            name,
            picture: self.picture,
        }
    }
}

fn reject_future_iat(iat: Option<usize>) -> Result<(), OidcError> {
    let Some(iat) = iat else {
        return Err(OidcError::Forbidden("missing iat claim".to_string()));
    };
    if iat as u64 > now_unix_secs() + CLOCK_SKEW_SECS {
        return Err(OidcError::Forbidden(
            "iat claim is in the future".to_string(),
        ));
    }
    Ok(())
}

fn ttl_from_cache_control(headers: &reqwest::header::HeaderMap) -> Duration {
    headers
        .get(reqwest::header::CACHE_CONTROL)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_max_age)
        .map(Duration::from_secs)
        .unwrap_or(FALLBACK_CACHE_TTL)
}

fn parse_max_age(value: &str) -> Option<u64> {
    value.split(',').find_map(|directive| {
        directive
            .trim()
            .strip_prefix("max-age=")
            .and_then(|raw| raw.trim_matches('"').parse().ok())
    })
}

fn now_unix_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
