// SPDX-License-Identifier: MIT

//! Sign-in routes.
//!
//! The identity-provider popup runs entirely in the frontend and hands us a
//! Google ID token; we verify it, upsert the user profile document, and
//! issue a session JWT as an HTTP-only cookie.

use crate::error::{AppError, Result};
use crate::middleware::auth::{create_jwt, SESSION_COOKIE};
use crate::models::UserDoc;
use crate::services::OidcError;
use crate::AppState;
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/google", post(sign_in))
        .route("/auth/logout", get(logout))
}

#[derive(Deserialize)]
pub struct SignInRequest {
    id_token: String,
}

/// Profile returned on sign-in and from /api/me.
#[derive(Serialize)]
pub struct ProfileResponse {
    pub uid: String,
    pub name: String,
    pub email: Option<String>,
    pub photo_url: Option<String>,
}

impl From<&UserDoc> for ProfileResponse {
    fn from(doc: &UserDoc) -> Self {
        Self {
            uid: doc.uid.clone(),
            name: doc.name.clone(),
            email: doc.email.clone(),
            photo_url: doc.photo_url.clone(),
        }
    }
}

/// Verify a Google ID token and establish a session.
async fn sign_in(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(body): Json<SignInRequest>,
) -> Result<(CookieJar, Json<ProfileResponse>)> {
    let identity = state
        .google_verifier
        .verify_id_token(&body.id_token)
        .await
        .map_err(|e| match e {
            OidcError::Forbidden(msg) => {
                tracing::warn!(error = %msg, "Rejected sign-in token");
                AppError::InvalidToken
            }
            OidcError::Transient(msg) => AppError::Internal(anyhow::anyhow!(msg)),
        })?;

    // Merge-create: keep existing lists, refresh profile fields
    let doc = match state.db.get_user(&identity.uid).await? {
        Some(mut existing) => {
            existing.name = identity.name;
            existing.email = identity.email;
            existing.photo_url = identity.picture;
            existing
        }
        None => UserDoc::new(
            identity.uid.clone(),
            identity.email,
            identity.name,
            identity.picture,
        ),
    };
    state.db.upsert_user(&doc).await?;

    tracing::info!(uid = %doc.uid, "User signed in");

    let token = create_jwt(&doc.uid, &state.config.jwt_signing_key)?;
    let secure = state.config.frontend_url.starts_with("https://");
    let cookie = Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .build();

    Ok((jar.add(cookie), Json(ProfileResponse::from(&doc))))
}

#[derive(Serialize)]
struct LogoutResponse {
    success: bool,
}

/// Clear the session cookie.
async fn logout(jar: CookieJar) -> (CookieJar, Json<LogoutResponse>) {
    let cookie = Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .build();
    (
        jar.remove(cookie),
        Json(LogoutResponse { success: true }),
    )
}
