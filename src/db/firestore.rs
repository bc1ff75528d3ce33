// SPDX-License-Identifier: MIT

//! Firestore client wrapper with typed operations on user documents.
//!
//! The remote store owns the data; callers fetch the document, compute new
//! list values in memory, and write fields back. Last-write-wins applies to
//! concurrent writers (two tabs), matching the upstream store's semantics.

use crate::db::collections;
use crate::error::AppError;
use crate::models::UserDoc;

// Unsigned JWT accepted by the emulator; never sent to production.
const EMULATOR_TOKEN: &str = "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0.";

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Connect to Firestore. With FIRESTORE_EMULATOR_HOST set, connects to
    /// the emulator unauthenticated instead of resolving GCP credentials.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        let client = if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            Self::emulator_client(project_id).await?
        } else {
            firestore::FirestoreDb::new(project_id).await.map_err(|e| {
                AppError::Database(format!("Failed to connect to Firestore: {}", e))
            })?
        };

        tracing::info!(project = project_id, "Connected to Firestore");
        Ok(Self {
            client: Some(client),
        })
    }

    async fn emulator_client(project_id: &str) -> Result<firestore::FirestoreDb, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(EMULATOR_TOKEN.to_string().into()),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        firestore::FirestoreDb::with_options_token_source(
            firestore::FirestoreDbOptions::new(project_id.to_string()),
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e)))
    }

    /// Offline client for tests; every operation errors.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    // ─── User documents ──────────────────────────────────────────

    /// Get a user document by uid.
    pub async fn get_user(&self, uid: &str) -> Result<Option<UserDoc>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(uid)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create or overwrite a user document.
    pub async fn upsert_user(&self, user: &UserDoc) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(&user.uid)
            .object(user)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Field-level list overwrites ─────────────────────────────
    //
    // Each mutation masks the update to the affected field so a concurrent
    // writer touching another field is not clobbered.

    /// Overwrite only the `history` field from the given document.
    pub async fn set_history(&self, user: &UserDoc) -> Result<(), AppError> {
        self.update_fields(user, ["history"]).await
    }

    /// Overwrite only the `library` field from the given document.
    pub async fn set_library(&self, user: &UserDoc) -> Result<(), AppError> {
        self.update_fields(user, ["library"]).await
    }

    /// Overwrite only the `subscriptions` field from the given document.
    pub async fn set_subscriptions(&self, user: &UserDoc) -> Result<(), AppError> {
        self.update_fields(user, ["subscriptions"]).await
    }

    async fn update_fields<I>(&self, user: &UserDoc, fields: I) -> Result<(), AppError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .fields(fields)
            .in_col(collections::USERS)
            .document_id(&user.uid)
            .object(user)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}
