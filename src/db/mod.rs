// SPDX-License-Identifier: MIT

//! Database layer (Firestore).

pub mod firestore;

pub use firestore::FirestoreDb;

/// Collection names as constants.
pub mod collections {
    /// Per-user documents (history, library, subscriptions), keyed by uid
    pub const USERS: &str = "users";
}
