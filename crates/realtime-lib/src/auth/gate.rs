// ============================
// crates/realtime-lib/src/auth/gate.rs
// ============================
//! Connection-time authentication: credential verification plus identity
//! resolution against the record store.

use super::TokenVerifier;
use crate::error::AppError;
use crate::store::RecordStore;
use hrms_common::Identity;

/// Validates a bearer credential and resolves the connecting identity.
///
/// The role is looked up fresh on every attempt — never cached across
/// reconnects. There are no retries at this layer; a rejected client must
/// open a fresh connection.
pub struct AuthGate {
    verifier: TokenVerifier,
}

impl AuthGate {
    pub fn new(verifier: TokenVerifier) -> Self {
        Self { verifier }
    }

    /// Verify the credential and resolve the identity's current role.
    pub async fn authenticate(
        &self,
        store: &dyn RecordStore,
        token: &str,
    ) -> Result<Identity, AppError> {
        let claims = self.verifier.verify(token)?;

        store
            .find_identity(&claims.user_id)
            .await?
            .ok_or_else(|| AppError::Authentication("IdentityNotFound".to_string()))
    }
}
