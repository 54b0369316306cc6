use std::sync::Arc;

use subtle::ConstantTimeEq;
use tracing::{debug, warn};

use crate::error::{AppError, AppResult};

/// Checks the shared access credential carried in request bodies.
///
/// Both endpoints go through the same guard so the comparison is done in one
/// place, in constant time.
#[derive(Clone)]
pub struct AccessGuard {
    secret: Arc<str>,
}

impl AccessGuard {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: Arc::from(secret.into()),
        }
    }

    pub fn is_authorized(&self, candidate: &str) -> bool {
        // Length mismatch short-circuits in ct_eq; only the secret's length can leak.
        !self.secret.is_empty() && bool::from(candidate.as_bytes().ct_eq(self.secret.as_bytes()))
    }

    pub fn verify(&self, candidate: &str, route: &str) -> AppResult<()> {
        if self.is_authorized(candidate) {
            debug!(route = route, "Access credential accepted");
            Ok(())
        } else {
            warn!(route = route, credential_len = candidate.len(), "Access credential rejected");
            Err(AppError::AccessDenied)
        }
    }
}

impl std::fmt::Debug for AccessGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessGuard").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_match_only() {
        let guard = AccessGuard::new("awhdbagydg2718dhdahdai!");
        assert!(guard.is_authorized("awhdbagydg2718dhdahdai!"));
        assert!(!guard.is_authorized("awhdbagydg2718dhdahdai"));
        assert!(!guard.is_authorized("AWHDBAGYDG2718DHDAHDAI!"));
        assert!(!guard.is_authorized(""));
    }

    #[test]
    fn empty_secret_rejects_everything() {
        let guard = AccessGuard::new("");
        assert!(!guard.is_authorized(""));
        assert!(matches!(guard.verify("", "test"), Err(AppError::AccessDenied)));
    }
}
