//! Seam between the dispatcher and the remote authority.

use doorway_core::Credential;
use doorway_network::{Verification, VerificationClient};
use std::future::Future;
use std::sync::Arc;

/// Something that can decide on a credential.
///
/// Implemented by [`VerificationClient`]; tests substitute scripted
/// verifiers. Like the device traits, the method returns a `Send` future so
/// dispatchers generic over the verifier can run in spawned tasks.
pub trait Verifier: Send + Sync {
    /// Verify one credential. Never fails: failures are a non-accepted
    /// [`Verification`].
    fn verify(&self, credential: &Credential) -> impl Future<Output = Verification> + Send;
}

impl Verifier for VerificationClient {
    async fn verify(&self, credential: &Credential) -> Verification {
        match credential {
            Credential::Tag { id } => self.verify_tag(id).await,
            Credential::Code { payload } => self.verify_token(payload).await,
        }
    }
}

impl<V: Verifier> Verifier for Arc<V> {
    fn verify(&self, credential: &Credential) -> impl Future<Output = Verification> + Send {
        (**self).verify(credential)
    }
}
