//! Identity provider collaborator
//!
//! Exchanges a provider access token for the provider-scoped account id.

use crate::domain::entity::provider_link::OAuthProvider;
use crate::error::AuthResult;

#[trait_variant::make(IdentityProvider: Send)]
pub trait LocalIdentityProvider {
    /// Resolve the account id behind `access_token`.
    ///
    /// Fails with `InvalidProviderToken` when the provider rejects the
    /// token and `ProviderApiError` for transport or other non-200 errors.
    async fn fetch_account_id(
        &self,
        provider: OAuthProvider,
        access_token: &str,
    ) -> AuthResult<String>;
}
