//! OAuth Provider Use Cases
//!
//! Linking a Naver or Kakao account to the signed-in user, and signing in
//! with a linked account. The provider call happens before any local write,
//! so a failed exchange leaves nothing behind.

use std::sync::Arc;

use kernel::id::UserId;

use crate::application::config::AuthConfig;
use crate::application::token::TokenCodec;
use crate::domain::entity::{
    provider_link::{OAuthProvider, ProviderLink},
    token::TokenPair,
};
use crate::domain::identity_provider::IdentityProvider;
use crate::domain::repository::{ProviderLinkRepository, UserRepository};
use crate::error::{AuthError, AuthResult};

// ============================================================================
// Link
// ============================================================================

pub struct LinkProviderUseCase<L, P>
where
    L: ProviderLinkRepository,
    P: IdentityProvider,
{
    link_repo: Arc<L>,
    identity: Arc<P>,
}

impl<L, P> LinkProviderUseCase<L, P>
where
    L: ProviderLinkRepository,
    P: IdentityProvider,
{
    pub fn new(link_repo: Arc<L>, identity: Arc<P>) -> Self {
        Self {
            link_repo,
            identity,
        }
    }

    pub async fn execute(
        &self,
        user_id: UserId,
        provider: OAuthProvider,
        access_token: &str,
    ) -> AuthResult<()> {
        let already_linked = self
            .link_repo
            .find_for_user(user_id)
            .await?
            .iter()
            .any(|link| link.provider == provider);
        if already_linked {
            return Err(AuthError::LinkAlreadyExists);
        }

        let provider_user_id = self
            .identity
            .fetch_account_id(provider, access_token)
            .await?;

        // Account already linked to someone else surfaces here as well
        self.link_repo
            .link(&ProviderLink {
                user_id,
                provider,
                provider_user_id,
            })
            .await?;

        tracing::info!(user_id = %user_id, provider = %provider, "Provider account linked");
        Ok(())
    }
}

// ============================================================================
// Sign in with provider
// ============================================================================

pub struct ProviderSignInUseCase<U, L, P>
where
    U: UserRepository,
    L: ProviderLinkRepository,
    P: IdentityProvider,
{
    user_repo: Arc<U>,
    link_repo: Arc<L>,
    identity: Arc<P>,
    codec: TokenCodec,
}

impl<U, L, P> ProviderSignInUseCase<U, L, P>
where
    U: UserRepository,
    L: ProviderLinkRepository,
    P: IdentityProvider,
{
    pub fn new(
        user_repo: Arc<U>,
        link_repo: Arc<L>,
        identity: Arc<P>,
        config: Arc<AuthConfig>,
    ) -> Self {
        Self {
            user_repo,
            link_repo,
            identity,
            codec: TokenCodec::new(&config),
        }
    }

    pub async fn execute(
        &self,
        provider: OAuthProvider,
        access_token: &str,
    ) -> AuthResult<TokenPair> {
        let provider_user_id = self
            .identity
            .fetch_account_id(provider, access_token)
            .await?;

        let user_id = self
            .link_repo
            .find_user_id(provider, &provider_user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .filter(|user| user.can_sign_in())
            .ok_or(AuthError::UserNotFound)?;

        let pair = self.codec.issue_tokens(&user.login_id)?;

        tracing::info!(user_id = %user.id, provider = %provider, "User signed in with provider");
        Ok(pair)
    }
}
