//! Shared bearer/refresh token state

use tokio::sync::RwLock;

/// A point-in-time copy of the held tokens
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tokens {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

/// Tokens issued by a successful exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenGrant {
    pub access_token: String,
    /// Absent when the provider keeps the previous refresh token valid
    pub refresh_token: Option<String>,
}

/// Process-wide credential pair, shared by reference between the API client
/// and the auth gateway.
///
/// The only mutation is [`CredentialStore::replace`], which swaps the pair
/// under a single write lock.
#[derive(Debug, Default)]
pub struct CredentialStore {
    tokens: RwLock<Tokens>,
}

impl CredentialStore {
    pub fn new(access_token: Option<String>, refresh_token: Option<String>) -> Self {
        Self {
            tokens: RwLock::new(Tokens {
                access_token,
                refresh_token,
            }),
        }
    }

    pub async fn snapshot(&self) -> Tokens {
        self.tokens.read().await.clone()
    }

    pub async fn access_token(&self) -> Option<String> {
        self.tokens.read().await.access_token.clone()
    }

    pub async fn refresh_token(&self) -> Option<String> {
        self.tokens.read().await.refresh_token.clone()
    }

    pub async fn has_refresh_token(&self) -> bool {
        self.tokens.read().await.refresh_token.is_some()
    }

    /// Install a new grant. The refresh token is kept when the grant has none.
    pub async fn replace(&self, grant: TokenGrant) {
        let mut tokens = self.tokens.write().await;
        tokens.access_token = Some(grant.access_token);
        if let Some(refresh_token) = grant.refresh_token {
            tokens.refresh_token = Some(refresh_token);
        }
    }
}
