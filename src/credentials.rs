//! Credential resolution for remote sites.
//!
//! The sync engine never reads tokens directly from the database; it asks a
//! `CredentialResolver` so tests can swap in fixed credentials.

use async_trait::async_trait;

use crate::crypto::{decrypt_api_token, CryptoKey};
use crate::error::EngineError;
use crate::models::project;

/// Plaintext credentials for one Jira site.
#[derive(Debug, Clone)]
pub struct SiteCredentials {
    pub base_url: String,
    pub admin_email: String,
    pub api_token: String,
}

#[async_trait]
pub trait CredentialResolver: Send + Sync {
    async fn resolve(&self, project: &project::Model) -> Result<SiteCredentials, EngineError>;
}

/// Decrypts the token stored on the project row with the configured key.
pub struct EncryptedTokenResolver {
    key: CryptoKey,
}

impl EncryptedTokenResolver {
    pub fn new(key: CryptoKey) -> Self {
        Self { key }
    }
}

#[async_trait]
impl CredentialResolver for EncryptedTokenResolver {
    async fn resolve(&self, project: &project::Model) -> Result<SiteCredentials, EngineError> {
        let api_token = decrypt_api_token(&self.key, project.id, &project.api_token_ciphertext)?;
        Ok(SiteCredentials {
            base_url: project.site_base_url.clone(),
            admin_email: project.admin_email.clone(),
            api_token,
        })
    }
}

/// Returns the same credentials for every project. Test support.
pub struct StaticResolver {
    pub credentials: SiteCredentials,
}

#[async_trait]
impl CredentialResolver for StaticResolver {
    async fn resolve(&self, _project: &project::Model) -> Result<SiteCredentials, EngineError> {
        Ok(self.credentials.clone())
    }
}
