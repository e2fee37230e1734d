pub mod core_auth;

pub use core_auth::{AnonymousAuthenticator, PasswdEntry, PasswdFileAuthenticator};

use crate::config::Config;
use anyhow::{bail, Context};
use async_trait::async_trait;
use std::sync::Arc;

/// Outcome of a credential check. `reason` is only meaningful on failure.
#[derive(Debug, Clone)]
pub struct AuthResult {
    pub succeeded: bool,
    pub reason: Option<String>,
}

impl AuthResult {
    pub fn success() -> Self {
        Self {
            succeeded: true,
            reason: None,
        }
    }

    pub fn failure(reason: impl Into<String>) -> Self {
        Self {
            succeeded: false,
            reason: Some(reason.into()),
        }
    }
}

#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self, username: &str, password: &str) -> AuthResult;
}

/// Selects an authenticator backend by its configured name.
pub fn create_authenticator(config: &Config) -> anyhow::Result<Arc<dyn Authenticator>> {
    match config.server.auth_backend.as_str() {
        "anonymous" => Ok(Arc::new(AnonymousAuthenticator)),
        "passwd" => {
            let path = config
                .server
                .passwd_file
                .as_deref()
                .context("auth_backend = \"passwd\" requires passwd_file")?;
            Ok(Arc::new(PasswdFileAuthenticator::load(path)?))
        }
        other => bail!("Unknown auth backend: {}", other),
    }
}
