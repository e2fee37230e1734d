use crate::core_auth::{AuthResult, Authenticator};
use anyhow::Context;
use async_trait::async_trait;
use bcrypt::verify;
use log::{info, warn};
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct PasswdEntry {
    username: String,
    hashed_password: String,
}

impl PasswdEntry {
    pub fn from_line(line: &str) -> Option<Self> {
        let parts: Vec<&str> = line.split(':').collect();
        if parts.len() != 2 {
            return None;
        }
        let entry = PasswdEntry {
            username: parts[0].to_string(),
            hashed_password: parts[1].to_string(),
        };

        Some(entry)
    }

    pub fn get_hashed_password(&self) -> &str {
        &self.hashed_password
    }

    pub fn get_username(&self) -> &str {
        &self.username
    }
}

/// Checks credentials against a `username:bcrypt-hash` file loaded at
/// startup.
pub struct PasswdFileAuthenticator {
    entries: HashMap<String, PasswdEntry>,
}

impl PasswdFileAuthenticator {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read passwd file: {}", path))?;
        let mut entries = HashMap::new();
        for line in content.lines() {
            if let Some(entry) = PasswdEntry::from_line(line) {
                entries.insert(entry.get_username().to_string(), entry);
            }
        }
        info!("Loaded {} user entries from {}", entries.len(), path);
        Ok(Self { entries })
    }

    pub fn from_entries(entries: Vec<PasswdEntry>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|e| (e.get_username().to_string(), e))
                .collect(),
        }
    }
}

#[async_trait]
impl Authenticator for PasswdFileAuthenticator {
    async fn authenticate(&self, username: &str, password: &str) -> AuthResult {
        match self.entries.get(username) {
            Some(entry) => {
                if verify(password, entry.get_hashed_password()).unwrap_or(false) {
                    AuthResult::success()
                } else {
                    warn!("Password mismatch for user {}", username);
                    AuthResult::failure("Login incorrect")
                }
            }
            None => {
                warn!("Unknown user {}", username);
                AuthResult::failure("Login incorrect")
            }
        }
    }
}

/// Accepts the conventional anonymous identities with any password.
pub struct AnonymousAuthenticator;

#[async_trait]
impl Authenticator for AnonymousAuthenticator {
    async fn authenticate(&self, username: &str, _password: &str) -> AuthResult {
        match username.to_ascii_lowercase().as_str() {
            "anonymous" | "ftp" => AuthResult::success(),
            _ => AuthResult::failure("Only anonymous login is allowed"),
        }
    }
}
