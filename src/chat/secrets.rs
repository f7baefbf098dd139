use super::error::ChatError;
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::debug;

/// Secret name under which the chat backend credential is stored
pub const CHAT_API_KEY: &str = "chat_api_key";

/// Credential storage at rest
pub trait SecretStore: Send + Sync {
    fn get(&self, name: &str) -> Result<Option<String>, ChatError>;
    fn set(&self, name: &str, value: &str) -> Result<(), ChatError>;
    fn delete(&self, name: &str) -> Result<(), ChatError>;

    fn has(&self, name: &str) -> bool {
        matches!(self.get(name), Ok(Some(v)) if !v.is_empty())
    }
}

/// Read-only store backed by a single environment variable
pub struct EnvSecretStore {
    var: String,
}

impl EnvSecretStore {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl SecretStore for EnvSecretStore {
    fn get(&self, name: &str) -> Result<Option<String>, ChatError> {
        if name != CHAT_API_KEY {
            return Ok(None);
        }
        match std::env::var(&self.var) {
            Ok(value) if !value.trim().is_empty() => Ok(Some(value.trim().to_string())),
            _ => {
                debug!("No credential in environment variable {}", self.var);
                Ok(None)
            }
        }
    }

    fn set(&self, _name: &str, _value: &str) -> Result<(), ChatError> {
        Err(ChatError::Secret(format!(
            "Credentials are read from the {} environment variable",
            self.var
        )))
    }

    fn delete(&self, name: &str) -> Result<(), ChatError> {
        self.set(name, "")
    }
}

/// Process-local store
#[derive(Default)]
pub struct MemorySecretStore {
    secrets: RwLock<HashMap<String, String>>,
}

impl MemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SecretStore for MemorySecretStore {
    fn get(&self, name: &str) -> Result<Option<String>, ChatError> {
        Ok(self.secrets.read().get(name).cloned())
    }

    fn set(&self, name: &str, value: &str) -> Result<(), ChatError> {
        self.secrets.write().insert(name.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, name: &str) -> Result<(), ChatError> {
        self.secrets.write().remove(name);
        Ok(())
    }
}

/// Display form of a credential: `***` plus its last four characters
pub fn masked_hint(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    let tail: String = chars[chars.len().saturating_sub(4)..].iter().collect();
    format!("***{}", tail)
}
