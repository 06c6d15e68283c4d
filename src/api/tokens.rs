use crate::error::{PortalError, Result};
use crate::models::Identity;
use jsonwebtoken::{decode, DecodingKey, Validation};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};

/// Which session a token belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenSlot {
    Member,
    Admin,
}

impl TokenSlot {
    /// Storage key for this slot
    pub fn key(&self) -> &'static str {
        match self {
            TokenSlot::Member => "token",
            TokenSlot::Admin => "admin-token",
        }
    }
}

/// Persisted key/value storage for session tokens.
pub trait TokenStore: Send + Sync {
    fn get(&self, slot: TokenSlot) -> Option<String>;
    fn set(&self, slot: TokenSlot, token: &str) -> Result<()>;
    fn remove(&self, slot: TokenSlot) -> Result<()>;

    /// Token to attach to an outgoing request: admin wins when both are present.
    fn preferred(&self) -> Option<String> {
        self.get(TokenSlot::Admin)
            .or_else(|| self.get(TokenSlot::Member))
    }
}

/// Tokens kept for the lifetime of the process
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    tokens: Mutex<HashMap<&'static str, String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self, slot: TokenSlot) -> Option<String> {
        self.tokens.lock().ok()?.get(slot.key()).cloned()
    }

    fn set(&self, slot: TokenSlot, token: &str) -> Result<()> {
        self.tokens
            .lock()
            .map_err(|_| PortalError::Storage("token map poisoned".to_string()))?
            .insert(slot.key(), token.to_string());
        Ok(())
    }

    fn remove(&self, slot: TokenSlot) -> Result<()> {
        self.tokens
            .lock()
            .map_err(|_| PortalError::Storage("token map poisoned".to_string()))?
            .remove(slot.key());
        Ok(())
    }
}

/// Tokens persisted as one JSON document in a directory.
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    tokens: Mutex<HashMap<String, String>>,
}

impl FileTokenStore {
    pub const FILE_NAME: &'static str = "tokens.json";

    /// Open (or start) the token file under `dir`.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)
            .map_err(|e| PortalError::Storage(format!("{}: {}", dir.display(), e)))?;

        let path = dir.join(Self::FILE_NAME);
        let tokens = match std::fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!("Ignoring unreadable token file {}: {}", path.display(), e);
                HashMap::new()
            }),
            Err(_) => HashMap::new(),
        };
        debug!("Opened token store at {}", path.display());

        Ok(Self {
            path,
            tokens: Mutex::new(tokens),
        })
    }

    fn write(&self, tokens: &HashMap<String, String>) -> Result<()> {
        let json = serde_json::to_string_pretty(tokens)?;
        std::fs::write(&self.path, json)
            .map_err(|e| PortalError::Storage(format!("{}: {}", self.path.display(), e)))
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self, slot: TokenSlot) -> Option<String> {
        self.tokens.lock().ok()?.get(slot.key()).cloned()
    }

    fn set(&self, slot: TokenSlot, token: &str) -> Result<()> {
        let mut tokens = self
            .tokens
            .lock()
            .map_err(|_| PortalError::Storage("token map poisoned".to_string()))?;
        tokens.insert(slot.key().to_string(), token.to_string());
        self.write(&tokens)
    }

    fn remove(&self, slot: TokenSlot) -> Result<()> {
        let mut tokens = self
            .tokens
            .lock()
            .map_err(|_| PortalError::Storage("token map poisoned".to_string()))?;
        if tokens.remove(slot.key()).is_some() {
            self.write(&tokens)?;
        }
        Ok(())
    }
}

/// Decode the identity payload of a session token.
///
/// The signature is not verified: the server is the only party that can, and
/// it re-checks the token on every request anyway.
pub fn decode_identity(token: &str) -> Result<Identity> {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    let data = decode::<Identity>(token, &DecodingKey::from_secret(&[]), &validation)?;
    Ok(data.claims)
}
