// ============================================================================
// Session : token + nom d'utilisateur
// ============================================================================
// La session vit en mémoire dans le contrôleur et est recopiée dans un
// stockage durable (fichier JSON) pour survivre au redémarrage.
//
// CONCEPTS RUST :
// 1. Trait SessionStore : le stockage est injecté (fichier en prod,
//    mémoire dans les tests)
// 2. Option<String> : session absente tant qu'aucun login n'a réussi
// ============================================================================

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Contexte de session passé à chaque appel réseau
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    token: Option<String>,
    username: Option<String>,
}

impl Session {
    /// Session anonyme (aucun token)
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Session authentifiée
    pub fn authenticated(token: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            username: Some(username.into()),
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// Vrai si un token est présent
    pub fn is_active(&self) -> bool {
        self.token.is_some()
    }

    /// Valeur de l'en-tête Authorization, si un token est présent
    pub fn bearer(&self) -> Option<String> {
        self.token.as_ref().map(|token| format!("Bearer {}", token))
    }

    pub fn clear(&mut self) {
        self.token = None;
        self.username = None;
    }
}

/// Forme persistée : deux chaînes sous des clés fixes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSession {
    pub access_token: String,
    pub username: String,
}

impl From<StoredSession> for Session {
    fn from(stored: StoredSession) -> Self {
        Session::authenticated(stored.access_token, stored.username)
    }
}

/// Stockage durable de la session
pub trait SessionStore {
    /// Charge la session persistée (None si absente)
    fn load(&self) -> Result<Option<StoredSession>>;

    /// Persiste la session
    fn save(&self, session: &StoredSession) -> Result<()>;

    /// Supprime la session persistée
    fn clear(&self) -> Result<()>;
}

// ============================================================================
// Stockage fichier
// ============================================================================

/// Session persistée dans un fichier JSON (ex: ~/.local/share/findash/session.json)
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<StoredSession>> {
        if !self.path.exists() {
            debug!(path = ?self.path, "No stored session");
            return Ok(None);
        }

        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("Échec de la lecture de {}", self.path.display()))?;

        // Un fichier corrompu équivaut à une session absente
        match serde_json::from_str::<StoredSession>(&raw) {
            Ok(stored) if !stored.access_token.is_empty() && !stored.username.is_empty() => {
                Ok(Some(stored))
            }
            Ok(_) => Ok(None),
            Err(e) => {
                warn!(path = ?self.path, error = %e, "Ignoring unreadable session file");
                Ok(None)
            }
        }
    }

    fn save(&self, session: &StoredSession) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).context("Échec de la création du répertoire de données")?;
        }

        let json = serde_json::to_string_pretty(session)?;
        fs::write(&self.path, json)
            .with_context(|| format!("Échec de l'écriture de {}", self.path.display()))?;
        debug!(path = ?self.path, "Session saved");
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)
                .with_context(|| format!("Échec de la suppression de {}", self.path.display()))?;
        }
        Ok(())
    }
}

// ============================================================================
// Stockage mémoire (tests)
// ============================================================================

/// Stockage en mémoire, utile pour les tests
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    inner: Mutex<Option<StoredSession>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: StoredSession) -> Self {
        Self {
            inner: Mutex::new(Some(session)),
        }
    }

    /// Copie du contenu actuel
    pub fn snapshot(&self) -> Option<StoredSession> {
        self.inner.lock().ok().and_then(|guard| guard.clone())
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<StoredSession>> {
        Ok(self.snapshot())
    }

    fn save(&self, session: &StoredSession) -> Result<()> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| anyhow::anyhow!("session store poisoned"))?;
        *guard = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| anyhow::anyhow!("session store poisoned"))?;
        *guard = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("findash-session-{}-{}", name, std::process::id()))
            .join("session.json")
    }

    #[test]
    fn test_bearer_only_with_token() {
        assert_eq!(Session::anonymous().bearer(), None);
        assert!(!Session::anonymous().is_active());

        let session = Session::authenticated("abc", "alice");
        assert_eq!(session.bearer().as_deref(), Some("Bearer abc"));
        assert_eq!(session.username(), Some("alice"));
    }

    #[test]
    fn test_file_store_roundtrip_and_clear() {
        let path = temp_path("roundtrip");
        let store = FileSessionStore::new(&path);
        assert_eq!(store.load().unwrap(), None);

        let stored = StoredSession {
            access_token: "tok".to_string(),
            username: "alice".to_string(),
        };
        store.save(&stored).unwrap();
        assert_eq!(store.load().unwrap(), Some(stored));

        store.clear().unwrap();
        assert!(!path.exists());
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_file_store_ignores_garbage() {
        let path = temp_path("garbage");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "not json").unwrap();

        let store = FileSessionStore::new(&path);
        assert_eq!(store.load().unwrap(), None);
        store.clear().unwrap();
    }
}
