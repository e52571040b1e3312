// ============================================================================
// Configuration
// ============================================================================
// Lue depuis les variables d'environnement au démarrage :
//
// - FINDASH_API_URL      : URL de base de l'API (défaut http://127.0.0.1:8000)
// - FINDASH_DATA_DIR     : session persistée + logs (défaut ~/.local/share/findash)
// - FINDASH_DOWNLOAD_DIR : dossier des rapports .xlsx (défaut ~/Downloads)
// ============================================================================

use std::path::PathBuf;

/// URL utilisée quand FINDASH_API_URL n'est pas définie
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";

pub const API_URL_VAR: &str = "FINDASH_API_URL";
pub const DATA_DIR_VAR: &str = "FINDASH_DATA_DIR";
pub const DOWNLOAD_DIR_VAR: &str = "FINDASH_DOWNLOAD_DIR";

/// Configuration de l'application
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// URL de base, sans "/" final
    pub api_base_url: String,

    /// Répertoire des données locales (session.json, logs/)
    pub data_dir: PathBuf,

    /// Répertoire où sont enregistrés les rapports téléchargés
    pub download_dir: PathBuf,
}

impl Config {
    /// Charge la configuration depuis l'environnement du processus
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Charge la configuration depuis une fonction de lookup
    ///
    /// CONCEPT RUST : Generics avec trait bound Fn
    /// - Les tests passent une closure au lieu de modifier l'environnement
    ///   global du processus (partagé entre threads de test)
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_base_url = non_empty(API_URL_VAR)
            .map(|url| normalize_base_url(&url))
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let data_dir = non_empty(DATA_DIR_VAR)
            .map(PathBuf::from)
            .or_else(|| dirs::data_dir().map(|dir| dir.join("findash")))
            .unwrap_or_else(|| PathBuf::from("./.findash"));

        let download_dir = non_empty(DOWNLOAD_DIR_VAR)
            .map(PathBuf::from)
            .or_else(dirs::download_dir)
            .unwrap_or_else(|| PathBuf::from("."));

        Self {
            api_base_url,
            data_dir,
            download_dir,
        }
    }

    /// Fichier de session persistée
    pub fn session_file(&self) -> PathBuf {
        self.data_dir.join("session.json")
    }

    /// Répertoire des logs
    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join("logs")
    }
}

/// Supprime les espaces et les "/" finaux
pub fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}
