// ============================================================================
// Erreurs de la couche HTTP
// ============================================================================
// CONCEPT RUST : thiserror
// - #[derive(Error)] implémente std::error::Error
// - #[error("...")] génère Display
// - #[from] génère From<reqwest::Error> pour l'opérateur ?
//
// Le reste de l'application utilise anyhow (contexte), mais le contrôleur
// doit distinguer "réponse non-ok avec detail serveur" de "erreur réseau".
// ============================================================================

use reqwest::StatusCode;
use thiserror::Error;

/// Échec d'un appel à l'API
#[derive(Debug, Error)]
pub enum ApiError {
    /// Le serveur a répondu avec un statut non-2xx
    #[error("HTTP {status}{}", .detail.as_ref().map(|d| format!(": {d}")).unwrap_or_default())]
    Status {
        status: StatusCode,
        /// Texte du champ `detail` du corps d'erreur, s'il existe
        detail: Option<String>,
    },

    /// Requête impossible (connexion refusée, DNS, TLS...)
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Réponse 2xx mais corps illisible
    #[error("invalid response body: {0}")]
    Decode(String),
}

impl ApiError {
    /// Texte `detail` fourni par le serveur, sinon `fallback`
    ///
    /// Utilisé pour les erreurs d'authentification et d'ajout de société,
    /// où le message du serveur est montré tel quel à l'utilisateur.
    pub fn detail_or(&self, fallback: &str) -> String {
        match self {
            Self::Status {
                detail: Some(detail),
                ..
            } => detail.clone(),
            _ => fallback.to_string(),
        }
    }

    /// Statut HTTP, si le serveur a répondu
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
