// ============================================================================
// Structures d'authentification
// ============================================================================
// Corps et réponses des endpoints /register et /token
// ============================================================================

use serde::{Deserialize, Serialize};

/// Identifiants envoyés à /register (JSON) et /token (form-encoded)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    /// Retourne None si l'identifiant ou le mot de passe est vide
    pub fn from_input(username: &str, password: &str) -> Option<Self> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return None;
        }

        Some(Self {
            username: username.to_string(),
            password: password.to_string(),
        })
    }
}

/// Formulaire OAuth2 "password grant" pour /token
#[derive(Debug, Serialize)]
pub(crate) struct TokenForm<'a> {
    pub username: &'a str,
    pub password: &'a str,
    pub grant_type: &'static str,
}

impl<'a> TokenForm<'a> {
    pub fn new(credentials: &'a Credentials) -> Self {
        Self {
            username: &credentials.username,
            password: &credentials.password,
            grant_type: "password",
        }
    }
}

/// Réponse de /token
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
}

/// Réponse de /register
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RegisteredUser {
    #[serde(default)]
    pub id: Option<i64>,
    pub username: String,
    #[serde(default)]
    pub is_active: Option<bool>,
}

/// Corps d'erreur { "detail": ... }
///
/// `detail` est souvent une chaîne, mais les erreurs de validation arrivent
/// sous forme de tableau : on garde la valeur JSON brute.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub detail: serde_json::Value,
}

impl ErrorBody {
    /// Texte affichable du detail
    pub fn message(&self) -> Option<String> {
        match &self.detail {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) if s.trim().is_empty() => None,
            serde_json::Value::String(s) => Some(s.clone()),
            // Erreurs de validation : [{"msg": "..."}, ...]
            serde_json::Value::Array(items) => {
                let msgs: Vec<&str> = items
                    .iter()
                    .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
                    .collect();
                if msgs.is_empty() {
                    Some(self.detail.to_string())
                } else {
                    Some(msgs.join("; "))
                }
            }
            other => Some(other.to_string()),
        }
    }
}
