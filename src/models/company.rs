// ============================================================================
// Structure : Company
// ============================================================================
// Société suivie par l'utilisateur, telle que renvoyée par GET /companies
//
// CONCEPTS RUST :
// 1. #[derive(Serialize, Deserialize)] : conversion JSON automatique (serde)
// 2. Validation côté client avant tout appel réseau
// ============================================================================

use serde::{Deserialize, Serialize};

/// Identifiant serveur d'une société
pub type CompanyId = i64;

/// Société enregistrée côté serveur
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub id: CompanyId,

    /// Nom affiché (ex: "DHL Group")
    pub name: String,

    /// Symbole boursier (ex: "DHL.DE")
    pub ticker: String,

    /// Segment logistique (ex: "Parcel", "Freight")
    pub segment: String,
}

impl Company {
    /// Ligne affichée dans la liste des sociétés
    pub fn label(&self) -> String {
        format!("{} ({}) - {}", self.name, self.ticker, self.segment)
    }
}

/// Corps de la requête POST /companies
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewCompany {
    pub name: String,
    pub ticker: String,
    pub segment: String,
}

impl NewCompany {
    /// Construit la requête à partir des champs saisis
    ///
    /// Retourne None si l'un des trois champs est vide (après trim) :
    /// dans ce cas aucun appel réseau ne doit partir.
    pub fn from_input(name: &str, ticker: &str, segment: &str) -> Option<Self> {
        let (name, ticker, segment) = (name.trim(), ticker.trim(), segment.trim());
        if name.is_empty() || ticker.is_empty() || segment.is_empty() {
            return None;
        }

        Some(Self {
            name: name.to_string(),
            ticker: ticker.to_string(),
            segment: segment.to_string(),
        })
    }
}
