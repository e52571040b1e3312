// ============================================================================
// Structures : Ratios / DashboardRow / Dashboard
// ============================================================================
// Ratios financiers calculés par le serveur (GET /dashboard et détail)
//
// CONCEPT RUST : #[serde(flatten)]
// - DashboardRow embarque les champs de Ratios au même niveau JSON
// - Le dashboard et la vue détail partagent ainsi le même type de ratios
// ============================================================================

use serde::{Deserialize, Serialize};

use crate::models::CompanyId;

/// Ratios d'une société, chaque valeur pouvant être absente (null)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Ratios {
    pub price: Option<f64>,
    pub revenue: Option<f64>,
    pub net_income: Option<f64>,
    pub net_margin: Option<f64>,
    pub roe: Option<f64>,
    pub debt_to_equity: Option<f64>,
    pub current_ratio: Option<f64>,
    pub one_year_return: Option<f64>,
}

/// Une ligne du dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardRow {
    pub id: CompanyId,
    pub name: String,
    #[serde(default)]
    pub ticker: String,
    #[serde(default)]
    pub segment: String,

    #[serde(flatten)]
    pub ratios: Ratios,
}

/// Réponse complète de GET /dashboard
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    #[serde(default)]
    pub companies: Vec<DashboardRow>,
}

impl Dashboard {
    pub fn is_empty(&self) -> bool {
        self.companies.is_empty()
    }

    pub fn len(&self) -> usize {
        self.companies.len()
    }
}
