// ============================================================================
// Structures : CompanyDetail / Statement
// ============================================================================
// Réponse de GET /companies/{id}/detail : ratios + trois états financiers
// (compte de résultat, bilan, flux de trésorerie) sur 2 à 3 périodes
// ============================================================================

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::Ratios;

/// Cellule d'un état financier : nombre ou texte
///
/// CONCEPT RUST : #[serde(untagged)]
/// - Serde essaie chaque variant dans l'ordre
/// - 123.0 -> Number, "n/a" -> Text
/// - null est géré par l'Option qui entoure la cellule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Number(f64),
    Text(String),
}

/// Un état financier en grille (lignes x périodes)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    /// Libellés des périodes (ex: "2024-12-31")
    #[serde(default)]
    pub columns: Vec<String>,

    /// Libellés des lignes (ex: "Total Revenue")
    #[serde(default)]
    pub index: Vec<String>,

    /// Grille row-major, une ligne par entrée de `index`
    #[serde(default)]
    pub data: Vec<Vec<Option<Cell>>>,
}

impl Statement {
    /// Cellule (ligne, colonne), None si absente ou null
    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.data.get(row)?.get(col)?.as_ref()
    }
}

/// Les trois états financiers, dans l'ordre d'affichage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Income,
    Balance,
    CashFlow,
}

impl StatementKind {
    pub const ALL: [StatementKind; 3] = [Self::Income, Self::Balance, Self::CashFlow];

    pub fn title(&self) -> &'static str {
        match self {
            Self::Income => "Income Statement",
            Self::Balance => "Balance Sheet",
            Self::CashFlow => "Cash Flow",
        }
    }

    /// Onglet suivant (cycle)
    pub fn next(&self) -> Self {
        match self {
            Self::Income => Self::Balance,
            Self::Balance => Self::CashFlow,
            Self::CashFlow => Self::Income,
        }
    }

    /// Onglet précédent (cycle)
    pub fn previous(&self) -> Self {
        match self {
            Self::Income => Self::CashFlow,
            Self::Balance => Self::Income,
            Self::CashFlow => Self::Balance,
        }
    }
}

/// Détail complet d'une société
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyDetail {
    /// Informations libres renvoyées par le fournisseur de données
    #[serde(default)]
    pub info: HashMap<String, serde_json::Value>,

    #[serde(default)]
    pub ratios: Ratios,

    #[serde(default)]
    pub income_statement: Option<Statement>,
    #[serde(default)]
    pub balance_sheet: Option<Statement>,
    #[serde(default)]
    pub cash_flow: Option<Statement>,
}

impl CompanyDetail {
    /// Nom long fourni par `info.longName`, s'il existe et n'est pas vide
    pub fn long_name(&self) -> Option<&str> {
        self.info
            .get("longName")
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn statement(&self, kind: StatementKind) -> Option<&Statement> {
        match kind {
            StatementKind::Income => self.income_statement.as_ref(),
            StatementKind::Balance => self.balance_sheet.as_ref(),
            StatementKind::CashFlow => self.cash_flow.as_ref(),
        }
    }
}

/// Texte narratif généré par le serveur (analytics secteur / société)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsText {
    pub text: String,
}
