// ============================================================================
// Module : models
// ============================================================================
// Ce module contient les view-models miroirs des réponses du serveur.
// Rien n'est possédé ni mis en cache côté client : chaque structure est
// récupérée à la demande, affichée une fois, puis remplacée.
// ============================================================================

pub mod auth;      // Identifiants, token, erreurs { detail }
pub mod company;   // Sociétés suivies
pub mod dashboard; // Ratios et lignes du dashboard
pub mod detail;    // Détail société et états financiers

// Re-export des structures principales pour simplifier les imports
// On peut faire : use findash::models::Company;
pub use auth::{Credentials, ErrorBody, RegisteredUser, TokenResponse};
pub use company::{Company, CompanyId, NewCompany};
pub use dashboard::{Dashboard, DashboardRow, Ratios};
pub use detail::{AnalyticsText, Cell, CompanyDetail, Statement, StatementKind};
