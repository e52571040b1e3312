// ============================================================================
// Module : api
// ============================================================================
// Accès à l'API REST du dashboard financier.
//
// CONCEPT RUST : Trait comme point d'injection
// - Le contrôleur est générique sur `Backend`
// - En production : HttpBackend (reqwest)
// - En test : un faux backend qui enregistre les appels
// ============================================================================

pub mod client; // Client HTTP reqwest

pub use client::HttpBackend;

use reqwest::StatusCode;

use crate::error::ApiError;
use crate::models::{
    AnalyticsText, Company, CompanyDetail, CompanyId, Credentials, Dashboard, NewCompany,
    RegisteredUser, TokenResponse,
};
use crate::session::Session;

/// Résultat d'un appel API
pub type ApiResult<T> = Result<T, ApiError>;

/// Opérations exposées par le serveur
///
/// Les appels authentifiés reçoivent la session explicitement : c'est elle
/// qui fournit le token Bearer.
#[allow(async_fn_in_trait)]
pub trait Backend {
    /// POST /register (JSON)
    ///
    /// Tout statut 2xx est un succès ; le corps n'est décodé qu'à titre
    /// informatif (None s'il est vide ou inattendu).
    async fn register(&self, credentials: &Credentials) -> ApiResult<Option<RegisteredUser>>;

    /// POST /token (form-encoded, grant_type=password)
    async fn login(&self, credentials: &Credentials) -> ApiResult<TokenResponse>;

    /// GET /companies
    async fn list_companies(&self, session: &Session) -> ApiResult<Vec<Company>>;

    /// POST /companies
    async fn create_company(
        &self,
        session: &Session,
        company: &NewCompany,
    ) -> ApiResult<Option<Company>>;

    /// DELETE /companies/{id}, retourne le statut (204 attendu)
    async fn delete_company(&self, session: &Session, id: CompanyId) -> ApiResult<StatusCode>;

    /// GET /dashboard
    async fn dashboard(&self, session: &Session) -> ApiResult<Dashboard>;

    /// GET /companies/{id}/detail
    async fn company_detail(&self, session: &Session, id: CompanyId) -> ApiResult<CompanyDetail>;

    /// GET /analytics/sector
    async fn sector_analytics(&self, session: &Session) -> ApiResult<AnalyticsText>;

    /// GET /analytics/company/{id}
    async fn company_analytics(&self, session: &Session, id: CompanyId) -> ApiResult<AnalyticsText>;

    /// GET /companies/{id}/download (contenu binaire .xlsx)
    async fn download_report(&self, session: &Session, id: CompanyId) -> ApiResult<Vec<u8>>;
}
