// ============================================================================
// API Client : serveur du dashboard financier
// ============================================================================
// Enveloppe fine autour de reqwest :
// - ajoute "Authorization: Bearer <token>" quand la session en porte un
// - convertit toute réponse non-2xx en ApiError::Status avec le `detail`
// - pas de retry, pas de timeout, pas de backoff
// ============================================================================

use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, error, info, instrument, warn};

use crate::api::{ApiResult, Backend};
use crate::config::normalize_base_url;
use crate::error::ApiError;
use crate::models::auth::TokenForm;
use crate::models::{
    AnalyticsText, Company, CompanyDetail, CompanyId, Credentials, Dashboard, ErrorBody,
    NewCompany, RegisteredUser, TokenResponse,
};
use crate::session::Session;

/// Client HTTP vers l'API
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    /// Crée le client pour une URL de base (ex: "http://127.0.0.1:8000")
    pub fn new(base_url: &str) -> ApiResult<Self> {
        debug!("Creating HTTP client");
        let client = reqwest::Client::builder()
            .user_agent(concat!("findash/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: normalize_base_url(base_url),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL absolue d'un chemin d'API ("/companies" -> "http://.../companies")
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Prépare une requête, avec le token Bearer si la session en a un
    ///
    /// C'est le seul endroit où l'en-tête Authorization est posé.
    pub fn request(&self, method: Method, path: &str, session: &Session) -> RequestBuilder {
        let builder = self.client.request(method, self.url(path));
        match session.bearer() {
            Some(bearer) => builder.header(reqwest::header::AUTHORIZATION, bearer),
            None => builder,
        }
    }

    /// Envoie la requête et vérifie le statut HTTP
    async fn send(builder: RequestBuilder) -> ApiResult<Response> {
        let response = builder.send().await?;
        let status = response.status();
        debug!(status = %status, "Received HTTP response");

        if status.is_success() {
            return Ok(response);
        }

        // Corps d'erreur { "detail": ... } si le serveur en fournit un
        let detail = response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(|body| body.message());
        warn!(status = %status, detail = ?detail, "Server returned error status");

        Err(ApiError::Status { status, detail })
    }

    /// Envoie la requête et désérialise le JSON de la réponse
    async fn send_json<T: DeserializeOwned>(builder: RequestBuilder) -> ApiResult<T> {
        let response = Self::send(builder).await?;
        response.json::<T>().await.map_err(|e| {
            error!(error = %e, "Failed to parse JSON response");
            ApiError::Decode(e.to_string())
        })
    }

    /// Envoie la requête ; seul le statut décide du succès
    ///
    /// Le corps est décodé si possible, sinon None (corps vide, autre forme).
    async fn send_optional_json<T: DeserializeOwned>(builder: RequestBuilder) -> ApiResult<Option<T>> {
        let response = Self::send(builder).await?;
        let bytes = response.bytes().await?;
        match serde_json::from_slice::<T>(&bytes) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                debug!(error = %e, bytes = bytes.len(), "Success response without expected body");
                Ok(None)
            }
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, session: &Session, path: &str) -> ApiResult<T> {
        Self::send_json(self.request(Method::GET, path, session)).await
    }
}

impl Backend for HttpBackend {
    #[instrument(skip(self, credentials), fields(username = %credentials.username))]
    async fn register(&self, credentials: &Credentials) -> ApiResult<Option<RegisteredUser>> {
        let builder = self
            .request(Method::POST, "/register", &Session::anonymous())
            .json(credentials);
        let user: Option<RegisteredUser> = Self::send_optional_json(builder).await?;
        info!(user_id = ?user.as_ref().and_then(|u| u.id), "User registered");
        Ok(user)
    }

    #[instrument(skip(self, credentials), fields(username = %credentials.username))]
    async fn login(&self, credentials: &Credentials) -> ApiResult<TokenResponse> {
        let builder = self
            .request(Method::POST, "/token", &Session::anonymous())
            .form(&TokenForm::new(credentials));
        Self::send_json(builder).await
    }

    #[instrument(skip_all)]
    async fn list_companies(&self, session: &Session) -> ApiResult<Vec<Company>> {
        let companies: Vec<Company> = self.get_json(session, "/companies").await?;
        debug!(count = companies.len(), "Companies fetched");
        Ok(companies)
    }

    #[instrument(skip(self, session), fields(ticker = %company.ticker))]
    async fn create_company(
        &self,
        session: &Session,
        company: &NewCompany,
    ) -> ApiResult<Option<Company>> {
        let builder = self.request(Method::POST, "/companies", session).json(company);
        Self::send_optional_json(builder).await
    }

    #[instrument(skip(self, session))]
    async fn delete_company(&self, session: &Session, id: CompanyId) -> ApiResult<StatusCode> {
        let path = format!("/companies/{}", id);
        let response = Self::send(self.request(Method::DELETE, &path, session)).await?;
        Ok(response.status())
    }

    #[instrument(skip_all)]
    async fn dashboard(&self, session: &Session) -> ApiResult<Dashboard> {
        let dashboard: Dashboard = self.get_json(session, "/dashboard").await?;
        debug!(rows = dashboard.len(), "Dashboard fetched");
        Ok(dashboard)
    }

    #[instrument(skip(self, session))]
    async fn company_detail(&self, session: &Session, id: CompanyId) -> ApiResult<CompanyDetail> {
        self.get_json(session, &format!("/companies/{}/detail", id)).await
    }

    #[instrument(skip_all)]
    async fn sector_analytics(&self, session: &Session) -> ApiResult<AnalyticsText> {
        self.get_json(session, "/analytics/sector").await
    }

    #[instrument(skip(self, session))]
    async fn company_analytics(&self, session: &Session, id: CompanyId) -> ApiResult<AnalyticsText> {
        self.get_json(session, &format!("/analytics/company/{}", id)).await
    }

    #[instrument(skip(self, session))]
    async fn download_report(&self, session: &Session, id: CompanyId) -> ApiResult<Vec<u8>> {
        let path = format!("/companies/{}/download", id);
        let response = Self::send(self.request(Method::GET, &path, session)).await?;
        let bytes = response.bytes().await?;
        info!(bytes = bytes.len(), "Report downloaded");
        Ok(bytes.to_vec())
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::AUTHORIZATION;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serveur HTTP d'une seule requête : répond `response` puis ferme
    async fn serve_once(response: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 8192];
            let _ = socket.read(&mut buf).await;
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
        });

        format!("http://{}", addr)
    }

    #[test]
    fn test_url_building() {
        let backend = HttpBackend::new("http://localhost:8000/").unwrap();
        assert_eq!(backend.base_url(), "http://localhost:8000");
        assert_eq!(backend.url("/companies/3/detail"), "http://localhost:8000/companies/3/detail");
    }

    #[test]
    fn test_bearer_header_attached_when_token_present() {
        let backend = HttpBackend::new("http://localhost:8000").unwrap();

        let session = Session::authenticated("tok123", "alice");
        let request = backend
            .request(Method::GET, "/dashboard", &session)
            .build()
            .unwrap();
        assert_eq!(request.headers().get(AUTHORIZATION).unwrap(), "Bearer tok123");

        let request = backend
            .request(Method::GET, "/dashboard", &Session::anonymous())
            .build()
            .unwrap();
        assert!(request.headers().get(AUTHORIZATION).is_none());
    }

    #[test]
    fn test_token_form_is_url_encoded() {
        let backend = HttpBackend::new("http://localhost:8000").unwrap();
        let credentials = Credentials::from_input("alice", "p&ss").unwrap();

        let request = backend
            .request(Method::POST, "/token", &Session::anonymous())
            .form(&TokenForm::new(&credentials))
            .build()
            .unwrap();

        let body = request.body().and_then(|b| b.as_bytes()).unwrap();
        let body = std::str::from_utf8(body).unwrap();
        assert_eq!(body, "username=alice&password=p%26ss&grant_type=password");
        assert_eq!(
            request.headers().get(reqwest::header::CONTENT_TYPE).unwrap(),
            "application/x-www-form-urlencoded"
        );
    }

    #[tokio::test]
    async fn test_register_created_without_body_succeeds() {
        let base = serve_once("HTTP/1.1 201 Created\r\ncontent-length: 0\r\nconnection: close\r\n\r\n").await;
        let backend = HttpBackend::new(&base).unwrap();
        let credentials = Credentials::from_input("alice", "pw").unwrap();

        let user = backend.register(&credentials).await.unwrap();
        assert!(user.is_none());
    }

    #[tokio::test]
    async fn test_create_company_with_unexpected_body_succeeds() {
        let base = serve_once(
            "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: 15\r\nconnection: close\r\n\r\n{\"status\":\"ok\"}",
        )
        .await;
        let backend = HttpBackend::new(&base).unwrap();
        let company = NewCompany::from_input("DSV", "DSV.CO", "Forwarding").unwrap();

        let created = backend
            .create_company(&Session::authenticated("t", "alice"), &company)
            .await
            .unwrap();
        assert!(created.is_none());
    }

    #[tokio::test]
    async fn test_error_status_carries_server_detail() {
        let base = serve_once(
            "HTTP/1.1 400 Bad Request\r\ncontent-type: application/json\r\ncontent-length: 35\r\nconnection: close\r\n\r\n{\"detail\":\"Username already taken\"}",
        )
        .await;
        let backend = HttpBackend::new(&base).unwrap();
        let credentials = Credentials::from_input("alice", "pw").unwrap();

        match backend.register(&credentials).await {
            Err(ApiError::Status { status, detail }) => {
                assert_eq!(status, StatusCode::BAD_REQUEST);
                assert_eq!(detail.as_deref(), Some("Username already taken"));
            }
            other => panic!("expected status error, got {:?}", other.is_ok()),
        }
    }

    #[tokio::test]
    async fn test_unreachable_server_is_transport_error() {
        // Port 9 (discard) : connexion refusée sur une machine de test
        let backend = HttpBackend::new("http://127.0.0.1:9").unwrap();
        let result = backend.dashboard(&Session::authenticated("t", "u")).await;

        match result {
            Err(ApiError::Transport(_)) => {}
            other => panic!("expected transport error, got {:?}", other.map(|d| d.len())),
        }
    }
}
