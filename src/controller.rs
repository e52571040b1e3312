// ============================================================================
// Contrôleur : les handlers de l'application
// ============================================================================
// Chaque action utilisateur (login, ajout de société, détail, ...) devient
// une méthode async du contrôleur. Le contrôleur ne dessine rien : il émet
// des `Update`, chacune remplaçant entièrement une zone de l'écran.
//
// CONCEPTS RUST :
// 1. Generics : Controller<B: Backend, S: SessionStore> (injection)
// 2. Rc<RefCell<Session>> : état partagé entre tâches locales (un seul thread)
// 3. tokio::join! : la seule composition concurrente (sociétés + dashboard)
// 4. mpsc::Sender : les mises à jour partent vers la boucle d'événements
// ============================================================================

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::mpsc;

use anyhow::{Context, Result};
use reqwest::StatusCode;
use tokio::fs;
use tracing::{debug, error, info, warn};

use crate::api::Backend;
use crate::error::ApiError;
use crate::format::report_filename;
use crate::models::{Company, CompanyId, Credentials, Dashboard, NewCompany};
use crate::session::{Session, SessionStore, StoredSession};
use crate::view::{detail_view, messages, DetailView};

// ============================================================================
// Commandes et mises à jour
// ============================================================================

/// Commandes envoyées par la boucle d'événements au worker
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Au démarrage : reprend la session persistée s'il y en a une
    Restore,
    Register { username: String, password: String },
    Login { username: String, password: String },
    Logout,
    /// Recharge la liste des sociétés et le dashboard
    Reload,
    AddCompany { name: String, ticker: String, segment: String },
    /// Suppression déjà confirmée par l'utilisateur
    DeleteCompany { id: CompanyId },
    /// Ouvre le détail ; `name` sert de titre si le serveur n'en fournit pas
    LoadDetail { id: CompanyId, name: Option<String> },
    SectorAnalytics,
    Download { id: CompanyId, name: String },
}

/// Contenu d'une zone de l'écran
#[derive(Debug, Clone, PartialEq)]
pub enum Region<T> {
    Loading,
    Ready(T),
    Failed(&'static str),
}

/// Résultat du formulaire d'ajout de société
#[derive(Debug, Clone, PartialEq)]
pub enum FormOutcome {
    /// Succès : vider les champs
    Cleared,
    /// Message à afficher sous le formulaire
    Message(String),
}

/// Mises à jour renvoyées à l'interface
///
/// Chaque variant remplace entièrement sa zone : l'ordre d'arrivée entre
/// handlers indépendants n'a donc pas d'importance.
#[derive(Debug, Clone, PartialEq)]
pub enum Update {
    ShowLogin,
    ShowMain { username: String },
    /// Message sous le formulaire de connexion
    AuthMessage(String),
    Companies(Region<Vec<Company>>),
    Dashboard(Region<Dashboard>),
    CompanyForm(FormOutcome),
    /// Détail d'une société : ignoré si l'écran montre une autre société
    Detail {
        company_id: CompanyId,
        region: Region<DetailView>,
    },
    SectorAnalytics(String),
    CompanyAnalytics { company_id: CompanyId, text: String },
    /// Message d'alerte global
    Alert(String),
    Downloaded { path: PathBuf },
}

// ============================================================================
// Controller
// ============================================================================

/// Contrôleur de page
///
/// Clonable à bas coût : chaque commande s'exécute dans sa propre tâche
/// locale avec un clone qui partage backend, stockage et session.
pub struct Controller<B, S> {
    backend: Rc<B>,
    store: Rc<S>,
    session: Rc<RefCell<Session>>,
    download_dir: Rc<PathBuf>,
    updates: mpsc::Sender<Update>,
}

impl<B, S> Clone for Controller<B, S> {
    fn clone(&self) -> Self {
        Self {
            backend: Rc::clone(&self.backend),
            store: Rc::clone(&self.store),
            session: Rc::clone(&self.session),
            download_dir: Rc::clone(&self.download_dir),
            updates: self.updates.clone(),
        }
    }
}

impl<B: Backend, S: SessionStore> Controller<B, S> {
    pub fn new(
        backend: B,
        store: S,
        download_dir: impl Into<PathBuf>,
        updates: mpsc::Sender<Update>,
    ) -> Self {
        Self {
            backend: Rc::new(backend),
            store: Rc::new(store),
            session: Rc::new(RefCell::new(Session::anonymous())),
            download_dir: Rc::new(download_dir.into()),
            updates,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Copie de la session courante
    ///
    /// On ne garde jamais l'emprunt du RefCell pendant un .await.
    pub fn session(&self) -> Session {
        self.session.borrow().clone()
    }

    fn emit(&self, update: Update) {
        if self.updates.send(update).is_err() {
            debug!("Update receiver dropped");
        }
    }

    /// Exécute une commande
    pub async fn execute(&self, command: Command) {
        match command {
            Command::Restore => self.restore().await,
            Command::Register { username, password } => self.register(&username, &password).await,
            Command::Login { username, password } => self.login(&username, &password).await,
            Command::Logout => self.logout(),
            Command::Reload => self.reload().await,
            Command::AddCompany {
                name,
                ticker,
                segment,
            } => self.add_company(&name, &ticker, &segment).await,
            Command::DeleteCompany { id } => self.delete_company(id).await,
            Command::LoadDetail { id, name } => self.load_detail(id, name.as_deref()).await,
            Command::SectorAnalytics => self.sector_analytics().await,
            Command::Download { id, name } => self.download_report(id, &name).await,
        }
    }

    // ========================================================================
    // Session / authentification
    // ========================================================================

    /// Reprend la session persistée, ou affiche l'écran de connexion
    pub async fn restore(&self) {
        let stored = match self.store.load() {
            Ok(stored) => stored,
            Err(e) => {
                warn!(error = ?e, "Failed to read stored session");
                None
            }
        };

        match stored {
            Some(stored) => {
                let username = stored.username.clone();
                info!(username = %username, "Restoring stored session");
                *self.session.borrow_mut() = Session::from(stored);
                self.emit(Update::ShowMain { username });
                self.load_main().await;
            }
            None => {
                debug!("No stored session, showing login");
                self.emit(Update::ShowLogin);
            }
        }
    }

    /// Crée un compte
    pub async fn register(&self, username: &str, password: &str) {
        let Some(credentials) = Credentials::from_input(username, password) else {
            self.emit(Update::AuthMessage(messages::CREDENTIALS_REQUIRED.to_string()));
            return;
        };

        match self.backend.register(&credentials).await {
            Ok(_) => {
                info!(username = %credentials.username, "Registration succeeded");
                self.emit(Update::AuthMessage(messages::REGISTER_OK.to_string()));
            }
            Err(e) => {
                warn!(username = %credentials.username, error = %e, "Registration failed");
                self.emit(Update::AuthMessage(e.detail_or(messages::REGISTER_FAILED)));
            }
        }
    }

    /// Connexion : stocke le token puis bascule sur la vue principale
    pub async fn login(&self, username: &str, password: &str) {
        let Some(credentials) = Credentials::from_input(username, password) else {
            self.emit(Update::AuthMessage(messages::CREDENTIALS_REQUIRED.to_string()));
            return;
        };

        let token = match self.backend.login(&credentials).await {
            Ok(token) => token,
            Err(e) => {
                warn!(username = %credentials.username, error = %e, "Login failed");
                self.emit(Update::AuthMessage(e.detail_or(messages::LOGIN_FAILED)));
                return;
            }
        };

        let stored = StoredSession {
            access_token: token.access_token,
            username: credentials.username.clone(),
        };
        if let Err(e) = self.store.save(&stored) {
            // La session reste valable en mémoire
            warn!(error = ?e, "Failed to persist session");
        }
        *self.session.borrow_mut() = Session::from(stored);

        info!(username = %credentials.username, "Login succeeded");
        self.emit(Update::ShowMain {
            username: credentials.username,
        });
        self.load_main().await;
    }

    /// Déconnexion : efface la session en mémoire et sur disque
    pub fn logout(&self) {
        let username = self.session().username().map(str::to_string);
        self.session.borrow_mut().clear();
        if let Err(e) = self.store.clear() {
            warn!(error = ?e, "Failed to clear stored session");
        }
        info!(username = ?username, "Logged out");
        self.emit(Update::ShowLogin);
    }

    // ========================================================================
    // Chargements
    // ========================================================================

    /// Chargement initial de la vue principale
    async fn load_main(&self) {
        self.reload().await;
        self.sector_analytics().await;
    }

    /// Recharge la liste des sociétés et le dashboard en parallèle
    pub async fn reload(&self) {
        let session = self.session();
        self.emit(Update::Companies(Region::Loading));
        self.emit(Update::Dashboard(Region::Loading));

        // CONCEPT : tokio::join!
        // - Les deux requêtes partent ensemble
        // - On attend les deux résultats avant de continuer
        let (companies, dashboard) = tokio::join!(
            self.backend.list_companies(&session),
            self.backend.dashboard(&session)
        );

        let companies = match companies {
            Ok(companies) => Region::Ready(companies),
            Err(e) => {
                warn!(error = %e, "Failed to load companies");
                Region::Failed(messages::ERROR_COMPANIES)
            }
        };
        let dashboard = match dashboard {
            Ok(dashboard) => Region::Ready(dashboard),
            Err(e) => {
                warn!(error = %e, "Failed to load dashboard");
                Region::Failed(messages::ERROR_DASHBOARD)
            }
        };

        self.emit(Update::Companies(companies));
        self.emit(Update::Dashboard(dashboard));
    }

    /// Synthèse narrative de tout le portefeuille
    pub async fn sector_analytics(&self) {
        let session = self.session();
        self.emit(Update::SectorAnalytics(messages::SECTOR_GENERATING.to_string()));

        let text = match self.backend.sector_analytics(&session).await {
            Ok(analytics) => analytics.text,
            Err(e) => {
                warn!(error = %e, "Sector analytics failed");
                messages::SECTOR_ERROR.to_string()
            }
        };
        self.emit(Update::SectorAnalytics(text));
    }

    /// Détail d'une société, puis son analyse narrative
    ///
    /// Le détail est publié avant l'appel d'analytics : un échec ou une
    /// lenteur de ce dernier ne touche jamais le rendu principal.
    pub async fn load_detail(&self, id: CompanyId, known_name: Option<&str>) {
        let session = self.session();
        self.emit(Update::Detail {
            company_id: id,
            region: Region::Loading,
        });

        match self.backend.company_detail(&session, id).await {
            Ok(detail) => {
                let view = detail_view(&detail, known_name, id);
                info!(company_id = id, title = %view.title, "Company detail loaded");
                self.emit(Update::Detail {
                    company_id: id,
                    region: Region::Ready(view),
                });
            }
            Err(e) => {
                warn!(company_id = id, error = %e, "Failed to load company detail");
                self.emit(Update::Detail {
                    company_id: id,
                    region: Region::Failed(messages::ERROR_DETAIL),
                });
                return;
            }
        }

        self.emit(Update::CompanyAnalytics {
            company_id: id,
            text: messages::COMPANY_GENERATING.to_string(),
        });
        let text = match self.backend.company_analytics(&session, id).await {
            Ok(analytics) => analytics.text,
            Err(e) => {
                debug!(company_id = id, error = %e, "Company analytics failed");
                messages::COMPANY_ERROR.to_string()
            }
        };
        self.emit(Update::CompanyAnalytics {
            company_id: id,
            text,
        });
    }

    // ========================================================================
    // Gestion des sociétés
    // ========================================================================

    /// Ajoute une société (les trois champs sont obligatoires)
    pub async fn add_company(&self, name: &str, ticker: &str, segment: &str) {
        let Some(company) = NewCompany::from_input(name, ticker, segment) else {
            self.emit(Update::CompanyForm(FormOutcome::Message(
                messages::COMPANY_FIELDS_REQUIRED.to_string(),
            )));
            return;
        };

        let session = self.session();
        match self.backend.create_company(&session, &company).await {
            Ok(created) => {
                // Le statut 2xx suffit ; l'id n'est connu que si le corps le porte
                info!(
                    company_id = ?created.map(|c| c.id),
                    ticker = %company.ticker,
                    "Company added"
                );
                self.emit(Update::CompanyForm(FormOutcome::Cleared));
                self.load_main().await;
            }
            Err(e) => {
                warn!(ticker = %company.ticker, error = %e, "Failed to add company");
                self.emit(Update::CompanyForm(FormOutcome::Message(
                    e.detail_or(messages::ADD_COMPANY_FAILED),
                )));
            }
        }
    }

    /// Supprime une société (la confirmation est obtenue par l'interface)
    pub async fn delete_company(&self, id: CompanyId) {
        let session = self.session();
        match self.backend.delete_company(&session, id).await {
            Ok(status) if status == StatusCode::NO_CONTENT => {
                info!(company_id = id, "Company deleted");
                self.load_main().await;
            }
            Ok(status) => {
                warn!(company_id = id, status = %status, "Unexpected delete status");
                self.emit(Update::Alert(messages::DELETE_FAILED.to_string()));
            }
            Err(e) => {
                warn!(company_id = id, error = %e, "Failed to delete company");
                self.emit(Update::Alert(messages::DELETE_FAILED.to_string()));
            }
        }
    }

    // ========================================================================
    // Téléchargement du rapport
    // ========================================================================

    /// Télécharge le rapport .xlsx d'une société
    pub async fn download_report(&self, id: CompanyId, name: &str) {
        let session = self.session();
        if !session.is_active() {
            warn!(company_id = id, "Download requested without session");
            self.emit(Update::Alert(messages::LOGIN_REQUIRED.to_string()));
            return;
        }

        let bytes = match self.backend.download_report(&session, id).await {
            Ok(bytes) => bytes,
            Err(e @ ApiError::Status { .. }) => {
                warn!(company_id = id, status = ?e.status(), error = %e, "Report download rejected");
                self.emit(Update::Alert(messages::DOWNLOAD_FAILED.to_string()));
                return;
            }
            Err(e) => {
                error!(company_id = id, error = ?e, "Report download error");
                self.emit(Update::Alert(messages::DOWNLOAD_ERROR.to_string()));
                return;
            }
        };

        match save_report(&self.download_dir, name, &bytes).await {
            Ok(path) => {
                info!(company_id = id, path = ?path, "Report saved");
                self.emit(Update::Downloaded { path });
            }
            Err(e) => {
                error!(company_id = id, error = ?e, "Failed to save report");
                self.emit(Update::Alert(messages::DOWNLOAD_ERROR.to_string()));
            }
        }
    }
}

/// Écrit le rapport sous `<dir>/<nom>_financials.xlsx`
///
/// Le contenu passe par un fichier ".part" renommé une fois complet : un
/// fichier portant le nom final est toujours entier.
///
/// CONCEPT : tokio::fs
/// - Les écritures passent par le pool bloquant de tokio
/// - Les autres tâches locales du worker continuent pendant l'écriture
pub async fn save_report(dir: &Path, company_name: &str, bytes: &[u8]) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .await
        .with_context(|| format!("Échec de la création de {}", dir.display()))?;

    let path = dir.join(report_filename(company_name));
    let partial = path.with_extension("xlsx.part");

    fs::write(&partial, bytes)
        .await
        .with_context(|| format!("Échec de l'écriture de {}", partial.display()))?;
    fs::rename(&partial, &path)
        .await
        .with_context(|| format!("Échec du renommage vers {}", path.display()))?;

    Ok(path)
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiResult;
    use crate::models::{AnalyticsText, CompanyDetail, DashboardRow, RegisteredUser, TokenResponse};
    use crate::session::MemorySessionStore;
    use std::fs as std_fs;

    /// Faux backend : réponses configurables + journal des appels
    #[derive(Default)]
    struct FakeBackend {
        calls: RefCell<Vec<&'static str>>,
        login_error: Option<String>,
        register_error: Option<String>,
        create_error: Option<String>,
        delete_status: Option<StatusCode>,
        detail_fails: bool,
        analytics_fails: bool,
        download_fails: bool,
        download_broken: bool,
        /// 2xx sans corps exploitable
        bare_success: bool,
        companies: Vec<Company>,
    }

    impl FakeBackend {
        fn record(&self, name: &'static str) {
            self.calls.borrow_mut().push(name);
        }

        fn count(&self, name: &str) -> usize {
            self.calls.borrow().iter().filter(|c| **c == name).count()
        }

        fn total(&self) -> usize {
            self.calls.borrow().len()
        }

        fn status_error(detail: &Option<String>) -> ApiError {
            ApiError::Status {
                status: StatusCode::BAD_REQUEST,
                detail: detail.clone(),
            }
        }
    }

    impl Backend for FakeBackend {
        async fn register(&self, credentials: &Credentials) -> ApiResult<Option<RegisteredUser>> {
            self.record("register");
            match &self.register_error {
                Some(_) => Err(Self::status_error(&self.register_error)),
                None if self.bare_success => Ok(None),
                None => Ok(Some(RegisteredUser {
                    id: Some(1),
                    username: credentials.username.clone(),
                    is_active: Some(true),
                })),
            }
        }

        async fn login(&self, _credentials: &Credentials) -> ApiResult<TokenResponse> {
            self.record("login");
            match &self.login_error {
                Some(_) => Err(Self::status_error(&self.login_error)),
                None => Ok(TokenResponse {
                    access_token: "tok".to_string(),
                    token_type: Some("bearer".to_string()),
                }),
            }
        }

        async fn list_companies(&self, _session: &Session) -> ApiResult<Vec<Company>> {
            self.record("list_companies");
            Ok(self.companies.clone())
        }

        async fn create_company(
            &self,
            _session: &Session,
            company: &NewCompany,
        ) -> ApiResult<Option<Company>> {
            self.record("create_company");
            match &self.create_error {
                Some(_) => Err(Self::status_error(&self.create_error)),
                None if self.bare_success => Ok(None),
                None => Ok(Some(Company {
                    id: 42,
                    name: company.name.clone(),
                    ticker: company.ticker.clone(),
                    segment: company.segment.clone(),
                })),
            }
        }

        async fn delete_company(&self, _session: &Session, _id: CompanyId) -> ApiResult<StatusCode> {
            self.record("delete_company");
            Ok(self.delete_status.unwrap_or(StatusCode::NO_CONTENT))
        }

        async fn dashboard(&self, _session: &Session) -> ApiResult<Dashboard> {
            self.record("dashboard");
            Ok(Dashboard {
                companies: self
                    .companies
                    .iter()
                    .map(|c| DashboardRow {
                        id: c.id,
                        name: c.name.clone(),
                        ticker: c.ticker.clone(),
                        segment: c.segment.clone(),
                        ratios: Default::default(),
                    })
                    .collect(),
            })
        }

        async fn company_detail(&self, _session: &Session, _id: CompanyId) -> ApiResult<CompanyDetail> {
            self.record("company_detail");
            if self.detail_fails {
                return Err(ApiError::Decode("boom".to_string()));
            }
            Ok(CompanyDetail::default())
        }

        async fn sector_analytics(&self, _session: &Session) -> ApiResult<AnalyticsText> {
            self.record("sector_analytics");
            if self.analytics_fails {
                return Err(ApiError::Decode("boom".to_string()));
            }
            Ok(AnalyticsText {
                text: "Sector looks fine.".to_string(),
            })
        }

        async fn company_analytics(&self, _session: &Session, _id: CompanyId) -> ApiResult<AnalyticsText> {
            self.record("company_analytics");
            if self.analytics_fails {
                return Err(ApiError::Status {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    detail: None,
                });
            }
            Ok(AnalyticsText {
                text: "Strong margins.".to_string(),
            })
        }

        async fn download_report(&self, _session: &Session, _id: CompanyId) -> ApiResult<Vec<u8>> {
            self.record("download_report");
            if self.download_broken {
                return Err(ApiError::Decode("connection reset".to_string()));
            }
            if self.download_fails {
                return Err(ApiError::Status {
                    status: StatusCode::NOT_FOUND,
                    detail: Some("Company not found".to_string()),
                });
            }
            Ok(vec![0x50, 0x4b, 0x03, 0x04])
        }
    }

    type TestController = Controller<FakeBackend, MemorySessionStore>;

    fn controller(backend: FakeBackend) -> (TestController, mpsc::Receiver<Update>) {
        controller_with_store(backend, MemorySessionStore::new())
    }

    fn controller_with_store(
        backend: FakeBackend,
        store: MemorySessionStore,
    ) -> (TestController, mpsc::Receiver<Update>) {
        let dir = std::env::temp_dir().join(format!("findash-reports-{}", std::process::id()));
        controller_in(backend, store, &dir)
    }

    fn controller_in(
        backend: FakeBackend,
        store: MemorySessionStore,
        download_dir: &Path,
    ) -> (TestController, mpsc::Receiver<Update>) {
        let (tx, rx) = mpsc::channel();
        (Controller::new(backend, store, download_dir, tx), rx)
    }

    fn drain(rx: &mpsc::Receiver<Update>) -> Vec<Update> {
        rx.try_iter().collect()
    }

    fn stored() -> StoredSession {
        StoredSession {
            access_token: "stored-token".to_string(),
            username: "alice".to_string(),
        }
    }

    fn count_show_main(updates: &[Update]) -> usize {
        updates
            .iter()
            .filter(|u| matches!(u, Update::ShowMain { .. }))
            .count()
    }

    #[tokio::test]
    async fn test_login_success_switches_view_once() {
        let (ctrl, rx) = controller(FakeBackend::default());
        ctrl.login("alice", "secret").await;

        let updates = drain(&rx);
        assert_eq!(count_show_main(&updates), 1);
        assert_eq!(
            updates[0],
            Update::ShowMain {
                username: "alice".to_string()
            }
        );
        assert_eq!(ctrl.session().token(), Some("tok"));
        assert_eq!(ctrl.store().snapshot().unwrap().username, "alice");

        // Chargement initial : liste + dashboard + analytics secteur
        assert_eq!(ctrl.backend().count("list_companies"), 1);
        assert_eq!(ctrl.backend().count("dashboard"), 1);
        assert_eq!(ctrl.backend().count("sector_analytics"), 1);
    }

    #[tokio::test]
    async fn test_login_failure_shows_server_detail() {
        let backend = FakeBackend {
            login_error: Some("Incorrect username or password".to_string()),
            ..Default::default()
        };
        let (ctrl, rx) = controller(backend);
        ctrl.login("alice", "wrong").await;

        let updates = drain(&rx);
        assert_eq!(
            updates,
            vec![Update::AuthMessage("Incorrect username or password".to_string())]
        );
        assert!(!ctrl.session().is_active());
        assert!(ctrl.store().snapshot().is_none());
    }

    #[tokio::test]
    async fn test_login_requires_credentials() {
        let (ctrl, rx) = controller(FakeBackend::default());
        ctrl.login("", "").await;

        assert_eq!(ctrl.backend().total(), 0);
        assert_eq!(
            drain(&rx),
            vec![Update::AuthMessage(messages::CREDENTIALS_REQUIRED.to_string())]
        );
    }

    #[tokio::test]
    async fn test_register_messages() {
        let (ctrl, rx) = controller(FakeBackend::default());
        ctrl.register("bob", "pw").await;
        assert_eq!(drain(&rx), vec![Update::AuthMessage(messages::REGISTER_OK.to_string())]);

        let backend = FakeBackend {
            register_error: Some("Username already registered".to_string()),
            ..Default::default()
        };
        let (ctrl, rx) = controller(backend);
        ctrl.register("bob", "pw").await;
        assert_eq!(
            drain(&rx),
            vec![Update::AuthMessage("Username already registered".to_string())]
        );
        assert!(!ctrl.session().is_active());
    }

    #[tokio::test]
    async fn test_restore_with_stored_session_loads_main() {
        let store = MemorySessionStore::with_session(stored());
        let (ctrl, rx) = controller_with_store(FakeBackend::default(), store);
        ctrl.restore().await;

        let updates = drain(&rx);
        assert_eq!(count_show_main(&updates), 1);
        assert_eq!(ctrl.session().token(), Some("stored-token"));
        assert_eq!(ctrl.backend().count("dashboard"), 1);
    }

    #[tokio::test]
    async fn test_restore_without_session_shows_login() {
        let (ctrl, rx) = controller(FakeBackend::default());
        ctrl.restore().await;

        assert_eq!(drain(&rx), vec![Update::ShowLogin]);
        assert_eq!(ctrl.backend().total(), 0);
    }

    #[tokio::test]
    async fn test_logout_clears_memory_and_store() {
        let store = MemorySessionStore::with_session(stored());
        let (ctrl, rx) = controller_with_store(FakeBackend::default(), store);
        ctrl.restore().await;
        drain(&rx);

        ctrl.logout();
        assert_eq!(drain(&rx), vec![Update::ShowLogin]);
        assert!(!ctrl.session().is_active());
        assert!(ctrl.store().snapshot().is_none());
    }

    #[tokio::test]
    async fn test_add_company_with_empty_field_makes_no_call() {
        let (ctrl, rx) = controller(FakeBackend::default());
        ctrl.add_company("DHL Group", "", "Parcel").await;

        assert_eq!(ctrl.backend().total(), 0);
        assert_eq!(
            drain(&rx),
            vec![Update::CompanyForm(FormOutcome::Message(
                messages::COMPANY_FIELDS_REQUIRED.to_string()
            ))]
        );
    }

    #[tokio::test]
    async fn test_add_company_success_clears_form_and_reloads() {
        let (ctrl, rx) = controller(FakeBackend::default());
        ctrl.add_company("DHL Group", "DHL.DE", "Parcel").await;

        let updates = drain(&rx);
        assert_eq!(updates[0], Update::CompanyForm(FormOutcome::Cleared));
        assert_eq!(ctrl.backend().count("create_company"), 1);
        assert_eq!(ctrl.backend().count("list_companies"), 1);
        assert_eq!(ctrl.backend().count("dashboard"), 1);
        assert_eq!(ctrl.backend().count("sector_analytics"), 1);
    }

    #[tokio::test]
    async fn test_add_company_failure_shows_detail() {
        let backend = FakeBackend {
            create_error: Some("Ticker already tracked".to_string()),
            ..Default::default()
        };
        let (ctrl, rx) = controller(backend);
        ctrl.add_company("DHL Group", "DHL.DE", "Parcel").await;

        assert_eq!(
            drain(&rx),
            vec![Update::CompanyForm(FormOutcome::Message(
                "Ticker already tracked".to_string()
            ))]
        );
        assert_eq!(ctrl.backend().count("dashboard"), 0);
    }

    #[tokio::test]
    async fn test_add_company_success_without_body_still_reloads() {
        let backend = FakeBackend {
            bare_success: true,
            ..Default::default()
        };
        let (ctrl, rx) = controller(backend);
        ctrl.add_company("DHL Group", "DHL.DE", "Parcel").await;

        let updates = drain(&rx);
        assert_eq!(updates[0], Update::CompanyForm(FormOutcome::Cleared));
        assert!(!updates
            .iter()
            .any(|u| matches!(u, Update::CompanyForm(FormOutcome::Message(_)))));
        assert_eq!(ctrl.backend().count("list_companies"), 1);
        assert_eq!(ctrl.backend().count("dashboard"), 1);
    }

    #[tokio::test]
    async fn test_register_success_without_body_confirms() {
        let backend = FakeBackend {
            bare_success: true,
            ..Default::default()
        };
        let (ctrl, rx) = controller(backend);
        ctrl.register("bob", "pw").await;
        assert_eq!(drain(&rx), vec![Update::AuthMessage(messages::REGISTER_OK.to_string())]);
    }

    #[tokio::test]
    async fn test_delete_204_reloads_list_and_dashboard_once() {
        let (ctrl, rx) = controller(FakeBackend::default());
        ctrl.delete_company(3).await;

        assert_eq!(ctrl.backend().count("delete_company"), 1);
        assert_eq!(ctrl.backend().count("list_companies"), 1);
        assert_eq!(ctrl.backend().count("dashboard"), 1);
        assert!(!drain(&rx).iter().any(|u| matches!(u, Update::Alert(_))));
    }

    #[tokio::test]
    async fn test_delete_other_status_alerts_without_reload() {
        let backend = FakeBackend {
            delete_status: Some(StatusCode::OK),
            ..Default::default()
        };
        let (ctrl, rx) = controller(backend);
        ctrl.delete_company(3).await;

        assert_eq!(drain(&rx), vec![Update::Alert(messages::DELETE_FAILED.to_string())]);
        assert_eq!(ctrl.backend().count("list_companies"), 0);
    }

    #[tokio::test]
    async fn test_reload_joins_both_regions() {
        let backend = FakeBackend {
            companies: vec![Company {
                id: 1,
                name: "UPS".to_string(),
                ticker: "UPS".to_string(),
                segment: "Parcel".to_string(),
            }],
            ..Default::default()
        };
        let (ctrl, rx) = controller(backend);
        ctrl.reload().await;

        let updates = drain(&rx);
        assert_eq!(updates.len(), 4);
        assert!(matches!(&updates[2], Update::Companies(Region::Ready(list)) if list.len() == 1));
        assert!(matches!(&updates[3], Update::Dashboard(Region::Ready(d)) if d.len() == 1));
    }

    #[tokio::test]
    async fn test_detail_published_before_analytics() {
        let (ctrl, rx) = controller(FakeBackend::default());
        ctrl.load_detail(5, Some("Maersk")).await;

        let updates = drain(&rx);
        assert_eq!(
            updates[0],
            Update::Detail {
                company_id: 5,
                region: Region::Loading
            }
        );
        match &updates[1] {
            Update::Detail {
                company_id: 5,
                region: Region::Ready(view),
            } => assert_eq!(view.title, "Maersk"),
            other => panic!("unexpected update {:?}", other),
        }
        assert_eq!(
            updates.last(),
            Some(&Update::CompanyAnalytics {
                company_id: 5,
                text: "Strong margins.".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_analytics_failures_are_swallowed() {
        let backend = FakeBackend {
            analytics_fails: true,
            ..Default::default()
        };
        let (ctrl, rx) = controller(backend);
        ctrl.load_detail(5, None).await;
        ctrl.sector_analytics().await;

        let updates = drain(&rx);
        assert!(updates
            .iter()
            .any(|u| matches!(u, Update::Detail { region: Region::Ready(_), .. })));
        assert!(updates.contains(&Update::CompanyAnalytics {
            company_id: 5,
            text: messages::COMPANY_ERROR.to_string()
        }));
        assert_eq!(
            updates.last(),
            Some(&Update::SectorAnalytics(messages::SECTOR_ERROR.to_string()))
        );
        assert!(!updates.iter().any(|u| matches!(u, Update::Alert(_))));
    }

    #[tokio::test]
    async fn test_detail_failure_skips_analytics() {
        let backend = FakeBackend {
            detail_fails: true,
            ..Default::default()
        };
        let (ctrl, rx) = controller(backend);
        ctrl.load_detail(5, None).await;

        assert_eq!(
            drain(&rx),
            vec![
                Update::Detail {
                    company_id: 5,
                    region: Region::Loading
                },
                Update::Detail {
                    company_id: 5,
                    region: Region::Failed(messages::ERROR_DETAIL)
                }
            ]
        );
        assert_eq!(ctrl.backend().count("company_analytics"), 0);
    }

    #[tokio::test]
    async fn test_download_without_session_makes_no_call() {
        let (ctrl, rx) = controller(FakeBackend::default());
        ctrl.download_report(1, "UPS").await;

        assert_eq!(ctrl.backend().total(), 0);
        assert_eq!(drain(&rx), vec![Update::Alert(messages::LOGIN_REQUIRED.to_string())]);
    }

    #[tokio::test]
    async fn test_download_saves_sanitized_file() {
        let store = MemorySessionStore::with_session(stored());
        let (ctrl, rx) = controller_with_store(FakeBackend::default(), store);
        ctrl.restore().await;
        drain(&rx);

        ctrl.download_report(1, "United Parcel Service, Inc.").await;
        match drain(&rx).as_slice() {
            [Update::Downloaded { path }] => {
                assert!(path.ends_with("United_Parcel_Service_Inc._financials.xlsx"));
                assert_eq!(std_fs::read(path).unwrap(), vec![0x50, 0x4b, 0x03, 0x04]);
                std_fs::remove_file(path).unwrap();
            }
            other => panic!("unexpected updates {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_download_rejected_alerts() {
        let backend = FakeBackend {
            download_fails: true,
            ..Default::default()
        };
        let store = MemorySessionStore::with_session(stored());
        let (ctrl, rx) = controller_with_store(backend, store);
        ctrl.restore().await;
        drain(&rx);

        ctrl.download_report(1, "UPS").await;
        assert_eq!(drain(&rx), vec![Update::Alert(messages::DOWNLOAD_FAILED.to_string())]);
    }

    #[tokio::test]
    async fn test_download_transport_error_alerts() {
        let backend = FakeBackend {
            download_broken: true,
            ..Default::default()
        };
        let store = MemorySessionStore::with_session(stored());
        let (ctrl, rx) = controller_with_store(backend, store);
        ctrl.restore().await;
        drain(&rx);

        ctrl.download_report(1, "UPS").await;
        assert_eq!(drain(&rx), vec![Update::Alert(messages::DOWNLOAD_ERROR.to_string())]);
    }

    #[tokio::test]
    async fn test_download_write_error_alerts() {
        // Le répertoire de téléchargement est un fichier : l'écriture échoue
        let blocker = std::env::temp_dir().join(format!("findash-blocker-{}", std::process::id()));
        std_fs::write(&blocker, b"not a directory").unwrap();

        let store = MemorySessionStore::with_session(stored());
        let (ctrl, rx) = controller_in(FakeBackend::default(), store, &blocker);
        ctrl.restore().await;
        drain(&rx);

        ctrl.download_report(1, "UPS").await;
        assert_eq!(drain(&rx), vec![Update::Alert(messages::DOWNLOAD_ERROR.to_string())]);
        assert_eq!(ctrl.backend().count("download_report"), 1);
        std_fs::remove_file(&blocker).unwrap();
    }

    #[tokio::test]
    async fn test_save_report_replaces_partial_file() {
        let dir = std::env::temp_dir().join(format!("findash-save-{}", std::process::id()));
        let path = save_report(&dir, "Kuehne + Nagel", b"xlsx").await.unwrap();

        assert_eq!(path.file_name().unwrap(), "Kuehne__Nagel_financials.xlsx");
        assert!(!path.with_extension("xlsx.part").exists());
        std_fs::remove_dir_all(&dir).unwrap();
    }
}
