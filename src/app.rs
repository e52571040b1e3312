// ============================================================================
// Structure : App
// ============================================================================
// Gère l'état global de l'application TUI
//
// CONCEPTS RUST :
// 1. State Management : centraliser l'état dans une seule structure
// 2. Mutabilité contrôlée : &mut self pour modifier l'état
// 3. Enums pour state machines : Screen, Focus
//
// PATTERN : Cette structure suit le pattern "Application State"
// - Tous les composants de l'UI lisent depuis App
// - Le contrôleur ne modifie jamais App directement : il envoie des Update
//   que `apply()` recopie dans la zone concernée
// ============================================================================

use chrono::{DateTime, Local};

use crate::controller::{FormOutcome, Region, Update};
use crate::models::{Company, CompanyId, Dashboard, DashboardRow, StatementKind};
use crate::view::{messages, DetailView};

// ============================================================================
// Enum : Screen
// ============================================================================

/// Écrans de l'application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Connexion / création de compte
    Login,

    /// Vue principale : sociétés, dashboard, analytics secteur
    Main,

    /// Détail d'une société
    Detail,

    /// Formulaire d'ajout de société
    AddCompany,
}

/// Panneau actif sur l'écran principal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Dashboard,
    Companies,
}

// ============================================================================
// Formulaires
// ============================================================================

/// Champ de saisie
#[derive(Debug, Clone, PartialEq)]
pub struct InputField {
    pub label: &'static str,
    pub value: String,
    /// Affiché avec des "*" (mot de passe)
    pub masked: bool,
}

impl InputField {
    fn new(label: &'static str) -> Self {
        Self {
            label,
            value: String::new(),
            masked: false,
        }
    }

    fn masked(label: &'static str) -> Self {
        Self {
            masked: true,
            ..Self::new(label)
        }
    }

    /// Texte à afficher (masqué si nécessaire)
    pub fn display_value(&self) -> String {
        if self.masked {
            "*".repeat(self.value.chars().count())
        } else {
            self.value.clone()
        }
    }
}

/// Formulaire : champs + champ actif + message inline
#[derive(Debug, Clone, PartialEq)]
pub struct Form {
    pub fields: Vec<InputField>,
    pub active: usize,
    pub message: Option<String>,
}

impl Form {
    pub fn login() -> Self {
        Self::with_fields(vec![InputField::new("Username"), InputField::masked("Password")])
    }

    pub fn company() -> Self {
        Self::with_fields(vec![
            InputField::new("Name"),
            InputField::new("Ticker"),
            InputField::new("Segment"),
        ])
    }

    fn with_fields(fields: Vec<InputField>) -> Self {
        Self {
            fields,
            active: 0,
            message: None,
        }
    }

    pub fn value(&self, index: usize) -> &str {
        self.fields.get(index).map(|f| f.value.as_str()).unwrap_or("")
    }

    pub fn next_field(&mut self) {
        self.active = (self.active + 1) % self.fields.len().max(1);
    }

    pub fn previous_field(&mut self) {
        let len = self.fields.len().max(1);
        self.active = (self.active + len - 1) % len;
    }

    pub fn append_char(&mut self, c: char) {
        if let Some(field) = self.fields.get_mut(self.active) {
            field.value.push(c);
        }
    }

    pub fn backspace(&mut self) {
        if let Some(field) = self.fields.get_mut(self.active) {
            field.value.pop();
        }
    }

    /// Vide tous les champs et le message
    pub fn clear(&mut self) {
        for field in &mut self.fields {
            field.value.clear();
        }
        self.active = 0;
        self.message = None;
    }
}

// ============================================================================
// App
// ============================================================================

/// État principal de l'application
pub struct App {
    /// Indique si l'application doit continuer à tourner
    pub running: bool,

    /// Écran actuellement affiché (un seul à la fois)
    pub current_screen: Screen,

    /// Utilisateur connecté (None sur l'écran de connexion)
    pub username: Option<String>,

    pub login_form: Form,
    pub company_form: Form,

    /// Liste des sociétés (panneau de gauche)
    pub companies: Region<Vec<Company>>,
    pub selected_company: usize,

    /// Dashboard et heure du dernier chargement réussi
    pub dashboard: Region<Dashboard>,
    pub dashboard_updated_at: Option<DateTime<Local>>,
    pub selected_row: usize,

    pub focus: Focus,

    /// Vue détail + onglet d'état financier affiché
    pub detail: Region<DetailView>,
    pub detail_tab: StatementKind,
    pub statement_row: usize,

    /// Société dont on attend le détail / l'analyse
    pub detail_company: Option<CompanyId>,

    pub sector_analytics: String,
    pub company_analytics: String,

    /// Alerte affichée dans le footer jusqu'à la prochaine touche
    pub alert: Option<String>,

    /// Two-step quit : première pression de 'q' -> confirmation
    pub confirm_quit: bool,

    /// Two-step delete : société choisie à la première pression de 'd'
    pub confirm_delete: Option<CompanyId>,
}

impl App {
    /// Crée une App sur l'écran de connexion
    pub fn new() -> Self {
        Self {
            running: true,
            current_screen: Screen::Login,
            username: None,
            login_form: Form::login(),
            company_form: Form::company(),
            companies: Region::Ready(Vec::new()),
            selected_company: 0,
            dashboard: Region::Ready(Dashboard::default()),
            dashboard_updated_at: None,
            selected_row: 0,
            focus: Focus::Dashboard,
            detail: Region::Loading,
            detail_tab: StatementKind::Income,
            statement_row: 0,
            detail_company: None,
            sector_analytics: String::new(),
            company_analytics: String::new(),
            alert: None,
            confirm_quit: false,
            confirm_delete: None,
        }
    }

    pub fn quit(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    // ========================================================================
    // Application des mises à jour du contrôleur
    // ========================================================================

    /// Recopie une mise à jour dans sa zone
    ///
    /// CONCEPT : Idempotent overwrite
    /// - Chaque Update remplace entièrement le contenu de sa zone
    /// - Pas de fusion incrémentale : l'ordre entre handlers importe peu
    pub fn apply(&mut self, update: Update) {
        match update {
            Update::ShowLogin => {
                // Repart d'un état vierge, sans quitter
                *self = Self::new();
            }
            Update::ShowMain { username } => {
                self.username = Some(username);
                self.login_form.clear();
                self.current_screen = Screen::Main;
            }
            Update::AuthMessage(message) => {
                self.login_form.message = Some(message);
            }
            Update::Companies(region) => {
                self.companies = region;
                self.selected_company = clamp(self.selected_company, self.company_count());
            }
            Update::Dashboard(region) => {
                if matches!(region, Region::Ready(_)) {
                    self.dashboard_updated_at = Some(Local::now());
                }
                self.dashboard = region;
                self.selected_row = clamp(self.selected_row, self.dashboard_len());
            }
            Update::CompanyForm(FormOutcome::Cleared) => {
                self.company_form.clear();
                if self.current_screen == Screen::AddCompany {
                    self.current_screen = Screen::Main;
                }
            }
            Update::CompanyForm(FormOutcome::Message(message)) => {
                self.company_form.message = Some(message);
            }
            Update::Detail { company_id, region } => {
                // Réponse tardive d'une société quittée entre-temps
                if self.detail_company == Some(company_id) {
                    self.detail = region;
                }
            }
            Update::SectorAnalytics(text) => {
                self.sector_analytics = text;
            }
            Update::CompanyAnalytics { company_id, text } => {
                // Ignore la réponse d'une société qu'on ne regarde plus
                if self.detail_company == Some(company_id) {
                    self.company_analytics = text;
                }
            }
            Update::Alert(message) => {
                self.alert = Some(message);
            }
            Update::Downloaded { path } => {
                self.alert = Some(format!("Report saved to {}", path.display()));
            }
        }
    }

    // ========================================================================
    // Sélection
    // ========================================================================

    fn company_count(&self) -> usize {
        match &self.companies {
            Region::Ready(list) => list.len(),
            _ => 0,
        }
    }

    fn dashboard_len(&self) -> usize {
        match &self.dashboard {
            Region::Ready(dashboard) => dashboard.len(),
            _ => 0,
        }
    }

    /// Société sélectionnée dans la liste
    pub fn selected_company(&self) -> Option<&Company> {
        match &self.companies {
            Region::Ready(list) => list.get(self.selected_company),
            _ => None,
        }
    }

    /// Ligne sélectionnée dans le dashboard
    pub fn selected_dashboard_row(&self) -> Option<&DashboardRow> {
        match &self.dashboard {
            Region::Ready(dashboard) => dashboard.companies.get(self.selected_row),
            _ => None,
        }
    }

    /// Navigue vers le haut dans le panneau actif
    ///
    /// CONCEPT RUST : Saturating arithmetic
    /// - saturating_sub() ne descend pas en dessous de 0
    pub fn navigate_up(&mut self) {
        match self.focus {
            Focus::Dashboard => self.selected_row = self.selected_row.saturating_sub(1),
            Focus::Companies => self.selected_company = self.selected_company.saturating_sub(1),
        }
    }

    /// Navigue vers le bas dans le panneau actif
    pub fn navigate_down(&mut self) {
        match self.focus {
            Focus::Dashboard => {
                let max_index = self.dashboard_len().saturating_sub(1);
                self.selected_row = (self.selected_row + 1).min(max_index);
            }
            Focus::Companies => {
                let max_index = self.company_count().saturating_sub(1);
                self.selected_company = (self.selected_company + 1).min(max_index);
            }
        }
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Dashboard => Focus::Companies,
            Focus::Companies => Focus::Dashboard,
        };
    }

    // ========================================================================
    // Transitions d'écran
    // ========================================================================

    /// Ouvre l'écran détail pour une société
    pub fn open_detail(&mut self, id: CompanyId) {
        self.current_screen = Screen::Detail;
        self.detail = Region::Loading;
        self.detail_tab = StatementKind::Income;
        self.statement_row = 0;
        self.detail_company = Some(id);
        self.company_analytics.clear();
    }

    /// Retourne à la vue principale
    pub fn show_main(&mut self) {
        self.current_screen = Screen::Main;
    }

    pub fn open_company_form(&mut self) {
        self.company_form.message = None;
        self.current_screen = Screen::AddCompany;
    }

    pub fn is_on(&self, screen: Screen) -> bool {
        self.current_screen == screen
    }

    /// Titre de la vue détail si elle est chargée
    pub fn detail_title(&self) -> Option<&str> {
        match &self.detail {
            Region::Ready(view) => Some(view.title.as_str()),
            _ => None,
        }
    }

    pub fn next_statement(&mut self) {
        self.detail_tab = self.detail_tab.next();
        self.statement_row = 0;
    }

    pub fn previous_statement(&mut self) {
        self.detail_tab = self.detail_tab.previous();
        self.statement_row = 0;
    }

    /// Nombre de lignes de l'état financier affiché
    fn statement_len(&self) -> usize {
        match &self.detail {
            Region::Ready(view) => view
                .statement(self.detail_tab)
                .and_then(|s| s.table.as_ref())
                .map(|t| t.rows.len())
                .unwrap_or(0),
            _ => 0,
        }
    }

    /// Défile dans l'état financier affiché
    pub fn scroll_statement_up(&mut self) {
        self.statement_row = self.statement_row.saturating_sub(1);
    }

    pub fn scroll_statement_down(&mut self) {
        let max_index = self.statement_len().saturating_sub(1);
        self.statement_row = (self.statement_row + 1).min(max_index);
    }

    // ========================================================================
    // Confirmations et alertes
    // ========================================================================

    pub fn request_quit(&mut self) {
        self.confirm_quit = true;
    }

    pub fn is_awaiting_quit_confirmation(&self) -> bool {
        self.confirm_quit
    }

    /// Mémorise la société à supprimer : la confirmation porte sur elle,
    /// même si la sélection bouge entre les deux pressions
    pub fn request_delete(&mut self, id: CompanyId) {
        self.confirm_delete = Some(id);
    }

    pub fn is_awaiting_delete_confirmation(&self) -> bool {
        self.confirm_delete.is_some()
    }

    /// Société en attente de confirmation de suppression
    pub fn pending_delete(&self) -> Option<&Company> {
        let id = self.confirm_delete?;
        match &self.companies {
            Region::Ready(list) => list.iter().find(|c| c.id == id),
            _ => None,
        }
    }

    /// Annule toutes les confirmations en attente
    pub fn cancel_confirmations(&mut self) {
        self.confirm_quit = false;
        self.confirm_delete = None;
    }

    pub fn dismiss_alert(&mut self) {
        self.alert = None;
    }

    /// Texte de chargement si une zone est en cours de chargement
    pub fn loading_message(&self) -> Option<&'static str> {
        if matches!(self.dashboard, Region::Loading) {
            Some(messages::LOADING_DASHBOARD)
        } else if matches!(self.companies, Region::Loading) {
            Some(messages::LOADING_COMPANIES)
        } else {
            None
        }
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

fn clamp(index: usize, len: usize) -> usize {
    index.min(len.saturating_sub(1))
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Ratios;

    fn company(id: CompanyId, name: &str) -> Company {
        Company {
            id,
            name: name.to_string(),
            ticker: name.to_uppercase(),
            segment: "Parcel".to_string(),
        }
    }

    fn dashboard(names: &[&str]) -> Dashboard {
        Dashboard {
            companies: names
                .iter()
                .enumerate()
                .map(|(i, name)| DashboardRow {
                    id: i as CompanyId + 1,
                    name: name.to_string(),
                    ticker: String::new(),
                    segment: "Parcel".to_string(),
                    ratios: Ratios::default(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_app_starts_on_login() {
        let app = App::new();
        assert!(app.is_running());
        assert!(app.is_on(Screen::Login));
        assert!(app.username.is_none());
    }

    #[test]
    fn test_show_main_and_show_login() {
        let mut app = App::new();
        app.login_form.append_char('x');
        app.apply(Update::ShowMain {
            username: "alice".to_string(),
        });
        assert!(app.is_on(Screen::Main));
        assert_eq!(app.username.as_deref(), Some("alice"));
        assert_eq!(app.login_form.value(0), "");

        app.apply(Update::SectorAnalytics("text".to_string()));
        app.apply(Update::ShowLogin);
        assert!(app.is_on(Screen::Login));
        assert!(app.username.is_none());
        assert!(app.sector_analytics.is_empty());
    }

    #[test]
    fn test_dashboard_update_clamps_selection_and_stamps_time() {
        let mut app = App::new();
        app.apply(Update::Dashboard(Region::Ready(dashboard(&["UPS", "FedEx", "DHL"]))));
        assert!(app.dashboard_updated_at.is_some());

        app.navigate_down();
        app.navigate_down();
        app.navigate_down();
        assert_eq!(app.selected_row, 2);

        app.apply(Update::Dashboard(Region::Ready(dashboard(&["UPS"]))));
        assert_eq!(app.selected_row, 0);
        assert_eq!(app.selected_dashboard_row().unwrap().name, "UPS");
    }

    #[test]
    fn test_navigation_follows_focus() {
        let mut app = App::new();
        app.apply(Update::Companies(Region::Ready(vec![company(1, "ups"), company(2, "dhl")])));
        app.toggle_focus();
        assert_eq!(app.focus, Focus::Companies);

        app.navigate_down();
        assert_eq!(app.selected_company().unwrap().id, 2);
        app.navigate_up();
        app.navigate_up();
        assert_eq!(app.selected_company, 0);
        assert_eq!(app.selected_row, 0);
    }

    #[test]
    fn test_company_analytics_for_other_company_is_ignored() {
        let mut app = App::new();
        app.open_detail(3);
        app.apply(Update::CompanyAnalytics {
            company_id: 9,
            text: "stale".to_string(),
        });
        assert!(app.company_analytics.is_empty());

        app.apply(Update::CompanyAnalytics {
            company_id: 3,
            text: "fresh".to_string(),
        });
        assert_eq!(app.company_analytics, "fresh");
    }

    #[test]
    fn test_late_detail_for_other_company_is_ignored() {
        let mut app = App::new();
        app.open_detail(1);
        app.open_detail(2);

        let stale = crate::view::detail_view(&Default::default(), Some("UPS"), 1);
        app.apply(Update::Detail {
            company_id: 1,
            region: Region::Ready(stale),
        });
        assert_eq!(app.detail, Region::Loading);
        assert_eq!(app.detail_company, Some(2));

        app.apply(Update::Detail {
            company_id: 1,
            region: Region::Failed(messages::ERROR_DETAIL),
        });
        assert_eq!(app.detail, Region::Loading);

        let fresh = crate::view::detail_view(&Default::default(), Some("DHL"), 2);
        app.apply(Update::Detail {
            company_id: 2,
            region: Region::Ready(fresh),
        });
        assert_eq!(app.detail_title(), Some("DHL"));
    }

    #[test]
    fn test_pending_delete_survives_reload() {
        let mut app = App::new();
        app.apply(Update::Companies(Region::Ready(vec![company(1, "ups"), company(2, "dhl")])));
        app.request_delete(2);

        app.apply(Update::Companies(Region::Ready(vec![company(2, "dhl")])));
        assert_eq!(app.pending_delete().map(|c| c.id), Some(2));

        app.cancel_confirmations();
        assert!(app.pending_delete().is_none());
    }

    #[test]
    fn test_company_form_cleared_returns_to_main() {
        let mut app = App::new();
        app.open_company_form();
        app.company_form.append_char('U');
        app.apply(Update::CompanyForm(FormOutcome::Message("bad".to_string())));
        assert_eq!(app.company_form.message.as_deref(), Some("bad"));
        assert!(app.is_on(Screen::AddCompany));

        app.apply(Update::CompanyForm(FormOutcome::Cleared));
        assert!(app.is_on(Screen::Main));
        assert_eq!(app.company_form.value(0), "");
        assert!(app.company_form.message.is_none());
    }

    #[test]
    fn test_form_field_cycle_and_mask() {
        let mut form = Form::login();
        form.append_char('a');
        form.next_field();
        form.append_char('p');
        form.append_char('w');
        form.backspace();
        assert_eq!(form.value(0), "a");
        assert_eq!(form.value(1), "p");
        assert_eq!(form.fields[1].display_value(), "*");

        form.next_field();
        assert_eq!(form.active, 0);
        form.previous_field();
        assert_eq!(form.active, 1);
    }
}
