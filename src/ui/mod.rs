// ============================================================================
// Module : ui
// ============================================================================
// Gère toute l'interface utilisateur (Terminal User Interface)
// ============================================================================

pub mod events;    // Gestion des événements clavier
pub mod common;    // Layout, header, footer partagés
pub mod dashboard; // Vue principale : sociétés + dashboard + analyse secteur
pub mod detail;    // Vue détail d'une société
pub mod forms;     // Connexion et ajout de société

// Re-exports pour simplifier les imports
pub use events::{Event, EventHandler};

use ratatui::Frame;

use crate::app::{App, Screen};

/// Dessine l'écran courant
///
/// CONCEPT RUST : Routing avec match sur enum
/// - Un seul écran visible à la fois
/// - Le compilateur garantit l'exhaustivité
pub fn render(frame: &mut Frame, app: &App) {
    match app.current_screen {
        Screen::Login => forms::render_login(frame, app),
        Screen::Main => dashboard::render_main(frame, app),
        Screen::Detail => detail::render_detail(frame, app),
        Screen::AddCompany => forms::render_add_company(frame, app),
    }
}

// ============================================================================
// Tests : rendu dans un terminal virtuel
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::{Region, Update};
    use crate::models::{
        Cell, Company, CompanyDetail, Dashboard, DashboardRow, Ratios, Statement,
    };
    use crate::view::{detail_view, messages};
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    /// Dessine l'App et retourne le contenu de l'écran, ligne par ligne
    fn draw(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(140, 40)).unwrap();
        terminal.draw(|frame| render(frame, app)).unwrap();

        let buffer = terminal.backend().buffer();
        let width = buffer.area.width as usize;
        buffer
            .content
            .chunks(width)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn logged_in() -> App {
        let mut app = App::new();
        app.apply(Update::ShowMain {
            username: "alice".to_string(),
        });
        app
    }

    #[test]
    fn test_login_screen_masks_password() {
        let mut app = App::new();
        app.login_form.append_char('b');
        app.login_form.append_char('o');
        app.login_form.append_char('b');
        app.login_form.next_field();
        app.login_form.append_char('x');
        app.login_form.append_char('y');
        app.apply(Update::AuthMessage(messages::LOGIN_FAILED.to_string()));

        let screen = draw(&app);
        assert!(screen.contains("bob"));
        assert!(screen.contains("**"));
        assert!(!screen.contains("xy"));
        assert!(screen.contains(messages::LOGIN_FAILED));
    }

    #[test]
    fn test_main_screen_empty_dashboard_placeholder() {
        let app = logged_in();
        let screen = draw(&app);
        assert!(screen.contains("alice"));
        assert!(screen.contains(messages::EMPTY_DASHBOARD));
    }

    #[test]
    fn test_main_screen_regions() {
        let mut app = logged_in();
        app.apply(Update::Companies(Region::Ready(vec![Company {
            id: 1,
            name: "UPS".to_string(),
            ticker: "UPS".to_string(),
            segment: "Parcel".to_string(),
        }])));
        app.apply(Update::Dashboard(Region::Ready(Dashboard {
            companies: vec![DashboardRow {
                id: 1,
                name: "UPS".to_string(),
                ticker: "UPS".to_string(),
                segment: "Parcel".to_string(),
                ratios: Ratios {
                    revenue: Some(91_000_000_000.0),
                    ..Ratios::default()
                },
            }],
        })));
        app.apply(Update::SectorAnalytics("Parcel volumes are soft.".to_string()));

        let screen = draw(&app);
        assert!(screen.contains("UPS (UPS) - Parcel"));
        assert!(screen.contains("Current Ratio"));
        assert!(screen.contains("91B"));
        assert!(screen.contains("Parcel volumes are soft."));
    }

    #[test]
    fn test_main_screen_failed_region() {
        let mut app = logged_in();
        app.apply(Update::Dashboard(Region::Failed(messages::ERROR_DASHBOARD)));
        assert!(draw(&app).contains(messages::ERROR_DASHBOARD));
    }

    #[test]
    fn test_detail_screen() {
        let mut app = logged_in();
        app.open_detail(3);
        assert!(draw(&app).contains(messages::LOADING_DETAIL));

        let detail = CompanyDetail {
            income_statement: Some(Statement {
                columns: vec!["2024-12-31".to_string()],
                index: vec!["Total Revenue".to_string()],
                data: vec![vec![Some(Cell::Number(1500.0))]],
            }),
            ..CompanyDetail::default()
        };
        app.apply(Update::Detail {
            company_id: 3,
            region: Region::Ready(detail_view(&detail, Some("DSV"), 3)),
        });
        app.apply(Update::CompanyAnalytics {
            company_id: 3,
            text: messages::COMPANY_GENERATING.to_string(),
        });

        let screen = draw(&app);
        assert!(screen.contains("DSV"));
        assert!(screen.contains("Total Revenue"));
        assert!(screen.contains("1500"));
        assert!(screen.contains(messages::COMPANY_GENERATING));

        app.next_statement();
        assert!(draw(&app).contains(messages::NO_STATEMENT));
    }

    #[test]
    fn test_add_company_screen() {
        let mut app = logged_in();
        app.open_company_form();
        app.apply(Update::CompanyForm(crate::controller::FormOutcome::Message(
            messages::COMPANY_FIELDS_REQUIRED.to_string(),
        )));

        let screen = draw(&app);
        assert!(screen.contains("Ticker"));
        assert!(screen.contains(messages::COMPANY_FIELDS_REQUIRED));
    }
}
