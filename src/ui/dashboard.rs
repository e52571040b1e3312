// ============================================================================
// Dashboard - Rendu de la vue principale
// ============================================================================
// Trois zones indépendantes sous le header :
// - à gauche, la liste des sociétés
// - à droite, le tableau du dashboard puis l'analyse du secteur
//
// CONCEPTS RATATUI :
// 1. Table + TableState : tableau avec ligne sélectionnée
// 2. List + ListState : liste avec item sélectionné
// 3. Layout imbriqués : horizontal puis vertical
// ============================================================================

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, ListState, Row, Table, TableState},
    Frame,
};

use crate::app::{App, Focus};
use crate::models::{Company, Dashboard};
use crate::ui::common::{
    confirmation_line, create_layout, panel, render_footer, render_header, render_message,
    render_region, render_text, shortcut,
};
use crate::view::{company_list_lines, dashboard_view, messages, DashboardView, TableView};

/// Dessine la vue principale
pub fn render_main(frame: &mut Frame, app: &App) {
    let chunks = create_layout(frame.size());

    render_header(frame, chunks[0], "Companies", header_info(app));
    render_content(frame, app, chunks[1]);
    render_footer(frame, app, chunks[2], footer_line(app));
}

/// Utilisateur, heure du dernier chargement, chargement en cours
fn header_info(app: &App) -> Vec<Span<'static>> {
    let mut info = Vec::new();

    if let Some(username) = &app.username {
        info.push(Span::styled(
            format!("User: {}", username),
            Style::default().fg(Color::White),
        ));
    }
    if let Some(updated) = app.dashboard_updated_at {
        info.push(Span::raw(format!("  Updated {}", updated.format("%H:%M:%S"))));
    }
    if let Some(loading) = app.loading_message() {
        info.push(Span::styled(
            format!("  {}", loading),
            Style::default().fg(Color::Yellow),
        ));
    }
    info
}

fn render_content(frame: &mut Frame, app: &App, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(25), Constraint::Percentage(75)])
        .split(area);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(6), Constraint::Length(9)])
        .split(columns[1]);

    render_companies(frame, app, columns[0]);
    render_dashboard(frame, app, right[0]);
    render_text(
        frame,
        right[1],
        panel("Sector Analytics", false),
        &app.sector_analytics,
    );
}

// ============================================================================
// Liste des sociétés
// ============================================================================

fn render_companies(frame: &mut Frame, app: &App, area: Rect) {
    let active = app.focus == Focus::Companies;
    let block = panel("Companies", active);

    render_region(
        frame,
        area,
        block,
        &app.companies,
        messages::LOADING_COMPANIES,
        |frame, area, block, companies: &Vec<Company>| {
            if companies.is_empty() {
                render_message(frame, area, block, messages::EMPTY_COMPANIES, Color::Gray);
                return;
            }

            let items: Vec<ListItem> = company_list_lines(companies)
                .into_iter()
                .map(ListItem::new)
                .collect();

            let list = List::new(items)
                .block(block)
                .highlight_style(selection_style(active))
                .highlight_symbol("> ");

            // CONCEPT RATATUI : Stateful widget
            // - l'état de sélection vit dans App, ListState est recréé à chaque frame
            let mut state = ListState::default().with_selected(Some(app.selected_company));
            frame.render_stateful_widget(list, area, &mut state);
        },
    );
}

// ============================================================================
// Tableau du dashboard
// ============================================================================

/// Largeurs des 10 colonnes du dashboard
const DASHBOARD_WIDTHS: [Constraint; 10] = [
    Constraint::Min(8),     // Name
    Constraint::Length(10), // Segment
    Constraint::Length(8),  // Price
    Constraint::Length(8),  // Revenue
    Constraint::Length(10), // Net Income
    Constraint::Length(10), // Net Margin
    Constraint::Length(7),  // ROE
    Constraint::Length(5),  // D/E
    Constraint::Length(13), // Current Ratio
    Constraint::Length(9),  // 1Y Return
];

fn render_dashboard(frame: &mut Frame, app: &App, area: Rect) {
    let active = app.focus == Focus::Dashboard;
    let block = panel("Dashboard", active);

    render_region(
        frame,
        area,
        block,
        &app.dashboard,
        messages::LOADING_DASHBOARD,
        |frame, area, block, dashboard: &Dashboard| match dashboard_view(dashboard) {
            DashboardView::Empty(message) => {
                render_message(frame, area, block, message, Color::Gray)
            }
            DashboardView::Table { table, .. } => {
                let widget = table_widget(&table, DASHBOARD_WIDTHS.to_vec())
                    .block(block)
                    .highlight_style(selection_style(active));

                let mut state = TableState::default().with_selected(Some(app.selected_row));
                frame.render_stateful_widget(widget, area, &mut state);
            }
        },
    );
}

/// Convertit un TableView en widget Table (en-tête en gras)
pub fn table_widget(table: &TableView, widths: Vec<Constraint>) -> Table<'static> {
    let header = Row::new(table.headers.clone())
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .bottom_margin(1);

    let rows: Vec<Row> = table.rows.iter().map(|cells| Row::new(cells.clone())).collect();

    Table::new(rows, widths).header(header).column_spacing(1)
}

/// Style de la ligne sélectionnée (inversé seulement dans le panneau actif)
pub fn selection_style(active: bool) -> Style {
    if active {
        Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED)
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    }
}

// ============================================================================
// Footer
// ============================================================================

fn footer_line(app: &App) -> Line<'static> {
    if app.is_awaiting_delete_confirmation() {
        let name = app
            .pending_delete()
            .map(|c| c.name.clone())
            .unwrap_or_else(|| "?".to_string());
        return confirmation_line("[d]", format!("delete {}", name));
    }

    let mut spans = Vec::new();
    spans.extend(shortcut("[q]", "Quit", Color::Yellow));
    spans.extend(shortcut("[↑↓ / j k]", "Navigate", Color::Yellow));
    spans.extend(shortcut("[Tab]", "Switch panel", Color::Yellow));
    spans.extend(shortcut("[Enter]", "Detail", Color::Yellow));
    spans.extend(shortcut("[a]", "Add", Color::Green));
    spans.extend(shortcut("[d]", "Delete", Color::Red));
    spans.extend(shortcut("[r]", "Reload", Color::Cyan));
    spans.extend(shortcut("[s]", "Sector analytics", Color::Cyan));
    spans.extend(shortcut("[x]", "Logout", Color::Magenta));
    Line::from(spans)
}
