// ============================================================================
// Détail - Rendu de la vue société
// ============================================================================
// Header (nom + téléchargement), ratios clés, onglets des trois états
// financiers, puis l'analyse de la société
//
// CONCEPTS RATATUI :
// 1. Tabs : onglets avec index sélectionné
// 2. Table : widths construites dynamiquement (nombre de périodes variable)
// ============================================================================

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph, TableState, Tabs},
    Frame,
};

use crate::app::App;
use crate::models::StatementKind;
use crate::ui::common::{
    create_layout, panel, render_footer, render_header, render_message, render_region,
    render_text, shortcut,
};
use crate::ui::dashboard::{selection_style, table_widget};
use crate::view::{messages, DetailView, TableView};

/// Largeur de la colonne des libellés
const LINE_ITEM_WIDTH: u16 = 40;

/// Largeur d'une colonne de période
const PERIOD_WIDTH: u16 = 18;

/// Dessine la vue détail
pub fn render_detail(frame: &mut Frame, app: &App) {
    let chunks = create_layout(frame.size());

    let title = app.detail_title().unwrap_or("Company");
    let info = if app.detail_title().is_some() {
        shortcut("[w]", "Download report", Color::Green)
    } else {
        Vec::new()
    };
    render_header(frame, chunks[0], title, info);

    render_region(
        frame,
        chunks[1],
        panel("Detail", false),
        &app.detail,
        messages::LOADING_DETAIL,
        |frame, area, _, view: &DetailView| render_view(frame, app, view, area),
    );

    render_footer(frame, app, chunks[2], footer_line());
}

fn render_view(frame: &mut Frame, app: &App, view: &DetailView, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Ratios : 2 lignes
            Constraint::Length(3), // Onglets
            Constraint::Min(5),    // État financier
            Constraint::Length(8), // Analyse
        ])
        .split(area);

    render_ratios(frame, view, chunks[0]);
    render_tabs(frame, app.detail_tab, chunks[1]);
    render_statement(frame, app, view, chunks[2]);
    render_text(
        frame,
        chunks[3],
        panel("Company Analytics", false),
        &app.company_analytics,
    );
}

/// Ratios clés sur deux lignes de quatre
fn render_ratios(frame: &mut Frame, view: &DetailView, area: Rect) {
    let lines: Vec<Line> = view
        .ratios
        .chunks(4)
        .map(|chunk| {
            let spans: Vec<Span> = chunk
                .iter()
                .flat_map(|(label, value)| {
                    [
                        Span::styled(
                            format!("{}: ", label),
                            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                        ),
                        Span::raw(format!("{:<14}", value)),
                    ]
                })
                .collect();
            Line::from(spans)
        })
        .collect();

    let paragraph = Paragraph::new(lines).block(panel("Key Ratios", false));
    frame.render_widget(paragraph, area);
}

fn render_tabs(frame: &mut Frame, selected: StatementKind, area: Rect) {
    let titles: Vec<&str> = StatementKind::ALL.iter().map(|kind| kind.title()).collect();
    let index = StatementKind::ALL
        .iter()
        .position(|&kind| kind == selected)
        .unwrap_or(0);

    let tabs = Tabs::new(titles)
        .block(panel("Statements", false))
        .select(index)
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        );
    frame.render_widget(tabs, area);
}

fn render_statement(frame: &mut Frame, app: &App, view: &DetailView, area: Rect) {
    let kind = app.detail_tab;
    let block: Block = panel(kind.title(), true);

    match view.statement(kind).and_then(|s| s.table.as_ref()) {
        None => render_message(frame, area, block, messages::NO_STATEMENT, Color::Gray),
        Some(table) => {
            let widget = table_widget(table, statement_widths(table))
                .block(block)
                .highlight_style(selection_style(true));

            let mut state = TableState::default().with_selected(Some(app.statement_row));
            frame.render_stateful_widget(widget, area, &mut state);
        }
    }
}

/// Libellé puis une colonne par période
fn statement_widths(table: &TableView) -> Vec<Constraint> {
    let periods = table.headers.len().saturating_sub(1);
    std::iter::once(Constraint::Length(LINE_ITEM_WIDTH))
        .chain(std::iter::repeat(Constraint::Length(PERIOD_WIDTH)).take(periods))
        .collect()
}

fn footer_line() -> Line<'static> {
    let mut spans = Vec::new();
    spans.extend(shortcut("[ESC / Space]", "Back", Color::Yellow));
    spans.extend(shortcut("[h l / ←→]", "Statement", Color::Yellow));
    spans.extend(shortcut("[↑↓ / j k]", "Scroll", Color::Yellow));
    spans.extend(shortcut("[w]", "Download", Color::Green));
    spans.extend(shortcut("[q]", "Quit", Color::Yellow));
    Line::from(spans)
}
