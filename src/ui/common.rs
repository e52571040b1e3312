// ============================================================================
// Éléments communs aux écrans
// ============================================================================
// Layout header / content / footer, raccourcis clavier et messages
// ============================================================================

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::app::App;
use crate::controller::Region;

/// Crée le layout principal (header, content, footer)
///
/// CONCEPT RUST : Rc<[T]> vs Vec<T>
/// - Layout::split() retourne Rc<[Rect]>
/// - On le convertit en Vec avec .to_vec() pour simplifier
pub fn create_layout(area: Rect) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Content
            Constraint::Length(3), // Footer
        ])
        .split(area)
        .to_vec()
}

/// Block avec bordures et titre
pub fn panel(title: &str, active: bool) -> Block<'static> {
    let color = if active { Color::Yellow } else { Color::Cyan };
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
        .title(format!(" {} ", title))
}

/// Header : titre à gauche, infos à droite
pub fn render_header(frame: &mut Frame, area: Rect, title: &str, info: Vec<Span<'_>>) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Financial Dashboard ")
        .title_alignment(Alignment::Center);

    let mut spans = vec![Span::styled(
        title.to_string(),
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
    )];
    if !info.is_empty() {
        spans.push(Span::raw("  |  "));
        spans.extend(info);
    }

    let paragraph = Paragraph::new(Line::from(spans)).block(block);
    frame.render_widget(paragraph, area);
}

/// Raccourci clavier : "[k]" en couleur + libellé
pub fn shortcut(keys: &'static str, label: &'static str, color: Color) -> Vec<Span<'static>> {
    vec![
        Span::styled(keys, Style::default().fg(color).add_modifier(Modifier::BOLD)),
        Span::raw(format!(" {}  ", label)),
    ]
}

/// Ligne d'avertissement pour une confirmation two-step
pub fn confirmation_line(key: &'static str, action: String) -> Line<'static> {
    let warn = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);
    Line::from(vec![
        Span::styled("⚠  Press ", warn),
        Span::styled(
            key,
            Style::default()
                .fg(Color::Red)
                .add_modifier(Modifier::BOLD)
                .add_modifier(Modifier::SLOW_BLINK),
        ),
        Span::styled(format!(" again to {}, any other key to cancel ⚠", action), warn),
    ])
}

/// Footer : alerte > confirmation de quit > raccourcis de l'écran
pub fn render_footer(frame: &mut Frame, app: &App, area: Rect, shortcuts: Line<'static>) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let line = if let Some(alert) = &app.alert {
        Line::from(Span::styled(
            alert.clone(),
            Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
        ))
    } else if app.is_awaiting_quit_confirmation() {
        confirmation_line("[q]", "quit".to_string())
    } else {
        shortcuts
    };

    let paragraph = Paragraph::new(line).block(block).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

/// Paragraphe centré (placeholder, chargement, erreur)
pub fn render_message(frame: &mut Frame, area: Rect, block: Block<'_>, text: &str, color: Color) {
    let paragraph = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(text.to_string(), Style::default().fg(color))),
    ])
    .block(block)
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

/// Dessine une zone selon son état : chargement / erreur / contenu
///
/// CONCEPT RUST : Closures génériques
/// - `F: FnOnce(...)` : appelée seulement si la zone est prête
pub fn render_region<T, F>(
    frame: &mut Frame,
    area: Rect,
    block: Block<'static>,
    region: &Region<T>,
    loading: &str,
    ready: F,
) where
    F: FnOnce(&mut Frame, Rect, Block<'static>, &T),
{
    match region {
        Region::Loading => render_message(frame, area, block, loading, Color::Gray),
        Region::Failed(message) => render_message(frame, area, block, message, Color::Red),
        Region::Ready(value) => ready(frame, area, block, value),
    }
}

/// Texte libre avec retour à la ligne (analyses)
pub fn render_text(frame: &mut Frame, area: Rect, block: Block<'_>, text: &str) {
    let paragraph = Paragraph::new(text.to_string())
        .block(block)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}
