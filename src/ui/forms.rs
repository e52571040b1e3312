// ============================================================================
// Formulaires - Connexion et ajout de société
// ============================================================================
// CONCEPT : Modal input (Vim-like)
// - Un champ actif à la fois, Tab pour passer au suivant
// - Le message inline (erreur ou confirmation) s'affiche sous les champs
// ============================================================================

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};

use crate::app::{App, Form};
use crate::ui::common::{create_layout, panel, render_footer, render_header, shortcut};
use crate::view::messages;

/// Écran de connexion / création de compte
pub fn render_login(frame: &mut Frame, app: &App) {
    let chunks = create_layout(frame.size());

    render_header(frame, chunks[0], "Login", Vec::new());
    render_form(frame, &app.login_form, "Login or register", centered(chunks[1]));

    let mut spans = Vec::new();
    spans.extend(shortcut("[Enter]", "Login", Color::Green));
    spans.extend(shortcut("[Ctrl+R]", "Register", Color::Cyan));
    spans.extend(shortcut("[Tab]", "Next field", Color::Yellow));
    spans.extend(shortcut("[ESC]", "Quit", Color::Red));
    render_footer(frame, app, chunks[2], Line::from(spans));
}

/// Formulaire d'ajout de société
pub fn render_add_company(frame: &mut Frame, app: &App) {
    let chunks = create_layout(frame.size());

    let user = app.username.clone().unwrap_or_default();
    render_header(
        frame,
        chunks[0],
        "Add company",
        vec![Span::raw(format!("User: {}", user))],
    );
    render_form(frame, &app.company_form, "New company", centered(chunks[1]));

    let mut spans = Vec::new();
    spans.extend(shortcut("[Enter]", "Confirm", Color::Green));
    spans.extend(shortcut("[Tab]", "Next field", Color::Yellow));
    spans.extend(shortcut("[ESC]", "Cancel", Color::Red));
    render_footer(frame, app, chunks[2], Line::from(spans));
}

/// Dessine les champs, le curseur sur le champ actif et le message
fn render_form(frame: &mut Frame, form: &Form, title: &str, area: Rect) {
    let mut lines = vec![Line::from("")];

    for (index, field) in form.fields.iter().enumerate() {
        let active = index == form.active;
        let label_style = if active {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Cyan)
        };

        let mut spans = vec![
            Span::styled(format!("{:>10}: ", field.label), label_style),
            Span::styled(field.display_value(), Style::default().fg(Color::White)),
        ];
        if active {
            spans.push(Span::styled(
                "█", // Curseur
                Style::default().fg(Color::White).add_modifier(Modifier::SLOW_BLINK),
            ));
        }
        lines.push(Line::from(spans));
        lines.push(Line::from(""));
    }

    if let Some(message) = &form.message {
        lines.push(Line::from(Span::styled(message.clone(), message_style(message))));
    }

    let paragraph = Paragraph::new(lines)
        .block(panel(title, true))
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

/// Les confirmations en vert, le reste en rouge
fn message_style(message: &str) -> Style {
    if message == messages::REGISTER_OK {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
    }
}

/// Zone centrée de 60 colonnes sur 12 lignes (ou moins si l'écran est petit)
fn centered(area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(12), Constraint::Min(0)])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(60), Constraint::Min(0)])
        .split(vertical[1])[1]
}
