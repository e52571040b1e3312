// ============================================================================
// Gestion des événements
// ============================================================================
// Lit les événements clavier et fournit des helpers pour les identifier
//
// CONCEPTS RUST :
// 1. Enums avec variants : représenter différents types d'événements
// 2. Pattern matching avec matches! et guards
// ============================================================================

use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Événements de l'application
#[derive(Debug, Clone)]
pub enum Event {
    /// Touche pressée
    Key(KeyEvent),

    /// Tick régulier : permet de traiter les résultats du worker
    Tick,
}

/// Gestionnaire d'événements
pub struct EventHandler {
    tick_rate: Duration,
}

impl EventHandler {
    /// Crée un gestionnaire avec un tick de 100ms
    pub fn new() -> Self {
        Self {
            tick_rate: Duration::from_millis(100),
        }
    }

    /// Lit le prochain événement (bloquant avec timeout)
    ///
    /// CONCEPT : Non-blocking I/O avec timeout
    /// - poll(timeout) attend au plus tick_rate
    /// - Si pas d'événement, retourne Ok(Event::Tick)
    pub fn next(&self) -> Result<Event> {
        if event::poll(self.tick_rate)? {
            match event::read()? {
                // Sur certains OS, on reçoit Press ET Release
                CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Ok(Event::Key(key)),
                _ => Ok(Event::Tick),
            }
        } else {
            Ok(Event::Tick)
        }
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Helpers : identifier les touches
// ============================================================================

/// Touche sans modificateur Ctrl/Alt
fn plain_key(event: &Event) -> Option<KeyCode> {
    match event {
        Event::Key(key) if !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
            Some(key.code)
        }
        _ => None,
    }
}

/// Ctrl + caractère
fn ctrl_char(event: &Event) -> Option<char> {
    match event {
        Event::Key(KeyEvent {
            code: KeyCode::Char(c),
            modifiers,
            ..
        }) if modifiers.contains(KeyModifiers::CONTROL) => Some(c.to_ascii_lowercase()),
        _ => None,
    }
}

/// 'q' : quitter (two-step)
pub fn is_quit_event(event: &Event) -> bool {
    matches!(plain_key(event), Some(KeyCode::Char('q') | KeyCode::Char('Q')))
}

/// Ctrl+C : quitter immédiatement, y compris depuis un formulaire
pub fn is_interrupt_event(event: &Event) -> bool {
    ctrl_char(event) == Some('c')
}

pub fn is_escape_event(event: &Event) -> bool {
    matches!(plain_key(event), Some(KeyCode::Esc))
}

pub fn is_space_event(event: &Event) -> bool {
    matches!(plain_key(event), Some(KeyCode::Char(' ')))
}

pub fn is_enter_event(event: &Event) -> bool {
    matches!(plain_key(event), Some(KeyCode::Enter))
}

/// Tab ou Shift+Tab (BackTab)
pub fn is_tab_event(event: &Event) -> bool {
    matches!(plain_key(event), Some(KeyCode::Tab))
}

pub fn is_backtab_event(event: &Event) -> bool {
    matches!(plain_key(event), Some(KeyCode::BackTab))
}

/// Flèche haut ou 'k' (vim)
pub fn is_up_event(event: &Event) -> bool {
    matches!(plain_key(event), Some(KeyCode::Up | KeyCode::Char('k') | KeyCode::Char('K')))
}

/// Flèche bas ou 'j' (vim)
pub fn is_down_event(event: &Event) -> bool {
    matches!(plain_key(event), Some(KeyCode::Down | KeyCode::Char('j') | KeyCode::Char('J')))
}

/// Flèches uniquement (dans les formulaires, 'j'/'k' sont du texte)
pub fn is_arrow_up_event(event: &Event) -> bool {
    matches!(plain_key(event), Some(KeyCode::Up))
}

pub fn is_arrow_down_event(event: &Event) -> bool {
    matches!(plain_key(event), Some(KeyCode::Down))
}

/// 'l' ou flèche droite : état financier suivant
pub fn is_next_tab_event(event: &Event) -> bool {
    matches!(plain_key(event), Some(KeyCode::Right | KeyCode::Char('l')))
}

/// 'h' ou flèche gauche : état financier précédent
pub fn is_previous_tab_event(event: &Event) -> bool {
    matches!(plain_key(event), Some(KeyCode::Left | KeyCode::Char('h')))
}

/// 'a' : ajouter une société
pub fn is_add_event(event: &Event) -> bool {
    matches!(plain_key(event), Some(KeyCode::Char('a') | KeyCode::Char('A')))
}

/// 'd' : supprimer la société sélectionnée (two-step)
pub fn is_delete_event(event: &Event) -> bool {
    matches!(plain_key(event), Some(KeyCode::Char('d') | KeyCode::Char('D')))
}

/// 'r' : recharger sociétés + dashboard
pub fn is_reload_event(event: &Event) -> bool {
    matches!(plain_key(event), Some(KeyCode::Char('r') | KeyCode::Char('R')))
}

/// 's' : régénérer l'analyse secteur
pub fn is_sector_event(event: &Event) -> bool {
    matches!(plain_key(event), Some(KeyCode::Char('s') | KeyCode::Char('S')))
}

/// 'w' : télécharger le rapport (write)
pub fn is_download_event(event: &Event) -> bool {
    matches!(plain_key(event), Some(KeyCode::Char('w') | KeyCode::Char('W')))
}

/// 'x' : déconnexion
pub fn is_logout_event(event: &Event) -> bool {
    matches!(plain_key(event), Some(KeyCode::Char('x') | KeyCode::Char('X')))
}

/// Ctrl+R : créer un compte depuis l'écran de connexion
pub fn is_register_event(event: &Event) -> bool {
    ctrl_char(event) == Some('r')
}

pub fn is_backspace_event(event: &Event) -> bool {
    matches!(plain_key(event), Some(KeyCode::Backspace))
}

/// Extrait le caractère imprimable d'un événement clavier
pub fn get_char_from_event(event: &Event) -> Option<char> {
    match plain_key(event) {
        Some(KeyCode::Char(c)) if !c.is_control() => Some(c),
        _ => None,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
pub(crate) fn key(code: KeyCode) -> Event {
    Event::Key(KeyEvent::new(code, KeyModifiers::empty()))
}

#[cfg(test)]
pub(crate) fn ctrl(c: char) -> Event {
    Event::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL))
}
