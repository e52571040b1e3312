// ============================================================================
// Traitement des touches
// ============================================================================
// Traduit un événement clavier en changement d'état local (App) et,
// si besoin, en Command pour le worker.
//
// CONCEPT : Event Handler Pattern
// - Routing par écran, puis guards sur la touche
// - Retourne Option<Command> : None = rien à envoyer au réseau
// ============================================================================

use tracing::{debug, info};

use crate::app::{App, Focus, Form, Screen};
use crate::controller::Command;
use crate::ui::events::{
    get_char_from_event, is_add_event, is_arrow_down_event, is_arrow_up_event, is_backspace_event,
    is_backtab_event, is_delete_event, is_down_event, is_download_event, is_enter_event,
    is_escape_event, is_interrupt_event, is_logout_event, is_next_tab_event,
    is_previous_tab_event, is_quit_event, is_register_event, is_reload_event, is_sector_event,
    is_space_event, is_tab_event, is_up_event, Event,
};

/// Traite un événement et retourne la commande éventuelle à exécuter
pub fn handle_event(app: &mut App, event: &Event) -> Option<Command> {
    if matches!(event, Event::Tick) {
        return None;
    }

    // Ctrl+C quitte depuis n'importe quel écran
    if is_interrupt_event(event) {
        info!("User interrupted");
        app.quit();
        return None;
    }

    // L'alerte reste affichée jusqu'à la touche suivante
    app.dismiss_alert();

    match app.current_screen {
        Screen::Login => handle_login(app, event),
        Screen::AddCompany => handle_company_form(app, event),
        Screen::Main => handle_main(app, event),
        Screen::Detail => handle_detail(app, event),
    }
}

/// Écran de connexion : saisie + Enter (login) / Ctrl+R (register)
fn handle_login(app: &mut App, event: &Event) -> Option<Command> {
    if is_escape_event(event) {
        app.quit();
        return None;
    }

    let form = &mut app.login_form;
    if is_enter_event(event) {
        info!(username = %form.value(0), "User submitted login");
        Some(Command::Login {
            username: form.value(0).to_string(),
            password: form.value(1).to_string(),
        })
    } else if is_register_event(event) {
        info!(username = %form.value(0), "User submitted registration");
        Some(Command::Register {
            username: form.value(0).to_string(),
            password: form.value(1).to_string(),
        })
    } else {
        edit_form(form, event);
        None
    }
}

/// Formulaire d'ajout : Enter valide, ESC annule
fn handle_company_form(app: &mut App, event: &Event) -> Option<Command> {
    if is_escape_event(event) {
        info!("User cancelled add company");
        app.company_form.clear();
        app.show_main();
        return None;
    }

    if is_enter_event(event) {
        let form = &app.company_form;
        // La validation (champs vides) est faite par le contrôleur
        return Some(Command::AddCompany {
            name: form.value(0).to_string(),
            ticker: form.value(1).to_string(),
            segment: form.value(2).to_string(),
        });
    }

    edit_form(&mut app.company_form, event);
    None
}

/// Navigation et édition communes aux formulaires
fn edit_form(form: &mut Form, event: &Event) {
    if is_tab_event(event) || is_arrow_down_event(event) {
        form.next_field();
    } else if is_backtab_event(event) || is_arrow_up_event(event) {
        form.previous_field();
    } else if is_backspace_event(event) {
        form.backspace();
    } else if let Some(c) = get_char_from_event(event) {
        form.append_char(c);
    }
}

/// Écran principal
fn handle_main(app: &mut App, event: &Event) -> Option<Command> {
    match event {
        _ if is_quit_event(event) => {
            // Two-step quit : première pression -> confirmation
            if app.is_awaiting_quit_confirmation() {
                info!("User confirmed quit");
                app.quit();
            } else {
                info!("User requested quit (awaiting confirmation)");
                app.cancel_confirmations();
                app.request_quit();
            }
            None
        }

        _ if is_delete_event(event) && app.focus == Focus::Companies => {
            // Deuxième pression : supprime la société mémorisée, pas la sélection
            if let Some(id) = app.confirm_delete {
                info!(company_id = id, "User confirmed delete");
                app.cancel_confirmations();
                return Some(Command::DeleteCompany { id });
            }

            let id = app.selected_company()?.id;
            info!(company_id = id, "User requested delete (awaiting confirmation)");
            app.cancel_confirmations();
            app.request_delete(id);
            None
        }

        _ => {
            // Toute autre touche annule les confirmations en attente
            app.cancel_confirmations();
            handle_main_action(app, event)
        }
    }
}

fn handle_main_action(app: &mut App, event: &Event) -> Option<Command> {
    if is_up_event(event) {
        app.navigate_up();
    } else if is_down_event(event) {
        app.navigate_down();
    } else if is_tab_event(event) || is_backtab_event(event) {
        app.toggle_focus();
    } else if is_add_event(event) {
        info!("User requested add company");
        app.open_company_form();
    } else if is_enter_event(event) {
        let target = match app.focus {
            Focus::Dashboard => app.selected_dashboard_row().map(|r| (r.id, r.name.clone())),
            Focus::Companies => app.selected_company().map(|c| (c.id, c.name.clone())),
        };
        let (id, name) = target?;
        info!(company_id = id, "User opened company detail");
        app.open_detail(id);
        return Some(Command::LoadDetail {
            id,
            name: Some(name),
        });
    } else if is_reload_event(event) {
        return Some(Command::Reload);
    } else if is_sector_event(event) {
        return Some(Command::SectorAnalytics);
    } else if is_logout_event(event) {
        info!("User requested logout");
        return Some(Command::Logout);
    }
    None
}

/// Écran détail
fn handle_detail(app: &mut App, event: &Event) -> Option<Command> {
    if is_quit_event(event) {
        if app.is_awaiting_quit_confirmation() {
            app.quit();
        } else {
            app.request_quit();
        }
        return None;
    }
    app.cancel_confirmations();

    if is_escape_event(event) || is_space_event(event) {
        debug!("User returned to main view");
        app.show_main();
    } else if is_up_event(event) {
        app.scroll_statement_up();
    } else if is_down_event(event) {
        app.scroll_statement_down();
    } else if is_next_tab_event(event) {
        app.next_statement();
    } else if is_previous_tab_event(event) {
        app.previous_statement();
    } else if is_download_event(event) {
        let id = app.detail_company?;
        let name = app.detail_title()?.to_string();
        info!(company_id = id, "User requested report download");
        return Some(Command::Download { id, name });
    }
    None
}

// ============================================================================
// Tests unitaires
// ============================================================================
