// ============================================================================
// Findash - Point d'entrée
// ============================================================================
// Client TUI du tableau de bord financier : connexion, sociétés suivies,
// ratios, états financiers, analyses générées et export des rapports.
//
// CONCEPTS RUST CLÉS :
// 1. Terminal raw mode : contrôle total du terminal
// 2. Event loop : render -> input -> commandes
// 3. Worker thread : runtime tokio + LocalSet pour les appels réseau
// 4. Channels : commandes vers le worker, mises à jour vers l'UI
// ============================================================================

use std::io;
use std::sync::mpsc;

use anyhow::{Context, Result};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::{debug, error, info};

use findash::api::HttpBackend;
use findash::app::App;
use findash::config::Config;
use findash::controller::{Command, Controller, Update};
use findash::handler::handle_event;
use findash::session::FileSessionStore;
use findash::ui::{events::EventHandler, render};

// ============================================================================
// Initialisation du logging
// ============================================================================
// CONCEPT : Logging dans une app TUI
// - Les println! ne fonctionnent pas une fois le TUI lancé
// - On log vers un fichier à la place, avec rotation quotidienne
// ============================================================================

/// Initialise le système de logging vers fichier
///
/// Les logs sont écrits dans `<data_dir>/logs/findash.log.<date>`.
///
/// # Utilisation
/// ```bash
/// tail -f ~/.local/share/findash/logs/findash.log.*
/// RUST_LOG=findash=trace findash
/// ```
fn init_logging(config: &Config) -> Result<()> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let log_dir = config.log_dir();
    std::fs::create_dir_all(&log_dir).context("Échec de la création du répertoire de logs")?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir.clone(), "findash.log");

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true)
                .with_line_number(true),
        )
        .with(
            // Par défaut : debug pour findash, info pour les dépendances
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "findash=debug,info".into()),
        )
        .try_init()
        .context("Échec de l'initialisation du subscriber")?;

    info!(?log_dir, "Logging initialisé");
    Ok(())
}

// ============================================================================
// Point d'entrée du programme
// ============================================================================

fn main() -> Result<()> {
    let config = Config::from_env();

    init_logging(&config).unwrap_or_else(|e| {
        eprintln!("⚠️  Warning: Failed to initialize logging: {}", e);
        eprintln!("   Continuing without logging...");
    });

    let backend = HttpBackend::new(&config.api_base_url).context("Failed to build HTTP client")?;
    info!(
        api = %backend.base_url(),
        data_dir = ?config.data_dir,
        download_dir = ?config.download_dir,
        "Findash starting up"
    );
    let store = FileSessionStore::new(config.session_file());

    // CONCEPT RUST : channels
    // - command_tx/rx : commandes de l'UI vers le worker (tokio, send() non bloquant)
    // - update_tx/rx : mises à jour du worker vers l'UI (std, try_recv dans la boucle)
    let (command_tx, command_rx) = unbounded_channel::<Command>();
    let (update_tx, update_rx) = mpsc::channel::<Update>();

    info!("Spawning background worker thread");
    let worker = spawn_background_worker(backend, store, config, command_rx, update_tx);

    // Reprend la session persistée (ou affiche l'écran de connexion)
    command_tx
        .send(Command::Restore)
        .context("Worker thread not running")?;

    debug!("Setting up terminal");
    let mut terminal = setup_terminal()?;

    let events = EventHandler::new();
    let mut app = App::new();

    info!("Starting event loop");
    let result = run(&mut terminal, &mut app, &events, &command_tx, &update_rx);

    // Restaure le terminal (même en cas d'erreur)
    debug!("Restoring terminal");
    restore_terminal(&mut terminal)?;

    // Ferme le canal : le worker sort de sa boucle
    drop(command_tx);
    if worker.join().is_err() {
        error!("Worker thread panicked");
    }

    match &result {
        Ok(_) => info!("Application exited normally"),
        Err(e) => error!(error = ?e, "Application exited with error"),
    }

    result
}

// ============================================================================
// Worker thread
// ============================================================================
// CONCEPT : Runtime current_thread + LocalSet
// - Le contrôleur partage son état avec Rc / RefCell : il reste sur ce thread
// - Chaque commande devient une tâche locale indépendante (spawn_local)
// - Une analyse lente ne bloque donc pas un rechargement ou une suppression
// ============================================================================

fn spawn_background_worker(
    backend: HttpBackend,
    store: FileSessionStore,
    config: Config,
    mut command_rx: UnboundedReceiver<Command>,
    update_tx: mpsc::Sender<Update>,
) -> std::thread::JoinHandle<()> {
    std::thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(e) => {
                error!(error = %e, "Failed to create tokio runtime");
                return;
            }
        };

        let controller = Controller::new(backend, store, config.download_dir, update_tx);
        let local = tokio::task::LocalSet::new();

        local.block_on(&runtime, async move {
            while let Some(command) = command_rx.recv().await {
                debug!(?command, "Worker received command");
                let controller = controller.clone();
                tokio::task::spawn_local(async move { controller.execute(command).await });
            }
            info!("Command channel closed, worker stopping");
        });
    })
}

// ============================================================================
// Event loop
// ============================================================================

/// Boucle principale : mises à jour -> render -> input
fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
    command_tx: &UnboundedSender<Command>,
    update_rx: &mpsc::Receiver<Update>,
) -> Result<()> {
    while app.is_running() {
        // ========================================
        // 0. MISES À JOUR : recopie les résultats du worker
        // ========================================
        // CONCEPT : Non-blocking receive avec try_recv
        loop {
            match update_rx.try_recv() {
                Ok(update) => app.apply(update),
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => {
                    error!("Worker thread disconnected!");
                    break;
                }
            }
        }

        // ========================================
        // 1. RENDER
        // ========================================
        terminal.draw(|frame| render(frame, app))?;

        // ========================================
        // 2. INPUT : touche -> état local + commande éventuelle
        // ========================================
        let event = match events.next() {
            Ok(event) => event,
            Err(e) => {
                debug!(error = %e, "Failed to read terminal event");
                continue;
            }
        };

        if let Some(command) = handle_event(app, &event) {
            info!(?command, "Sending command to worker");
            if command_tx.send(command).is_err() {
                error!("Failed to send command to worker");
            }
        }
    }

    Ok(())
}

// ============================================================================
// Terminal
// ============================================================================

/// Configure le terminal en mode TUI
fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;

    // Alternate screen : l'écran précédent est restauré à la sortie
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).map_err(|e| e.into())
}

/// Restaure le terminal à son état normal
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}
