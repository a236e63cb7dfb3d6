use std::sync::Arc;

use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use rust_rest_chat::common::{Session, SyncCommand, SyncEvent};
use rust_rest_chat::config::{self, AppConfig};
use rust_rest_chat::network::{ChatApi, HttpChatApi, MockChatApi, SyncWorker};
use rust_rest_chat::storage::{self, SessionStore};
use rust_rest_chat::sync::ChatSyncClient;
use rust_rest_chat::ui::{ChatApp, view};
use tokio::sync::mpsc;

#[derive(Parser)]
#[command(
    name = "rust_rest_chat",
    version,
    about = "Polling chat client for the REST chat backend"
)]
struct Cli {
    /// Path to JSON config file
    #[arg(long, default_value = config::DEFAULT_CONFIG_PATH, value_name = "FILE")]
    config: String,
    /// Use the in-memory backend instead of the HTTP API
    #[arg(long)]
    mock: bool,
    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Subcommand, Clone, PartialEq, Eq)]
enum Mode {
    /// Follow the chats in the terminal (no UI)
    Watch,
    /// Store an access token and username obtained from the backend's login
    Session {
        #[arg(long)]
        token: String,
        #[arg(long)]
        username: Option<String>,
        /// Start the UI with the dark theme
        #[arg(long)]
        dark_mode: Option<bool>,
    },
    /// Forget the stored session and preferences
    Logout,
}

#[tokio::main]
async fn main() -> Result<(), eframe::Error> {
    dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();
    let app_config = config::load_config(&cli.config);
    let store = open_store(&app_config);

    match cli.mode {
        Some(Mode::Session {
            token,
            username,
            dark_mode,
        }) => {
            save_session(store, Session::new(Some(token), username), dark_mode);
            Ok(())
        }
        Some(Mode::Logout) => {
            clear_session(store);
            Ok(())
        }
        Some(Mode::Watch) => {
            if let Some(api) = build_api(cli.mock, &app_config) {
                run_headless(api, store, &app_config).await;
            }
            Ok(())
        }
        None => match build_api(cli.mock, &app_config) {
            Some(api) => run_full_client(api, store, &app_config).await,
            None => Ok(()),
        },
    }
}

fn open_store(app_config: &AppConfig) -> Option<SessionStore> {
    if let Err(err) = storage::ensure_parent_dir(&app_config.database_path) {
        log::warn!("Unable to create data directory: {err}");
    }
    match SessionStore::with_path(&app_config.database_path) {
        Ok(store) => Some(store),
        Err(err) => {
            log::error!(
                "Failed to open session store {}: {err}",
                app_config.database_path
            );
            None
        }
    }
}

fn stored_session(store: Option<&SessionStore>) -> Session {
    store
        .and_then(|store| match store.load_session() {
            Ok(session) => Some(session),
            Err(err) => {
                log::warn!("Failed to read stored session: {err}");
                None
            }
        })
        .unwrap_or_default()
}

fn save_session(store: Option<SessionStore>, session: Session, dark_mode: Option<bool>) {
    let Some(store) = store else { return };
    match store.save_session(&session) {
        Ok(()) => log::info!("Stored session for {}", session.display_name()),
        Err(err) => log::error!("Failed to store session: {err}"),
    }
    if let Some(enabled) = dark_mode {
        if let Err(err) = store.set_dark_mode(enabled) {
            log::error!("Failed to store theme preference: {err}");
        }
    }
}

fn stored_dark_mode(store: Option<&SessionStore>) -> bool {
    store
        .map(|store| {
            store.dark_mode().unwrap_or_else(|err| {
                log::warn!("Failed to read theme preference: {err}");
                false
            })
        })
        .unwrap_or(false)
}

fn clear_session(store: Option<SessionStore>) {
    let Some(store) = store else { return };
    match store.clear() {
        Ok(()) => log::info!("Session cleared"),
        Err(err) => log::error!("Failed to clear session: {err}"),
    }
}

fn build_api(mock: bool, app_config: &AppConfig) -> Option<Arc<dyn ChatApi>> {
    if mock {
        log::info!("Using in-memory backend");
        return Some(Arc::new(MockChatApi::new()));
    }

    match HttpChatApi::new(&app_config.api_url) {
        Ok(api) => {
            log::info!("Using backend at {}", api.base_url());
            Some(Arc::new(api))
        }
        Err(err) => {
            log::error!("Cannot use API url `{}`: {err}", app_config.api_url);
            None
        }
    }
}

fn spawn_worker(
    api: Arc<dyn ChatApi>,
    store: Option<SessionStore>,
    session: Session,
    app_config: &AppConfig,
) -> (mpsc::Sender<SyncCommand>, mpsc::Receiver<SyncEvent>) {
    // UI -> sync loop
    let (cmd_tx, cmd_rx) = mpsc::channel(100);
    // sync loop -> UI
    let (event_tx, event_rx) = mpsc::channel(100);

    let worker = SyncWorker::new(
        ChatSyncClient::new(api),
        session,
        store,
        app_config.poll_interval(),
        event_tx,
        cmd_rx,
    );
    tokio::spawn(worker.run());

    (cmd_tx, event_rx)
}

async fn run_full_client(
    api: Arc<dyn ChatApi>,
    store: Option<SessionStore>,
    app_config: &AppConfig,
) -> Result<(), eframe::Error> {
    let session = stored_session(store.as_ref());
    let dark_mode = stored_dark_mode(store.as_ref());
    let (cmd_tx, event_rx) = spawn_worker(api, store, session.clone(), app_config);

    let options = eframe::NativeOptions::default();
    let mut event_rx = Some(event_rx);

    eframe::run_native(
        "Rust REST Chat",
        options,
        Box::new(move |cc| {
            let event_receiver = event_rx
                .take()
                .expect("ChatApp should only be initialized once");

            log::info!("Client started as {}", session.display_name());

            Ok(Box::new(ChatApp::new(
                cc,
                session.clone(),
                dark_mode,
                cmd_tx.clone(),
                event_receiver,
            )))
        }),
    )
}

async fn run_headless(api: Arc<dyn ChatApi>, store: Option<SessionStore>, app_config: &AppConfig) {
    let session = stored_session(store.as_ref());
    // Keep the sender alive so the loop keeps running.
    let (_cmd_tx, mut event_rx) = spawn_worker(api, store, session.clone(), app_config);
    let mut printed: Option<view::ChatView> = None;
    let mut seen_version = 0;

    loop {
        tokio::select! {
            event = event_rx.recv() => match event {
                Some(SyncEvent::StateChanged(state)) if state.version() >= seen_version => {
                    seen_version = state.version();
                    let current = view::project(&state, &session);
                    if printed.as_ref() != Some(&current) {
                        print_view(&current);
                        printed = Some(current);
                    }
                }
                Some(_) => {}
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                log::info!("Interrupted; exiting");
                break;
            }
        }
    }
}

fn print_view(current: &view::ChatView) {
    println!("== {} ({} chats) ==", current.header, current.chats.len());
    for message in &current.messages {
        println!("{message}");
    }
}
