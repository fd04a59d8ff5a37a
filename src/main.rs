//! Application entry point — Document Chat.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from disk (returns default on first run).
//! 3. Create [`tokio`] runtime (multi-thread, 2 workers).
//! 4. Build the HTTP backend client from config.
//! 5. Build the conversation controller with saved language preferences.
//! 6. Spawn the language catalog fetch.
//! 7. Build the ingestion forms and the audio player.
//! 8. Run [`eframe::run_native`] — blocks the main thread until the window
//!    is closed.

use std::sync::Arc;

use doc_chat::{
    api::{Backend, HttpBackend},
    app::DocChatApp,
    chat::ConversationController,
    config::{AppConfig, PreferenceStore},
    ingest::IngestionForm,
    voice::player_from_config,
};

use eframe::egui;

// ---------------------------------------------------------------------------
// Native options builder
// ---------------------------------------------------------------------------

fn native_options(config: &AppConfig) -> eframe::NativeOptions {
    let (width, height) = config.ui.window_size;
    let vp = egui::ViewportBuilder::default()
        .with_title("Doc Chat")
        .with_inner_size([width, height])
        .with_min_inner_size([480.0, 360.0]);

    eframe::NativeOptions {
        viewport: vp,
        ..Default::default()
    }
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() -> eframe::Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Doc Chat starting up");

    // 2. Configuration
    let config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        AppConfig::default()
    });

    // 3. Tokio runtime
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .map_err(|e| eframe::Error::AppCreation(Box::new(e)))?;

    // 4. Backend
    let backend: Arc<dyn Backend> = Arc::new(HttpBackend::from_config(&config.backend));
    log::info!("backend: {}", config.backend.base_url);

    // 5. Conversation
    let chat = ConversationController::new(
        Arc::clone(&backend),
        PreferenceStore::new(),
        config.status.clone(),
    );

    // 6. Language catalog, fetched once at startup
    {
        let chat = chat.clone();
        rt.spawn(async move { chat.load_language_catalog().await });
    }

    // 7. Forms and playback
    let forms = IngestionForm::all(&backend, &config.status);
    let player = player_from_config(&config.voice);

    // 8. Build the egui app and run it (blocks until the window is closed)
    let app = DocChatApp::new(chat, forms, player, &config, rt.handle().clone());
    let options = native_options(&config);

    let result = eframe::run_native(
        "Doc Chat",
        options,
        Box::new(move |_cc| Ok(Box::new(app))),
    );
    rt.shutdown_background();
    result
}
