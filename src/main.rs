mod action;
mod app;
mod auth;
mod backend;
mod client;
mod config;
mod confirm;
mod debounce;
mod error;
mod event;
mod form;
mod format;
mod grid;
mod list_view;
mod notify;
mod search;
mod tui;
mod types;
mod ui;

use std::panic;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use clap::Parser;
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::action::Action;
use crate::app::App;
use crate::backend::Backend;
use crate::client::ApiClient;
use crate::config::Config;
use crate::event::Event;
use crate::tui::EventHandler;

/// Terminal administration client for the cinema ticketing backend
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Config file (default: <config dir>/cine-admin/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Backend API base URL, overrides the config file
    #[arg(long)]
    server: Option<String>,

    /// Write logs to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn init_logging(level: &str, log_file: Option<&PathBuf>) -> std::io::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let registry = tracing_subscriber::registry().with(filter);

    match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(Mutex::new(file)),
                )
                .init();
        }
        None => {
            registry
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = Config::load(args.config.as_deref());
    if let Some(server) = args.server {
        config.server.base_url = server;
    }

    init_logging(&config.ui.log_level, args.log_file.as_ref())?;

    // Set up panic hook to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = tui::restore();
        original_hook(panic_info);
    }));

    let token = auth::load_token(&config.server)?;
    let backend: Arc<dyn Backend> =
        Arc::new(ApiClient::new(config.server.base_url.clone(), token));
    tracing::debug!(base_url = %config.server.base_url, "starting");

    let result = run(backend, &config).await;

    tui::restore()?;

    let exit_message = result?;
    if let Some(message) = exit_message {
        println!("{}", message);
    }
    Ok(())
}

async fn run(
    backend: Arc<dyn Backend>,
    config: &Config,
) -> Result<Option<String>, Box<dyn std::error::Error>> {
    let mut terminal = tui::init()?;

    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();
    let mut app = App::new(backend, config, action_tx.clone());
    let mut events = EventHandler::new(tui::TICK_RATE, tui::RENDER_RATE);

    loop {
        tokio::select! {
            Some(event) = events.next() => {
                if event.is_quit() {
                    break;
                }

                match event {
                    Event::Render => {
                        terminal.draw(|frame| ui::render(frame, &app))?;
                    }
                    _ => {
                        let action = app.handle_event(event);
                        if !matches!(action, Action::None) {
                            action_tx.send(action)?;
                        }
                    }
                }
            }
            Some(action) = action_rx.recv() => {
                app.update(action);
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(app.exit_message.take())
}
