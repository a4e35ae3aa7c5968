pub mod app;
pub mod assets;
pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod logging;
pub mod state;
pub mod ui;
pub mod view;

use std::cell::RefCell;
use std::rc::Rc;

use gtk4::prelude::*;

pub use error::{AppError, AppResult};

use crate::app::Application;
use crate::assets::AssetPaths;
use crate::client::RestClientFactory;
use crate::config::{default_config_path, ConfigError, ConfigStore};
use crate::ui::GtkToolkit;

/// Application id; also the icon name the window is registered under.
pub const APPLICATION_ID: &str = "io.github.discord_gtk";

type GtkApplication = Application<GtkToolkit, RestClientFactory>;

/// Entrypoint used by the binary.
pub fn run() -> AppResult<()> {
    logging::init();
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "starting Discord-GTK");

    let assets = AssetPaths::resolve();
    let store = ConfigStore::new(default_config_path().map_err(ConfigError::from)?);
    tracing::info!(
        assets = %assets.stylesheet.display(),
        config = %store.path().display(),
        "resolved paths"
    );

    let application = gtk4::Application::new(
        Some(APPLICATION_ID),
        gtk4::gio::ApplicationFlags::NON_UNIQUE,
    );

    let running: Rc<RefCell<Option<GtkApplication>>> = Rc::new(RefCell::new(None));
    let startup_error: Rc<RefCell<Option<AppError>>> = Rc::new(RefCell::new(None));
    {
        let running = running.clone();
        let startup_error = startup_error.clone();
        application.connect_activate(move |gtk_app| {
            if let Some(app) = running.borrow().as_ref() {
                if let Some(window) = app.window() {
                    window.present();
                }
                return;
            }

            let mut app = Application::new(
                GtkToolkit::new(gtk_app),
                RestClientFactory::default(),
                assets.clone(),
                store.clone(),
            );
            match app.start() {
                Ok(report) => {
                    tracing::debug!(?report, "startup report");
                    running.borrow_mut().replace(app);
                }
                Err(err) => {
                    tracing::error!(?err, "startup failed");
                    startup_error.borrow_mut().replace(err);
                    gtk_app.quit();
                }
            }
        });
    }

    // GTK only sees argv[0]; the app takes no flags of its own.
    let program = std::env::args().next().unwrap_or_else(|| "discord-gtk".to_string());
    let exit_code = application.run_with_args(&[program]);
    tracing::info!(?exit_code, "gtk main loop finished");

    running.borrow_mut().take();
    let startup_error = startup_error.borrow_mut().take();
    match startup_error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
