//! Application context and startup sequencing.
//!
//! `Application` is constructed explicitly and owns everything the process
//! shares: the event bus, the loaded settings, the current chat client and the
//! root window. Components receive the pieces they need at construction.

use std::cell::{Cell, RefCell};
use std::path::Path;
use std::rc::Rc;

use crate::assets::{load_fonts, AssetError, AssetPaths, FontRegistry, LoadOutcome};
use crate::client::{ChatClient, ClientFactory};
use crate::config::{ConfigError, ConfigStore, Settings};
use crate::error::{AppError, AppResult};
use crate::events::{AppEvent, ClientInfo, EventBus};
use crate::view::ViewId;

mod window;

#[cfg(test)]
mod test_support;

pub use window::{authenticated_title, connecting_title, unauthenticated_title, RootWindow};

/// What the root window needs from a toolkit window.
pub trait WindowSurface {
    fn apply_stylesheet(&self, css: &str);
    fn set_icon(&self, path: &Path) -> Result<(), AssetError>;
    fn set_title(&self, title: &str);
    fn title(&self) -> String;
    fn show_view(&self, view: ViewId);
    fn visible_view(&self) -> ViewId;
    fn present(&self);
}

pub trait Toolkit: FontRegistry {
    type Surface: WindowSurface + 'static;

    /// Builds the top-level window with its main and settings pages.
    fn build_window(&self, events: Rc<EventBus>, settings: Rc<Settings>) -> Self::Surface;
}

/// Shared state handed to every component that needs it.
pub struct AppContext<C> {
    events: Rc<EventBus>,
    settings: Rc<Settings>,
    client: RefCell<Option<Rc<C>>>,
    sessions: Cell<u64>,
}

impl<C: ChatClient> AppContext<C> {
    pub fn new(settings: Settings) -> Self {
        Self {
            events: Rc::new(EventBus::new()),
            settings: Rc::new(settings),
            client: RefCell::new(None),
            sessions: Cell::new(0),
        }
    }

    pub fn events(&self) -> &Rc<EventBus> {
        &self.events
    }

    pub fn settings(&self) -> &Rc<Settings> {
        &self.settings
    }

    pub fn client(&self) -> Option<Rc<C>> {
        self.client.borrow().clone()
    }

    pub(crate) fn take_client(&self) -> Option<Rc<C>> {
        self.client.borrow_mut().take()
    }

    /// Installs a new client and announces it with `NewClient`.
    pub fn set_client(&self, client: Rc<C>, user_agent: &str) {
        let previous = self.client.borrow_mut().replace(client);
        if previous.is_some() {
            tracing::warn!("replacing a chat client that was never torn down");
        }

        let session = self.sessions.get() + 1;
        self.sessions.set(session);
        tracing::debug!(session, "installed chat client");
        self.events.emit(AppEvent::NewClient(ClientInfo {
            session,
            user_agent: user_agent.to_string(),
        }));
    }
}

#[derive(Debug)]
pub struct StartupReport {
    pub fonts: LoadOutcome,
    pub icon: LoadOutcome,
    pub config: LoadOutcome<ConfigError>,
}

pub struct Application<T: Toolkit, F: ClientFactory> {
    toolkit: T,
    factory: Option<F>,
    assets: AssetPaths,
    context: Rc<AppContext<F::Client>>,
    window: Option<Rc<RootWindow<T::Surface, F>>>,
}

impl<T, F> Application<T, F>
where
    T: Toolkit,
    F: ClientFactory + 'static,
{
    pub fn new(toolkit: T, factory: F, assets: AssetPaths, store: ConfigStore) -> Self {
        Self {
            toolkit,
            factory: Some(factory),
            assets,
            context: Rc::new(AppContext::new(Settings::new(store))),
            window: None,
        }
    }

    pub fn context(&self) -> &Rc<AppContext<F::Client>> {
        &self.context
    }

    pub fn window(&self) -> Option<&Rc<RootWindow<T::Surface, F>>> {
        self.window.as_ref()
    }

    pub fn client(&self) -> Option<Rc<F::Client>> {
        self.context.client()
    }

    /// Fonts, then the window, then config, then `Ready`.
    ///
    /// Only a missing stylesheet aborts startup; the other steps report their
    /// outcome and carry on.
    pub fn start(&mut self) -> AppResult<StartupReport> {
        let factory = self.factory.take().ok_or(AppError::AlreadyStarted)?;

        let fonts = load_fonts(&self.assets.fonts_dir, &self.toolkit);

        let (window, icon) =
            RootWindow::new(&self.toolkit, self.context.clone(), factory, &self.assets)?;
        window.present();
        self.window = Some(window);

        let config = self.context.settings().load();

        tracing::info!(
            fonts = fonts.count(),
            icon = icon.is_loaded(),
            config_loaded = config.is_loaded(),
            "startup complete; emitting ready"
        );
        self.context.events().emit(AppEvent::Ready);

        Ok(StartupReport {
            fonts,
            icon,
            config,
        })
    }
}
