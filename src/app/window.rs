use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use gtk4::glib;

use super::{AppContext, Toolkit, WindowSurface};
use crate::assets::{load_icon, read_stylesheet, AssetPaths, LoadOutcome};
use crate::client::{ChatClient, ClientFactory, ClientOptions, CurrentUser, LogLevel};
use crate::config::Account;
use crate::error::AppResult;
use crate::events::{AppEvent, SubscriptionId};
use crate::state::{SessionEvent, SessionMachine, SessionState};
use crate::view::ViewId;

const APP_TITLE: &str = "Discord-GTK";

pub fn unauthenticated_title() -> String {
    format!("{APP_TITLE} • Not logged in")
}

pub fn connecting_title() -> String {
    format!("{APP_TITLE} • Connecting…")
}

pub fn authenticated_title(user: &CurrentUser) -> String {
    format!("{APP_TITLE} • {}", user.tag())
}

/// Owns the top-level window surface and the chat login.
///
/// `load_client` must not run twice at once for the same window; requests that
/// arrive through `LoginRequested` while a login is outstanding are dropped.
pub struct RootWindow<S, F: ClientFactory> {
    surface: S,
    context: Rc<AppContext<F::Client>>,
    factory: F,
    session: RefCell<SessionMachine>,
    login_in_flight: Cell<bool>,
    subscriptions: RefCell<Vec<SubscriptionId>>,
}

impl<S, F> RootWindow<S, F>
where
    S: WindowSurface + 'static,
    F: ClientFactory + 'static,
{
    /// Fails only when the stylesheet cannot be read; the icon is best-effort
    /// and its outcome is returned alongside the window.
    pub fn new<T>(
        toolkit: &T,
        context: Rc<AppContext<F::Client>>,
        factory: F,
        assets: &AssetPaths,
    ) -> AppResult<(Rc<Self>, LoadOutcome)>
    where
        T: Toolkit<Surface = S>,
    {
        let stylesheet = read_stylesheet(&assets.stylesheet)?;

        let surface = toolkit.build_window(context.events().clone(), context.settings().clone());
        surface.apply_stylesheet(&stylesheet);
        let icon = load_icon(&assets.icon, |path| surface.set_icon(path));
        surface.set_title(&unauthenticated_title());
        surface.show_view(ViewId::Main);

        let window = Rc::new(Self {
            surface,
            context,
            factory,
            session: RefCell::new(SessionMachine::new()),
            login_in_flight: Cell::new(false),
            subscriptions: RefCell::new(Vec::new()),
        });
        window.connect_events();

        Ok((window, icon))
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn session_state(&self) -> SessionState {
        self.session.borrow().state()
    }

    pub fn login_in_flight(&self) -> bool {
        self.login_in_flight.get()
    }

    pub fn present(&self) {
        self.surface.present();
    }

    fn connect_events(self: &Rc<Self>) {
        let events = self.context.events();
        let mut subscriptions = self.subscriptions.borrow_mut();

        let weak = Rc::downgrade(self);
        subscriptions.push(events.on_switch_view(move |view| {
            with_window(&weak, |window| {
                tracing::debug!(%view, "switching view");
                window.surface.show_view(view);
            });
        }));

        let weak = Rc::downgrade(self);
        subscriptions.push(events.on_ready(move || {
            with_window(&weak, |window| {
                match window.context.settings().auto_login_account() {
                    Some(account) => {
                        tracing::info!(account = %account.id, "auto-login account found");
                        window.spawn_login(account);
                    }
                    None => tracing::info!("no auto-login account configured"),
                }
            });
        }));

        let weak = Rc::downgrade(self);
        subscriptions.push(events.on_new_client(move |info| {
            with_window(&weak, |window| {
                tracing::debug!(session = info.session, "new chat client");
                window.surface.set_title(&connecting_title());
            });
        }));

        let weak = Rc::downgrade(self);
        subscriptions.push(events.on_login_requested(move |account_id| {
            with_window(&weak, |window| {
                match window.context.settings().account(account_id) {
                    Some(account) => {
                        window.spawn_login(account);
                    }
                    None => tracing::warn!(account = account_id, "login requested for unknown account"),
                }
            });
        }));
    }

    /// Schedules `load_client` on the thread-default main context.
    /// Returns `false` if a login is already outstanding.
    pub fn spawn_login(self: &Rc<Self>, account: Account) -> bool {
        if self.login_in_flight.replace(true) {
            tracing::warn!(account = %account.id, "login already in progress; ignoring request");
            return false;
        }

        let window = self.clone();
        glib::MainContext::ref_thread_default().spawn_local(async move {
            window.load_client(&account).await;
            window.login_in_flight.set(false);
        });
        true
    }

    /// Replaces the current chat client with one logged in as `account`.
    ///
    /// The previous client is destroyed before the new one is constructed.
    /// Returns whether the login succeeded; failures are logged, never retried.
    pub async fn load_client(&self, account: &Account) -> bool {
        if let Some(previous) = self.context.take_client() {
            tracing::debug!("tearing down previous chat client");
            previous.destroy().await;
            self.record(SessionEvent::ClientTornDown);
        }

        let options = ClientOptions::standard();
        let user_agent = options.user_agent.clone();
        let client = Rc::new(self.factory.create(options));
        client.on_log(
            LogLevel::Error,
            Box::new(|message| tracing::error!(target: "discord_gtk::client", "{message}")),
        );
        client.on_log(
            LogLevel::Warn,
            Box::new(|message| tracing::warn!(target: "discord_gtk::client", "{message}")),
        );
        if self.context.settings().debug() {
            client.on_log(
                LogLevel::Debug,
                Box::new(|message| tracing::debug!(target: "discord_gtk::client", "{message}")),
            );
        }
        self.context.set_client(client.clone(), &user_agent);

        let success = match client.login(&account.token).await {
            Ok(user) => {
                tracing::info!(account = %account.id, user = %user.tag(), "logged in");
                self.surface.set_title(&authenticated_title(&user));
                self.record(SessionEvent::LoginSucceeded);
                self.context.events().emit(AppEvent::SwitchView(ViewId::Dm));
                true
            }
            Err(err) => {
                tracing::error!(account = %account.id, ?err, "login failed");
                self.surface.set_title(&unauthenticated_title());
                self.record(SessionEvent::LoginFailed);
                false
            }
        };

        self.context.events().emit(AppEvent::LoginFinished {
            account_id: account.id.clone(),
            success,
        });
        success
    }

    fn record(&self, event: SessionEvent) {
        // Invalid transitions are already logged by the machine.
        let _ = self.session.borrow_mut().transition(event);
    }
}

impl<S, F: ClientFactory> Drop for RootWindow<S, F> {
    fn drop(&mut self) {
        let events = self.context.events();
        for id in self.subscriptions.get_mut().drain(..) {
            events.unsubscribe(id);
        }
    }
}

fn with_window<S, F, R>(weak: &Weak<RootWindow<S, F>>, f: R)
where
    F: ClientFactory,
    R: FnOnce(&Rc<RootWindow<S, F>>),
{
    if let Some(window) = weak.upgrade() {
        f(&window);
    }
}
