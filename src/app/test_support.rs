use std::cell::{Cell, RefCell};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

use gtk4::glib;

use super::{Application, Toolkit, WindowSurface};
use crate::assets::{AssetError, AssetPaths, FontRegistry};
use crate::client::{ChatClient, ClientError, ClientFactory, ClientOptions, CurrentUser, LogHook, LogLevel};
use crate::config::{Account, ConfigStore, Settings};
use crate::events::EventBus;
use crate::view::ViewId;

pub(crate) const TEST_STYLESHEET: &str = "window { background: #36393f; }";

pub(crate) type Journal = Rc<RefCell<Vec<String>>>;
pub(crate) type TestApplication = Application<StubToolkit, StubClientFactory>;

pub(crate) fn counter() -> Rc<Cell<usize>> {
    Rc::new(Cell::new(0))
}

pub(crate) fn account(id: &str, token: &str) -> Account {
    Account {
        id: id.to_string(),
        token: token.to_string(),
        auto_login: false,
    }
}

pub(crate) fn stub_user(token: &str) -> CurrentUser {
    CurrentUser {
        id: format!("id-{token}"),
        username: format!("user-{token}"),
        discriminator: "0001".to_string(),
        global_name: None,
    }
}

/// Runs `f` with a private main context as the thread default, so spawned
/// logins land on it instead of the global default context.
pub(crate) fn run_on_test_context<R>(f: impl FnOnce(&glib::MainContext) -> R) -> R {
    let context = glib::MainContext::new();
    context
        .with_thread_default(|| f(&context))
        .expect("test main context should be acquirable")
}

pub(crate) fn drain(context: &glib::MainContext) {
    for _ in 0..1_000 {
        if !context.iteration(false) {
            break;
        }
    }
}

pub(crate) struct Fixture {
    root: PathBuf,
}

impl Fixture {
    pub(crate) fn root(&self) -> &Path {
        &self.root
    }

    pub(crate) fn write_config(&self, json: &str) {
        std::fs::write(self.root.join("config.json"), json).expect("config fixture");
    }

    pub(crate) fn application(&self, accepted_tokens: &[&str]) -> (TestApplication, Journal) {
        let journal: Journal = Rc::new(RefCell::new(Vec::new()));
        let factory = StubClientFactory {
            journal: journal.clone(),
            accepted: accepted_tokens.iter().map(|token| token.to_string()).collect(),
            created: Cell::new(0),
        };
        let app = Application::new(
            StubToolkit::default(),
            factory,
            AssetPaths::in_dir(&self.root),
            ConfigStore::new(self.root.join("config.json")),
        );
        (app, journal)
    }
}

/// Temp root holding a stylesheet and nothing else.
pub(crate) fn with_fixture<F: FnOnce(&Fixture)>(tag: &str, f: F) {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::SystemTime::UNIX_EPOCH)
        .map_or(0, |d| d.as_nanos());
    let root = std::env::temp_dir().join(format!(
        "discord-gtk-app-{tag}-{}-{nanos}",
        std::process::id()
    ));
    std::fs::create_dir_all(&root).unwrap();
    std::fs::write(root.join("style.css"), TEST_STYLESHEET).unwrap();

    f(&Fixture { root: root.clone() });
    let _ = std::fs::remove_dir_all(&root);
}

#[derive(Default)]
pub(crate) struct StubToolkit {
    fonts: RefCell<Vec<PathBuf>>,
    events: RefCell<Vec<String>>,
}

impl FontRegistry for StubToolkit {
    fn register_font(&self, path: &Path) -> Result<(), AssetError> {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.events.borrow_mut().push(format!("font:{name}"));
        self.fonts.borrow_mut().push(path.to_path_buf());
        Ok(())
    }
}

impl Toolkit for StubToolkit {
    type Surface = StubSurface;

    fn build_window(&self, _events: Rc<EventBus>, _settings: Rc<Settings>) -> StubSurface {
        self.events.borrow_mut().push("build-window".to_string());
        StubSurface::default()
    }
}

impl TestApplication {
    pub(crate) fn toolkit_fonts(&self) -> Vec<PathBuf> {
        self.toolkit.fonts.borrow().clone()
    }

    pub(crate) fn toolkit_events(&self) -> Vec<String> {
        self.toolkit.events.borrow().clone()
    }
}

pub(crate) struct StubSurface {
    title: RefCell<String>,
    view: Cell<ViewId>,
    stylesheet: RefCell<Option<String>>,
    icon: RefCell<Option<PathBuf>>,
    presented: Cell<bool>,
}

impl Default for StubSurface {
    fn default() -> Self {
        Self {
            title: RefCell::new(String::new()),
            view: Cell::new(ViewId::Main),
            stylesheet: RefCell::new(None),
            icon: RefCell::new(None),
            presented: Cell::new(false),
        }
    }
}

impl StubSurface {
    pub(crate) fn stylesheet(&self) -> Option<String> {
        self.stylesheet.borrow().clone()
    }

    pub(crate) fn presented(&self) -> bool {
        self.presented.get()
    }
}

impl WindowSurface for StubSurface {
    fn apply_stylesheet(&self, css: &str) {
        *self.stylesheet.borrow_mut() = Some(css.to_string());
    }

    fn set_icon(&self, path: &Path) -> Result<(), AssetError> {
        *self.icon.borrow_mut() = Some(path.to_path_buf());
        Ok(())
    }

    fn set_title(&self, title: &str) {
        *self.title.borrow_mut() = title.to_string();
    }

    fn title(&self) -> String {
        self.title.borrow().clone()
    }

    fn show_view(&self, view: ViewId) {
        self.view.set(view);
    }

    fn visible_view(&self) -> ViewId {
        self.view.get()
    }

    fn present(&self) {
        self.presented.set(true);
    }
}

pub(crate) struct StubClientFactory {
    journal: Journal,
    accepted: Vec<String>,
    created: Cell<u64>,
}

impl ClientFactory for StubClientFactory {
    type Client = StubClient;

    fn create(&self, _options: ClientOptions) -> StubClient {
        let number = self.created.get() + 1;
        self.created.set(number);
        self.journal.borrow_mut().push(format!("create:{number}"));
        StubClient {
            number,
            journal: self.journal.clone(),
            accepted: self.accepted.clone(),
            user: RefCell::new(None),
        }
    }
}

/// Records every call in the shared journal. Teardown suspends once so
/// callers that fail to await it are caught by ordering assertions.
pub(crate) struct StubClient {
    number: u64,
    journal: Journal,
    accepted: Vec<String>,
    user: RefCell<Option<CurrentUser>>,
}

impl ChatClient for StubClient {
    fn on_log(&self, level: LogLevel, _hook: LogHook) {
        self.journal
            .borrow_mut()
            .push(format!("hook:{}:{level:?}", self.number));
    }

    async fn login(&self, token: &str) -> Result<CurrentUser, ClientError> {
        self.journal
            .borrow_mut()
            .push(format!("login:{}:{token}", self.number));
        if self.accepted.iter().any(|accepted| accepted == token) {
            let user = stub_user(token);
            *self.user.borrow_mut() = Some(user.clone());
            Ok(user)
        } else {
            Err(ClientError::Rejected { status: 401 })
        }
    }

    async fn destroy(&self) {
        self.journal
            .borrow_mut()
            .push(format!("destroy-begin:{}", self.number));
        YieldOnce::default().await;
        self.user.borrow_mut().take();
        self.journal
            .borrow_mut()
            .push(format!("destroy-end:{}", self.number));
    }

    fn current_user(&self) -> Option<CurrentUser> {
        self.user.borrow().clone()
    }
}

#[derive(Default)]
struct YieldOnce {
    yielded: bool,
}

impl Future for YieldOnce {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.yielded {
            return Poll::Ready(());
        }
        self.yielded = true;
        cx.waker().wake_by_ref();
        Poll::Pending
    }
}
