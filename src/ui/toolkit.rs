use std::cell::Cell;
use std::path::Path;
use std::rc::Rc;

use gtk4::prelude::*;
use gtk4::{ApplicationWindow, CssProvider, IconTheme, Stack};

use super::style::{StyleTokens, LAYOUT_TOKENS};
use super::views::{view_stack, MainView, SettingsView};
use crate::app::{Toolkit, WindowSurface};
use crate::assets::{AssetError, FontRegistry};
use crate::config::Settings;
use crate::events::EventBus;
use crate::view::ViewId;

pub struct GtkToolkit {
    application: gtk4::Application,
    tokens: StyleTokens,
}

impl GtkToolkit {
    pub fn new(application: &gtk4::Application) -> Self {
        Self {
            application: application.clone(),
            tokens: LAYOUT_TOKENS,
        }
    }
}

impl FontRegistry for GtkToolkit {
    #[cfg(feature = "bundled-fonts")]
    fn register_font(&self, path: &Path) -> Result<(), AssetError> {
        register_application_font(path)
    }

    #[cfg(not(feature = "bundled-fonts"))]
    fn register_font(&self, _path: &Path) -> Result<(), AssetError> {
        Err(AssetError::FontsUnsupported)
    }

    fn supports_fonts(&self) -> bool {
        cfg!(feature = "bundled-fonts")
    }
}

/// Adds `path` to the font map widgets render with.
///
/// `Widget::font_map` only reports a map set with `set_font_map`, so the map
/// is taken from a widget's Pango context instead.
#[cfg(feature = "bundled-fonts")]
fn register_application_font(path: &Path) -> Result<(), AssetError> {
    use pango::prelude::FontMapExt;

    let font_map = gtk4::Label::new(None)
        .pango_context()
        .font_map()
        .ok_or_else(|| AssetError::Font {
            path: path.to_path_buf(),
            reason: "no font map available".to_string(),
        })?;
    font_map
        .add_font_file(path)
        .map_err(|err| AssetError::Font {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;
    tracing::debug!(path = %path.display(), "registered application font");
    Ok(())
}

impl Toolkit for GtkToolkit {
    type Surface = GtkWindow;

    fn build_window(&self, events: Rc<EventBus>, settings: Rc<Settings>) -> GtkWindow {
        GtkWindow::new(&self.application, &events, settings, self.tokens)
    }
}

/// The root `ApplicationWindow` and its view stack.
pub struct GtkWindow {
    window: ApplicationWindow,
    stack: Stack,
    main_view: MainView,
    _settings_view: Rc<SettingsView>,
    visible: Cell<ViewId>,
}

impl GtkWindow {
    fn new(
        application: &gtk4::Application,
        events: &Rc<EventBus>,
        settings: Rc<Settings>,
        tokens: StyleTokens,
    ) -> Self {
        let window = ApplicationWindow::new(application);
        window.add_css_class("root-window");
        window.set_size_request(tokens.window_min_width, tokens.window_min_height);
        window.set_default_size(tokens.window_default_width, tokens.window_default_height);

        let main_view = MainView::new(events, tokens);
        let settings_view = SettingsView::new(events, settings, tokens);
        let stack = view_stack(&main_view, &settings_view, tokens);
        window.set_child(Some(&stack));

        Self {
            window,
            stack,
            main_view,
            _settings_view: settings_view,
            visible: Cell::new(ViewId::Main),
        }
    }
}

impl WindowSurface for GtkWindow {
    fn apply_stylesheet(&self, css: &str) {
        let provider = CssProvider::new();
        provider.load_from_data(css);
        if let Some(display) = gtk4::gdk::Display::default() {
            gtk4::style_context_add_provider_for_display(
                &display,
                &provider,
                gtk4::STYLE_PROVIDER_PRIORITY_APPLICATION,
            );
        }
    }

    fn set_icon(&self, path: &Path) -> Result<(), AssetError> {
        let icon_error = |reason: &str| AssetError::Icon {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        };
        let display = gtk4::gdk::Display::default().ok_or_else(|| icon_error("no display"))?;
        let dir = path.parent().ok_or_else(|| icon_error("no parent directory"))?;
        let name = crate::APPLICATION_ID;
        if path.file_stem().and_then(|stem| stem.to_str()) != Some(name) {
            return Err(icon_error("icon file must be named after the application id"));
        }

        let icon_theme = IconTheme::for_display(&display);
        icon_theme.add_search_path(dir);
        if !icon_theme.has_icon(name) {
            return Err(icon_error("icon theme did not pick up the icon"));
        }
        self.window.set_icon_name(Some(name));
        tracing::debug!(icon = name, "applied window icon");
        Ok(())
    }

    fn set_title(&self, title: &str) {
        self.window.set_title(Some(title));
    }

    fn title(&self) -> String {
        self.window
            .title()
            .map(|title| title.to_string())
            .unwrap_or_default()
    }

    fn show_view(&self, view: ViewId) {
        self.stack.set_visible_child_name(view.stack_page().as_str());
        if view.is_chat() {
            self.main_view.show_section(view);
        }
        self.visible.set(view);
    }

    fn visible_view(&self) -> ViewId {
        self.visible.get()
    }

    fn present(&self) {
        self.window.present();
    }
}

#[cfg(all(test, feature = "bundled-fonts"))]
mod tests {
    use super::*;

    const SYSTEM_FONTS: &[&str] = &[
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
        "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
    ];

    #[test]
    fn fonts_register_with_the_rendering_font_map() {
        if gtk4::init().is_err() {
            eprintln!("no display available; skipping font registration test");
            return;
        }

        let Some(font) = SYSTEM_FONTS.iter().map(Path::new).find(|path| path.is_file()) else {
            let err = register_application_font(Path::new("/nonexistent/font.ttf"))
                .expect_err("missing font file cannot register");
            assert!(!err.to_string().contains("no font map available"));
            return;
        };

        register_application_font(font).expect("system font should register");
    }
}
