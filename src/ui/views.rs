use std::cell::RefCell;
use std::rc::{Rc, Weak};

use gtk4::prelude::*;
use gtk4::{
    Align, Button, CheckButton, Entry, Label, ListBox, Orientation, PasswordEntry,
    ScrolledWindow, SelectionMode, Stack, StackTransitionType, Switch,
};

use super::popovers::{CustomStatusDialog, EmojiPicker};
use super::style::StyleTokens;
use super::widgets::{icon_button, section_heading, toolbar_row};
use crate::config::{Account, Settings};
use crate::events::{AppEvent, EventBus};
use crate::view::ViewId;

const HOME_SECTION: &str = "home";
const DM_SECTION: &str = "dm";

/// Primary chat view: sidebar, content sections and the composer.
pub struct MainView {
    root: gtk4::Box,
    sections: Stack,
    _emoji_picker: EmojiPicker,
    _custom_status: CustomStatusDialog,
}

impl MainView {
    pub fn new(events: &Rc<EventBus>, tokens: StyleTokens) -> Self {
        let root = gtk4::Box::new(Orientation::Horizontal, 0);
        root.add_css_class("main-view");

        let sidebar = gtk4::Box::new(Orientation::Vertical, tokens.spacing_4);
        sidebar.add_css_class("sidebar");
        sidebar.set_size_request(tokens.sidebar_width, -1);

        let dm_button = Button::with_label("Direct Messages");
        dm_button.add_css_class("flat");
        dm_button.set_margin_top(tokens.spacing_8);
        dm_button.set_margin_start(tokens.spacing_8);
        dm_button.set_margin_end(tokens.spacing_8);
        {
            let events = Rc::downgrade(events);
            dm_button.connect_clicked(move |_| emit(&events, AppEvent::SwitchView(ViewId::Dm)));
        }

        let spacer = gtk4::Box::new(Orientation::Vertical, 0);
        spacer.set_vexpand(true);

        let footer = toolbar_row(tokens);
        footer.add_css_class("sidebar-footer");
        let status_label = Label::new(None);
        status_label.set_hexpand(true);
        status_label.set_halign(Align::Start);
        status_label.set_ellipsize(gtk4::pango::EllipsizeMode::End);
        let status_button = icon_button("user-available-symbolic", "Set custom status", tokens);
        let settings_button = icon_button("emblem-system-symbolic", "User settings", tokens);
        {
            let events = Rc::downgrade(events);
            settings_button.connect_clicked(move |_| {
                emit(&events, AppEvent::SwitchView(ViewId::Settings))
            });
        }
        footer.append(&status_label);
        footer.append(&status_button);
        footer.append(&settings_button);

        sidebar.append(&dm_button);
        sidebar.append(&spacer);
        sidebar.append(&footer);

        let content = gtk4::Box::new(Orientation::Vertical, 0);
        content.set_hexpand(true);
        content.add_css_class("content");

        let sections = Stack::new();
        sections.set_vexpand(true);
        let home = Label::new(Some("Welcome! Pick a conversation to get started."));
        home.add_css_class("placeholder");
        let dm = Label::new(Some("Your direct messages will show up here."));
        dm.add_css_class("placeholder");
        sections.add_named(&home, Some(HOME_SECTION));
        sections.add_named(&dm, Some(DM_SECTION));
        sections.set_visible_child_name(HOME_SECTION);

        let composer = toolbar_row(tokens);
        composer.add_css_class("composer");
        let message_entry = Entry::new();
        message_entry.set_hexpand(true);
        message_entry.set_placeholder_text(Some("Message"));
        let emoji_button = icon_button("face-smile-symbolic", "Pick an emoji", tokens);
        composer.append(&message_entry);
        composer.append(&emoji_button);

        content.append(&sections);
        content.append(&composer);

        root.append(&sidebar);
        root.append(&content);

        let emoji_picker = EmojiPicker::attach(&emoji_button, &message_entry);
        let custom_status = {
            let status_label = status_label.clone();
            CustomStatusDialog::attach(&status_button, tokens, move |status| {
                tracing::info!(status = status.as_deref().unwrap_or(""), "custom status changed");
                status_label.set_text(status.as_deref().unwrap_or(""));
            })
        };

        Self {
            root,
            sections,
            _emoji_picker: emoji_picker,
            _custom_status: custom_status,
        }
    }

    pub fn widget(&self) -> &gtk4::Box {
        &self.root
    }

    pub fn show_section(&self, view: ViewId) {
        let section = match view {
            ViewId::Dm => DM_SECTION,
            ViewId::Main | ViewId::Settings => HOME_SECTION,
        };
        self.sections.set_visible_child_name(section);
    }
}

/// Account management and preferences. Changes are persisted immediately.
pub struct SettingsView {
    root: gtk4::Box,
    accounts: ListBox,
    status: Label,
    debug_switch: Switch,
    login_buttons: RefCell<Vec<Button>>,
    settings: Rc<Settings>,
    events: Weak<EventBus>,
}

impl SettingsView {
    pub fn new(events: &Rc<EventBus>, settings: Rc<Settings>, tokens: StyleTokens) -> Rc<Self> {
        let root = gtk4::Box::new(Orientation::Vertical, tokens.spacing_12);
        root.add_css_class("settings-view");
        root.set_margin_top(tokens.spacing_16);
        root.set_margin_bottom(tokens.spacing_16);
        root.set_margin_start(tokens.spacing_16);
        root.set_margin_end(tokens.spacing_16);

        let header = gtk4::Box::new(Orientation::Horizontal, tokens.spacing_8);
        let back_button = icon_button("go-previous-symbolic", "Back", tokens);
        {
            let events = Rc::downgrade(events);
            back_button.connect_clicked(move |_| emit(&events, AppEvent::SwitchView(ViewId::Main)));
        }
        let title = Label::new(Some("Settings"));
        title.add_css_class("title-2");
        header.append(&back_button);
        header.append(&title);

        let accounts = ListBox::new();
        accounts.set_selection_mode(SelectionMode::None);
        accounts.add_css_class("boxed-list");
        let scroller = ScrolledWindow::new();
        scroller.set_vexpand(true);
        scroller.set_child(Some(&accounts));

        let add_row = toolbar_row(tokens);
        let id_entry = Entry::new();
        id_entry.set_placeholder_text(Some("Account name"));
        let token_entry = PasswordEntry::new();
        token_entry.set_show_peek_icon(true);
        token_entry.set_hexpand(true);
        let auto_login_check = CheckButton::with_label("Log in automatically");
        let add_button = Button::with_label("Add account");
        add_row.append(&id_entry);
        add_row.append(&token_entry);
        add_row.append(&auto_login_check);
        add_row.append(&add_button);

        let debug_row = toolbar_row(tokens);
        let debug_label = Label::new(Some("Verbose client logging"));
        debug_label.set_hexpand(true);
        debug_label.set_halign(Align::Start);
        let debug_switch = Switch::new();
        debug_row.append(&debug_label);
        debug_row.append(&debug_switch);

        let status = Label::new(None);
        status.set_halign(Align::Start);
        status.add_css_class("dim-label");

        root.append(&header);
        root.append(&section_heading("Accounts"));
        root.append(&scroller);
        root.append(&add_row);
        root.append(&section_heading("Advanced"));
        root.append(&debug_row);
        root.append(&status);

        let view = Rc::new(Self {
            root,
            accounts,
            status,
            debug_switch,
            login_buttons: RefCell::new(Vec::new()),
            settings,
            events: Rc::downgrade(events),
        });

        {
            let weak = Rc::downgrade(&view);
            view.debug_switch.connect_active_notify(move |switch| {
                if let Some(view) = weak.upgrade() {
                    view.apply_debug(switch.is_active());
                }
            });
        }
        {
            let weak = Rc::downgrade(&view);
            add_button.connect_clicked(move |_| {
                let Some(view) = weak.upgrade() else {
                    return;
                };
                let account = Account {
                    id: id_entry.text().trim().to_string(),
                    token: token_entry.text().trim().to_string(),
                    auto_login: auto_login_check.is_active(),
                };
                if view.save_account(account) {
                    id_entry.set_text("");
                    token_entry.set_text("");
                    auto_login_check.set_active(false);
                }
            });
        }

        view.connect_events(events);
        view.refresh();
        view
    }

    pub fn widget(&self) -> &gtk4::Box {
        &self.root
    }

    fn connect_events(self: &Rc<Self>, events: &EventBus) {
        let weak = Rc::downgrade(self);
        events.on_ready(move || {
            if let Some(view) = weak.upgrade() {
                view.refresh();
            }
        });

        let weak = Rc::downgrade(self);
        events.on_new_client(move |_| {
            if let Some(view) = weak.upgrade() {
                view.set_logins_enabled(false);
                view.status.set_text("Connecting…");
            }
        });

        let weak = Rc::downgrade(self);
        events.on_login_finished(move |account_id, success| {
            if let Some(view) = weak.upgrade() {
                view.set_logins_enabled(true);
                let message = if success {
                    format!("Logged in as {account_id}.")
                } else {
                    format!("Could not log in as {account_id}. Check the token and try again.")
                };
                view.status.set_text(&message);
            }
        });
    }

    /// Rebuilds the account list and switch state from the current config.
    pub fn refresh(self: &Rc<Self>) {
        while let Some(child) = self.accounts.first_child() {
            self.accounts.remove(&child);
        }
        self.login_buttons.borrow_mut().clear();

        for account in self.settings.accounts() {
            let row = self.account_row(&account);
            self.accounts.append(&row);
        }

        if self.debug_switch.is_active() != self.settings.debug() {
            self.debug_switch.set_active(self.settings.debug());
        }
    }

    fn account_row(self: &Rc<Self>, account: &Account) -> gtk4::Box {
        let row = gtk4::Box::new(Orientation::Horizontal, 8);
        row.set_margin_top(6);
        row.set_margin_bottom(6);
        row.set_margin_start(8);
        row.set_margin_end(8);

        let name = Label::new(Some(account.id.as_str()));
        name.set_hexpand(true);
        name.set_halign(Align::Start);
        row.append(&name);

        if account.auto_login {
            let badge = Label::new(Some("auto"));
            badge.add_css_class("badge");
            row.append(&badge);
        }

        let login_button = Button::with_label("Log in");
        {
            let events = self.events.clone();
            let account_id = account.id.clone();
            login_button.connect_clicked(move |_| {
                emit(&events, AppEvent::LoginRequested(account_id.clone()))
            });
        }
        self.login_buttons.borrow_mut().push(login_button.clone());

        let remove_button = Button::from_icon_name("user-trash-symbolic");
        remove_button.set_tooltip_text(Some("Forget account"));
        remove_button.add_css_class("flat");
        {
            let weak = Rc::downgrade(self);
            let account_id = account.id.clone();
            remove_button.connect_clicked(move |_| {
                if let Some(view) = weak.upgrade() {
                    view.remove_account(&account_id);
                }
            });
        }

        row.append(&login_button);
        row.append(&remove_button);
        row
    }

    fn set_logins_enabled(&self, enabled: bool) {
        for button in self.login_buttons.borrow().iter() {
            button.set_sensitive(enabled);
        }
    }

    fn apply_debug(&self, debug: bool) {
        if self.settings.debug() == debug {
            return;
        }
        if let Err(err) = self.settings.set_debug(debug) {
            tracing::warn!(?err, "failed to persist debug preference");
            self.status.set_text("Could not save settings.");
        }
    }

    fn save_account(self: &Rc<Self>, account: Account) -> bool {
        if account.id.is_empty() || account.token.is_empty() {
            self.status.set_text("Both an account name and a token are required.");
            return false;
        }

        let id = account.id.clone();
        let auto_login = account.auto_login;
        let result = self.settings.update(move |config| {
            config.upsert_account(account);
            if auto_login {
                config.set_auto_login(&id)?;
            }
            Ok(())
        });

        match result {
            Ok(()) => {
                self.refresh();
                self.status.set_text("Account saved.");
                true
            }
            Err(err) => {
                tracing::warn!(?err, "failed to save account");
                self.status.set_text("Could not save account.");
                false
            }
        }
    }

    fn remove_account(self: &Rc<Self>, id: &str) {
        let result = self.settings.update(|config| {
            config.remove_account(id);
            Ok(())
        });
        match result {
            Ok(()) => self.refresh(),
            Err(err) => {
                tracing::warn!(?err, account = id, "failed to remove account");
                self.status.set_text("Could not remove account.");
            }
        }
    }
}

/// Stack holding the two primary pages.
pub fn view_stack(main: &MainView, settings: &SettingsView, tokens: StyleTokens) -> Stack {
    let stack = Stack::new();
    stack.set_transition_type(StackTransitionType::Crossfade);
    stack.set_transition_duration(tokens.stack_transition_ms);
    stack.add_named(main.widget(), Some(ViewId::Main.as_str()));
    stack.add_named(settings.widget(), Some(ViewId::Settings.as_str()));
    stack.set_visible_child_name(ViewId::Main.as_str());
    stack
}

fn emit(events: &Weak<EventBus>, event: AppEvent) {
    if let Some(events) = events.upgrade() {
        events.emit(event);
    }
}
