use std::rc::Rc;

use gtk4::prelude::*;
use gtk4::{Button, EmojiChooser, Entry, Label, Orientation, Popover};

use super::style::StyleTokens;

/// Emoji chooser popover that inserts the picked emoji at the entry cursor.
#[derive(Clone)]
pub struct EmojiPicker {
    chooser: EmojiChooser,
}

impl EmojiPicker {
    pub fn attach(anchor: &Button, target: &Entry) -> Self {
        let chooser = EmojiChooser::new();
        chooser.set_parent(anchor);

        let target = target.clone();
        chooser.connect_emoji_picked(move |_, emoji| {
            let mut position = target.position();
            target.insert_text(emoji, &mut position);
            target.set_position(position);
            target.grab_focus();
        });

        let picker = Self { chooser };
        let popup = picker.clone();
        anchor.connect_clicked(move |_| popup.show());
        picker
    }

    pub fn show(&self) {
        self.chooser.popup();
    }
}

type StatusCallback = Rc<dyn Fn(Option<String>)>;

/// Popover for editing the custom status line.
#[derive(Clone)]
pub struct CustomStatusDialog {
    popover: Popover,
    entry: Entry,
}

impl CustomStatusDialog {
    pub fn attach<F>(anchor: &Button, tokens: StyleTokens, on_change: F) -> Self
    where
        F: Fn(Option<String>) + 'static,
    {
        let on_change: StatusCallback = Rc::new(on_change);

        let content = gtk4::Box::new(Orientation::Vertical, tokens.spacing_8);
        content.set_margin_top(tokens.spacing_12);
        content.set_margin_bottom(tokens.spacing_12);
        content.set_margin_start(tokens.spacing_12);
        content.set_margin_end(tokens.spacing_12);
        content.set_size_request(tokens.status_dialog_width, -1);

        let heading = Label::new(Some("Set a custom status"));
        heading.add_css_class("section-heading");
        let entry = Entry::new();
        entry.set_placeholder_text(Some("What's happening?"));

        let actions = gtk4::Box::new(Orientation::Horizontal, tokens.spacing_8);
        actions.set_halign(gtk4::Align::End);
        let clear_button = Button::with_label("Clear");
        let save_button = Button::with_label("Save");
        save_button.add_css_class("suggested-action");
        actions.append(&clear_button);
        actions.append(&save_button);

        content.append(&heading);
        content.append(&entry);
        content.append(&actions);

        let popover = Popover::new();
        popover.set_child(Some(&content));
        popover.set_parent(anchor);

        let dialog = Self { popover, entry };

        {
            let dialog = dialog.clone();
            let on_change = on_change.clone();
            save_button.connect_clicked(move |_| {
                on_change(dialog.current_text());
                dialog.popover.popdown();
            });
        }
        {
            let entry = dialog.entry.clone();
            let dialog = dialog.clone();
            let on_change = on_change.clone();
            entry.connect_activate(move |_| {
                on_change(dialog.current_text());
                dialog.popover.popdown();
            });
        }
        {
            let dialog = dialog.clone();
            clear_button.connect_clicked(move |_| {
                dialog.entry.set_text("");
                on_change(None);
                dialog.popover.popdown();
            });
        }
        {
            let dialog = dialog.clone();
            anchor.connect_clicked(move |_| dialog.popover.popup());
        }

        dialog
    }

    fn current_text(&self) -> Option<String> {
        normalize_status(self.entry.text().as_str())
    }
}

fn normalize_status(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::normalize_status;

    #[test]
    fn blank_status_clears() {
        assert_eq!(normalize_status("   "), None);
        assert_eq!(normalize_status(" afk "), Some("afk".to_string()));
    }
}
