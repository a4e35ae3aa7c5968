use gtk4::prelude::*;
use gtk4::{Align, Button, Label, Orientation};

use super::style::StyleTokens;

pub fn icon_button(icon_name: &str, tooltip: &str, tokens: StyleTokens) -> Button {
    let button = Button::from_icon_name(icon_name);
    button.set_focus_on_click(false);
    button.set_tooltip_text(Some(tooltip));
    button.add_css_class("flat");
    button.add_css_class("icon-button");
    button.set_size_request(tokens.control_size, tokens.control_size);
    button
}

pub fn section_heading(text: &str) -> Label {
    let label = Label::new(Some(text));
    label.set_halign(Align::Start);
    label.add_css_class("section-heading");
    label
}

/// Horizontal box with the shared spacing and margins.
pub fn toolbar_row(tokens: StyleTokens) -> gtk4::Box {
    let row = gtk4::Box::new(Orientation::Horizontal, tokens.spacing_8);
    row.set_margin_top(tokens.spacing_8);
    row.set_margin_bottom(tokens.spacing_8);
    row.set_margin_start(tokens.spacing_12);
    row.set_margin_end(tokens.spacing_12);
    row
}
