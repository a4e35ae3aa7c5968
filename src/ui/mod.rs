pub mod popovers;
pub mod style;
pub mod toolkit;
pub mod views;
pub mod widgets;

pub use style::{StyleTokens, LAYOUT_TOKENS};
pub use toolkit::{GtkToolkit, GtkWindow};
