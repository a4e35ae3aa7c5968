use std::fmt;

/// Top-level panes selectable in the root window's view stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewId {
    Main,
    Settings,
    /// Direct-messages section of the main chat view.
    Dm,
}

impl ViewId {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Main => "main",
            Self::Settings => "settings",
            Self::Dm => "dm",
        }
    }

    /// The stack page that hosts this view.
    pub const fn stack_page(self) -> ViewId {
        match self {
            Self::Main | Self::Dm => Self::Main,
            Self::Settings => Self::Settings,
        }
    }

    pub const fn is_chat(self) -> bool {
        matches!(self.stack_page(), Self::Main)
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
