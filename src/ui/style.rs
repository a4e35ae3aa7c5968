/// Compile-time layout tokens shared by the widget builders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleTokens {
    pub spacing_4: i32,
    pub spacing_8: i32,
    pub spacing_12: i32,
    pub spacing_16: i32,
    pub control_size: i32,
    pub sidebar_width: i32,
    pub window_default_width: i32,
    pub window_default_height: i32,
    pub window_min_width: i32,
    pub window_min_height: i32,
    pub status_dialog_width: i32,
    pub stack_transition_ms: u32,
}

pub const LAYOUT_TOKENS: StyleTokens = StyleTokens {
    spacing_4: 4,
    spacing_8: 8,
    spacing_12: 12,
    spacing_16: 16,
    control_size: 32,
    sidebar_width: 240,
    window_default_width: 1200,
    window_default_height: 600,
    window_min_width: 1000,
    window_min_height: 500,
    status_dialog_width: 420,
    stack_transition_ms: 150,
};

#[cfg(test)]
mod tests {
    use super::LAYOUT_TOKENS;

    #[test]
    fn window_geometry_matches_root_window_dimensions() {
        let tokens = LAYOUT_TOKENS;
        assert_eq!(tokens.window_min_width, 1000);
        assert_eq!(tokens.window_min_height, 500);
        assert_eq!(tokens.window_default_width, 1200);
        assert_eq!(tokens.window_default_height, 600);
    }

    #[test]
    fn default_size_is_never_below_minimum() {
        let tokens = LAYOUT_TOKENS;
        assert!(tokens.window_default_width >= tokens.window_min_width);
        assert!(tokens.window_default_height >= tokens.window_min_height);
        assert!(tokens.sidebar_width < tokens.window_min_width);
    }
}
