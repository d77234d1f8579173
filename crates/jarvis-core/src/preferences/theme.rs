//! Light/dark theme state.

use jarvis_types::theme::Theme;

/// Current theme and whether the user chose it explicitly.
///
/// While no explicit choice exists the theme follows the system preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ThemeState {
    current: Theme,
    explicit: bool,
}

impl ThemeState {
    /// Stored choice wins over the system preference, which wins over light.
    pub fn new(stored: Option<Theme>, system: Option<Theme>) -> Self {
        match (stored, system) {
            (Some(theme), _) => Self {
                current: theme,
                explicit: true,
            },
            (None, Some(theme)) => Self {
                current: theme,
                explicit: false,
            },
            (None, None) => Self::default(),
        }
    }

    pub fn current(&self) -> Theme {
        self.current
    }

    pub fn is_explicit(&self) -> bool {
        self.explicit
    }

    pub fn set(&mut self, theme: Theme) {
        self.current = theme;
        self.explicit = true;
    }

    pub fn toggle(&mut self) -> Theme {
        self.set(self.current.toggled());
        self.current
    }

    /// Follow an OS theme change unless the user picked a theme.
    pub fn system_preference_changed(&mut self, system: Theme) -> bool {
        if self.explicit || self.current == system {
            return false;
        }
        self.current = system;
        true
    }
}
