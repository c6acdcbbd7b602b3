/// Key the selected theme is stored under in the preference store
pub const THEME_KEY: &str = "theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

/// A 24-bit colour, kept free of any terminal crate so other front ends can use it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

/// The fixed set of visual properties a theme sets.
///
/// Dark mode shows the sun icon (the action that switches to light), light
/// mode shows the moon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemePalette {
    pub sun_visible: bool,
    pub moon_visible: bool,
    pub background: Rgb,
    pub surface: Rgb,
    pub foreground: Rgb,
    pub muted: Rgb,
    pub accent: Rgb,
    pub user: Rgb,
    pub assistant: Rgb,
    pub code_background: Rgb,
    pub code_foreground: Rgb,
    pub error: Rgb,
}

const DARK: ThemePalette = ThemePalette {
    sun_visible: true,
    moon_visible: false,
    background: Rgb(0x12, 0x12, 0x14),
    surface: Rgb(0x1e, 0x1f, 0x24),
    foreground: Rgb(0xe6, 0xe6, 0xe6),
    muted: Rgb(0x7a, 0x7d, 0x85),
    accent: Rgb(0xaf, 0x87, 0xff),
    user: Rgb(0x00, 0xd7, 0xff),
    assistant: Rgb(0x87, 0xff, 0x00),
    code_background: Rgb(0x0b, 0x0c, 0x0f),
    code_foreground: Rgb(0xff, 0xff, 0x87),
    error: Rgb(0xff, 0x00, 0x00),
};

const LIGHT: ThemePalette = ThemePalette {
    sun_visible: false,
    moon_visible: true,
    background: Rgb(0xfa, 0xfa, 0xfa),
    surface: Rgb(0xec, 0xee, 0xf2),
    foreground: Rgb(0x1c, 0x1c, 0x1e),
    muted: Rgb(0x80, 0x84, 0x8c),
    accent: Rgb(0x6c, 0x3f, 0xd1),
    user: Rgb(0x00, 0x5f, 0xaf),
    assistant: Rgb(0x00, 0x87, 0x00),
    code_background: Rgb(0xe4, 0xe6, 0xeb),
    code_foreground: Rgb(0x5f, 0x3d, 0x00),
    error: Rgb(0xc0, 0x00, 0x00),
};

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "dark" => Some(Theme::Dark),
            "light" => Some(Theme::Light),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    pub fn palette(&self) -> &'static ThemePalette {
        match self {
            Theme::Dark => &DARK,
            Theme::Light => &LIGHT,
        }
    }

    /// Icon for the toggle button
    pub fn icon(&self) -> &'static str {
        if self.palette().sun_visible {
            "☀"
        } else {
            "☾"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_twice_is_identity() {
        for theme in [Theme::Dark, Theme::Light] {
            assert_eq!(theme.toggled().toggled(), theme);
            assert_eq!(theme.toggled().toggled().palette(), theme.palette());
        }
    }

    #[test]
    fn test_exactly_one_icon_visible() {
        for theme in [Theme::Dark, Theme::Light] {
            let p = theme.palette();
            assert!(p.sun_visible ^ p.moon_visible);
        }
        assert_eq!(Theme::Dark.icon(), "☀");
        assert_eq!(Theme::Light.icon(), "☾");
    }

    #[test]
    fn test_from_str() {
        assert_eq!(Theme::from_str("Light"), Some(Theme::Light));
        assert_eq!(Theme::from_str("dark\n"), Some(Theme::Dark));
        assert_eq!(Theme::from_str("sepia"), None);
        assert_eq!(Theme::default(), Theme::Dark);
    }
}
