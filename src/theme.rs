//! Dashboard colors, overridable from the `[theme]` table of the config

use ratatui::style::Color;

use crate::config::ThemeConfig;

/// Theme colors for the UI
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub accent: Color,    // Active borders, key hints
    pub danger: Color,    // Fetch errors
    pub success: Color,   // Loaded indicator
    pub warning: Color,   // Status line
    pub text: Color,      // Primary text
    pub text_dim: Color,  // Secondary text, empty states
    pub inactive: Color,  // Inactive borders
    pub bar: Color,       // Chart bars
}

impl Default for Theme {
    fn default() -> Self {
        // Catppuccin-inspired
        Self {
            accent: Color::Rgb(250, 179, 135),
            danger: Color::Rgb(243, 139, 168),
            success: Color::Rgb(166, 218, 149),
            warning: Color::Rgb(250, 179, 135),
            text: Color::Rgb(205, 214, 244),
            text_dim: Color::Rgb(147, 153, 178),
            inactive: Color::Rgb(88, 91, 112),
            bar: Color::Rgb(137, 180, 250),
        }
    }
}

impl Theme {
    /// Apply config overrides on top of the defaults
    pub fn from_config(config: &ThemeConfig) -> Self {
        let base = Self::default();
        let pick = |value: &Option<String>, fallback: Color| {
            match value.as_deref() {
                Some(hex) => Self::parse_hex_color(hex).unwrap_or_else(|| {
                    tracing::warn!("Ignoring invalid theme color: {}", hex);
                    fallback
                }),
                None => fallback,
            }
        };

        Self {
            accent: pick(&config.accent, base.accent),
            danger: pick(&config.danger, base.danger),
            success: pick(&config.success, base.success),
            warning: pick(&config.warning, base.warning),
            text: pick(&config.text, base.text),
            text_dim: pick(&config.text_dim, base.text_dim),
            inactive: pick(&config.inactive, base.inactive),
            bar: pick(&config.bar, base.bar),
        }
    }

    /// Parse a hex color string (#RRGGBB or #RGB)
    fn parse_hex_color(s: &str) -> Option<Color> {
        let s = s.trim().trim_start_matches('#');
        if !s.is_ascii() {
            return None;
        }

        if s.len() == 6 {
            let r = u8::from_str_radix(&s[0..2], 16).ok()?;
            let g = u8::from_str_radix(&s[2..4], 16).ok()?;
            let b = u8::from_str_radix(&s[4..6], 16).ok()?;
            Some(Color::Rgb(r, g, b))
        } else if s.len() == 3 {
            let r = u8::from_str_radix(&s[0..1], 16).ok()? * 17;
            let g = u8::from_str_radix(&s[1..2], 16).ok()? * 17;
            let b = u8::from_str_radix(&s[2..3], 16).ok()? * 17;
            Some(Color::Rgb(r, g, b))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(Theme::parse_hex_color("#FFC107"), Some(Color::Rgb(255, 193, 7)));
        assert_eq!(Theme::parse_hex_color("fff"), Some(Color::Rgb(255, 255, 255)));
        assert_eq!(Theme::parse_hex_color("#12345"), None);
        assert_eq!(Theme::parse_hex_color("#gggggg"), None);
    }

    #[test]
    fn test_overrides_and_fallbacks() {
        let config = ThemeConfig {
            accent: Some("#000".to_string()),
            danger: Some("not-a-color".to_string()),
            ..ThemeConfig::default()
        };
        let theme = Theme::from_config(&config);

        assert_eq!(theme.accent, Color::Rgb(0, 0, 0));
        assert_eq!(theme.danger, Theme::default().danger);
        assert_eq!(theme.bar, Theme::default().bar);
    }
}
