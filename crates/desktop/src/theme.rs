use iced::theme::Palette;
use iced::{Color, Theme};

use crate::settings::Appearance;

/// Colors for typing feedback on the practice screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeedbackColors {
    /// Progress, glosses, hints and placeholders.
    pub muted: Color,
    /// Wrong letter or word.
    pub wrong: Color,
    /// Completed sentence.
    pub correct: Color,
}

impl FeedbackColors {
    pub fn from_theme(theme: &Theme) -> Self {
        let palette = theme.extended_palette();
        Self {
            muted: Color {
                a: 0.65,
                ..palette.background.base.text
            },
            wrong: palette.danger.base.color,
            correct: palette.success.base.color,
        }
    }
}

/// Built-in light or dark theme; high contrast forces pure black and white
/// behind the text while keeping the feedback hues.
pub fn resolve_theme(appearance: Appearance, high_contrast: bool) -> Theme {
    let dark = match appearance {
        Appearance::Dark => true,
        Appearance::Light => false,
        Appearance::System => system_prefers_dark(),
    };
    let base = if dark { Theme::Dark } else { Theme::Light };
    if !high_contrast {
        return base;
    }
    Theme::custom("Dictation High Contrast", sharpen(base.palette(), dark))
}

fn sharpen(palette: Palette, dark: bool) -> Palette {
    let (background, text) = if dark {
        (Color::BLACK, Color::WHITE)
    } else {
        (Color::WHITE, Color::BLACK)
    };
    Palette {
        background,
        text,
        ..palette
    }
}

#[cfg(target_os = "macos")]
fn system_prefers_dark() -> bool {
    std::process::Command::new("defaults")
        .args(["read", "-g", "AppleInterfaceStyle"])
        .output()
        .is_ok_and(|o| String::from_utf8_lossy(&o.stdout).trim() == "Dark")
}

#[cfg(not(target_os = "macos"))]
fn system_prefers_dark() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_modes_use_builtin_themes() {
        assert_eq!(resolve_theme(Appearance::Dark, false), Theme::Dark);
        assert_eq!(resolve_theme(Appearance::Light, false), Theme::Light);
    }

    #[test]
    fn test_high_contrast_keeps_feedback_hues() {
        let theme = resolve_theme(Appearance::Light, true);
        let palette = theme.palette();
        assert_eq!(palette.background, Color::WHITE);
        assert_eq!(palette.text, Color::BLACK);
        assert_eq!(palette.danger, Theme::Light.palette().danger);
    }

    #[test]
    fn test_feedback_muted_is_translucent_text() {
        let colors = FeedbackColors::from_theme(&Theme::Dark);
        assert!(colors.muted.a < 1.0);
        assert_ne!(colors.wrong, colors.correct);
    }
}
