//! Brain color palette and semantic roles.

use ratatui::style::Color;

pub const BLUE_RGB: (u8, u8, u8) = (20, 86, 240);
pub const RED_RGB: (u8, u8, u8) = (242, 63, 93);
pub const ORANGE_RGB: (u8, u8, u8) = (255, 99, 58);
pub const MAGENTA_RGB: (u8, u8, u8) = (228, 23, 127);
pub const INK_RGB: (u8, u8, u8) = (24, 30, 37);
pub const BLACK_RGB: (u8, u8, u8) = (10, 13, 13);
pub const SLATE_RGB: (u8, u8, u8) = (53, 60, 67);
pub const SILVER_RGB: (u8, u8, u8) = (201, 205, 212);
pub const SNOW_RGB: (u8, u8, u8) = (247, 248, 250);
pub const GREEN_RGB: (u8, u8, u8) = (74, 222, 128);

pub const BLUE: Color = Color::Rgb(BLUE_RGB.0, BLUE_RGB.1, BLUE_RGB.2);
pub const RED: Color = Color::Rgb(RED_RGB.0, RED_RGB.1, RED_RGB.2);
pub const ORANGE: Color = Color::Rgb(ORANGE_RGB.0, ORANGE_RGB.1, ORANGE_RGB.2);
pub const MAGENTA: Color = Color::Rgb(MAGENTA_RGB.0, MAGENTA_RGB.1, MAGENTA_RGB.2);
pub const INK: Color = Color::Rgb(INK_RGB.0, INK_RGB.1, INK_RGB.2);
pub const BLACK: Color = Color::Rgb(BLACK_RGB.0, BLACK_RGB.1, BLACK_RGB.2);
pub const SLATE: Color = Color::Rgb(SLATE_RGB.0, SLATE_RGB.1, SLATE_RGB.2);
pub const SILVER: Color = Color::Rgb(SILVER_RGB.0, SILVER_RGB.1, SILVER_RGB.2);
pub const SNOW: Color = Color::Rgb(SNOW_RGB.0, SNOW_RGB.1, SNOW_RGB.2);
pub const GREEN: Color = Color::Rgb(GREEN_RGB.0, GREEN_RGB.1, GREEN_RGB.2);

pub const TEXT_PRIMARY: Color = SNOW;
pub const TEXT_MUTED: Color = SILVER;
pub const TEXT_DIM: Color = SLATE;

pub const STATUS_WARNING: Color = ORANGE;
pub const STATUS_ERROR: Color = RED;
pub const STATUS_INFO: Color = BLUE;

pub const COMPOSER_BG: Color = INK;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UiTheme {
    pub name: &'static str,
    pub composer_bg: Color,
    pub header_bg: Color,
    pub accent: Color,
}

pub fn ui_theme(name: &str) -> UiTheme {
    match name.to_ascii_lowercase().as_str() {
        "dark" => UiTheme {
            name: "dark",
            composer_bg: BLACK,
            header_bg: BLACK,
            accent: MAGENTA,
        },
        "light" => UiTheme {
            name: "light",
            composer_bg: SLATE,
            header_bg: SLATE,
            accent: BLUE,
        },
        _ => UiTheme {
            name: "default",
            composer_bg: COMPOSER_BG,
            header_bg: BLACK,
            accent: BLUE,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_theme_falls_back_to_default() {
        assert_eq!(ui_theme("solarized").name, "default");
        assert_eq!(ui_theme("DARK").name, "dark");
    }
}
