use iced::Color;
use serde::{Deserialize, Deserializer};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

const EMBEDDED_STYLES: &[(&str, &str)] = &[("style", include_str!("../assets/style.toml"))];

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StyleSheet {
    #[serde(default)]
    pub window: WindowStyle,
    #[serde(default)]
    pub outer_box: BoxStyle,
    #[serde(default = "default_inner_box")]
    pub inner_box: BoxStyle,
    #[serde(default)]
    pub button: ButtonStyle,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WindowStyle {
    #[serde(default = "default_transparent", deserialize_with = "hex_color")]
    pub background: Color,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BoxStyle {
    #[serde(default = "default_transparent", deserialize_with = "hex_color")]
    pub background: Color,
    #[serde(default)]
    pub border_radius: f32,
    #[serde(default)]
    pub padding: u16,
    #[serde(default)]
    pub spacing: u16,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ButtonStyle {
    #[serde(default = "default_transparent", deserialize_with = "hex_color")]
    pub background: Color,
    #[serde(default = "default_hover_background", deserialize_with = "hex_color")]
    pub hover_background: Color,
    #[serde(default = "default_pressed_background", deserialize_with = "hex_color")]
    pub pressed_background: Color,
    #[serde(default = "default_text_color", deserialize_with = "hex_color")]
    pub text_color: Color,
    #[serde(default = "default_button_radius")]
    pub border_radius: f32,
    #[serde(default = "default_button_padding")]
    pub padding: u16,
    #[serde(default = "default_font_size")]
    pub font_size: u16,
    #[serde(default = "default_label_spacing")]
    pub label_spacing: u16,
}

fn default_transparent() -> Color {
    Color::TRANSPARENT
}

fn default_hover_background() -> Color {
    Color::from_rgba8(0x4c, 0x78, 0x99, 0.8)
}

fn default_pressed_background() -> Color {
    Color::from_rgb8(0x28, 0x55, 0x77)
}

fn default_text_color() -> Color {
    Color::from_rgb8(0xee, 0xee, 0xee)
}

fn default_button_radius() -> f32 {
    6.0
}

fn default_button_padding() -> u16 {
    10
}

fn default_font_size() -> u16 {
    14
}

fn default_label_spacing() -> u16 {
    6
}

fn default_inner_box() -> BoxStyle {
    BoxStyle {
        background: Color::from_rgba8(0x22, 0x22, 0x22, 0.9),
        border_radius: 10.0,
        padding: 8,
        spacing: 4,
    }
}

impl Default for WindowStyle {
    fn default() -> Self {
        Self { background: default_transparent() }
    }
}

impl Default for BoxStyle {
    fn default() -> Self {
        Self { background: default_transparent(), border_radius: 0.0, padding: 0, spacing: 0 }
    }
}

impl Default for ButtonStyle {
    fn default() -> Self {
        Self {
            background: default_transparent(),
            hover_background: default_hover_background(),
            pressed_background: default_pressed_background(),
            text_color: default_text_color(),
            border_radius: default_button_radius(),
            padding: default_button_padding(),
            font_size: default_font_size(),
            label_spacing: default_label_spacing(),
        }
    }
}

impl Default for StyleSheet {
    fn default() -> Self {
        Self {
            window: WindowStyle::default(),
            outer_box: BoxStyle::default(),
            inner_box: default_inner_box(),
            button: ButtonStyle::default(),
        }
    }
}

/// Parse `#rgb`, `#rrggbb` or `#rrggbbaa`.
pub fn parse_hex_color(s: &str) -> Option<Color> {
    let hex = s.trim().strip_prefix('#')?;
    let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();

    match hex.len() {
        3 => {
            let short = |i: usize| u8::from_str_radix(hex.get(i..i + 1)?, 16).ok().map(|v| v * 17);
            Some(Color::from_rgb8(short(0)?, short(1)?, short(2)?))
        }
        6 => Some(Color::from_rgb8(channel(0)?, channel(2)?, channel(4)?)),
        8 => Some(Color::from_rgba8(
            channel(0)?,
            channel(2)?,
            channel(4)?,
            channel(6)? as f32 / 255.0,
        )),
        _ => None,
    }
}

fn hex_color<'de, D>(deserializer: D) -> Result<Color, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_hex_color(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid color '{}'", raw)))
}

/// Where the style sheet comes from (`--style`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StyleSource {
    Embedded(String),
    File(PathBuf),
    None,
}

impl StyleSource {
    pub fn parse(style: &str) -> Self {
        if let Some(name) = style.strip_prefix("embed:") {
            StyleSource::Embedded(name.to_string())
        } else if style.is_empty() {
            StyleSource::None
        } else {
            StyleSource::File(PathBuf::from(style))
        }
    }
}

pub fn user_style_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("wlogoutbar").join("style.toml"))
}

pub fn parse_style(contents: &str) -> Result<StyleSheet, toml::de::Error> {
    toml::from_str::<StyleSheet>(contents)
}

fn load_style_file(path: &Path) -> anyhow::Result<StyleSheet> {
    let contents = fs::read_to_string(path)?;
    Ok(parse_style(&contents)?)
}

/// Resolve the style sheet. Never fails: problems are logged and the
/// built-in defaults are used.
pub fn load_style(source: &StyleSource) -> StyleSheet {
    load_style_with_user_file(source, user_style_path().as_deref())
}

pub fn load_style_with_user_file(source: &StyleSource, user_file: Option<&Path>) -> StyleSheet {
    match source {
        StyleSource::Embedded(name) => {
            if let Some(user_file) = user_file {
                info!("Trying to load user style file at {}", user_file.display());
                if user_file.exists() {
                    match load_style_file(user_file) {
                        Ok(sheet) => {
                            info!("Loaded user style file");
                            return sheet;
                        }
                        Err(e) => warn!("Failed to load user style file: {}", e),
                    }
                } else {
                    info!("User style file does not exist, falling back to builtin style");
                }
            }

            let Some((_, contents)) = EMBEDDED_STYLES.iter().find(|(n, _)| *n == name.as_str())
            else {
                error!("embed:{} style not found. Using default styling.", name);
                return StyleSheet::default();
            };
            parse_style(contents).unwrap_or_else(|e| {
                error!("embed:{} style is erroneous: {}. Using default styling.", name, e);
                StyleSheet::default()
            })
        }
        StyleSource::File(path) => load_style_file(path).unwrap_or_else(|e| {
            error!("{} style file not found or erroneous. Using default styling.", path.display());
            error!("{}", e);
            StyleSheet::default()
        }),
        StyleSource::None => StyleSheet::default(),
    }
}
