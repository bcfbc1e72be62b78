//! Where the bar sits on screen and how big its surface is.

use iced_layershell::reexport::{Anchor, KeyboardInteractivity, Layer};
use iced_layershell::settings::{LayerShellSettings, StartMode};

use crate::style::StyleSheet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Position {
    Bottom,
    Top,
    #[default]
    Left,
    Right,
    Center,
}

impl Position {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "bottom" => Some(Position::Bottom),
            "top" => Some(Position::Top),
            "left" => Some(Position::Left),
            "right" => Some(Position::Right),
            "center" => Some(Position::Center),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    Start,
    End,
    #[default]
    Middle,
}

impl Alignment {
    pub fn from_name(name: &str) -> Self {
        match name {
            "start" => Alignment::Start,
            "end" => Alignment::End,
            _ => Alignment::Middle,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Margins {
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
    pub left: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Placement {
    pub position: Position,
    pub full: bool,
    pub alignment: Alignment,
    pub margins: Margins,
    pub exclusive_zone: bool,
}

impl Placement {
    /// Direction the buttons are laid out in.
    pub fn orientation(&self) -> Orientation {
        match self.position {
            Position::Left | Position::Right => Orientation::Vertical,
            Position::Top | Position::Bottom | Position::Center => Orientation::Horizontal,
        }
    }

    pub fn anchor(&self) -> Anchor {
        let full = if self.full { Anchor::all() } else { Anchor::empty() };
        match self.position {
            Position::Bottom => Anchor::Bottom | (full & (Anchor::Left | Anchor::Right)),
            Position::Top => Anchor::Top | (full & (Anchor::Left | Anchor::Right)),
            Position::Left => Anchor::Left | (full & (Anchor::Top | Anchor::Bottom)),
            Position::Right => Anchor::Right | (full & (Anchor::Top | Anchor::Bottom)),
            Position::Center => full,
        }
    }

    pub fn layer(&self) -> (Layer, i32) {
        if self.exclusive_zone {
            (Layer::Top, 0)
        } else {
            (Layer::Overlay, -1)
        }
    }

    /// Surface size for `buttons` buttons. An axis anchored on both sides is
    /// left at 0 so the compositor stretches it.
    pub fn surface_size(&self, buttons: usize, icon_size: u32, style: &StyleSheet) -> (u32, u32) {
        let (cell_w, cell_h) = button_extent(icon_size, style);
        let count = buttons.max(1) as u32;
        let inner_pad = 2 * style.inner_box.padding as u32;
        let outer_pad = 2 * style.outer_box.padding as u32;
        let gaps = style.inner_box.spacing as u32 * (count - 1);

        let (mut width, mut height) = match self.orientation() {
            Orientation::Horizontal => (cell_w * count + gaps, cell_h),
            Orientation::Vertical => (cell_w, cell_h * count + gaps),
        };
        width += inner_pad + outer_pad;
        height += inner_pad + outer_pad;

        let anchor = self.anchor();
        if anchor.contains(Anchor::Left | Anchor::Right) {
            width = 0;
        }
        if anchor.contains(Anchor::Top | Anchor::Bottom) {
            height = 0;
        }
        (width, height)
    }

    pub fn layer_settings(
        &self,
        buttons: usize,
        icon_size: u32,
        style: &StyleSheet,
        output: Option<String>,
    ) -> LayerShellSettings {
        let (layer, exclusive_zone) = self.layer();
        let Margins { top, right, bottom, left } = self.margins;

        LayerShellSettings {
            size: Some(self.surface_size(buttons, icon_size, style)),
            anchor: self.anchor(),
            layer,
            exclusive_zone,
            keyboard_interactivity: KeyboardInteractivity::Exclusive,
            margin: (top, right, bottom, left),
            start_mode: output.map_or(StartMode::Active, StartMode::TargetScreen),
            ..Default::default()
        }
    }
}

/// Space one button takes: icon, label line and padding. Wide enough for
/// the usual labels so buttons stay the same size.
pub fn button_extent(icon_size: u32, style: &StyleSheet) -> (u32, u32) {
    let pad = 2 * style.button.padding as u32;
    let font = style.button.font_size as u32;
    let label_height = font * 3 / 2;
    let label_width = font * 7;

    let width = icon_size.max(label_width) + pad;
    let height = icon_size + style.button.label_spacing as u32 + label_height + pad;
    (width, height)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn placement(position: Position, full: bool) -> Placement {
        Placement { position, full, ..Default::default() }
    }

    #[test]
    fn test_parse() {
        assert_eq!(Position::from_name("top"), Some(Position::Top));
        assert_eq!(Position::from_name("middle"), None);
        assert_eq!(Alignment::from_name("end"), Alignment::End);
        assert_eq!(Alignment::from_name("whatever"), Alignment::Middle);
    }

    #[test]
    fn test_orientation() {
        assert_eq!(placement(Position::Left, false).orientation(), Orientation::Vertical);
        assert_eq!(placement(Position::Right, true).orientation(), Orientation::Vertical);
        assert_eq!(placement(Position::Top, false).orientation(), Orientation::Horizontal);
        assert_eq!(placement(Position::Center, false).orientation(), Orientation::Horizontal);
    }

    #[test]
    fn test_anchors() {
        assert_eq!(placement(Position::Bottom, false).anchor(), Anchor::Bottom);
        assert_eq!(
            placement(Position::Bottom, true).anchor(),
            Anchor::Bottom | Anchor::Left | Anchor::Right
        );
        assert_eq!(placement(Position::Left, false).anchor(), Anchor::Left);
        assert_eq!(
            placement(Position::Right, true).anchor(),
            Anchor::Right | Anchor::Top | Anchor::Bottom
        );
        assert_eq!(placement(Position::Center, false).anchor(), Anchor::empty());
        assert_eq!(placement(Position::Center, true).anchor(), Anchor::all());
    }

    #[test]
    fn test_layer() {
        assert_eq!(placement(Position::Left, false).layer(), (Layer::Overlay, -1));
        let exclusive = Placement { exclusive_zone: true, ..Default::default() };
        assert_eq!(exclusive.layer(), (Layer::Top, 0));
    }

    #[test]
    fn test_surface_size_follows_orientation() {
        let style = StyleSheet::default();
        let (cell_w, cell_h) = button_extent(48, &style);

        let (w, h) = placement(Position::Bottom, false).surface_size(3, 48, &style);
        assert!(w >= cell_w * 3);
        assert!(h >= cell_h && h < cell_h * 2);

        let (w, h) = placement(Position::Left, false).surface_size(3, 48, &style);
        assert!(h >= cell_h * 3);
        assert!(w >= cell_w && w < cell_w * 2);
    }

    #[test]
    fn test_full_axis_left_to_compositor() {
        let style = StyleSheet::default();
        let (w, h) = placement(Position::Top, true).surface_size(7, 48, &style);
        assert_eq!(w, 0);
        assert!(h > 0);

        let (w, h) = placement(Position::Right, true).surface_size(7, 48, &style);
        assert!(w > 0);
        assert_eq!(h, 0);

        assert_eq!(placement(Position::Center, true).surface_size(7, 48, &style), (0, 0));
    }

    #[test]
    fn test_no_buttons_still_has_size() {
        let style = StyleSheet::default();
        let (w, h) = placement(Position::Center, false).surface_size(0, 48, &style);
        assert!(w > 0 && h > 0);
    }

    #[test]
    fn test_layer_settings_margins_and_output() {
        let p = Placement {
            margins: Margins { top: 1, right: 2, bottom: 3, left: 4 },
            ..Default::default()
        };
        let settings = p.layer_settings(2, 32, &StyleSheet::default(), Some("DP-1".into()));
        assert_eq!(settings.margin, (1, 2, 3, 4));
        assert!(matches!(settings.start_mode, StartMode::TargetScreen(ref name) if name == "DP-1"));
        assert!(matches!(settings.keyboard_interactivity, KeyboardInteractivity::Exclusive));

        let settings = p.layer_settings(2, 32, &StyleSheet::default(), None);
        assert!(matches!(settings.start_mode, StartMode::Active));
    }
}
