use iced::{Border, Color, Shadow, Theme};
use iced::widget::button::{Appearance, StyleSheet};

/// Header colour of the status bar and tab row.
pub const BAR_COLOR: Color = Color::from_rgb(0.482, 0.122, 0.635);

/// Underline colour of the active tab.
pub const ACTIVE_TAB_COLOR: Color = Color::from_rgb(0.0, 0.588, 0.533);

pub struct TabButtonStyleSheet {
    pub active: bool,
}

impl StyleSheet for TabButtonStyleSheet {
    type Style = Theme;

    fn active(&self, _style: &Self::Style) -> Appearance {
        Appearance {
            shadow_offset: Default::default(),
            background: Some(BAR_COLOR.into()),
            text_color: Color::WHITE,
            border: Border {
                color: if self.active { ACTIVE_TAB_COLOR } else { Color::TRANSPARENT },
                width: if self.active { 3.0 } else { 0.0 },
                radius: 0.0.into(),
            },
            shadow: Shadow::default(),
        }
    }
}

pub struct DeviceRowStyleSheet;

impl StyleSheet for DeviceRowStyleSheet {
    type Style = Theme;

    fn active(&self, _style: &Self::Style) -> Appearance {
        Appearance {
            shadow_offset: Default::default(),
            background: None,
            text_color: Color::BLACK,
            border: Border {
                color: Color::from_rgb(0.8, 0.8, 0.8),
                width: 0.5,
                radius: 0.0.into(),
            },
            shadow: Shadow::default(),
        }
    }

    fn hovered(&self, style: &Self::Style) -> Appearance {
        Appearance {
            background: Some(Color::from_rgb(0.87, 0.87, 0.87).into()),
            ..self.active(style)
        }
    }
}

pub struct BarStyle;

impl iced::widget::container::StyleSheet for BarStyle {
    type Style = Theme;

    fn appearance(&self, _style: &Self::Style) -> iced::widget::container::Appearance {
        iced::widget::container::Appearance {
            text_color: Some(Color::WHITE),
            background: Some(BAR_COLOR.into()),
            ..Default::default()
        }
    }
}
