/*
 * Configuration for the dialog layer. `DialogConfig` carries the runtime
 * choices (layout direction, fonts, scaling), `ResourceIds` names the dialog
 * and control ids of the host's resource script, and `DialogStrings` holds
 * the captions the dialogs set on their own. The fixed capacities of the
 * tooltip table and the choice/item control budgets live here as constants.
 */
use crate::types::{ControlId, DialogId};

/// Capacity of the tooltip table.
pub const MAX_TOOLTIPS: usize = 32;
/// Number of choice controls present in the selection dialog template.
pub const MAX_SELECTION_CHOICES: usize = 15;
/// Number of item controls present in the list dialog template.
pub const MAX_LIST_ITEMS: usize = 15;

/// Locale for which the symbol font must be kept (the plain UI font cannot
/// render it on rich edit controls).
pub const SYMBOL_FONT_LOCALE: &str = "th-TH";

#[derive(Debug, Clone, PartialEq)]
pub struct DialogConfig {
    pub right_to_left: bool,
    /// Typeface every dialog template is authored with.
    pub preferred_font: String,
    /// Typeface spliced in when the preferred one must not be used.
    pub fallback_font: String,
    /// Locale tag of the active UI language, e.g. "en-US".
    pub locale: Option<String>,
    /// DPI scale factor applied to pixel constants.
    pub scale: f32,
    /// Maximum tooltip width in unscaled pixels.
    pub tooltip_max_width: i32,
    /// Extra unscaled height added under a notification's text.
    pub text_padding: i32,
    /// Extra width added when a selection dialog has to grow.
    pub width_margin: i32,
    /// Only download URLs starting with this prefix are probed.
    pub download_url_prefix: String,
    /// Height of the host's push buttons; shorter dialog buttons are
    /// stretched to it. Zero keeps the authored heights.
    pub button_height: i32,
}

impl Default for DialogConfig {
    fn default() -> Self {
        Self {
            right_to_left: false,
            preferred_font: "Segoe UI Symbol".to_string(),
            fallback_font: "Segoe UI".to_string(),
            locale: None,
            scale: 1.0,
            tooltip_max_width: 150,
            text_padding: 8,
            width_margin: 10,
            download_url_prefix: "https://github.com/Smu1zel/Whitebar".to_string(),
            button_height: 0,
        }
    }
}

impl DialogConfig {
    pub fn scaled(&self, value: i32) -> i32 {
        (value as f32 * self.scale) as i32
    }

    pub fn uses_symbol_font_locale(&self) -> bool {
        self.locale.as_deref() == Some(SYMBOL_FONT_LOCALE)
    }
}

/// Dialog and control ids as defined by the host's resource script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceIds {
    pub notification_dialog: DialogId,
    pub notification_icon: ControlId,
    pub notification_text: ControlId,
    pub notification_line: ControlId,
    pub more_info: ControlId,
    pub dont_display_again: ControlId,

    pub selection_dialog: DialogId,
    pub selection_icon: ControlId,
    pub selection_text: ControlId,
    pub selection_line: ControlId,
    pub selection_choice_first: ControlId,
    pub selection_username: ControlId,

    pub list_dialog: DialogId,
    pub list_icon: ControlId,
    pub list_text: ControlId,
    pub list_line: ControlId,
    pub list_item_first: ControlId,

    /// Static background panel shared by the message dialogs.
    pub background: ControlId,
    /// Application icon shown in the message dialogs' title bars.
    pub app_icon: Option<u16>,
}

impl Default for ResourceIds {
    fn default() -> Self {
        Self {
            notification_dialog: DialogId::new(103),
            notification_icon: ControlId::new(1040),
            notification_text: ControlId::new(1041),
            notification_line: ControlId::new(1042),
            more_info: ControlId::new(1043),
            dont_display_again: ControlId::new(1044),

            selection_dialog: DialogId::new(104),
            selection_icon: ControlId::new(1050),
            selection_text: ControlId::new(1051),
            selection_line: ControlId::new(1052),
            selection_choice_first: ControlId::new(1053),
            selection_username: ControlId::new(1053 + MAX_SELECTION_CHOICES as i32),

            list_dialog: DialogId::new(105),
            list_icon: ControlId::new(1080),
            list_text: ControlId::new(1081),
            list_line: ControlId::new(1082),
            list_item_first: ControlId::new(1083),

            background: ControlId::new(-1),
            app_icon: Some(100),
        }
    }
}

/// Captions the dialogs apply themselves, already localized by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogStrings {
    pub close: String,
    pub cancel: String,
    pub dont_display_again: String,
    pub default_username: String,
}

impl Default for DialogStrings {
    fn default() -> Self {
        Self {
            close: "Close".to_string(),
            cancel: "Cancel".to_string(),
            dont_display_again: "Do not show this message again".to_string(),
            default_username: "User".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scaled_truncates_towards_zero() {
        let config = DialogConfig {
            scale: 1.25,
            ..Default::default()
        };
        assert_eq!(config.scaled(150), 187);
        assert_eq!(config.scaled(8), 10);
    }

    #[test]
    fn symbol_font_locale_is_exact_match() {
        let mut config = DialogConfig::default();
        assert!(!config.uses_symbol_font_locale());
        config.locale = Some("th-TH".into());
        assert!(config.uses_symbol_font_locale());
        config.locale = Some("th".into());
        assert!(!config.uses_symbol_font_locale());
    }

    #[test]
    fn default_download_prefix_covers_the_release_script() {
        let config = DialogConfig::default();
        assert!(
            "https://github.com/Smu1zel/Whitebar/releases/latest/download/Whitebar.ps1"
                .starts_with(&config.download_url_prefix)
        );
        assert_eq!(config.button_height, 0);
    }

    #[test]
    fn default_choice_ids_do_not_overlap_username_field() {
        let ids = ResourceIds::default();
        let last_choice = ids.selection_choice_first.offset(MAX_SELECTION_CHOICES - 1);
        assert!(ids.selection_username.raw() > last_choice.raw());
    }
}
