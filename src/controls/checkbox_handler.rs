/*
 * Check-state and style management for the button controls of the message
 * dialogs: the "don't display again" checkbox of the notification and the
 * radio/checkbox choices of the selection dialog. The dialog templates author
 * the buttons; this module only restyles them and reads or writes their
 * state.
 */

use crate::types::SelectionStyle;

use windows::Win32::Foundation::{HWND, LPARAM, WPARAM};
use windows::Win32::UI::Controls::BST_CHECKED;
use windows::Win32::UI::WindowsAndMessaging::{
    BM_GETCHECK, BM_SETCHECK, BM_SETSTYLE, BS_AUTOCHECKBOX, BS_AUTORADIOBUTTON, SendMessageW,
};

/// Reads the current check state of a button HWND via BM_GETCHECK.
/// Returns `true` if the button is checked (BST_CHECKED), `false` otherwise.
pub(crate) fn read_check_state(hwnd: HWND) -> bool {
    let result = unsafe { SendMessageW(hwnd, BM_GETCHECK, None, None) };
    result.0 as u32 == BST_CHECKED.0
}

pub(crate) fn set_check_state(hwnd: HWND, checked: bool) {
    unsafe {
        let _ = SendMessageW(
            hwnd,
            BM_SETCHECK,
            Some(WPARAM(win32_check_state(checked))),
            Some(LPARAM(0)),
        );
    }
}

/*
 * Switches an authored button to the auto radio/checkbox behavior the
 * request asks for. BM_SETSTYLE with a non-zero LPARAM repaints the button.
 */
pub(crate) fn apply_selection_style(hwnd: HWND, style: SelectionStyle) {
    unsafe {
        let _ = SendMessageW(
            hwnd,
            BM_SETSTYLE,
            Some(WPARAM(selection_button_style(style))),
            Some(LPARAM(1)),
        );
    }
}

fn selection_button_style(style: SelectionStyle) -> usize {
    match style {
        SelectionStyle::Radio => BS_AUTORADIOBUTTON as usize,
        SelectionStyle::CheckBox => BS_AUTOCHECKBOX as usize,
    }
}

fn win32_check_state(checked: bool) -> usize {
    if checked { 1 } else { 0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_style_maps_to_auto_button_types() {
        assert_eq!(
            selection_button_style(SelectionStyle::Radio),
            BS_AUTORADIOBUTTON as usize
        );
        assert_eq!(
            selection_button_style(SelectionStyle::CheckBox),
            BS_AUTOCHECKBOX as usize
        );
    }

    #[test]
    fn checked_state_maps_to_expected_win32_constant() {
        assert_eq!(win32_check_state(true), 1);
        assert_eq!(win32_check_state(false), 0);
    }
}
