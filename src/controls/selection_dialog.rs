/*
 * Dialog procedure of the selection box: a message followed by up to
 * MAX_SELECTION_CHOICES radio buttons or checkboxes, and optionally a
 * username field placed right after one of the choices. The dialog widens to
 * the widest choice and grows for the message and the extra rows. On OK the
 * checked choices are read back into a bit mask.
 */
use crate::config::{DialogConfig, DialogStrings, MAX_SELECTION_CHOICES, ResourceIds};
use crate::controls::checkbox_handler::{apply_selection_style, read_check_state, set_check_state};
use crate::dialog_context::{
    ItemsLayout, MAX_USERNAME_LENGTH, clamp_items, initial_check_states, sanitize_username,
    selection_mask_from_states, width_growth,
};
use crate::types::{ControlId, SelectionOutcome, SelectionRequest};
use crate::window_common::{
    DialogChrome, attach_dialog_state, dialog_item, dialog_state, end_dialog,
    loword_from_wparam, read_window_text, rect_in_dialog, refuse_sizing_hit_test,
    resize_button_height, resize_move_ctrl, set_item_text, set_system_icon, set_window_text,
    show_item, text_width, top_distance,
};

use std::cell::{Cell, OnceCell};
use windows::Win32::Foundation::{HWND, LPARAM, RECT, WPARAM};
use windows::Win32::System::WindowsProgramming::GetUserNameW;
use windows::Win32::UI::WindowsAndMessaging::{
    GetClientRect, GetWindowRect, IDCANCEL, IDI_QUESTION, IDNO, IDOK, IDYES, SWP_NOMOVE,
    SWP_NOSIZE, SetWindowPos, WM_COMMAND, WM_CTLCOLORSTATIC, WM_INITDIALOG, WM_NCHITTEST,
};
use windows::core::PWSTR;

// Wide enough for a typical username.
const USERNAME_SIZING_SAMPLE: &str = "MMMMMMMMMMMM";

pub(crate) struct SelectionState<'a> {
    pub(crate) request: &'a SelectionRequest,
    pub(crate) ids: &'a ResourceIds,
    pub(crate) strings: &'a DialogStrings,
    pub(crate) config: &'a DialogConfig,
    /// Set when the dialog is closed with OK.
    outcome: Cell<Option<SelectionOutcome>>,
    choice_count: Cell<usize>,
    chrome: OnceCell<DialogChrome>,
}

impl<'a> SelectionState<'a> {
    pub(crate) fn new(
        request: &'a SelectionRequest,
        ids: &'a ResourceIds,
        strings: &'a DialogStrings,
        config: &'a DialogConfig,
    ) -> Self {
        Self {
            request,
            ids,
            strings,
            config,
            outcome: Cell::new(None),
            choice_count: Cell::new(0),
            chrome: OnceCell::new(),
        }
    }

    /// What the user confirmed with OK; `None` after Cancel or No.
    pub(crate) fn take_outcome(&self) -> Option<SelectionOutcome> {
        self.outcome.take()
    }

    fn choices(&self) -> &'a [String] {
        clamp_items(&self.request.choices, MAX_SELECTION_CHOICES, "choices")
    }

    fn choice(&self, hdlg: HWND, index: usize) -> Option<HWND> {
        dialog_item(hdlg, self.ids.selection_choice_first.offset(index))
    }

    fn username_index(&self) -> Option<usize> {
        self.request
            .username_index
            .filter(|index| *index < self.choice_count.get())
    }

    fn init(&self, hdlg: HWND) {
        let choices = self.choices();
        self.choice_count.set(choices.len());
        let ids = self.ids;
        let rtl = self.config.right_to_left;
        let margin = self.config.width_margin;

        for index in 0..choices.len() {
            if let Some(button) = self.choice(hdlg, index) {
                apply_selection_style(button, self.request.style);
            }
        }

        let mut fonted = vec![
            dialog_item(hdlg, ids.selection_text),
            dialog_item(hdlg, ControlId::new(IDYES.0)),
            dialog_item(hdlg, ControlId::new(IDNO.0)),
        ];
        fonted.extend((0..choices.len()).map(|i| self.choice(hdlg, i)));
        let mut chrome = DialogChrome::new(hdlg, &fonted);
        if self.config.button_height != 0 {
            resize_button_height(hdlg, ControlId::new(IDOK.0), self.config.button_height);
            resize_button_height(hdlg, ControlId::new(IDCANCEL.0), self.config.button_height);
        }
        chrome.set_title_bar_icon(hdlg, ids.app_icon, self.config.scale);

        let Some(text) = dialog_item(hdlg, ids.selection_text) else {
            log::error!("SelectionDialog: Template has no message control");
            self.keep_chrome(chrome);
            return;
        };
        let rc = rect_in_dialog(hdlg, text);
        let default_width = rc.right - rc.left - margin;

        set_system_icon(dialog_item(hdlg, ids.selection_icon), IDI_QUESTION);
        set_window_text(hdlg, &self.request.title);
        set_item_text(hdlg, ControlId::new(IDCANCEL.0), &self.strings.cancel);
        set_window_text(text, &self.request.message);

        let mut widest = default_width;
        for (index, label) in choices.iter().enumerate() {
            let Some(button) = self.choice(hdlg, index) else {
                continue;
            };
            set_window_text(button, label);
            show_item(hdlg, ids.selection_choice_first.offset(index), true);
            let measured = if self.username_index() == Some(index) {
                format!("{label} __{USERNAME_SIZING_SAMPLE}__")
            } else {
                label.clone()
            };
            widest = widest.max(text_width(button, &measured));
        }
        let width_grow = width_growth(widest, default_width);

        resize_move_ctrl(hdlg, Some(text), (0, 0, width_grow, 0), 1.0, rtl);
        let (needed, current) = chrome
            .text_heights(text, &self.request.message)
            .unwrap_or((0, 0));
        let text_grow = needed - current;
        resize_move_ctrl(hdlg, Some(text), (0, 0, 0, text_grow), 1.0, rtl);
        for index in 0..choices.len() {
            resize_move_ctrl(hdlg, self.choice(hdlg, index), (0, text_grow, width_grow, 0), 1.0, rtl);
        }

        if let Some(index) = self.username_index() {
            self.place_username(hdlg, index, &choices[index]);
        }

        let rows_extent = if choices.len() > 2 {
            top_distance(self.choice(hdlg, 1), self.choice(hdlg, choices.len() - 1))
        } else {
            0
        };
        let layout = ItemsLayout::compute(width_grow, needed, current, rows_extent, margin);
        self.apply_frame_layout(hdlg, &layout);

        let states = initial_check_states(self.request.initial_mask, choices.len());
        for (index, checked) in states.into_iter().enumerate() {
            if let Some(button) = self.choice(hdlg, index) {
                set_check_state(button, checked);
            }
        }

        self.keep_chrome(chrome);
        log::debug!(
            "SelectionDialog: Initialized '{}' with {} choices",
            self.request.title,
            choices.len()
        );
    }

    fn keep_chrome(&self, chrome: DialogChrome) {
        if self.chrome.set(chrome).is_err() {
            log::warn!("SelectionDialog: Dialog initialized twice");
        }
    }

    /*
     * Shrinks the choice to its label, then moves the username field right
     * after it on the same row and prefills it with the current user name.
     */
    fn place_username(&self, hdlg: HWND, index: usize, label: &str) {
        let rtl = self.config.right_to_left;
        let (Some(choice), Some(field)) = (
            self.choice(hdlg, index),
            dialog_item(hdlg, self.ids.selection_username),
        ) else {
            log::warn!("SelectionDialog: Username field requested but not in template");
            return;
        };

        let mut client = RECT::default();
        unsafe {
            let _ = GetClientRect(choice, &mut client);
        }
        let shrink = (client.left - client.right) + text_width(choice, label) + self.config.width_margin;
        resize_move_ctrl(hdlg, Some(choice), (0, 0, shrink, 0), 1.0, rtl);

        let mut choice_rc = RECT::default();
        let mut field_rc = RECT::default();
        unsafe {
            let _ = GetWindowRect(choice, &mut choice_rc);
            let _ = SetWindowPos(field, Some(choice), 0, 0, 0, 0, SWP_NOMOVE | SWP_NOSIZE);
            let _ = GetWindowRect(field, &mut field_rc);
        }
        let dx = if rtl {
            field_rc.right - choice_rc.left
        } else {
            choice_rc.right - field_rc.left
        };
        let dy = choice_rc.top - field_rc.top;
        let dw = text_width(field, USERNAME_SIZING_SAMPLE);
        resize_move_ctrl(hdlg, Some(field), (dx, dy, dw, 0), 1.0, rtl);

        set_window_text(field, &current_username(&self.strings.default_username));
        show_item(hdlg, self.ids.selection_username, true);
    }

    fn apply_frame_layout(&self, hdlg: HWND, layout: &ItemsLayout) {
        let ids = self.ids;
        let rtl = self.config.right_to_left;
        let (dw, dh) = (layout.dialog_grow_w, layout.dialog_grow_h);
        let item = |id: ControlId| dialog_item(hdlg, id);

        resize_move_ctrl(hdlg, Some(hdlg), (0, 0, dw, dh), 1.0, rtl);
        resize_move_ctrl(hdlg, item(ids.background), (0, 0, dw, dh), 1.0, rtl);
        resize_move_ctrl(hdlg, item(ids.selection_line), (0, dh, dw, 0), 1.0, rtl);
        resize_move_ctrl(hdlg, item(ControlId::new(IDOK.0)), (dw, dh, 0, 0), 1.0, rtl);
        resize_move_ctrl(hdlg, item(ControlId::new(IDCANCEL.0)), (dw, dh, 0, 0), 1.0, rtl);
    }

    fn command(&self, hdlg: HWND, command: i32) -> isize {
        match command {
            c if c == IDOK.0 => {
                self.outcome.set(Some(self.read_outcome(hdlg)));
                end_dialog(hdlg, command);
                1
            }
            c if c == IDNO.0 || c == IDCANCEL.0 => {
                end_dialog(hdlg, command);
                1
            }
            _ => 0,
        }
    }

    fn read_outcome(&self, hdlg: HWND) -> SelectionOutcome {
        let mask = selection_mask_from_states(
            (0..self.choice_count.get()).map(|i| self.choice(hdlg, i).is_some_and(read_check_state)),
        );
        let username = self.username_index().and_then(|_| {
            let field = dialog_item(hdlg, self.ids.selection_username)?;
            match read_window_text(field) {
                Ok(raw) => Some(sanitize_username(&raw)),
                Err(err) => {
                    log::warn!("SelectionDialog: Could not read username: {err}");
                    None
                }
            }
        });
        log::debug!("SelectionDialog: Selection mask {mask:#x}");
        SelectionOutcome { mask, username }
    }
}

fn current_username(fallback: &str) -> String {
    let mut buffer = [0u16; MAX_USERNAME_LENGTH];
    let mut size = buffer.len() as u32;
    let read = unsafe { GetUserNameW(Some(PWSTR(buffer.as_mut_ptr())), &mut size) };
    match read {
        // `size` includes the terminating NUL.
        Ok(()) if size > 1 => String::from_utf16_lossy(&buffer[..size as usize - 1]),
        _ => fallback.to_string(),
    }
}

pub(crate) unsafe extern "system" fn selection_dialog_proc(
    hdlg: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> isize {
    if msg == WM_INITDIALOG {
        attach_dialog_state(hdlg, lparam);
    }
    let Some(state) = (unsafe { dialog_state::<SelectionState<'_>>(hdlg) }) else {
        return 0;
    };

    match msg {
        WM_INITDIALOG => {
            state.init(hdlg);
            1
        }
        WM_CTLCOLORSTATIC => match state.chrome.get() {
            Some(chrome) => chrome.static_color(
                wparam,
                lparam,
                dialog_item(hdlg, state.ids.selection_line),
                None,
            ),
            None => 0,
        },
        WM_NCHITTEST => refuse_sizing_hit_test(hdlg, wparam, lparam).unwrap_or(0),
        WM_COMMAND => state.command(hdlg, loword_from_wparam(wparam)),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_is_shared_between_overlapping_handlers() {
        let request = SelectionRequest::default();
        let ids = ResourceIds::default();
        let strings = DialogStrings::default();
        let config = DialogConfig::default();
        let state = SelectionState::new(&request, &ids, &strings, &config);

        // An outer WM_COMMAND handler and a nested paint message hold the state at once.
        let outer = &state;
        let nested = &state;
        outer.outcome.set(Some(SelectionOutcome { mask: 0b101, username: None }));
        assert!(nested.chrome.get().is_none());
        assert_eq!(nested.choice_count.get(), 0);

        assert_eq!(
            state.take_outcome(),
            Some(SelectionOutcome { mask: 0b101, username: None })
        );
        assert_eq!(state.take_outcome(), None);
    }

    #[test]
    fn username_sizing_sample_fits_the_sanitizer_limit() {
        assert!(USERNAME_SIZING_SAMPLE.len() < MAX_USERNAME_LENGTH);
        assert_eq!(sanitize_username(USERNAME_SIZING_SAMPLE), USERNAME_SIZING_SAMPLE);
    }
}
