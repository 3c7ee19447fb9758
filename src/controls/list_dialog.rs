/*
 * Dialog procedure of the list box: a message followed by one static line per
 * item. Any closing command ends the dialog; nothing is read back.
 */
use crate::config::{DialogConfig, DialogStrings, MAX_LIST_ITEMS, ResourceIds};
use crate::dialog_context::{ItemsLayout, clamp_items};
use crate::types::{ControlId, ListRequest};
use crate::window_common::{
    DialogChrome, attach_dialog_state, dialog_item, dialog_state, end_dialog,
    loword_from_wparam, refuse_sizing_hit_test, resize_button_height, resize_move_ctrl,
    set_item_text, set_system_icon, set_window_text, show_item, top_distance,
};

use std::cell::OnceCell;
use windows::Win32::Foundation::{HWND, LPARAM, WPARAM};
use windows::Win32::UI::WindowsAndMessaging::{
    IDCANCEL, IDI_EXCLAMATION, IDNO, IDOK, IDYES, WM_COMMAND, WM_CTLCOLORSTATIC,
    WM_INITDIALOG, WM_NCHITTEST,
};

pub(crate) struct ListState<'a> {
    pub(crate) request: &'a ListRequest,
    pub(crate) ids: &'a ResourceIds,
    pub(crate) strings: &'a DialogStrings,
    pub(crate) config: &'a DialogConfig,
    chrome: OnceCell<DialogChrome>,
}

impl<'a> ListState<'a> {
    pub(crate) fn new(
        request: &'a ListRequest,
        ids: &'a ResourceIds,
        strings: &'a DialogStrings,
        config: &'a DialogConfig,
    ) -> Self {
        Self {
            request,
            ids,
            strings,
            config,
            chrome: OnceCell::new(),
        }
    }

    fn init(&self, hdlg: HWND) {
        let items = clamp_items(&self.request.items, MAX_LIST_ITEMS, "items");
        let ids = self.ids;
        let rtl = self.config.right_to_left;
        let item = |id: ControlId| dialog_item(hdlg, id);

        let mut fonted = vec![
            item(ids.list_text),
            item(ControlId::new(IDYES.0)),
            item(ControlId::new(IDNO.0)),
        ];
        fonted.extend((0..items.len()).map(|i| item(ids.list_item_first.offset(i))));
        let mut chrome = DialogChrome::new(hdlg, &fonted);
        if self.config.button_height != 0 {
            resize_button_height(hdlg, ControlId::new(IDOK.0), self.config.button_height);
            resize_button_height(hdlg, ControlId::new(IDCANCEL.0), self.config.button_height);
        }
        chrome.set_title_bar_icon(hdlg, ids.app_icon, self.config.scale);

        set_system_icon(item(ids.list_icon), IDI_EXCLAMATION);
        set_window_text(hdlg, &self.request.title);
        set_item_text(hdlg, ControlId::new(IDCANCEL.0), &self.strings.cancel);
        set_item_text(hdlg, ids.list_text, &self.request.message);
        for (index, label) in items.iter().enumerate() {
            let id = ids.list_item_first.offset(index);
            set_item_text(hdlg, id, label);
            show_item(hdlg, id, true);
        }

        let (needed, current) = item(ids.list_text)
            .and_then(|text| chrome.text_heights(text, &self.request.message))
            .unwrap_or((0, 0));
        let text_grow = needed - current;
        resize_move_ctrl(hdlg, item(ids.list_text), (0, 0, 0, text_grow), 1.0, rtl);
        for index in 0..items.len() {
            resize_move_ctrl(hdlg, item(ids.list_item_first.offset(index)), (0, text_grow, 0, 0), 1.0, rtl);
        }

        let rows_extent = if items.len() > 1 {
            top_distance(
                item(ids.list_item_first),
                item(ids.list_item_first.offset(items.len() - 1)),
            )
        } else {
            0
        };
        let layout = ItemsLayout::compute(0, needed, current, rows_extent, self.config.width_margin);
        let dh = layout.dialog_grow_h;
        resize_move_ctrl(hdlg, Some(hdlg), (0, 0, 0, dh), 1.0, rtl);
        resize_move_ctrl(hdlg, item(ids.background), (0, 0, 0, dh), 1.0, rtl);
        resize_move_ctrl(hdlg, item(ids.list_line), (0, dh, 0, 0), 1.0, rtl);
        resize_move_ctrl(hdlg, item(ControlId::new(IDOK.0)), (0, dh, 0, 0), 1.0, rtl);
        resize_move_ctrl(hdlg, item(ControlId::new(IDCANCEL.0)), (0, dh, 0, 0), 1.0, rtl);

        if self.chrome.set(chrome).is_err() {
            log::warn!("ListDialog: Dialog initialized twice");
        }
        log::debug!(
            "ListDialog: Initialized '{}' with {} items",
            self.request.title,
            items.len()
        );
    }
}

fn is_closing_command(command: i32) -> bool {
    command == IDOK.0 || command == IDNO.0 || command == IDCANCEL.0
}

pub(crate) unsafe extern "system" fn list_dialog_proc(
    hdlg: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> isize {
    if msg == WM_INITDIALOG {
        attach_dialog_state(hdlg, lparam);
    }
    let Some(state) = (unsafe { dialog_state::<ListState<'_>>(hdlg) }) else {
        return 0;
    };

    match msg {
        WM_INITDIALOG => {
            state.init(hdlg);
            1
        }
        WM_CTLCOLORSTATIC => match state.chrome.get() {
            Some(chrome) => {
                chrome.static_color(wparam, lparam, dialog_item(hdlg, state.ids.list_line), None)
            }
            None => 0,
        },
        WM_NCHITTEST => refuse_sizing_hit_test(hdlg, wparam, lparam).unwrap_or(0),
        WM_COMMAND => {
            let command = loword_from_wparam(wparam);
            if is_closing_command(command) {
                end_dialog(hdlg, command);
                1
            } else {
                0
            }
        }
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_no_and_cancel_close_the_list() {
        assert!(is_closing_command(IDOK.0));
        assert!(is_closing_command(IDNO.0));
        assert!(is_closing_command(IDCANCEL.0));
        assert!(!is_closing_command(IDYES.0));
    }
}
