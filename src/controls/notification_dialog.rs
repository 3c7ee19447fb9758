/*
 * Dialog procedure of the notification box: an icon, a word-wrapped message,
 * an optional "more information" button, an optional "don't display again"
 * checkbox and Yes/No (or Close) buttons. The text control grows to fit the
 * message and the controls below it move down; when the checkbox is hidden
 * the buttons and the dialog take back its height.
 */
use crate::config::{DialogConfig, DialogStrings, ResourceIds};
use crate::controls::checkbox_handler::read_check_state;
use crate::dialog_context::NotificationLayout;
use crate::settings::SettingsStore;
use crate::types::{ControlId, DialogId, MoreInfo, NotificationKind, NotificationRequest};
use crate::window_common::{
    DialogChrome, attach_dialog_state, dialog_item, dialog_state, end_dialog,
    loword_from_wparam, read_window_text, rect_in_dialog, refuse_sizing_hit_test,
    resize_button_height, resize_move_ctrl, set_item_text, set_system_icon, set_window_text,
    show_item, text_width,
};

use std::cell::OnceCell;
use windows::Win32::Foundation::{HWND, LPARAM, WPARAM};
use windows::Win32::UI::Shell::ShellExecuteW;
use windows::Win32::UI::WindowsAndMessaging::{
    GetSystemMetrics, IDCANCEL, IDI_ERROR, IDI_INFORMATION, IDI_QUESTION, IDI_WARNING, IDNO,
    IDOK, IDYES, SM_CXMENUCHECK, SW_SHOWNORMAL, SWP_NOZORDER, SetWindowPos, WM_COMMAND,
    WM_CTLCOLORSTATIC, WM_INITDIALOG, WM_NCHITTEST,
};
use windows::core::{HSTRING, PCWSTR, w};

/// State of one notification invocation, reachable from the dialog procedure.
pub(crate) struct NotificationState<'a> {
    pub(crate) request: &'a NotificationRequest,
    pub(crate) ids: &'a ResourceIds,
    pub(crate) strings: &'a DialogStrings,
    pub(crate) config: &'a DialogConfig,
    pub(crate) settings: &'a dyn SettingsStore,
    /// Shows a nested dialog for `MoreInfo::Dialog`.
    pub(crate) show_dialog: &'a dyn Fn(HWND, DialogId),
    chrome: OnceCell<DialogChrome>,
}

impl<'a> NotificationState<'a> {
    pub(crate) fn new(
        request: &'a NotificationRequest,
        ids: &'a ResourceIds,
        strings: &'a DialogStrings,
        config: &'a DialogConfig,
        settings: &'a dyn SettingsStore,
        show_dialog: &'a dyn Fn(HWND, DialogId),
    ) -> Self {
        Self {
            request,
            ids,
            strings,
            config,
            settings,
            show_dialog,
            chrome: OnceCell::new(),
        }
    }

    fn init(&self, hdlg: HWND) {
        let ids = self.ids;
        let request = self.request;
        let item = |id: ControlId| dialog_item(hdlg, id);
        let yes = ControlId::new(IDYES.0);
        let no = ControlId::new(IDNO.0);

        let mut chrome = DialogChrome::new(
            hdlg,
            &[item(ids.notification_text), item(ids.more_info), item(yes), item(no)],
        );
        if self.config.button_height != 0 {
            for button in [ids.more_info, yes, no] {
                resize_button_height(hdlg, button, self.config.button_height);
            }
        }
        chrome.set_title_bar_icon(hdlg, ids.app_icon, self.config.scale);

        set_system_icon(item(ids.notification_icon), notification_icon(request.kind));
        set_window_text(hdlg, &request.title);
        if request.kind.is_question() {
            show_item(hdlg, yes, true);
        } else {
            set_item_text(hdlg, no, &self.strings.close);
        }

        let mut hidden_checkbox_height = 0;
        if request.dont_display_setting.is_some() {
            set_item_text(hdlg, ids.dont_display_again, &self.strings.dont_display_again);
        } else if let Some(checkbox) = item(ids.dont_display_again) {
            show_item(hdlg, ids.dont_display_again, false);
            let rc = rect_in_dialog(hdlg, checkbox);
            hidden_checkbox_height = rc.bottom - rc.top;
        }

        if request.more_info.is_some() {
            if let Some(button) = item(ids.more_info) {
                let rc = rect_in_dialog(hdlg, button);
                let caption = read_window_text(button).unwrap_or_default();
                let needed =
                    text_width(button, &caption) + unsafe { GetSystemMetrics(SM_CXMENUCHECK) };
                let width = (rc.right - rc.left).max(needed);
                unsafe {
                    let _ = SetWindowPos(
                        button,
                        None,
                        rc.left,
                        rc.top,
                        width,
                        rc.bottom - rc.top,
                        SWP_NOZORDER,
                    );
                }
                show_item(hdlg, ids.more_info, true);
            }
        }

        if let Some(text) = item(ids.notification_text) {
            set_window_text(text, &request.text);
            if let Some((needed, current)) = chrome.text_heights(text, &request.text) {
                let layout = NotificationLayout::compute(
                    needed,
                    current,
                    self.config.scaled(self.config.text_padding),
                    hidden_checkbox_height,
                );
                self.apply_layout(hdlg, &layout);
            }
        }

        if self.chrome.set(chrome).is_err() {
            log::warn!("NotificationDialog: Dialog initialized twice");
        }
        log::debug!(
            "NotificationDialog: Initialized {:?} notification '{}'",
            request.kind,
            request.title
        );
    }

    fn apply_layout(&self, hdlg: HWND, layout: &NotificationLayout) {
        let ids = self.ids;
        let rtl = self.config.right_to_left;
        let item = |id: ControlId| dialog_item(hdlg, id);
        let shift = |id: ControlId, dy: i32| resize_move_ctrl(hdlg, item(id), (0, dy, 0, 0), 1.0, rtl);

        resize_move_ctrl(hdlg, item(ids.notification_text), (0, 0, 0, layout.text_grow), 1.0, rtl);
        resize_move_ctrl(hdlg, Some(hdlg), (0, 0, 0, layout.dialog_grow), 1.0, rtl);
        resize_move_ctrl(hdlg, item(ids.background), (0, 0, 0, layout.background_grow), 1.0, rtl);
        shift(ids.notification_line, layout.line_shift);
        shift(ids.dont_display_again, layout.checkbox_shift);
        shift(ids.more_info, layout.button_shift);
        shift(ControlId::new(IDYES.0), layout.button_shift);
        shift(ControlId::new(IDNO.0), layout.button_shift);
    }

    fn command(&self, hdlg: HWND, command: i32) -> isize {
        match command {
            c if c == IDOK.0 || c == IDCANCEL.0 || c == IDYES.0 || c == IDNO.0 => {
                self.store_dont_display(hdlg);
                end_dialog(hdlg, command);
                1
            }
            c if c == self.ids.more_info.raw() => {
                self.open_more_info(hdlg);
                0
            }
            _ => 0,
        }
    }

    fn store_dont_display(&self, hdlg: HWND) {
        let Some(key) = &self.request.dont_display_setting else {
            return;
        };
        let checked = dialog_item(hdlg, self.ids.dont_display_again).is_some_and(read_check_state);
        if checked {
            if let Err(err) = self.settings.write_bool(key, true) {
                log::error!("NotificationDialog: Could not store {key}: {err}");
            }
        }
    }

    fn open_more_info(&self, hdlg: HWND) {
        match &self.request.more_info {
            Some(MoreInfo::Url(url)) => {
                let result = unsafe {
                    ShellExecuteW(
                        Some(hdlg),
                        w!("open"),
                        &HSTRING::from(url.as_str()),
                        PCWSTR::null(),
                        PCWSTR::null(),
                        SW_SHOWNORMAL,
                    )
                };
                // Values up to 32 are ShellExecute error codes.
                if result.0 as usize <= 32 {
                    log::warn!("NotificationDialog: Could not open {url} (code {})", result.0 as usize);
                }
            }
            Some(MoreInfo::Dialog(id)) => (self.show_dialog)(hdlg, *id),
            None => {}
        }
    }
}

fn notification_icon(kind: NotificationKind) -> PCWSTR {
    match kind {
        NotificationKind::Info => IDI_INFORMATION,
        NotificationKind::Warning | NotificationKind::WarningQuestion => IDI_WARNING,
        NotificationKind::Error => IDI_ERROR,
        NotificationKind::Question => IDI_QUESTION,
    }
}

pub(crate) unsafe extern "system" fn notification_dialog_proc(
    hdlg: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> isize {
    if msg == WM_INITDIALOG {
        attach_dialog_state(hdlg, lparam);
    }
    let Some(state) = (unsafe { dialog_state::<NotificationState<'_>>(hdlg) }) else {
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
                dialog_item(hdlg, state.ids.notification_line),
                dialog_item(hdlg, state.ids.dont_display_again),
            ),
            None => 0,
        },
        WM_NCHITTEST => refuse_sizing_hit_test(hdlg, wparam, lparam).unwrap_or(0),
        WM_COMMAND => state.command(hdlg, loword_from_wparam(wparam)),
        _ => 0,
    }
}

/// Procedure for "more information" dialogs: shown as authored, closed by OK or Cancel.
pub(crate) unsafe extern "system" fn more_info_dialog_proc(
    hdlg: HWND,
    msg: u32,
    wparam: WPARAM,
    _lparam: LPARAM,
) -> isize {
    match msg {
        WM_INITDIALOG => 1,
        WM_COMMAND => {
            let command = loword_from_wparam(wparam);
            if command == IDOK.0 || command == IDCANCEL.0 {
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
    fn question_and_warning_question_share_icons_with_their_base_kind() {
        assert_eq!(
            notification_icon(NotificationKind::WarningQuestion),
            notification_icon(NotificationKind::Warning)
        );
        assert_eq!(notification_icon(NotificationKind::Question), IDI_QUESTION);
        assert_eq!(notification_icon(NotificationKind::default()), IDI_INFORMATION);
    }
}
