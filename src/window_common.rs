/*
 * Common Win32 helpers shared by the dialog procedures and control handlers:
 * custom WM_APP message ids, parameter word extraction, control lookup and
 * text access, the system message font, background brushes for the message
 * dialogs, and the control resize/move arithmetic used to fit variable text.
 */
use crate::dialog_context::{button_height_adjustment, icon_resource_size, is_sizing_hit_test};
use crate::error::{PlatformError, Result as PlatformResult};
use crate::types::ControlId;

use windows::{
    Win32::{
        Foundation::{COLORREF, HINSTANCE, HWND, LPARAM, LRESULT, POINT, RECT, SIZE, WPARAM},
        Graphics::Gdi::{
            COLOR_3DLIGHT, COLOR_BTNFACE, COLOR_WINDOW, CreateFontIndirectW, CreateSolidBrush,
            DEFAULT_CHARSET, DT_CALCRECT, DT_WORDBREAK, DeleteObject, DrawTextW,
            EnumFontFamiliesExW, GetDC, GetSysColor, GetTextExtentPoint32W, HBRUSH, HDC, HFONT,
            HGDIOBJ, LOGFONTW, MapWindowPoints, ReleaseDC, ScreenToClient, SelectObject,
            SetBkMode, TEXTMETRICW, TRANSPARENT,
        },
        UI::WindowsAndMessaging::*,
    },
    core::{HSTRING, PCWSTR},
};

// Posted by the download check worker to the main window; WPARAM is 1 when
// the download script is reachable.
pub(crate) const WM_APP_DOWNLOAD_CHECK_RESULT: u32 = WM_APP + 0x110;

#[inline]
pub(crate) fn loword_from_wparam(wparam: WPARAM) -> i32 {
    (wparam.0 & 0xFFFF) as i32
}

/// Looks up a dialog item; `None` when the template has no such control.
pub(crate) fn dialog_item(hdlg: HWND, control_id: ControlId) -> Option<HWND> {
    unsafe { GetDlgItem(Some(hdlg), control_id.raw()) }
        .ok()
        .filter(|hwnd| !hwnd.is_invalid())
}

pub(crate) fn set_window_text(hwnd: HWND, text: &str) {
    if let Err(err) = unsafe { SetWindowTextW(hwnd, &HSTRING::from(text)) } {
        log::warn!("WindowCommon: SetWindowTextW failed for {hwnd:?}: {err}");
    }
}

pub(crate) fn set_item_text(hdlg: HWND, control_id: ControlId, text: &str) {
    if let Some(hwnd) = dialog_item(hdlg, control_id) {
        set_window_text(hwnd, text);
    }
}

pub(crate) fn show_item(hdlg: HWND, control_id: ControlId, show: bool) {
    if let Some(hwnd) = dialog_item(hdlg, control_id) {
        unsafe {
            let _ = ShowWindow(hwnd, if show { SW_SHOW } else { SW_HIDE });
        }
    }
}

// Reads the full text of a window without truncation.
pub(crate) fn read_window_text(hwnd: HWND) -> PlatformResult<String> {
    read_window_text_with(
        || unsafe { GetWindowTextLengthW(hwnd) },
        |buf| unsafe { GetWindowTextW(hwnd, buf) },
    )
}

// Internal helper that can be unit tested with injected getters.
fn read_window_text_with<FLen, FGet>(get_len: FLen, get_text: FGet) -> PlatformResult<String>
where
    FLen: Fn() -> i32,
    FGet: Fn(&mut [u16]) -> i32,
{
    let len = get_len();
    if len < 0 {
        return Err(PlatformError::OperationFailed(
            "GetWindowTextLengthW returned negative length".into(),
        ));
    }

    let mut buffer = vec![0u16; len as usize + 1];
    let copied = get_text(&mut buffer);
    if copied < 0 {
        return Err(PlatformError::OperationFailed(
            "GetWindowTextW returned negative length".into(),
        ));
    }

    buffer.truncate(copied as usize);
    Ok(String::from_utf16_lossy(&buffer))
}

/// Window rectangle of `hctrl` in the client coordinates of `hdlg`.
pub(crate) fn rect_in_dialog(hdlg: HWND, hctrl: HWND) -> RECT {
    let mut rc = RECT::default();
    unsafe {
        if GetWindowRect(hctrl, &mut rc).is_ok() {
            let points = std::slice::from_raw_parts_mut(&mut rc as *mut RECT as *mut POINT, 2);
            MapWindowPoints(None, Some(hdlg), points);
        }
    }
    rc
}

/// Vertical distance between the tops of two controls, 0 if either is missing.
pub(crate) fn top_distance(first: Option<HWND>, last: Option<HWND>) -> i32 {
    let (Some(first), Some(last)) = (first, last) else {
        return 0;
    };
    let mut first_rc = RECT::default();
    let mut last_rc = RECT::default();
    unsafe {
        let _ = GetWindowRect(first, &mut first_rc);
        let _ = GetWindowRect(last, &mut last_rc);
    }
    last_rc.top - first_rc.top
}

fn border_size(hwnd: HWND) -> SIZE {
    let mut info = WINDOWINFO {
        cbSize: std::mem::size_of::<WINDOWINFO>() as u32,
        ..Default::default()
    };
    let mut rc = RECT::default();
    unsafe {
        if GetWindowInfo(hwnd, &mut info).is_err()
            || AdjustWindowRectEx(&mut rc, info.dwStyle, false, info.dwExStyle).is_err()
        {
            return SIZE::default();
        }
    }
    SIZE {
        cx: rc.right - rc.left,
        cy: rc.bottom - rc.top,
    }
}

/*
 * Moves `hctrl` by (dx, dy) and grows it by (dw, dh), all scaled. When
 * `hctrl` is the dialog itself the position stays in screen coordinates. In
 * right-to-left layout child controls are anchored on their right edge.
 */
pub(crate) fn resize_move_ctrl(
    hdlg: HWND,
    hctrl: Option<HWND>,
    delta: (i32, i32, i32, i32),
    scale: f32,
    rtl: bool,
) {
    let Some(hctrl) = hctrl else {
        return;
    };
    let (dx, dy, dw, dh) = delta;
    let scaled = |v: i32| (scale * v as f32) as i32;
    let is_dialog = hctrl == hdlg;

    let mut rect = RECT::default();
    unsafe {
        if GetWindowRect(hctrl, &mut rect).is_err() {
            return;
        }
        let mut point = POINT {
            x: if rtl && !is_dialog { rect.right } else { rect.left },
            y: rect.top,
        };
        if !is_dialog {
            let _ = ScreenToClient(hdlg, &mut point);
        }
        if GetClientRect(hctrl, &mut rect).is_err() {
            return;
        }
        let border = border_size(hctrl);
        let _ = MoveWindow(
            hctrl,
            point.x + scaled(dx),
            point.y + scaled(dy),
            (rect.right - rect.left) + scaled(dw) + border.cx,
            (rect.bottom - rect.top) + scaled(dh) + border.cy,
            true,
        );
    }
}

/// The font message boxes use, applied to a dialog and its controls.
pub(crate) struct MessageFont(HFONT);

impl MessageFont {
    pub(crate) fn system() -> PlatformResult<Self> {
        let mut metrics = NONCLIENTMETRICSW {
            cbSize: std::mem::size_of::<NONCLIENTMETRICSW>() as u32,
            ..Default::default()
        };
        unsafe {
            SystemParametersInfoW(
                SPI_GETNONCLIENTMETRICS,
                metrics.cbSize,
                Some(&mut metrics as *mut _ as *mut std::ffi::c_void),
                SYSTEM_PARAMETERS_INFO_UPDATE_FLAGS(0),
            )?;
            let font = CreateFontIndirectW(&metrics.lfMessageFont);
            if font.is_invalid() {
                return Err(PlatformError::OperationFailed(
                    "CreateFontIndirectW failed for the message font".into(),
                ));
            }
            Ok(Self(font))
        }
    }

    pub(crate) fn apply(&self, hwnd: Option<HWND>) {
        if let Some(hwnd) = hwnd {
            unsafe {
                SendMessageW(hwnd, WM_SETFONT, Some(WPARAM(self.0.0 as usize)), Some(LPARAM(1)));
            }
        }
    }

    pub(crate) fn handle(&self) -> HFONT {
        self.0
    }
}

impl Drop for MessageFont {
    fn drop(&mut self) {
        unsafe {
            let _ = DeleteObject(self.0.into());
        }
    }
}

/// Height `text` needs when word-wrapped to the current width of `hctrl`.
pub(crate) fn wrapped_text_height(hctrl: HWND, font: HFONT, text: &str) -> Option<i32> {
    let mut rc = RECT::default();
    unsafe {
        GetWindowRect(hctrl, &mut rc).ok()?;
        let hdc = GetDC(Some(hctrl));
        if hdc.is_invalid() {
            return None;
        }
        SelectObject(hdc, font.into());
        let mut wide: Vec<u16> = text.encode_utf16().collect();
        DrawTextW(hdc, &mut wide, &mut rc, DT_CALCRECT | DT_WORDBREAK);
        ReleaseDC(Some(hctrl), hdc);
    }
    Some(rc.bottom - rc.top)
}

/// On-screen width of `text` in the font of `hctrl`.
pub(crate) fn text_width(hctrl: HWND, text: &str) -> i32 {
    let mut size = SIZE::default();
    unsafe {
        let hdc = GetDC(Some(hctrl));
        if hdc.is_invalid() {
            return 0;
        }
        let font = SendMessageW(hctrl, WM_GETFONT, None, None);
        if font.0 != 0 {
            SelectObject(hdc, HGDIOBJ(font.0 as *mut _));
            let wide: Vec<u16> = text.encode_utf16().collect();
            let _ = GetTextExtentPoint32W(hdc, &wide, &mut size);
        }
        ReleaseDC(Some(hctrl), hdc);
    }
    size.cx
}

/// Background, separator and button-face brushes of the message dialogs.
pub(crate) struct DialogBrushes {
    pub(crate) background: HBRUSH,
    pub(crate) separator: HBRUSH,
    pub(crate) button_face: HBRUSH,
}

impl DialogBrushes {
    pub(crate) fn new() -> Self {
        unsafe {
            Self {
                background: CreateSolidBrush(COLORREF(GetSysColor(COLOR_WINDOW))),
                separator: CreateSolidBrush(COLORREF(GetSysColor(COLOR_3DLIGHT))),
                button_face: CreateSolidBrush(COLORREF(GetSysColor(COLOR_BTNFACE))),
            }
        }
    }
}

impl Drop for DialogBrushes {
    fn drop(&mut self) {
        unsafe {
            for brush in [self.background, self.separator, self.button_face] {
                if !brush.is_invalid() {
                    let _ = DeleteObject(brush.into());
                }
            }
        }
    }
}

/// WM_CTLCOLORSTATIC answer: transparent text over `brush`.
pub(crate) fn static_color_result(wparam: WPARAM, brush: HBRUSH) -> isize {
    unsafe {
        SetBkMode(HDC(wparam.0 as *mut _), TRANSPARENT);
    }
    brush.0 as isize
}

/// WM_NCHITTEST answer that refuses border resizing; `None` lets the
/// dialog manager apply its default.
pub(crate) fn refuse_sizing_hit_test(hdlg: HWND, wparam: WPARAM, lparam: LPARAM) -> Option<isize> {
    let LRESULT(code) = unsafe { DefWindowProcW(hdlg, WM_NCHITTEST, wparam, lparam) };
    is_sizing_hit_test(code).then_some(1)
}

unsafe extern "system" fn note_font_found(
    _logfont: *const LOGFONTW,
    _metrics: *const TEXTMETRICW,
    _font_type: u32,
    lparam: LPARAM,
) -> i32 {
    unsafe {
        *(lparam.0 as *mut bool) = true;
    }
    0
}

/// True when a font family called `face` is installed.
pub(crate) fn font_installed(face: &str) -> bool {
    let mut logfont = LOGFONTW {
        lfCharSet: DEFAULT_CHARSET,
        ..Default::default()
    };
    let wide: Vec<u16> = face.encode_utf16().collect();
    if wide.len() >= logfont.lfFaceName.len() {
        return false;
    }
    logfont.lfFaceName[..wide.len()].copy_from_slice(&wide);

    let mut found = false;
    unsafe {
        let hdc = GetDC(None);
        if hdc.is_invalid() {
            return false;
        }
        EnumFontFamiliesExW(
            hdc,
            &logfont,
            Some(note_font_found),
            LPARAM(&mut found as *mut bool as isize),
            0,
        );
        ReleaseDC(None, hdc);
    }
    found
}

/*
 * Dialog procedures receive their per-invocation state as the init parameter
 * of WM_INITDIALOG. The pointer is parked in GWLP_USERDATA and stays valid
 * until the modal loop returns, because the state lives on the caller's
 * stack frame for the whole DialogBoxIndirectParamW call.
 *
 * A procedure can be re-entered while one of its own handlers is still
 * running: a nested modal loop (the "more information" dialog) keeps
 * delivering paint and hit-test messages to the parent. The state is
 * therefore only ever handed out shared, and whatever a handler writes
 * after WM_INITDIALOG lives in a `Cell` or `OnceCell`.
 */
pub(crate) fn attach_dialog_state(hdlg: HWND, lparam: LPARAM) {
    unsafe {
        SetWindowLongPtrW(hdlg, GWLP_USERDATA, lparam.0);
    }
}

/// # Safety
/// `T` must be the type whose address was passed to `attach_dialog_state`.
pub(crate) unsafe fn dialog_state<'a, T>(hdlg: HWND) -> Option<&'a T> {
    let ptr = unsafe { GetWindowLongPtrW(hdlg, GWLP_USERDATA) } as *const T;
    unsafe { ptr.as_ref() }
}

pub(crate) fn end_dialog(hdlg: HWND, result: i32) {
    if let Err(err) = unsafe { EndDialog(hdlg, result as isize) } {
        log::warn!("WindowCommon: EndDialog failed for {hdlg:?}: {err}");
    }
}

pub(crate) fn set_system_icon(hctrl: Option<HWND>, icon: PCWSTR) {
    let Some(hctrl) = hctrl else {
        return;
    };
    match unsafe { LoadIconW(None, icon) } {
        Ok(hicon) => unsafe {
            if SendMessageW(hctrl, STM_SETICON, Some(WPARAM(hicon.0 as usize)), None).0 == 0 {
                log::debug!("WindowCommon: Control {hctrl:?} had no previous icon");
            }
        },
        Err(err) => log::warn!("WindowCommon: Could not load dialog icon: {err}"),
    }
}

/// Stretches button `id` to `target` pixels high, keeping it centred on its row.
pub(crate) fn resize_button_height(hdlg: HWND, id: ControlId, target: i32) {
    let Some(hctrl) = dialog_item(hdlg, id) else {
        return;
    };
    let rc = rect_in_dialog(hdlg, hctrl);
    let Some((shift, height)) = button_height_adjustment(rc.bottom - rc.top, target) else {
        return;
    };
    unsafe {
        let previous = GetWindow(hctrl, GW_HWNDPREV).ok();
        if let Err(err) = SetWindowPos(
            hctrl,
            previous,
            rc.left,
            rc.top - shift,
            rc.right - rc.left,
            height,
            SET_WINDOW_POS_FLAGS(0),
        ) {
            log::warn!("WindowCommon: Could not resize button {}: {err}", id.raw());
        }
    }
}

/// Small and large title bar icons loaded from the dialog's module.
struct TitleBarIcons {
    small: Option<HICON>,
    big: Option<HICON>,
}

impl TitleBarIcons {
    fn load(hdlg: HWND, icon_id: u16, scale: f32) -> Self {
        let module = unsafe { GetWindowLongPtrW(hdlg, GWLP_HINSTANCE) };
        let instance = HINSTANCE(module as *mut std::ffi::c_void);
        let small_size = icon_resource_size(unsafe { GetSystemMetrics(SM_CXSMICON) });
        let big_size = icon_resource_size((32.0 * scale) as i32);
        let load = |size: i32, which: u32| {
            // MAKEINTRESOURCE
            let name = PCWSTR(icon_id as usize as *const u16);
            match unsafe { LoadImageW(Some(instance), name, IMAGE_ICON, size, size, IMAGE_FLAGS(0)) } {
                Ok(handle) => {
                    let hicon = HICON(handle.0);
                    unsafe {
                        SendMessageW(
                            hdlg,
                            WM_SETICON,
                            Some(WPARAM(which as usize)),
                            Some(LPARAM(hicon.0 as isize)),
                        );
                    }
                    Some(hicon)
                }
                Err(err) => {
                    log::debug!("WindowCommon: No {size}px title bar icon {icon_id}: {err}");
                    None
                }
            }
        };
        Self {
            small: load(small_size, ICON_SMALL),
            big: load(big_size, ICON_BIG),
        }
    }
}

impl Drop for TitleBarIcons {
    fn drop(&mut self) {
        for hicon in [self.small.take(), self.big.take()].into_iter().flatten() {
            unsafe {
                let _ = DestroyIcon(hicon);
            }
        }
    }
}

/// Font, brushes and title bar icons shared by the notification, selection
/// and list dialogs. Lives until the modal loop has destroyed the dialog.
pub(crate) struct DialogChrome {
    font: Option<MessageFont>,
    brushes: DialogBrushes,
    _icons: Option<TitleBarIcons>,
}

impl DialogChrome {
    /// Applies the message font to the dialog and `controls`.
    pub(crate) fn new(hdlg: HWND, controls: &[Option<HWND>]) -> Self {
        let font = match MessageFont::system() {
            Ok(font) => {
                font.apply(Some(hdlg));
                for control in controls {
                    font.apply(*control);
                }
                Some(font)
            }
            Err(err) => {
                log::warn!("WindowCommon: Keeping template font: {err}");
                None
            }
        };
        Self {
            font,
            brushes: DialogBrushes::new(),
            _icons: None,
        }
    }

    /// Shows the application icon `icon_id` in the dialog's title bar.
    pub(crate) fn set_title_bar_icon(&mut self, hdlg: HWND, icon_id: Option<u16>, scale: f32) {
        self._icons = icon_id.map(|id| TitleBarIcons::load(hdlg, id, scale));
    }

    /// (needed, current) height of `hctrl` once it shows `text`.
    pub(crate) fn text_heights(&self, hctrl: HWND, text: &str) -> Option<(i32, i32)> {
        let font = self.font.as_ref()?.handle();
        let mut rc = RECT::default();
        unsafe { GetWindowRect(hctrl, &mut rc) }.ok()?;
        let needed = wrapped_text_height(hctrl, font, text)?;
        Some((needed, rc.bottom - rc.top))
    }

    /*
     * WM_CTLCOLORSTATIC: the separator line and the checkbox keep their own
     * brushes, everything else is painted with the window background.
     */
    pub(crate) fn static_color(
        &self,
        wparam: WPARAM,
        lparam: LPARAM,
        separator: Option<HWND>,
        button_face: Option<HWND>,
    ) -> isize {
        let control = Some(HWND(lparam.0 as *mut std::ffi::c_void));
        let brush = if control == separator {
            self.brushes.separator
        } else if button_face.is_some() && control == button_face {
            self.brushes.button_face
        } else {
            self.brushes.background
        };
        static_color_result(wparam, brush)
    }
}
