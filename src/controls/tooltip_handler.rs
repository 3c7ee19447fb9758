/*
 * Win32 side of the tooltip table. Each registered control gets its own
 * `tooltips_class32` popup owned by the host window. The popup is subclassed
 * so that it answers its own TTN_GETDISPINFOW query with the text stored in
 * the registry; the tool is added with LPSTR_TEXTCALLBACKW and never holds a
 * copy of the text.
 *
 * The registry lives in a thread-local slot on the UI thread. The subclass
 * procedure only borrows it with `try_borrow`: creating or destroying a
 * tooltip sends messages to that same procedure while the registry is
 * mutably borrowed, and those messages simply fall through to the previous
 * procedure.
 */

use crate::error::Result as PlatformResult;
use crate::message_handler::{Chain, Disposition, Forwarder, MessageHandler, WindowMessage};
use crate::tooltip_registry::{RegistrySlot, RegistryToken, TooltipBackend, TooltipRegistry};

use std::cell::RefCell;
use windows::Win32::Foundation::{HINSTANCE, HWND, LPARAM, LRESULT, WPARAM};
use windows::Win32::System::Threading::GetCurrentThreadId;
use windows::Win32::UI::Controls::{
    LPSTR_TEXTCALLBACKW, NMHDR, NMTTDISPINFOW, TOOLTIPS_CLASSW, TTDT_AUTOPOP, TTF_CENTERTIP,
    TTF_IDISHWND, TTF_RTLREADING, TTF_SUBCLASS, TTM_ADDTOOLW, TTM_SETDELAYTIME,
    TTM_SETMAXTIPWIDTH, TTN_GETDISPINFOW, TTS_ALWAYSTIP, TTS_NOPREFIX, TTTOOLINFOW, TOOLTIP_FLAGS,
};
use windows::Win32::UI::WindowsAndMessaging::{
    CW_USEDEFAULT, CallWindowProcW, CreateWindowExW, DLGC_BUTTON, DefWindowProcW, DestroyWindow,
    GWLP_USERDATA, GWLP_WNDPROC, GetWindowLongPtrW, IsWindow, SendMessageW, SetWindowLongPtrW,
    WINDOW_EX_STYLE, WINDOW_STYLE, WM_GETDLGCODE, WM_NOTIFY, WNDPROC, WS_EX_LAYOUTRTL, WS_POPUP,
};

// Undocumented tool flag set for tools that are not buttons.
const TTF_NOT_A_BUTTON: u32 = 0x8000_0000;

#[derive(Debug)]
pub(crate) struct Win32Tooltip {
    hwnd: HWND,
}

pub(crate) struct Win32TooltipBackend {
    owner: HWND,
    instance: HINSTANCE,
    right_to_left: bool,
    max_tip_width: i32,
    ui_thread: u32,
}

impl Win32TooltipBackend {
    pub(crate) fn new(owner: HWND, instance: HINSTANCE, right_to_left: bool, max_tip_width: i32) -> Self {
        Self {
            owner,
            instance,
            right_to_left,
            max_tip_width,
            ui_thread: unsafe { GetCurrentThreadId() },
        }
    }
}

impl TooltipBackend for Win32TooltipBackend {
    type Control = HWND;
    type Tip = Win32Tooltip;
    type TipKey = HWND;

    fn is_valid_control(&self, control: HWND) -> bool {
        !control.is_invalid() && unsafe { IsWindow(Some(control)) }.as_bool()
    }

    fn create(&mut self, control: HWND, _text: &[u16], duration_ms: i32) -> PlatformResult<Win32Tooltip> {
        let ex_style = if self.right_to_left {
            WS_EX_LAYOUTRTL
        } else {
            WINDOW_EX_STYLE(0)
        };
        let hwnd_tip = unsafe {
            CreateWindowExW(
                ex_style,
                TOOLTIPS_CLASSW,
                None,
                WS_POPUP | WINDOW_STYLE(TTS_NOPREFIX | TTS_ALWAYSTIP),
                CW_USEDEFAULT,
                CW_USEDEFAULT,
                CW_USEDEFAULT,
                CW_USEDEFAULT,
                Some(self.owner),
                None,
                Some(self.instance),
                None,
            )?
        };

        unsafe {
            #[allow(clippy::fn_to_numeric_cast)]
            let prev = SetWindowLongPtrW(hwnd_tip, GWLP_WNDPROC, tooltip_subclass_proc as isize);
            SetWindowLongPtrW(hwnd_tip, GWLP_USERDATA, prev);

            SendMessageW(
                hwnd_tip,
                TTM_SETDELAYTIME,
                Some(WPARAM(TTDT_AUTOPOP as usize)),
                Some(LPARAM(duration_ms as isize)),
            );
        }

        let dialog_code = unsafe { SendMessageW(control, WM_GETDLGCODE, None, None) };
        let info = TTTOOLINFOW {
            cbSize: std::mem::size_of::<TTTOOLINFOW>() as u32,
            uFlags: tool_flags(self.right_to_left, dialog_code.0 as u32 & DLGC_BUTTON != 0),
            hwnd: hwnd_tip,
            uId: control.0 as usize,
            lpszText: LPSTR_TEXTCALLBACKW,
            ..Default::default()
        };
        unsafe {
            SendMessageW(
                hwnd_tip,
                TTM_ADDTOOLW,
                None,
                Some(LPARAM(&info as *const TTTOOLINFOW as isize)),
            );
        }

        log::debug!("TooltipHandler: Created tooltip {hwnd_tip:?} for control {control:?}");
        Ok(Win32Tooltip { hwnd: hwnd_tip })
    }

    fn destroy(&mut self, tip: Win32Tooltip) {
        if let Err(err) = unsafe { DestroyWindow(tip.hwnd) } {
            log::debug!("TooltipHandler: DestroyWindow failed for tooltip {:?}: {err}", tip.hwnd);
        }
    }

    fn tip_key(tip: &Win32Tooltip) -> HWND {
        tip.hwnd
    }
}

fn tool_flags(right_to_left: bool, is_button: bool) -> TOOLTIP_FLAGS {
    let mut flags = TTF_IDISHWND | TTF_SUBCLASS;
    if right_to_left {
        flags |= TTF_RTLREADING;
    }
    if !is_button {
        flags |= TTF_CENTERTIP | TOOLTIP_FLAGS(TTF_NOT_A_BUTTON);
    }
    flags
}

thread_local! {
    static TOOLTIPS: RefCell<RegistrySlot<Win32TooltipBackend>> = const { RefCell::new(RegistrySlot::new()) };
}

/// Installs a fresh registry for this thread, releasing any previous one.
pub(crate) fn install_registry(backend: Win32TooltipBackend) -> RegistryToken {
    let (token, previous) =
        TOOLTIPS.with(|cell| cell.borrow_mut().install(TooltipRegistry::new(backend)));
    // Dropped outside the borrow so teardown messages reach the subclass proc.
    drop(previous);
    token
}

/// Releases this thread's registry if `token` still owns it.
pub(crate) fn remove_registry(token: RegistryToken) {
    let previous = TOOLTIPS.with(|cell| cell.borrow_mut().remove(token));
    if previous.is_none() {
        log::debug!("TooltipHandler: Registry {token:?} was already replaced");
    }
    drop(previous);
}

/// Runs `f` on this thread's registry; `None` when no registry is installed.
pub(crate) fn with_registry<R>(
    f: impl FnOnce(&mut TooltipRegistry<Win32TooltipBackend>) -> R,
) -> Option<R> {
    TOOLTIPS.with(|cell| match cell.try_borrow_mut() {
        Ok(mut slot) => slot.registry_mut().map(f),
        Err(_) => {
            log::warn!("TooltipHandler: Tooltip registry is busy, request ignored");
            None
        }
    })
}

struct PreviousProc {
    hwnd: HWND,
}

impl Forwarder for PreviousProc {
    fn forward(&mut self, message: &WindowMessage) -> isize {
        let wparam = WPARAM(message.wparam);
        let lparam = LPARAM(message.lparam);
        unsafe {
            let prev = GetWindowLongPtrW(self.hwnd, GWLP_USERDATA);
            let LRESULT(result) = if prev != 0 {
                let prev_proc: WNDPROC = std::mem::transmute(prev);
                CallWindowProcW(prev_proc, self.hwnd, message.msg, wparam, lparam)
            } else {
                DefWindowProcW(self.hwnd, message.msg, wparam, lparam)
            };
            result
        }
    }
}

struct DisplayInfoHandler {
    hwnd: HWND,
}

impl MessageHandler for DisplayInfoHandler {
    fn handle(&mut self, message: &WindowMessage) -> Disposition {
        if message.msg != WM_NOTIFY || message.lparam == 0 {
            return Disposition::Forward;
        }
        let header = unsafe { &*(message.lparam as *const NMHDR) };
        if header.code != TTN_GETDISPINFOW {
            return Disposition::Forward;
        }

        let lookup = TOOLTIPS.with(|cell| {
            let slot = cell.try_borrow().ok()?;
            let registry = slot.registry()?;
            #[cfg(debug_assertions)]
            if registry.backend().ui_thread != unsafe { GetCurrentThreadId() } {
                log::warn!("TooltipHandler: Display info requested off the UI thread");
            }
            let text = registry.text_for_tip(self.hwnd)?;
            Some((text.as_ptr(), registry.backend().max_tip_width))
        });
        let Some((text, max_width)) = lookup else {
            return Disposition::Forward;
        };

        let info = unsafe { &mut *(message.lparam as *mut NMTTDISPINFOW) };
        info.lpszText = windows::core::PWSTR(text as *mut u16);
        info.uFlags &= !TTF_RTLREADING;
        unsafe {
            SendMessageW(
                self.hwnd,
                TTM_SETMAXTIPWIDTH,
                None,
                Some(LPARAM(max_width as isize)),
            );
        }
        Disposition::Handled(0)
    }
}

unsafe extern "system" fn tooltip_subclass_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    let message = WindowMessage::new(msg, wparam.0, lparam.0);
    let mut chain = Chain::new(DisplayInfoHandler { hwnd }, PreviousProc { hwnd });
    LRESULT(chain.dispatch(&message))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_button_tools_are_centered() {
        let flags = tool_flags(false, false);
        assert_ne!(flags.0 & TTF_CENTERTIP.0, 0);
        assert_ne!(flags.0 & TTF_NOT_A_BUTTON, 0);
        assert_eq!(flags.0 & TTF_RTLREADING.0, 0);
    }

    #[test]
    fn button_tools_keep_default_placement_and_rtl_reading() {
        let flags = tool_flags(true, true);
        assert_eq!(flags.0 & TTF_CENTERTIP.0, 0);
        assert_ne!(flags.0 & TTF_RTLREADING.0, 0);
        assert_ne!(flags.0 & (TTF_IDISHWND | TTF_SUBCLASS).0, 0);
    }
}
