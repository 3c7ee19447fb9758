/*
 * Windows pieces of the download availability check: the WinINet probe run
 * on the worker, the sink that posts the outcome back to the main window,
 * the PowerShell prerequisite read from the registry, and the UI-thread
 * handler that turns the select button into a split button once the download
 * script is known to be reachable.
 */
use crate::reachability::{Probe, ResultSink};
use crate::registry_settings::read_dword;
use crate::window_common::WM_APP_DOWNLOAD_CHECK_RESULT;

use std::ffi::c_void;
use windows::Win32::Foundation::{HWND, LPARAM, WPARAM};
use windows::Win32::Graphics::Gdi::{InvalidateRect, RDW_ALLCHILDREN, RDW_UPDATENOW, RedrawWindow};
use windows::Win32::Networking::WinInet::{
    HTTP_QUERY_FLAG_NUMBER, HTTP_QUERY_STATUS_CODE, HttpQueryInfoW, INTERNET_FLAG_NO_CACHE_WRITE,
    INTERNET_FLAG_NO_COOKIES, INTERNET_FLAG_NO_UI, INTERNET_FLAG_RELOAD,
    INTERNET_OPEN_TYPE_PRECONFIG, InternetCloseHandle, InternetOpenUrlW, InternetOpenW,
};
use windows::Win32::System::Registry::HKEY_LOCAL_MACHINE;
use windows::Win32::UI::WindowsAndMessaging::{
    BS_SPLITBUTTON, GWL_STYLE, GetWindowLongPtrW, PostMessageW, SetWindowLongPtrW,
};
use windows::core::HSTRING;

const HTTP_STATUS_OK: u32 = 200;
const POWERSHELL_INSTALL_KEYS: [&str; 2] = [
    "Software\\Microsoft\\PowerShell\\1",
    "Software\\Microsoft\\PowerShell\\3",
];

struct InternetHandle(*mut c_void);

impl InternetHandle {
    fn new(raw: *mut c_void) -> Option<Self> {
        (!raw.is_null()).then_some(Self(raw))
    }
}

impl Drop for InternetHandle {
    fn drop(&mut self) {
        unsafe {
            let _ = InternetCloseHandle(self.0);
        }
    }
}

/// Probes a URL with a plain WinINet GET and accepts an HTTP 200 answer.
pub(crate) struct WinInetProbe {
    agent: String,
}

impl WinInetProbe {
    pub(crate) fn new(agent: impl Into<String>) -> Self {
        Self {
            agent: agent.into(),
        }
    }
}

impl Probe for WinInetProbe {
    fn is_reachable(&self, url: &str) -> bool {
        let session = unsafe {
            InternetOpenW(
                &HSTRING::from(self.agent.as_str()),
                INTERNET_OPEN_TYPE_PRECONFIG,
                None,
                None,
                0,
            )
        };
        let Some(session) = InternetHandle::new(session) else {
            log::warn!("DownloadCheckHandler: InternetOpenW failed");
            return false;
        };

        let flags = INTERNET_FLAG_NO_CACHE_WRITE
            | INTERNET_FLAG_NO_COOKIES
            | INTERNET_FLAG_NO_UI
            | INTERNET_FLAG_RELOAD;
        let request =
            unsafe { InternetOpenUrlW(session.0, &HSTRING::from(url), None, flags, 0) };
        let Some(request) = InternetHandle::new(request) else {
            log::info!("DownloadCheckHandler: Could not open {url}");
            return false;
        };

        let mut status: u32 = 0;
        let mut size = std::mem::size_of::<u32>() as u32;
        let queried = unsafe {
            HttpQueryInfoW(
                request.0,
                HTTP_QUERY_STATUS_CODE | HTTP_QUERY_FLAG_NUMBER,
                Some(&mut status as *mut u32 as *mut c_void),
                &mut size,
                None,
            )
        };
        match queried {
            Ok(()) => status == HTTP_STATUS_OK,
            Err(err) => {
                log::info!("DownloadCheckHandler: No HTTP status for {url}: {err}");
                false
            }
        }
    }
}

/// Posts the outcome to the main window as `WM_APP_DOWNLOAD_CHECK_RESULT`.
pub(crate) struct PostMessageSink {
    // Raw handle value; HWND itself is not Send.
    hwnd: isize,
}

impl PostMessageSink {
    pub(crate) fn new(hwnd: HWND) -> Self {
        Self {
            hwnd: hwnd.0 as isize,
        }
    }
}

impl ResultSink for PostMessageSink {
    fn deliver(&self, available: bool) {
        let hwnd = HWND(self.hwnd as *mut c_void);
        if let Err(err) = unsafe {
            PostMessageW(
                Some(hwnd),
                WM_APP_DOWNLOAD_CHECK_RESULT,
                WPARAM(usize::from(available)),
                LPARAM(0),
            )
        } {
            log::error!("DownloadCheckHandler: Could not post check result: {err}");
        }
    }
}

/// True when a PowerShell version able to run the download script is installed.
pub(crate) fn powershell_installed() -> bool {
    POWERSHELL_INSTALL_KEYS
        .iter()
        .any(|key| read_dword(HKEY_LOCAL_MACHINE, key, "Install").is_some_and(|v| v > 0))
}

/*
 * Handles WM_APP_DOWNLOAD_CHECK_RESULT on the UI thread. When the script is
 * reachable the button gains the split-button style and is redrawn.
 */
pub(crate) fn apply_download_check_result(button: Option<HWND>, wparam: WPARAM) -> bool {
    let available = wparam.0 != 0;
    if !available {
        log::debug!("DownloadCheckHandler: Download script not reachable, button unchanged");
        return false;
    }
    let Some(button) = button else {
        log::warn!("DownloadCheckHandler: Target button not found");
        return false;
    };
    unsafe {
        let style = GetWindowLongPtrW(button, GWL_STYLE);
        SetWindowLongPtrW(button, GWL_STYLE, with_split_button(style));
        let _ = RedrawWindow(Some(button), None, None, RDW_ALLCHILDREN | RDW_UPDATENOW);
        let _ = InvalidateRect(Some(button), None, true);
    }
    log::info!("DownloadCheckHandler: Download feature enabled");
    true
}

fn with_split_button(style: isize) -> isize {
    style | BS_SPLITBUTTON as isize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_button_bit_is_added_without_clearing_others() {
        let style = 0x5001_0000isize;
        let patched = with_split_button(style);
        assert_eq!(patched & style, style);
        assert_ne!(patched & BS_SPLITBUTTON as isize, 0);
    }

    #[test]
    fn unavailable_result_leaves_button_alone() {
        assert!(!apply_download_check_result(None, WPARAM(0)));
    }
}
