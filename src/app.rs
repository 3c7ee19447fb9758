/*
 * `DialogHost` is the entry point the embedding application talks to. It owns
 * everything the dialog layer needs from the host: the module instance the
 * dialog resources live in, the main window that owns the dialogs and
 * receives the download check result, the configuration, the settings store
 * and the per-kind modal slots. Each dialog invocation builds its own state
 * object on the stack and hands its address to the dialog procedure through
 * the WM_INITDIALOG parameter, so no dialog data outlives the modal loop.
 *
 * The host must be used from the thread that created the main window; the
 * tooltip table it installs is local to that thread. A later host on the same
 * thread replaces that table, and dropping the earlier host leaves it alone.
 */
use crate::config::{DialogConfig, DialogStrings, ResourceIds};
use crate::controls::download_check_handler::{
    PostMessageSink, WinInetProbe, apply_download_check_result, powershell_installed,
};
use crate::controls::list_dialog::{ListState, list_dialog_proc};
use crate::controls::notification_dialog::{
    NotificationState, more_info_dialog_proc, notification_dialog_proc,
};
use crate::controls::selection_dialog::{SelectionState, selection_dialog_proc};
use crate::controls::taskbar_handler::TaskbarProgress;
use crate::controls::tooltip_handler::{
    Win32TooltipBackend, install_registry, remove_registry, with_registry,
};
use crate::dialog_context::ModalSlots;
use crate::dialog_template::{DialogTemplate, TemplateStore, prepare_template};
use crate::error::{PlatformError, Result as PlatformResult};
use crate::reachability::{CheckStart, DownloadCheck};
use crate::registry_settings::RegistrySettings;
use crate::settings::SettingsStore;
use crate::tooltip_registry::RegistryToken;
use crate::types::{
    ControlId, DialogId, DialogKind, ListRequest, NotificationRequest, SelectionOutcome,
    SelectionRequest,
};
use crate::window_common::{
    WM_APP_DOWNLOAD_CHECK_RESULT, dialog_item, font_installed,
};

use std::borrow::Cow;
use windows::Win32::Foundation::{HINSTANCE, HWND, LPARAM, WPARAM};
use windows::Win32::System::LibraryLoader::{
    FindResourceW, LoadResource, LockResource, SizeofResource,
};
use windows::Win32::UI::WindowsAndMessaging::{
    CreateDialogIndirectParamW, DLGPROC, DLGTEMPLATE, DialogBoxIndirectParamW, IDYES, RT_DIALOG,
    SW_NORMAL, ShowWindow,
};
use windows::core::PCWSTR;

/// Dialog templates compiled into a module's resources.
pub struct ModuleResources {
    module: HINSTANCE,
}

impl ModuleResources {
    pub fn new(module: HINSTANCE) -> Self {
        Self { module }
    }
}

impl TemplateStore for ModuleResources {
    fn lookup(&self, id: DialogId) -> Option<Cow<'_, [u8]>> {
        // MAKEINTRESOURCE
        let name = PCWSTR(id.raw() as usize as *const u16);
        unsafe {
            let resource = FindResourceW(Some(self.module.into()), name, RT_DIALOG);
            if resource.is_invalid() {
                return None;
            }
            let size = SizeofResource(Some(self.module.into()), resource) as usize;
            let global = LoadResource(Some(self.module.into()), resource).ok()?;
            let data = LockResource(global) as *const u8;
            if data.is_null() || size == 0 {
                return None;
            }
            // Resource memory stays mapped for the lifetime of the module.
            Some(Cow::Borrowed(std::slice::from_raw_parts(data, size)))
        }
    }
}

pub struct DialogHost {
    instance: HINSTANCE,
    main_window: HWND,
    config: DialogConfig,
    ids: ResourceIds,
    strings: DialogStrings,
    settings: Box<dyn SettingsStore>,
    templates: Box<dyn TemplateStore>,
    slots: ModalSlots,
    download_check: DownloadCheck,
    taskbar: TaskbarProgress,
    tooltips: RegistryToken,
    application: String,
}

impl DialogHost {
    /*
     * Creates a host with default configuration, templates read from the
     * resources of `instance` and settings stored under
     * HKCU\Software\<application>.
     */
    pub fn new(instance: HINSTANCE, main_window: HWND, application: &str) -> Self {
        let config = DialogConfig::default();
        let tooltips = install_registry(Win32TooltipBackend::new(
            main_window,
            instance,
            config.right_to_left,
            config.scaled(config.tooltip_max_width),
        ));
        log::debug!("DialogHost: Created for main window {main_window:?}");

        Self {
            instance,
            main_window,
            download_check: DownloadCheck::new(config.download_url_prefix.clone()),
            config,
            ids: ResourceIds::default(),
            strings: DialogStrings::default(),
            settings: Box::new(RegistrySettings::new(application)),
            templates: Box::new(ModuleResources::new(instance)),
            slots: ModalSlots::new(),
            taskbar: TaskbarProgress::new(main_window),
            tooltips,
            application: application.to_string(),
        }
    }

    /// Replaces the configuration. Tooltips created so far are released.
    pub fn with_config(mut self, config: DialogConfig) -> Self {
        self.tooltips = install_registry(Win32TooltipBackend::new(
            self.main_window,
            self.instance,
            config.right_to_left,
            config.scaled(config.tooltip_max_width),
        ));
        self.download_check = DownloadCheck::new(config.download_url_prefix.clone());
        self.config = config;
        self
    }

    pub fn with_resource_ids(mut self, ids: ResourceIds) -> Self {
        self.ids = ids;
        self
    }

    pub fn with_strings(mut self, strings: DialogStrings) -> Self {
        self.strings = strings;
        self
    }

    pub fn with_settings(mut self, settings: Box<dyn SettingsStore>) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_templates(mut self, templates: Box<dyn TemplateStore>) -> Self {
        self.templates = templates;
        self
    }

    pub fn config(&self) -> &DialogConfig {
        &self.config
    }

    pub fn settings(&self) -> &dyn SettingsStore {
        self.settings.as_ref()
    }

    pub fn taskbar(&self) -> &TaskbarProgress {
        &self.taskbar
    }

    /// Loads template `id` and patches it for the current layout and font.
    pub fn prepare_template(&self, id: DialogId) -> PlatformResult<DialogTemplate> {
        let symbol_font_available = self.config.uses_symbol_font_locale()
            && font_installed(&self.config.preferred_font);
        prepare_template(self.templates.as_ref(), id, &self.config, symbol_font_available)
    }

    /*
     * Runs template `id` modally under `owner`. The main window is restored
     * first so that a minimized application can show the dialog.
     */
    pub fn dialog_box(
        &self,
        id: DialogId,
        owner: HWND,
        dialog_proc: DLGPROC,
        init_param: isize,
    ) -> PlatformResult<isize> {
        let template = self.prepare_template(id)?;
        let words = template.to_aligned_words();
        unsafe {
            let _ = ShowWindow(self.main_window, SW_NORMAL);
        }
        let result = unsafe {
            DialogBoxIndirectParamW(
                Some(self.instance),
                words.as_ptr() as *const DLGTEMPLATE,
                Some(owner),
                dialog_proc,
                LPARAM(init_param),
            )
        };
        match result {
            -1 => {
                let err = windows::core::Error::from_thread();
                log::error!("DialogHost: DialogBoxIndirectParamW failed for dialog {}: {err}", id.raw());
                Err(err.into())
            }
            0 => Err(PlatformError::InvalidHandle(format!(
                "owner {owner:?} of dialog {} is not a window",
                id.raw()
            ))),
            result => Ok(result),
        }
    }

    /// Creates template `id` as a modeless dialog owned by `owner`.
    pub fn create_dialog(
        &self,
        id: DialogId,
        owner: HWND,
        dialog_proc: DLGPROC,
        init_param: isize,
    ) -> PlatformResult<HWND> {
        let template = self.prepare_template(id)?;
        let words = template.to_aligned_words();
        let hwnd = unsafe {
            CreateDialogIndirectParamW(
                Some(self.instance),
                words.as_ptr() as *const DLGTEMPLATE,
                Some(owner),
                dialog_proc,
                LPARAM(init_param),
            )?
        };
        log::debug!("DialogHost: Created modeless dialog {} as {hwnd:?}", id.raw());
        Ok(hwnd)
    }

    /// Shows a notification; `true` iff the user answered Yes.
    pub fn notification(&self, request: NotificationRequest) -> PlatformResult<bool> {
        let _guard = self.slots.acquire(DialogKind::Notification)?;
        let show_more_info = |owner: HWND, id: DialogId| {
            if let Err(err) = self.dialog_box(id, owner, Some(more_info_dialog_proc), 0) {
                log::warn!("DialogHost: Could not show more information dialog {}: {err}", id.raw());
            }
        };
        let state = NotificationState::new(
            &request,
            &self.ids,
            &self.strings,
            &self.config,
            self.settings.as_ref(),
            &show_more_info,
        );
        let result = self.dialog_box(
            self.ids.notification_dialog,
            self.main_window,
            Some(notification_dialog_proc),
            &state as *const NotificationState as isize,
        )?;
        Ok(result == IDYES.0 as isize)
    }

    /// Shows a selection; `None` when cancelled.
    pub fn selection(&self, request: SelectionRequest) -> PlatformResult<Option<SelectionOutcome>> {
        let _guard = self.slots.acquire(DialogKind::Selection)?;
        let state = SelectionState::new(&request, &self.ids, &self.strings, &self.config);
        self.dialog_box(
            self.ids.selection_dialog,
            self.main_window,
            Some(selection_dialog_proc),
            &state as *const SelectionState as isize,
        )?;
        Ok(state.take_outcome())
    }

    pub fn list(&self, request: ListRequest) -> PlatformResult<()> {
        let _guard = self.slots.acquire(DialogKind::List)?;
        let state = ListState::new(&request, &self.ids, &self.strings, &self.config);
        self.dialog_box(
            self.ids.list_dialog,
            self.main_window,
            Some(list_dialog_proc),
            &state as *const ListState as isize,
        )?;
        Ok(())
    }

    /// Attaches a tooltip to `control`; `duration_ms` of -1 keeps the system delay.
    pub fn create_tooltip(&self, control: HWND, text: &str, duration_ms: i32) -> bool {
        with_registry(|registry| registry.attach(control, text, duration_ms)).unwrap_or(false)
    }

    pub fn destroy_tooltip(&self, control: HWND) -> bool {
        with_registry(|registry| registry.detach(control)).unwrap_or(false)
    }

    pub fn destroy_all_tooltips(&self) -> usize {
        with_registry(|registry| registry.detach_all()).unwrap_or(0)
    }

    /*
     * Starts the background check of the download script. The result comes
     * back as WM_APP_DOWNLOAD_CHECK_RESULT on the main window, to be passed
     * to `handle_download_check_result`.
     */
    pub fn start_download_check(&self, url: &str) -> PlatformResult<CheckStart> {
        if !powershell_installed() {
            log::info!(
                "DialogHost: The download feature has been deactivated because a compatible PowerShell version was not detected"
            );
            return Ok(CheckStart::PrerequisiteMissing);
        }
        self.download_check.trigger(
            url,
            WinInetProbe::new(self.application.as_str()),
            PostMessageSink::new(self.main_window),
        )
    }

    pub fn is_download_check_result(msg: u32) -> bool {
        msg == WM_APP_DOWNLOAD_CHECK_RESULT
    }

    /// Applies a posted check result to the main window button `target`.
    pub fn handle_download_check_result(&self, target: ControlId, wparam: WPARAM) -> bool {
        apply_download_check_result(dialog_item(self.main_window, target), wparam)
    }
}

impl Drop for DialogHost {
    fn drop(&mut self) {
        remove_registry(self.tooltips);
    }
}
