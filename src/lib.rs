/*
 * Public entry point of the imagedlg crate: the Win32 dialog layer of a disk
 * imaging utility. It covers control tooltips, dialog template patching for
 * right-to-left layout and font substitution, the notification, selection and
 * list message dialogs, taskbar progress and the background check that enables
 * the image download feature.
 *
 * Everything that does not need a window handle (the tooltip table, the
 * template patcher, layout arithmetic, mask readback, the background check
 * state machine, settings) is portable so it compiles and is tested on every
 * platform. The Win32 glue is only built for Windows.
 */
#[cfg(target_os = "windows")]
pub mod app;
pub mod config;
#[cfg(target_os = "windows")]
pub(crate) mod controls;
pub mod dialog_context;
pub mod dialog_template;
pub mod error;
pub mod message_handler;
pub mod reachability;
#[cfg(target_os = "windows")]
pub mod registry_settings;
pub mod settings;
pub mod tooltip_registry;
pub mod types;
#[cfg(target_os = "windows")]
pub(crate) mod window_common;

#[cfg(target_os = "windows")]
pub use app::{DialogHost, ModuleResources};
pub use config::{
    DialogConfig, DialogStrings, MAX_LIST_ITEMS, MAX_SELECTION_CHOICES, MAX_TOOLTIPS, ResourceIds,
};
#[cfg(target_os = "windows")]
pub use controls::taskbar_handler::TaskbarProgress;
pub use dialog_context::{ModalGuard, ModalSlots};
pub use dialog_template::{DialogTemplate, FontPatch, FontPolicy, TemplateStore};
pub use error::{PlatformError, Result as PlatformResult};
pub use message_handler::{Chain, Disposition, Forwarder, MessageHandler, WindowMessage};
pub use reachability::{CheckStart, DownloadCheck, Probe, ResultSink};
#[cfg(target_os = "windows")]
pub use registry_settings::RegistrySettings;
pub use settings::{MemorySettings, SettingsStore};
pub use tooltip_registry::{
    RegistrySlot, RegistryToken, TooltipBackend, TooltipEntry, TooltipRegistry,
};
pub use types::{
    ControlId, DialogId, DialogKind, ListRequest, MoreInfo, NotificationKind,
    NotificationRequest, SelectionOutcome, SelectionRequest, SelectionStyle, TaskbarState,
};
