pub(crate) mod checkbox_handler;
pub(crate) mod download_check_handler;
pub(crate) mod list_dialog;
pub(crate) mod notification_dialog;
pub(crate) mod selection_dialog;
pub mod taskbar_handler;
pub(crate) mod tooltip_handler;
