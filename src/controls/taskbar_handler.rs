/*
 * Progress reporting on the taskbar button of the host window through the
 * shell's ITaskbarList3 interface. When the interface cannot be created (no
 * shell, COM not initialized on this thread) the object stays inert and every
 * call reports `false`.
 */
use crate::error::{PlatformError, Result as PlatformResult};
use crate::types::TaskbarState;

use windows::Win32::Foundation::HWND;
use windows::Win32::System::Com::{CLSCTX_ALL, CoCreateInstance};
use windows::Win32::UI::Shell::{
    ITaskbarList3, TBPF_ERROR, TBPF_INDETERMINATE, TBPF_NOPROGRESS, TBPF_NORMAL, TBPF_PAUSED,
    TBPFLAG, TaskbarList,
};

pub struct TaskbarProgress {
    hwnd: HWND,
    taskbar_list: Option<ITaskbarList3>,
}

impl TaskbarProgress {
    /// Connects to the shell taskbar; inert when that is not possible.
    pub fn new(hwnd: HWND) -> Self {
        Self::try_new(hwnd).unwrap_or_else(|err| {
            log::warn!("TaskbarHandler: Taskbar progress unavailable: {err}");
            Self {
                hwnd,
                taskbar_list: None,
            }
        })
    }

    pub fn try_new(hwnd: HWND) -> PlatformResult<Self> {
        let list: ITaskbarList3 = unsafe { CoCreateInstance(&TaskbarList, None, CLSCTX_ALL) }
            .map_err(|err| init_failed("CoCreateInstance(TaskbarList)", err))?;
        unsafe { list.HrInit() }.map_err(|err| init_failed("ITaskbarList3::HrInit", err))?;
        Ok(Self {
            hwnd,
            taskbar_list: Some(list),
        })
    }

    pub fn is_available(&self) -> bool {
        self.taskbar_list.is_some()
    }

    pub fn set_state(&self, state: TaskbarState) -> bool {
        let Some(list) = &self.taskbar_list else {
            return false;
        };
        match unsafe { list.SetProgressState(self.hwnd, progress_flag(state)) } {
            Ok(()) => true,
            Err(err) => {
                log::debug!("TaskbarHandler: SetProgressState({state:?}) failed: {err}");
                false
            }
        }
    }

    pub fn set_value(&self, completed: u64, total: u64) -> bool {
        let Some(list) = &self.taskbar_list else {
            return false;
        };
        let (completed, total) = capped_progress(completed, total);
        match unsafe { list.SetProgressValue(self.hwnd, completed, total) } {
            Ok(()) => true,
            Err(err) => {
                log::debug!("TaskbarHandler: SetProgressValue({completed}/{total}) failed: {err}");
                false
            }
        }
    }
}

fn init_failed(step: &str, err: windows::core::Error) -> PlatformError {
    PlatformError::InitializationFailed(format!("{step}: {} ({:?})", err.message(), err.code()))
}

fn progress_flag(state: TaskbarState) -> TBPFLAG {
    match state {
        TaskbarState::NoProgress => TBPF_NOPROGRESS,
        TaskbarState::Indeterminate => TBPF_INDETERMINATE,
        TaskbarState::Normal => TBPF_NORMAL,
        TaskbarState::Error => TBPF_ERROR,
        TaskbarState::Paused => TBPF_PAUSED,
    }
}

fn capped_progress(completed: u64, total: u64) -> (u64, u64) {
    (completed.min(total), total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use windows::Win32::Foundation::E_NOINTERFACE;

    #[test]
    fn shell_failures_report_initialization_errors() {
        let err = init_failed(
            "ITaskbarList3::HrInit",
            windows::core::Error::from_hresult(E_NOINTERFACE),
        );
        assert!(matches!(
            &err,
            PlatformError::InitializationFailed(detail) if detail.starts_with("ITaskbarList3::HrInit: ")
        ));
    }

    #[test]
    fn states_map_to_distinct_flags() {
        assert_eq!(progress_flag(TaskbarState::NoProgress), TBPF_NOPROGRESS);
        assert_eq!(progress_flag(TaskbarState::Paused), TBPF_PAUSED);
        assert_ne!(
            progress_flag(TaskbarState::Normal),
            progress_flag(TaskbarState::Error)
        );
    }

    #[test]
    fn completed_never_exceeds_total() {
        assert_eq!(capped_progress(150, 100), (100, 100));
        assert_eq!(capped_progress(42, 100), (42, 100));
    }
}
