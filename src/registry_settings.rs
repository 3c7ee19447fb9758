/*
 * Registry-backed settings. Boolean settings are stored as REG_DWORD values
 * under HKEY_CURRENT_USER\Software\<application>, the layout the disk imaging
 * tool has always used, so a "don't display again" choice survives restarts.
 */
use crate::error::{PlatformError, Result as PlatformResult};
use crate::settings::SettingsStore;

use windows::Win32::Foundation::ERROR_SUCCESS;
use windows::Win32::System::Registry::{
    HKEY, HKEY_CURRENT_USER, RRF_RT_REG_DWORD, REG_DWORD, RegGetValueW, RegSetKeyValueW,
};
use windows::core::HSTRING;

/// Reads a REG_DWORD value; `None` when the key or value is missing.
pub(crate) fn read_dword(root: HKEY, subkey: &str, name: &str) -> Option<u32> {
    let mut value: u32 = 0;
    let mut size = std::mem::size_of::<u32>() as u32;
    let status = unsafe {
        RegGetValueW(
            root,
            &HSTRING::from(subkey),
            &HSTRING::from(name),
            RRF_RT_REG_DWORD,
            None,
            Some(&mut value as *mut u32 as *mut std::ffi::c_void),
            Some(&mut size),
        )
    };
    (status == ERROR_SUCCESS).then_some(value)
}

pub struct RegistrySettings {
    subkey: String,
}

impl RegistrySettings {
    pub fn new(application: &str) -> Self {
        Self {
            subkey: format!("Software\\{application}"),
        }
    }
}

impl SettingsStore for RegistrySettings {
    fn read_bool(&self, key: &str) -> bool {
        read_dword(HKEY_CURRENT_USER, &self.subkey, key).is_some_and(|v| v != 0)
    }

    fn write_bool(&self, key: &str, value: bool) -> PlatformResult<()> {
        let data = u32::from(value);
        let status = unsafe {
            RegSetKeyValueW(
                HKEY_CURRENT_USER,
                &HSTRING::from(self.subkey.as_str()),
                &HSTRING::from(key),
                REG_DWORD.0,
                Some(&data as *const u32 as *const std::ffi::c_void),
                std::mem::size_of::<u32>() as u32,
            )
        };
        if status != ERROR_SUCCESS {
            log::error!(
                "RegistrySettings: Could not write {}\\{key}: error {}",
                self.subkey,
                status.0
            );
            return Err(PlatformError::OperationFailed(format!(
                "RegSetKeyValueW failed for {key} with error {}",
                status.0
            )));
        }
        log::debug!("RegistrySettings: {}\\{key} = {data}", self.subkey);
        Ok(())
    }
}
