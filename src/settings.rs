/*
 * Persistent boolean settings written by the dialogs, such as the
 * "don't display this again" choice of a notification. The registry-backed
 * store lives in `registry_settings`; `MemorySettings` serves hosts that keep
 * settings elsewhere and the unit tests.
 */
use crate::error::{PlatformError, Result as PlatformResult};

use std::collections::HashMap;
use std::sync::Mutex;

pub trait SettingsStore {
    /// Missing keys read as `false`.
    fn read_bool(&self, key: &str) -> bool;
    fn write_bool(&self, key: &str, value: bool) -> PlatformResult<()>;
}

#[derive(Debug, Default)]
pub struct MemorySettings {
    values: Mutex<HashMap<String, bool>>,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemorySettings {
    fn read_bool(&self, key: &str) -> bool {
        self.values
            .lock()
            .map(|values| values.get(key).copied().unwrap_or(false))
            .unwrap_or(false)
    }

    fn write_bool(&self, key: &str, value: bool) -> PlatformResult<()> {
        let mut values = self.values.lock().map_err(|_| {
            PlatformError::OperationFailed("settings lock poisoned".to_string())
        })?;
        log::debug!("MemorySettings: {key} = {value}");
        values.insert(key.to_string(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_reads_false_and_written_value_sticks() {
        let settings = MemorySettings::new();
        assert!(!settings.read_bool("DisableSecureBootNotice"));
        settings.write_bool("DisableSecureBootNotice", true).unwrap();
        assert!(settings.read_bool("DisableSecureBootNotice"));
        settings.write_bool("DisableSecureBootNotice", false).unwrap();
        assert!(!settings.read_bool("DisableSecureBootNotice"));
    }
}
