//! NVS (Non-Volatile Storage) adapter.
//!
//! Implements [`ConfigPort`] for the receiver.
//!
//! | Key                     | Layout                                  |
//! |-------------------------|-----------------------------------------|
//! | `thermorx::thresholds`  | 4 raw bytes `[min, normal, high, crit]` |
//! | `thermorx::moncfg`      | postcard-encoded [`MonitorConfig`]      |
//!
//! - Validation: thresholds must be ordered and the monitor config must
//!   pass [`MonitorConfig::validate`] before anything is written.
//! - Atomic writes: ESP-IDF NVS commits are atomic per `nvs_commit()`.
//! - On host builds the store is an in-memory map (dev/test only).

use crate::app::ports::{ConfigError, ConfigPort, StorageError};
use crate::config::MonitorConfig;
use crate::thresholds::{BLOB_LEN, Thresholds};
use log::{info, warn};

#[cfg(not(target_os = "espidf"))]
use std::collections::HashMap;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

const NAMESPACE: &str = "thermorx";
const THRESHOLDS_KEY: &str = "thresholds";
const CONFIG_KEY: &str = "moncfg";

/// Upper bound for the encoded monitor config.
const MAX_CONFIG_BLOB: usize = 128;

pub struct NvsAdapter {
    #[cfg(not(target_os = "espidf"))]
    store: std::cell::RefCell<HashMap<String, Vec<u8>>>,
}

impl NvsAdapter {
    /// Create a new NvsAdapter and initialise NVS flash.
    ///
    /// On first boot or after a version mismatch the NVS partition is
    /// erased and re-initialised automatically.
    pub fn new() -> Result<Self, ConfigError> {
        #[cfg(target_os = "espidf")]
        {
            // SAFETY: nvs_flash_init / nvs_flash_erase are called from the
            // single main-task context before any other NVS access.
            let ret = unsafe { nvs_flash_init() };
            if ret == ESP_ERR_NVS_NO_FREE_PAGES || ret == ESP_ERR_NVS_NEW_VERSION_FOUND {
                warn!("NVS: erasing and re-initialising flash partition");
                if unsafe { nvs_flash_erase() } != ESP_OK {
                    return Err(ConfigError::IoError);
                }
                if unsafe { nvs_flash_init() } != ESP_OK {
                    return Err(ConfigError::IoError);
                }
            } else if ret != ESP_OK {
                return Err(ConfigError::IoError);
            }
            info!("NvsAdapter: ESP-IDF NVS initialised");
        }

        #[cfg(not(target_os = "espidf"))]
        info!("NvsAdapter: simulation backend");

        Ok(Self {
            #[cfg(not(target_os = "espidf"))]
            store: std::cell::RefCell::new(HashMap::new()),
        })
    }

    #[cfg(not(target_os = "espidf"))]
    fn composite_key(namespace: &str, key: &str) -> String {
        format!("{}::{}", namespace, key)
    }

    /// NVS wants NUL-terminated names of at most 15 characters.
    #[cfg(target_os = "espidf")]
    fn c_name(name: &str) -> [u8; 16] {
        let mut buf = [0u8; 16];
        let bytes = name.as_bytes();
        let len = bytes.len().min(15);
        buf[..len].copy_from_slice(&bytes[..len]);
        buf
    }

    /// Open an NVS namespace, execute a closure with the handle, then close.
    #[cfg(target_os = "espidf")]
    fn with_nvs_handle<F, T>(namespace: &str, write: bool, f: F) -> Result<T, i32>
    where
        F: FnOnce(nvs_handle_t) -> Result<T, i32>,
    {
        let ns = Self::c_name(namespace);
        let mut handle: nvs_handle_t = 0;
        let mode = if write {
            nvs_open_mode_t_NVS_READWRITE
        } else {
            nvs_open_mode_t_NVS_READONLY
        };

        let ret = unsafe { nvs_open(ns.as_ptr() as *const _, mode, &mut handle) };
        if ret != ESP_OK {
            return Err(ret);
        }

        let result = f(handle);
        unsafe {
            nvs_close(handle);
        }
        result
    }

    // ── Blob primitives ────────────────────────────────────────

    fn get_blob(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError> {
        #[cfg(not(target_os = "espidf"))]
        {
            let composite = Self::composite_key(namespace, key);
            match self.store.borrow().get(&composite) {
                Some(data) if data.len() > buf.len() => Err(StorageError::BufferTooSmall),
                Some(data) => {
                    buf[..data.len()].copy_from_slice(data);
                    Ok(data.len())
                }
                None => Err(StorageError::NotFound),
            }
        }

        #[cfg(target_os = "espidf")]
        {
            let result = Self::with_nvs_handle(namespace, false, |handle| {
                let key_buf = Self::c_name(key);
                let mut size = buf.len();
                let ret = unsafe {
                    nvs_get_blob(
                        handle,
                        key_buf.as_ptr() as *const _,
                        buf.as_mut_ptr() as *mut _,
                        &mut size,
                    )
                };
                if ret != ESP_OK {
                    return Err(ret);
                }
                Ok(size)
            });
            match result {
                Ok(size) => Ok(size),
                Err(e) if e == ESP_ERR_NVS_NOT_FOUND => Err(StorageError::NotFound),
                Err(e) if e == ESP_ERR_NVS_INVALID_LENGTH => Err(StorageError::BufferTooSmall),
                Err(_) => Err(StorageError::IoError),
            }
        }
    }

    fn set_blob(&self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError> {
        #[cfg(not(target_os = "espidf"))]
        {
            let composite = Self::composite_key(namespace, key);
            self.store.borrow_mut().insert(composite, data.to_vec());
            Ok(())
        }

        #[cfg(target_os = "espidf")]
        {
            let result = Self::with_nvs_handle(namespace, true, |handle| {
                let key_buf = Self::c_name(key);
                let ret = unsafe {
                    nvs_set_blob(
                        handle,
                        key_buf.as_ptr() as *const _,
                        data.as_ptr() as *const _,
                        data.len(),
                    )
                };
                if ret != ESP_OK {
                    return Err(ret);
                }
                let ret = unsafe { nvs_commit(handle) };
                if ret != ESP_OK {
                    return Err(ret);
                }
                Ok(())
            });
            result.map_err(|e| {
                warn!("NvsAdapter: NVS write error {}", e);
                if e == ESP_ERR_NVS_NOT_ENOUGH_SPACE {
                    StorageError::Full
                } else {
                    StorageError::IoError
                }
            })
        }
    }
}

impl NvsAdapter {
    /// Store raw bytes under a config key, bypassing validation.
    ///
    /// Used to plant damaged or foreign blobs for decode tests.
    #[doc(hidden)]
    pub fn write_raw(&self, key: &str, data: &[u8]) -> Result<(), ConfigError> {
        Ok(self.set_blob(NAMESPACE, key, data)?)
    }

    #[cfg(all(test, not(target_os = "espidf")))]
    fn has_key(&self, key: &str) -> bool {
        self.store
            .borrow()
            .contains_key(&Self::composite_key(NAMESPACE, key))
    }
}

impl ConfigPort for NvsAdapter {
    fn load_thresholds(&self) -> Result<Thresholds, ConfigError> {
        let mut buf = [0u8; BLOB_LEN];
        match self.get_blob(NAMESPACE, THRESHOLDS_KEY, &mut buf) {
            Ok(len) => {
                let thresholds = Thresholds::from_stored(&buf[..len]);
                info!("NvsAdapter: loaded thresholds {:?}", thresholds);
                Ok(thresholds)
            }
            Err(StorageError::NotFound) => {
                info!("NvsAdapter: no stored thresholds, using defaults");
                Ok(Thresholds::default())
            }
            Err(StorageError::BufferTooSmall) => {
                warn!("NvsAdapter: oversized threshold blob, using defaults");
                Ok(Thresholds::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn save_thresholds(&self, thresholds: &Thresholds) -> Result<(), ConfigError> {
        if !thresholds.is_ordered() {
            return Err(ConfigError::ValidationFailed(
                "thresholds must satisfy minimal < normal < high < critical",
            ));
        }
        self.set_blob(NAMESPACE, THRESHOLDS_KEY, &thresholds.to_bytes())?;
        info!("NvsAdapter: thresholds saved");
        Ok(())
    }

    fn load(&self) -> Result<MonitorConfig, ConfigError> {
        let mut buf = [0u8; MAX_CONFIG_BLOB];
        match self.get_blob(NAMESPACE, CONFIG_KEY, &mut buf) {
            Ok(len) => {
                let cfg: MonitorConfig =
                    postcard::from_bytes(&buf[..len]).map_err(|_| ConfigError::Corrupted)?;
                cfg.validate().map_err(ConfigError::ValidationFailed)?;
                info!("NvsAdapter: loaded config ({} bytes)", len);
                Ok(cfg)
            }
            Err(StorageError::NotFound) => {
                info!("NvsAdapter: no stored config, using defaults");
                Ok(MonitorConfig::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, config: &MonitorConfig) -> Result<(), ConfigError> {
        config.validate().map_err(ConfigError::ValidationFailed)?;
        let bytes = postcard::to_allocvec(config).map_err(|_| ConfigError::IoError)?;
        self.set_blob(NAMESPACE, CONFIG_KEY, &bytes)?;
        info!("NvsAdapter: config saved ({} bytes)", bytes.len());
        Ok(())
    }
}
