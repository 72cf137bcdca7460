//! Fuzz target: postcard-encoded `MonitorConfig`
//!
//! The NVS adapter decodes whatever bytes sit under the config key.  This
//! drives arbitrary blobs through the same decode + validate path and
//! checks that nothing panics and that a blob which validates also
//! re-encodes.
//!
//! cargo fuzz run fuzz_monitor_config

#![no_main]

use libfuzzer_sys::fuzz_target;
use thermorx::app::ports::ConfigPort;
use thermorx::adapters::nvs::NvsAdapter;

fuzz_target!(|data: &[u8]| {
    let Ok(nvs) = NvsAdapter::new() else {
        return;
    };
    if nvs.write_raw("moncfg", data).is_err() {
        return;
    }
    if let Ok(cfg) = nvs.load() {
        assert!(cfg.validate().is_ok());
        assert!(nvs.save(&cfg).is_ok());
    }
});
