#![no_main]

use libfuzzer_sys::fuzz_target;
use resttest::config::types::ConfigFile;

fuzz_target!(|data: &[u8]| {
    let parsed: Option<ConfigFile> = serde_json::from_slice(data).ok();
    if let Ok(args) = resttest::fuzzing::apply_config_from_json(data) {
        debug_assert!(args.max_batch_size.get() > 0);
        if let Some(config) = parsed {
            debug_assert_eq!(args.url, config.url);
            if let Some(timeout) = args.timeout {
                debug_assert!(!timeout.is_zero());
            }
        }
    }
});
