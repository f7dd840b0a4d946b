#![no_main]

use libfuzzer_sys::fuzz_target;
use resttest::config::types::ConfigFile;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        let parsed: Option<ConfigFile> = toml::from_str(input).ok();
        if let Ok(args) = resttest::fuzzing::apply_config_from_toml(input) {
            debug_assert!(args.max_batch_size.get() > 0);
            if let Some(config) = parsed {
                debug_assert_eq!(args.url, config.url);
                if let Some(headers) = config.headers.as_ref() {
                    debug_assert_eq!(args.headers.len(), headers.len());
                }
            }
        }
    }
});
