#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        if let Ok(spec) = resttest::fuzzing::parse_growth_input(input) {
            let reparsed = resttest::fuzzing::parse_growth_input(&spec.to_string());
            debug_assert!(matches!(reparsed, Ok(again) if again == spec));
            let _first = spec.value_at(0);
            let _far = spec.value_at(u64::MAX);
        }
    }
});
