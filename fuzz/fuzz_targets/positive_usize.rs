#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        if let Ok(value) = resttest::fuzzing::parse_positive_usize_input(input) {
            debug_assert!(value > 0);
            debug_assert_eq!(input.trim().parse::<usize>().ok(), Some(value));
        }
    }
});
