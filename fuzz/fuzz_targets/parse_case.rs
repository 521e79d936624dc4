#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|s: &str| {
    if let Ok(case) = reducebench_config::parse_case(s) {
        assert!(!case.name.is_empty());
        assert_eq!(case.to_string(), s);
    }
});
