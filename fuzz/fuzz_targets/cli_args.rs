#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        let tokens: Vec<&str> = input.split_whitespace().take(64).collect();
        let _ = marionette_ctl::fuzzing::parse_cli_args_input(&tokens);
    }
});
