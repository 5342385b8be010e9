#![no_main]

use libfuzzer_sys::fuzz_target;
use marionette_ctl::metrics::METRIC_WINDOWS;

fuzz_target!(|data: &[u8]| {
    if let Ok(settings) = marionette_ctl::fuzzing::resolve_config_from_json(data) {
        debug_assert!(settings.min_test_duration_secs > 0);
        debug_assert!(METRIC_WINDOWS.contains(&settings.metrics_minutes));
    }
});
