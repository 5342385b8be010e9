#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(aggregated) = marionette_ctl::fuzzing::aggregate_metrics_input(data) {
        for (_, points) in aggregated {
            for pair in points.windows(2) {
                debug_assert!(pair[0].timestamp < pair[1].timestamp);
            }
            for point in &points {
                debug_assert!(point.value.is_finite());
            }
        }
    }
    let _ = marionette_ctl::fuzzing::decode_live_input(data);
});
