#![no_main]

use libfuzzer_sys::fuzz_target;
use std::collections::BTreeSet;

fuzz_target!(|data: &[u8]| {
    if let Ok(tree) = marionette_ctl::fuzzing::decode_services_input(data) {
        let names: BTreeSet<&str> = tree.service_names().collect();
        debug_assert_eq!(names.len(), tree.len());
    }
});
