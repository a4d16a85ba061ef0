#![no_main]

use libfuzzer_sys::fuzz_target;

use spindle_storage::TreeLevel;

fuzz_target!(|data: &[u8]| {
    if let Ok(source) = std::str::from_utf8(data) {
        // The schema parser should never panic on any input, and anything it
        // accepts must print back to a form it accepts again.
        if let Ok(schema) = source.parse::<TreeLevel>() {
            let text = schema.to_string();
            let again: TreeLevel = text.parse().expect("printed form must reparse");
            assert_eq!(again, schema);
        }
    }
});
