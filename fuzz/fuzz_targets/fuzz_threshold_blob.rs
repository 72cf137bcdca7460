//! Fuzz target: stored threshold blob decoder
//!
//! Feeds arbitrary flash contents to `Thresholds::from_stored` and checks:
//! - No panics for any length, including empty and oversized blobs
//! - The result is always strictly ordered
//! - Single-degree edits in both directions keep it ordered, even when a
//!   decoded field sits outside its edit window
//!
//! cargo fuzz run fuzz_threshold_blob

#![no_main]

use libfuzzer_sys::fuzz_target;
use thermorx::thresholds::{Step, ThresholdField, Thresholds};

const FIELDS: [ThresholdField; 4] = [
    ThresholdField::Minimal,
    ThresholdField::Normal,
    ThresholdField::High,
    ThresholdField::Critical,
];

fuzz_target!(|data: &[u8]| {
    let mut t = Thresholds::from_stored(data);
    assert!(t.is_ordered(), "decoded {:?} from {:?}", t, data);

    for field in FIELDS {
        for step in [Step::Up, Step::Down, Step::Down, Step::Up] {
            t.adjust(field, step);
            assert!(t.is_ordered(), "{:?} {:?} broke ordering: {:?}", field, step, t);
        }
    }
});
