#![no_main]

use libfuzzer_sys::fuzz_target;
use queue_dashboard::wheel::resolve_index;

fuzz_target!(|data: &[u8]| {
    let Some((count, angle)) = data.split_first() else {
        return;
    };
    let Ok(bytes) = <[u8; 8]>::try_from(angle.get(..8).unwrap_or_default()) else {
        return;
    };
    let angle = f64::from_le_bytes(bytes);
    // Rotation only ever accumulates finite, non-negative angles.
    if !angle.is_finite() || angle < 0.0 || angle > 1.0e9 {
        return;
    }

    let count = usize::from(*count);
    match resolve_index(angle, count) {
        None => assert_eq!(count, 0),
        Some(index) => assert!(index < count),
    }
});
