#![no_main]

use beacon_dashboard::date_format::{format_in_zone, NOT_AVAILABLE};
use beacon_dashboard::{parse_utc_timestamp, DisplayZone, FormatOptions};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let raw = String::from_utf8_lossy(data);
    let formatted = format_in_zone(
        Some(raw.as_ref()),
        FormatOptions::default(),
        DisplayZone::utc(),
    );
    match parse_utc_timestamp(&raw) {
        Some(_) => assert_ne!(formatted, NOT_AVAILABLE),
        None => assert!(formatted == NOT_AVAILABLE || formatted == raw),
    }
});
