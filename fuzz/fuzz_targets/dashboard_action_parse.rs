#![no_main]

use beacon_dashboard::parse_dashboard_action;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let raw = String::from_utf8_lossy(data);
    match parse_dashboard_action(&raw) {
        Ok(None) => assert!(raw.trim().is_empty()),
        Ok(Some(_)) => assert!(!raw.trim().is_empty()),
        Err(message) => assert!(!message.is_empty()),
    }
});
