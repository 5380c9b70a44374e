//! Fuzz target for `auditpol /backup` CSV parsing.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_auditpol_backup
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(rows) = hostaudit_probe::parse_backup(data) {
        let _ = hostaudit_probe::find_setting(&rows, "Audit Logon");
    }
});
