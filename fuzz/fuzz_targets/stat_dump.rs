#![no_main]

use gem5_stats::analyze::analyze_dump;
use gem5_stats::dump::StatDump;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Dumps are read lossily, so any byte string is a valid input
    let text = String::from_utf8_lossy(data);
    let dump = StatDump::from_text("fuzz.txt", &text);

    // Most inputs have no active core; errors are fine, panics are not
    let _ = analyze_dump(&dump);
});
