#![no_main]

use libfuzzer_sys::fuzz_target;
use polyextract::regex_helper::massage_pattern_for_discriminator;

const PROBES: &[&str] = &["", "a", "ab", "aaa", "0", " ", "abc123", "a-b", "\"x\""];

// The rewritten discriminator form only ever widens: every probe the
// original pattern matches must still match after rewriting.
fuzz_target!(|data: &[u8]| {
    let Ok(pattern) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(original) = fancy_regex::Regex::new(&format!(r"\A(?:{pattern})\z")) else {
        return;
    };
    let rewritten = massage_pattern_for_discriminator(pattern);
    let Ok(wide) = regex::Regex::new(&format!(r"\A{rewritten}\z")) else {
        return;
    };
    for probe in PROBES {
        if let Ok(true) = original.is_match(probe) {
            assert!(wide.is_match(probe), "{pattern:?} -> {rewritten:?} lost {probe:?}");
        }
    }
});
