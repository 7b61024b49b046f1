// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Identifier extraction: derive the holder's national ID number from the
// name of the uploaded file.

use std::sync::LazyLock;

use regex::Regex;

/// Returned when no 7–8 digit identifier can be found in a file name.
pub const UNKNOWN_IDENTIFIER: &str = "unknown";

/// Candidate patterns, most specific first. Group 1, when present, holds the
/// number itself. Digits are ASCII only: `\d` would also match other scripts.
static PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // 12.345.678 / 12345678 / 9.876.543
        r"([0-9]{1,2}\.?[0-9]{3}\.?[0-9]{3,4})",
        // V-12.345.678, v 9876543
        r"(?i)V[-\s]?([0-9]{1,2}\.?[0-9]{3}\.?[0-9]{3,4})",
        // any bare run
        r"([0-9]{7,8})",
    ]
    .iter()
    .filter_map(|pattern| Regex::new(pattern).ok())
    .collect()
});

/// Extract a 7–8 digit identifier from `filename`.
///
/// Never fails: falls back to the first eight digits anywhere in the name,
/// then to [`UNKNOWN_IDENTIFIER`].
pub fn extract_identifier(filename: &str) -> String {
    for pattern in PATTERNS.iter() {
        let Some(captures) = pattern.captures(filename) else {
            continue;
        };
        let matched = captures
            .get(1)
            .or_else(|| captures.get(0))
            .map(|m| m.as_str())
            .unwrap_or_default();
        let digits = digits_only(matched);
        if (7..=8).contains(&digits.len()) {
            return digits;
        }
    }

    let digits = digits_only(filename);
    if digits.len() >= 7 {
        return digits.chars().take(8).collect();
    }

    UNKNOWN_IDENTIFIER.to_string()
}

fn digits_only(text: &str) -> String {
    text.chars().filter(char::is_ascii_digit).collect()
}
