//! Human-readable byte counts and counters.

const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
const STEP: u64 = 1024;

/// Format a byte count using binary (1024-based) units.
///
/// The unit is the largest one whose scaled value is at least 1, capped at GB.
/// The value is rounded to two decimals and trailing zeros are dropped, so
/// `1536` renders as `1.5 KB` and `1024` as `1 KB`. Zero is `0 Bytes`.
pub fn format_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut index = 0;
    let mut divisor = 1u64;
    while index + 1 < UNITS.len() && bytes / divisor >= STEP {
        divisor *= STEP;
        index += 1;
    }

    let scaled = bytes as f64 / divisor as f64;
    format!("{} {}", trim_decimals(scaled), UNITS[index])
}

/// Format a counter with `,` thousands separators.
pub fn format_count(count: u64) -> String {
    let digits = count.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn trim_decimals(value: f64) -> String {
    let fixed = format!("{:.2}", value);
    fixed
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}
