const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
const STEP: u64 = 1024;

/// Formats a byte count with the largest unit that keeps the magnitude at or above 1.
///
/// Scaled values carry two decimals; a single trailing zero is dropped (`1.5 KB`) but
/// whole values keep both (`1.00 MB`). Plain byte counts have no decimals.
///
/// Labels come out uneven (`2.5 MB` next to `2.00 MB`) because both `1536 -> 1.5 KB` and
/// `1048576 -> 1.00 MB` are required, and no fixed precision yields both.
pub fn format_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut unit = 0;
    let mut divisor = 1_u64;
    while unit + 1 < UNITS.len() && bytes >= divisor * STEP {
        divisor *= STEP;
        unit += 1;
    }

    if unit == 0 {
        return format!("{bytes} {}", UNITS[0]);
    }

    let mut value = bytes as f64 / divisor as f64;
    // 1023.996 KB would print as "1024.00 KB"; promote so the magnitude stays below 1024.
    if unit + 1 < UNITS.len() && (value * 100.0).round() >= (STEP * 100) as f64 {
        unit += 1;
        value = bytes as f64 / (divisor * STEP) as f64;
    }

    let mut formatted = format!("{value:.2}");
    if formatted.ends_with('0') && !formatted.ends_with(".00") {
        formatted.pop();
    }

    format!("{formatted} {}", UNITS[unit])
}
