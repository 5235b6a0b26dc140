/// Format a floating-point number with thousands separators and a fixed number
/// of decimal places.
///
/// # Examples
///
/// ```
/// use glucose_core::formatting::format_number;
///
/// assert_eq!(format_number(1234.5,  1), "1,234.5");
/// assert_eq!(format_number(1234567.0, 0), "1,234,567");
/// assert_eq!(format_number(0.0, 2), "0.00");
/// assert_eq!(format_number(-9876.5, 1), "-9,876.5");
/// ```
pub fn format_number(value: f64, decimals: u32) -> String {
    // Handle the sign separately so the thousands grouping works on the
    // absolute value.
    let negative = value < 0.0;
    let abs_value = value.abs();

    // Round to the requested decimal places.
    // Add a tiny epsilon (half ULP at the target precision) before rounding
    // to avoid IEEE 754 binary-representation issues at exact midpoints.
    let factor = 10_f64.powi(decimals as i32);
    let epsilon = f64::EPSILON * abs_value * factor;
    let rounded = ((abs_value * factor) + epsilon).round() / factor;

    let integer_part = rounded.trunc() as u64;
    let frac_part = rounded - rounded.trunc();

    // Build the thousands-separated integer portion.
    let int_str = integer_part.to_string();
    let grouped = group_thousands(&int_str);

    let result = if decimals == 0 {
        grouped
    } else {
        // Format the fractional part to the exact number of decimals.
        let frac_str = format!("{:.prec$}", frac_part, prec = decimals as usize);
        // `frac_str` starts with "0.", e.g. "0.50". Strip the leading "0".
        let decimal_digits = &frac_str[1..]; // ".50"
        format!("{}{}", grouped, decimal_digits)
    };

    if negative {
        format!("-{}", result)
    } else {
        result
    }
}

/// Format a macronutrient mass in grams with one decimal, e.g. `"15.0g"`.
///
/// # Examples
///
/// ```
/// use glucose_core::formatting::format_grams;
///
/// assert_eq!(format_grams(15.0),    "15.0g");
/// assert_eq!(format_grams(2.345),   "2.3g");
/// assert_eq!(format_grams(1_250.0), "1,250.0g");
/// ```
pub fn format_grams(grams: f64) -> String {
    format!("{}g", format_number(grams, 1))
}

/// Format a calorie estimate rounded to the nearest whole kilocalorie.
///
/// # Examples
///
/// ```
/// use glucose_core::formatting::format_calories;
///
/// assert_eq!(format_calories(98.0),   "98 kcal");
/// assert_eq!(format_calories(412.6),  "413 kcal");
/// assert_eq!(format_calories(1234.0), "1,234 kcal");
/// ```
pub fn format_calories(kcal: f64) -> String {
    format!("{} kcal", format_number(kcal, 0))
}

/// Format a glucose concentration with one decimal and its unit.
pub fn format_glucose(value: f64) -> String {
    format!("{} mg/dL", format_number(value, 1))
}

/// Format a fractional minute offset as `"m:ss"`.
///
/// * `5.5`   → `"5:30"`
/// * `0.0`   → `"0:00"`
/// * `120.25` → `"120:15"`
///
/// Seconds are rounded; a value that rounds up to 60 seconds carries into
/// the minute.
///
/// # Examples
///
/// ```
/// use glucose_core::formatting::format_offset;
///
/// assert_eq!(format_offset(5.5),    "5:30");
/// assert_eq!(format_offset(0.0),    "0:00");
/// assert_eq!(format_offset(120.25), "120:15");
/// ```
pub fn format_offset(minutes: f64) -> String {
    let total_secs = (minutes.max(0.0) * 60.0).round() as i64;
    format!("{}:{:02}", total_secs / 60, total_secs % 60)
}

/// `part / whole` as a percentage rounded to `decimals`; `0.0` when `whole`
/// is zero.
pub fn percentage(part: f64, whole: f64, decimals: u32) -> f64 {
    if whole == 0.0 {
        return 0.0;
    }
    let factor = 10_f64.powi(decimals as i32);
    (part / whole * 100.0 * factor).round() / factor
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Insert commas every three digits from the right of an integer string.
fn group_thousands(s: &str) -> String {
    if s.len() <= 3 {
        return s.to_string();
    }
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    let remainder = chars.len() % 3;
    for (i, &c) in chars.iter().enumerate() {
        if i != 0 && (i % 3 == remainder) {
            result.push(',');
        }
        result.push(c);
    }
    result
}

// ── Tests ──────────────────────────────────────────────────────────────────────
