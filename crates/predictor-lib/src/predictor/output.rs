//! Prediction output formatting

/// Format a value as dollars with thousands separators and 2 decimals.
///
/// The sign follows the currency symbol: `-1234.5` becomes `$-1,234.50`.
pub fn format_currency(amount: f64) -> String {
    if !amount.is_finite() {
        return format!("${}", amount);
    }

    let fixed = format!("{:.2}", amount);
    let (sign, unsigned) = match fixed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", fixed.as_str()),
    };
    let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, "00"));

    format!("${}{}.{}", sign, group_thousands(whole), fraction)
}

/// Headline shown after a successful prediction
pub fn format_prediction(amount: f64) -> String {
    format!("Predicted Sales: {}", format_currency(amount))
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut grouped = String::with_capacity(len + len / 3);

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    grouped
}
