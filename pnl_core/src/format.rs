use crate::behavior::DAY_NAMES;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// `$1.23M`, `$4.56K`, `$0.0012` under a cent, otherwise two decimals.
pub fn format_usd(amount: Decimal) -> String {
    let value = amount.to_f64().unwrap_or(0.0);
    let magnitude = value.abs();

    if magnitude >= 1_000_000.0 {
        format!("${:.2}M", value / 1_000_000.0)
    } else if magnitude >= 1_000.0 {
        format!("${:.2}K", value / 1_000.0)
    } else if magnitude < 0.01 && value != 0.0 {
        format!("${:.4}", value)
    } else {
        format!("${:.2}", value)
    }
}

/// Ratio in [0, 1] as a percentage with one decimal.
pub fn format_percent(ratio: f64) -> String {
    format!("{:.1}%", ratio * 100.0)
}

pub fn format_duration(minutes: Decimal) -> String {
    let minutes = minutes.to_f64().unwrap_or(0.0);
    if minutes < 60.0 {
        format!("{}m", minutes.round() as i64)
    } else if minutes < 1440.0 {
        format!("{:.1}h", minutes / 60.0)
    } else {
        format!("{:.1}d", minutes / 1440.0)
    }
}

pub fn format_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// `abcd...wxyz`
pub fn shorten_address(address: &str, chars: usize) -> String {
    let count = address.chars().count();
    if count <= chars * 2 {
        return address.to_string();
    }
    let head: String = address.chars().take(chars).collect();
    let tail: String = address.chars().skip(count - chars).collect();
    format!("{}...{}", head, tail)
}

/// 12-hour clock label, e.g. `3PM`.
pub fn hour_label(hour: u32) -> String {
    let period = if hour >= 12 { "PM" } else { "AM" };
    let display = match hour % 12 {
        0 => 12,
        h => h,
    };
    format!("{}{}", display, period)
}

pub fn day_label(day: usize) -> &'static str {
    DAY_NAMES.get(day).copied().unwrap_or("Unknown")
}
