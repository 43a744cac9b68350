use std::time::Duration;

/// Groups the integer part in threes: `1234567.891` with 2 decimals is `1,234,567.89`.
pub fn format_number(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let formatted = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::with_capacity(formatted.len() + int_part.len() / 3 + 1);
    if value < 0.0 && formatted.chars().any(|ch| ch.is_ascii_digit() && ch != '0') {
        grouped.push('-');
    }
    for (index, ch) in int_part.chars().enumerate() {
        if index > 0 && (int_part.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if let Some(frac_part) = frac_part {
        grouped.push('.');
        grouped.push_str(frac_part);
    }
    grouped
}

pub fn format_isk(value: f64) -> String {
    format!("{} ISK", format_number(value, 2))
}

pub fn format_volume(value: f64) -> String {
    format!("{} m³", format_number(value, 2))
}

/// Compact age such as `42s`, `5m`, `3h` or `8d`.
pub fn age_string(age: Duration) -> String {
    let secs = age.as_secs();
    if secs < 60 {
        format!("{secs}s")
    } else if secs < 3600 {
        format!("{}m", secs / 60)
    } else if secs < 86400 {
        format!("{}h", secs / 3600)
    } else {
        format!("{}d", secs / 86400)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_thousands() {
        assert_eq!(format_number(0.0, 0), "0");
        assert_eq!(format_number(999.0, 0), "999");
        assert_eq!(format_number(1_000.0, 0), "1,000");
        assert_eq!(format_number(1_234_567.891, 2), "1,234,567.89");
        assert_eq!(format_number(-45_000.5, 1), "-45,000.5");
        assert_eq!(format_number(-0.001, 2), "0.00");
    }

    #[test]
    fn units_are_appended() {
        assert_eq!(format_isk(1_500_000.0), "1,500,000.00 ISK");
        assert_eq!(format_volume(860_000.0), "860,000.00 m³");
    }

    #[test]
    fn ages_use_the_largest_whole_unit() {
        assert_eq!(age_string(Duration::from_secs(42)), "42s");
        assert_eq!(age_string(Duration::from_secs(5 * 60 + 10)), "5m");
        assert_eq!(age_string(Duration::from_secs(3 * 3600)), "3h");
        assert_eq!(age_string(Duration::from_secs(8 * 86400)), "8d");
    }
}
