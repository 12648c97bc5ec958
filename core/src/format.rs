//! Text formatting for display rows and scalar state.

/// Compact number: `1.23G`, `4.5M`, `12.3W` (ten-thousands), `1.5K`, else `1,234`.
pub fn format_compact(value: f64) -> String {
    if value >= 1_000_000_000.0 {
        format!("{}G", trim_decimals(value / 1_000_000_000.0, 2))
    } else if value >= 1_000_000.0 {
        format!("{}M", trim_decimals(value / 1_000_000.0, 2))
    } else if value >= 10_000.0 {
        format!("{}W", trim_decimals(value / 10_000.0, 1))
    } else if value >= 1_000.0 {
        format!("{}K", trim_decimals(value / 1_000.0, 2))
    } else {
        format_grouped(value)
    }
}

/// Compact form, or empty for zero/negative metrics.
pub fn format_metric(value: f64) -> String {
    if value > 0.0 {
        format_compact(value)
    } else {
        String::new()
    }
}

/// Rounded integer with thousands separators: `1234567.8` -> `1,234,568`.
pub fn format_grouped(value: f64) -> String {
    let rounded = value.round();
    let negative = rounded < 0.0;
    let digits = format!("{}", rounded.abs() as u64);

    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if negative {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Grouped with two fixed decimals: `1234.5` -> `1,234.50`.
pub fn format_grouped_2(value: f64) -> String {
    let cents = (value.abs() * 100.0).round() as u64;
    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}{}.{:02}", format_grouped((cents / 100) as f64), cents % 100)
}

/// `m:ss`, or `h:mm:ss` once an hour is reached.
pub fn format_duration(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    if hours > 0 {
        format!("{hours}:{minutes:02}:{secs:02}")
    } else {
        format!("{minutes}:{secs:02}")
    }
}

/// Countdown text `mm:ss`.
pub fn format_countdown(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Percentage label for a 0..=1 share, or `None` below 1 %.
pub fn percent_label(share: f64) -> Option<String> {
    let pct = share * 100.0;
    (pct >= 1.0).then(|| format!(" {}%", pct.round() as i64))
}

/// Percentage with one decimal: `0.1234` -> `12.3%`.
pub fn format_percent_1(share: f64) -> String {
    format!("{:.1}%", share * 100.0)
}

/// Sub-class part of a `Class-Spec` profession string.
pub fn display_role(profession: &str) -> &str {
    match profession.split_once('-') {
        Some((_, spec)) => spec,
        None => profession,
    }
}

fn trim_decimals(value: f64, places: usize) -> String {
    let text = format!("{value:.places$}");
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_compact_units() {
        assert_eq!(format_compact(999.0), "999");
        assert_eq!(format_compact(1_500.0), "1.5K");
        assert_eq!(format_compact(12_345.0), "1.2W");
        assert_eq!(format_compact(2_000_000.0), "2M");
        assert_eq!(format_compact(1_234_000_000.0), "1.23G");
    }

    #[test]
    fn test_format_metric_hides_zero() {
        assert_eq!(format_metric(0.0), "");
        assert_eq!(format_metric(12.0), "12");
    }

    #[test]
    fn test_format_grouped() {
        assert_eq!(format_grouped(0.0), "0");
        assert_eq!(format_grouped(1_234_567.8), "1,234,568");
        assert_eq!(format_grouped(100.0), "100");
        assert_eq!(format_grouped_2(1234.5), "1,234.50");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "0:00");
        assert_eq!(format_duration(75), "1:15");
        assert_eq!(format_duration(3725), "1:02:05");
        assert_eq!(format_countdown(600), "10:00");
    }

    #[test]
    fn test_percent_label_threshold() {
        assert_eq!(percent_label(0.75).as_deref(), Some(" 75%"));
        assert_eq!(percent_label(0.0099), None);
        assert_eq!(percent_label(0.01).as_deref(), Some(" 1%"));
    }

    #[test]
    fn test_display_role() {
        assert_eq!(display_role("Healer-Lifebind"), "Lifebind");
        assert_eq!(display_role("Striker"), "Striker");
        assert_eq!(display_role(""), "");
    }
}
