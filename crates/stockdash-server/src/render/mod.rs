//! Server-side rendering of the dashboard: HTML tables plus inline SVG charts.

pub mod charts;
pub mod page;

pub use page::{render_dashboard, DashboardView, Ranked};

/// Escape text for use in HTML element content and attribute values.
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// `1234567` -> `1,234,567`. Negative numbers keep their sign.
pub fn format_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if value < 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

/// Price in rupees with two decimals and no grouping, e.g. `₹1520.35`.
pub fn format_price(value: f64) -> String {
    if !value.is_finite() {
        return "–".to_string();
    }
    format!("₹{:.2}", value)
}

/// Table cell for a float; undefined values render as a dash.
pub fn format_number(value: f64, decimals: usize) -> String {
    if value.is_finite() {
        format!("{:.*}", decimals, value)
    } else {
        "–".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("M&M <b>\"x\"</b>"), "M&amp;M &lt;b&gt;&quot;x&quot;&lt;/b&gt;");
        assert_eq!(escape_html("L'T"), "L&#39;T");
    }

    #[test]
    fn test_format_thousands() {
        assert_eq!(format_thousands(0), "0");
        assert_eq!(format_thousands(999), "999");
        assert_eq!(format_thousands(1000), "1,000");
        assert_eq!(format_thousands(12_345_678), "12,345,678");
        assert_eq!(format_thousands(-4500), "-4,500");
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(1520.349), "₹1520.35");
        assert_eq!(format_price(2449.5), "₹2449.50");
        assert_eq!(format_price(0.5), "₹0.50");
        assert_eq!(format_price(f64::NAN), "–");
    }
}
