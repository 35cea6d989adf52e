//! Money formatting.
//!
//! Prices are integer cents end-to-end (the unit the payment gateway
//! consumes). This module only formats them for receipts and emails.

/// Format integer cents as a dollar string: `1999` -> `"$19.99"`.
pub fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{}${}.{:02}", sign, abs / 100, abs % 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_dollars_and_cents() {
        assert_eq!(format_cents(0), "$0.00");
        assert_eq!(format_cents(5), "$0.05");
        assert_eq!(format_cents(1999), "$19.99");
        assert_eq!(format_cents(120_000), "$1200.00");
    }

    #[test]
    fn formats_negative_amounts() {
        assert_eq!(format_cents(-1999), "-$19.99");
    }
}
