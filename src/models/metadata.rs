use serde::Serialize;

/// Best-effort page metadata returned by `GET /api/metadata`.
///
/// Every field is independently optional. A missing field means the page did
/// not yield a value for it, never that extraction failed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetadataResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Price>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

impl MetadataResult {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.price.is_none() && self.thumbnail.is_none()
    }
}

/// A monetary amount scraped from a page. Always finite and strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Price(f64);

impl Price {
    /// Parse a matched price string such as `$1,299.00`.
    ///
    /// Thousands separators and currency symbols are stripped before parsing.
    /// Returns `None` unless the remainder is a finite number greater than zero.
    pub fn parse(raw: &str) -> Option<Self> {
        let cleaned: String = raw
            .trim()
            .chars()
            .filter(|c| !matches!(c, ',' | '$' | '€' | '£' | '¥' | '₹'))
            .collect();

        cleaned
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite() && *v > 0.0)
            .map(Price)
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_thousands_separated_dollars() {
        assert_eq!(Price::parse("$1,299.00").map(Price::value), Some(1299.0));
    }

    #[test]
    fn parses_bare_integer() {
        assert_eq!(Price::parse("42").map(Price::value), Some(42.0));
    }

    #[test]
    fn parses_trailing_dot() {
        assert_eq!(Price::parse("15.").map(Price::value), Some(15.0));
    }

    #[test]
    fn strips_non_dollar_currency_symbols() {
        assert_eq!(Price::parse("€19.99").map(Price::value), Some(19.99));
        assert_eq!(Price::parse("£5").map(Price::value), Some(5.0));
    }

    #[test]
    fn rejects_zero() {
        assert!(Price::parse("0").is_none());
        assert!(Price::parse("0.00").is_none());
        assert!(Price::parse("$0").is_none());
    }

    #[test]
    fn rejects_negative() {
        assert!(Price::parse("-5").is_none());
    }

    #[test]
    fn rejects_separator_only_matches() {
        assert!(Price::parse(",").is_none());
        assert!(Price::parse("$,").is_none());
        assert!(Price::parse(".").is_none());
        assert!(Price::parse("").is_none());
    }

    #[test]
    fn rejects_overflowing_digit_runs() {
        let huge = "9".repeat(400);
        assert!(Price::parse(&huge).is_none());
    }

    #[test]
    fn serializes_as_bare_number() {
        let price = Price::parse("12.5").unwrap();
        assert_eq!(serde_json::to_string(&price).unwrap(), "12.5");
    }

    #[test]
    fn empty_result_omits_every_key() {
        let json = serde_json::to_value(MetadataResult::default()).unwrap();
        assert_eq!(json, serde_json::json!({}));
    }

    #[test]
    fn populated_result_serializes_all_keys() {
        let result = MetadataResult {
            title: Some("Desk Lamp".into()),
            price: Price::parse("$39.99"),
            thumbnail: Some("https://cdn.example.com/lamp.jpg".into()),
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["title"], "Desk Lamp");
        assert_eq!(json["price"], 39.99);
        assert_eq!(json["thumbnail"], "https://cdn.example.com/lamp.jpg");
    }
}
