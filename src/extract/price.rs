//! Price heuristics over raw page text.
//!
//! Two stages run in a fixed order. Stage A looks for a number right after a
//! tag that mentions `price`, `cost` or `amount`. Stage B only runs when
//! Stage A found nothing usable and scans the whole body with progressively
//! looser patterns. The order is part of the endpoint's contract: callers and
//! tests rely on a keyword-adjacent number beating any other number on the
//! page, and on a dollar amount beating a bare decimal anywhere in the body.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::Price;

// Digit classes are spelled `[0-9]`: `\d` in `regex` also matches non-ASCII
// digits, which would claim the first occurrence and then fail to parse.

/// A keyword, the rest of its tag, then the first number after `>`.
static KEYWORD_ADJACENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:price|cost|amount)[^>]*>[\s$€£¥₹]*([0-9,]+\.?[0-9]*)")
        .expect("keyword price regex is valid")
});

/// Whole-body fallbacks, strongest signal first.
static BODY_PATTERNS: Lazy<[Regex; 3]> = Lazy::new(|| {
    [
        // $99.99 or $99
        Regex::new(r"\$[0-9,]+\.?[0-9]*").expect("dollar regex is valid"),
        // 99.99
        Regex::new(r"[0-9,]+\.[0-9]{2}").expect("decimal regex is valid"),
        // 99
        Regex::new(r"[0-9,]+").expect("integer regex is valid"),
    ]
});

/// Run both stages over `html` and return the first accepted price.
pub fn extract_price(html: &str) -> Option<Price> {
    keyword_adjacent_price(html).or_else(|| body_price(html))
}

/// Stage A.
pub fn keyword_adjacent_price(html: &str) -> Option<Price> {
    KEYWORD_ADJACENT
        .captures(html)
        .and_then(|caps| caps.get(1))
        .and_then(|m| Price::parse(m.as_str()))
}

/// Stage B. Each pattern is tried against the entire body before the next
/// one is considered, and only its first occurrence counts.
pub fn body_price(text: &str) -> Option<Price> {
    BODY_PATTERNS
        .iter()
        .find_map(|re| re.find(text).and_then(|m| Price::parse(m.as_str())))
}
