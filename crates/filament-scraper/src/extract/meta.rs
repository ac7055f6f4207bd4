//! Strategy 2: Open Graph / product meta tags (common on Shopify storefronts).

use std::sync::LazyLock;

use filament_core::{PriceObservation, DEFAULT_CURRENCY};
use regex::Regex;

const AMOUNT_TAGS: [&str; 3] = ["product:price:amount", "og:price:amount", "twitter:data1"];
const CURRENCY_TAGS: [&str; 2] = ["product:price:currency", "og:price:currency"];

/// One compiled pattern per tag name, in priority order.
static AMOUNT_TAG_RES: LazyLock<Vec<Regex>> =
    LazyLock::new(|| AMOUNT_TAGS.iter().map(|name| meta_content_regex(name)).collect());
static CURRENCY_TAG_RES: LazyLock<Vec<Regex>> =
    LazyLock::new(|| CURRENCY_TAGS.iter().map(|name| meta_content_regex(name)).collect());

/// Read the price from the first amount meta tag present.
///
/// Returns `None` when no amount tag exists. When one exists but its content
/// does not coerce to a finite number, the observation still carries the
/// currency.
pub(super) fn extract_meta_price(html: &str) -> Option<PriceObservation> {
    let raw_amount = AMOUNT_TAG_RES
        .iter()
        .find_map(|re| find_meta_content(html, re))?;

    let currency = CURRENCY_TAG_RES
        .iter()
        .find_map(|re| find_meta_content(html, re))
        .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());

    Some(PriceObservation {
        price: parse_amount(&raw_amount),
        currency: Some(currency),
    })
}

/// Matches `<meta property|name="{name}" ... content="...">`.
///
/// Attribute order matters: the name attribute must precede `content`.
fn meta_content_regex(name: &str) -> Regex {
    let pattern = format!(
        r#"(?i)<meta[^>]+(?:property|name)="{}"[^>]+content="([^"]+)"[^>]*>"#,
        regex::escape(name)
    );
    Regex::new(&pattern).expect("valid meta tag regex")
}

fn find_meta_content(html: &str, re: &Regex) -> Option<String> {
    re.captures(html)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().to_string())
}

/// Drop everything but digits and periods (`"$1,299.00"` → `"1299.00"`).
///
/// Nothing left over reads as zero; leftovers like `"1.2.3"` are not a number.
fn parse_amount(raw: &str) -> Option<f64> {
    let digits: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    if digits.is_empty() {
        return Some(0.0);
    }
    digits.parse::<f64>().ok().filter(|p| p.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_amount_with_default_currency() {
        let html = r#"<meta property="product:price:amount" content="29.99">"#;
        assert_eq!(
            extract_meta_price(html),
            Some(PriceObservation::new(29.99, "USD"))
        );
    }

    #[test]
    fn amount_tags_follow_priority_order() {
        let html = r#"
            <meta name="twitter:data1" content="$5.00">
            <meta property="og:price:amount" content="31.50">
            <meta property="og:price:currency" content="CAD">
        "#;
        assert_eq!(
            extract_meta_price(html),
            Some(PriceObservation::new(31.5, "CAD"))
        );
    }

    #[test]
    fn product_currency_beats_og_currency() {
        let html = r#"
            <meta property="product:price:amount" content="20">
            <meta property="og:price:currency" content="CAD">
            <meta property="product:price:currency" content="EUR">
        "#;
        let observation = extract_meta_price(html).expect("meta price");
        assert_eq!(observation.currency.as_deref(), Some("EUR"));
    }

    #[test]
    fn twitter_data_strips_symbols_and_separators() {
        let html = r#"<meta name="twitter:data1" content="$1,299.00 USD" />"#;
        assert_eq!(
            extract_meta_price(html),
            Some(PriceObservation::new(1299.0, "USD"))
        );
    }

    #[test]
    fn unparseable_amount_keeps_currency() {
        let html = r#"
            <meta property="og:price:amount" content="1.2.3">
            <meta property="og:price:currency" content="GBP">
        "#;
        let observation = extract_meta_price(html).expect("meta tag present");
        assert_eq!(observation.price, None);
        assert_eq!(observation.currency.as_deref(), Some("GBP"));
    }

    #[test]
    fn amount_without_digits_reads_as_zero() {
        assert_eq!(parse_amount("Free"), Some(0.0));
    }

    #[test]
    fn every_tag_has_a_compiled_pattern_in_priority_order() {
        assert_eq!(AMOUNT_TAG_RES.len(), AMOUNT_TAGS.len());
        assert_eq!(CURRENCY_TAG_RES.len(), CURRENCY_TAGS.len());

        for (name, re) in AMOUNT_TAGS
            .iter()
            .chain(CURRENCY_TAGS.iter())
            .zip(AMOUNT_TAG_RES.iter().chain(CURRENCY_TAG_RES.iter()))
        {
            let html = format!(r#"<meta property="{name}" content="7.00">"#);
            assert_eq!(
                find_meta_content(&html, re).as_deref(),
                Some("7.00"),
                "tag {name}"
            );
        }
    }

    #[test]
    fn content_before_property_is_not_matched() {
        let html = r#"<meta content="29.99" property="product:price:amount">"#;
        assert_eq!(extract_meta_price(html), None);
    }

    #[test]
    fn tag_names_match_case_insensitively() {
        let html = r#"<META PROPERTY="OG:PRICE:AMOUNT" CONTENT="12.00">"#;
        assert_eq!(
            extract_meta_price(html),
            Some(PriceObservation::new(12.0, "USD"))
        );
    }
}
