//! Strategy 1: schema.org JSON-LD offers.

use std::sync::LazyLock;

use filament_core::{PriceObservation, DEFAULT_CURRENCY};
use regex::Regex;
use serde_json::{Map, Value};

static LD_JSON_SCRIPT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<script[^>]*type\s*=\s*["']application/ld\+json["'][^>]*>(.*?)</script>"#)
        .expect("valid json-ld script regex")
});

/// A price-bearing node lifted out of a JSON-LD tree.
///
/// Fields are resolved with the same fallbacks vendors actually use:
/// `price` → `priceSpecification.price` → `priceAmount`, and
/// `priceCurrency` → `currency` → `priceSpecification.priceCurrency`.
#[derive(Debug, Clone, PartialEq)]
struct OfferCandidate {
    price: Option<f64>,
    currency: Option<String>,
}

impl OfferCandidate {
    /// Non-object candidates (e.g. an `offers` string) carry no price.
    fn from_node(node: &Value) -> Self {
        match node {
            Value::Object(map) => Self::from_map(map),
            _ => Self {
                price: None,
                currency: None,
            },
        }
    }

    fn from_map(map: &Map<String, Value>) -> Self {
        let specification = map.get("priceSpecification").and_then(Value::as_object);

        let price = first_truthy([
            map.get("price"),
            specification.and_then(|s| s.get("price")),
            map.get("priceAmount"),
        ])
        .and_then(coerce_number);

        // Only non-empty strings count; a numeric code does not stop the fallback.
        let currency = [
            map.get("priceCurrency"),
            map.get("currency"),
            specification.and_then(|s| s.get("priceCurrency")),
        ]
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
        .find(|s| !s.is_empty())
        .map(str::to_string);

        Self { price, currency }
    }

    /// A candidate wins only with a finite, non-zero price.
    fn into_observation(self) -> Option<PriceObservation> {
        let price = self.price.filter(|p| p.is_finite() && *p != 0.0)?;
        Some(PriceObservation {
            price: Some(price),
            currency: Some(
                self.currency
                    .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            ),
        })
    }
}

/// Scan every JSON-LD block and return the first usable offer price.
///
/// Blocks that fail to parse are skipped.
pub(super) fn extract_jsonld_price(html: &str) -> Option<PriceObservation> {
    for cap in LD_JSON_SCRIPT_RE.captures_iter(html) {
        let raw = cap.get(1).map_or("", |m| m.as_str()).trim();
        if raw.is_empty() {
            continue;
        }
        let Ok(value) = serde_json::from_str::<Value>(raw) else {
            tracing::trace!("skipping malformed JSON-LD block");
            continue;
        };

        let mut candidates = Vec::new();
        collect_offer_candidates(&value, &mut candidates);

        if let Some(observation) = candidates
            .into_iter()
            .find_map(OfferCandidate::into_observation)
        {
            return Some(observation);
        }
    }

    None
}

/// Depth-first walk collecting offer candidates in document order.
///
/// For each object: a product-typed node contributes its `offers` (arrays
/// are flattened one level), then the node itself if it carries `price` or
/// `priceCurrency`, then its children.
fn collect_offer_candidates(value: &Value, out: &mut Vec<OfferCandidate>) {
    match value {
        Value::Object(map) => {
            visit_object(map, out);
            for child in map.values() {
                collect_offer_candidates(child, out);
            }
        }
        Value::Array(items) => {
            for child in items {
                collect_offer_candidates(child, out);
            }
        }
        _ => {}
    }
}

fn visit_object(map: &Map<String, Value>, out: &mut Vec<OfferCandidate>) {
    if is_product_type(map.get("@type")) {
        if let Some(offers) = map.get("offers").filter(|v| is_truthy(v)) {
            match offers {
                Value::Array(items) => out.extend(items.iter().map(OfferCandidate::from_node)),
                other => out.push(OfferCandidate::from_node(other)),
            }
        }
    }

    let carries_price = [map.get("price"), map.get("priceCurrency")]
        .into_iter()
        .flatten()
        .any(is_truthy);
    if carries_price {
        out.push(OfferCandidate::from_map(map));
    }
}

/// `@type` may be a string or an array of strings; either matches when it
/// mentions "product" in any case (`Product`, `ProductGroup`, ...).
fn is_product_type(node_type: Option<&Value>) -> bool {
    match node_type {
        Some(Value::String(s)) => s.to_lowercase().contains("product"),
        Some(Value::Array(values)) => values
            .iter()
            .filter_map(Value::as_str)
            .any(|s| s.to_lowercase().contains("product")),
        _ => false,
    }
}

fn first_truthy<'a, const N: usize>(values: [Option<&'a Value>; N]) -> Option<&'a Value> {
    values.into_iter().flatten().find(|v| is_truthy(v))
}

/// Loose truthiness as vendors' structured data expects it: null, false,
/// zero and the empty string are all "not set".
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Numbers pass through; numeric strings (`"19.99"`, `" 24 "`) are parsed.
fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}
