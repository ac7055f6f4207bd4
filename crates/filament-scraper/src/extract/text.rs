//! Strategy 3: last-resort scan for a dollar amount near the word "price".

use std::sync::LazyLock;

use filament_core::{PriceObservation, DEFAULT_CURRENCY};
use regex::Regex;

/// "price", then up to 100 non-newline characters (as few as possible), then
/// `$NN` or `$NN.NN`.
static PRICE_NEAR_DOLLAR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)price[^\n\r]{0,100}?\$\s*([0-9]+(?:\.[0-9]{2})?)")
        .expect("valid price heuristic regex")
});

/// The amount is always reported in USD: the heuristic only recognises `$`.
pub(super) fn extract_text_price(html: &str) -> Option<PriceObservation> {
    let amount = PRICE_NEAR_DOLLAR_RE
        .captures(html)
        .and_then(|cap| cap.get(1))?
        .as_str()
        .parse::<f64>()
        .ok()?;

    Some(PriceObservation::new(amount, DEFAULT_CURRENCY))
}
