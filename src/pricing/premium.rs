//! Premium resolution from a possibly one-sided or empty quote.

use crate::core::PremiumSource;

/// Picks a usable premium from bid, ask and last trade.
///
/// First match wins: two-sided mid, bid only, ask only, last trade, nothing.
/// NaN counts as absent.
pub struct PremiumResolver;

impl PremiumResolver {
    pub fn resolve(bid: f64, ask: f64, last_price: f64) -> (f64, PremiumSource) {
        let has_bid = bid > 0.0 && bid.is_finite();
        let has_ask = ask > 0.0 && ask.is_finite();

        match (has_bid, has_ask) {
            (true, true) => ((bid + ask) / 2.0, PremiumSource::MidQuote),
            (true, false) => (bid, PremiumSource::BidOnly),
            (false, true) => (ask, PremiumSource::AskOnly),
            (false, false) if last_price > 0.0 && last_price.is_finite() => {
                (last_price, PremiumSource::LastTrade)
            }
            (false, false) => (0.0, PremiumSource::NoQuote),
        }
    }
}
