/// Symbol helpers shared by the codec and the binary.
///
/// Input symbols use the exchange-neutral form:
///     TOKEN_ASSET   (uppercase ASCII letters on both sides)
///
/// IMPORTANT:
/// - No exchange-specific wire formatting lives here.
/// - Validation is strict: anything that does not match is
///   rejected before a single byte is written to the network.
///

use once_cell::sync::Lazy;
use regex::Regex;

static SYMBOL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new("^[A-Z]+_[A-Z]+$").expect("symbol pattern is a valid regex")
});

/// Returns true for symbols of the form `TOKEN_ASSET`.
///
/// Examples:
/// - "BTC_USDT"  -> true
/// - "btc_usdt"  -> false
/// - "BTC-USDT"  -> false
/// - "BTC_USDT_X" -> false
///
pub fn is_valid_symbol(symbol: &str) -> bool {
    SYMBOL_RE.is_match(symbol)
}

/// Splits a valid symbol into (token, asset).
///
/// Returns `None` if the symbol does not match `TOKEN_ASSET`.
///
/// Examples:
/// - "BTC_USDT" -> Some(("BTC", "USDT"))
/// - "BTCUSDT"  -> None
///
pub fn split_symbol(symbol: &str) -> Option<(&str, &str)> {
    if !is_valid_symbol(symbol) {
        return None;
    }
    symbol.split_once('_')
}
