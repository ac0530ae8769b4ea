use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Decoded wire message from the exchange stream.
///
/// Every frame the exchange pushes is an object with a message-type
/// tag (`m`) and a payload (`data`). Only envelopes whose tag equals
/// the subscribed channel carry quotes; everything else (ping replies,
/// subscription acks, other channels) is ignored by the session.
///
/// DESIGN NOTES:
/// - `data` is kept as raw JSON so that decoding never depends on
///   the payload shape of non-quote messages.
/// - A missing or null tag decodes as an empty string.
///
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Envelope {
    /// Message-type tag (e.g. "bbo", "ping", "sub")
    #[serde(rename = "m", default, deserialize_with = "null_as_empty")]
    pub tag: String,

    /// Exchange symbol, e.g. "BTC/USDT" (absent on control messages)
    #[serde(default)]
    pub symbol: Option<String>,

    /// Raw payload
    #[serde(default)]
    pub data: Option<Value>,
}

// ------------------------------------------------------------
// BBO payload
// ------------------------------------------------------------
//
// The `data` object of a bbo envelope:
//
//   { "ts": 1, "bid": ["100.5","2"], "ask": ["101.0","1.5"] }
//
// Prices and amounts stay strings here; conversion to f64
// happens in the codec so failures can name the exact field.
//
// Missing fields default to empty strings, which then fail
// numeric parsing (recoverable) instead of decoding (fatal).
// Levels are read leniently: short arrays are padded with "",
// extra entries are ignored, null entries become "".
//
#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct RawQuoteData {
    /// Exchange timestamp in milliseconds
    pub ts: i64,

    /// Best bid: [price, amount]
    #[serde(deserialize_with = "lenient_level")]
    pub bid: [String; 2],

    /// Best ask: [price, amount]
    #[serde(deserialize_with = "lenient_level")]
    pub ask: [String; 2],
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn lenient_level<'de, D>(deserializer: D) -> Result<[String; 2], D::Error>
where
    D: Deserializer<'de>,
{
    let entries = Option::<Vec<Option<String>>>::deserialize(deserializer)?.unwrap_or_default();
    let mut entries = entries.into_iter().map(Option::unwrap_or_default);

    Ok([
        entries.next().unwrap_or_default(),
        entries.next().unwrap_or_default(),
    ])
}

/// One side of the top of book.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
pub struct Order {
    pub price: f64,
    pub amount: f64,
}

/// The unit delivered to the consumer: best ask and best bid.
///
/// Created once per valid bbo envelope and handed over by value.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
pub struct BestOrderBook {
    pub ask: Order,
    pub bid: Order,
}
