use serde::{Deserialize, Serialize};

use crate::{
    error::{CodecError, QuoteField},
    schema::{BestOrderBook, Envelope, Order, RawQuoteData},
    util,
};

/// AscendEX public stream codec
///
/// WS:
/// wss://ascendex.com/1/api/pro/v1/stream
///
/// Channels:
/// - bbo:{TOKEN}/{ASSET}
///
/// DESIGN:
/// - Pure protocol translation
/// - No IO, no state beyond the channel name
/// - Safe to share between the session loops
#[derive(Debug, Clone)]
pub struct AscendexCodec {
    channel: String,
}

#[derive(Serialize)]
struct SubscribeRequest<'a> {
    op: &'a str,
    ch: String,
}

impl AscendexCodec {
    pub fn new(channel: impl Into<String>) -> Self {
        Self { channel: channel.into() }
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Builds the subscription text frame for `symbol`.
    ///
    /// "BTC_USDT" -> {"op":"sub","ch":"bbo:BTC/USDT"}
    ///
    /// MUST NOT:
    /// - Accept anything but `TOKEN_ASSET` (uppercase letters)
    pub fn build_subscription(&self, symbol: &str) -> Result<String, CodecError> {
        let (token, asset) = util::split_symbol(symbol)
            .ok_or_else(|| CodecError::InvalidSymbol(symbol.to_string()))?;

        let req = SubscribeRequest {
            op: "sub",
            ch: format!("{}:{}/{}", self.channel, token, asset),
        };

        Ok(serde_json::to_string(&req)?)
    }

    /// Decodes a raw frame into an envelope.
    ///
    /// Fails only when the bytes are not a JSON object whose tag is a
    /// string or null. Payload shape is not checked here.
    pub fn decode_envelope(&self, bytes: &[u8]) -> Result<Envelope, CodecError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// True if the envelope carries a quote for this codec's channel.
    pub fn is_quote(&self, envelope: &Envelope) -> bool {
        envelope.tag == self.channel
    }

    /// Extracts the quote payload of a bbo envelope.
    ///
    /// A payload with the wrong JSON types is malformed. Missing
    /// fields and short levels are left empty and surface later as
    /// numeric errors.
    pub fn quote_data(&self, envelope: &Envelope) -> Result<RawQuoteData, CodecError> {
        match &envelope.data {
            Some(data) => Ok(RawQuoteData::deserialize(data)?),
            None => Ok(RawQuoteData::default()),
        }
    }
}

/// Converts the four decimal strings of a quote into a `BestOrderBook`.
///
/// Fields are parsed in wire order (ask price, ask amount, bid price,
/// bid amount); the first failure is returned and nothing is built.
pub fn parse_quote(raw: &RawQuoteData) -> Result<BestOrderBook, CodecError> {
    let [ask_price, ask_amount] = &raw.ask;
    let [bid_price, bid_amount] = &raw.bid;

    Ok(BestOrderBook {
        ask: Order {
            price: parse_decimal(QuoteField::AskPrice, ask_price)?,
            amount: parse_decimal(QuoteField::AskAmount, ask_amount)?,
        },
        bid: Order {
            price: parse_decimal(QuoteField::BidPrice, bid_price)?,
            amount: parse_decimal(QuoteField::BidAmount, bid_amount)?,
        },
    })
}

// Base-10 only. `NaN` and infinities parse in Rust but are not prices.
fn parse_decimal(field: QuoteField, value: &str) -> Result<f64, CodecError> {
    match value.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(CodecError::InvalidNumericField {
            field,
            value: value.to_string(),
        }),
    }
}
