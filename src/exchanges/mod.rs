//! Exchange protocol codecs
//!
//! All exchange-specific wire formatting and parsing lives here.
//! The collector interacts with the feed exclusively through the
//! codec; it never builds or inspects JSON itself.

pub mod ascendex;

pub use ascendex::{AscendexCodec, parse_quote};
