use std::sync::Arc;

use log::{debug, error, info, warn};
use tokio::sync::mpsc;

use crate::{
    error::CodecError,
    exchanges::{AscendexCodec, parse_quote},
    metrics::{METRICS, incr},
    schema::BestOrderBook,
    transport::Frame,
};

use super::link::Link;

/// Reads frames until the connection dies or the session is cancelled.
///
/// Per frame:
/// - transport error        -> fatal
/// - undecodable envelope   -> fatal
/// - other message type     -> ignored
/// - bad numeric field      -> this quote is skipped
/// - valid quote            -> sent to `sink` (waits if the consumer lags)
///
/// TERMINATION:
/// - `sink` is dropped when this function returns, which ends the
///   consumer's stream exactly once
/// - every exit disconnects the link before returning
pub(crate) async fn run(
    link: Arc<Link>,
    codec: AscendexCodec,
    sink: mpsc::Sender<BestOrderBook>,
    raw_frames: bool,
) {
    let failure = loop {
        let frame = tokio::select! {
            biased;
            _ = link.cancel.cancelled() => break None,
            frame = link.transport.recv() => frame,
        };

        let bytes = match frame {
            Ok(Frame::Text(text)) => text.into_bytes(),
            Ok(Frame::Binary(data)) => data,

            // Control frames carry no market data
            Ok(Frame::Ping(_) | Frame::Pong(_)) => continue,

            Err(e) => break Some(format!("failed to read websocket message: {e}")),
        };

        incr(&METRICS.frames_received);
        if raw_frames {
            debug!("[RECV] {}", String::from_utf8_lossy(&bytes));
        }

        let book = match decode_quote(&codec, &bytes) {
            Ok(Some(book)) => book,
            Ok(None) => {
                incr(&METRICS.messages_ignored);
                continue;
            }
            Err(e @ CodecError::InvalidNumericField { .. }) => {
                incr(&METRICS.quote_parse_errors);
                warn!("skipping quote: {e}");
                continue;
            }
            Err(e) => break Some(format!("failed to decode websocket message: {e}")),
        };

        tokio::select! {
            biased;
            _ = link.cancel.cancelled() => break None,
            sent = sink.send(book) => {
                if sent.is_err() {
                    info!("quote receiver dropped, closing session");
                    break None;
                }
                incr(&METRICS.quotes_forwarded);
            }
        }
    };

    // Also reached when only the token was cancelled (session dropped):
    // the transport still gets its close frame.
    link.disconnect().await;
    drop(sink);

    match failure {
        Some(reason) => {
            incr(&METRICS.fatal_errors);
            error!("{reason}");
        }
        None => debug!("read loop stopped"),
    }
}

fn decode_quote(
    codec: &AscendexCodec,
    bytes: &[u8],
) -> Result<Option<BestOrderBook>, CodecError> {
    let envelope = codec.decode_envelope(bytes)?;
    if !codec.is_quote(&envelope) {
        return Ok(None);
    }

    let data = codec.quote_data(&envelope)?;
    let book = parse_quote(&data)?;

    debug!(
        "bbo {} ts={} ask={}@{} bid={}@{}",
        envelope.symbol.as_deref().unwrap_or("?"),
        data.ts,
        book.ask.amount,
        book.ask.price,
        book.bid.amount,
        book.bid.price,
    );

    Ok(Some(book))
}
