//! Connect streaming envelope codec.
//!
//! Every streaming message travels in one envelope frame: a 1-byte flag,
//! a 4-byte big-endian payload length, then the raw UTF-8 JSON payload.
//! A response body is zero or more frames concatenated, terminated by a
//! final-flagged frame whose payload is either an ordinary message, an
//! empty object (clean end of stream), or an object carrying an `error`
//! member (error trailer).
//!
//! [`FrameScanner`] walks a fully-materialized body. Godot's
//! `HTTPRequest` delivers complete bodies, so neither the generated
//! runtime nor this codec ever sees a partial network stream; the scanner
//! is still a plain cursor, so incremental feeding is a contained change.

use bitflags::bitflags;
use bytes::{BufMut, Bytes, BytesMut};
use serde_json::Value;

use crate::error::StreamDecodeError;

/// Frame header size: 1 flag byte + 4 length bytes.
pub const HEADER_LEN: usize = 5;

bitflags! {
    /// Flags carried in each envelope's first byte.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct EnvelopeFlags: u8 {
        /// Payload is compressed. Never set by this implementation.
        const COMPRESSED = 0b0000_0001;
        /// Final frame of the stream.
        const END_STREAM = 0b0000_0010;
    }
}

/// Encode one JSON payload into a single envelope frame.
///
/// The flag byte is 0: uncompressed, non-terminal data. No length limit
/// is imposed at this layer.
pub fn encode_frame(payload: &[u8]) -> Bytes {
    let mut frame = BytesMut::with_capacity(HEADER_LEN + payload.len());
    frame.put_u8(EnvelopeFlags::empty().bits());
    frame.put_u32(payload.len() as u32);
    frame.put_slice(payload);
    frame.freeze()
}

/// Scans a response body for envelope frames, yielding one decoded JSON
/// message per data frame, in byte-offset order.
///
/// Error items follow the stream's recovery rules: a
/// [`StreamDecodeError::Malformed`] frame is skipped and the scan
/// continues; [`StreamDecodeError::Incomplete`] and
/// [`StreamDecodeError::Trailer`] end the scan. Once a final-flagged
/// frame is seen, nothing further is yielded even if bytes remain.
pub struct FrameScanner<'a> {
    buf: &'a [u8],
    offset: usize,
    done: bool,
}

impl<'a> FrameScanner<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            buf,
            offset: 0,
            done: false,
        }
    }

    /// Bytes consumed so far (including frames that failed to decode).
    pub fn offset(&self) -> usize {
        self.offset
    }
}

impl Iterator for FrameScanner<'_> {
    type Item = Result<Value, StreamDecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        // Fewer than 5 unread bytes: end of available frames, not an
        // error.
        if self.buf.len() - self.offset < HEADER_LEN {
            self.done = true;
            return None;
        }

        let flags = EnvelopeFlags::from_bits_truncate(self.buf[self.offset]);
        let declared = u32::from_be_bytes([
            self.buf[self.offset + 1],
            self.buf[self.offset + 2],
            self.buf[self.offset + 3],
            self.buf[self.offset + 4],
        ]) as usize;

        let payload_start = self.offset + HEADER_LEN;
        let available = self.buf.len() - payload_start;
        if declared > available {
            self.done = true;
            return Some(Err(StreamDecodeError::Incomplete {
                declared,
                available,
            }));
        }

        let payload = &self.buf[payload_start..payload_start + declared];
        self.offset = payload_start + declared;
        let is_final = flags.contains(EnvelopeFlags::END_STREAM);
        if is_final {
            // At-most-one terminal transition: nothing after this frame
            // is examined, whatever it decodes to.
            self.done = true;
        }

        let value: Value = match serde_json::from_slice(payload) {
            Ok(value) => value,
            Err(_) => {
                return Some(Err(StreamDecodeError::Malformed {
                    payload: payload.to_vec(),
                }));
            }
        };

        if is_final {
            if let Value::Object(map) = &value {
                if let Some(detail) = map.get("error") {
                    return Some(Err(StreamDecodeError::Trailer {
                        detail: detail.clone(),
                    }));
                }
                if map.is_empty() {
                    // Clean end-of-stream trailer: swallowed.
                    return None;
                }
            }
        }

        Some(Ok(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn frame(flags: u8, payload: &[u8]) -> Vec<u8> {
        let mut out = vec![flags];
        out.extend_from_slice(&(payload.len() as u32).to_be_bytes());
        out.extend_from_slice(payload);
        out
    }

    #[test]
    fn round_trip_single_frame() {
        let encoded = encode_frame(br#"{"reply":"hi"}"#);
        assert_eq!(encoded[0], 0);
        assert_eq!(&encoded[1..5], &14u32.to_be_bytes());

        let mut scanner = FrameScanner::new(&encoded);
        assert_eq!(scanner.next(), Some(Ok(json!({"reply": "hi"}))));
        assert_eq!(scanner.next(), None);
    }

    #[test]
    fn empty_buffer_yields_nothing() {
        assert_eq!(FrameScanner::new(&[]).count(), 0);
    }

    #[test]
    fn trailing_sub_header_bytes_end_scan_silently() {
        let mut buf = frame(0, br#"{"a":1}"#);
        buf.extend_from_slice(&[0, 0, 0]);
        let events: Vec<_> = FrameScanner::new(&buf).collect();
        assert_eq!(events, vec![Ok(json!({"a": 1}))]);
    }

    #[test]
    fn two_frames_then_empty_trailer() {
        let mut buf = frame(0, br#"{"a":1}"#);
        buf.extend_from_slice(&frame(2, b"{}"));
        let events: Vec<_> = FrameScanner::new(&buf).collect();
        assert_eq!(events, vec![Ok(json!({"a": 1}))]);
    }

    #[test]
    fn incomplete_frame_is_one_error_and_stops() {
        let mut buf = frame(0, br#"{"a":1}"#);
        buf.push(0);
        buf.extend_from_slice(&10u32.to_be_bytes());
        buf.extend_from_slice(b"abc");

        let events: Vec<_> = FrameScanner::new(&buf).collect();
        assert_eq!(
            events,
            vec![
                Ok(json!({"a": 1})),
                Err(StreamDecodeError::Incomplete {
                    declared: 10,
                    available: 3,
                }),
            ]
        );
    }

    #[test]
    fn malformed_frame_is_recoverable() {
        let mut buf = frame(0, b"not json");
        buf.extend_from_slice(&frame(0, br#"{"b":2}"#));
        let events: Vec<_> = FrameScanner::new(&buf).collect();
        assert_eq!(
            events,
            vec![
                Err(StreamDecodeError::Malformed {
                    payload: b"not json".to_vec(),
                }),
                Ok(json!({"b": 2})),
            ]
        );
    }

    #[test]
    fn malformed_final_frame_still_terminates() {
        let mut buf = frame(2, b"not json");
        buf.extend_from_slice(&frame(0, br#"{"b":2}"#));
        let events: Vec<_> = FrameScanner::new(&buf).collect();
        assert_eq!(
            events,
            vec![Err(StreamDecodeError::Malformed {
                payload: b"not json".to_vec(),
            })]
        );
    }

    #[test]
    fn error_trailer_is_surfaced() {
        let mut buf = frame(0, br#"{"n":1}"#);
        buf.extend_from_slice(&frame(2, br#"{"error":{"code":"internal"}}"#));
        let events: Vec<_> = FrameScanner::new(&buf).collect();
        assert_eq!(
            events,
            vec![
                Ok(json!({"n": 1})),
                Err(StreamDecodeError::Trailer {
                    detail: json!({"code": "internal"}),
                }),
            ]
        );
    }

    #[test]
    fn final_data_frame_is_emitted_then_scan_stops() {
        let mut buf = frame(2, br#"{"last":true}"#);
        // Bytes after a final frame are never examined.
        buf.extend_from_slice(&frame(0, br#"{"ignored":true}"#));
        let events: Vec<_> = FrameScanner::new(&buf).collect();
        assert_eq!(events, vec![Ok(json!({"last": true}))]);
    }

    #[test]
    fn events_come_in_byte_offset_order() {
        let mut buf = Vec::new();
        for i in 0..4 {
            buf.extend_from_slice(&frame(0, format!(r#"{{"i":{i}}}"#).as_bytes()));
        }
        buf.extend_from_slice(&frame(2, b"{}"));
        let events: Vec<_> = FrameScanner::new(&buf).map(Result::unwrap).collect();
        assert_eq!(
            events,
            (0..4).map(|i| json!({"i": i})).collect::<Vec<_>>()
        );
    }
}
