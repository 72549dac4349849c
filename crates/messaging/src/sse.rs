//! Decoder for the relay's server-sent event stream.
//!
//! Frames look like:
//! ```text
//! event: notification
//! id: msg:abc
//! data: {"task":"emergency",...}
//!
//! ```
//! and end with a blank line. Lines may end in LF, CRLF or a lone CR; all three are folded to
//! LF as bytes arrive. Chunks from the transport may split a frame (or a UTF-8 sequence, or
//! a CRLF pair) anywhere, so bytes are buffered until a frame is complete.

use crate::notification::Notification;
use crate::MessagingResult;

/// One complete frame.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SseEvent {
    pub event: Option<String>,
    pub id: Option<String>,
    pub data: String,
}

impl SseEvent {
    /// Parses the data lines as a notification payload.
    pub fn notification(&self) -> MessagingResult<Notification> {
        Notification::parse(&self.data)
    }

    /// Frames that carry nothing: comments and keep-alives.
    pub fn is_empty(&self) -> bool {
        self.event.is_none() && self.id.is_none() && self.data.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    /// Bytes before this offset hold no frame separator.
    scanned: usize,
    after_cr: bool,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffers `chunk` and returns every frame it completed.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<SseEvent> {
        for &byte in chunk {
            match byte {
                b'\n' if self.after_cr => {}
                b'\r' => self.buffer.push(b'\n'),
                _ => self.buffer.push(byte),
            }
            self.after_cr = byte == b'\r';
        }

        let mut events = Vec::new();
        while let Some(end) = self.frame_end() {
            let frame: Vec<u8> = self.buffer.drain(..end + 2).take(end).collect();
            self.scanned = 0;
            let event = parse_frame(&String::from_utf8_lossy(&frame));
            if !event.is_empty() {
                events.push(event);
            }
        }
        // The last byte may be the first half of a separator.
        self.scanned = self.buffer.len().saturating_sub(1);
        events
    }

    /// Position of the first blank line at or after the scan offset.
    fn frame_end(&self) -> Option<usize> {
        let start = self.scanned.min(self.buffer.len());
        self.buffer[start..]
            .windows(2)
            .position(|pair| pair == b"\n\n")
            .map(|i| start + i)
    }
}

fn parse_frame(frame: &str) -> SseEvent {
    let mut event = SseEvent::default();
    let mut data: Vec<&str> = Vec::new();

    for line in frame.lines() {
        if line.is_empty() || line.starts_with(':') {
            continue;
        }
        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        match field {
            "event" => event.event = Some(value.to_string()),
            "id" => event.id = Some(value.to_string()),
            "data" => data.push(value),
            _ => {}
        }
    }

    event.data = data.join("\n");
    event
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAYLOAD: &str = r#"{"task":"emergency","_id":"stu-1","text":"help","fr":"student","to":"medical-centre","createdAt":"2026-10-16T08:00:00Z"}"#;

    #[test]
    fn decodes_frames_split_across_chunks() {
        let stream = format!("event: notification\nid: msg:1\ndata: {PAYLOAD}\n\n: keep-alive\n\n");
        let bytes = stream.as_bytes();
        let mut decoder = SseDecoder::new();

        let mut events = decoder.feed(&bytes[..17]);
        assert!(events.is_empty());
        events.extend(decoder.feed(&bytes[17..]));

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event.as_deref(), Some("notification"));
        assert_eq!(events[0].id.as_deref(), Some("msg:1"));
        assert_eq!(events[0].notification().expect("payload").text, "help");
    }

    #[test]
    fn split_utf8_sequences_survive() {
        let stream = "data: h\u{e9}llo\r\n\r\n".as_bytes();
        let mut decoder = SseDecoder::new();
        // Split inside the two-byte 'é'.
        assert!(decoder.feed(&stream[..8]).is_empty());
        let events = decoder.feed(&stream[8..]);
        assert_eq!(events[0].data, "h\u{e9}llo");
    }

    #[test]
    fn lone_cr_and_split_crlf_end_frames() {
        let mut decoder = SseDecoder::new();
        let events = decoder.feed(b"event: lagged\rdata: 2\r\r");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event.as_deref(), Some("lagged"));
        assert_eq!(events[0].data, "2");

        // CRLF CRLF split between the CR and the LF of each pair.
        assert!(decoder.feed(b"data: one\r").is_empty());
        assert_eq!(decoder.feed(b"\n\r").len(), 1);
        assert!(decoder.feed(b"\ndata: two\n").is_empty());
        let events = decoder.feed(b"\n");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].data, "two");
    }

    #[test]
    fn frames_arriving_byte_by_byte() {
        let stream = format!("id: msg:7\r\ndata: {PAYLOAD}\r\n\r\n");
        let mut decoder = SseDecoder::new();
        let events: Vec<SseEvent> = stream
            .as_bytes()
            .iter()
            .flat_map(|byte| decoder.feed(std::slice::from_ref(byte)))
            .collect();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].id.as_deref(), Some("msg:7"));
        assert_eq!(events[0].data, PAYLOAD);
    }

    #[test]
    fn multi_line_data_is_joined() {
        let mut decoder = SseDecoder::new();
        let events = decoder.feed(b"event: lagged\ndata: 3\ndata: more\n\n");
        assert_eq!(events[0].event.as_deref(), Some("lagged"));
        assert_eq!(events[0].data, "3\nmore");
    }
}
