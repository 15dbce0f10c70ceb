use bytes::Bytes;

use crate::http::message::HttpMessage;

impl HttpMessage {
    /// Appends `line` at the write cursor, followed by CR LF when `crlf_end` is set.
    pub fn put_line(&mut self, line: &str, crlf_end: bool) {
        let buf = self.buffer_mut();
        buf.put_bytes(line.as_bytes());
        if crlf_end {
            buf.put_bytes(b"\r\n");
        }
    }

    /// Appends every header as `Key: Value\r\n` in key order, then a blank line.
    pub fn put_headers(&mut self) {
        let lines: Vec<String> = self
            .headers()
            .map(|(key, value)| format!("{key}: {value}"))
            .collect();
        for line in &lines {
            self.put_line(line, true);
        }
        self.put_line("", true);
    }

    /// Appends the body, if any.
    pub(crate) fn put_body(&mut self) {
        if let Some(body) = self.body().cloned() {
            self.buffer_mut().put_bytes(&body);
        }
    }

    /// Copies everything written so far out of the buffer.
    pub(crate) fn take_output(&mut self) -> Bytes {
        let buf = self.buffer_mut();
        buf.set_read_pos(0);
        Bytes::copy_from_slice(buf.as_slice())
    }
}

/// One serialized message waiting to be written to a peer.
///
/// `offset` only moves forward and never passes the payload size.
#[derive(Debug)]
pub struct OutboundQueueItem {
    payload: Bytes,
    offset: usize,
    disconnect_after: bool,
}

impl OutboundQueueItem {
    pub fn new(payload: Bytes, disconnect_after: bool) -> Self {
        Self {
            payload,
            offset: 0,
            disconnect_after,
        }
    }

    pub fn size(&self) -> usize {
        self.payload.len()
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Bytes not yet handed to the socket.
    pub fn remaining(&self) -> &[u8] {
        &self.payload[self.offset..]
    }

    /// Records that `sent` more bytes went out.
    pub fn advance(&mut self, sent: usize) {
        self.offset = (self.offset + sent).min(self.payload.len());
    }

    pub fn is_complete(&self) -> bool {
        self.offset >= self.payload.len()
    }

    /// Whether the connection should be closed once this item is fully sent.
    pub fn disconnect_after(&self) -> bool {
        self.disconnect_after
    }
}
