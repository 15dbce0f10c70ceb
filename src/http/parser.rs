use bytes::Bytes;
use thiserror::Error;

use crate::http::message::HttpMessage;

const CR: u8 = b'\r';
const LF: u8 = b'\n';

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Empty method")]
    EmptyMethod,
    #[error("Invalid method: {0}")]
    InvalidMethod(String),
    #[error("No request URI")]
    MissingUri,
    #[error("HTTP version string was empty")]
    EmptyVersion,
    #[error("HTTP version was invalid: {0}")]
    InvalidVersion(String),
    #[error("Content-Length is not a number: {0}")]
    InvalidContentLength(String),
    #[error("Content-Length ({claimed}) is greater than the remaining bytes ({available})")]
    BodyTooShort { claimed: usize, available: usize },
}

impl HttpMessage {
    /// Reads one line from the read cursor.
    ///
    /// Characters are collected until a CR or LF. If neither shows up before
    /// the end of the buffer, the cursor is put back where it started and an
    /// empty string is returned. Otherwise up to two terminator bytes are
    /// consumed and the text before them is returned.
    pub fn get_line(&mut self) -> String {
        let buf = self.buffer_mut();
        let start = buf.read_pos();
        let mut line = Vec::new();
        let mut terminated = false;

        while buf.read_pos() < buf.len() {
            let c = buf.peek();
            if c == CR || c == LF {
                terminated = true;
                break;
            }
            line.push(buf.get_u8());
        }

        if !terminated {
            buf.set_read_pos(start);
            return String::new();
        }

        for _ in 0..2 {
            if buf.read_pos() >= buf.len() {
                break;
            }
            let c = buf.peek();
            if c != CR && c != LF {
                break;
            }
            buf.get_u8();
        }

        String::from_utf8_lossy(&line).into_owned()
    }

    /// Reads the token between the read cursor and the next `delim`.
    ///
    /// The delimiter is consumed but not returned. Returns an empty string,
    /// leaving the cursor alone, when no delimiter follows.
    pub fn get_str_element(&mut self, delim: u8) -> String {
        let buf = self.buffer_mut();
        let start = buf.read_pos();
        if start >= buf.len() {
            return String::new();
        }
        let Some(end) = buf.find(delim, start) else {
            return String::new();
        };

        let token = buf.get_bytes(end - start);
        buf.set_read_pos(end + 1);
        String::from_utf8_lossy(&token).into_owned()
    }

    /// Reads header lines until an empty line or the end of the data.
    ///
    /// A line ending in `,` is folded together with the line after it. The
    /// first occurrence of a key wins.
    pub fn parse_headers(&mut self) {
        let mut line = self.get_line();
        while !line.is_empty() {
            while line.ends_with(',') {
                let next = self.get_line();
                if next.is_empty() {
                    // Blank line or no complete line: the headers end here.
                    self.add_header_line(&line);
                    return;
                }
                line.push_str(&next);
            }
            self.add_header_line(&line);
            line = self.get_line();
        }
    }

    /// Copies the body announced by `Content-Length` out of the buffer.
    ///
    /// No header, or a length of 0, means no body.
    pub fn parse_body(&mut self) -> Result<(), ParseError> {
        let claimed = match self.content_length() {
            None => return Ok(()),
            Some(length) => length?,
        };

        let available = self.buffer().bytes_remaining();
        if claimed > available {
            return Err(ParseError::BodyTooShort { claimed, available });
        }
        if claimed == 0 {
            return Ok(());
        }

        let body = self.buffer_mut().get_bytes(claimed);
        self.set_body(Bytes::from(body));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_line_consumes_crlf() {
        let mut msg = HttpMessage::from_bytes(b"first\r\nsecond\r\n");
        assert_eq!(msg.get_line(), "first");
        assert_eq!(msg.get_line(), "second");
        assert_eq!(msg.buffer().bytes_remaining(), 0);
    }

    #[test]
    fn get_line_without_terminator_rewinds() {
        let mut msg = HttpMessage::from_bytes(b"no newline here");
        msg.buffer_mut().set_read_pos(3);
        assert_eq!(msg.get_line(), "");
        assert_eq!(msg.buffer().read_pos(), 3);
    }

    #[test]
    fn get_line_does_not_swallow_blank_line() {
        let mut msg = HttpMessage::from_bytes(b"Host: a\r\n\r\nbody");
        assert_eq!(msg.get_line(), "Host: a");
        assert_eq!(msg.get_line(), "");
        assert_eq!(msg.buffer().unread(), b"body");
    }

    #[test]
    fn get_str_element_excludes_delimiter() {
        let mut msg = HttpMessage::from_bytes(b"GET /x HTTP/1.1\r\n");
        assert_eq!(msg.get_str_element(b' '), "GET");
        assert_eq!(msg.get_str_element(b' '), "/x");
        assert_eq!(msg.get_str_element(b' '), "");
        assert_eq!(msg.get_line(), "HTTP/1.1");
    }

    #[test]
    fn folded_header_is_joined() {
        let mut msg = HttpMessage::from_bytes(b"Accept: a,\r\n b\r\n\r\n");
        msg.parse_headers();
        assert_eq!(msg.header("Accept"), Some("a, b"));
    }

    #[test]
    fn body_too_short_allocates_nothing() {
        let mut msg = HttpMessage::from_bytes(b"abc");
        msg.add_header("Content-Length", "5");
        let err = msg.parse_body().unwrap_err();
        assert_eq!(err, ParseError::BodyTooShort { claimed: 5, available: 3 });
        assert!(msg.body().is_none());
    }
}
