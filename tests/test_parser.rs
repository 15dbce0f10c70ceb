use harbor::http::message::{HttpMessage, Message};
use harbor::http::parser::ParseError;
use harbor::http::request::{HttpRequest, Method};

fn parse(raw: &[u8]) -> (HttpRequest, Result<(), ParseError>) {
    let mut req = HttpRequest::from_bytes(raw);
    let result = req.parse();
    (req, result)
}

#[test]
fn test_parse_simple_get_request() {
    let (req, result) = parse(b"GET /index.html HTTP/1.1\r\nHost: example.com\r\n\r\n");

    assert!(result.is_ok());
    assert_eq!(req.method(), Method::GET);
    assert_eq!(req.request_uri(), "/index.html");
    assert_eq!(req.version(), "HTTP/1.1");
    assert_eq!(req.header("Host"), Some("example.com"));
    assert!(req.body().is_none());
    assert!(req.parse_error().is_none());
}

#[test]
fn test_parse_post_request_with_body() {
    let (req, result) =
        parse(b"POST /api HTTP/1.1\r\nHost: localhost\r\nContent-Length: 5\r\n\r\nhello");

    assert!(result.is_ok());
    assert_eq!(req.method(), Method::POST);
    assert_eq!(req.body().map(|b| &b[..]), Some(&b"hello"[..]));
}

#[test]
fn test_parse_body_shorter_than_content_length() {
    let (req, result) = parse(b"POST /api HTTP/1.1\r\nContent-Length: 5\r\n\r\nhel");

    assert_eq!(
        result,
        Err(ParseError::BodyTooShort {
            claimed: 5,
            available: 3
        })
    );
    assert!(req.body().is_none());
    assert!(req.parse_error().unwrap().contains("Content-Length"));
}

#[test]
fn test_parse_body_ignored_for_get() {
    let (req, result) = parse(b"GET / HTTP/1.1\r\nContent-Length: 50\r\n\r\nxx");

    assert!(result.is_ok());
    assert!(req.body().is_none());
}

#[test]
fn test_parse_non_numeric_content_length() {
    let (_, result) = parse(b"PUT /f HTTP/1.1\r\nContent-Length: lots\r\n\r\n");

    assert_eq!(result, Err(ParseError::InvalidContentLength("lots".to_string())));
}

#[test]
fn test_parse_request_with_binary_body() {
    let (req, result) = parse(b"POST /upload HTTP/1.1\r\nContent-Length: 4\r\n\r\n\x00\x01\x02\x03");

    assert!(result.is_ok());
    assert_eq!(&req.body().unwrap()[..], &[0u8, 1, 2, 3]);
}

#[test]
fn test_parse_zero_content_length_has_no_body() {
    let (req, result) = parse(b"POST /api HTTP/1.1\r\nContent-Length: 0\r\n\r\n");

    assert!(result.is_ok());
    assert!(req.body().is_none());
}

#[test]
fn test_parse_multiple_headers() {
    let (req, _) = parse(
        b"GET /path HTTP/1.1\r\nHost: example.com\r\nUser-Agent: test-client\r\nAccept: */*\r\n\r\n",
    );

    assert_eq!(req.header("Host"), Some("example.com"));
    assert_eq!(req.header("User-Agent"), Some("test-client"));
    assert_eq!(req.header("Accept"), Some("*/*"));
}

#[test]
fn test_parse_header_lookup_ignores_case() {
    let (req, _) = parse(b"GET / HTTP/1.1\r\ncontent-type: application/json\r\n\r\n");

    assert_eq!(req.header("Content-Type"), Some("application/json"));
    assert_eq!(req.header("CONTENT-TYPE"), Some("application/json"));
}

#[test]
fn test_parse_duplicate_header_keeps_first() {
    let (req, _) = parse(b"GET / HTTP/1.1\r\nX-Id: 1\r\nX-Id: 2\r\n\r\n");

    assert_eq!(req.header("X-Id"), Some("1"));
}

#[test]
fn test_parse_oversized_header_is_dropped() {
    let long_key = "K".repeat(40);
    let raw = format!("GET / HTTP/1.1\r\n{long_key}: v\r\nHost: a\r\n\r\n");
    let (req, result) = parse(raw.as_bytes());

    assert!(result.is_ok());
    assert_eq!(req.header(&long_key), None);
    assert_eq!(req.header("Host"), Some("a"));
}

#[test]
fn test_parse_malformed_header_is_skipped() {
    let (req, result) = parse(b"GET / HTTP/1.1\r\nBrokenHeader\r\nHost: a\r\n\r\n");

    assert!(result.is_ok());
    assert_eq!(req.header("Host"), Some("a"));
}

#[test]
fn test_parse_request_with_path_and_query_string() {
    let (req, _) = parse(b"GET /search?q=rust HTTP/1.1\r\nHost: example.com\r\n\r\n");

    assert_eq!(req.request_uri(), "/search?q=rust");
}

#[test]
fn test_parse_invalid_http_method() {
    let (req, result) = parse(b"INVALID / HTTP/1.1\r\n\r\n");

    assert_eq!(result, Err(ParseError::InvalidMethod("INVALID".to_string())));
    assert_eq!(req.parse_error(), Some("Invalid method: INVALID"));
}

#[test]
fn test_parse_empty_method() {
    let (_, result) = parse(b" / HTTP/1.1\r\n\r\n");

    assert_eq!(result, Err(ParseError::EmptyMethod));
}

#[test]
fn test_parse_missing_uri() {
    let (_, result) = parse(b"GET HTTP/1.1\r\n\r\n");

    assert_eq!(result, Err(ParseError::MissingUri));
}

#[test]
fn test_parse_missing_version() {
    let (_, result) = parse(b"GET / \r\n\r\n");

    assert_eq!(result, Err(ParseError::EmptyVersion));
}

#[test]
fn test_parse_unsupported_version() {
    let (_, result) = parse(b"GET / HTTP/2.0\r\n\r\n");

    assert_eq!(result, Err(ParseError::InvalidVersion("HTTP/2.0".to_string())));
}

#[test]
fn test_parse_various_http_methods() {
    let methods = [
        ("GET", Method::GET),
        ("POST", Method::POST),
        ("PUT", Method::PUT),
        ("DELETE", Method::DELETE),
        ("HEAD", Method::HEAD),
        ("OPTIONS", Method::OPTIONS),
        ("TRACE", Method::TRACE),
        ("CONNECT", Method::CONNECT),
        ("PATCH", Method::PATCH),
    ];

    for (name, expected) in methods {
        let raw = format!("{name} / HTTP/1.1\r\n\r\n");
        let (req, result) = parse(raw.as_bytes());
        assert!(result.is_ok(), "{name} failed to parse");
        assert_eq!(req.method(), expected);
    }
}

#[test]
fn test_get_line_incomplete_leaves_cursor() {
    let mut msg = HttpMessage::from_bytes(b"GET / HTTP/1.1\r\nHost: exa");
    assert_eq!(msg.get_line(), "GET / HTTP/1.1");

    let before = msg.buffer().read_pos();
    assert_eq!(msg.get_line(), "");
    assert_eq!(msg.buffer().read_pos(), before);
}

#[test]
fn test_get_line_bare_lf() {
    let mut msg = HttpMessage::from_bytes(b"one\ntwo\n");
    assert_eq!(msg.get_line(), "one");
    assert_eq!(msg.get_line(), "two");
}

#[test]
fn test_parse_folded_header_before_blank_line_keeps_body() {
    let (req, result) =
        parse(b"POST /x HTTP/1.1\r\nContent-Length: 9\r\nX-List: a,\r\n\r\nk: v\r\nxyz");

    assert!(result.is_ok());
    assert_eq!(req.header("X-List"), Some("a,"));
    assert_eq!(req.header("k"), None);
    assert_eq!(&req.body().unwrap()[..], b"k: v\r\nxyz");
}
