use std::net::SocketAddr;

use chrono::Utc;
use tracing::{debug, warn};

use crate::http::connection::Connection;
use crate::http::message::{HTTP_VERSION_10, Message};
use crate::http::request::{HttpRequest, Method};
use crate::http::response::{HttpResponse, ResponseBuilder, StatusCode};
use crate::http::writer::OutboundQueueItem;
use crate::resource::VirtualHosts;

/// Value of the `Server` header on every response.
pub const SERVER_NAME: &str = concat!("harbor/", env!("CARGO_PKG_VERSION"));

/// Methods answered to `OPTIONS`.
pub const ALLOWED_METHODS: &str = "HEAD, GET, OPTIONS, TRACE";

const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Produces a response for a successfully parsed request.
pub trait RequestHandler {
    fn handle(&mut self, request: &HttpRequest, peer: SocketAddr) -> HttpResponse;
}

/// Parses `request` and queues the response on `conn`.
///
/// A request that fails to parse gets `400 Bad Request` and the connection is
/// closed once it is sent. Otherwise the connection stays open unless the
/// client asked to close it, spoke HTTP/1.0, or already shut down its side.
pub fn dispatch<H, S>(handler: &mut H, conn: &mut Connection<S>, mut request: HttpRequest)
where
    H: RequestHandler + ?Sized,
{
    if let Err(err) = request.parse() {
        warn!(peer = %conn.peer(), error = %err, "bad request");
        let response = HttpResponse::status_page(StatusCode::BadRequest, &err.to_string());
        queue_response(conn, response, true);
        return;
    }

    let response = handler.handle(&request, conn.peer());
    debug!(
        peer = %conn.peer(),
        method = ?request.method(),
        uri = request.request_uri(),
        status = response.status().as_u16(),
        "handled request"
    );

    let disconnect = !request.keep_alive() || conn.is_read_closed();
    queue_response(conn, response, disconnect);
}

/// Adds the headers every response carries, serializes it and queues it.
pub fn queue_response<S>(conn: &mut Connection<S>, mut response: HttpResponse, disconnect: bool) {
    response.set_header("Server", SERVER_NAME);
    response.set_header("Date", Utc::now().format(HTTP_DATE_FORMAT).to_string());
    if disconnect {
        response.set_header("Connection", "close");
    }

    match response.serialize() {
        Some(payload) => conn.enqueue(OutboundQueueItem::new(payload, disconnect)),
        None => warn!(peer = %conn.peer(), "response could not be serialized"),
    }
}

/// Serves static resources out of a set of virtual hosts.
pub struct StaticSite {
    hosts: VirtualHosts,
}

impl StaticSite {
    pub fn new(hosts: VirtualHosts) -> Self {
        Self { hosts }
    }

    pub fn hosts(&self) -> &VirtualHosts {
        &self.hosts
    }

    /// The `host:port` key a request addresses, `None` for HTTP/1.0.
    ///
    /// A `Host` header without a port gets the listening port appended.
    fn host_key(&self, request: &HttpRequest) -> Option<String> {
        if request.version() == HTTP_VERSION_10 {
            return None;
        }
        let host = request.header("Host").unwrap_or_default().trim();
        if host.contains(':') {
            Some(host.to_string())
        } else {
            Some(format!("{host}:{}", self.hosts.port()))
        }
    }

    fn serve_resource(&self, request: &HttpRequest) -> HttpResponse {
        let host = match self.host_key(request) {
            Some(key) => self.hosts.resolve(&key),
            None => self.hosts.default_host(),
        };
        let Some(host) = host else {
            return HttpResponse::status_page(StatusCode::BadRequest, "Invalid/No Host specified");
        };

        let Some(resource) = host.get_resource(request.request_uri()) else {
            return HttpResponse::status_page(StatusCode::NotFound, "");
        };

        let builder = ResponseBuilder::new(StatusCode::Ok)
            .header("Content-Type", resource.mime_type())
            .header("Content-Length", resource.size().to_string());
        if request.method() == Method::HEAD {
            builder.build()
        } else {
            builder.body(resource.data().to_vec()).build()
        }
    }
}

impl RequestHandler for StaticSite {
    fn handle(&mut self, request: &HttpRequest, _peer: SocketAddr) -> HttpResponse {
        match request.method() {
            Method::HEAD | Method::GET => self.serve_resource(request),
            Method::OPTIONS => ResponseBuilder::new(StatusCode::Ok)
                .header("Allow", ALLOWED_METHODS)
                .build(),
            Method::TRACE => ResponseBuilder::new(StatusCode::Ok)
                .header("Content-Type", "message/http")
                .body(request.raw().to_vec())
                .build(),
            _ => HttpResponse::status_page(StatusCode::NotImplemented, ""),
        }
    }
}
