//! `tiny_http` server driving the playground routes.

use std::io::{self, Read};
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::mpsc::Receiver;
use std::thread;

use tiny_http::{Header, Request, Response, Server, StatusCode};
use tracing::{debug, info, warn};
use xenon_config::ListenAddress;

use super::routes::{Playground, PlaygroundRequest, Reply};
use super::stream::{self, Framing};
use super::{HTTP_TARGET, ServerError};

/// Largest accepted request body.
pub const MAX_BODY_BYTES: u64 = 1024 * 1024;

const TEXT_TYPE: &str = "text/plain; charset=utf-8";
const JSON_TYPE: &str = "application/json";

/// HTTP listener bound to the configured address.
pub struct HttpServer {
    server: Arc<Server>,
    address: SocketAddr,
}

impl HttpServer {
    /// Binds the listener.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError`] when the address cannot be bound.
    pub fn bind(listen: &ListenAddress) -> Result<Self, ServerError> {
        let server = Server::http((listen.host(), listen.port())).map_err(|source| {
            ServerError::Bind {
                address: listen.to_string(),
                source,
            }
        })?;
        let address = server
            .server_addr()
            .to_ip()
            .ok_or_else(|| ServerError::Address {
                address: listen.to_string(),
            })?;
        Ok(Self {
            server: Arc::new(server),
            address,
        })
    }

    /// Address the listener is bound to.
    #[must_use]
    pub const fn local_addr(&self) -> SocketAddr {
        self.address
    }

    /// Starts the accept loop; each request is served on its own thread.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Spawn`] when the accept thread cannot start.
    pub fn start(self, playground: Arc<Playground>) -> Result<ServerHandle, ServerError> {
        let server = Arc::clone(&self.server);
        let address = self.address;
        let handle = thread::Builder::new()
            .name(String::from("xenon-http"))
            .spawn(move || accept_loop(&server, address, &playground))
            .map_err(|source| ServerError::Spawn { source })?;
        Ok(ServerHandle {
            server: self.server,
            address,
            handle: Some(handle),
        })
    }
}

/// Handle to the background accept thread.
pub struct ServerHandle {
    server: Arc<Server>,
    address: SocketAddr,
    handle: Option<thread::JoinHandle<()>>,
}

impl ServerHandle {
    /// Address the listener is bound to.
    #[must_use]
    pub const fn local_addr(&self) -> SocketAddr {
        self.address
    }

    /// Stops accepting requests. Requests already accepted keep running.
    pub fn shutdown(&self) {
        self.server.unblock();
    }

    /// Waits for the accept thread to finish.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::ThreadPanic`] when the thread panicked.
    pub fn join(mut self) -> Result<(), ServerError> {
        self.handle.take().map_or(Ok(()), |handle| {
            handle.join().map_err(|_| ServerError::ThreadPanic)
        })
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        if self.handle.is_some() {
            self.server.unblock();
        }
    }
}

fn accept_loop(server: &Server, address: SocketAddr, playground: &Arc<Playground>) {
    info!(target: HTTP_TARGET, %address, "http listener active");
    for request in server.incoming_requests() {
        let routes = Arc::clone(playground);
        let spawned = thread::Builder::new()
            .name(String::from("xenon-request"))
            .spawn(move || serve(&routes, request));
        if let Err(error) = spawned {
            warn!(target: HTTP_TARGET, %error, "failed to start request thread");
        }
    }
    info!(target: HTTP_TARGET, %address, "http listener stopped");
}

fn serve(playground: &Playground, mut request: Request) {
    let url = request.url().to_owned();
    let mut body = Vec::new();
    let read = io::Read::take(request.as_reader(), MAX_BODY_BYTES + 1).read_to_end(&mut body);
    let outgoing = match read {
        Err(error) => {
            debug!(target: HTTP_TARGET, %error, "failed to read request body");
            Outgoing::Buffered(status_only(400))
        }
        Ok(_) if u64::try_from(body.len()).unwrap_or(u64::MAX) > MAX_BODY_BYTES => {
            Outgoing::Buffered(status_only(413))
        }
        Ok(_) => respond(playground.handle(&PlaygroundRequest { url, body })),
    };
    match outgoing {
        Outgoing::Buffered(response) => {
            if let Err(error) = request.respond(response) {
                debug!(target: HTTP_TARGET, %error, "client went away before the response ended");
            }
        }
        Outgoing::Streamed(receiver) => stream_run(request, &receiver),
    }
}

fn stream_run(request: Request, receiver: &Receiver<Vec<u8>>) {
    let framing = Framing::for_version(request.http_version());
    let mut writer = request.into_writer();
    match stream::write_stream(&mut writer, receiver, framing, TEXT_TYPE) {
        Ok(bytes) => debug!(target: HTTP_TARGET, bytes, "run output streamed"),
        Err(error) => {
            debug!(target: HTTP_TARGET, %error, "client went away while the program ran");
        }
    }
}

type Body = Box<dyn Read + Send>;

/// Response ready to hand to `tiny_http`, or run output still being produced.
enum Outgoing {
    Buffered(Response<Body>),
    Streamed(Receiver<Vec<u8>>),
}

fn respond(reply: Reply) -> Outgoing {
    let response = match reply {
        Reply::Stream(receiver) => return Outgoing::Streamed(receiver),
        Reply::Empty => sized(200, Vec::new(), None),
        Reply::Text(bytes) => sized(200, bytes, Some(TEXT_TYPE)),
        Reply::Json(text) => sized(200, text.into_bytes(), Some(JSON_TYPE)),
        Reply::Redirect(location) => {
            let mut response = sized(302, Vec::new(), None);
            if let Some(header) = header("Location", &location) {
                response.add_header(header);
            }
            response
        }
        Reply::Failure => status_only(500),
    };
    Outgoing::Buffered(response)
}

fn sized(status: u16, bytes: Vec<u8>, content_type: Option<&str>) -> Response<Body> {
    let length = bytes.len();
    let headers = content_type
        .and_then(|value| header("Content-Type", value))
        .into_iter()
        .collect();
    Response::new(
        StatusCode(status),
        headers,
        Box::new(io::Cursor::new(bytes)),
        Some(length),
        None,
    )
}

fn status_only(status: u16) -> Response<Body> {
    sized(status, Vec::new(), None)
}

fn header(name: &str, value: &str) -> Option<Header> {
    Header::from_bytes(name.as_bytes(), value.as_bytes()).ok()
}
