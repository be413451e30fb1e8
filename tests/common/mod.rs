//! Shared helpers for integration tests: a scripted HTTP server and a
//! tracing layer that records log messages.

#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::extract::State;
use axum::http::header::{ETAG, IF_NONE_MATCH};
use axum::http::{HeaderMap, Response, StatusCode};
use reqwest::Url;
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

/// One scripted HTTP response.
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: StatusCode,
    pub body: String,
    pub etag: Option<String>,
}

impl Reply {
    pub fn ok(body: &str) -> Self {
        Self {
            status: StatusCode::OK,
            body: body.to_string(),
            etag: None,
        }
    }

    pub fn ok_with_etag(body: &str, etag: &str) -> Self {
        Self {
            etag: Some(etag.to_string()),
            ..Self::ok(body)
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status: StatusCode::from_u16(status).unwrap(),
            body: String::new(),
            etag: None,
        }
    }
}

#[derive(Default)]
struct ServerState {
    replies: Mutex<VecDeque<Reply>>,
    if_none_match: Mutex<Vec<Option<String>>>,
}

/// HTTP server answering every request with the next scripted reply.
///
/// Once the script runs out every request gets a 500.
pub struct TestServer {
    addr: SocketAddr,
    state: Arc<ServerState>,
}

impl TestServer {
    pub async fn start(replies: Vec<Reply>) -> Self {
        let state = Arc::new(ServerState {
            replies: Mutex::new(replies.into()),
            if_none_match: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .fallback(handle)
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, state }
    }

    pub fn url(&self, path: &str) -> Url {
        Url::parse(&format!("http://{}{path}", self.addr)).unwrap()
    }

    /// `If-None-Match` value of each request received so far, in order.
    pub fn if_none_match(&self) -> Vec<Option<String>> {
        self.state.if_none_match.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.state.if_none_match.lock().unwrap().len()
    }
}

async fn handle(State(state): State<Arc<ServerState>>, headers: HeaderMap) -> Response<Body> {
    let etag = headers
        .get(IF_NONE_MATCH)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    state.if_none_match.lock().unwrap().push(etag);

    let reply = state
        .replies
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or_else(|| Reply::status(500));

    let mut builder = Response::builder().status(reply.status);
    if let Some(etag) = reply.etag {
        builder = builder.header(ETAG, etag);
    }
    builder.body(Body::from(reply.body)).unwrap()
}

/// URL on a local port nothing listens on.
pub fn closed_port_url(path: &str) -> Url {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    Url::parse(&format!("http://{addr}{path}")).unwrap()
}

/// Captured log event.
#[derive(Debug, Clone)]
pub struct LogLine {
    pub level: Level,
    pub message: String,
}

/// Records log events emitted while its guard is alive on this thread.
#[derive(Clone, Default)]
pub struct LogCapture {
    lines: Arc<Mutex<Vec<LogLine>>>,
}

impl LogCapture {
    /// Install the capture as the thread's default subscriber.
    pub fn install() -> (Self, tracing::subscriber::DefaultGuard) {
        let capture = Self::default();
        let subscriber = tracing_subscriber::registry().with(capture.clone());
        let guard = tracing::subscriber::set_default(subscriber);
        (capture, guard)
    }

    pub fn lines(&self) -> Vec<LogLine> {
        self.lines.lock().unwrap().clone()
    }

    pub fn contains(&self, level: Level, message: &str) -> bool {
        self.lines()
            .iter()
            .any(|line| line.level == level && line.message == message)
    }

    pub fn count(&self, message: &str) -> usize {
        self.lines()
            .iter()
            .filter(|line| line.message == message)
            .count()
    }
}

impl<S: Subscriber> Layer<S> for LogCapture {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        self.lines.lock().unwrap().push(LogLine {
            level: *event.metadata().level(),
            message: visitor.message,
        });
    }
}

#[derive(Default)]
struct MessageVisitor {
    message: String,
}

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        }
    }
}
