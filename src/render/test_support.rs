//! In-process stand-in for a Kroki server, used by unit tests.

use std::net::TcpListener as StdTcpListener;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, State},
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};

/// PNG signature and IHDR tag; the content is never decoded.
const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

#[derive(Debug, Clone, Copy)]
pub(crate) enum EngineBehavior {
    /// Renders everything except sources containing "syntax error"
    Ok,
    /// Every request answers 503
    Unavailable,
    /// The first N render requests answer 503
    FailFirst(usize),
    /// Sleeps before answering successfully, health probes included
    Slow(Duration),
}

#[derive(Clone)]
struct EngineState {
    behavior: EngineBehavior,
    render_calls: Arc<AtomicUsize>,
}

pub(crate) struct MockEngine {
    pub url: String,
    pub render_calls: Arc<AtomicUsize>,
}

pub(crate) async fn spawn_engine(behavior: EngineBehavior) -> MockEngine {
    let render_calls = Arc::new(AtomicUsize::new(0));
    let state = EngineState {
        behavior,
        render_calls: render_calls.clone(),
    };

    let app = Router::new()
        .route("/health", get(health))
        .route("/:format/:output", post(render))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockEngine {
        url: format!("http://{}", addr),
        render_calls,
    }
}

/// URL of a port nothing is listening on.
pub(crate) fn refused_url() -> String {
    let listener = StdTcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

async fn health(State(state): State<EngineState>) -> Response {
    match state.behavior {
        EngineBehavior::Unavailable => StatusCode::SERVICE_UNAVAILABLE.into_response(),
        EngineBehavior::Slow(delay) => {
            tokio::time::sleep(delay).await;
            (StatusCode::OK, r#"{"status":"pass"}"#).into_response()
        }
        _ => (StatusCode::OK, r#"{"status":"pass"}"#).into_response(),
    }
}

async fn render(
    State(state): State<EngineState>,
    Path((format, output)): Path<(String, String)>,
    body: String,
) -> Response {
    let previous = state.render_calls.fetch_add(1, Ordering::SeqCst);

    match state.behavior {
        EngineBehavior::Unavailable => {
            return (StatusCode::SERVICE_UNAVAILABLE, "engine overloaded").into_response();
        }
        EngineBehavior::FailFirst(n) if previous < n => {
            return (StatusCode::SERVICE_UNAVAILABLE, "warming up").into_response();
        }
        EngineBehavior::Slow(delay) => tokio::time::sleep(delay).await,
        _ => {}
    }

    if body.contains("syntax error") {
        return (
            StatusCode::BAD_REQUEST,
            "Error 400: Syntax error in text (line 1)",
        )
            .into_response();
    }

    match output.as_str() {
        "png" => ([(CONTENT_TYPE, "image/png")], PNG_BYTES.to_vec()).into_response(),
        _ => (
            [(CONTENT_TYPE, "image/svg+xml")],
            format!(
                "<svg xmlns=\"http://www.w3.org/2000/svg\"><!-- {} {} bytes --></svg>",
                format,
                body.len()
            ),
        )
            .into_response(),
    }
}
