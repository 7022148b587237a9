//! Live-reload development server
//!
//! Proxies the upstream WordPress site, injects a small client into HTML
//! pages and streams [`ReloadSignal`](crate::reload::ReloadSignal)s to it
//! over server-sent events. Runs its own tokio runtime on a dedicated thread
//! so the rest of the tool stays synchronous.

mod proxy;

use std::convert::Infallible;
use std::net::SocketAddr;
use std::process::Command;
use std::sync::{mpsc, Arc};
use std::thread::JoinHandle;

use axum::extract::State;
use axum::http::header;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use futures_util::stream::{self, Stream};
use regex::Regex;
use reqwest::Url;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::oneshot;

use crate::config::ServerConfig;
use crate::error::{ForgeError, ForgeResult};
use crate::events::{EventSink, TaskEvent};
use crate::reload::ReloadHub;

pub use proxy::{inject_client, is_html, origin_of, rewrite_origin};

/// SSE endpoint the injected client subscribes to
pub const EVENTS_PATH: &str = "/__pressforge/events";
/// Injected client script
pub const CLIENT_PATH: &str = "/__pressforge/client.js";

const CLIENT_JS: &str = include_str!("client.js");

/// Shared by every request handler
#[derive(Clone)]
pub(crate) struct ServerState {
    client: reqwest::Client,
    hub: ReloadHub,
    upstream_origin: Arc<str>,
    local_origin: Arc<str>,
    snippet: Arc<str>,
    body_close: Regex,
}

/// Handle to a running server; stops it when dropped.
pub struct DevServer {
    url: String,
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl DevServer {
    /// Bind, start serving and report `ServerListening`.
    ///
    /// Fails if the proxy URL is invalid or the address cannot be bound.
    pub fn spawn(
        config: &ServerConfig,
        hub: ReloadHub,
        events: Arc<dyn EventSink>,
    ) -> ForgeResult<Self> {
        let upstream = Url::parse(&config.proxy)
            .map_err(|e| ForgeError::Server(format!("invalid proxy url '{}': {}", config.proxy, e)))?;
        let upstream_origin = proxy::origin_of(&upstream)?;
        let body_close = proxy::body_close_pattern()?;
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| ForgeError::Server(e.to_string()))?;

        let host = config.host.clone();
        let port = config.port;
        let (ready_tx, ready_rx) = mpsc::channel::<ForgeResult<SocketAddr>>();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let thread = std::thread::spawn(move || {
            let runtime = match tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
            {
                Ok(rt) => rt,
                Err(e) => {
                    let _ = ready_tx.send(Err(ForgeError::Server(e.to_string())));
                    return;
                }
            };

            runtime.block_on(async move {
                let listener = match tokio::net::TcpListener::bind((host.as_str(), port)).await {
                    Ok(listener) => listener,
                    Err(e) => {
                        let _ = ready_tx.send(Err(ForgeError::Server(format!(
                            "cannot bind {}:{}: {}",
                            host, port, e
                        ))));
                        return;
                    }
                };
                let addr = match listener.local_addr() {
                    Ok(addr) => addr,
                    Err(e) => {
                        let _ = ready_tx.send(Err(ForgeError::Io(e)));
                        return;
                    }
                };

                let state = ServerState {
                    client,
                    hub,
                    upstream_origin: upstream_origin.into(),
                    local_origin: format!("http://{}:{}", host, addr.port()).into(),
                    snippet: format!("<script src=\"{}\" async></script>", CLIENT_PATH).into(),
                    body_close,
                };
                let _ = ready_tx.send(Ok(addr));

                let _ = axum::serve(listener, router(state))
                    .with_graceful_shutdown(async {
                        let _ = shutdown_rx.await;
                    })
                    .await;
            });
        });

        let addr = match ready_rx.recv() {
            Ok(result) => result?,
            Err(_) => return Err(ForgeError::Server("server thread exited".to_string())),
        };

        let url = format!("http://{}:{}{}", config.host, addr.port(), upstream.path());
        events.on_event(TaskEvent::ServerListening {
            url: url.clone(),
            proxy: config.proxy.clone(),
        });

        Ok(Self {
            url,
            addr,
            shutdown: Some(shutdown_tx),
            thread: Some(thread),
        })
    }

    /// Local URL mirroring the upstream page
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Stop serving and wait for the server thread.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for DevServer {
    fn drop(&mut self) {
        self.stop();
    }
}

fn router(state: ServerState) -> Router {
    Router::new()
        .route(CLIENT_PATH, get(client_script))
        .route(EVENTS_PATH, get(reload_events))
        .fallback(proxy::forward)
        .with_state(state)
}

async fn client_script() -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "application/javascript; charset=utf-8"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        CLIENT_JS,
    )
}

async fn reload_events(
    State(state): State<ServerState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.hub.subscribe();
    let stream = stream::unfold(rx, |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(signal) => {
                    let event = Event::default()
                        .event(signal.event_name())
                        .data(signal.data());
                    return Some((Ok::<_, Infallible>(event), rx));
                }
                // slow browser; newer signals supersede the dropped ones
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => return None,
            }
        }
    });
    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// Open `url` in the default browser. Failures are reported, not fatal.
pub fn open_browser(url: &str, events: &dyn EventSink) {
    let result = if cfg!(target_os = "macos") {
        Command::new("open").arg(url).spawn()
    } else if cfg!(target_os = "windows") {
        Command::new("cmd").args(["/C", "start", "", url]).spawn()
    } else {
        Command::new("xdg-open").arg(url).spawn()
    };

    if let Err(e) = result {
        events.on_event(TaskEvent::Error {
            message: format!("could not open browser: {}", e),
        });
    }
}
