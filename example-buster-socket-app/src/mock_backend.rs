//! A stand-in for the Buster API's real-time endpoint, good enough to drive
//! the client end to end. It answers a handful of routes with canned data and
//! has no authentication of its own.

use axum::{
    Router,
    extract::ConnectInfo,
    extract::ws::{Message, WebSocket, WebSocketUpgrade},
    response::IntoResponse,
    routing::get,
};
use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

#[derive(Debug, Default, Clone, Copy)]
pub struct MockBackend;

impl MockBackend {
    /// Serves `/api/v1/ws` on a pre-bound listener until the task is dropped.
    pub async fn serve_with_listener(self, listener: TcpListener) -> Result<SocketAddr, axum::BoxError> {
        let address = listener.local_addr()?;
        let app = Router::new().route("/api/v1/ws", get(Self::ws_handler));

        tracing::info!("Mock backend running on {:?}", address);
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await?;
        Ok(address)
    }

    async fn ws_handler(
        ws: WebSocketUpgrade,
        ConnectInfo(addr): ConnectInfo<SocketAddr>,
    ) -> impl IntoResponse {
        tracing::info!("Client connected: {}", addr);
        ws.on_upgrade(move |socket| Self::handle_socket(socket, addr))
    }

    async fn handle_socket(socket: WebSocket, addr: SocketAddr) {
        let (mut sender, mut receiver) = socket.split();
        let (tx, mut rx) = mpsc::unbounded_channel::<Value>();

        tokio::spawn(async move {
            while let Some(frame) = rx.recv().await {
                if sender
                    .send(Message::Text(frame.to_string().into()))
                    .await
                    .is_err()
                {
                    break;
                }
            }
        });

        while let Some(Ok(message)) = receiver.next().await {
            let Message::Text(text) = message else {
                continue;
            };

            let request: Value = match serde_json::from_str(text.as_str()) {
                Ok(request) => request,
                Err(e) => {
                    tracing::warn!("Ignoring malformed request from {}: {}", addr, e);
                    continue;
                }
            };

            for reply in Self::respond(&request) {
                if tx.send(reply).is_err() {
                    return;
                }
            }
        }

        tracing::info!("Client {} disconnected", addr);
    }

    /// Replies for one request, in the order they are sent.
    fn respond(request: &Value) -> Vec<Value> {
        let route = request["route"].as_str().unwrap_or_default();
        let payload = &request["payload"];

        match route {
            "/search" => {
                let query = payload["query"].as_str().unwrap_or_default();
                vec![json!({
                    "route": "/search",
                    "event": "search",
                    "payload": [
                        {
                            "id": "d1",
                            "name": format!("{query} overview"),
                            "highlights": [query],
                            "updated_at": "2024-06-01T12:00:00Z",
                            "type": "dashboard",
                            "score": 0.92
                        },
                        {
                            "id": "t7",
                            "name": format!("Weekly {query}"),
                            "highlights": [],
                            "updated_at": "2024-05-28T09:30:00Z",
                            "type": "thread",
                            "score": 0.61
                        }
                    ]
                })]
            }
            "/data_sources/get" => match payload["id"].as_str() {
                Some("missing") | None => vec![json!({
                    "route": "/data_sources/get",
                    "event": "getDataSource",
                    "error": {"code": "NOT_FOUND", "message": "Data source not found"}
                })],
                Some(id) => vec![json!({
                    "route": "/data_sources/get",
                    "event": "getDataSource",
                    "payload": {
                        "id": id,
                        "name": "Analytics warehouse",
                        "type": "postgres",
                        "created_at": "2024-01-15T08:00:00Z"
                    }
                })],
            },
            "/threads/list" => vec![
                json!({
                    "route": "/threads/list",
                    "event": "getThreadsList",
                    "payload": [
                        {"id": "t7", "title": "Weekly revenue", "is_shared": true},
                        {"id": "t9", "title": "Churn by cohort", "is_shared": false}
                    ]
                }),
                json!({
                    "route": "/threads/get",
                    "event": "fetchingData",
                    "payload": {
                        "thread_id": "t7",
                        "message_id": "m1",
                        "progress": "inProgress"
                    }
                }),
                json!({
                    "route": "/threads/get",
                    "event": "fetchingData",
                    "payload": {
                        "thread_id": "t7",
                        "message_id": "m1",
                        "progress": "completed",
                        "data": [{"week": "2024-W22", "revenue": 18250}]
                    }
                }),
            ],
            other => {
                tracing::debug!("No canned reply for {}", other);
                Vec::new()
            }
        }
    }
}
