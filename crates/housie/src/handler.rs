//! Per-connection handler: decode requests, run actions, forward
//! publications.
//!
//! Each accepted connection gets its own Tokio task running
//! [`handle_connection`]. Every `subscribe` spawns a forwarder task that
//! relays one room's publications to the connection; the forwarders are
//! aborted when the connection ends.

use std::collections::HashMap;
use std::sync::Arc;

use housie_protocol::{
    Action, ClientMessage, Codec, ErrorKind, Reply, RequestHeader, RoomCode, ServerMessage,
    StaleFilter,
};
use housie_room::{ClaimRequest, RoomRegistry};
use housie_transport::{Connection, WebSocketConnection};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use crate::HousieError;
use crate::server::ServerState;

/// Runs one action against the registry and turns the outcome into a
/// [`Reply`].
pub async fn execute(registry: &RoomRegistry, action: Action) -> Reply {
    let result = match action {
        Action::CreateRoom {
            ticket_price,
            host_ticket_count,
            host_name,
        } => registry
            .create_room(ticket_price, host_ticket_count, &host_name)
            .await
            .map(|(room, host_id)| Reply::Created {
                room_code: room.code,
                host_id,
                ticket_price: room.ticket_price,
            }),
        Action::JoinRoom {
            code,
            player_name,
            ticket_count,
        } => registry
            .join_room(&code, &player_name, ticket_count)
            .await
            .map(|(room, player_id)| Reply::Joined { room, player_id }),
        Action::LeaveRoom { code, player_id } => {
            registry.leave_room(&code, &player_id).await.map(|()| Reply::Ok)
        }
        Action::StartGame { code, host_id } => {
            registry.start_game(&code, &host_id).await.map(|()| Reply::Ok)
        }
        Action::DrawNumber { code, host_id } => registry
            .draw_number(&code, &host_id)
            .await
            .map(|number| Reply::Drawn { number }),
        Action::Claim {
            code,
            player_id,
            player_name,
            ticket_index,
            claim_types,
            jaldi_five_numbers,
        } => {
            let request = ClaimRequest {
                player_id,
                player_name,
                ticket_index,
                claim_types,
                jaldi_five_numbers,
            };
            registry
                .claim(&code, request)
                .await
                .map(|outcome| Reply::Claimed {
                    claim_types: outcome.recorded,
                    ended: outcome.ended,
                })
        }
        Action::EndRoom { code, host_id } => {
            registry.end_room(&code, &host_id).await.map(|()| Reply::Ok)
        }
        Action::GetRoom { code } => {
            return match registry.get_room(&code).await {
                Some(room) => Reply::Room { room },
                None => Reply::Error {
                    kind: ErrorKind::NotFound,
                    message: "Room not found".into(),
                },
            };
        }
        Action::UpdateTickets {
            code,
            player_id,
            ticket_count,
        } => registry
            .update_tickets(&code, &player_id, ticket_count)
            .await
            .map(|()| Reply::Ok),
    };

    result.unwrap_or_else(Reply::from)
}

/// Aborts a connection's forwarders when the handler exits, including on
/// an early `?` return.
#[derive(Default)]
struct Subscriptions {
    forwarders: HashMap<RoomCode, JoinHandle<()>>,
}

impl Subscriptions {
    fn insert(&mut self, code: RoomCode, task: JoinHandle<()>) {
        if let Some(previous) = self.forwarders.insert(code, task) {
            previous.abort();
        }
    }

    fn remove(&mut self, code: &RoomCode) {
        if let Some(task) = self.forwarders.remove(code) {
            task.abort();
        }
    }
}

impl Drop for Subscriptions {
    fn drop(&mut self) {
        for task in self.forwarders.values() {
            task.abort();
        }
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C: Codec>(
    conn: WebSocketConnection,
    state: Arc<ServerState<C>>,
) -> Result<(), HousieError> {
    let conn = Arc::new(conn);
    let conn_id = conn.id();
    let mut subscriptions = Subscriptions::default();
    tracing::debug!(%conn_id, "handling new connection");

    loop {
        let data = match tokio::time::timeout(state.idle_timeout, conn.recv()).await {
            Ok(Ok(Some(data))) => data,
            Ok(Ok(None)) => {
                tracing::debug!(%conn_id, "connection closed cleanly");
                break;
            }
            Ok(Err(e)) => {
                tracing::debug!(%conn_id, error = %e, "recv error");
                break;
            }
            Err(_) => {
                tracing::debug!(%conn_id, "connection idle, closing");
                break;
            }
        };

        let msg: ClientMessage = match state.codec.decode(&data) {
            Ok(msg) => msg,
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "failed to decode client message");
                let reply = match state.codec.decode::<RequestHeader>(&data) {
                    Ok(header) => ServerMessage::Response {
                        request_id: header.request_id,
                        reply: Reply::Error {
                            kind: ErrorKind::InvalidInput,
                            message: e.to_string(),
                        },
                    },
                    Err(_) => ServerMessage::Error { message: e.to_string() },
                };
                send(&conn, &state.codec, &reply).await?;
                continue;
            }
        };

        match msg {
            ClientMessage::Request { request_id, action } => {
                let name = action.name();
                let reply = execute(&state.registry, action).await;
                if let Reply::Error { kind, message } = &reply {
                    tracing::debug!(%conn_id, request_id, action = name, ?kind, %message, "action rejected");
                }
                send(&conn, &state.codec, &ServerMessage::Response { request_id, reply }).await?;
            }
            ClientMessage::Subscribe { code } => {
                if state.registry.get_room(&code).await.is_none() {
                    tracing::debug!(%conn_id, %code, "subscribe to unknown room refused");
                    let message = format!("Room {code} not found");
                    send(&conn, &state.codec, &ServerMessage::Error { message }).await?;
                    continue;
                }
                tracing::debug!(%conn_id, %code, "subscribed");
                let task = tokio::spawn(forward_publications(
                    Arc::clone(&conn),
                    Arc::clone(&state),
                    code.clone(),
                ));
                subscriptions.insert(code, task);
            }
            ClientMessage::Unsubscribe { code } => {
                tracing::debug!(%conn_id, %code, "unsubscribed");
                subscriptions.remove(&code);
            }
            ClientMessage::Ping => {
                send(&conn, &state.codec, &ServerMessage::Pong).await?;
            }
        }
    }

    // `subscriptions` drops here → forwarders abort.
    Ok(())
}

/// Relays one room's publications to `conn` until the topic closes or the
/// connection fails. Starts with the room's current snapshot.
async fn forward_publications<C: Codec>(
    conn: Arc<WebSocketConnection>,
    state: Arc<ServerState<C>>,
    code: RoomCode,
) {
    let mut rx = state.publisher.subscribe(&code).await;
    let mut filter = StaleFilter::new();

    if let Some(room) = state.registry.get_room(&code).await {
        let current = housie_protocol::Publication::new(room);
        if filter.accept(&current)
            && send(&conn, &state.codec, &ServerMessage::Publication(current))
                .await
                .is_err()
        {
            return;
        }
    }

    loop {
        let publication = match rx.recv().await {
            Ok(publication) => publication,
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(conn_id = %conn.id(), %code, skipped, "subscriber lagged");
                continue;
            }
            Err(RecvError::Closed) => break,
        };
        if !filter.accept(&publication) {
            tracing::debug!(conn_id = %conn.id(), %code, seq = publication.seq, "stale publication dropped");
            continue;
        }
        if let Err(e) = send(&conn, &state.codec, &ServerMessage::Publication(publication)).await {
            tracing::debug!(conn_id = %conn.id(), %code, error = %e, "forwarding stopped");
            break;
        }
    }
}

async fn send(
    conn: &WebSocketConnection,
    codec: &impl Codec,
    msg: &ServerMessage,
) -> Result<(), HousieError> {
    let bytes = codec.encode(msg)?;
    conn.send(&bytes).await?;
    Ok(())
}
