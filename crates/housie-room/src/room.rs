//! Room actor: an isolated Tokio task that owns one [`Room`].
//!
//! Mutations arrive over a bounded mpsc channel and are applied one at a
//! time, which is what keeps a room atomic under concurrent callers.
//! After each successful mutation the actor refreshes a `watch` channel
//! with the new snapshot and enqueues a publication. Reads go straight to
//! the `watch` channel and never wait behind writes.

use housie_protocol::{PlayerId, Publication, RoomCode, RoomSnapshot};
use tokio::sync::{mpsc, oneshot, watch};

use crate::claim::{ClaimOutcome, ClaimRequest};
use crate::notifier::PublicationSender;
use crate::state::Room;
use crate::RoomError;

type Reply<T> = oneshot::Sender<Result<T, RoomError>>;

/// Commands sent to a room actor through its channel.
pub(crate) enum RoomCommand {
    Join {
        name: String,
        ticket_count: i64,
        reply: Reply<(RoomSnapshot, PlayerId)>,
    },
    Leave {
        player_id: PlayerId,
        reply: Reply<()>,
    },
    UpdateTickets {
        player_id: PlayerId,
        ticket_count: i64,
        reply: Reply<()>,
    },
    Start {
        host_id: PlayerId,
        reply: Reply<()>,
    },
    Draw {
        host_id: PlayerId,
        reply: Reply<u8>,
    },
    Claim {
        request: ClaimRequest,
        reply: Reply<ClaimOutcome>,
    },
    End {
        host_id: PlayerId,
        reply: Reply<()>,
    },
}

/// Handle to a running room actor.
///
/// Cheap to clone: an `mpsc::Sender` and a `watch::Receiver`.
#[derive(Clone)]
pub struct RoomHandle {
    code: RoomCode,
    sender: mpsc::Sender<RoomCommand>,
    snapshot: watch::Receiver<RoomSnapshot>,
}

impl RoomHandle {
    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    /// A copy of the latest published state.
    pub fn snapshot(&self) -> RoomSnapshot {
        self.snapshot.borrow().clone()
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(Reply<T>) -> RoomCommand,
    ) -> Result<T, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(build(reply_tx))
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))?
    }

    pub async fn join(
        &self,
        name: String,
        ticket_count: i64,
    ) -> Result<(RoomSnapshot, PlayerId), RoomError> {
        self.request(|reply| RoomCommand::Join {
            name,
            ticket_count,
            reply,
        })
        .await
    }

    pub async fn leave(&self, player_id: PlayerId) -> Result<(), RoomError> {
        self.request(|reply| RoomCommand::Leave { player_id, reply })
            .await
    }

    pub async fn update_tickets(
        &self,
        player_id: PlayerId,
        ticket_count: i64,
    ) -> Result<(), RoomError> {
        self.request(|reply| RoomCommand::UpdateTickets {
            player_id,
            ticket_count,
            reply,
        })
        .await
    }

    pub async fn start(&self, host_id: PlayerId) -> Result<(), RoomError> {
        self.request(|reply| RoomCommand::Start { host_id, reply })
            .await
    }

    pub async fn draw(&self, host_id: PlayerId) -> Result<u8, RoomError> {
        self.request(|reply| RoomCommand::Draw { host_id, reply })
            .await
    }

    pub async fn claim(
        &self,
        request: ClaimRequest,
    ) -> Result<ClaimOutcome, RoomError> {
        self.request(|reply| RoomCommand::Claim { request, reply })
            .await
    }

    pub async fn end(&self, host_id: PlayerId) -> Result<(), RoomError> {
        self.request(|reply| RoomCommand::End { host_id, reply })
            .await
    }
}

/// The internal actor state. Runs inside a Tokio task.
struct RoomActor {
    room: Room,
    receiver: mpsc::Receiver<RoomCommand>,
    snapshot: watch::Sender<RoomSnapshot>,
    outbound: PublicationSender,
}

impl RoomActor {
    async fn run(mut self) {
        let code = self.room.code().clone();
        tracing::debug!(%code, "room actor started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                RoomCommand::Join {
                    name,
                    ticket_count,
                    reply,
                } => {
                    let result = self.room.join(&name, ticket_count);
                    let result = self.settle(result).map(|id| (self.room.snapshot(), id));
                    let _ = reply.send(result);
                }
                RoomCommand::Leave { player_id, reply } => {
                    let result = self.room.leave(&player_id);
                    let _ = reply.send(self.settle(result));
                }
                RoomCommand::UpdateTickets {
                    player_id,
                    ticket_count,
                    reply,
                } => {
                    let result = self.room.update_tickets(&player_id, ticket_count);
                    let _ = reply.send(self.settle(result));
                }
                RoomCommand::Start { host_id, reply } => {
                    let result = self.room.start(&host_id);
                    let _ = reply.send(self.settle(result));
                }
                RoomCommand::Draw { host_id, reply } => {
                    let result = self.room.draw(&host_id);
                    let _ = reply.send(self.settle(result));
                }
                RoomCommand::Claim { request, reply } => {
                    let result = self.room.claim(request);
                    let _ = reply.send(self.settle(result));
                }
                RoomCommand::End { host_id, reply } => {
                    let result = self.room.end(&host_id);
                    let _ = reply.send(self.settle(result));
                }
            }
        }

        tracing::debug!(%code, "room actor stopped");
    }

    /// Publishes after a successful mutation; logs a rejection otherwise.
    fn settle<T>(&self, result: Result<T, RoomError>) -> Result<T, RoomError> {
        match &result {
            Ok(_) => self.publish(),
            Err(e) => {
                tracing::debug!(code = %self.room.code(), error = %e, "action rejected");
            }
        }
        result
    }

    fn publish(&self) {
        let snapshot = self.room.snapshot();
        self.snapshot.send_replace(snapshot.clone());
        if self.outbound.send(Publication::new(snapshot)).is_err() {
            tracing::warn!(
                code = %self.room.code(),
                seq = self.room.seq(),
                "notifier queue closed, publication dropped"
            );
        }
    }
}

/// Spawns a room actor, publishes its first snapshot, and returns a handle.
///
/// `channel_size` bounds the command queue; senders wait when it is full.
pub(crate) fn spawn_room(
    room: Room,
    outbound: PublicationSender,
    channel_size: usize,
) -> RoomHandle {
    let (tx, rx) = mpsc::channel(channel_size.max(1));
    let (snapshot_tx, snapshot_rx) = watch::channel(room.snapshot());
    let code = room.code().clone();

    let actor = RoomActor {
        room,
        receiver: rx,
        snapshot: snapshot_tx,
        outbound,
    };
    actor.publish();
    tokio::spawn(actor.run());

    RoomHandle {
        code,
        sender: tx,
        snapshot: snapshot_rx,
    }
}
