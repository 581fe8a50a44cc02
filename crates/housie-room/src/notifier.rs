//! Publication fan-out.
//!
//! Room actors push a [`Publication`] onto an unbounded queue right after
//! each mutation. One notifier task drains that queue in order and hands
//! each publication to a [`Publisher`]. Publishing is fire-and-forget: a
//! slow or failing publisher is logged and skipped, and the action that
//! caused the publication has already replied by then.
//!
//! ```text
//! room actor ──► mpsc (unbounded, FIFO) ──► notifier task ──► Publisher
//! ```

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use housie_protocol::{Publication, RoomCode};
use tokio::sync::{Mutex, broadcast, mpsc};
use tokio::task::JoinHandle;

/// Errors a [`Publisher`] may report. Never returned to the caller of an
/// action.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    /// The downstream rejected the publication.
    #[error("publish rejected: {0}")]
    Rejected(String),

    /// The downstream is gone.
    #[error("publisher closed")]
    Closed,
}

/// The seam between the engine and whatever delivers snapshots to players.
///
/// # Example
///
/// ```rust
/// use housie_protocol::Publication;
/// use housie_room::{PublishError, Publisher};
///
/// /// Logs every publication and drops it.
/// struct LogPublisher;
///
/// impl Publisher for LogPublisher {
///     async fn publish(&self, publication: Publication) -> Result<(), PublishError> {
///         println!("{} seq {}", publication.code, publication.seq);
///         Ok(())
///     }
/// }
/// ```
pub trait Publisher: Send + Sync + 'static {
    /// Delivers one publication. Called in mutation order per room.
    fn publish(
        &self,
        publication: Publication,
    ) -> impl std::future::Future<Output = Result<(), PublishError>> + Send;
}

impl<P: Publisher> Publisher for Arc<P> {
    async fn publish(&self, publication: Publication) -> Result<(), PublishError> {
        self.as_ref().publish(publication).await
    }
}

// ---------------------------------------------------------------------------
// BroadcastPublisher
// ---------------------------------------------------------------------------

/// In-process publisher with one `broadcast` topic per room code.
///
/// Subscribers that fall more than `capacity` publications behind lose the
/// oldest ones; they can recover with a fresh `getRoom`.
pub struct BroadcastPublisher {
    topics: Mutex<HashMap<RoomCode, broadcast::Sender<Publication>>>,
    capacity: usize,
}

impl BroadcastPublisher {
    pub fn new(capacity: usize) -> Self {
        Self {
            topics: Mutex::new(HashMap::new()),
            capacity: capacity.max(1),
        }
    }

    /// Subscribes to a room's publications.
    ///
    /// A topic whose receivers have all gone is dropped on its next
    /// publish.
    pub async fn subscribe(&self, code: &RoomCode) -> broadcast::Receiver<Publication> {
        let mut topics = self.topics.lock().await;
        topics
            .entry(code.clone())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// Number of live receivers on a room's topic.
    pub async fn subscriber_count(&self, code: &RoomCode) -> usize {
        self.topics
            .lock()
            .await
            .get(code)
            .map_or(0, broadcast::Sender::receiver_count)
    }

    /// Number of rooms with an open topic.
    pub async fn topic_count(&self) -> usize {
        self.topics.lock().await.len()
    }
}

impl Publisher for BroadcastPublisher {
    async fn publish(&self, publication: Publication) -> Result<(), PublishError> {
        let mut topics = self.topics.lock().await;
        let code = publication.code.clone();
        let abandoned = match topics.get(&code) {
            // No receivers is not a failure.
            Some(topic) => topic.send(publication).is_err(),
            None => false,
        };
        if abandoned {
            topics.remove(&code);
            tracing::debug!(%code, "dropped topic with no subscribers");
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Notifier task
// ---------------------------------------------------------------------------

/// The producer side of the outbound queue, held by every room actor.
pub type PublicationSender = mpsc::UnboundedSender<Publication>;

/// Spawns the notifier task and returns the queue's sender.
///
/// The task exits once every sender has been dropped and the queue is
/// drained.
pub fn spawn_notifier<P: Publisher>(
    publisher: P,
    timeout: Duration,
) -> (PublicationSender, JoinHandle<()>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let task = tokio::spawn(run_notifier(publisher, rx, timeout));
    (tx, task)
}

async fn run_notifier<P: Publisher>(
    publisher: P,
    mut queue: mpsc::UnboundedReceiver<Publication>,
    timeout: Duration,
) {
    tracing::debug!(?timeout, "notifier started");

    while let Some(publication) = queue.recv().await {
        let code = publication.code.clone();
        let seq = publication.seq;

        match tokio::time::timeout(timeout, publisher.publish(publication)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::warn!(%code, seq, error = %e, "publish failed, dropping publication");
            }
            Err(_) => {
                tracing::warn!(%code, seq, ?timeout, "publish timed out, dropping publication");
            }
        }
    }

    tracing::debug!("notifier stopped");
}
