//! Integration tests for the registry, room actors and notifier.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use housie_protocol::{ClaimType, PlayerId, Publication, RoomCode, RoomStatus};
use housie_room::{
    BroadcastPublisher, ClaimRequest, PublishError, Publisher, RoomConfig, RoomError,
    RoomRegistry, payouts,
};
use tokio::sync::mpsc;

// =========================================================================
// Test publishers
// =========================================================================

/// Forwards every publication into a channel the test can read.
struct ChannelPublisher(mpsc::UnboundedSender<Publication>);

impl Publisher for ChannelPublisher {
    async fn publish(&self, publication: Publication) -> Result<(), PublishError> {
        self.0.send(publication).map_err(|_| PublishError::Closed)
    }
}

/// Never completes.
struct StuckPublisher;

impl Publisher for StuckPublisher {
    async fn publish(&self, _publication: Publication) -> Result<(), PublishError> {
        std::future::pending::<()>().await;
        Ok(())
    }
}

// =========================================================================
// Helpers
// =========================================================================

fn recorded_registry() -> (RoomRegistry, mpsc::UnboundedReceiver<Publication>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let registry = RoomRegistry::with_publisher(RoomConfig::default(), ChannelPublisher(tx));
    (registry, rx)
}

async fn next(rx: &mut mpsc::UnboundedReceiver<Publication>) -> Publication {
    tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("publication should arrive")
        .expect("publisher channel open")
}

fn claim(player: &PlayerId, types: &[ClaimType]) -> ClaimRequest {
    ClaimRequest {
        player_id: player.clone(),
        player_name: String::new(),
        ticket_index: 0,
        claim_types: types.to_vec(),
        jaldi_five_numbers: None,
    }
}

// =========================================================================
// Creation and lookup
// =========================================================================

#[tokio::test]
async fn test_create_and_get_room_case_insensitive() {
    let (registry, _rx) = recorded_registry();
    let (snapshot, host_id) = registry.create_room(10, 2, "").await.unwrap();

    assert_eq!(snapshot.host_id, host_id);
    assert_eq!(snapshot.players[0].name, "Host");
    assert_eq!(snapshot.status, RoomStatus::Waiting);
    assert_eq!(snapshot.code.as_str().len(), 6);

    let lower = RoomCode::new(&format!(" {} ", snapshot.code.as_str().to_lowercase()));
    let fetched = registry.get_room(&lower).await.unwrap();
    assert_eq!(fetched.code, snapshot.code);
    assert_eq!(registry.room_count().await, 1);
}

#[tokio::test]
async fn test_highest_allowed_price_totals_stay_exact() {
    let (registry, _rx) = recorded_registry();
    let max_price = registry.config().max_ticket_price;
    let (room, host) = registry.create_room(max_price as i64, 6, "").await.unwrap();
    let code = room.code.clone();
    for _ in 0..5 {
        registry.join_room(&code, "", 6).await.unwrap();
    }
    registry.start_game(&code, &host).await.unwrap();

    let snap = registry.get_room(&code).await.unwrap();
    assert_eq!(snap.total_tickets, 36);
    assert_eq!(snap.total_amount, 36 * max_price);
    assert_eq!(housie_room::room_prize_pools(&snap).total(), snap.total_amount);
}

#[tokio::test]
async fn test_invalid_price_and_unknown_room() {
    let (registry, _rx) = recorded_registry();
    assert!(matches!(
        registry.create_room(0, 1, "Host").await,
        Err(RoomError::InvalidInput(_))
    ));

    assert!(matches!(
        registry.create_room(i64::MAX, 6, "Host").await,
        Err(RoomError::InvalidInput(_))
    ));
    assert_eq!(registry.room_count().await, 0);

    let missing = RoomCode::new("ZZZZZZ");
    assert!(registry.get_room(&missing).await.is_none());
    assert!(matches!(
        registry.join_room(&missing, "Ravi", 1).await,
        Err(RoomError::NotFound(_))
    ));
    assert!(matches!(
        registry.draw_number(&missing, &PlayerId::from("x")).await,
        Err(RoomError::NotFound(_))
    ));
}

// =========================================================================
// Lifecycle
// =========================================================================

#[tokio::test]
async fn test_totals_and_publications_in_order() {
    let (registry, mut rx) = recorded_registry();
    let (room, host) = registry.create_room(10, 2, "Asha").await.unwrap();
    let code = room.code.clone();

    let (_, guest) = registry.join_room(&code, "Ravi", 1).await.unwrap();
    registry.start_game(&code, &host).await.unwrap();

    let snap = registry.get_room(&code).await.unwrap();
    assert_eq!(snap.total_tickets, 3);
    assert_eq!(snap.total_amount, 30);
    assert_eq!(snap.tickets_of(&guest).len(), 1);

    let seqs: Vec<u64> = vec![next(&mut rx).await.seq, next(&mut rx).await.seq, next(&mut rx).await.seq];
    assert_eq!(seqs, vec![1, 2, 3]);
}

#[tokio::test]
async fn test_rejected_action_publishes_nothing() {
    let (registry, mut rx) = recorded_registry();
    let (room, _host) = registry.create_room(10, 1, "Asha").await.unwrap();
    let code = room.code.clone();
    assert_eq!(next(&mut rx).await.seq, 1);

    let (_, guest) = registry.join_room(&code, "Ravi", 1).await.unwrap();
    assert!(matches!(
        registry.start_game(&code, &guest).await,
        Err(RoomError::Unauthorized(_))
    ));
    registry.leave_room(&code, &guest).await.unwrap();

    assert_eq!(next(&mut rx).await.seq, 2);
    let after_leave = next(&mut rx).await;
    assert_eq!(after_leave.seq, 3);
    assert_eq!(after_leave.room.players.len(), 1);
}

#[tokio::test]
async fn test_leave_after_start_is_invalid_state() {
    let (registry, _rx) = recorded_registry();
    let (room, host) = registry.create_room(10, 1, "Asha").await.unwrap();
    let (_, guest) = registry.join_room(&room.code, "Ravi", 1).await.unwrap();
    registry.start_game(&room.code, &host).await.unwrap();

    assert!(matches!(
        registry.leave_room(&room.code, &guest).await,
        Err(RoomError::InvalidState(_))
    ));
    assert!(matches!(
        registry.update_tickets(&room.code, &guest, 3).await,
        Err(RoomError::InvalidState(_))
    ));
}

#[tokio::test]
async fn test_concurrent_draws_are_serialized() {
    let (registry, _rx) = recorded_registry();
    let registry = Arc::new(registry);
    let (room, host) = registry.create_room(10, 1, "Asha").await.unwrap();
    registry.start_game(&room.code, &host).await.unwrap();

    let mut tasks = Vec::new();
    for _ in 0..90 {
        let registry = registry.clone();
        let code = room.code.clone();
        let host = host.clone();
        tasks.push(tokio::spawn(async move {
            registry.draw_number(&code, &host).await
        }));
    }

    let mut seen = HashSet::new();
    for task in tasks {
        let number = task.await.unwrap().unwrap();
        assert!((1..=90).contains(&number));
        assert!(seen.insert(number), "{number} drawn twice");
    }
    assert_eq!(seen.len(), 90);
    assert_eq!(
        registry.draw_number(&room.code, &host).await,
        Err(RoomError::Exhausted)
    );
}

#[tokio::test]
async fn test_first_line_claim_through_registry() {
    let (registry, _rx) = recorded_registry();
    let (room, host) = registry.create_room(10, 2, "Asha").await.unwrap();
    registry.join_room(&room.code, "Ravi", 1).await.unwrap();
    registry.start_game(&room.code, &host).await.unwrap();

    let started = registry.get_room(&room.code).await.unwrap();
    let row = started.tickets_of(&host)[0].row_numbers(0);

    // Claiming too early is rejected without touching the ledger.
    assert!(matches!(
        registry.claim(&room.code, claim(&host, &[ClaimType::FirstLine])).await,
        Err(RoomError::InvalidInput(_))
    ));

    let mut completing = None;
    while completing.is_none() {
        let n = registry.draw_number(&room.code, &host).await.unwrap();
        let snap = registry.get_room(&room.code).await.unwrap();
        if row.iter().all(|r| snap.drawn_numbers.contains(r)) {
            completing = Some(n);
        }
    }

    let outcome = registry
        .claim(&room.code, claim(&host, &[ClaimType::FirstLine]))
        .await
        .unwrap();
    assert_eq!(outcome.recorded, vec![ClaimType::FirstLine]);

    let snap = registry.get_room(&room.code).await.unwrap();
    assert_eq!(snap.claims.first_line_claimed[0].winning_number, completing.unwrap());

    let table = payouts(&snap);
    assert_eq!(table.len(), 1);
    assert_eq!(table[0].amount, 5);
}

#[tokio::test]
async fn test_housie_ends_room() {
    let (registry, _rx) = recorded_registry();
    let (room, host) = registry.create_room(10, 1, "Asha").await.unwrap();
    registry.start_game(&room.code, &host).await.unwrap();
    for _ in 0..90 {
        registry.draw_number(&room.code, &host).await.unwrap();
    }

    let outcome = registry
        .claim(&room.code, claim(&host, &[ClaimType::FirstLine, ClaimType::Housie]))
        .await
        .unwrap();
    assert!(outcome.ended);
    assert_eq!(outcome.recorded.len(), 2);

    let snap = registry.get_room(&room.code).await.unwrap();
    assert_eq!(snap.status, RoomStatus::Ended);
    assert!(matches!(
        registry.draw_number(&room.code, &host).await,
        Err(RoomError::InvalidState(_))
    ));
    assert!(matches!(
        registry.end_room(&room.code, &host).await,
        Err(RoomError::InvalidState(_))
    ));
}

// =========================================================================
// Publishing
// =========================================================================

#[tokio::test]
async fn test_stuck_publisher_does_not_block_actions() {
    let config = RoomConfig {
        publish_timeout: Duration::from_millis(50),
        ..RoomConfig::default()
    };
    let registry = RoomRegistry::with_publisher(config, StuckPublisher);

    let result = tokio::time::timeout(Duration::from_millis(500), async {
        let (room, host) = registry.create_room(10, 1, "Asha").await?;
        registry.start_game(&room.code, &host).await?;
        for _ in 0..20 {
            registry.draw_number(&room.code, &host).await?;
        }
        Ok::<_, RoomError>(room.code)
    })
    .await;

    let code = result.expect("actions should not wait on the publisher").unwrap();
    assert_eq!(registry.get_room(&code).await.unwrap().drawn_numbers.len(), 20);
}

#[tokio::test]
async fn test_broadcast_subscribers_see_every_mutation() {
    let publisher = Arc::new(BroadcastPublisher::new(64));
    let registry = RoomRegistry::with_publisher(RoomConfig::default(), publisher.clone());

    let (room, host) = registry.create_room(10, 1, "Asha").await.unwrap();
    let mut rx = publisher.subscribe(&room.code).await;

    registry.join_room(&room.code, "Ravi", 2).await.unwrap();
    registry.start_game(&room.code, &host).await.unwrap();
    let number = registry.draw_number(&room.code, &host).await.unwrap();

    // The creation publication may or may not land before we subscribed.
    let mut seqs = Vec::new();
    let last = loop {
        let publication = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap()
            .unwrap();
        seqs.push(publication.seq);
        if publication.seq == 4 {
            break publication;
        }
    };
    seqs.retain(|&seq| seq > 1);
    assert_eq!(seqs, vec![2, 3, 4]);
    assert_eq!(last.room.drawn_numbers, vec![number]);
}
