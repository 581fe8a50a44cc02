//! Room configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Settings shared by every room a registry creates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomConfig {
    /// Upper bound on a player's ticket count. Joiners are clamped to
    /// `1..=max_tickets`, the host to `0..=max_tickets`.
    pub max_tickets: u8,

    /// Highest ticket price a room accepts. Keeps pool totals well inside
    /// `u64`.
    pub max_ticket_price: u64,

    /// Name used when the host leaves theirs blank.
    pub default_host_name: String,

    /// Name used when a joiner leaves theirs blank.
    pub default_player_name: String,

    /// Command channel capacity of each room actor.
    pub channel_size: usize,

    /// How long the notifier waits on one publish before dropping it.
    pub publish_timeout: Duration,

    /// Per-room buffer of the in-process broadcast topic.
    pub broadcast_capacity: usize,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            max_tickets: housie_ticket::MAX_TICKETS as u8,
            max_ticket_price: 1_000_000_000,
            default_host_name: "Host".to_string(),
            default_player_name: "Player".to_string(),
            channel_size: 64,
            publish_timeout: Duration::from_millis(250),
            broadcast_capacity: 128,
        }
    }
}

impl RoomConfig {
    /// Clamps a requested host ticket count.
    pub fn clamp_host_tickets(&self, requested: i64) -> u8 {
        requested.clamp(0, i64::from(self.max_tickets)) as u8
    }

    /// Clamps a requested joiner ticket count.
    pub fn clamp_player_tickets(&self, requested: i64) -> u8 {
        requested.clamp(1, i64::from(self.max_tickets.max(1))) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_config_default() {
        let config = RoomConfig::default();
        assert_eq!(config.max_tickets, 6);
        assert_eq!(config.max_ticket_price, 1_000_000_000);
        assert_eq!(config.default_host_name, "Host");
        assert_eq!(config.default_player_name, "Player");
        assert_eq!(config.publish_timeout, Duration::from_millis(250));
    }

    #[test]
    fn test_ticket_clamping() {
        let config = RoomConfig::default();
        assert_eq!(config.clamp_host_tickets(-4), 0);
        assert_eq!(config.clamp_host_tickets(0), 0);
        assert_eq!(config.clamp_host_tickets(9), 6);
        assert_eq!(config.clamp_player_tickets(0), 1);
        assert_eq!(config.clamp_player_tickets(3), 3);
        assert_eq!(config.clamp_player_tickets(100), 6);
    }
}
