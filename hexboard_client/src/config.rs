// Client-side configuration and connection state.

use hexboard_board::HexLayout;

/// Where a `SyncClient` is in its connection lifecycle. `Synced` is the only
/// steady state; there is no separate reconnecting state and no handshake
/// that reconciles boards after a reconnect.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Synced,
}

#[derive(Clone, Debug)]
pub struct SyncConfig {
    /// Name sent in `Hello`. Only shows up in relay logs.
    pub player_name: String,
    /// On a snapshot of the wrong length, ask peers for a full state.
    pub resync_on_fault: bool,
    /// Pixel geometry used by the pointer operations.
    pub layout: HexLayout,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            player_name: "player".into(),
            resync_on_fault: true,
            layout: HexLayout::default(),
        }
    }
}
