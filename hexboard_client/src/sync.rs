// SyncClient: one participant's board plus its relay connection.
//
// Owns exactly one `BoardState`. Local operations mutate it and then
// broadcast the whole sequence as a `move`; inbound events are applied in
// arrival order, so the last snapshot received wins. Nothing here detects
// or merges concurrent edits.
//
// Inbound handling is split in two so tests can control interleaving:
// `receive` moves relayed frames from the `NetClient` into a local queue and
// `apply_pending` applies that queue. `pump` does both. `apply_event` is
// the pure step underneath and needs no network at all.
//
// Fault path: a `move` whose length differs from the local board is refused
// (the board is left untouched), counted, and logged. With
// `resync_on_fault` set the client then broadcasts one `snapshot_request`;
// every peer answers with a `full_state` addressed to this client, which
// replaces the whole sequence, kinds included. Until one arrives further
// faults do not send more requests, and this client declines to answer
// other clients' requests so a board awaiting repair is never handed out.
// Any peer that answers has already applied the snapshot that caused the
// fault (the relay preserves per-sender order), so all answers agree with
// the latest sender and the last one applied wins. A `move` that applies
// cleanly also ends the wait. If every peer is awaiting repair at once,
// nobody answers until one of them applies a clean `move`.
//
// A send failure or a closed socket drops the client to `Disconnected`.
// Local edits keep working offline and are not replayed on reconnect.

use std::collections::VecDeque;

use hexboard_board::{
    AxialCoord, BoardError, BoardState, GRAB_RADIUS, Piece, PieceKind, PixelPoint, Rotation,
    SnapshotError,
};
use hexboard_prng::DiceRng;
use hexboard_protocol::event::BoardEvent;
use hexboard_protocol::message::ServerMessage;
use hexboard_protocol::types::RelayPlayerId;
use hexboard_relay::client::{ClientError, NetClient, WelcomeInfo};

use crate::config::{ConnectionState, SyncConfig};

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("no relay address to reconnect to")]
    NeverConnected,
    #[error(transparent)]
    Client(#[from] ClientError),
}

/// What applying one inbound event did.
#[derive(Clone, Debug, PartialEq)]
pub enum Applied {
    /// A `move` overwrote the board.
    Moved,
    /// A `roll` updated the display.
    Rolled(i32),
    /// A `full_state` addressed to us replaced the board.
    Loaded,
    /// A `move` was refused. `reply` is the repair request to broadcast, if
    /// any.
    Faulted {
        error: SnapshotError,
        reply: Option<BoardEvent>,
    },
    /// A peer asked for our board; `0` is the answer to broadcast.
    Answered(BoardEvent),
    /// Repair traffic this client does not act on: a `full_state` for
    /// someone else, or a request while our own board awaits repair.
    Ignored,
}

impl Applied {
    /// The event this outcome wants broadcast back, if any.
    pub fn reply(&self) -> Option<&BoardEvent> {
        match self {
            Applied::Faulted { reply, .. } => reply.as_ref(),
            Applied::Answered(event) => Some(event),
            _ => None,
        }
    }
}

/// Result of releasing the pointer over the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DropOutcome {
    /// The grabbed piece moved to `to`.
    Moved { index: usize, to: AxialCoord },
    /// Nothing was grabbed and the cell was empty: a new piece was added.
    Added { index: usize, at: AxialCoord },
    /// Nothing was grabbed and a piece already sits on the cell.
    Occupied { index: usize },
}

pub struct SyncClient {
    config: SyncConfig,
    board: BoardState,
    net: Option<NetClient>,
    state: ConnectionState,
    player_id: Option<RelayPlayerId>,
    relay_addr: Option<String>,
    inbox: VecDeque<(RelayPlayerId, BoardEvent)>,
    dragging: Option<usize>,
    roll_display: Option<String>,
    last_applied_from: Option<RelayPlayerId>,
    sync_faults: u64,
    resync_pending: bool,
}

impl SyncClient {
    /// A disconnected client holding the starting roster.
    pub fn new(config: SyncConfig) -> Self {
        Self::with_board(config, BoardState::starting_roster())
    }

    pub fn with_board(config: SyncConfig, board: BoardState) -> Self {
        Self {
            config,
            board,
            net: None,
            state: ConnectionState::Disconnected,
            player_id: None,
            relay_addr: None,
            inbox: VecDeque::new(),
            dragging: None,
            roll_display: None,
            last_applied_from: None,
            sync_faults: 0,
            resync_pending: false,
        }
    }

    // -----------------------------------------------------------------------
    // Connection
    // -----------------------------------------------------------------------

    /// Connect to a relay. Any existing connection is closed first. The
    /// board is not touched; a fresh client keeps its starting roster until
    /// a peer broadcasts.
    pub fn connect(&mut self, relay_addr: &str) -> Result<WelcomeInfo, SyncError> {
        self.disconnect();
        self.relay_addr = Some(relay_addr.to_owned());
        self.state = ConnectionState::Connecting;
        log::debug!("connecting to {relay_addr}");

        match NetClient::connect(relay_addr, &self.config.player_name) {
            Ok((net, welcome)) => {
                self.player_id = Some(welcome.player_id);
                self.net = Some(net);
                self.state = ConnectionState::Synced;
                Ok(welcome)
            }
            Err(e) => {
                log::warn!("could not join relay at {relay_addr}: {e}");
                self.state = ConnectionState::Disconnected;
                Err(e.into())
            }
        }
    }

    /// Leave the relay. Queued inbound events are discarded; the board,
    /// roll display and fault counters are kept.
    pub fn disconnect(&mut self) {
        if let Some(mut net) = self.net.take() {
            net.disconnect();
            log::info!("left relay as {}", net.player_id());
        }
        self.inbox.clear();
        self.resync_pending = false;
        self.state = ConnectionState::Disconnected;
    }

    /// Drop and re-open the connection to the last relay address, keeping
    /// whatever board this client holds. Peers are not asked for their
    /// state; call `request_full_state` for that.
    pub fn reconnect(&mut self) -> Result<WelcomeInfo, SyncError> {
        let addr = self.relay_addr.clone().ok_or(SyncError::NeverConnected)?;
        self.connect(&addr)
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.state
    }

    /// Relay-assigned id of the current (or most recent) connection.
    pub fn player_id(&self) -> Option<RelayPlayerId> {
        self.player_id
    }

    // -----------------------------------------------------------------------
    // Read access
    // -----------------------------------------------------------------------

    pub fn board(&self) -> &BoardState {
        &self.board
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Text of the most recent roll, local or remote: `"Result: N"`.
    pub fn roll_display(&self) -> Option<&str> {
        self.roll_display.as_deref()
    }

    /// Sender of the snapshot currently on the board, if it came from a peer.
    pub fn last_applied_from(&self) -> Option<RelayPlayerId> {
        self.last_applied_from
    }

    /// Snapshots refused because their length did not match.
    pub fn sync_faults(&self) -> u64 {
        self.sync_faults
    }

    /// A `snapshot_request` is out and no `full_state` has answered it yet.
    pub fn resync_pending(&self) -> bool {
        self.resync_pending
    }

    /// Inbound events received but not yet applied.
    pub fn pending(&self) -> usize {
        self.inbox.len()
    }

    // -----------------------------------------------------------------------
    // Local operations: mutate, then broadcast the whole board
    // -----------------------------------------------------------------------

    pub fn add_piece(&mut self, position: AxialCoord, kind: PieceKind) -> Piece {
        let piece = self.board.add_piece(position, kind);
        self.broadcast_board();
        piece
    }

    pub fn remove_piece(&mut self, index: usize) -> Result<Piece, BoardError> {
        let piece = self.board.remove_piece(index)?;
        self.dragging = None;
        self.broadcast_board();
        Ok(piece)
    }

    pub fn move_piece(&mut self, index: usize, position: AxialCoord) -> Result<(), BoardError> {
        self.board.move_piece(index, position)?;
        self.broadcast_board();
        Ok(())
    }

    pub fn rotate_piece(&mut self, index: usize) -> Result<Rotation, BoardError> {
        let rotation = self.board.rotate_piece(index)?;
        self.broadcast_board();
        Ok(rotation)
    }

    pub fn adjust_health(&mut self, index: usize, delta: i32) -> Result<u32, BoardError> {
        let health = self.board.adjust_health(index, delta)?;
        self.broadcast_board();
        Ok(health)
    }

    /// Roll a die, show it locally, then tell peers. The display is set
    /// before anything is sent.
    pub fn roll_dice(&mut self, rng: &mut DiceRng) -> i32 {
        let value = rng.roll_d6();
        self.roll_display = Some(roll_text(value));
        self.broadcast(&BoardEvent::Roll { value });
        value
    }

    /// Ask every peer for its whole board. The first `full_state` that comes
    /// back replaces ours.
    pub fn request_full_state(&mut self) {
        self.resync_pending = true;
        self.broadcast(&BoardEvent::SnapshotRequest);
    }

    // -----------------------------------------------------------------------
    // Pointer
    // -----------------------------------------------------------------------

    /// Pointer pressed: grab the first piece drawn within `GRAB_RADIUS`.
    pub fn grab_at_pixel(&mut self, point: PixelPoint) -> Option<usize> {
        self.dragging = self
            .board
            .pick_at_pixel(&self.config.layout, point, GRAB_RADIUS);
        self.dragging
    }

    /// Pointer released. Moves the grabbed piece to the cell under `point`;
    /// with nothing grabbed, adds a `kind` piece there unless the cell is
    /// already taken.
    pub fn drop_at_pixel(
        &mut self,
        point: PixelPoint,
        kind: PieceKind,
    ) -> Result<DropOutcome, BoardError> {
        let cell = self.config.layout.pixel_to_axial(point);
        match self.dragging.take() {
            Some(index) => {
                self.move_piece(index, cell)?;
                Ok(DropOutcome::Moved { index, to: cell })
            }
            None => match self.board.index_at(cell) {
                Some(index) => Ok(DropOutcome::Occupied { index }),
                None => {
                    self.add_piece(cell, kind);
                    Ok(DropOutcome::Added {
                        index: self.board.len() - 1,
                        at: cell,
                    })
                }
            },
        }
    }

    // -----------------------------------------------------------------------
    // Inbound
    // -----------------------------------------------------------------------

    /// Move everything the relay has delivered into the local queue. Returns
    /// the queue length. Notices a closed socket and drops to
    /// `Disconnected`.
    pub fn receive(&mut self) -> usize {
        let Some(net) = self.net.as_ref() else {
            return self.inbox.len();
        };
        // Read the flag before draining: the reader thread queues its last
        // frame before it marks the connection closed.
        let closed = net.is_closed();
        for msg in net.poll() {
            match msg {
                ServerMessage::Relayed { from, payload } => match BoardEvent::decode(&payload) {
                    Ok(event) => self.inbox.push_back((from, event)),
                    Err(e) => log::warn!(
                        "undecodable payload from {from} ({} bytes): {e}",
                        payload.len()
                    ),
                },
                other => log::debug!("ignoring unexpected relay message {other:?}"),
            }
        }
        if closed {
            log::warn!("relay connection closed");
            self.drop_connection();
        }
        self.inbox.len()
    }

    /// Apply every queued event in arrival order, broadcasting any replies.
    pub fn apply_pending(&mut self) -> Vec<Applied> {
        let mut outcomes = Vec::with_capacity(self.inbox.len());
        while let Some((from, event)) = self.inbox.pop_front() {
            let applied = self.apply_event(from, event);
            if let Some(reply) = applied.reply() {
                let reply = reply.clone();
                self.broadcast(&reply);
            }
            outcomes.push(applied);
        }
        outcomes
    }

    /// `receive` then `apply_pending`.
    pub fn pump(&mut self) -> Vec<Applied> {
        self.receive();
        self.apply_pending()
    }

    /// Apply one event from `from` to local state. Never touches the
    /// network; replies are returned in the outcome for the caller to send.
    pub fn apply_event(&mut self, from: RelayPlayerId, event: BoardEvent) -> Applied {
        match event {
            BoardEvent::Move { pieces } => match self.board.replace_all(&pieces) {
                Ok(()) => {
                    self.last_applied_from = Some(from);
                    self.resync_pending = false;
                    Applied::Moved
                }
                Err(error) => {
                    self.sync_faults += 1;
                    log::warn!("sync fault from {from}: {error}");
                    let reply = if self.config.resync_on_fault && !self.resync_pending {
                        self.resync_pending = true;
                        Some(BoardEvent::SnapshotRequest)
                    } else {
                        None
                    };
                    Applied::Faulted { error, reply }
                }
            },
            BoardEvent::Roll { value } => {
                self.roll_display = Some(roll_text(value));
                Applied::Rolled(value)
            }
            BoardEvent::SnapshotRequest => {
                if self.resync_pending {
                    log::debug!("not answering {from}: own board awaits repair");
                    return Applied::Ignored;
                }
                log::debug!("{from} asked for a full state");
                Applied::Answered(BoardEvent::FullState {
                    requester: from,
                    pieces: self.board.to_full_state(),
                })
            }
            BoardEvent::FullState { requester, pieces } => {
                if self.player_id != Some(requester) {
                    return Applied::Ignored;
                }
                self.board.load_full_state(&pieces);
                self.last_applied_from = Some(from);
                self.resync_pending = false;
                self.dragging = None;
                log::info!("loaded full state from {from} ({} pieces)", pieces.len());
                Applied::Loaded
            }
        }
    }

    fn broadcast_board(&mut self) {
        let pieces = self.board.to_snapshot();
        self.broadcast(&BoardEvent::Move { pieces });
    }

    fn broadcast(&mut self, event: &BoardEvent) {
        let Some(net) = self.net.as_mut() else {
            return;
        };
        let payload = match event.encode() {
            Ok(payload) => payload,
            Err(e) => {
                log::error!("failed to encode {}: {e}", event.name());
                return;
            }
        };
        if let Err(e) = net.broadcast(&payload) {
            log::warn!("lost relay connection sending {}: {e}", event.name());
            self.drop_connection();
        }
    }

    fn drop_connection(&mut self) {
        if let Some(mut net) = self.net.take() {
            net.disconnect();
        }
        self.resync_pending = false;
        self.state = ConnectionState::Disconnected;
    }
}

fn roll_text(value: i32) -> String {
    format!("Result: {value}")
}

#[cfg(test)]
mod tests {
    use std::io::{BufReader, BufWriter};
    use std::net::TcpListener;
    use std::thread;
    use std::time::Duration;

    use hexboard_board::{HexLayout, PieceSnapshot};
    use hexboard_protocol::framing::{read_json, write_json};
    use hexboard_protocol::message::ClientMessage;

    use super::*;

    const A: RelayPlayerId = RelayPlayerId(0);
    const B: RelayPlayerId = RelayPlayerId(1);

    fn offline() -> SyncClient {
        SyncClient::new(SyncConfig::default())
    }

    fn snap(q: i32, r: i32) -> PieceSnapshot {
        PieceSnapshot {
            x: q,
            y: r,
            rotation: 0,
            health: None,
        }
    }

    #[test]
    fn starts_disconnected_with_roster() {
        let client = offline();
        assert_eq!(client.connection_state(), ConnectionState::Disconnected);
        assert_eq!(client.board(), &BoardState::starting_roster());
        assert_eq!(client.roll_display(), None);
        assert_eq!(client.player_id(), None);
    }

    #[test]
    fn move_overwrites_positionally() {
        let mut client = offline();
        let applied = client.apply_event(
            A,
            BoardEvent::Move {
                pieces: vec![snap(1, 1), snap(2, 2)],
            },
        );
        assert_eq!(applied, Applied::Moved);
        assert_eq!(client.board().pieces()[0].position, AxialCoord::new(1, 1));
        assert_eq!(client.board().pieces()[0].kind, PieceKind::Player);
        assert_eq!(client.last_applied_from(), Some(A));
    }

    #[test]
    fn last_snapshot_received_wins() {
        let three = || {
            let mut board = BoardState::starting_roster();
            board.add_piece(AxialCoord::new(0, 3), PieceKind::Ghoul);
            board
        };
        let from_a = vec![snap(0, 0), snap(2, 2), snap(3, 0)];
        let from_b = vec![snap(0, 0), snap(2, 2), snap(-3, 0)];

        for (order, expected_from, expected_cell) in [
            ([(A, &from_a), (B, &from_b)], B, AxialCoord::new(-3, 0)),
            ([(B, &from_b), (A, &from_a)], A, AxialCoord::new(3, 0)),
        ] {
            let mut c = SyncClient::with_board(SyncConfig::default(), three());
            for (from, pieces) in order {
                let applied = c.apply_event(
                    from,
                    BoardEvent::Move {
                        pieces: pieces.clone(),
                    },
                );
                assert_eq!(applied, Applied::Moved);
            }
            assert_eq!(c.last_applied_from(), Some(expected_from));
            assert_eq!(c.board().pieces()[2].position, expected_cell);
            assert_eq!(c.board().len(), 3);
        }
    }

    #[test]
    fn length_mismatch_is_refused_and_requests_once() {
        let mut client = offline();
        let before = client.board().clone();
        let longer = BoardEvent::Move {
            pieces: vec![snap(1, 1), snap(2, 2), snap(3, 0)],
        };

        let first = client.apply_event(A, longer.clone());
        assert_eq!(
            first,
            Applied::Faulted {
                error: SnapshotError::LengthMismatch {
                    local: 2,
                    remote: 3
                },
                reply: Some(BoardEvent::SnapshotRequest),
            }
        );
        assert_eq!(client.board(), &before);
        assert!(client.resync_pending());

        let second = client.apply_event(B, longer);
        assert_eq!(second.reply(), None);
        assert_eq!(client.sync_faults(), 2);
        assert_eq!(client.last_applied_from(), None);
    }

    #[test]
    fn shorter_snapshot_is_refused_too() {
        let mut client = offline();
        let before = client.board().clone();
        let applied = client.apply_event(
            A,
            BoardEvent::Move {
                pieces: vec![snap(5, 5)],
            },
        );
        assert!(matches!(applied, Applied::Faulted { .. }));
        assert_eq!(client.board(), &before);
    }

    #[test]
    fn resync_can_be_switched_off() {
        let mut client = SyncClient::new(SyncConfig {
            resync_on_fault: false,
            ..SyncConfig::default()
        });
        let applied = client.apply_event(A, BoardEvent::Move { pieces: vec![] });
        assert_eq!(applied.reply(), None);
        assert!(!client.resync_pending());
        assert_eq!(client.sync_faults(), 1);
    }

    #[test]
    fn snapshot_request_is_answered_with_full_state() {
        let mut client = offline();
        client.add_piece(AxialCoord::new(-1, 0), PieceKind::Construct);
        let applied = client.apply_event(B, BoardEvent::SnapshotRequest);
        match applied {
            Applied::Answered(BoardEvent::FullState { requester, pieces }) => {
                assert_eq!(requester, B);
                assert_eq!(pieces, client.board().to_full_state());
            }
            other => panic!("expected FullState answer, got {other:?}"),
        }
    }

    #[test]
    fn client_awaiting_repair_does_not_answer() {
        let mut client = offline();
        client.apply_event(A, BoardEvent::Move { pieces: vec![] });
        assert!(client.resync_pending());
        assert_eq!(
            client.apply_event(B, BoardEvent::SnapshotRequest),
            Applied::Ignored
        );
    }

    #[test]
    fn full_state_only_applies_to_its_requester() {
        let mut donor = offline();
        donor.add_piece(AxialCoord::new(4, -1), PieceKind::Wraith);
        let full = |requester| BoardEvent::FullState {
            requester,
            pieces: donor.board().to_full_state(),
        };

        let mut client = offline();
        client.player_id = Some(B);
        client.request_full_state();
        assert!(client.resync_pending());

        assert_eq!(client.apply_event(A, full(A)), Applied::Ignored);
        assert_eq!(client.board().len(), 2);

        assert_eq!(client.apply_event(A, full(B)), Applied::Loaded);
        assert_eq!(client.board(), donor.board());
        assert_eq!(client.last_applied_from(), Some(A));
        assert!(!client.resync_pending());
    }

    #[test]
    fn offline_client_ignores_all_full_states() {
        let mut client = offline();
        let applied = client.apply_event(
            A,
            BoardEvent::FullState {
                requester: A,
                pieces: vec![],
            },
        );
        assert_eq!(applied, Applied::Ignored);
        assert_eq!(client.board().len(), 2);
    }

    #[test]
    fn roll_sets_display_even_out_of_range() {
        let mut client = offline();
        assert_eq!(
            client.apply_event(A, BoardEvent::Roll { value: 4 }),
            Applied::Rolled(4)
        );
        assert_eq!(client.roll_display(), Some("Result: 4"));
        client.apply_event(A, BoardEvent::Roll { value: 9 });
        assert_eq!(client.roll_display(), Some("Result: 9"));
        assert_eq!(client.last_applied_from(), None);
    }

    #[test]
    fn local_roll_sets_display() {
        let mut client = offline();
        let mut rng = DiceRng::new(7);
        let value = client.roll_dice(&mut rng);
        assert!((1..=6).contains(&value));
        assert_eq!(client.roll_display(), Some(format!("Result: {value}").as_str()));
    }

    #[test]
    fn local_ops_work_offline() {
        let mut client = offline();
        let piece = client.add_piece(AxialCoord::new(3, 0), PieceKind::Ghoul);
        assert_eq!(piece.health, 4);
        assert_eq!(client.rotate_piece(2).unwrap().degrees(), 60);
        assert_eq!(client.adjust_health(2, -10).unwrap(), 0);
        client.move_piece(2, AxialCoord::new(-1, -1)).unwrap();
        assert_eq!(client.remove_piece(0).unwrap().kind, PieceKind::Player);
        assert_eq!(client.board().len(), 2);
        assert_eq!(
            client.move_piece(5, AxialCoord::ORIGIN),
            Err(BoardError::IndexOutOfRange { index: 5, len: 2 })
        );
        assert_eq!(client.connection_state(), ConnectionState::Disconnected);
    }

    #[test]
    fn drag_and_drop_moves_grabbed_piece() {
        let mut client = offline();
        let layout = HexLayout::default();
        let skeleton_centre = layout.axial_to_pixel(AxialCoord::new(2, 2));
        let grab = PixelPoint::new(skeleton_centre.x + 3.0, skeleton_centre.y - 4.0);
        assert_eq!(client.grab_at_pixel(grab), Some(1));

        let target = layout.axial_to_pixel(AxialCoord::new(-2, 1));
        let outcome = client.drop_at_pixel(target, PieceKind::Ghoul).unwrap();
        assert_eq!(
            outcome,
            DropOutcome::Moved {
                index: 1,
                to: AxialCoord::new(-2, 1)
            }
        );
        assert_eq!(client.board().pieces()[1].position, AxialCoord::new(-2, 1));
    }

    #[test]
    fn click_outside_grab_radius_adds_or_reports_occupied() {
        let mut client = offline();
        let layout = HexLayout::default();

        let far = layout.axial_to_pixel(AxialCoord::new(1, -3));
        assert_eq!(client.grab_at_pixel(far), None);
        assert_eq!(
            client.drop_at_pixel(far, PieceKind::Wraith).unwrap(),
            DropOutcome::Added {
                index: 2,
                at: AxialCoord::new(1, -3)
            }
        );

        // The origin cell holds the player; a press 12px off-centre is not a
        // grab but the release still lands in that cell.
        let origin = layout.axial_to_pixel(AxialCoord::ORIGIN);
        let near = PixelPoint::new(origin.x + 12.0, origin.y);
        assert_eq!(client.grab_at_pixel(near), None);
        assert_eq!(
            client.drop_at_pixel(near, PieceKind::Wraith).unwrap(),
            DropOutcome::Occupied { index: 0 }
        );
        assert_eq!(client.board().len(), 3);
    }

    #[test]
    fn frames_queued_before_close_survive_the_drop() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        // A one-shot relay: welcome, one roll, then hang up.
        let relay = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut writer = BufWriter::new(stream);
            let _hello: ClientMessage = read_json(&mut reader).unwrap();
            let welcome = ServerMessage::Welcome {
                player_id: A,
                session_name: "one-shot".into(),
                peer_count: 1,
            };
            write_json(&mut writer, &welcome).unwrap();
            let payload = BoardEvent::Roll { value: 5 }.encode().unwrap();
            write_json(&mut writer, &ServerMessage::Relayed { from: B, payload }).unwrap();
        });

        let mut client = offline();
        client.connect(&addr.to_string()).unwrap();
        relay.join().unwrap();

        for _ in 0..200 {
            client.receive();
            if client.connection_state() == ConnectionState::Disconnected {
                break;
            }
            thread::sleep(Duration::from_millis(10));
        }
        assert_eq!(client.connection_state(), ConnectionState::Disconnected);
        assert_eq!(client.pending(), 1);
        assert_eq!(client.apply_pending(), vec![Applied::Rolled(5)]);
        assert_eq!(client.roll_display(), Some("Result: 5"));
    }

    #[test]
    fn reconnect_without_address_fails() {
        let mut client = offline();
        assert!(matches!(client.reconnect(), Err(SyncError::NeverConnected)));
    }

    #[test]
    fn connect_to_nothing_returns_to_disconnected() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let mut client = offline();
        assert!(client.connect(&addr.to_string()).is_err());
        assert_eq!(client.connection_state(), ConnectionState::Disconnected);
        // The address is remembered for a later retry.
        assert!(matches!(
            client.reconnect(),
            Err(SyncError::Client(ClientError::Connect(_)))
        ));
    }
}
