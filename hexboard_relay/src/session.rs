// Connection set for the relay.
//
// `Session` is the only state the relay keeps: which connections are open
// and a write half for each. It holds no board data and never decodes a
// payload. `server.rs` drives it from a single thread, so there is no
// internal locking.
//
// Responsibilities:
// - Admission: protocol version check and a connection cap, then `Welcome`.
// - Fan-out: `relay` serializes one `Relayed` frame and writes it to every
//   connection except the sender, in ascending id order. The sender never
//   gets its own message back.
// - Removal: silent. Peers are not told that someone left, and a newcomer is
//   not sent any history; its board stays at the starting roster until the
//   next `move` arrives.
//
// A failed write is logged and the peer stays in the set. Its reader thread
// sees the broken socket and reports a disconnect, and only that removes it
// here. The remaining peers still get the frame.

use std::collections::BTreeMap;
use std::io::BufWriter;
use std::net::{Shutdown, TcpStream};

use hexboard_protocol::framing::{write_json, write_message};
use hexboard_protocol::message::{PROTOCOL_VERSION, ServerMessage};
use hexboard_protocol::types::RelayPlayerId;

/// Open connections of one relay process.
pub struct Session {
    pub name: String,
    peers: BTreeMap<RelayPlayerId, PeerState>,
    next_player_id: u32,
    max_peers: u32,
    relayed_frames: u64,
}

struct PeerState {
    name: String,
    writer: BufWriter<TcpStream>,
}

impl Session {
    pub fn new(name: String, max_peers: u32) -> Self {
        Self {
            name,
            peers: BTreeMap::new(),
            next_player_id: 0,
            max_peers,
            relayed_frames: 0,
        }
    }

    /// Admit a connection that has sent `Hello`. On success the new peer has
    /// already been sent `Welcome`; on failure the caller sends `Rejected`
    /// with the returned reason.
    pub fn add_peer(
        &mut self,
        player_name: String,
        protocol_version: u32,
        stream: TcpStream,
    ) -> Result<RelayPlayerId, String> {
        if protocol_version != PROTOCOL_VERSION {
            return Err(format!(
                "protocol version mismatch: relay speaks {PROTOCOL_VERSION}, client sent {protocol_version}"
            ));
        }
        if self.peers.len() as u32 >= self.max_peers {
            return Err("session is full".into());
        }

        let id = RelayPlayerId(self.next_player_id);
        self.next_player_id += 1;

        self.peers.insert(
            id,
            PeerState {
                name: player_name,
                writer: BufWriter::new(stream),
            },
        );

        let connected = self.peers.len();
        let welcome = ServerMessage::Welcome {
            player_id: id,
            session_name: self.name.clone(),
            peer_count: connected as u32,
        };
        if let Some(peer) = self.peers.get_mut(&id) {
            if let Err(e) = write_json(&mut peer.writer, &welcome) {
                log::warn!("failed to send Welcome to {id}: {e}");
            }
            log::info!("{id} joined as {:?} ({connected} connected)", peer.name);
        }
        Ok(id)
    }

    /// Drop a connection from the forwarding set. Returns false if it was
    /// already gone. No one is notified.
    pub fn remove_peer(&mut self, player_id: RelayPlayerId) -> bool {
        match self.peers.remove(&player_id) {
            Some(peer) => {
                log::info!(
                    "{player_id} ({:?}) left ({} connected)",
                    peer.name,
                    self.peers.len()
                );
                true
            }
            None => false,
        }
    }

    /// Forward `payload` from `from` to every other open connection.
    /// Returns how many connections were written to.
    pub fn relay(&mut self, from: RelayPlayerId, payload: Vec<u8>) -> usize {
        if !self.peers.contains_key(&from) {
            log::debug!("dropping frame from unknown {from}");
            return 0;
        }
        let frame = match serde_json::to_vec(&ServerMessage::Relayed { from, payload }) {
            Ok(frame) => frame,
            Err(e) => {
                log::warn!("failed to encode relayed frame from {from}: {e}");
                return 0;
            }
        };

        let mut delivered = 0;
        for (id, peer) in self.peers.iter_mut().filter(|(id, _)| **id != from) {
            match write_message(&mut peer.writer, &frame) {
                Ok(()) => delivered += 1,
                Err(e) => log::warn!("write to {id} failed: {e}"),
            }
        }
        self.relayed_frames += 1;
        log::debug!(
            "relayed {} bytes from {from} to {delivered} peer(s)",
            frame.len()
        );
        delivered
    }

    /// Shut down every socket so blocked reader threads wake with EOF.
    pub fn close_all(&mut self) {
        for (id, peer) in std::mem::take(&mut self.peers) {
            if let Err(e) = peer.writer.get_ref().shutdown(Shutdown::Both) {
                log::debug!("shutdown of {id} failed: {e}");
            }
        }
    }

    pub fn peer_count(&self) -> usize {
        self.peers.len()
    }

    pub fn peer_ids(&self) -> Vec<RelayPlayerId> {
        self.peers.keys().copied().collect()
    }

    /// Total frames fanned out since the relay started.
    pub fn relayed_frames(&self) -> u64 {
        self.relayed_frames
    }
}
