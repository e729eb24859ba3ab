// TCP client for connecting to the relay.
//
// Provides a non-blocking interface for a board client to talk to the relay:
// - `connect()` performs TCP connect + Hello handshake on the calling thread,
//   then spawns a background reader thread.
// - The reader thread reads framed `ServerMessage`s and pushes them into an
//   `mpsc` channel. When the socket closes it sets `closed` and exits.
// - The caller holds a `BufWriter<TcpStream>` for sending.
// - `poll()` drains the inbox non-blocking, returning all queued messages.
//
// The caller never blocks on network reads. Writes flush synchronously,
// which is fine for board-sized messages.
//
// This lives in the relay crate so the board client and the integration
// tests share it; it depends only on std TCP and the protocol crate.

use std::io::{self, BufReader, BufWriter};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use hexboard_protocol::framing::{read_json, write_json};
use hexboard_protocol::message::{ClientMessage, PROTOCOL_VERSION, ServerMessage};
use hexboard_protocol::types::RelayPlayerId;

use crate::server::HANDSHAKE_TIMEOUT;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("connect failed: {0}")]
    Connect(#[source] io::Error),
    #[error("handshake failed: {0}")]
    Handshake(#[source] io::Error),
    #[error("rejected by relay: {0}")]
    Rejected(String),
    #[error("unexpected handshake response: {0}")]
    UnexpectedResponse(String),
    #[error("send failed: {0}")]
    Send(#[source] io::Error),
}

/// Information returned by a successful `connect()` handshake.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WelcomeInfo {
    pub player_id: RelayPlayerId,
    pub session_name: String,
    pub peer_count: u32,
}

/// TCP client for relay communication.
pub struct NetClient {
    writer: BufWriter<TcpStream>,
    inbox: Receiver<ServerMessage>,
    closed: Arc<AtomicBool>,
    reader_thread: Option<JoinHandle<()>>,
    player_id: RelayPlayerId,
}

impl NetClient {
    /// Connect to a relay, perform the Hello handshake, and spawn a reader
    /// thread. Returns the client and welcome info on success.
    pub fn connect<A: ToSocketAddrs>(
        addr: A,
        player_name: &str,
    ) -> Result<(Self, WelcomeInfo), ClientError> {
        Self::connect_with_version(addr, player_name, PROTOCOL_VERSION)
    }

    /// `connect` with an explicit protocol version in the Hello.
    pub fn connect_with_version<A: ToSocketAddrs>(
        addr: A,
        player_name: &str,
        protocol_version: u32,
    ) -> Result<(Self, WelcomeInfo), ClientError> {
        let stream = TcpStream::connect(addr).map_err(ClientError::Connect)?;
        stream
            .set_read_timeout(Some(HANDSHAKE_TIMEOUT))
            .map_err(ClientError::Handshake)?;
        let reader_stream = stream.try_clone().map_err(ClientError::Connect)?;
        let mut writer = BufWriter::new(stream);

        let hello = ClientMessage::Hello {
            protocol_version,
            player_name: player_name.into(),
        };
        write_json(&mut writer, &hello).map_err(ClientError::Handshake)?;

        let mut reader = BufReader::new(reader_stream);
        let welcome = match read_json::<_, ServerMessage>(&mut reader)
            .map_err(ClientError::Handshake)?
        {
            ServerMessage::Welcome {
                player_id,
                session_name,
                peer_count,
            } => WelcomeInfo {
                player_id,
                session_name,
                peer_count,
            },
            ServerMessage::Rejected { reason } => return Err(ClientError::Rejected(reason)),
            other => return Err(ClientError::UnexpectedResponse(format!("{other:?}"))),
        };

        reader
            .get_ref()
            .set_read_timeout(None)
            .map_err(ClientError::Handshake)?;

        let (tx, rx) = mpsc::channel();
        let closed = Arc::new(AtomicBool::new(false));
        let closed_reader = closed.clone();
        let reader_thread = thread::spawn(move || {
            reader_loop(reader, tx);
            closed_reader.store(true, Ordering::SeqCst);
        });

        log::info!(
            "joined {:?} as {} ({} connected)",
            welcome.session_name,
            welcome.player_id,
            welcome.peer_count
        );
        Ok((
            Self {
                writer,
                inbox: rx,
                closed,
                reader_thread: Some(reader_thread),
                player_id: welcome.player_id,
            },
            welcome,
        ))
    }

    pub fn player_id(&self) -> RelayPlayerId {
        self.player_id
    }

    /// Ask the relay to forward `payload` to every other connection.
    pub fn broadcast(&mut self, payload: &[u8]) -> Result<(), ClientError> {
        let msg = ClientMessage::Broadcast {
            payload: payload.to_vec(),
        };
        write_json(&mut self.writer, &msg).map_err(ClientError::Send)
    }

    /// Send Goodbye and close the connection. Idempotent.
    pub fn disconnect(&mut self) {
        if !self.is_closed() {
            let _ = write_json(&mut self.writer, &ClientMessage::Goodbye);
        }
        let _ = self.writer.get_ref().shutdown(Shutdown::Both);
        if let Some(handle) = self.reader_thread.take() {
            let _ = handle.join();
        }
        self.closed.store(true, Ordering::SeqCst);
    }

    /// True once the relay side of the socket has gone away (or after
    /// `disconnect`). Messages that arrived before the close are still
    /// returned by `poll`.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Drain all queued server messages (non-blocking).
    pub fn poll(&self) -> Vec<ServerMessage> {
        self.inbox.try_iter().collect()
    }

    /// Block up to `timeout` for the next server message.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<ServerMessage> {
        self.inbox.recv_timeout(timeout).ok()
    }
}

impl Drop for NetClient {
    fn drop(&mut self) {
        if self.reader_thread.is_some() {
            self.disconnect();
        }
    }
}

/// Reader thread: read framed messages in a loop, push to channel.
fn reader_loop(mut reader: BufReader<TcpStream>, tx: mpsc::Sender<ServerMessage>) {
    loop {
        match read_json::<_, ServerMessage>(&mut reader) {
            Ok(msg) => {
                if tx.send(msg).is_err() {
                    break;
                }
            }
            Err(e) => {
                if e.kind() != io::ErrorKind::UnexpectedEof {
                    log::debug!("relay connection closed: {e}");
                }
                break;
            }
        }
    }
}
