// TCP server and main event loop for the relay.
//
// Architecture: thread-per-reader with a central `mpsc` channel.
//
// - **Listener thread** (`TcpListener::accept()` loop): accepts TCP
//   connections and hands each one to a short-lived handshake thread.
// - **Handshake threads**: read the `Hello` frame under a 5 second timeout
//   and send `InternalEvent::Handshaken` to the main thread. A slow or silent
//   client only ties up its own thread, never the fan-out loop.
// - **Reader threads** (one per admitted client): read `ClientMessage`
//   frames and send `InternalEvent::MessageFrom`. On error, EOF, malformed
//   JSON, or `Goodbye`, send `InternalEvent::Disconnected` and exit.
// - **Main thread**: owns the `Session` and processes events in arrival
//   order. Every `Broadcast` is fanned out before the next event is read,
//   so frames from one sender reach each receiver in the order sent.
//
// The main thread is the only writer to client sockets. Reader threads only
// read, from a `try_clone` of the same socket.
//
// Shutdown: `RelayHandle::stop` clears `keep_running`. The main loop notices
// within one `recv_timeout` period, shuts down every peer socket (which
// wakes the reader threads with EOF), and exits.

use std::io::{BufReader, BufWriter};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

use hexboard_protocol::framing::{read_json, write_json};
use hexboard_protocol::message::{ClientMessage, ServerMessage};
use hexboard_protocol::types::RelayPlayerId;

use crate::session::Session;

/// How long a fresh connection has to send `Hello`.
pub const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(5);

/// How often the idle main loop rechecks `keep_running`.
const IDLE_POLL: Duration = Duration::from_millis(100);

/// Events sent from listener/handshake/reader threads to the main thread.
enum InternalEvent {
    Handshaken {
        stream: TcpStream,
        reader: BufReader<TcpStream>,
        player_name: String,
        protocol_version: u32,
    },
    MessageFrom {
        player_id: RelayPlayerId,
        message: ClientMessage,
    },
    Disconnected {
        player_id: RelayPlayerId,
    },
}

/// Handle returned by `start_relay` to control the running server.
pub struct RelayHandle {
    keep_running: Arc<AtomicBool>,
    thread: Option<thread::JoinHandle<()>>,
}

impl RelayHandle {
    /// Signal the relay to stop and wait for it to shut down.
    pub fn stop(mut self) {
        self.keep_running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.thread.take() {
            if handle.join().is_err() {
                log::error!("relay thread panicked");
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.thread.as_ref().is_some_and(|t| !t.is_finished())
    }
}

/// Configuration for starting a relay server.
#[derive(Clone, Debug)]
pub struct RelayConfig {
    pub bind_host: String,
    /// 0 lets the OS pick; the bound address is returned by `start_relay`.
    pub port: u16,
    pub session_name: String,
    pub max_peers: u32,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bind_host: "127.0.0.1".into(),
            port: 3000,
            session_name: "hexboard".into(),
            max_peers: 16,
        }
    }
}

/// Start the relay server on a background thread. Returns a handle for
/// stopping it and the actual bound address.
pub fn start_relay(config: RelayConfig) -> std::io::Result<(RelayHandle, SocketAddr)> {
    let listener = TcpListener::bind((config.bind_host.as_str(), config.port))?;
    let addr = listener.local_addr()?;
    // Non-blocking so the accept thread can check keep_running.
    listener.set_nonblocking(true)?;

    let keep_running = Arc::new(AtomicBool::new(true));
    let keep_running_clone = keep_running.clone();

    let thread = thread::Builder::new()
        .name("relay-main".into())
        .spawn(move || run_relay(listener, config, keep_running_clone))?;

    log::info!("relay listening on {addr}");
    Ok((
        RelayHandle {
            keep_running,
            thread: Some(thread),
        },
        addr,
    ))
}

/// Main relay loop. Runs until `keep_running` is set to false.
fn run_relay(listener: TcpListener, config: RelayConfig, keep_running: Arc<AtomicBool>) {
    let mut session = Session::new(config.session_name, config.max_peers);
    let (tx, rx): (Sender<InternalEvent>, Receiver<InternalEvent>) = mpsc::channel();

    let keep_running_listener = keep_running.clone();
    let tx_listener = tx.clone();
    thread::spawn(move || accept_loop(listener, tx_listener, keep_running_listener));

    while keep_running.load(Ordering::SeqCst) {
        match rx.recv_timeout(IDLE_POLL) {
            Ok(event) => handle_event(&mut session, event, &tx),
            Err(mpsc::RecvTimeoutError::Timeout) => {}
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }
    }

    log::info!(
        "relay stopping after {} relayed frame(s)",
        session.relayed_frames()
    );
    session.close_all();
}

fn accept_loop(listener: TcpListener, tx: Sender<InternalEvent>, keep_running: Arc<AtomicBool>) {
    while keep_running.load(Ordering::SeqCst) {
        match listener.accept() {
            Ok((stream, peer_addr)) => {
                log::debug!("connection from {peer_addr}");
                let tx = tx.clone();
                thread::spawn(move || handshake(stream, tx));
            }
            Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                thread::sleep(Duration::from_millis(50));
            }
            Err(e) => {
                log::error!("accept failed: {e}");
                break;
            }
        }
    }
}

/// Read the `Hello` frame off a fresh connection and pass it to the main
/// thread. Anything else as the first frame, or nothing within
/// `HANDSHAKE_TIMEOUT`, drops the connection.
fn handshake(stream: TcpStream, tx: Sender<InternalEvent>) {
    let peer = stream
        .peer_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|_| "unknown".into());
    if let Err(e) = stream.set_nonblocking(false) {
        log::warn!("{peer}: {e}");
        return;
    }
    if let Err(e) = stream.set_read_timeout(Some(HANDSHAKE_TIMEOUT)) {
        log::warn!("{peer}: {e}");
        return;
    }
    let mut reader = match stream.try_clone() {
        Ok(s) => BufReader::new(s),
        Err(e) => {
            log::warn!("{peer}: clone failed: {e}");
            return;
        }
    };

    match read_json::<_, ClientMessage>(&mut reader) {
        Ok(ClientMessage::Hello {
            protocol_version,
            player_name,
        }) => {
            // Clear the timeout for the long-lived reader loop.
            if let Err(e) = stream.set_read_timeout(None) {
                log::warn!("{peer}: {e}");
                return;
            }
            let _ = tx.send(InternalEvent::Handshaken {
                stream,
                reader,
                player_name,
                protocol_version,
            });
        }
        Ok(_) => log::warn!("{peer}: first frame was not Hello"),
        Err(e) => log::warn!("{peer}: handshake failed: {e}"),
    }
}

/// Dispatch a single event to the session.
fn handle_event(session: &mut Session, event: InternalEvent, tx: &Sender<InternalEvent>) {
    match event {
        InternalEvent::Handshaken {
            stream,
            reader,
            player_name,
            protocol_version,
        } => admit(session, stream, reader, player_name, protocol_version, tx),
        InternalEvent::MessageFrom { player_id, message } => match message {
            ClientMessage::Broadcast { payload } => {
                session.relay(player_id, payload);
            }
            ClientMessage::Hello { .. } => {
                log::debug!("{player_id} sent a second Hello; ignored");
            }
            ClientMessage::Goodbye => {
                // The reader loop turns Goodbye into Disconnected.
            }
        },
        InternalEvent::Disconnected { player_id } => {
            session.remove_peer(player_id);
        }
    }
}

fn admit(
    session: &mut Session,
    stream: TcpStream,
    reader: BufReader<TcpStream>,
    player_name: String,
    protocol_version: u32,
    tx: &Sender<InternalEvent>,
) {
    let write_stream = match stream.try_clone() {
        Ok(s) => s,
        Err(e) => {
            log::warn!("clone failed during admission: {e}");
            return;
        }
    };

    match session.add_peer(player_name.clone(), protocol_version, write_stream) {
        Ok(player_id) => {
            let tx_reader = tx.clone();
            let spawned = thread::Builder::new()
                .name(format!("relay-{player_id}"))
                .spawn(move || reader_loop(reader, player_id, tx_reader));
            if let Err(e) = spawned {
                log::error!("could not spawn reader for {player_id}: {e}");
                session.remove_peer(player_id);
            }
        }
        Err(reason) => {
            log::warn!("rejected {player_name:?}: {reason}");
            let mut writer = BufWriter::new(stream);
            let _ = write_json(&mut writer, &ServerMessage::Rejected { reason });
        }
    }
}

/// Reader loop for a single client. Runs in its own thread.
fn reader_loop(
    mut reader: BufReader<TcpStream>,
    player_id: RelayPlayerId,
    tx: Sender<InternalEvent>,
) {
    loop {
        match read_json::<_, ClientMessage>(&mut reader) {
            Ok(ClientMessage::Goodbye) => {
                log::debug!("{player_id} said goodbye");
                break;
            }
            Ok(message) => {
                if tx.send(InternalEvent::MessageFrom { player_id, message }).is_err() {
                    return;
                }
            }
            Err(e) => {
                if e.kind() != std::io::ErrorKind::UnexpectedEof {
                    log::debug!("{player_id} read error: {e}");
                }
                break;
            }
        }
    }
    let _ = tx.send(InternalEvent::Disconnected { player_id });
}
