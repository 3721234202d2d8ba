use super::Inbound;
use super::Outbound;
use crate::PlayerId;
use crate::game::Coord;
use crate::notify::Notifier;
use crate::notify::Severity;
use crate::sync::Provenance;
use crate::sync::SessionSlot;
use futures::SinkExt;
use futures::StreamExt;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicU8;
use std::sync::atomic::AtomicU32;
use std::sync::atomic::Ordering;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::mpsc::unbounded_channel;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;

/// Connection lifecycle per room.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Connecting,
    Open,
    Closed,
}

/// Shared per-room connection state: phase, handshake identity, and
/// the joined-player counter.
#[derive(Debug)]
pub struct RoomState {
    phase: AtomicU8,
    player_id: Mutex<Option<PlayerId>>,
    count: AtomicU32,
}

impl Default for RoomState {
    fn default() -> Self {
        Self {
            phase: AtomicU8::new(0),
            player_id: Mutex::new(None),
            count: AtomicU32::new(0),
        }
    }
}

impl RoomState {
    pub fn phase(&self) -> Phase {
        match self.phase.load(Ordering::SeqCst) {
            0 => Phase::Connecting,
            1 => Phase::Open,
            _ => Phase::Closed,
        }
    }
    fn set_open(&self) {
        self.phase.store(1, Ordering::SeqCst);
    }
    /// Marks the channel closed; returns false when it already was,
    /// so teardown stays idempotent.
    fn set_closed(&self) -> bool {
        self.phase.swap(2, Ordering::SeqCst) != 2
    }
    /// Identity assigned by the handshake, once and immutably.
    pub fn player_id(&self) -> Option<PlayerId> {
        *self.player_id.lock().unwrap()
    }
    pub fn player_count(&self) -> u32 {
        self.count.load(Ordering::SeqCst)
    }
    /// Below the two-player minimum the room is still gathering.
    pub fn waiting(&self) -> bool {
        self.player_count() < 2
    }

    /// Routes one inbound frame. Malformed payloads are dropped with
    /// a diagnostic; they are not actionable by the user.
    pub fn dispatch(&self, text: &str, slot: &SessionSlot) {
        match Inbound::parse(text) {
            Ok(Inbound::Welcome {
                player_id,
                room_code,
            }) => {
                let mut assigned = self.player_id.lock().unwrap();
                match *assigned {
                    None => {
                        log::info!("[channel] assigned player {} in room {}", player_id, room_code);
                        *assigned = Some(player_id);
                    }
                    Some(kept) => {
                        log::warn!("[channel] duplicate welcome (player {}), keeping {}", player_id, kept)
                    }
                }
            }
            Ok(Inbound::PlayerCount { count }) => {
                log::debug!("[channel] {} player(s) joined", count);
                self.count.store(count, Ordering::SeqCst);
            }
            Ok(Inbound::State(session)) => {
                slot.replace(session, Provenance::Realtime);
            }
            Err(e) => log::warn!("[channel] dropping malformed message: {}", e),
        }
    }
}

/// Whether a close should surface a connectivity-loss notice.
/// A normal/expected closure is silent; everything else is loud.
fn lossy(frame: &Option<CloseFrame<'_>>) -> bool {
    !matches!(frame, Some(f) if f.code == CloseCode::Normal)
}

/// Forwards queued outbound messages into the sink. A close frame is
/// the last thing sent: the handshake goes out before the task ends.
async fn relay<S>(mut queue: UnboundedReceiver<Message>, mut sink: S)
where
    S: futures::Sink<Message> + Unpin,
{
    while let Some(message) = queue.recv().await {
        let closing = matches!(message, Message::Close(_));
        if sink.send(message).await.is_err() || closing {
            break;
        }
    }
}

/// Manages the push channel for one room: opens it, listens until it
/// closes, and relays outbound move commands while open.
///
/// A closed channel stays closed; reconnection is the owner's call,
/// by dropping this and opening a fresh one.
pub struct Channel {
    state: Arc<RoomState>,
    notifier: Arc<dyn Notifier>,
    outbound: UnboundedSender<Message>,
    reader: Option<JoinHandle<()>>,
    writer: Option<JoinHandle<()>>,
}

impl Channel {
    /// Connects and starts the listen/relay tasks.
    pub async fn open(
        url: &str,
        slot: Arc<SessionSlot>,
        notifier: Arc<dyn Notifier>,
    ) -> anyhow::Result<Self> {
        log::info!("[channel] connecting to {}", url);
        let (socket, _) = connect_async(url).await?;
        let state = Arc::new(RoomState::default());
        state.set_open();
        notifier.notify("Connected to Room", Severity::Success);
        let (sink, mut stream) = socket.split();
        let (outbound, queue) = unbounded_channel::<Message>();
        let writer = tokio::spawn(relay(queue, sink));
        let reader = {
            let state = Arc::clone(&state);
            let notifier = Arc::clone(&notifier);
            tokio::spawn(async move {
                let mut quiet = false;
                while let Some(frame) = stream.next().await {
                    match frame {
                        Ok(Message::Text(text)) => state.dispatch(&text, &slot),
                        Ok(Message::Close(close)) => {
                            log::info!("[channel] closed by server: {:?}", close);
                            quiet = !lossy(&close);
                            break;
                        }
                        Ok(_) => continue,
                        Err(e) => {
                            log::warn!("[channel] socket error: {}", e);
                            break;
                        }
                    }
                }
                state.set_closed();
                if !quiet {
                    notifier.notify("Connection Lost", Severity::Error);
                }
            })
        };
        Ok(Self {
            state,
            notifier,
            outbound,
            reader: Some(reader),
            writer: Some(writer),
        })
    }

    pub fn state(&self) -> &Arc<RoomState> {
        &self.state
    }

    /// Sends a move command while open; otherwise the command is
    /// dropped locally with a notice, never queued.
    pub fn send_move(&self, card_index: usize, target: Coord) {
        if self.state.phase() != Phase::Open {
            log::warn!("[channel] not open, dropping move command");
            self.notifier.notify("Connection interrupted", Severity::Error);
            return;
        }
        let command = Outbound::Move { card_index, target };
        if self.outbound.send(Message::Text(command.to_json())).is_err() {
            self.notifier.notify("Connection interrupted", Severity::Error);
        }
    }

    /// Unconditional, idempotent teardown. The server gets a clean
    /// code-1000 closure; the writer ends after relaying it.
    pub fn close(&mut self) {
        if self.state.set_closed() {
            log::info!("[channel] closing");
            let _ = self.outbound.send(Message::Close(Some(CloseFrame {
                code: CloseCode::Normal,
                reason: "".into(),
            })));
        }
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }
        self.writer = None;
    }
}

impl Drop for Channel {
    fn drop(&mut self) {
        self.close();
    }
}
