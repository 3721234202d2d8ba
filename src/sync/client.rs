use super::*;
use crate::PlayerId;
use crate::api::Api;
use crate::api::ApiError;
use crate::game::Coord;
use crate::game::LegalMoves;
use crate::notify::Notifier;
use crate::notify::Severity;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::mpsc::unbounded_channel;

/// Wires the turn machine to transport, the session slot, and the
/// notification sink.
///
/// Legal-moves fetches are spawned and delivered back through an
/// internal channel keyed by hand index, so a superseding selection
/// invalidates an in-flight fetch by index comparison on arrival.
pub struct SessionClient {
    api: Arc<dyn Api>,
    notifier: Arc<dyn Notifier>,
    slot: Arc<SessionSlot>,
    machine: TurnMachine,
    legal_tx: UnboundedSender<(usize, Result<LegalMoves, ApiError>)>,
    legal_rx: UnboundedReceiver<(usize, Result<LegalMoves, ApiError>)>,
}

impl SessionClient {
    pub fn new(
        api: Arc<dyn Api>,
        notifier: Arc<dyn Notifier>,
        slot: Arc<SessionSlot>,
        local: PlayerId,
    ) -> Self {
        let (legal_tx, legal_rx) = unbounded_channel();
        Self {
            api,
            notifier,
            slot,
            machine: TurnMachine::new(local),
            legal_tx,
            legal_rx,
        }
    }
    pub fn machine(&self) -> &TurnMachine {
        &self.machine
    }
    pub fn slot(&self) -> &Arc<SessionSlot> {
        &self.slot
    }

    /// Picks a card; rejections are local notices, acceptance spawns
    /// the legal-moves fetch.
    pub fn select(&mut self, index: usize) {
        let Some(session) = self.slot.snapshot() else {
            return;
        };
        match self.machine.select(&session, index) {
            Select::NotYourTurn => {
                self.notifier.notify("It is not your turn!", Severity::Error)
            }
            Select::Busy => log::debug!("[client] selection refused, submission in flight"),
            Select::Fetch(index) => {
                let api = Arc::clone(&self.api);
                let tx = self.legal_tx.clone();
                let id = session.game_id.clone();
                tokio::spawn(async move {
                    let result = api.legal_moves(&id, index).await;
                    let _ = tx.send((index, result));
                });
            }
        }
    }

    /// Drains completed legal fetches into the machine and reconciles
    /// it with the latest snapshot, so a turn change delivered by
    /// polling clears a stale selection. Call between interactions.
    pub fn pump(&mut self) {
        while let Ok((index, result)) = self.legal_rx.try_recv() {
            match result {
                Ok(legal) => {
                    self.machine.apply_legal(index, legal);
                }
                Err(e) => {
                    // Only meaningful while that card is still selected.
                    if self.machine.selection() == Some(index) {
                        log::warn!("[client] legal-moves fetch failed: {}", e);
                    }
                }
            }
        }
        if let Some(session) = self.slot.snapshot() {
            self.machine.observe(&session);
        }
    }

    /// Clicks a board cell; a legal hit submits the move and the
    /// response snapshot replaces the session wholesale.
    pub async fn click(&mut self, at: Coord) {
        self.pump();
        // Resolve the session before the machine can go busy; a
        // submission must never latch without somewhere to send it.
        let Some(id) = self.slot.session_id() else {
            return;
        };
        match self.machine.click(at) {
            Click::NoCard => self.notifier.notify("Select a card first", Severity::Info),
            Click::Illegal => self.notifier.notify("Invalid placement", Severity::Error),
            Click::Busy => log::debug!("[client] click refused, submission in flight"),
            Click::Submit { hand_index, at } => {
                let outcome = self.api.submit_move(&id, hand_index, at).await;
                self.machine.settle_move();
                match outcome {
                    Ok(session) => {
                        let session = self.slot.replace(session, Provenance::Submit);
                        self.machine.observe(&session);
                    }
                    Err(e) => self
                        .notifier
                        .notify(&e.reason_or("Invalid Move"), Severity::Error),
                }
            }
        }
    }

    /// Exchanges the selected dead card for a fresh draw.
    pub async fn exchange_dead(&mut self) {
        let Some(id) = self.slot.session_id() else {
            return;
        };
        let Some(hand_index) = self.machine.exchange() else {
            self.notifier.notify("Select a card first", Severity::Info);
            return;
        };
        match self.api.exchange_dead(&id, hand_index).await {
            Ok(session) => {
                self.machine.settle_exchange(true);
                self.notifier.notify("Dead card exchanged", Severity::Success);
                let session = self.slot.replace(session, Provenance::Submit);
                self.machine.observe(&session);
            }
            Err(e) => {
                self.machine.settle_exchange(false);
                self.notifier
                    .notify(&e.reason_or("Card is not dead"), Severity::Error);
            }
        }
    }

    /// Manual refresh outside the polling cadence.
    pub async fn refresh(&mut self) {
        let Some(id) = self.slot.session_id() else {
            return;
        };
        match self.api.fetch_session(&id).await {
            Ok(session) => {
                let session = self.slot.replace(session, Provenance::Poll);
                self.machine.observe(&session);
                self.notifier.notify("Synced", Severity::Info);
            }
            Err(e) => {
                log::warn!("[client] refresh failed: {}", e);
                self.notifier.notify("Sync failed", Severity::Error);
            }
        }
    }
}
