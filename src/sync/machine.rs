use crate::PlayerId;
use crate::game::Coord;
use crate::game::GameSession;
use crate::game::LegalMoves;

/// What a card selection attempt produced.
#[derive(Debug, PartialEq)]
pub enum Select {
    /// Not this player's turn; no state change, no fetch.
    NotYourTurn,
    /// A submission is outstanding; the selection is refused locally.
    Busy,
    /// Selection took; fetch legal moves for this hand index.
    Fetch(usize),
}

/// What a board click produced.
#[derive(Debug, PartialEq)]
pub enum Click {
    /// Nothing selected yet.
    NoCard,
    /// Cell is not in the current legal set (or the set is not here
    /// yet); state unchanged.
    Illegal,
    /// A submission is already in flight; refused locally.
    Busy,
    /// Issue the move command.
    Submit { hand_index: usize, at: Coord },
}

/// Turn-scoped interaction state for the locally controlled player.
///
/// Selection and the legal set are ephemeral and local-only; the
/// machine decides when to ask the server and what to do with the
/// answer, but never judges legality itself beyond membership in the
/// server's last answer.
#[derive(Debug)]
pub struct TurnMachine {
    local: PlayerId,
    selection: Option<usize>,
    legal: Option<LegalMoves>,
    submitting: bool,
}

impl TurnMachine {
    pub fn new(local: PlayerId) -> Self {
        Self {
            local,
            selection: None,
            legal: None,
            submitting: false,
        }
    }
    pub fn local(&self) -> PlayerId {
        self.local
    }
    pub fn selection(&self) -> Option<usize> {
        self.selection
    }
    pub fn legal(&self) -> Option<&LegalMoves> {
        self.legal.as_ref()
    }
    pub fn submitting(&self) -> bool {
        self.submitting
    }

    /// Picks a card from the local hand. Allowed only on the local
    /// player's turn; a new selection supersedes any prior one and
    /// invalidates its in-flight legal fetch.
    pub fn select(&mut self, session: &GameSession, index: usize) -> Select {
        if self.submitting {
            return Select::Busy;
        }
        if !session.is_turn(self.local) {
            return Select::NotYourTurn;
        }
        self.selection = Some(index);
        self.legal = None;
        Select::Fetch(index)
    }

    /// Applies a completed legal-moves fetch. Results for a
    /// superseded index are discarded: last selection wins.
    pub fn apply_legal(&mut self, index: usize, legal: LegalMoves) -> bool {
        if self.selection != Some(index) {
            log::debug!("[turn] discarding stale legal moves for hand {}", index);
            return false;
        }
        self.legal = Some(legal);
        true
    }

    /// Clicks a board cell with the current selection.
    pub fn click(&mut self, at: Coord) -> Click {
        if self.submitting {
            return Click::Busy;
        }
        let Some(hand_index) = self.selection else {
            return Click::NoCard;
        };
        match &self.legal {
            Some(legal) if legal.contains(at) => {
                self.submitting = true;
                Click::Submit { hand_index, at }
            }
            _ => Click::Illegal,
        }
    }

    /// Starts the dead-card exchange over the same selection.
    /// Returns the hand index to send, or None when nothing is
    /// selected or a submission is already outstanding.
    pub fn exchange(&mut self) -> Option<usize> {
        if self.submitting {
            return None;
        }
        self.selection.inspect(|_| self.submitting = true)
    }

    /// Settles a move submission. Selection clears on both outcomes;
    /// the failure notice is the caller's job.
    pub fn settle_move(&mut self) {
        self.submitting = false;
        self.clear();
    }

    /// Settles a dead-card exchange. Success clears the selection;
    /// failure retains it so the player may retry or play the card.
    pub fn settle_exchange(&mut self, succeeded: bool) {
        self.submitting = false;
        if succeeded {
            self.clear();
        }
    }

    /// Explicit cancel.
    pub fn clear(&mut self) {
        self.selection = None;
        self.legal = None;
    }

    /// Reconciles with a fresh snapshot: a selection must never
    /// survive the turn moving away from the local player.
    pub fn observe(&mut self, session: &GameSession) {
        if !self.submitting && !session.is_turn(self.local) && self.selection.is_some() {
            log::debug!("[turn] turn moved away, clearing selection");
            self.clear();
        }
    }
}
