use crate::game::GameSession;
use std::sync::Arc;
use std::sync::RwLock;

/// Which channel last wrote the snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Provenance {
    Poll,
    Submit,
    Autoplay,
    Realtime,
}

/// The single slot holding the current session snapshot.
///
/// Updates are whole-value replacements under an atomic swap; readers
/// get a cheap `Arc` clone of whatever was last written. Only one
/// update source is active per room mode (polling xor realtime), and
/// last write by arrival order wins.
#[derive(Default)]
pub struct SessionSlot {
    inner: RwLock<Option<(Arc<GameSession>, Provenance)>>,
}

impl SessionSlot {
    /// Replaces the snapshot wholesale and returns the new value.
    pub fn replace(&self, session: GameSession, from: Provenance) -> Arc<GameSession> {
        let session = Arc::new(session);
        log::trace!(
            "[slot] turn {} via {:?}",
            session.current_turn_index,
            from
        );
        *self.inner.write().unwrap() = Some((Arc::clone(&session), from));
        session
    }
    pub fn snapshot(&self) -> Option<Arc<GameSession>> {
        self.inner.read().unwrap().as_ref().map(|(s, _)| Arc::clone(s))
    }
    pub fn provenance(&self) -> Option<Provenance> {
        self.inner.read().unwrap().as_ref().map(|(_, p)| *p)
    }
    pub fn session_id(&self) -> Option<String> {
        self.snapshot().map(|s| s.game_id.clone())
    }
    /// Terminal once the outcome is set; it never unsets.
    pub fn finished(&self) -> bool {
        self.snapshot().map(|s| s.finished()).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::tests::fixture;

    #[test]
    fn starts_empty() {
        let slot = SessionSlot::default();
        assert!(slot.snapshot().is_none());
        assert!(slot.provenance().is_none());
        assert!(!slot.finished());
    }
    #[test]
    fn last_write_wins() {
        let slot = SessionSlot::default();
        slot.replace(fixture(0, None), Provenance::Poll);
        let mut newer = fixture(1, None);
        newer.current_turn_index = 5;
        slot.replace(newer, Provenance::Realtime);
        let seen = slot.snapshot().unwrap();
        assert_eq!(seen.current_turn_index, 5);
        assert_eq!(slot.provenance(), Some(Provenance::Realtime));
    }
    #[test]
    fn outcome_is_terminal() {
        let slot = SessionSlot::default();
        slot.replace(fixture(0, Some(1)), Provenance::Autoplay);
        assert!(slot.finished());
    }
}
