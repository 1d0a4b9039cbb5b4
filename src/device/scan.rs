use tokio_util::sync::CancellationToken;

/// Tracks the running scan of a link. Each `discover` call gets an id so a call that
/// settles after a newer scan started does not tear that scan down.
#[derive(Debug, Default)]
pub struct ScanSlot {
    last_id: u64,
    active: Option<(u64, CancellationToken)>,
}

impl ScanSlot {
    pub fn begin(&mut self, cancel: CancellationToken) -> u64 {
        self.last_id += 1;
        self.active = Some((self.last_id, cancel));
        self.last_id
    }

    /// Releases the slot if `id` is still the running scan. Returns false when a newer
    /// scan owns it.
    pub fn finish(&mut self, id: u64) -> bool {
        match &self.active {
            Some((active_id, _)) if *active_id == id => {
                self.active = None;
                true
            },
            _ => false,
        }
    }

    pub fn cancel(&self) {
        if let Some((_, token)) = &self.active {
            token.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_finish_keeps_newer_scan() {
        let mut slot = ScanSlot::default();
        let first = slot.begin(CancellationToken::new());
        let newer = CancellationToken::new();
        let second = slot.begin(newer.clone());

        assert!(!slot.finish(first));

        slot.cancel();
        assert!(newer.is_cancelled());
        assert!(slot.finish(second));
    }

    #[test]
    fn cancel_keeps_slot_until_finish() {
        let mut slot = ScanSlot::default();
        let token = CancellationToken::new();
        let id = slot.begin(token.clone());

        slot.cancel();

        assert!(token.is_cancelled());
        assert!(slot.finish(id));
        assert!(!slot.finish(id));
    }
}
