use lyre_core::{QueueSnapshot, TrackId};
use ratatui::widgets::ListState;

/// One line of the Queue tab
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueRow {
    Header(String),
    Track(TrackId),
}

/// Last queue snapshot received from the scheduler plus the list scroll position
#[derive(Debug, Clone, Default)]
pub struct QueueState {
    pub snapshot: QueueSnapshot,
    pub list_state: ListState,
}

impl QueueState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, snapshot: QueueSnapshot) {
        self.snapshot = snapshot;
        let len = self.rows().len();
        match self.list_state.selected() {
            Some(i) if i >= len => self.list_state.select(len.checked_sub(1)),
            None if len > 0 => self.list_state.select(Some(0)),
            _ => {}
        }
    }

    /// Flatten the snapshot into sections: up next, each queued list, history
    pub fn rows(&self) -> Vec<QueueRow> {
        let mut rows = Vec::new();
        let snapshot = &self.snapshot;

        if !snapshot.current.is_empty() {
            rows.push(QueueRow::Header("Up next".to_string()));
            rows.extend(snapshot.current.iter().copied().map(QueueRow::Track));
        }
        for (i, list) in snapshot.queued.iter().enumerate() {
            rows.push(QueueRow::Header(format!("Queued list {}", i + 1)));
            rows.extend(list.iter().copied().map(QueueRow::Track));
        }
        if !snapshot.history.is_empty() {
            rows.push(QueueRow::Header("History".to_string()));
            rows.extend(snapshot.history.iter().copied().map(QueueRow::Track));
        }
        rows
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot.current.is_empty()
            && self.snapshot.queued.is_empty()
            && self.snapshot.history.is_empty()
    }

    pub fn next(&mut self) {
        let len = self.rows().len();
        if len == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn prev(&mut self) {
        let len = self.rows().len();
        if len == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.list_state.select(Some(i));
    }
}
