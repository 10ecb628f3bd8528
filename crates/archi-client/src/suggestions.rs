use archi_types::document::DocumentId;
use archi_types::models::Suggestion;

/// Local view of the suggestions collection: two independent sources of
/// truth, reconciled only by a fresh fetch. `confirmed` is the last one-shot
/// fetch; `pending` holds this session's optimistic appends. Staleness
/// against other clients is accepted behavior — there is deliberately no
/// subscription here.
#[derive(Default)]
pub struct SuggestionBoard {
    confirmed: Vec<Suggestion>,
    pending: Vec<Suggestion>,
}

impl SuggestionBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the confirmed list with a fresh fetch and drop the overlay.
    pub fn refresh(&mut self, confirmed: Vec<Suggestion>) {
        self.confirmed = confirmed;
        self.pending.clear();
    }

    /// Optimistic append after the store acknowledged the create.
    pub fn push_pending(&mut self, suggestion: Suggestion) {
        self.pending.push(suggestion);
    }

    /// Remove by identity, from whichever list holds the id. Called only
    /// after the store confirmed the delete.
    pub fn remove(&mut self, id: &DocumentId) {
        self.confirmed.retain(|s| &s.id != id);
        self.pending.retain(|s| &s.id != id);
    }

    /// Confirmed entries followed by this session's optimistic appends.
    pub fn entries(&self) -> impl Iterator<Item = &Suggestion> {
        self.confirmed.iter().chain(self.pending.iter())
    }

    pub fn get(&self, index: usize) -> Option<&Suggestion> {
        self.entries().nth(index)
    }

    pub fn len(&self) -> usize {
        self.confirmed.len() + self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use archi_types::document::DocumentId;
    use chrono::Utc;

    fn suggestion(text: &str) -> Suggestion {
        Suggestion {
            id: DocumentId::generate(),
            text: text.to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn entries_list_confirmed_before_pending() {
        let mut board = SuggestionBoard::new();
        board.refresh(vec![suggestion("old")]);
        board.push_pending(suggestion("new"));

        let texts: Vec<&str> = board.entries().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, ["old", "new"]);
    }

    #[test]
    fn refresh_drops_the_optimistic_overlay() {
        let mut board = SuggestionBoard::new();
        board.push_pending(suggestion("mine"));
        board.refresh(vec![suggestion("theirs")]);

        assert_eq!(board.len(), 1);
        assert_eq!(board.get(0).unwrap().text, "theirs");
    }

    #[test]
    fn remove_targets_exactly_one_entry_by_id() {
        let mut board = SuggestionBoard::new();
        let keep = suggestion("keep");
        let gone = suggestion("gone");
        board.refresh(vec![keep.clone(), gone.clone()]);
        board.push_pending(suggestion("pending"));

        board.remove(&gone.id);
        let texts: Vec<&str> = board.entries().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, ["keep", "pending"]);
    }

    #[test]
    fn removing_unknown_id_changes_nothing() {
        let mut board = SuggestionBoard::new();
        board.refresh(vec![suggestion("only")]);
        board.remove(&DocumentId::from("unknown"));
        assert_eq!(board.len(), 1);
    }
}
