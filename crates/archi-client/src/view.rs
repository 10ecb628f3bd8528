use archi_store::DocumentStore;
use archi_types::models::{Message, Suggestion};
use tracing::{error, info};

use crate::api::ChatApi;
use crate::feed::MessageFeed;
use crate::suggestions::SuggestionBoard;

/// The two screens of the chat view. The gate transitions forward once, on
/// a non-blank username that the store accepted; there is no way back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    AwaitingUsername,
    Active,
}

/// Everything the active screen owns: the display name, the live message
/// feed, and the suggestion board. Dropping the session releases the
/// message subscription.
pub struct Session {
    pub username: String,
    pub feed: MessageFeed,
    pub board: SuggestionBoard,
}

/// View state machine. `AwaitingUsername` shows only the gate; `Active` is
/// a single screen where the message list, suggestion panel, and composer
/// are all interactive at once.
pub struct ChatView<S> {
    api: ChatApi<S>,
    session: Option<Session>,
}

impl<S: DocumentStore> ChatView<S> {
    pub fn new(store: S) -> Self {
        Self {
            api: ChatApi::new(store),
            session: None,
        }
    }

    pub fn state(&self) -> ViewState {
        if self.session.is_some() {
            ViewState::Active
        } else {
            ViewState::AwaitingUsername
        }
    }

    /// Submit the username gate. On success this acquires the message
    /// subscription and performs the one-shot suggestion fetch, then
    /// transitions to `Active`. Returns false if the gate stays up.
    pub async fn submit_username(&mut self, input: &str) -> bool {
        if self.session.is_some() {
            return true;
        }
        let Some(user) = self.api.register_user(input).await else {
            return false;
        };

        let feed = match MessageFeed::open(self.api.store()).await {
            Ok(feed) => feed,
            Err(e) => {
                error!("error opening message feed: {}", e);
                return false;
            }
        };

        let mut board = SuggestionBoard::new();
        board.refresh(self.api.list_suggestions().await);

        info!("logged in as {}", user.username);
        self.session = Some(Session {
            username: user.username,
            feed,
            board,
        });
        true
    }

    pub async fn send_message(&self, text: &str) {
        let Some(session) = &self.session else {
            return;
        };
        self.api.send_message(text, &session.username).await;
    }

    pub async fn add_suggestion(&mut self, text: &str) {
        let Some(session) = &mut self.session else {
            return;
        };
        if let Some(suggestion) = self.api.add_suggestion(text).await {
            session.board.push_pending(suggestion);
        }
    }

    /// Delete the suggestion currently displayed at `index`. The local
    /// entry goes away only once the store confirmed.
    pub async fn delete_suggestion(&mut self, index: usize) -> bool {
        let Some(session) = &mut self.session else {
            return false;
        };
        let Some(id) = session.board.get(index).map(|s| s.id.clone()) else {
            return false;
        };
        if self.api.delete_suggestion(&id).await {
            session.board.remove(&id);
            return true;
        }
        false
    }

    /// Wait for the next message snapshot. Returns false while the gate is
    /// up or once the feed has closed.
    pub async fn next_snapshot(&mut self) -> bool {
        match &mut self.session {
            Some(session) => session.feed.changed().await,
            None => false,
        }
    }

    pub fn messages(&self) -> &[Message] {
        self.session
            .as_ref()
            .map_or(&[], |session| session.feed.messages())
    }

    pub fn suggestions(&self) -> Vec<&Suggestion> {
        self.session
            .as_ref()
            .map(|session| session.board.entries().collect())
            .unwrap_or_default()
    }

    pub fn username(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.username.as_str())
    }

    /// Hand the active session (and the API) to a caller that wants to
    /// drive the feed and the input side independently, as the terminal
    /// loop does.
    pub fn into_parts(self) -> (ChatApi<S>, Option<Session>) {
        (self.api, self.session)
    }
}
