//! Chat slice: conversation list, open conversation, unread counter.

use crate::environment::ClientEnvironment;
use smallvec::{SmallVec, smallvec};
use std::marker::PhantomData;
use travel_desk_api::ChatApi;
use travel_desk_api::types::{ChatMessage, Conversation, MessageId, SendMessageRequest, UserId};
use travel_desk_core::collection::EntityCollection;
use travel_desk_core::request::RequestStatus;
use travel_desk_core::{effect::Effect, reducer::Reducer, thunk};
use travel_desk_macros::Action;

/// Operation kinds of the chat slice
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ChatOp {
    /// Message send
    Send,
    /// Conversation history fetch
    History,
    /// Conversation list fetch
    Conversations,
    /// Mark a conversation read
    MarkRead,
    /// Unread counter fetch
    UnreadCount,
    /// Message deletion
    Delete,
}

impl ChatOp {
    /// Fixed message used when the server gives none
    #[must_use]
    pub const fn fallback(self) -> &'static str {
        match self {
            Self::Send => "Failed to send message",
            Self::History => "Failed to fetch chat history",
            Self::Conversations => "Failed to fetch conversations",
            Self::MarkRead => "Failed to mark messages as read",
            Self::UnreadCount => "Failed to fetch unread count",
            Self::Delete => "Failed to delete message",
        }
    }
}

/// Chat state
#[derive(Clone, Debug, Default)]
pub struct ChatState {
    /// Conversation list, keyed by the other participant
    pub conversations: EntityCollection<Conversation>,
    /// Messages of the open conversation, oldest first
    pub messages: EntityCollection<ChatMessage>,
    /// Participant of the open conversation
    pub active_peer: Option<UserId>,
    /// Unread messages across all conversations
    pub unread_count: u32,
    /// Loading flags and last error
    pub status: RequestStatus<ChatOp>,
}

/// Chat actions
#[derive(Action, Clone, Debug)]
pub enum ChatAction {
    /// Send a message
    #[pending]
    Send {
        /// Recipient and text
        request: SendMessageRequest,
    },
    /// Message stored
    #[fulfilled]
    Sent {
        /// The stored message
        message: ChatMessage,
    },
    /// Send failed
    #[rejected]
    SendFailed {
        /// Server message, if any
        message: Option<String>,
    },

    /// Open a conversation and fetch its messages
    #[pending]
    FetchHistory {
        /// The other participant
        user_id: UserId,
    },
    /// Messages arrived
    #[fulfilled]
    HistoryFetched {
        /// The other participant
        user_id: UserId,
        /// Messages, oldest first
        messages: Vec<ChatMessage>,
    },
    /// History fetch failed
    #[rejected]
    HistoryFailed {
        /// Server message, if any
        message: Option<String>,
    },

    /// Fetch the conversation list
    #[pending]
    FetchConversations,
    /// Conversation list arrived
    #[fulfilled]
    ConversationsFetched {
        /// Conversations as served
        conversations: Vec<Conversation>,
    },
    /// Conversation list fetch failed
    #[rejected]
    ConversationsFailed {
        /// Server message, if any
        message: Option<String>,
    },

    /// Mark every message from a participant read
    #[pending]
    MarkRead {
        /// Author of the messages
        sender_id: UserId,
    },
    /// Messages marked read
    #[fulfilled]
    MarkedRead {
        /// Author of the messages
        sender_id: UserId,
    },
    /// Marking failed
    #[rejected]
    MarkReadFailed {
        /// Server message, if any
        message: Option<String>,
    },

    /// Fetch the unread counter
    #[pending]
    FetchUnreadCount,
    /// Counter arrived
    #[fulfilled]
    UnreadCountFetched {
        /// Unread messages
        count: u32,
    },
    /// Counter fetch failed
    #[rejected]
    UnreadCountFailed {
        /// Server message, if any
        message: Option<String>,
    },

    /// Delete one message
    #[pending]
    Delete {
        /// Message to delete
        id: MessageId,
    },
    /// Message deleted
    #[fulfilled]
    Deleted {
        /// The deleted id
        id: MessageId,
    },
    /// Deletion failed
    #[rejected]
    DeleteFailed {
        /// Server message, if any
        message: Option<String>,
    },

    /// Leave the open conversation
    CloseConversation,
    /// Dismiss the error banner
    ClearError,
}

/// Reducer of the chat slice
pub struct ChatReducer<B> {
    _marker: PhantomData<fn() -> B>,
}

impl<B> ChatReducer<B> {
    /// Create a new chat reducer
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<B> Default for ChatReducer<B> {
    fn default() -> Self {
        Self::new()
    }
}

fn reject(state: &mut ChatState, op: ChatOp, message: Option<String>) {
    tracing::warn!(
        ?op,
        message = message.as_deref().unwrap_or_default(),
        "Chat request rejected"
    );
    state.status.rejected(op, message, op.fallback());
}

impl<B> Reducer for ChatReducer<B>
where
    B: ChatApi + Clone + 'static,
{
    type State = ChatState;
    type Action = ChatAction;
    type Environment = ClientEnvironment<B>;

    #[allow(clippy::too_many_lines)]
    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            ChatAction::Send { request } => {
                state.status.pending(ChatOp::Send);

                let api = env.api.clone();
                smallvec![thunk! {
                    request: api.send_message(&request),
                    on_success: |message| ChatAction::Sent { message },
                    on_error: |error| ChatAction::SendFailed { message: error.server_message() },
                }]
            },
            ChatAction::Sent { message } => {
                state.status.fulfilled(ChatOp::Send);
                if let Some(conversation) = state.conversations.get_mut(&message.receiver_id) {
                    conversation.last_message = Some(message.content.clone());
                    conversation.last_message_at = Some(message.created_at);
                }
                if state.active_peer.as_ref() == Some(&message.receiver_id) {
                    state.messages.append(message);
                }
                SmallVec::new()
            },
            ChatAction::SendFailed { message } => {
                reject(state, ChatOp::Send, message);
                SmallVec::new()
            },

            ChatAction::FetchHistory { user_id } => {
                state.status.pending(ChatOp::History);
                state.active_peer = Some(user_id.clone());

                let api = env.api.clone();
                let peer = user_id.clone();
                smallvec![thunk! {
                    request: api.chat_history(&user_id),
                    on_success: |messages| ChatAction::HistoryFetched { user_id: peer, messages },
                    on_error: |error| ChatAction::HistoryFailed { message: error.server_message() },
                }]
            },
            ChatAction::HistoryFetched { user_id, messages } => {
                state.status.fulfilled(ChatOp::History);
                state.active_peer = Some(user_id);
                state.messages.replace(messages);
                SmallVec::new()
            },
            ChatAction::HistoryFailed { message } => {
                reject(state, ChatOp::History, message);
                state.messages.clear();
                SmallVec::new()
            },

            ChatAction::FetchConversations => {
                state.status.pending(ChatOp::Conversations);

                let api = env.api.clone();
                smallvec![thunk! {
                    request: api.conversations(),
                    on_success: |conversations| ChatAction::ConversationsFetched { conversations },
                    on_error: |error| ChatAction::ConversationsFailed { message: error.server_message() },
                }]
            },
            ChatAction::ConversationsFetched { conversations } => {
                state.status.fulfilled(ChatOp::Conversations);
                state.conversations.replace(conversations);
                SmallVec::new()
            },
            ChatAction::ConversationsFailed { message } => {
                reject(state, ChatOp::Conversations, message);
                state.conversations.clear();
                SmallVec::new()
            },

            ChatAction::MarkRead { sender_id } => {
                state.status.pending(ChatOp::MarkRead);

                let api = env.api.clone();
                let sender = sender_id.clone();
                smallvec![thunk! {
                    request: api.mark_read(&sender_id),
                    on_success: |()| ChatAction::MarkedRead { sender_id: sender },
                    on_error: |error| ChatAction::MarkReadFailed { message: error.server_message() },
                }]
            },
            ChatAction::MarkedRead { sender_id } => {
                state.status.fulfilled(ChatOp::MarkRead);
                for message in state.messages.iter_mut().filter(|m| m.sender_id == sender_id) {
                    message.read = true;
                }
                if let Some(conversation) = state.conversations.get_mut(&sender_id) {
                    state.unread_count = state.unread_count.saturating_sub(conversation.unread_count);
                    conversation.unread_count = 0;
                }
                SmallVec::new()
            },
            ChatAction::MarkReadFailed { message } => {
                reject(state, ChatOp::MarkRead, message);
                SmallVec::new()
            },

            ChatAction::FetchUnreadCount => {
                state.status.pending(ChatOp::UnreadCount);

                let api = env.api.clone();
                smallvec![thunk! {
                    request: api.unread_count(),
                    on_success: |count| ChatAction::UnreadCountFetched { count },
                    on_error: |error| ChatAction::UnreadCountFailed { message: error.server_message() },
                }]
            },
            ChatAction::UnreadCountFetched { count } => {
                state.status.fulfilled(ChatOp::UnreadCount);
                state.unread_count = count;
                SmallVec::new()
            },
            ChatAction::UnreadCountFailed { message } => {
                reject(state, ChatOp::UnreadCount, message);
                state.unread_count = 0;
                SmallVec::new()
            },

            ChatAction::Delete { id } => {
                state.status.pending(ChatOp::Delete);

                let api = env.api.clone();
                smallvec![thunk! {
                    request: api.delete_message(&id),
                    on_success: |id| ChatAction::Deleted { id },
                    on_error: |error| ChatAction::DeleteFailed { message: error.server_message() },
                }]
            },
            ChatAction::Deleted { id } => {
                state.status.fulfilled(ChatOp::Delete);
                state.messages.remove(&id);
                SmallVec::new()
            },
            ChatAction::DeleteFailed { message } => {
                reject(state, ChatOp::Delete, message);
                SmallVec::new()
            },

            ChatAction::CloseConversation => {
                state.active_peer = None;
                state.messages.clear();
                SmallVec::new()
            },
            ChatAction::ClearError => {
                state.status.clear_error();
                SmallVec::new()
            },
        }
    }
}
