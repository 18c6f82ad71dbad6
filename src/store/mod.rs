pub mod memory;

use crate::models::{Channel, ChannelData, ChannelUser, Invitation, Session};

/// Named state transitions recognized by the store.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    AddChannels(Vec<Channel>),
    AddChannel(Channel),
    SetChannelNotNew { id: String },
    UpdateChannel(ChannelData),
    SetBookmark { id: String, bookmark: bool },
    RemoveChannel { id: String },
    SetUsersToChannel { channel: String, users: Vec<ChannelUser> },
    AddInvitations(Vec<Invitation>),
    AddInvitation(Invitation),
    DeleteInvitation { id: String },
    AddEditorToChannel { channel: String, user: String },
    RemoveViewerFromChannel { channel: String, user: String },
}

/// The client-side system of record for UI state.
///
/// Reads are point-in-time snapshots and commits apply synchronously,
/// last writer wins. The action layer only ever talks to the store
/// through this trait.
pub trait StateStore {
    /// Current-user session info.
    fn session(&self) -> Session;

    /// Locally known state for one channel.
    fn channel(&self, id: &str) -> Option<Channel>;

    /// Apply a named state transition.
    fn commit(&self, mutation: Mutation);
}
