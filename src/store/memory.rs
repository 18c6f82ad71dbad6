use std::{
    collections::BTreeMap,
    sync::{Arc, RwLock},
};

use crate::models::{Channel, ChannelData, ChannelUser, Invitation, Session};

use super::{Mutation, StateStore};

/// In-memory store. State lives behind a lock so clones share it.
#[derive(Default, Clone)]
pub struct MemoryStore {
    inner: Arc<RwLock<State>>,
}

#[derive(Default)]
struct State {
    session: Session,
    channels_map: BTreeMap<String, Channel>,
    channel_users: BTreeMap<String, Vec<ChannelUser>>,
    invitations_map: BTreeMap<String, Invitation>,
}

impl MemoryStore {
    pub fn new(session: Session) -> Self {
        let state = State {
            session,
            ..Default::default()
        };

        Self {
            inner: Arc::new(RwLock::new(state)),
        }
    }

    /// All locally known channels.
    pub fn channels(&self) -> Vec<Channel> {
        self.inner
            .read()
            .expect("Lock poisoned")
            .channels_map
            .values()
            .cloned()
            .collect()
    }

    /// Users associated with one channel.
    pub fn users_for_channel(&self, channel: &str) -> Vec<ChannelUser> {
        self.inner
            .read()
            .expect("Lock poisoned")
            .channel_users
            .get(channel)
            .cloned()
            .unwrap_or_default()
    }

    /// All locally known invitations.
    pub fn invitations(&self) -> Vec<Invitation> {
        self.inner
            .read()
            .expect("Lock poisoned")
            .invitations_map
            .values()
            .cloned()
            .collect()
    }
}

impl StateStore for MemoryStore {
    fn session(&self) -> Session {
        self.inner.read().expect("Lock poisoned").session.clone()
    }

    fn channel(&self, id: &str) -> Option<Channel> {
        self.inner
            .read()
            .expect("Lock poisoned")
            .channels_map
            .get(id)
            .cloned()
    }

    fn commit(&self, mutation: Mutation) {
        let mut state = self.inner.write().expect("Lock poisoned");

        match mutation {
            Mutation::AddChannels(channels) => {
                for channel in channels {
                    state.channels_map.insert(channel.id.clone(), channel);
                }
            }
            Mutation::AddChannel(channel) => {
                state.channels_map.insert(channel.id.clone(), channel);
            }
            Mutation::SetChannelNotNew { id } => {
                if let Some(channel) = state.channels_map.get_mut(&id) {
                    channel.new = false;
                }
            }
            Mutation::UpdateChannel(data) => {
                let id = match data.id.as_deref() {
                    Some(id) => id,
                    None => return,
                };

                if let Some(channel) = state.channels_map.get_mut(id) {
                    merge_channel_data(channel, data);
                }
            }
            Mutation::SetBookmark { id, bookmark } => {
                if let Some(channel) = state.channels_map.get_mut(&id) {
                    channel.bookmark = bookmark;
                }
            }
            Mutation::RemoveChannel { id } => {
                state.channels_map.remove(&id);
            }
            Mutation::SetUsersToChannel { channel, users } => {
                state.channel_users.insert(channel, users);
            }
            Mutation::AddInvitations(invitations) => {
                for invitation in invitations {
                    state
                        .invitations_map
                        .insert(invitation.id.clone(), invitation);
                }
            }
            Mutation::AddInvitation(invitation) => {
                state
                    .invitations_map
                    .insert(invitation.id.clone(), invitation);
            }
            Mutation::DeleteInvitation { id } => {
                state.invitations_map.remove(&id);
            }
            Mutation::AddEditorToChannel { channel, user } => {
                if let Some(channel) = state.channels_map.get_mut(&channel) {
                    channel.viewers.remove(&user);
                    channel.editors.insert(user);
                }
            }
            Mutation::RemoveViewerFromChannel { channel, user } => {
                if let Some(channel) = state.channels_map.get_mut(&channel) {
                    channel.viewers.remove(&user);
                }
            }
        }
    }
}

fn merge_channel_data(channel: &mut Channel, data: ChannelData) {
    if let Some(name) = data.name {
        channel.name = name;
    }

    if let Some(description) = data.description {
        channel.description = description;
    }

    if let Some(language) = data.language {
        channel.language = Some(language);
    }

    if let Some(defaults) = data.content_defaults {
        channel.content_defaults.extend(defaults);
    }

    if let Some(thumbnail) = data.thumbnail {
        channel.thumbnail = Some(thumbnail);
    }

    if let Some(thumbnail_url) = data.thumbnail_url {
        channel.thumbnail_url = Some(thumbnail_url);
    }

    if let Some(encoding) = data.thumbnail_encoding {
        channel.thumbnail_encoding = encoding;
    }

    if let Some(demo_server_url) = data.demo_server_url {
        channel.demo_server_url = Some(demo_server_url);
    }

    if let Some(source_url) = data.source_url {
        channel.source_url = Some(source_url);
    }

    if let Some(deleted) = data.deleted {
        channel.deleted = deleted;
    }

    if let Some(public) = data.public {
        channel.public = public;
    }

    if let Some(bookmark) = data.bookmark {
        channel.bookmark = bookmark;
    }
}
