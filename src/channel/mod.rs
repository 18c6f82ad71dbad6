use std::collections::BTreeMap;

use futures::future::{try_join, try_join_all};

use serde_json::{Map, Value};

use strum::Display;

use tracing::debug;

use uuid::Uuid;

use crate::{
    api::ApiClient,
    errors::Error,
    models::{Channel, ChannelData, ChannelPatch, ContentDefaults, ShareMode},
    store::{Mutation, StateStore},
};

/// Channel list views selectable by the UI. The selected view becomes
/// a `<view>=true` filter on the list query.
#[derive(Display, Debug, Clone, Copy, PartialEq, Eq)]
#[strum(serialize_all = "lowercase")]
pub enum ChannelListType {
    Edit,
    View,
    Bookmark,
    Public,
}

/// Filters for [`ChannelActions::load_channel_list`].
#[derive(Default, Debug, Clone)]
pub struct ChannelListQuery {
    pub list_type: Option<ChannelListType>,
    pub filters: BTreeMap<String, String>,
}

/// Catalog search parameters for [`ChannelActions::get_channel_list_details`].
#[derive(Default, Debug, Clone)]
pub struct CatalogQuery {
    /// Channel ids to skip in the results.
    pub excluded: Vec<String>,
    pub filters: BTreeMap<String, String>,
}

pub const CATALOG_PAGE_SIZE: u32 = u32::MAX;

/// The channel action layer.
///
/// Each method issues the remote calls for one UI action and commits
/// the named state transitions into the store. Remote failures reject
/// the returned future; nothing is committed for the failed part.
#[derive(Clone)]
pub struct ChannelActions<C, S>
where
    C: ApiClient,
    S: StateStore,
{
    client: C,
    store: S,
}

impl<C, S> ChannelActions<C, S>
where
    C: ApiClient,
    S: StateStore,
{
    pub fn new(client: C, store: S) -> Self {
        Self { client, store }
    }

    /// Query the channel list and register the results.
    pub async fn load_channel_list(&self, query: ChannelListQuery) -> Result<Vec<Channel>, Error> {
        let ChannelListQuery {
            list_type,
            mut filters,
        } = query;

        if let Some(list_type) = list_type {
            filters.insert(list_type.to_string(), "true".to_owned());
        }

        let channels = self.client.channel_list(&filters).await?;

        self.store.commit(Mutation::AddChannels(channels.clone()));

        Ok(channels)
    }

    /// Fetch one channel, going through the public catalog when the
    /// session is not logged in.
    pub async fn load_channel(&self, id: &str) -> Result<Channel, Error> {
        let channel = if self.store.session().logged_in {
            self.client.channel_get(id).await?
        } else {
            self.client.catalog_channel_get(id).await?
        };

        self.store.commit(Mutation::AddChannel(channel.clone()));

        Ok(channel)
    }

    /// Synthesize a new channel from session defaults and register it
    /// locally. Nothing is persisted until [`Self::commit_channel`].
    ///
    /// Returns the generated channel id.
    pub fn create_channel(&self) -> String {
        let session = self.store.session();

        let channel = Channel {
            id: Uuid::new_v4().simple().to_string(),
            language: session.default_language(),
            content_defaults: session.preferences.unwrap_or_default(),
            editors: session.current_user_id.into_iter().collect(),
            edit: true,
            new: true,
            ..Default::default()
        };

        let id = channel.id.clone();

        debug!(%id, "new channel");

        self.store.commit(Mutation::AddChannel(channel));

        id
    }

    /// Persist a locally created channel, then clear its `new` flag.
    ///
    /// No-ops when the channel is unknown locally. Unlike
    /// [`Self::update_channel`] this does not touch in-memory field
    /// values.
    pub async fn commit_channel(&self, patch: ChannelPatch) -> Result<(), Error> {
        let id = patch.id.clone().ok_or(Error::MissingId)?;

        let current = match self.store.channel(&id) {
            Some(channel) => channel,
            None => return Ok(()),
        };

        let data = build_channel_data(patch, &current);

        self.client.channel_create(&data).await?;

        self.store.commit(Mutation::SetChannelNotNew { id });

        Ok(())
    }

    /// Apply a sparse update, optimistically: the local commit lands
    /// before the remote update is issued.
    pub async fn update_channel(&self, patch: ChannelPatch) -> Result<(), Error> {
        let id = patch.id.clone().ok_or(Error::MissingId)?;

        let current = match self.store.channel(&id) {
            Some(channel) => channel,
            None => return Ok(()),
        };

        let data = build_channel_data(patch, &current);

        self.store.commit(Mutation::UpdateChannel(data.clone()));

        self.client.channel_update(&id, &data).await?;

        Ok(())
    }

    /// Persist the bookmark flag, then commit it locally.
    pub async fn bookmark_channel(&self, id: &str, bookmark: bool) -> Result<(), Error> {
        let data = ChannelData {
            bookmark: Some(bookmark),
            ..Default::default()
        };

        self.client.channel_update(id, &data).await?;

        self.store.commit(Mutation::SetBookmark {
            id: id.to_owned(),
            bookmark,
        });

        Ok(())
    }

    /// Soft-delete a channel remotely, then drop it from the active
    /// list. The record itself survives server side.
    pub async fn delete_channel(&self, id: &str) -> Result<(), Error> {
        let data = ChannelData {
            deleted: Some(true),
            ..Default::default()
        };

        self.client.channel_update(id, &data).await?;

        self.store
            .commit(Mutation::RemoveChannel { id: id.to_owned() });

        Ok(())
    }

    /// Raw details payload for one channel. No state is committed.
    pub async fn load_channel_details(&self, id: &str) -> Result<Value, Error> {
        self.client.channel_details(id).await
    }

    /// Search the whole public catalog and return each result merged
    /// with its details payload, details winning on key conflicts.
    ///
    /// Details are fetched concurrently; result order follows the
    /// search results, not completion order.
    pub async fn get_channel_list_details(&self, query: CatalogQuery) -> Result<Vec<Value>, Error> {
        let CatalogQuery {
            excluded,
            mut filters,
        } = query;

        filters.insert("public".to_owned(), "true".to_owned());
        filters.insert("published".to_owned(), "true".to_owned());
        filters.insert("page_size".to_owned(), CATALOG_PAGE_SIZE.to_string());
        filters.insert("page".to_owned(), "1".to_owned());

        let page = self.client.search_catalog(&filters).await?;

        let results: Vec<Channel> = page
            .results
            .into_iter()
            .filter(|channel| !excluded.contains(&channel.id))
            .collect();

        let details = try_join_all(
            results
                .iter()
                .map(|channel| self.client.channel_details(&channel.id)),
        )
        .await?;

        results
            .into_iter()
            .zip(details)
            .map(|(channel, details)| merge_details(channel, details))
            .collect()
    }

    /// Fetch a channel's users and invitations together and commit
    /// both.
    pub async fn load_channel_users(&self, channel_id: &str) -> Result<(), Error> {
        let (users, invitations) = try_join(
            self.client.channel_user_list(channel_id),
            self.client.invitation_list(channel_id),
        )
        .await?;

        self.store.commit(Mutation::SetUsersToChannel {
            channel: channel_id.to_owned(),
            users,
        });
        self.store.commit(Mutation::AddInvitations(invitations));

        Ok(())
    }

    /// Email a sharing invitation and register the created record.
    pub async fn send_invitation(
        &self,
        channel_id: &str,
        email: &str,
        share_mode: ShareMode,
    ) -> Result<(), Error> {
        let invitation = self
            .client
            .send_invitation(channel_id, email, share_mode)
            .await?;

        self.store.commit(Mutation::AddInvitation(invitation));

        Ok(())
    }

    /// Decline an invitation remotely so it disappears for the other
    /// user too, then drop it locally. True deletion is disabled.
    pub async fn delete_invitation(&self, invitation_id: &str) -> Result<(), Error> {
        self.client.invitation_update(invitation_id, true).await?;

        self.store.commit(Mutation::DeleteInvitation {
            id: invitation_id.to_owned(),
        });

        Ok(())
    }

    /// Promote a user to editor; the local role change only lands on
    /// remote success.
    pub async fn make_editor(&self, channel_id: &str, user_id: &str) -> Result<(), Error> {
        self.client.make_editor(channel_id, user_id).await?;

        self.store.commit(Mutation::AddEditorToChannel {
            channel: channel_id.to_owned(),
            user: user_id.to_owned(),
        });

        Ok(())
    }

    /// Revoke a user's viewer role; the local removal only lands on
    /// remote success.
    pub async fn remove_viewer(&self, channel_id: &str, user_id: &str) -> Result<(), Error> {
        self.client.remove_viewer(channel_id, user_id).await?;

        self.store.commit(Mutation::RemoveViewerFromChannel {
            channel: channel_id.to_owned(),
            user: user_id.to_owned(),
        });

        Ok(())
    }
}

/// Build the sparse update payload from the supplied patch fields.
///
/// `content_defaults` is diffed against the locally cached copy;
/// unchanged keys are dropped and an empty diff omits the field.
fn build_channel_data(patch: ChannelPatch, current: &Channel) -> ChannelData {
    let ChannelPatch {
        id,
        name,
        description,
        thumbnail_data,
        language,
        content_defaults,
        demo_server_url,
        source_url,
        deleted,
        public,
    } = patch;

    let mut data = ChannelData {
        id,
        name,
        description,
        language,
        demo_server_url,
        source_url,
        deleted,
        public,
        ..Default::default()
    };

    if let Some(thumbnail_data) = thumbnail_data {
        data.thumbnail = thumbnail_data.thumbnail;
        data.thumbnail_url = thumbnail_data.thumbnail_url;
        data.thumbnail_encoding = Some(thumbnail_data.thumbnail_encoding.unwrap_or_default());
    }

    if let Some(defaults) = content_defaults {
        let changed: ContentDefaults = defaults
            .into_iter()
            .filter(|(key, value)| current.content_defaults.get(key) != Some(value))
            .collect();

        if !changed.is_empty() {
            data.content_defaults = Some(changed);
        }
    }

    data
}

fn merge_details(channel: Channel, details: Value) -> Result<Value, Error> {
    let mut merged = match serde_json::to_value(&channel)? {
        Value::Object(map) => map,
        _ => Map::new(),
    };

    if let Value::Object(details) = details {
        for (key, value) in details {
            merged.insert(key, value);
        }
    }

    Ok(Value::Object(merged))
}
