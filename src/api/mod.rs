pub mod responses;

use std::{collections::BTreeMap, sync::Arc};

use async_trait::async_trait;

use reqwest::{Client, Url};

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use tracing::debug;

use crate::{
    errors::{ApiError, Error},
    models::{Channel, ChannelData, ChannelUser, Invitation, ShareMode},
};

use self::responses::CatalogPage;

pub const DEFAULT_URI: &str = "http://127.0.0.1:8080/api/";

type Result<T> = std::result::Result<T, Error>;

/// Remote access to channels, invitations and channel users.
///
/// `ApiService` is the HTTP implementation; the trait exists so the
/// action layer can run against a test double.
#[async_trait]
pub trait ApiClient {
    /// List channels matching the filters.
    async fn channel_list(&self, filters: &BTreeMap<String, String>) -> Result<Vec<Channel>>;

    /// Fetch one channel, authenticated.
    async fn channel_get(&self, id: &str) -> Result<Channel>;

    /// Fetch one publicly published channel.
    async fn catalog_channel_get(&self, id: &str) -> Result<Channel>;

    /// Persist a locally created channel.
    async fn channel_create(&self, data: &ChannelData) -> Result<()>;

    /// Apply a sparse update to a channel.
    async fn channel_update(&self, id: &str, data: &ChannelData) -> Result<()>;

    /// Paged search over the public catalog.
    async fn search_catalog(&self, query: &BTreeMap<String, String>) -> Result<CatalogPage>;

    /// Raw details payload for one channel.
    async fn channel_details(&self, id: &str) -> Result<Value>;

    /// Users associated with a channel.
    async fn channel_user_list(&self, channel: &str) -> Result<Vec<ChannelUser>>;

    /// Invitations issued for a channel.
    async fn invitation_list(&self, channel: &str) -> Result<Vec<Invitation>>;

    /// Set the declined flag on an invitation.
    async fn invitation_update(&self, id: &str, declined: bool) -> Result<()>;

    /// Email an invitation, returning the created record.
    async fn send_invitation(
        &self,
        channel: &str,
        email: &str,
        share_mode: ShareMode,
    ) -> Result<Invitation>;

    /// Promote a user to editor on a channel.
    async fn make_editor(&self, channel: &str, user: &str) -> Result<()>;

    /// Revoke a user's viewer role on a channel.
    async fn remove_viewer(&self, channel: &str, user: &str) -> Result<()>;
}

#[derive(Clone)]
pub struct ApiService {
    client: Client,
    base_url: Arc<Url>,
}

impl Default for ApiService {
    fn default() -> Self {
        let base_url = Url::parse(DEFAULT_URI).expect("Parsing URI");

        Self::new(base_url)
    }
}

impl ApiService {
    pub fn new(url: Url) -> Self {
        let base_url = Arc::from(url);

        let client = Client::new();

        Self { client, base_url }
    }

    async fn get_json<T>(&self, path: &str, query: &BTreeMap<String, String>) -> Result<T>
    where
        T: ?Sized + DeserializeOwned,
    {
        let url = self.base_url.join(path)?;

        debug!(%url, "api get");

        let bytes = self
            .client
            .get(url)
            .query(query)
            .send()
            .await?
            .bytes()
            .await?;

        decode(&bytes)
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: ?Sized + Serialize + Sync,
        T: ?Sized + DeserializeOwned,
    {
        let url = self.base_url.join(path)?;

        debug!(%url, "api post");

        let bytes = self
            .client
            .post(url)
            .json(body)
            .send()
            .await?
            .bytes()
            .await?;

        decode(&bytes)
    }

    async fn patch_ack<B>(&self, path: &str, body: &B) -> Result<()>
    where
        B: ?Sized + Serialize + Sync,
    {
        let url = self.base_url.join(path)?;

        debug!(%url, "api patch");

        let bytes = self
            .client
            .patch(url)
            .json(body)
            .send()
            .await?
            .bytes()
            .await?;

        ack(&bytes)
    }

    async fn post_ack(&self, path: &str) -> Result<()> {
        let url = self.base_url.join(path)?;

        debug!(%url, "api post");

        let bytes = self.client.post(url).send().await?.bytes().await?;

        ack(&bytes)
    }
}

/// Decode the expected shape, falling back to the API error shape.
fn decode<T>(bytes: &[u8]) -> Result<T>
where
    T: ?Sized + DeserializeOwned,
{
    if let Ok(error) = serde_json::from_slice::<ApiError>(bytes) {
        return Err(error.into());
    }

    Ok(serde_json::from_slice(bytes)?)
}

/// Acknowledge a response whose body only matters when it carries an error.
fn ack(bytes: &[u8]) -> Result<()> {
    if bytes.is_empty() {
        return Ok(());
    }

    if let Ok(error) = serde_json::from_slice::<ApiError>(bytes) {
        return Err(error.into());
    }

    Ok(())
}

#[derive(Serialize)]
struct InvitationEmailRequest<'a> {
    user_email: &'a str,
    share_mode: ShareMode,
    channel_id: &'a str,
}

#[async_trait]
impl ApiClient for ApiService {
    async fn channel_list(&self, filters: &BTreeMap<String, String>) -> Result<Vec<Channel>> {
        self.get_json("channels", filters).await
    }

    async fn channel_get(&self, id: &str) -> Result<Channel> {
        self.get_json(&format!("channels/{}", id), &BTreeMap::new())
            .await
    }

    async fn catalog_channel_get(&self, id: &str) -> Result<Channel> {
        self.get_json(&format!("catalog/{}", id), &BTreeMap::new())
            .await
    }

    async fn channel_create(&self, data: &ChannelData) -> Result<()> {
        let url = self.base_url.join("channels")?;

        debug!(%url, "api post");

        let bytes = self
            .client
            .post(url)
            .json(data)
            .send()
            .await?
            .bytes()
            .await?;

        ack(&bytes)
    }

    async fn channel_update(&self, id: &str, data: &ChannelData) -> Result<()> {
        self.patch_ack(&format!("channels/{}", id), data).await
    }

    async fn search_catalog(&self, query: &BTreeMap<String, String>) -> Result<CatalogPage> {
        self.get_json("catalog", query).await
    }

    async fn channel_details(&self, id: &str) -> Result<Value> {
        self.get_json(&format!("channels/{}/details", id), &BTreeMap::new())
            .await
    }

    async fn channel_user_list(&self, channel: &str) -> Result<Vec<ChannelUser>> {
        let filter = BTreeMap::from([("channel".to_owned(), channel.to_owned())]);

        self.get_json("channel_users", &filter).await
    }

    async fn invitation_list(&self, channel: &str) -> Result<Vec<Invitation>> {
        let filter = BTreeMap::from([("channel".to_owned(), channel.to_owned())]);

        self.get_json("invitations", &filter).await
    }

    async fn invitation_update(&self, id: &str, declined: bool) -> Result<()> {
        let body = BTreeMap::from([("declined", declined)]);

        self.patch_ack(&format!("invitations/{}", id), &body).await
    }

    async fn send_invitation(
        &self,
        channel: &str,
        email: &str,
        share_mode: ShareMode,
    ) -> Result<Invitation> {
        let body = InvitationEmailRequest {
            user_email: email,
            share_mode,
            channel_id: channel,
        };

        self.post_json("invitations/email", &body).await
    }

    async fn make_editor(&self, channel: &str, user: &str) -> Result<()> {
        self.post_ack(&format!("channel_users/{}/make_editor/{}", channel, user))
            .await
    }

    async fn remove_viewer(&self, channel: &str, user: &str) -> Result<()> {
        self.post_ack(&format!("channel_users/{}/remove_viewer/{}", channel, user))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_prefers_api_error() {
        let bytes = br#"{ "detail": "Not found." }"#;

        let result = decode::<Channel>(bytes);

        assert!(matches!(result, Err(Error::Api(_))));
    }

    #[test]
    fn decode_expected_shape() {
        let bytes = br#"{ "id": "c1", "name": "A" }"#;

        let channel = decode::<Channel>(bytes).unwrap();

        assert_eq!(channel.id, "c1");
        assert_eq!(channel.name, "A");
    }

    #[test]
    fn ack_ignores_success_bodies() {
        assert!(ack(b"").is_ok());
        assert!(ack(br#"{ "id": "c1" }"#).is_ok());
        assert!(ack(br#"{ "detail": "Denied." }"#).is_err());
    }
}
