use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use strum::Display;

/// Default-content settings, keyed by setting name.
pub type ContentDefaults = BTreeMap<String, Value>;

/// Role granted when a channel is shared with a user.
#[derive(Deserialize, Serialize, Display, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ShareMode {
    Edit,
    View,
}

/// A content collection record, the primary entity being managed.
///
/// The `edit` and `new` flags only exist client side and are never
/// sent to the server.
#[derive(Deserialize, Serialize, Default, Debug, Clone, PartialEq)]
pub struct Channel {
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    #[serde(default)]
    pub content_defaults: ContentDefaults,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,

    #[serde(default)]
    pub thumbnail_encoding: BTreeMap<String, Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub demo_server_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,

    #[serde(default)]
    pub deleted: bool,

    #[serde(default)]
    pub public: bool,

    #[serde(default)]
    pub bookmark: bool,

    #[serde(default)]
    pub editors: BTreeSet<String>,

    #[serde(default)]
    pub viewers: BTreeSet<String>,

    #[serde(default, skip_serializing)]
    pub edit: bool,

    #[serde(default, skip_serializing)]
    pub new: bool,
}

/// Sparse channel update payload.
///
/// Only fields that are `Some` are serialized, so a field the caller
/// never supplied cannot overwrite the stored value.
#[derive(Deserialize, Serialize, Default, Debug, Clone, PartialEq)]
pub struct ChannelData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_defaults: Option<ContentDefaults>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_encoding: Option<BTreeMap<String, Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub demo_server_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bookmark: Option<bool>,
}

/// Thumbnail fields updated as a unit.
#[derive(Deserialize, Serialize, Default, Debug, Clone, PartialEq)]
pub struct ThumbnailData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_encoding: Option<BTreeMap<String, Value>>,
}

/// Caller-facing channel patch.
///
/// `None` means the field was not supplied, `Some` means it was
/// explicitly set, empty or not.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct ChannelPatch {
    pub id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub thumbnail_data: Option<ThumbnailData>,
    pub language: Option<String>,
    pub content_defaults: Option<ContentDefaults>,
    pub demo_server_url: Option<String>,
    pub source_url: Option<String>,
    pub deleted: Option<bool>,
    pub public: Option<bool>,
}

/// A pending offer to share a channel with a user.
///
/// Declining is the soft-delete path, invitations are never removed
/// server side.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Invitation {
    pub id: String,

    pub channel: String,

    pub user_email: String,

    pub share_mode: ShareMode,

    #[serde(default)]
    pub declined: bool,
}

/// A user associated with a channel and their role on it.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ChannelUser {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    pub share_mode: ShareMode,
}

/// Current-user session info.
#[derive(Deserialize, Serialize, Default, Debug, Clone, PartialEq)]
pub struct Session {
    #[serde(default)]
    pub logged_in: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_user_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_language: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferences: Option<ContentDefaults>,
}

impl Session {
    /// Language preference, falling back to the session locale.
    pub fn default_language(&self) -> Option<String> {
        self.preferences
            .as_ref()
            .and_then(|prefs| prefs.get("language"))
            .and_then(Value::as_str)
            .map(str::to_owned)
            .or_else(|| self.current_language.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    #[test]
    fn sparse_update_omits_unsupplied_fields() {
        let data = ChannelData {
            id: Some("c1".to_owned()),
            name: Some("New Name".to_owned()),
            ..Default::default()
        };

        let value = serde_json::to_value(&data).unwrap();

        assert_eq!(value, json!({ "id": "c1", "name": "New Name" }));
    }

    #[test]
    fn explicit_falsy_fields_are_kept() {
        let data = ChannelData {
            id: Some("c1".to_owned()),
            name: Some(String::new()),
            deleted: Some(false),
            ..Default::default()
        };

        let value = serde_json::to_value(&data).unwrap();

        assert_eq!(value, json!({ "id": "c1", "name": "", "deleted": false }));
    }

    #[test]
    fn client_flags_never_serialize() {
        let channel = Channel {
            id: "c1".to_owned(),
            edit: true,
            new: true,
            ..Default::default()
        };

        let value = serde_json::to_value(&channel).unwrap();

        assert!(value.get("edit").is_none());
        assert!(value.get("new").is_none());
    }

    #[test]
    fn share_mode_wire_form() {
        assert_eq!(serde_json::to_value(ShareMode::Edit).unwrap(), json!("edit"));
        assert_eq!(ShareMode::View.to_string(), "view");
    }

    #[test]
    fn session_language_fallback() {
        let session = Session {
            current_language: Some("fr".to_owned()),
            ..Default::default()
        };

        assert_eq!(session.default_language(), Some("fr".to_owned()));

        let session = Session {
            current_language: Some("fr".to_owned()),
            preferences: Some(BTreeMap::from([(
                "language".to_owned(),
                json!("es"),
            )])),
            ..Default::default()
        };

        assert_eq!(session.default_language(), Some("es".to_owned()));
    }
}
