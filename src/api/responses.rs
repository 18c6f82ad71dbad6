use serde::Deserialize;

use crate::models::Channel;

/// One page of catalog search results.
#[derive(Deserialize, Default, Debug, Clone)]
pub struct CatalogPage {
    #[serde(default)]
    pub count: u64,

    #[serde(default)]
    pub total_pages: u64,

    #[serde(default)]
    pub page: u64,

    pub results: Vec<Channel>,
}
