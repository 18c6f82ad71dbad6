pub mod api;
pub mod channel;
pub mod errors;
pub mod models;
pub mod store;

pub use api::{ApiClient, ApiService};
pub use channel::{CatalogQuery, ChannelActions, ChannelListQuery, ChannelListType};
pub use errors::Error;
pub use store::{memory::MemoryStore, Mutation, StateStore};
