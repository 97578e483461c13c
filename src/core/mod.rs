pub mod engine;
pub mod resolver;
pub mod settings;
pub mod tags;
pub mod writer;

pub use crate::domain::model::{RunResult, Service, VersionRecord, VersionTag};
pub use crate::domain::ports::{GraphStoreClient, IdGenerator, RevisionStore, TagListing, TagProvider};
pub use crate::utils::error::Result;
