// Adapters layer: concrete implementations of the domain ports.

pub mod docker_hub;
pub mod http;
pub mod id;
pub mod memory;
pub mod sparql;

pub use docker_hub::DockerHubTagProvider;
pub use http::HttpSnippetSource;
pub use id::{SequentialIdGenerator, UuidGenerator};
pub use memory::MemoryStore;
pub use sparql::{HttpGraphStoreClient, SparqlStore};
