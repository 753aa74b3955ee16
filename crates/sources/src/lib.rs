//! # Sources Crate
//!
//! Fetch collaborators: the code that obtains raw place records from each
//! listing provider.
//!
//! ## Components
//!
//! ### PlaceFetcher
//! The trait every provider integration implements. One fetcher per
//! [`Provider`](places::Provider); it returns records in the provider's own
//! shape and arrival order.
//!
//! ### FetcherRegistry
//! Caller-owned map from provider to fetcher, handed to the orchestrator.
//!
//! ### Implementations
//! - `JsonFileFetcher`: reads `<dir>/<provider>.json`, filtered by radius
//! - `SimulatedFetcher`: canned listings offset from the query center
//! - `StaticFetcher`: fixed records, records its call arguments
//!
//! ## Example Usage
//!
//! ```ignore
//! use places::{Provider, UserQuery};
//! use sources::{FetchArgs, FetcherRegistry, JsonFileFetcher};
//!
//! let registry = FetcherRegistry::new()
//!     .register(JsonFileFetcher::new(Provider::Google, "fixtures"))
//!     .register(JsonFileFetcher::new(Provider::Yelp, "fixtures"));
//!
//! let args = FetchArgs::from_query(&UserQuery::new(40.7128, -74.0060, 800));
//! let google = registry.get(Provider::Google).unwrap();
//! let records = google.fetch(&args).await?;
//! ```

// Public modules
pub mod error;
pub mod fetcher;
pub mod fixture;
pub mod memory;
pub mod registry;
pub mod simulated;

// Re-export commonly used types
pub use error::{FetchError, Result};
pub use fetcher::{FetchArgs, PlaceFetcher};
pub use fixture::JsonFileFetcher;
pub use memory::StaticFetcher;
pub use registry::FetcherRegistry;
pub use simulated::SimulatedFetcher;
