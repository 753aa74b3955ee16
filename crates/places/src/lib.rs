//! # Places Crate
//!
//! Domain model shared by every other crate in the workspace.
//!
//! ## Main Components
//!
//! - **types**: `Provider`, `UserQuery`, `BudgetBand`, the canonical `Place`, `ResultSet`
//! - **raw**: provider-native record shapes (`RawRecord` and one struct per provider)
//! - **geo**: the flat-earth distance approximation used for dedupe and scoring
//! - **error**: error types for building and validating domain values
//!
//! ## Example Usage
//!
//! ```ignore
//! use places::{BudgetBand, UserQuery};
//!
//! let query = UserQuery::new(40.7128, -74.0060, 800)
//!     .with_budget(BudgetBand::new(1, 3))
//!     .with_cuisines(["italian"])
//!     .with_dietary_restrictions(["vegetarian"]);
//! query.validate()?;
//! ```

// Public modules
pub mod error;
pub mod geo;
pub mod raw;
pub mod types;

// Re-export commonly used types for convenience
pub use error::{PlaceError, Result};
pub use geo::{planar_distance_m, METERS_PER_DEGREE};
pub use raw::{GoogleRecord, RawRecord, YelpRecord};
pub use types::{
    normalize_tag, BudgetBand, Place, Provider, ResultMetadata, ResultSet, UserQuery,
    MAX_PRICE_LEVEL, MERGED_RAW_KEY,
};
