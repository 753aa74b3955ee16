//! Search orchestration for the place-scout aggregator.
//!
//! This crate contains the orchestrator that runs fetch rounds and radius
//! expansion on top of the `pipeline` crate, the planners that turn free-text
//! requests into queries, and the summary view used for presentation.

pub mod orchestrator;
pub mod planner;
pub mod summary;

pub use orchestrator::{widen_radius, PlaceSearchOrchestrator};
pub use planner::{BudgetTier, KeywordPlanner, Planner, SearchPlan};
pub use summary::{summarize, PlaceSummary};
