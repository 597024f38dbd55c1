//! # Persistence
//!
//! Repository ports and their in-memory implementations.
//!
//! Real database backends are external collaborators; the engine only
//! depends on the trait surface defined in [`traits`].

pub mod in_memory;
pub mod traits;

pub use traits::{
    FeeRuleRepository, QuotationRepository, RateTableRepository, RepositoryError,
    RepositoryResult, SavedEstimateRepository,
};
