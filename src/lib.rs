//! Vibe matching and virtual staging.
//!
//! - [`vibes`]: the fixed taxonomy of eight interior-design archetypes.
//! - [`scoring`]: buyer and listing vibe vectors and the match scores that
//!   gate lead creation.
//! - [`staging`]: prompt building, quality gating and the rate-limited job
//!   queue that drives an external image generator.
//! - [`gateway`]: serialized, spaced, quota-aware access to external AI APIs.

pub mod config;
pub mod db;
pub mod gateway;
pub mod generation;
pub mod imaging;
pub mod llm;
pub mod logging;
pub mod scoring;
pub mod staging;
pub mod vibes;

pub use config::Config;
pub use scoring::{
    compute_buyer_vibe_vector, compute_listing_vibe_vector, compute_match_score, compute_taste_score,
    compute_vector_match_score, rank_lead_candidates, VibeProfile, VibeVector,
};
pub use staging::{StagingQueue, StagingService};
pub use vibes::{UnknownVibe, Vibe};
