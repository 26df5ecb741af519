//! Taste and match scoring.
//!
//! Pure functions over vibe vectors: single-tag taste scores, cosine match
//! scores, buyer vectors from swipe history and listing vectors from text.

pub mod buyer;
pub mod listing;
pub mod taste;
pub mod vector;

use serde::Serialize;

use crate::vibes::Vibe;

pub use buyer::{compute_buyer_vibe_vector, SwipeAction, SwipeEvent};
pub use listing::compute_listing_vibe_vector;
pub use taste::{
    compute_match_score, compute_taste_score, compute_vector_match_score, rank_lead_candidates,
    LeadCandidate, TagCounts,
};
pub use vector::VibeVector;

/// A vibe vector with its strongest vibes (at most three) and a short
/// human-readable reason for each.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VibeProfile {
    pub vector: VibeVector,
    pub top_vibes: Vec<Vibe>,
    pub rationale: Vec<String>,
}
