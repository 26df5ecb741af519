//! Percentage scores used to gate lead creation.
//!
//! Every function here is total: absent, empty or degenerate input yields
//! a score of 0 rather than an error.

use serde::Serialize;
use std::collections::HashMap;

use super::vector::VibeVector;
use crate::vibes::{Vibe, UNCLASSIFIED};

/// Historical per-vibe tag counts for a buyer, keyed by vibe name.
pub type TagCounts = HashMap<String, u32>;

fn clamp_percent(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, 100.0) as u8
}

/// Share of `vibe` in the buyer's tag history, as a rounded percentage.
pub fn compute_taste_score(profile: Option<&TagCounts>, vibe: Option<&str>) -> u8 {
    let (Some(profile), Some(vibe)) = (profile, vibe) else {
        return 0;
    };
    if vibe.trim().is_empty() || vibe.trim().eq_ignore_ascii_case(UNCLASSIFIED) {
        return 0;
    }
    let Ok(vibe) = Vibe::from_name(vibe) else {
        return 0;
    };

    let total: u64 = profile.values().map(|c| u64::from(*c)).sum();
    if total == 0 {
        return 0;
    }
    let count: u64 = profile
        .iter()
        .filter(|(name, _)| Vibe::from_name(name).ok() == Some(vibe))
        .map(|(_, c)| u64::from(*c))
        .sum();

    clamp_percent(count as f64 / total as f64 * 100.0)
}

/// Taste score plus an optional recency boost, clamped to 0..=100.
pub fn compute_match_score(taste_score: u8, recency_boost: i32) -> u8 {
    (i64::from(taste_score) + i64::from(recency_boost)).clamp(0, 100) as u8
}

/// Cosine similarity between two vibe vectors, scaled to 0..=100.
pub fn compute_vector_match_score(buyer: Option<&VibeVector>, listing: Option<&VibeVector>) -> u8 {
    let (Some(buyer), Some(listing)) = (buyer, listing) else {
        return 0;
    };
    let (norm_b, norm_l) = (buyer.magnitude(), listing.magnitude());
    if norm_b == 0.0 || norm_l == 0.0 {
        return 0;
    }
    clamp_percent(buyer.dot(listing) / (norm_b * norm_l) * 100.0)
}

/// A listing whose vibe vector matched a buyer well enough to become a lead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadCandidate {
    pub listing_id: String,
    pub match_score: u8,
}

/// Score every listing against the buyer, keep those at or above
/// `threshold`, best first. Equal scores are ordered by listing id.
pub fn rank_lead_candidates<'a, I>(
    buyer: &VibeVector,
    listings: I,
    threshold: u8,
    limit: usize,
) -> Vec<LeadCandidate>
where
    I: IntoIterator<Item = (&'a str, &'a VibeVector)>,
{
    let mut candidates: Vec<LeadCandidate> = listings
        .into_iter()
        .map(|(listing_id, vector)| LeadCandidate {
            listing_id: listing_id.to_string(),
            match_score: compute_vector_match_score(Some(buyer), Some(vector)),
        })
        .filter(|c| c.match_score >= threshold)
        .collect();

    candidates.sort_by(|a, b| {
        b.match_score
            .cmp(&a.match_score)
            .then_with(|| a.listing_id.cmp(&b.listing_id))
    });
    candidates.truncate(limit);
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(vibe: Vibe) -> VibeVector {
        let mut raw = [0.0; Vibe::COUNT];
        raw[vibe.index()] = 1.0;
        VibeVector::normalized(raw)
    }

    #[test]
    fn test_taste_score_full_and_absent_profiles() {
        for vibe in Vibe::ALL {
            let profile: TagCounts = [(vibe.as_str().to_string(), 5)].into_iter().collect();
            assert_eq!(compute_taste_score(Some(&profile), Some(vibe.as_str())), 100);
            assert_eq!(compute_taste_score(None, Some(vibe.as_str())), 0);
        }
    }

    #[test]
    fn test_taste_score_ratio_is_rounded() {
        let profile: TagCounts = [
            ("Coastal".to_string(), 2),
            ("Minimalist".to_string(), 1),
        ]
        .into_iter()
        .collect();
        assert_eq!(compute_taste_score(Some(&profile), Some("Coastal")), 67);
        assert_eq!(compute_taste_score(Some(&profile), Some("Minimalist")), 33);
        assert_eq!(compute_taste_score(Some(&profile), Some("Bohemian")), 0);
    }

    #[test]
    fn test_taste_score_degenerate_inputs() {
        let profile: TagCounts = [("Coastal".to_string(), 3)].into_iter().collect();
        let empty = TagCounts::new();
        assert_eq!(compute_taste_score(Some(&empty), Some("Coastal")), 0);
        assert_eq!(compute_taste_score(Some(&profile), None), 0);
        assert_eq!(compute_taste_score(Some(&profile), Some(UNCLASSIFIED)), 0);
        assert_eq!(compute_taste_score(Some(&profile), Some("Brutalist")), 0);
        assert_eq!(compute_taste_score(Some(&profile), Some("")), 0);

        let zeros: TagCounts = [("Coastal".to_string(), 0)].into_iter().collect();
        assert_eq!(compute_taste_score(Some(&zeros), Some("Coastal")), 0);
    }

    #[test]
    fn test_match_score_clamps() {
        assert_eq!(compute_match_score(80, 0), 80);
        assert_eq!(compute_match_score(95, 10), 100);
        assert_eq!(compute_match_score(5, -10), 0);
    }

    #[test]
    fn test_vector_match_self_similarity() {
        let mut raw = [0.0; Vibe::COUNT];
        raw[Vibe::Coastal.index()] = 3.0;
        raw[Vibe::Naturalist.index()] = 1.0;
        let v = VibeVector::normalized(raw);
        assert_eq!(compute_vector_match_score(Some(&v), Some(&v)), 100);
    }

    #[test]
    fn test_vector_match_zero_and_absent() {
        let v = single(Vibe::Coastal);
        let zero = VibeVector::zero();
        assert_eq!(compute_vector_match_score(Some(&v), Some(&zero)), 0);
        assert_eq!(compute_vector_match_score(Some(&zero), Some(&v)), 0);
        assert_eq!(compute_vector_match_score(None, Some(&v)), 0);
        assert_eq!(compute_vector_match_score(Some(&v), None), 0);
    }

    #[test]
    fn test_vector_match_orthogonal() {
        let a = single(Vibe::Coastal);
        let b = single(Vibe::Industrialist);
        assert_eq!(compute_vector_match_score(Some(&a), Some(&b)), 0);
    }

    #[test]
    fn test_rank_lead_candidates() {
        let buyer = single(Vibe::Coastal);
        let coastal = single(Vibe::Coastal);
        let industrial = single(Vibe::Industrialist);
        let mut raw = [0.0; Vibe::COUNT];
        raw[Vibe::Coastal.index()] = 1.0;
        raw[Vibe::Naturalist.index()] = 1.0;
        let mixed = VibeVector::normalized(raw);

        let listings = vec![
            ("listing-b", &coastal),
            ("listing-c", &industrial),
            ("listing-a", &coastal),
            ("listing-d", &mixed),
        ];
        let leads = rank_lead_candidates(&buyer, listings.iter().map(|(id, v)| (*id, *v)), 70, 10);

        let ids: Vec<&str> = leads.iter().map(|l| l.listing_id.as_str()).collect();
        assert_eq!(ids, vec!["listing-a", "listing-b", "listing-d"]);
        assert_eq!(leads[0].match_score, 100);
        assert_eq!(leads[2].match_score, 71);

        let top_one = rank_lead_candidates(&buyer, listings.iter().map(|(id, v)| (*id, *v)), 0, 1);
        assert_eq!(top_one.len(), 1);
    }
}
