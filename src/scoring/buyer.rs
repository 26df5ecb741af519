//! Buyer taste vector aggregated from swipe history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::vector::VibeVector;
use super::VibeProfile;
use crate::vibes::Vibe;

/// What the buyer did with a listing card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwipeAction {
    Like,
    Nope,
    Save,
    Skip,
}

impl SwipeAction {
    /// Contribution of one action to its vibe's raw score.
    pub fn weight(self) -> f64 {
        match self {
            SwipeAction::Save => 4.0,
            SwipeAction::Like => 2.0,
            SwipeAction::Skip => 0.5,
            SwipeAction::Nope => -1.0,
        }
    }

    fn label(self, count: usize) -> String {
        let noun = match self {
            SwipeAction::Like => "like",
            SwipeAction::Nope => "nope",
            SwipeAction::Save => "save",
            SwipeAction::Skip => "skip",
        };
        if count == 1 {
            format!("1 {}", noun)
        } else {
            format!("{} {}s", count, noun)
        }
    }
}

/// One append-only swipe record. `vibe` is the swiped listing's vibe label,
/// which may be missing or unknown for untagged listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwipeEvent {
    pub buyer_id: String,
    pub listing_id: String,
    #[serde(default)]
    pub vibe: Option<String>,
    pub action: SwipeAction,
    #[serde(default)]
    pub dwell_ms: u64,
    pub timestamp: DateTime<Utc>,
}

const RATIONALE_ORDER: [SwipeAction; 4] = [
    SwipeAction::Save,
    SwipeAction::Like,
    SwipeAction::Skip,
    SwipeAction::Nope,
];

/// Aggregate swipe events into a normalized vibe vector.
///
/// Each event with a known vibe adds its action weight to that vibe. The
/// per-vibe totals are floored at zero before normalization, so a "nope"
/// can shrink a vibe's share but never push it below zero.
pub fn compute_buyer_vibe_vector(events: &[SwipeEvent]) -> VibeProfile {
    let mut raw = [0.0; Vibe::COUNT];
    let mut counts = [[0usize; 4]; Vibe::COUNT];

    for event in events {
        let Some(vibe) = event.vibe.as_deref().and_then(|name| Vibe::from_name(name).ok()) else {
            continue;
        };
        raw[vibe.index()] += event.action.weight();
        if let Some(slot) = RATIONALE_ORDER.iter().position(|a| *a == event.action) {
            counts[vibe.index()][slot] += 1;
        }
    }

    let vector = VibeVector::normalized(raw);
    let top: Vec<(Vibe, f64)> = vector.ranked().into_iter().take(3).collect();

    let rationale = top
        .iter()
        .map(|(vibe, _)| {
            let parts: Vec<String> = RATIONALE_ORDER
                .iter()
                .zip(counts[vibe.index()].iter())
                .filter(|(_, n)| **n > 0)
                .map(|(action, n)| action.label(*n))
                .collect();
            format!("{}: {}", vibe, parts.join(", "))
        })
        .collect();

    VibeProfile {
        vector,
        top_vibes: top.into_iter().map(|(vibe, _)| vibe).collect(),
        rationale,
    }
}
