//! Staging prompt composition.
//!
//! Every prompt opens with [`HARD_CONSTRAINT_BLOCK`] verbatim; the quality
//! gate checks for it by exact match.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::vibes::{self, Vibe, DEFAULT_VIBE};

pub const HARD_CONSTRAINT_BLOCK: &str = "HARD CONSTRAINTS: Preserve the original room exactly. \
Keep the same camera angle, lens and perspective. \
Keep every wall, window, door, ceiling, floor and built-in architectural feature unchanged. \
No renovation and no structural changes. \
Only add movable furniture, rugs, lighting, art, plants and decor.";

const ALLOWED_ADDITIONS: &str = "Allowed additions: freestanding furniture, area rugs, lamps, \
framed art on easels or existing hooks, plants, textiles and small accessories. \
Existing finishes, fixtures and openings stay exactly as photographed.";

const COMPOSITION: &str = "Composition: photorealistic interior photograph, lighting consistent \
with the original photo, realistic scale and contact shadows, every piece resting on the existing \
floor, no people, no text, no watermark.";

/// Renovation and construction vocabulary negated in every job.
pub const BASE_NEGATIVE_TERMS: &[&str] = &[
    "structural changes",
    "renovation",
    "construction",
    "demolition",
    "knocked down walls",
    "moved walls",
    "new windows",
    "removed windows",
    "enlarged windows",
    "moved doors",
    "new doors",
    "changed ceiling height",
    "new flooring",
    "changed wall color",
    "change layout",
    "changed camera angle",
    "changed perspective",
    "warped lines",
    "distorted geometry",
    "people",
    "text",
    "watermark",
];

pub const STRICT_SUFFIX: &str = "NO ARCHITECTURAL CHANGES, NO PERSPECTIVE CHANGES, NO LAYOUT CHANGES";

/// Appended to the negative prompt when a job is retried.
pub const ESCALATION_CLAUSE: &str = "ABSOLUTELY NO ARCHITECTURAL CHANGES";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strictness {
    #[default]
    Normal,
    Strict,
}

impl Strictness {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strictness::Normal => "normal",
            Strictness::Strict => "strict",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "normal" => Some(Strictness::Normal),
            "strict" => Some(Strictness::Strict),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid room type: {0}")]
pub struct InvalidRoomType(pub String);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomType {
    #[default]
    LivingRoom,
    Bedroom,
    DiningRoom,
    Kitchen,
    HomeOffice,
    Bathroom,
    Nursery,
    Entryway,
}

impl RoomType {
    pub const ALL: [RoomType; 8] = [
        RoomType::LivingRoom,
        RoomType::Bedroom,
        RoomType::DiningRoom,
        RoomType::Kitchen,
        RoomType::HomeOffice,
        RoomType::Bathroom,
        RoomType::Nursery,
        RoomType::Entryway,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RoomType::LivingRoom => "living_room",
            RoomType::Bedroom => "bedroom",
            RoomType::DiningRoom => "dining_room",
            RoomType::Kitchen => "kitchen",
            RoomType::HomeOffice => "home_office",
            RoomType::Bathroom => "bathroom",
            RoomType::Nursery => "nursery",
            RoomType::Entryway => "entryway",
        }
    }

    /// Human-readable name used inside prompts.
    pub fn label(&self) -> &'static str {
        match self {
            RoomType::LivingRoom => "living room",
            RoomType::Bedroom => "bedroom",
            RoomType::DiningRoom => "dining room",
            RoomType::Kitchen => "kitchen",
            RoomType::HomeOffice => "home office",
            RoomType::Bathroom => "bathroom",
            RoomType::Nursery => "nursery",
            RoomType::Entryway => "entryway",
        }
    }

    /// Accepts `living_room`, `Living Room`, `living-room` and `office`.
    pub fn parse(s: &str) -> Result<Self, InvalidRoomType> {
        let normalized: String = s
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| if c == ' ' || c == '-' { '_' } else { c })
            .collect();
        if normalized == "office" {
            return Ok(RoomType::HomeOffice);
        }
        RoomType::ALL
            .iter()
            .copied()
            .find(|r| r.as_str() == normalized)
            .ok_or_else(|| InvalidRoomType(s.to_string()))
    }
}

impl std::fmt::Display for RoomType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagingPrompt {
    /// The vibe actually used, after any fallback.
    pub vibe: Vibe,
    pub prompt: String,
    pub negative_prompt: String,
}

/// Compose the positive and negative prompt for one job.
///
/// An unknown `vibe_id` falls back to [`DEFAULT_VIBE`] so a stray id
/// degrades a single job instead of breaking the caller.
pub fn build_staging_prompt(
    vibe_id: &str,
    room_type: RoomType,
    room_notes: Option<&str>,
    strictness: Strictness,
) -> StagingPrompt {
    let def = vibes::lookup(vibe_id).unwrap_or_else(|_| {
        tracing::warn!(vibe_id, fallback = %DEFAULT_VIBE, "Unknown vibe, using fallback");
        DEFAULT_VIBE.definition()
    });

    let mut sections = vec![
        HARD_CONSTRAINT_BLOCK.to_string(),
        format!("Room: {}.", room_type.label()),
    ];
    if let Some(notes) = room_notes.map(str::trim).filter(|n| !n.is_empty()) {
        sections.push(format!("Room notes: {}.", notes));
    }
    sections.push(format!(
        "Style: virtually stage this {} in the {} style, {}.",
        room_type.label(),
        def.name(),
        def.tagline
    ));
    sections.push(format!("Design principles: {}.", def.design_principles.join("; ")));
    sections.push(format!("Furniture: {}.", def.furniture.join(", ")));
    sections.push(format!("Visual cues: {}.", def.visual_cues.join(", ")));
    sections.push(format!("Staging guidance: {}.", def.staging_do.join("; ")));
    sections.push(ALLOWED_ADDITIONS.to_string());
    sections.push(COMPOSITION.to_string());

    let mut negative: Vec<&str> = BASE_NEGATIVE_TERMS.to_vec();
    negative.extend(def.forbidden_changes.iter().copied());
    let mut negative_prompt = negative.join(", ");
    if strictness == Strictness::Strict {
        negative_prompt.push_str(", ");
        negative_prompt.push_str(STRICT_SUFFIX);
    }

    StagingPrompt {
        vibe: def.vibe,
        prompt: sections.join("\n"),
        negative_prompt,
    }
}

/// Negative prompt for a retry. Idempotent.
pub fn escalate_negative_prompt(negative_prompt: &str) -> String {
    if negative_prompt.contains(ESCALATION_CLAUSE) {
        negative_prompt.to_string()
    } else if negative_prompt.trim().is_empty() {
        ESCALATION_CLAUSE.to_string()
    } else {
        format!("{}, {}", negative_prompt, ESCALATION_CLAUSE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_vibe_carries_constraints_and_forbidden_terms() {
        for vibe in Vibe::ALL {
            for strictness in [Strictness::Normal, Strictness::Strict] {
                let built = build_staging_prompt(vibe.as_str(), RoomType::LivingRoom, None, strictness);
                assert_eq!(built.vibe, vibe);
                assert!(built.prompt.contains(HARD_CONSTRAINT_BLOCK));
                for term in vibe.definition().forbidden_changes {
                    assert!(built.negative_prompt.contains(term), "{} missing {}", vibe, term);
                }
                for term in BASE_NEGATIVE_TERMS {
                    assert!(built.negative_prompt.contains(term));
                }
                assert_eq!(
                    built.negative_prompt.contains(STRICT_SUFFIX),
                    strictness == Strictness::Strict
                );
            }
        }
    }

    #[test]
    fn test_unknown_vibe_falls_back_to_classicist() {
        let built = build_staging_prompt("Brutalist", RoomType::Bedroom, None, Strictness::Normal);
        assert_eq!(built.vibe, Vibe::Classicist);
        assert!(built.prompt.contains("Classicist"));
        assert!(built.negative_prompt.contains("new wainscoting"));
    }

    #[test]
    fn test_room_context_in_prompt() {
        let built = build_staging_prompt(
            "coastal",
            RoomType::DiningRoom,
            Some("  bay window facing the garden  "),
            Strictness::Normal,
        );
        assert!(built.prompt.contains("Room: dining room."));
        assert!(built.prompt.contains("Room notes: bay window facing the garden."));
        assert!(built.prompt.contains("Coastal style"));

        let no_notes = build_staging_prompt("coastal", RoomType::DiningRoom, Some("   "), Strictness::Normal);
        assert!(!no_notes.prompt.contains("Room notes"));
    }

    #[test]
    fn test_building_is_deterministic() {
        let a = build_staging_prompt("Maximalist", RoomType::Kitchen, Some("galley"), Strictness::Strict);
        let b = build_staging_prompt("Maximalist", RoomType::Kitchen, Some("galley"), Strictness::Strict);
        assert_eq!(a, b);
    }

    #[test]
    fn test_escalation_appends_once() {
        let once = escalate_negative_prompt("renovation, people");
        assert_eq!(once, "renovation, people, ABSOLUTELY NO ARCHITECTURAL CHANGES");
        assert_eq!(escalate_negative_prompt(&once), once);
        assert_eq!(escalate_negative_prompt(""), ESCALATION_CLAUSE);
    }

    #[test]
    fn test_room_type_parsing() {
        assert_eq!(RoomType::parse("living_room"), Ok(RoomType::LivingRoom));
        assert_eq!(RoomType::parse("Living Room"), Ok(RoomType::LivingRoom));
        assert_eq!(RoomType::parse("home-office"), Ok(RoomType::HomeOffice));
        assert_eq!(RoomType::parse("office"), Ok(RoomType::HomeOffice));
        assert_eq!(
            RoomType::parse("garage"),
            Err(InvalidRoomType("garage".to_string()))
        );
    }
}
