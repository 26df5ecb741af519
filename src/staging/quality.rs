//! Static checks on built prompts and on provider output metadata.
//!
//! An empty flag list means the check passed. Any flag marks the job
//! `flagged` rather than `failed`, leaving the decision to a reviewer.

use super::prompt::HARD_CONSTRAINT_BLOCK;
use crate::generation::OutputMetadata;

pub const FLAG_MISSING_HARD_CONSTRAINT_BLOCK: &str = "missing_hard_constraint_block";
pub const FLAG_NEGATIVE_PROMPT_NOT_STRICT: &str = "negative_prompt_not_strict";
pub const FLAG_PROVIDER_SAFETY_BLOCKED: &str = "provider_safety_blocked";
pub const FLAG_GEOMETRY_CHANGE_SUSPECTED: &str = "geometry_change_suspected";

/// Concepts a positive prompt must state; each needs every listed token.
const REQUIRED_CONCEPTS: &[(&str, &[&str])] = &[
    ("camera_preservation", &["camera angle", "perspective"]),
    ("architecture_preservation", &["wall", "window", "door", "unchanged"]),
    ("no_renovation", &["no renovation", "no structural changes"]),
    ("allowed_additions_only", &["only add", "furniture", "decor"]),
];

/// Renovation instructions that must never appear in a positive prompt.
pub const RENOVATION_KEYWORDS: &[&str] = &[
    "knock down wall",
    "knock out wall",
    "remove wall",
    "tear down",
    "add skylight",
    "add window",
    "enlarge window",
    "move door",
    "raise ceiling",
    "lower ceiling",
    "open up the floor plan",
    "extend the room",
    "build an extension",
    "replace flooring",
    "new flooring",
    "repaint",
    "renovate",
    "remodel",
    "demolish",
];

/// Either phrase makes a negative prompt strict enough.
const STRICT_NEGATIVE_MARKERS: &[&str] = &["no architectural changes", "change layout"];

pub fn assess_prompt_for_banned_terms(prompt: &str, negative_prompt: &str) -> Vec<String> {
    let mut flags = Vec::new();

    if !prompt.contains(HARD_CONSTRAINT_BLOCK) {
        flags.push(FLAG_MISSING_HARD_CONSTRAINT_BLOCK.to_string());
    }

    let lower = prompt.to_lowercase();
    for (concept, tokens) in REQUIRED_CONCEPTS {
        if !tokens.iter().all(|t| lower.contains(t)) {
            flags.push(format!("missing_constraint:{}", concept));
        }
    }

    for keyword in RENOVATION_KEYWORDS {
        if lower.contains(keyword) {
            flags.push(format!("renovation_keyword_in_prompt:{}", keyword));
        }
    }

    let negative = negative_prompt.to_lowercase();
    if !STRICT_NEGATIVE_MARKERS.iter().any(|m| negative.contains(m)) {
        flags.push(FLAG_NEGATIVE_PROMPT_NOT_STRICT.to_string());
    }

    flags
}

/// Flags from whatever the provider reported. No metadata, no flags.
pub fn assess_output_metadata_if_available(metadata: Option<&OutputMetadata>) -> Vec<String> {
    let Some(meta) = metadata else {
        return Vec::new();
    };
    let mut flags = Vec::new();
    if meta.safety_blocked {
        flags.push(FLAG_PROVIDER_SAFETY_BLOCKED.to_string());
    }
    if meta.geometry_changed {
        flags.push(FLAG_GEOMETRY_CHANGE_SUSPECTED.to_string());
    }
    flags
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::staging::prompt::{build_staging_prompt, RoomType, Strictness};
    use crate::vibes::Vibe;

    #[test]
    fn test_built_prompts_pass_for_every_vibe() {
        for vibe in Vibe::ALL {
            for room in RoomType::ALL {
                for strictness in [Strictness::Normal, Strictness::Strict] {
                    let built = build_staging_prompt(vibe.as_str(), room, None, strictness);
                    let flags = assess_prompt_for_banned_terms(&built.prompt, &built.negative_prompt);
                    assert!(flags.is_empty(), "{} {} {:?}: {:?}", vibe, room, strictness, flags);
                }
            }
        }
    }

    #[test]
    fn test_missing_block_is_flagged() {
        let flags = assess_prompt_for_banned_terms("Stage this room in a Coastal style.", "change layout");
        assert!(flags.contains(&FLAG_MISSING_HARD_CONSTRAINT_BLOCK.to_string()));
        assert!(flags.contains(&"missing_constraint:camera_preservation".to_string()));
        assert!(flags.contains(&"missing_constraint:no_renovation".to_string()));
        assert!(!flags.contains(&FLAG_NEGATIVE_PROMPT_NOT_STRICT.to_string()));
    }

    #[test]
    fn test_renovation_keyword_in_notes_is_flagged() {
        let built = build_staging_prompt(
            "Modernist",
            RoomType::LivingRoom,
            Some("Knock down wall between kitchen and lounge"),
            Strictness::Normal,
        );
        let flags = assess_prompt_for_banned_terms(&built.prompt, &built.negative_prompt);
        assert_eq!(flags, vec!["renovation_keyword_in_prompt:knock down wall".to_string()]);
    }

    #[test]
    fn test_weak_negative_prompt_is_flagged() {
        let built = build_staging_prompt("Bohemian", RoomType::Bedroom, None, Strictness::Normal);
        let flags = assess_prompt_for_banned_terms(&built.prompt, "blurry, low quality");
        assert_eq!(flags, vec![FLAG_NEGATIVE_PROMPT_NOT_STRICT.to_string()]);

        let flags = assess_prompt_for_banned_terms(&built.prompt, "NO ARCHITECTURAL CHANGES");
        assert!(flags.is_empty());
    }

    #[test]
    fn test_output_metadata_flags() {
        assert!(assess_output_metadata_if_available(None).is_empty());
        assert!(assess_output_metadata_if_available(Some(&OutputMetadata::default())).is_empty());

        let both = OutputMetadata {
            safety_blocked: true,
            geometry_changed: true,
        };
        assert_eq!(
            assess_output_metadata_if_available(Some(&both)),
            vec![
                FLAG_PROVIDER_SAFETY_BLOCKED.to_string(),
                FLAG_GEOMETRY_CHANGE_SUSPECTED.to_string()
            ]
        );
    }
}
