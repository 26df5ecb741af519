//! Vibe taxonomy: the fixed, closed set of interior-design archetypes.
//!
//! Every other component (scoring, prompt building, quality gating) reads
//! from this table. It is never mutated at runtime.

mod catalog;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Label used by upstream taggers for listings that matched no vibe.
pub const UNCLASSIFIED: &str = "Unclassified";

/// Vibe substituted by the prompt builder when handed an unknown id.
pub const DEFAULT_VIBE: Vibe = Vibe::Classicist;

/// A referenced vibe name that is not part of the taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown vibe: {0}")]
pub struct UnknownVibe(pub String);

/// One of the eight named style archetypes.
///
/// Variants are declared in lexical order so the derived `Ord` doubles as
/// the alphabetical tie-break used when ranking vibes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Vibe {
    Bohemian,
    Classicist,
    Coastal,
    Industrialist,
    Maximalist,
    Minimalist,
    Modernist,
    Naturalist,
}

impl Vibe {
    pub const COUNT: usize = 8;

    pub const ALL: [Vibe; Vibe::COUNT] = [
        Vibe::Bohemian,
        Vibe::Classicist,
        Vibe::Coastal,
        Vibe::Industrialist,
        Vibe::Maximalist,
        Vibe::Minimalist,
        Vibe::Modernist,
        Vibe::Naturalist,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Vibe::Bohemian => "Bohemian",
            Vibe::Classicist => "Classicist",
            Vibe::Coastal => "Coastal",
            Vibe::Industrialist => "Industrialist",
            Vibe::Maximalist => "Maximalist",
            Vibe::Minimalist => "Minimalist",
            Vibe::Modernist => "Modernist",
            Vibe::Naturalist => "Naturalist",
        }
    }

    /// Resolve a vibe by name. Matching ignores case and surrounding whitespace.
    pub fn from_name(name: &str) -> Result<Self, UnknownVibe> {
        let wanted = name.trim();
        Vibe::ALL
            .iter()
            .copied()
            .find(|v| v.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownVibe(name.to_string()))
    }

    /// Position of this vibe in [`Vibe::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn definition(self) -> &'static VibeDefinition {
        &catalog::CATALOG[self.index()]
    }
}

impl fmt::Display for Vibe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Vibe {
    type Err = UnknownVibe;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Vibe::from_name(s)
    }
}

/// Static metadata describing one vibe.
#[derive(Debug)]
pub struct VibeDefinition {
    pub vibe: Vibe,
    /// Short phrase used in prompts, e.g. "calm, uncluttered and intentional".
    pub tagline: &'static str,
    /// Listing vocabulary used for text matching only (may be architectural).
    pub keywords: &'static [&'static str],
    /// Decor-level cues; used for matching and in staging prompts.
    pub visual_cues: &'static [&'static str],
    pub psychology: &'static [&'static str],
    pub design_principles: &'static [&'static str],
    pub furniture: &'static [&'static str],
    pub staging_do: &'static [&'static str],
    pub staging_dont: &'static [&'static str],
    /// Architectural edits this style tempts a generator into; always negated.
    pub forbidden_changes: &'static [&'static str],
}

impl VibeDefinition {
    pub fn name(&self) -> &'static str {
        self.vibe.as_str()
    }

    /// Keywords followed by visual cues, without duplicates.
    pub fn match_terms(&self) -> Vec<&'static str> {
        let mut terms: Vec<&'static str> = Vec::with_capacity(self.keywords.len() + self.visual_cues.len());
        for term in self.keywords.iter().chain(self.visual_cues.iter()) {
            if !terms.contains(term) {
                terms.push(term);
            }
        }
        terms
    }
}

/// Look up a definition by vibe name.
pub fn lookup(name: &str) -> Result<&'static VibeDefinition, UnknownVibe> {
    Vibe::from_name(name).map(Vibe::definition)
}

/// The full catalog, ordered as [`Vibe::ALL`].
pub fn catalog() -> &'static [VibeDefinition] {
    &catalog::CATALOG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_matches_enum_order() {
        assert_eq!(catalog().len(), Vibe::COUNT);
        for (i, def) in catalog().iter().enumerate() {
            assert_eq!(def.vibe, Vibe::ALL[i]);
            assert_eq!(def.vibe.index(), i);
        }
    }

    #[test]
    fn test_from_name_is_case_insensitive() {
        assert_eq!(Vibe::from_name("minimalist").unwrap(), Vibe::Minimalist);
        assert_eq!(Vibe::from_name("  COASTAL ").unwrap(), Vibe::Coastal);
        assert_eq!(
            Vibe::from_name("Brutalist"),
            Err(UnknownVibe("Brutalist".to_string()))
        );
        assert!(Vibe::from_name(UNCLASSIFIED).is_err());
    }

    #[test]
    fn test_variant_order_is_lexical() {
        let mut names: Vec<&str> = Vibe::ALL.iter().map(|v| v.as_str()).collect();
        let declared = names.clone();
        names.sort();
        assert_eq!(names, declared);
    }

    #[test]
    fn test_definitions_are_populated_and_lowercase() {
        for def in catalog() {
            assert!(!def.forbidden_changes.is_empty(), "{} has no forbidden changes", def.name());
            assert!(!def.design_principles.is_empty());
            assert!(!def.furniture.is_empty());
            for term in def.match_terms() {
                assert_eq!(term, term.to_lowercase(), "{} term not lowercase", def.name());
            }
        }
    }

    #[test]
    fn test_lookup_resolves_definitions() {
        let def = lookup("industrialist").unwrap();
        assert_eq!(def.vibe, Vibe::Industrialist);
        assert_eq!(def.name(), "Industrialist");
        assert!(std::ptr::eq(def, Vibe::Industrialist.definition()));
        assert_eq!(lookup("Brutalist").unwrap_err(), UnknownVibe("Brutalist".to_string()));
        assert!(lookup(UNCLASSIFIED).is_err());
    }

    #[test]
    fn test_match_terms_dedupes() {
        let terms = Vibe::Minimalist.definition().match_terms();
        let clean_lines = terms.iter().filter(|t| **t == "clean lines").count();
        assert_eq!(clean_lines, 1);
    }
}
