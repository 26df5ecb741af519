//! Listing vibe vector inferred from listing text and photo tags.

use std::collections::BTreeMap;

use super::vector::VibeVector;
use super::VibeProfile;
use crate::vibes::Vibe;

/// Score given to a vibe with no matching terms, so that an unmatched
/// listing still carries a uniform prior instead of the zero vector.
pub const SCORE_FLOOR: f64 = 0.01;

/// Infer a listing's vibe vector by counting, per vibe, how many of its
/// keywords and visual cues occur as substrings of the lowercased listing
/// text (description, photo tags and structured field values).
pub fn compute_listing_vibe_vector(
    description: &str,
    photos_text: &[String],
    structured_fields: &BTreeMap<String, String>,
) -> VibeProfile {
    let mut corpus = String::with_capacity(description.len() + 256);
    corpus.push_str(description);
    for text in photos_text {
        corpus.push(' ');
        corpus.push_str(text);
    }
    for (field, value) in structured_fields {
        corpus.push(' ');
        corpus.push_str(field);
        corpus.push(' ');
        corpus.push_str(value);
    }
    let corpus = corpus.to_lowercase();

    let mut raw = [0.0; Vibe::COUNT];
    let mut matched: Vec<Vec<&'static str>> = vec![Vec::new(); Vibe::COUNT];
    for vibe in Vibe::ALL {
        let hits: Vec<&'static str> = vibe
            .definition()
            .match_terms()
            .into_iter()
            .filter(|term| corpus.contains(term))
            .collect();
        raw[vibe.index()] = if hits.is_empty() {
            SCORE_FLOOR
        } else {
            hits.len() as f64
        };
        matched[vibe.index()] = hits;
    }

    let vector = VibeVector::normalized(raw);
    let top: Vec<Vibe> = vector
        .ranked()
        .into_iter()
        .map(|(vibe, _)| vibe)
        .filter(|vibe| !matched[vibe.index()].is_empty())
        .take(3)
        .collect();
    let rationale = top
        .iter()
        .map(|vibe| format!("{} matched: {}", vibe, matched[vibe.index()].join(", ")))
        .collect();

    VibeProfile {
        vector,
        top_vibes: top,
        rationale,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords_drive_the_vector() {
        let fields: BTreeMap<String, String> =
            [("style".to_string(), "Industrial loft".to_string())].into_iter().collect();
        let profile = compute_listing_vibe_vector(
            "Converted warehouse with EXPOSED BRICK and concrete floors.",
            &["black metal accents".to_string()],
            &fields,
        );

        assert!((profile.vector.sum() - 1.0).abs() < 1e-9);
        assert_eq!(profile.top_vibes.first(), Some(&Vibe::Industrialist));
        assert!(profile.rationale[0].starts_with("Industrialist matched: "));
        assert!(profile.rationale[0].contains("exposed brick"));
        assert!(profile.vector.weight(Vibe::Industrialist) > 0.9);
    }

    #[test]
    fn test_no_matches_gives_uniform_prior() {
        let profile = compute_listing_vibe_vector("three bed two bath", &[], &BTreeMap::new());
        for (_, w) in profile.vector.iter() {
            assert!((w - 1.0 / Vibe::COUNT as f64).abs() < 1e-9);
        }
        assert!(profile.top_vibes.is_empty());
        assert!(profile.rationale.is_empty());
        assert!(!profile.vector.is_zero());
    }

    #[test]
    fn test_unmatched_vibes_keep_the_floor() {
        let profile = compute_listing_vibe_vector("a calm, minimal home", &[], &BTreeMap::new());
        let total = 2.0 + SCORE_FLOOR * 7.0;
        assert!((profile.vector.weight(Vibe::Minimalist) - 2.0 / total).abs() < 1e-9);
        assert!((profile.vector.weight(Vibe::Coastal) - SCORE_FLOOR / total).abs() < 1e-9);
        assert_eq!(profile.top_vibes, vec![Vibe::Minimalist]);
    }

    #[test]
    fn test_is_deterministic() {
        let photos = vec!["rattan chair, hanging plants".to_string(), "linen sofa".to_string()];
        let fields: BTreeMap<String, String> =
            [("view".to_string(), "ocean view".to_string())].into_iter().collect();
        let a = compute_listing_vibe_vector("Sunny beach cottage", &photos, &fields);
        let b = compute_listing_vibe_vector("Sunny beach cottage", &photos, &fields);
        assert_eq!(a, b);
        for ((_, wa), (_, wb)) in a.vector.iter().zip(b.vector.iter()) {
            assert_eq!(wa.to_bits(), wb.to_bits());
        }
    }

    #[test]
    fn test_term_listed_as_keyword_and_cue_counts_once() {
        let profile = compute_listing_vibe_vector("hanging plants", &[], &BTreeMap::new());
        let total = 1.0 + SCORE_FLOOR * 7.0;
        assert!((profile.vector.weight(Vibe::Bohemian) - 1.0 / total).abs() < 1e-9);
        assert_eq!(profile.rationale, vec!["Bohemian matched: hanging plants".to_string()]);
    }
}
