//! Normalized weight distribution over the vibe taxonomy.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::vibes::Vibe;

/// Weights for every vibe, indexed by [`Vibe::index`].
///
/// The domain is fixed by construction: there is exactly one slot per
/// vibe. Vectors built through [`VibeVector::normalized`] sum to 1.0, or
/// are all zero when no signal exists.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, f64>", into = "BTreeMap<String, f64>")]
pub struct VibeVector {
    weights: [f64; Vibe::COUNT],
}

impl VibeVector {
    pub fn zero() -> Self {
        Self::default()
    }

    /// Floor every raw score at zero, then scale so the weights sum to 1.
    /// Returns the zero vector when nothing positive remains.
    pub fn normalized(raw: [f64; Vibe::COUNT]) -> Self {
        let mut weights = raw.map(|w| if w.is_finite() { w.max(0.0) } else { 0.0 });
        let total: f64 = weights.iter().sum();
        if total <= 0.0 {
            return Self::zero();
        }
        for w in weights.iter_mut() {
            *w /= total;
        }
        Self { weights }
    }

    pub fn weight(&self, vibe: Vibe) -> f64 {
        self.weights[vibe.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Vibe, f64)> + '_ {
        Vibe::ALL.iter().map(move |v| (*v, self.weights[v.index()]))
    }

    pub fn sum(&self) -> f64 {
        self.weights.iter().sum()
    }

    pub fn magnitude(&self) -> f64 {
        self.weights.iter().map(|w| w * w).sum::<f64>().sqrt()
    }

    pub fn is_zero(&self) -> bool {
        self.weights.iter().all(|w| *w == 0.0)
    }

    pub fn dot(&self, other: &VibeVector) -> f64 {
        self.weights
            .iter()
            .zip(other.weights.iter())
            .map(|(a, b)| a * b)
            .sum()
    }

    /// Vibes with a positive weight, heaviest first; equal weights fall
    /// back to alphabetical order.
    pub fn ranked(&self) -> Vec<(Vibe, f64)> {
        let mut ranked: Vec<(Vibe, f64)> = self.iter().filter(|(_, w)| *w > 0.0).collect();
        ranked.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        ranked
    }
}

impl From<VibeVector> for BTreeMap<String, f64> {
    fn from(vector: VibeVector) -> Self {
        vector
            .iter()
            .map(|(vibe, w)| (vibe.as_str().to_string(), w))
            .collect()
    }
}

impl TryFrom<BTreeMap<String, f64>> for VibeVector {
    type Error = String;

    /// Accepts a map keyed by every vibe name exactly once. Weights are
    /// taken as given; callers that need the sum-to-one invariant should
    /// pass them through [`VibeVector::normalized`].
    fn try_from(map: BTreeMap<String, f64>) -> Result<Self, Self::Error> {
        let mut weights = [0.0; Vibe::COUNT];
        let mut seen = [false; Vibe::COUNT];
        for (name, weight) in map {
            let vibe = Vibe::from_name(&name).map_err(|e| e.to_string())?;
            if seen[vibe.index()] {
                return Err(format!("duplicate vibe key: {}", name));
            }
            seen[vibe.index()] = true;
            weights[vibe.index()] = weight;
        }
        if let Some(missing) = Vibe::ALL.iter().find(|v| !seen[v.index()]) {
            return Err(format!("missing vibe key: {}", missing));
        }
        Ok(Self { weights })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(pairs: &[(Vibe, f64)]) -> [f64; Vibe::COUNT] {
        let mut raw = [0.0; Vibe::COUNT];
        for (vibe, w) in pairs {
            raw[vibe.index()] = *w;
        }
        raw
    }

    #[test]
    fn test_normalized_sums_to_one() {
        let v = VibeVector::normalized(raw(&[(Vibe::Coastal, 3.0), (Vibe::Modernist, 1.0)]));
        assert!((v.sum() - 1.0).abs() < 1e-9);
        assert!((v.weight(Vibe::Coastal) - 0.75).abs() < 1e-9);
        assert_eq!(v.weight(Vibe::Bohemian), 0.0);
    }

    #[test]
    fn test_normalized_floors_negatives() {
        let v = VibeVector::normalized(raw(&[(Vibe::Coastal, -4.0), (Vibe::Modernist, 2.0)]));
        assert_eq!(v.weight(Vibe::Coastal), 0.0);
        assert!((v.weight(Vibe::Modernist) - 1.0).abs() < 1e-9);

        let all_negative = VibeVector::normalized(raw(&[(Vibe::Coastal, -1.0)]));
        assert!(all_negative.is_zero());
        assert_eq!(all_negative.sum(), 0.0);
    }

    #[test]
    fn test_ranked_breaks_ties_alphabetically() {
        let v = VibeVector::normalized(raw(&[
            (Vibe::Naturalist, 1.0),
            (Vibe::Bohemian, 1.0),
            (Vibe::Modernist, 2.0),
        ]));
        let order: Vec<Vibe> = v.ranked().into_iter().map(|(vibe, _)| vibe).collect();
        assert_eq!(order, vec![Vibe::Modernist, Vibe::Bohemian, Vibe::Naturalist]);
    }

    #[test]
    fn test_serde_uses_every_vibe_key() {
        let v = VibeVector::normalized(raw(&[(Vibe::Minimalist, 1.0)]));
        let json = serde_json::to_value(v).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), Vibe::COUNT);
        assert_eq!(obj["Minimalist"], 1.0);

        let back: VibeVector = serde_json::from_value(json).unwrap();
        assert_eq!(back, v);
    }

    #[test]
    fn test_deserialize_rejects_bad_domains() {
        let missing = serde_json::json!({ "Minimalist": 1.0 });
        assert!(serde_json::from_value::<VibeVector>(missing).is_err());

        let mut extra: serde_json::Map<String, serde_json::Value> = Vibe::ALL
            .iter()
            .map(|v| (v.as_str().to_string(), serde_json::json!(0.125)))
            .collect();
        extra.insert("Brutalist".to_string(), serde_json::json!(0.0));
        assert!(serde_json::from_value::<VibeVector>(serde_json::Value::Object(extra)).is_err());
    }
}
