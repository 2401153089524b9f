use crate::core::scoring::score_match;
use crate::models::{BuyerProfile, CompatibilityScore, PropertyListing, ScoringWeights};

/// Result of the ranking process
#[derive(Debug)]
pub struct RankResult {
    pub matches: Vec<CompatibilityScore>,
    pub total_candidates: usize,
}

/// Ranking orchestrator for buyer/property compatibility
///
/// Scoring is pure per pair, so candidates are scored independently and the
/// output depends only on the inputs: results are sorted descending by
/// overall score with a stable sort, so equal scores keep their input order.
#[derive(Debug, Clone)]
pub struct Matcher {
    weights: ScoringWeights,
}

impl Matcher {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    pub fn with_default_weights() -> Self {
        Self {
            weights: ScoringWeights::default(),
        }
    }

    /// Score a single buyer/property pair
    pub fn score(&self, buyer: &BuyerProfile, property: &PropertyListing) -> CompatibilityScore {
        score_match(buyer, property, &self.weights)
    }

    /// Rank all candidate properties for a buyer
    ///
    /// Every candidate is scored; sold or poorly matching listings rank low
    /// rather than being filtered out. An empty candidate list yields an
    /// empty result.
    ///
    /// # Arguments
    /// * `buyer` - The buyer profile to rank against
    /// * `properties` - All candidate listings
    /// * `limit` - Maximum number of matches to return
    pub fn rank_matches(
        &self,
        buyer: &BuyerProfile,
        properties: &[PropertyListing],
        limit: usize,
    ) -> RankResult {
        let total_candidates = properties.len();

        let mut matches: Vec<CompatibilityScore> = properties
            .iter()
            .map(|property| score_match(buyer, property, &self.weights))
            .collect();

        // Stable sort: ties keep candidate input order
        matches.sort_by(|a, b| b.overall_score.cmp(&a.overall_score));
        matches.truncate(limit);

        RankResult {
            matches,
            total_candidates,
        }
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::with_default_weights()
    }
}
