use crate::models::{
    BudgetRange, BuyerProfile, CompatibilityScore, InterestLevel, ListingStatus, PropertyListing,
    RecommendedAction, ScoreBreakdown, ScoringWeights, Timeline,
};

/// Calculate a compatibility score (0-100) for a buyer/property pair
///
/// Scoring formula:
/// score = round(
///     price_match    * 0.30 +     # Within budget = best
///     location_match * 0.25 +     # Preferred location substring
///     features_match * 0.25 +     # Must-have feature coverage
///     size_match     * 0.15 +     # Bedrooms/bathrooms vs desired
///     timeline_match * 0.05       # Listing status vs buyer timeline
/// )
///
/// The function is total over well-formed inputs; out-of-range intermediates
/// from malformed numerics are clamped by the final rounding step. The
/// returned `reasoning` is the deterministic template; callers may replace it
/// with enriched prose without touching the numeric fields.
pub fn score_match(
    buyer: &BuyerProfile,
    property: &PropertyListing,
    weights: &ScoringWeights,
) -> CompatibilityScore {
    let breakdown = ScoreBreakdown {
        price_match: price_match_score(property.price, &buyer.budget),
        location_match: location_match_score(&buyer.preferences.locations, property),
        features_match: features_match_score(
            &buyer.preferences.must_have_features,
            &property.features,
        ),
        size_match: size_match_score(buyer, property),
        timeline_match: timeline_match_score(property.status, buyer.timeline),
    };

    let weighted = breakdown.price_match * weights.price
        + breakdown.location_match * weights.location
        + breakdown.features_match * weights.features
        + breakdown.size_match * weights.size
        + breakdown.timeline_match * weights.timeline;

    let overall_score = weighted.round().clamp(0.0, 100.0) as u8;

    let recommended_action = recommended_action(overall_score);
    let estimated_interest_level = interest_level(overall_score);
    let reasoning = template_reasoning(&breakdown, overall_score, recommended_action);

    CompatibilityScore {
        property_id: property.id.clone(),
        overall_score,
        breakdown,
        recommended_action,
        estimated_interest_level,
        reasoning,
    }
}

/// Calculate price score (0-100)
///
/// Within budget scores 100. Under budget is good but slightly discounted
/// (floor 70); over budget is penalized twice as steeply (floor 0).
#[inline]
pub fn price_match_score(price: f64, budget: &BudgetRange) -> f64 {
    if price >= budget.min && price <= budget.max {
        return 100.0;
    }

    if price < budget.min {
        let percent_below = (budget.min - price) / budget.min * 100.0;
        return (100.0 - percent_below).max(70.0);
    }

    let percent_over = (price - budget.max) / budget.max * 100.0;
    (100.0 - 2.0 * percent_over).max(0.0)
}

/// Calculate location score (0-100)
///
/// No stated preference scores 100. Otherwise a preferred-location substring
/// must case-insensitively match "{city}, {state}"; a miss still earns
/// partial credit.
#[inline]
pub fn location_match_score(preferred: &[String], property: &PropertyListing) -> f64 {
    if preferred.is_empty() {
        return 100.0;
    }

    let label = property.location_label().to_lowercase();
    let matched = preferred
        .iter()
        .any(|loc| label.contains(&loc.to_lowercase()));

    if matched {
        100.0
    } else {
        30.0
    }
}

/// Calculate features score (0-100)
///
/// Fraction of must-have features covered by the listing. A required feature
/// counts as matched when any listing feature contains it as a
/// case-insensitive substring.
#[inline]
pub fn features_match_score(must_have: &[String], features: &[String]) -> f64 {
    if must_have.is_empty() {
        return 100.0;
    }

    let matched = must_have
        .iter()
        .filter(|wanted| {
            let wanted = wanted.to_lowercase();
            features
                .iter()
                .any(|have| have.to_lowercase().contains(&wanted))
        })
        .count();

    (matched as f64 / must_have.len() as f64 * 100.0).round()
}

/// Calculate size score (0-100)
///
/// Average of the bedroom and bathroom sub-scores. Meeting or exceeding the
/// desired count scores 100; a shortfall earns proportional credit scaled to
/// 70 so it never reaches a full score.
#[inline]
pub fn size_match_score(buyer: &BuyerProfile, property: &PropertyListing) -> f64 {
    let bedrooms = shortfall_score(
        property.bedrooms as f64,
        buyer.preferences.bedrooms as f64,
    );
    let bathrooms = shortfall_score(property.bathrooms, buyer.preferences.bathrooms);

    (bedrooms + bathrooms) / 2.0
}

#[inline]
fn shortfall_score(actual: f64, desired: f64) -> f64 {
    if actual >= desired {
        100.0
    } else {
        actual / desired * 70.0
    }
}

/// Calculate timeline score (0-100)
///
/// Sold listings contribute nothing. Pending listings are a poor fit for
/// buyers who need to move immediately.
#[inline]
pub fn timeline_match_score(status: ListingStatus, timeline: Timeline) -> f64 {
    match status {
        ListingStatus::Sold => 0.0,
        ListingStatus::Pending => {
            if timeline == Timeline::Immediate {
                50.0
            } else {
                80.0
            }
        }
        ListingStatus::ForSale => 100.0,
    }
}

/// Derive the recommended action from the overall score
///
/// Thresholds: >=80 high-priority, >=60 good-match, >=40 potential, below
/// that not-recommended.
#[inline]
pub fn recommended_action(overall_score: u8) -> RecommendedAction {
    match overall_score {
        80.. => RecommendedAction::HighPriority,
        60..=79 => RecommendedAction::GoodMatch,
        40..=59 => RecommendedAction::Potential,
        _ => RecommendedAction::NotRecommended,
    }
}

/// Derive the estimated interest level from the overall score
#[inline]
pub fn interest_level(overall_score: u8) -> InterestLevel {
    match overall_score {
        80.. => InterestLevel::VeryHigh,
        60..=79 => InterestLevel::High,
        _ => InterestLevel::Medium,
    }
}

/// Deterministic reasoning used when enrichment is disabled or degraded
pub fn template_reasoning(
    breakdown: &ScoreBreakdown,
    overall_score: u8,
    action: RecommendedAction,
) -> String {
    let label = match action {
        RecommendedAction::HighPriority => "a high-priority match",
        RecommendedAction::GoodMatch => "a good match",
        RecommendedAction::Potential => "a potential match",
        RecommendedAction::NotRecommended => "not recommended",
    };

    format!(
        "Overall compatibility {}/100 ({}): price {:.0}, location {:.0}, \
         features {:.0}, size {:.0}, timeline {:.0}.",
        overall_score,
        label,
        breakdown.price_match,
        breakdown.location_match,
        breakdown.features_match,
        breakdown.size_match,
        breakdown.timeline_match,
    )
}
