use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Buyer budget bounds in dollars
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BudgetRange {
    pub min: f64,
    pub max: f64,
}

/// What the buyer is looking for in a property
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuyerPreferences {
    #[serde(default)]
    pub bedrooms: u32,
    #[serde(default)]
    pub bathrooms: f64,
    #[serde(rename = "propertyTypes", default)]
    pub property_types: Vec<String>,
    #[serde(default)]
    pub locations: Vec<String>,
    #[serde(rename = "mustHaveFeatures", default)]
    pub must_have_features: Vec<String>,
    #[serde(rename = "niceToHaveFeatures", default)]
    pub nice_to_have_features: Vec<String>,
}

/// How soon the buyer wants to close
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Timeline {
    #[serde(rename = "immediate")]
    Immediate,
    #[serde(rename = "1-3mo")]
    OneToThreeMonths,
    #[serde(rename = "3-6mo")]
    ThreeToSixMonths,
    #[serde(rename = "6mo+")]
    SixMonthsPlus,
}

/// Buyer financing situation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Financing {
    Cash,
    PreApproved,
    NeedsApproval,
}

/// Buyer profile with budget and preference data
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BuyerProfile {
    #[validate(length(min = 1))]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[validate(custom(function = "validate_budget"))]
    pub budget: BudgetRange,
    pub preferences: BuyerPreferences,
    pub timeline: Timeline,
    pub financing: Financing,
}

fn validate_budget(budget: &BudgetRange) -> Result<(), ValidationError> {
    if budget.min > budget.max {
        return Err(ValidationError::new("budget_min_above_max"));
    }
    if budget.min < 0.0 {
        return Err(ValidationError::new("budget_negative"));
    }
    Ok(())
}

/// Sale status of a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ListingStatus {
    ForSale,
    Pending,
    Sold,
}

/// Property listing with pricing and attribute data
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PropertyListing {
    #[validate(length(min = 1))]
    pub id: String,
    #[serde(default)]
    pub address: Option<String>,
    pub city: String,
    pub state: String,
    #[validate(range(min = 0.0))]
    pub price: f64,
    pub bedrooms: u32,
    pub bathrooms: f64,
    #[serde(rename = "squareFeet", default)]
    pub square_feet: u32,
    #[serde(rename = "propertyType", default)]
    pub property_type: Option<String>,
    #[serde(default)]
    pub features: Vec<String>,
    pub status: ListingStatus,
}

impl PropertyListing {
    /// Location string in the form preferred-location substrings are matched
    /// against, e.g. "Austin, TX".
    pub fn location_label(&self) -> String {
        format!("{}, {}", self.city, self.state)
    }
}

/// Action suggested to the agent for a scored match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecommendedAction {
    HighPriority,
    GoodMatch,
    Potential,
    NotRecommended,
}

/// Predicted buyer interest for a scored match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InterestLevel {
    VeryHigh,
    High,
    Medium,
}

/// Per-component sub-scores, each in [0, 100]
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    #[serde(rename = "priceMatch")]
    pub price_match: f64,
    #[serde(rename = "locationMatch")]
    pub location_match: f64,
    #[serde(rename = "featuresMatch")]
    pub features_match: f64,
    #[serde(rename = "sizeMatch")]
    pub size_match: f64,
    #[serde(rename = "timelineMatch")]
    pub timeline_match: f64,
}

/// Scored buyer/property match
///
/// Value object recomputed on every call. `overall_score` is always the
/// rounded weighted sum of the breakdown components, clamped to [0, 100].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompatibilityScore {
    #[serde(rename = "propertyId")]
    pub property_id: String,
    #[serde(rename = "overallScore")]
    pub overall_score: u8,
    pub breakdown: ScoreBreakdown,
    #[serde(rename = "recommendedAction")]
    pub recommended_action: RecommendedAction,
    #[serde(rename = "estimatedInterestLevel")]
    pub estimated_interest_level: InterestLevel,
    pub reasoning: String,
}

/// Scoring weights for the five sub-scores. Must sum to 1.0.
#[derive(Debug, Clone, Copy)]
pub struct ScoringWeights {
    pub price: f64,
    pub location: f64,
    pub features: f64,
    pub size: f64,
    pub timeline: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            price: 0.30,
            location: 0.25,
            features: 0.25,
            size: 0.15,
            timeline: 0.05,
        }
    }
}
