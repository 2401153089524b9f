// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    BudgetRange, BuyerPreferences, BuyerProfile, CompatibilityScore, Financing, InterestLevel,
    ListingStatus, PropertyListing, RecommendedAction, ScoreBreakdown, ScoringWeights, Timeline,
};
pub use requests::{RankMatchesRequest, ScoreMatchRequest};
pub use responses::{ErrorResponse, HealthResponse, RankMatchesResponse};
