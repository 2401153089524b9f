use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::domain::{BuyerProfile, PropertyListing};

/// Request to score a single buyer/property pair
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ScoreMatchRequest {
    #[validate(nested)]
    pub buyer: BuyerProfile,
    #[validate(nested)]
    pub property: PropertyListing,
}

/// Request to rank a list of properties for a buyer
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RankMatchesRequest {
    #[validate(nested)]
    pub buyer: BuyerProfile,
    #[validate(nested)]
    #[serde(default)]
    pub properties: Vec<PropertyListing>,
    #[serde(default = "default_limit")]
    pub limit: u16,
}

fn default_limit() -> u16 {
    10
}
