//! HomeMatch - Buyer/property compatibility scoring service
//!
//! This library provides the deterministic compatibility scorer used by the
//! HomeMatch marketplace. It combines five weighted sub-scores (price,
//! location, features, size, timeline) into a 0-100 match score, ranks
//! candidate listings for a buyer, and optionally enriches scores with
//! collaborator-generated reasoning.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{score_match, Matcher, RankResult};
pub use models::{
    BuyerProfile, CompatibilityScore, InterestLevel, ListingStatus, PropertyListing,
    RecommendedAction, ScoringWeights,
};
