// Core algorithm exports
pub mod matcher;
pub mod scoring;

pub use matcher::{Matcher, RankResult};
pub use scoring::{
    features_match_score, interest_level, location_match_score, price_match_score,
    recommended_action, score_match, size_match_score, template_reasoning, timeline_match_score,
};
