// Integration tests for HomeMatch

use homematch::core::Matcher;
use homematch::models::{
    BudgetRange, BuyerPreferences, BuyerProfile, Financing, InterestLevel, ListingStatus,
    PropertyListing, RecommendedAction, Timeline,
};
use homematch::services::{Enricher, EnrichmentClient, ReasoningCache};
use std::sync::Arc;

fn create_buyer() -> BuyerProfile {
    BuyerProfile {
        id: "buyer_1".to_string(),
        name: "Test Buyer".to_string(),
        email: None,
        phone: None,
        budget: BudgetRange {
            min: 400_000.0,
            max: 500_000.0,
        },
        preferences: BuyerPreferences {
            bedrooms: 3,
            bathrooms: 2.0,
            property_types: vec![],
            locations: vec!["Austin".to_string()],
            must_have_features: vec!["garage".to_string()],
            nice_to_have_features: vec![],
        },
        timeline: Timeline::Immediate,
        financing: Financing::PreApproved,
    }
}

fn create_property(id: &str, price: f64, city: &str, status: ListingStatus) -> PropertyListing {
    PropertyListing {
        id: id.to_string(),
        address: Some(format!("{} Main St", id)),
        city: city.to_string(),
        state: "TX".to_string(),
        price,
        bedrooms: 3,
        bathrooms: 2.0,
        square_feet: 1800,
        property_type: Some("single-family".to_string()),
        features: vec!["two-car garage".to_string()],
        status,
    }
}

fn chat_completion_body(reasoning: &str, action: &str, interest: &str) -> String {
    let content = serde_json::json!({
        "reasoning": reasoning,
        "recommendedAction": action,
        "estimatedInterestLevel": interest,
    })
    .to_string();

    serde_json::json!({
        "choices": [{ "message": { "role": "assistant", "content": content } }]
    })
    .to_string()
}

#[test]
fn test_end_to_end_ranking() {
    let matcher = Matcher::with_default_weights();
    let buyer = create_buyer();

    let properties = vec![
        create_property("in_budget", 450_000.0, "Austin", ListingStatus::ForSale),
        create_property("over_budget", 650_000.0, "Austin", ListingStatus::ForSale),
        create_property("wrong_city", 450_000.0, "Houston", ListingStatus::ForSale),
        create_property("sold", 450_000.0, "Austin", ListingStatus::Sold),
        create_property("pending", 450_000.0, "Austin", ListingStatus::Pending),
    ];

    let result = matcher.rank_matches(&buyer, &properties, 10);

    assert_eq!(result.total_candidates, 5);
    assert_eq!(result.matches.len(), 5);
    assert_eq!(result.matches[0].property_id, "in_budget");
    assert_eq!(result.matches[0].overall_score, 100);

    for window in result.matches.windows(2) {
        assert!(window[0].overall_score >= window[1].overall_score);
    }
}

#[test]
fn test_ranking_stability_on_ties() {
    let matcher = Matcher::with_default_weights();
    let buyer = create_buyer();

    // Identical listings score identically; input order must be preserved
    let properties: Vec<PropertyListing> = (0..5)
        .map(|i| create_property(&format!("tie_{}", i), 450_000.0, "Austin", ListingStatus::ForSale))
        .collect();

    let result = matcher.rank_matches(&buyer, &properties, 10);

    let ids: Vec<&str> = result
        .matches
        .iter()
        .map(|m| m.property_id.as_str())
        .collect();
    assert_eq!(ids, vec!["tie_0", "tie_1", "tie_2", "tie_3", "tie_4"]);
}

#[test]
fn test_ranking_empty_input() {
    let matcher = Matcher::with_default_weights();
    let buyer = create_buyer();

    let result = matcher.rank_matches(&buyer, &[], 10);
    assert!(result.matches.is_empty());
}

#[tokio::test]
async fn test_enrichment_replaces_reasoning_but_not_labels() {
    let mut server = mockito::Server::new_async().await;

    // Collaborator returns contradictory labels on purpose; the service must
    // keep its own classification and take only the prose.
    let mock = server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(chat_completion_body(
            "This home fits the buyer very well.",
            "not-recommended",
            "medium",
        ))
        .create_async()
        .await;

    let client = EnrichmentClient::new(
        server.url(),
        "test-key".to_string(),
        "gpt-4o-mini".to_string(),
        2,
    )
    .unwrap();

    let cache = Arc::new(ReasoningCache::new(10, 60));
    let enricher = Enricher::new(Some(Arc::new(client)), cache, 5);

    let matcher = Matcher::with_default_weights();
    let buyer = create_buyer();
    let property = create_property("prop_1", 450_000.0, "Austin", ListingStatus::ForSale);

    let score = matcher.score(&buyer, &property);
    let enriched = enricher.enrich(&buyer, &property, score.clone()).await;

    mock.assert_async().await;

    assert_eq!(enriched.reasoning, "This home fits the buyer very well.");
    // Numeric score and deterministic labels unchanged
    assert_eq!(enriched.overall_score, score.overall_score);
    assert_eq!(enriched.recommended_action, RecommendedAction::HighPriority);
    assert_eq!(enriched.estimated_interest_level, InterestLevel::VeryHigh);
}

#[tokio::test]
async fn test_enrichment_failure_degrades_to_template() {
    let mut server = mockito::Server::new_async().await;

    // Both the initial attempt and the single retry fail
    let mock = server
        .mock("POST", "/chat/completions")
        .with_status(500)
        .with_body("internal error")
        .expect(2)
        .create_async()
        .await;

    let client = EnrichmentClient::new(
        server.url(),
        "test-key".to_string(),
        "gpt-4o-mini".to_string(),
        2,
    )
    .unwrap();

    let cache = Arc::new(ReasoningCache::new(10, 60));
    let enricher = Enricher::new(Some(Arc::new(client)), cache, 5);

    let matcher = Matcher::with_default_weights();
    let buyer = create_buyer();
    let property = create_property("prop_1", 450_000.0, "Austin", ListingStatus::ForSale);

    let score = matcher.score(&buyer, &property);
    let enriched = enricher.enrich(&buyer, &property, score.clone()).await;

    mock.assert_async().await;

    // Only the reasoning path differs from the enriched case; here it stays
    // the deterministic template, and the numeric result is untouched
    assert_eq!(enriched.reasoning, score.reasoning);
    assert_eq!(enriched.overall_score, score.overall_score);
    assert_eq!(enriched.recommended_action, score.recommended_action);
    assert_eq!(
        enriched.estimated_interest_level,
        score.estimated_interest_level
    );
}

#[tokio::test]
async fn test_enrichment_malformed_payload_degrades_to_template() {
    let mut server = mockito::Server::new_async().await;

    let body = serde_json::json!({
        "choices": [{ "message": { "role": "assistant", "content": "not json at all" } }]
    })
    .to_string();

    let _mock = server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body)
        .create_async()
        .await;

    let client = EnrichmentClient::new(
        server.url(),
        "test-key".to_string(),
        "gpt-4o-mini".to_string(),
        2,
    )
    .unwrap();

    let cache = Arc::new(ReasoningCache::new(10, 60));
    let enricher = Enricher::new(Some(Arc::new(client)), cache, 5);

    let matcher = Matcher::with_default_weights();
    let buyer = create_buyer();
    let property = create_property("prop_1", 450_000.0, "Austin", ListingStatus::ForSale);

    let score = matcher.score(&buyer, &property);
    let enriched = enricher.enrich(&buyer, &property, score.clone()).await;

    assert_eq!(enriched.reasoning, score.reasoning);
    assert_eq!(enriched.overall_score, score.overall_score);
}

#[tokio::test]
async fn test_enrichment_timeout_degrades_to_template() {
    // Zero deadline forces the timeout path without waiting on a server
    let client = EnrichmentClient::new(
        "http://127.0.0.1:9".to_string(),
        "test-key".to_string(),
        "gpt-4o-mini".to_string(),
        2,
    )
    .unwrap();

    let cache = Arc::new(ReasoningCache::new(10, 60));
    let enricher = Enricher::new(Some(Arc::new(client)), cache, 0);

    let matcher = Matcher::with_default_weights();
    let buyer = create_buyer();
    let property = create_property("prop_1", 450_000.0, "Austin", ListingStatus::ForSale);

    let score = matcher.score(&buyer, &property);
    let enriched = enricher.enrich(&buyer, &property, score.clone()).await;

    assert_eq!(enriched.reasoning, score.reasoning);
    assert_eq!(enriched.overall_score, score.overall_score);
}

#[tokio::test]
async fn test_enrich_all_preserves_ranked_order() {
    let mut server = mockito::Server::new_async().await;

    let _mock = server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(chat_completion_body(
            "Enriched reasoning.",
            "high-priority",
            "very-high",
        ))
        .expect_at_least(1)
        .create_async()
        .await;

    let client = EnrichmentClient::new(
        server.url(),
        "test-key".to_string(),
        "gpt-4o-mini".to_string(),
        2,
    )
    .unwrap();

    let cache = Arc::new(ReasoningCache::new(100, 60));
    let enricher = Enricher::new(Some(Arc::new(client)), cache, 5);

    let matcher = Matcher::with_default_weights();
    let buyer = create_buyer();

    let properties = vec![
        create_property("best", 450_000.0, "Austin", ListingStatus::ForSale),
        create_property("worse", 650_000.0, "Austin", ListingStatus::ForSale),
        create_property("worst", 450_000.0, "Austin", ListingStatus::Sold),
    ];

    let result = matcher.rank_matches(&buyer, &properties, 10);
    let expected_order: Vec<String> = result
        .matches
        .iter()
        .map(|m| m.property_id.clone())
        .collect();

    let pairs: Vec<(PropertyListing, _)> = result
        .matches
        .into_iter()
        .map(|score| {
            let property = properties
                .iter()
                .find(|p| p.id == score.property_id)
                .unwrap()
                .clone();
            (property, score)
        })
        .collect();

    let enriched = enricher.enrich_all(&buyer, pairs).await;

    let order: Vec<String> = enriched.iter().map(|m| m.property_id.clone()).collect();
    assert_eq!(order, expected_order);
    assert!(enriched.iter().all(|m| m.reasoning == "Enriched reasoning."));
}

#[tokio::test]
async fn test_enrichment_cache_avoids_second_call() {
    let mut server = mockito::Server::new_async().await;

    // Exactly one upstream call despite two enrich invocations
    let mock = server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(chat_completion_body(
            "Cached reasoning.",
            "high-priority",
            "very-high",
        ))
        .expect(1)
        .create_async()
        .await;

    let client = EnrichmentClient::new(
        server.url(),
        "test-key".to_string(),
        "gpt-4o-mini".to_string(),
        2,
    )
    .unwrap();

    let cache = Arc::new(ReasoningCache::new(10, 60));
    let enricher = Enricher::new(Some(Arc::new(client)), cache, 5);

    let matcher = Matcher::with_default_weights();
    let buyer = create_buyer();
    let property = create_property("prop_1", 450_000.0, "Austin", ListingStatus::ForSale);

    let score = matcher.score(&buyer, &property);
    let first = enricher.enrich(&buyer, &property, score.clone()).await;
    let second = enricher.enrich(&buyer, &property, score).await;

    mock.assert_async().await;
    assert_eq!(first.reasoning, "Cached reasoning.");
    assert_eq!(second.reasoning, "Cached reasoning.");
}
