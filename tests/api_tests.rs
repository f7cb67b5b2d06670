// HTTP binding tests for compat-score

use actix_web::{http::StatusCode, test, web, App};
use compat_score::config::MatchingSettings;
use compat_score::core::{DomainPolicy, Ranker, DEFAULT_PARALLEL_THRESHOLD};
use compat_score::models::{RawProfile, StoredProfile};
use compat_score::routes::{self, AppState};
use compat_score::services::{CacheManager, Claims, InMemoryProfileStore, TokenVerifier};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use std::sync::Arc;

const SECRET: &str = "test-secret";

fn raw(age: i64, hobbies: &[&str]) -> RawProfile {
    RawProfile {
        age,
        openness: 3,
        conscientiousness: 3,
        extraversion: 3,
        agreeableness: 3,
        neuroticism: 3,
        smoking: Some("no".to_string()),
        drinking: Some("no".to_string()),
        hobbies: hobbies.iter().map(|s| s.to_string()).collect(),
    }
}

fn stored(name: &str, sex: &str, profile: RawProfile) -> StoredProfile {
    StoredProfile {
        name: name.to_string(),
        sex: sex.to_string(),
        profile,
    }
}

fn profile_json(age: i64, hobbies: &[&str]) -> Value {
    json!({
        "age": age,
        "openness": 3,
        "conscientiousness": 3,
        "extraversion": 3,
        "agreeableness": 3,
        "neuroticism": 3,
        "smoking": "no",
        "drinking": "no",
        "hobbies": hobbies,
    })
}

fn bearer(sub: &str) -> String {
    let claims = Claims {
        sub: sub.to_string(),
        exp: (chrono::Utc::now().timestamp() + 3600) as usize,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap();
    format!("Bearer {}", token)
}

fn state_with(store: Arc<InMemoryProfileStore>, policy: DomainPolicy) -> AppState {
    AppState {
        store,
        cache: Some(Arc::new(CacheManager::in_memory(100, 60))),
        verifier: TokenVerifier::new(SECRET, "HS256").unwrap(),
        ranker: Ranker::new(policy, DEFAULT_PARALLEL_THRESHOLD),
        matching: MatchingSettings::default(),
    }
}

fn seeded_store() -> Arc<InMemoryProfileStore> {
    Arc::new(InMemoryProfileStore::with_profiles(vec![
        stored("sam", "Male", raw(30, &["chess", "hiking"])),
        stored("ana", "Female", raw(30, &["chess", "hiking"])),
        stored("bea", "female", raw(45, &["chess"])),
        stored("cid", "Male", raw(30, &["chess", "hiking"])),
        stored("dee", "Female", raw(70, &[])),
    ]))
}

macro_rules! app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state))
                .app_data(routes::json_config())
                .app_data(routes::query_config())
                .configure(routes::configure_routes),
        )
        .await
    };
}

#[actix_web::test]
async fn test_health() {
    let app = app!(state_with(seeded_store(), DomainPolicy::Lenient));
    let req = test::TestRequest::get().uri("/api/v1/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["status"], "healthy");
}

#[actix_web::test]
async fn test_score_identical_profiles() {
    let app = app!(state_with(seeded_store(), DomainPolicy::Lenient));
    let req = test::TestRequest::post()
        .uri("/api/v1/score")
        .set_json(json!({
            "profile1": profile_json(30, &["reading", "hiking"]),
            "profile2": profile_json(30, &["hiking", "reading"]),
        }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["score"].as_f64(), Some(100.0));
}

#[actix_web::test]
async fn test_score_missing_trait_is_bad_request() {
    let app = app!(state_with(seeded_store(), DomainPolicy::Lenient));
    let mut broken = profile_json(30, &[]);
    broken.as_object_mut().unwrap().remove("neuroticism");

    let req = test::TestRequest::post()
        .uri("/api/v1/score")
        .set_json(json!({ "profile1": broken, "profile2": profile_json(30, &[]) }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_score_strict_mode_rejects_out_of_domain() {
    let app = app!(state_with(seeded_store(), DomainPolicy::Strict));
    let mut odd = profile_json(30, &[]);
    odd["openness"] = json!(9);

    let req = test::TestRequest::post()
        .uri("/api/v1/score")
        .set_json(json!({ "profile1": odd, "profile2": profile_json(30, &[]) }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Value out of domain");
}

#[actix_web::test]
async fn test_score_one_shared_hobby_in_32_rounds_half_to_even() {
    let app = app!(state_with(seeded_store(), DomainPolicy::Lenient));
    let left: Vec<String> = (0..15).map(|i| format!("l{}", i)).chain(["both".to_string()]).collect();
    let right: Vec<String> = (0..16).map(|i| format!("r{}", i)).chain(["both".to_string()]).collect();
    let left: Vec<&str> = left.iter().map(String::as_str).collect();
    let right: Vec<&str> = right.iter().map(String::as_str).collect();

    let req = test::TestRequest::post()
        .uri("/api/v1/score")
        .set_json(json!({
            "profile1": profile_json(30, &left),
            "profile2": profile_json(30, &right),
        }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["score"].as_f64(), Some(80.62));
}

#[actix_web::test]
async fn test_score_extreme_integer_ages() {
    let app = app!(state_with(seeded_store(), DomainPolicy::Lenient));
    let mut low = profile_json(30, &[]);
    low["age"] = json!(i64::MIN);
    let mut high = profile_json(30, &[]);
    high["age"] = json!(i64::MAX);
    high["openness"] = json!(i64::MIN);

    let req = test::TestRequest::post()
        .uri("/api/v1/score")
        .set_json(json!({ "profile1": low, "profile2": high }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    let score = body["score"].as_f64().unwrap();
    assert!(score.is_finite());
    assert!(score < 0.0);
}

#[actix_web::test]
async fn test_rank_strict_rejects_target_with_empty_pool() {
    let app = app!(state_with(seeded_store(), DomainPolicy::Strict));
    let mut target = profile_json(30, &[]);
    target["extraversion"] = json!(6);

    let req = test::TestRequest::post()
        .uri("/api/v1/rank")
        .set_json(json!({ "target": target, "candidates": [] }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_normalize_returns_all_features() {
    let app = app!(state_with(seeded_store(), DomainPolicy::Lenient));
    let req = test::TestRequest::post()
        .uri("/api/v1/normalize")
        .set_json(json!({ "profile": profile_json(30, &["x"]) }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["age_dist"].as_f64(), Some(0.0));
    assert_eq!(body["trait_openness"].as_f64(), Some(0.5));
    assert_eq!(body["hobbies"], json!(["x"]));
    assert_eq!(body.as_object().unwrap().len(), 9);
}

#[actix_web::test]
async fn test_rank_endpoint_orders_and_truncates() {
    let app = app!(state_with(seeded_store(), DomainPolicy::Lenient));
    let req = test::TestRequest::post()
        .uri("/api/v1/rank")
        .set_json(json!({
            "target": profile_json(30, &["a", "b"]),
            "candidates": [
                { "id": "far", "profile": profile_json(75, &[]) },
                { "id": "twin", "profile": profile_json(30, &["a", "b"]) },
                { "id": "near", "profile": profile_json(32, &["a"]) },
            ],
            "topK": 2,
        }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    let ids: Vec<&str> = body["matches"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["twin", "near"]);
    assert_eq!(body["total_candidates"], 3);
}

#[actix_web::test]
async fn test_rank_rejects_zero_top_k() {
    let app = app!(state_with(seeded_store(), DomainPolicy::Lenient));
    let req = test::TestRequest::post()
        .uri("/api/v1/rank")
        .set_json(json!({ "target": profile_json(30, &[]), "candidates": [], "topK": 0 }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_rank_empty_pool() {
    let app = app!(state_with(seeded_store(), DomainPolicy::Lenient));
    let req = test::TestRequest::post()
        .uri("/api/v1/rank")
        .set_json(json!({ "target": profile_json(30, &[]), "candidates": [] }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["matches"], json!([]));
}

#[actix_web::test]
async fn test_profile_lookup() {
    let app = app!(state_with(seeded_store(), DomainPolicy::Lenient));

    let req = test::TestRequest::get().uri("/api/v1/profile/ana").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["name"], "ana");
    assert_eq!(body["age"], 30);

    let req = test::TestRequest::get().uri("/api/v1/profile/nobody").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_matches_requires_token() {
    let app = app!(state_with(seeded_store(), DomainPolicy::Lenient));
    let req = test::TestRequest::get().uri("/api/v1/matches/sam").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_matches_opposite_sex_ranked() {
    let app = app!(state_with(seeded_store(), DomainPolicy::Lenient));
    let req = test::TestRequest::get()
        .uri("/api/v1/matches/sam")
        .insert_header(("Authorization", bearer("sam")))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    let ids: Vec<&str> = body["matches"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["ana", "bea", "dee"]);
    assert_eq!(body["matches"][0]["score"].as_f64(), Some(100.0));
}

#[actix_web::test]
async fn test_matches_limit() {
    let app = app!(state_with(seeded_store(), DomainPolicy::Lenient));
    let req = test::TestRequest::get()
        .uri("/api/v1/matches/ana?limit=1")
        .insert_header(("Authorization", bearer("ana")))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    let matches = body["matches"].as_array().unwrap();
    assert_eq!(matches.len(), 1);
    // sam and cid tie at 100; store order wins
    assert_eq!(matches[0]["id"], "sam");
}

#[actix_web::test]
async fn test_matches_unknown_user() {
    let app = app!(state_with(seeded_store(), DomainPolicy::Lenient));
    let req = test::TestRequest::get()
        .uri("/api/v1/matches/ghost")
        .insert_header(("Authorization", bearer("sam")))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_compare_and_store_records() {
    let store = seeded_store();
    let app = app!(state_with(store.clone(), DomainPolicy::Lenient));

    let mut p1 = profile_json(30, &["a", "b"]);
    p1["name"] = json!("ana");
    p1["sex"] = json!("Female");
    let mut p2 = profile_json(30, &["c", "d"]);
    p2["name"] = json!("sam");
    p2["sex"] = json!("Male");

    let req = test::TestRequest::post()
        .uri("/api/v1/compare-and-store")
        .set_json(json!({ "profile1": p1, "profile2": p2 }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["score"].as_f64(), Some(80.0));

    let recorded = store.comparisons().await;
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].profile1, "ana");
    assert_eq!(recorded[0].profile2, "sam");
    assert_eq!(recorded[0].score, 80.0);
}
