use actix_web::http::{header, StatusCode};
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use std::sync::Arc;
use std::time::{Duration, Instant};
use validator::Validate;

use crate::config::MatchingSettings;
use crate::core::{score, CandidateFilter, CoreError, Ranker};
use crate::models::{
    CompareRequest, CompareResponse, ComparisonRecord, ErrorResponse, HealthResponse, MatchesQuery,
    NormalizeRequest, RankRequest, RankResponse, RankedMatch, RawProfile, ScoreRequest, ScoreResponse,
    StoredProfile,
};
use crate::services::{CacheKey, CacheManager, ProfileStore, StoreError, TokenVerifier};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ProfileStore>,
    pub cache: Option<Arc<CacheManager>>,
    pub verifier: TokenVerifier,
    pub ranker: Ranker,
    pub matching: MatchingSettings,
}

impl AppState {
    fn deadline(&self) -> Option<Instant> {
        self.matching
            .rank_timeout_ms
            .map(|ms| Instant::now() + Duration::from_millis(ms))
    }

    /// Look up a stored profile, going through the cache when one is configured
    async fn lookup_profile(&self, name: &str) -> Result<Option<StoredProfile>, StoreError> {
        let key = CacheKey::profile(name);

        if let Some(cache) = &self.cache {
            if let Ok(profile) = cache.get::<StoredProfile>(&key).await {
                return Ok(Some(profile));
            }
        }

        let profile = self.store.get_profile(name).await?;

        if let (Some(cache), Some(profile)) = (&self.cache, &profile) {
            if let Err(e) = cache.set(&key, profile).await {
                tracing::warn!("Failed to cache profile {}: {}", name, e);
            }
        }

        Ok(profile)
    }
}

/// Configure all compatibility routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/normalize", web::post().to(normalize_profile))
        .route("/score", web::post().to(score_profiles))
        .route("/rank", web::post().to(rank_candidates))
        .route("/profile/{name}", web::get().to(get_profile))
        .route("/matches/{name}", web::get().to(get_matches))
        .route("/compare-and-store", web::post().to(compare_and_store));
}

fn error_response(status: StatusCode, error: &str, message: impl ToString) -> HttpResponse {
    HttpResponse::build(status).json(ErrorResponse {
        error: error.to_string(),
        message: message.to_string(),
        status_code: status.as_u16(),
    })
}

fn core_error_response(err: &CoreError) -> HttpResponse {
    match err {
        CoreError::MalformedProfile(_) => {
            error_response(StatusCode::BAD_REQUEST, "Malformed profile", err)
        }
        CoreError::OutOfDomainValue { .. } => {
            error_response(StatusCode::BAD_REQUEST, "Value out of domain", err)
        }
        CoreError::RankingCancelled => {
            error_response(StatusCode::SERVICE_UNAVAILABLE, "Ranking timed out", err)
        }
    }
}

fn store_error_response(err: &StoreError) -> HttpResponse {
    match err {
        StoreError::InvalidRecord(core) => core_error_response(core),
        _ => error_response(StatusCode::INTERNAL_SERVER_ERROR, "Profile store error", err),
    }
}

/// Rank a pool on the blocking thread pool
async fn rank_blocking(
    ranker: Ranker,
    target: RawProfile,
    pool: Vec<(String, RawProfile)>,
    top_k: usize,
    deadline: Option<Instant>,
) -> Result<Result<Vec<RankedMatch>, CoreError>, actix_web::error::BlockingError> {
    web::block(move || ranker.rank_until(&target, &pool, top_k, deadline)).await
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let store_healthy = state.store.health_check().await.unwrap_or(false);

    let status = if store_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Normalize endpoint
///
/// POST /api/v1/normalize
async fn normalize_profile(
    state: web::Data<AppState>,
    req: web::Json<NormalizeRequest>,
) -> impl Responder {
    match state.ranker.normalizer().normalize(&req.profile) {
        Ok(vector) => HttpResponse::Ok().json(vector),
        Err(e) => core_error_response(&e),
    }
}

/// Score endpoint
///
/// POST /api/v1/score
///
/// Request body:
/// ```json
/// { "profile1": { "age": 30, "openness": 3, ... }, "profile2": { ... } }
/// ```
async fn score_profiles(
    state: web::Data<AppState>,
    req: web::Json<ScoreRequest>,
) -> impl Responder {
    let normalizer = state.ranker.normalizer();

    let vectors = normalizer
        .normalize(&req.profile1)
        .and_then(|v1| Ok((v1, normalizer.normalize(&req.profile2)?)));

    match vectors {
        Ok((v1, v2)) => HttpResponse::Ok().json(ScoreResponse { score: score(&v1, &v2) }),
        Err(e) => {
            tracing::info!("Rejected score request: {}", e);
            core_error_response(&e)
        }
    }
}

/// Rank endpoint over a caller-supplied candidate pool
///
/// POST /api/v1/rank
///
/// Request body:
/// ```json
/// { "target": { ... }, "candidates": [{ "id": "string", "profile": { ... } }], "topK": 5 }
/// ```
async fn rank_candidates(
    state: web::Data<AppState>,
    req: web::Json<RankRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return error_response(StatusCode::BAD_REQUEST, "Validation failed", errors);
    }

    let RankRequest { target, candidates, top_k } = req.into_inner();
    let total_candidates = candidates.len();
    let pool: Vec<(String, RawProfile)> = candidates
        .into_iter()
        .map(|c| (c.id, c.profile))
        .collect();

    match rank_blocking(state.ranker, target, pool, top_k, state.deadline()).await {
        Ok(Ok(matches)) => HttpResponse::Ok().json(RankResponse {
            matches,
            total_candidates,
        }),
        Ok(Err(e)) => core_error_response(&e),
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, "Ranking failed", e),
    }
}

/// Stored profile lookup
///
/// GET /api/v1/profile/{name}
async fn get_profile(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let name = path.into_inner();

    match state.lookup_profile(&name).await {
        Ok(Some(profile)) => HttpResponse::Ok().json(profile),
        Ok(None) => error_response(StatusCode::NOT_FOUND, "User not found", &name),
        Err(e) => {
            tracing::error!("Failed to fetch profile for {}: {}", name, e);
            store_error_response(&e)
        }
    }
}

/// Best matches for a stored profile
///
/// GET /api/v1/matches/{name}?limit=5
///
/// Requires a bearer token. Candidates are the profiles of the opposite sex,
/// excluding the user themselves.
async fn get_matches(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<MatchesQuery>,
    http_req: HttpRequest,
) -> impl Responder {
    let auth_header = http_req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());
    let current_user = match state.verifier.verify_header(auth_header) {
        Ok(sub) => sub,
        Err(e) => return error_response(StatusCode::UNAUTHORIZED, "Unauthorized", e),
    };

    if let Err(errors) = query.validate() {
        return error_response(StatusCode::BAD_REQUEST, "Validation failed", errors);
    }

    let name = path.into_inner();
    let limit = query
        .limit
        .unwrap_or(state.matching.default_top_k)
        .min(state.matching.max_top_k);

    tracing::info!("Finding matches for {} (requested by {}), limit: {}", name, current_user, limit);

    let user = match state.lookup_profile(&name).await {
        Ok(Some(user)) => user,
        Ok(None) => return error_response(StatusCode::NOT_FOUND, "User not found", &name),
        Err(e) => {
            tracing::error!("Failed to fetch profile for {}: {}", name, e);
            return store_error_response(&e);
        }
    };

    let filter = CandidateFilter::reciprocal_for(&user);
    let candidates = match state.store.list_candidates(&filter).await {
        Ok(candidates) => candidates,
        Err(e) => {
            tracing::error!("Failed to query candidates for {}: {}", name, e);
            return store_error_response(&e);
        }
    };

    let total_candidates = candidates.len();
    let pool: Vec<(String, RawProfile)> = candidates
        .into_iter()
        .map(|c| (c.name, c.profile))
        .collect();

    match rank_blocking(state.ranker, user.profile, pool, limit, state.deadline()).await {
        Ok(Ok(matches)) => {
            tracing::info!(
                "Returning {} matches for {} (from {} candidates)",
                matches.len(),
                name,
                total_candidates
            );
            HttpResponse::Ok().json(RankResponse {
                matches,
                total_candidates,
            })
        }
        Ok(Err(e)) => {
            tracing::warn!("Ranking failed for {}: {}", name, e);
            core_error_response(&e)
        }
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, "Ranking failed", e),
    }
}

/// Score two named profiles and record the comparison
///
/// POST /api/v1/compare-and-store
async fn compare_and_store(
    state: web::Data<AppState>,
    req: web::Json<CompareRequest>,
) -> impl Responder {
    if let Err(message) = req.validate_names() {
        return error_response(StatusCode::BAD_REQUEST, "Validation failed", message);
    }

    let normalizer = state.ranker.normalizer();
    let vectors = normalizer
        .normalize(&req.profile1.profile)
        .and_then(|v1| Ok((v1, normalizer.normalize(&req.profile2.profile)?)));
    let (v1, v2) = match vectors {
        Ok(vectors) => vectors,
        Err(e) => return core_error_response(&e),
    };

    let score = score(&v1, &v2);
    let record = ComparisonRecord::new(&req.profile1.name, &req.profile2.name, score);

    if let Err(e) = state.store.record_comparison(&record).await {
        tracing::error!("Failed to record comparison: {}", e);
        return store_error_response(&e);
    }

    HttpResponse::Ok().json(CompareResponse {
        score,
        message: "Comparison stored successfully.".to_string(),
    })
}
