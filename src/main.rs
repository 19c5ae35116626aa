mod error;
mod records;
mod recommend;
mod registry;

use anyhow::Result;
use dotenv::dotenv;
use env_logger::Builder;
use lazy_static::lazy_static;
use log::LevelFilter;
use recommend::engine::{CandidateMode, EngineConfig, RecommendationEngine};
use registry::{Registration, Registry};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::error::Error;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use warp::http::StatusCode;
use warp::{Filter, Rejection, Reply};

#[macro_use]
extern crate log;

lazy_static! {
    static ref DATA_FILE: PathBuf = PathBuf::from(
        std::env::var("DATA_FILE").unwrap_or_else(|_| "user_interests.csv".to_string())
    );
    static ref REPORT_FILE: Option<PathBuf> = std::env::var("REPORT_FILE").ok().map(PathBuf::from);
    static ref THRESHOLD: f64 = env_or("THRESHOLD", 0.0);
    static ref TOP_N: Option<usize> = Some(env_or("TOP_N", 0usize)).filter(|n| *n > 0);
    static ref CANDIDATE_MODE: CandidateMode = env_or("CANDIDATE_MODE", CandidateMode::Indexed);
    static ref PORT: u16 = env_or("PORT", 5000);
    static ref SEED_USERS: usize = env_or("SEED_USERS", 0);
    static ref SEED_INTERESTS: usize = env_or("SEED_INTERESTS", 10);
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(value) => parse_or(key, &value, default),
        Err(_) => default,
    }
}

fn parse_or<T: FromStr>(key: &str, value: &str, default: T) -> T {
    value.trim().parse::<T>().unwrap_or_else(|_| {
        warn!("invalid {}: {:?}, using default", key, value);
        default
    })
}

#[derive(Debug, Deserialize)]
struct SubmitForm {
    name: Option<String>,
    interests: Option<String>,
}

#[derive(Serialize)]
struct SubmitResponse {
    error_message: Option<String>,
    #[serde(flatten)]
    snapshot: registry::Snapshot,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // read .env
    dotenv().ok();

    // init logger
    let log_level = std::env::var("RUST_LOG").unwrap_or_default();

    if log_level == "debug" {
        Builder::new()
            .filter(None, LevelFilter::Off)
            .filter(Some("interest_match::recommend"), LevelFilter::Debug)
            .filter(Some("interest_match"), LevelFilter::Debug)
            .init();
    } else if log_level == "info" {
        Builder::new()
            .filter(None, LevelFilter::Off)
            .filter(Some("interest_match::recommend"), LevelFilter::Info)
            .filter(Some("interest_match"), LevelFilter::Info)
            .init();
    } else {
        env_logger::init();
    }

    let engine = RecommendationEngine::new(EngineConfig {
        threshold: *THRESHOLD,
        top_n: *TOP_N,
        mode: *CANDIDATE_MODE,
    })?;
    let registry = Arc::new(Registry::new(DATA_FILE.clone(), engine, REPORT_FILE.clone()).await?);

    let seeded = registry.seed(*SEED_USERS, *SEED_INTERESTS).await?;
    if seeded > 0 {
        info!("seeded {} with {} synthetic users", DATA_FILE.display(), seeded);
    }

    info!("server running at port: {}", *PORT);
    warp::serve(routes(registry)).run(([0, 0, 0, 0], *PORT)).await;

    Ok(())
}

fn routes(registry: Arc<Registry>) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let with_registry = warp::any().map(move || Arc::clone(&registry));

    let index_route = warp::path::end().and(warp::get()).and_then(index);

    let state_route = warp::path("state")
        .and(warp::path::end())
        .and(warp::get())
        .and(with_registry.clone())
        .and_then(handle_state);

    let submit_route = warp::path::end()
        .and(warp::post())
        .and(warp::header::optional::<String>("x-requested-with"))
        .and(warp::body::form())
        .and(with_registry)
        .and_then(handle_submit);

    let stray_submit_route = warp::path("submit").and_then(handle_stray_submit);

    index_route
        .or(state_route)
        .or(submit_route)
        .or(stray_submit_route)
}

async fn index() -> Result<impl Reply, Rejection> {
    let index_html = include_str!("../index.html");
    Ok(warp::reply::html(index_html))
}

async fn handle_state(registry: Arc<Registry>) -> Result<warp::reply::Response, Infallible> {
    match registry.snapshot().await {
        Ok(snapshot) => {
            debug!("get state request return {} users", snapshot.users.len());
            Ok(warp::reply::json(&snapshot).into_response())
        }
        Err(e) => Ok(internal_error(e)),
    }
}

async fn handle_submit(
    requested_with: Option<String>,
    form: SubmitForm,
    registry: Arc<Registry>,
) -> Result<warp::reply::Response, Infallible> {
    info!("get submit request: {:?}", form);
    let is_ajax = requested_with.as_deref() == Some("XMLHttpRequest");

    let error_message = match registry.register(form.name, form.interests).await {
        Ok(Registration::Saved(record)) => {
            info!("registered {}: {}", record.name, record.interests);
            None
        }
        Ok(Registration::Refused(e)) => Some(e.to_string()),
        Err(e) => return Ok(internal_error(e)),
    };
    if !is_ajax {
        if let Some(message) = &error_message {
            warn!("non-ajax submit refused, redirecting without message: {}", message);
        }
        return Ok(warp::redirect::see_other(warp::http::Uri::from_static("/")).into_response());
    }

    match registry.snapshot().await {
        Ok(snapshot) => {
            let response = SubmitResponse {
                error_message,
                snapshot,
            };
            Ok(warp::reply::json(&response).into_response())
        }
        Err(e) => Ok(internal_error(e)),
    }
}

async fn handle_stray_submit() -> Result<impl Reply, Infallible> {
    warn!("unexpected request to /submit");
    Ok(warp::reply::with_status(
        "Error: This route should not be accessed. Form should submit to /",
        StatusCode::NOT_FOUND,
    ))
}

fn internal_error(e: anyhow::Error) -> warp::reply::Response {
    error!("processing data failed: {}", e);
    warp::reply::with_status(format!("Error: {}", e), StatusCode::INTERNAL_SERVER_ERROR)
        .into_response()
}
