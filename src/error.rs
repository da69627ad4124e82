use thiserror::Error;

/// Failure of a single routing provider call.
///
/// Never fatal to a run: the orchestrator turns it into a batch warning.
#[derive(Error, Debug)]
pub enum RoutingError {
    #[error("routing request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("no route found: {0}")]
    NoRoute(String),

    #[error("invalid routing response: {0}")]
    InvalidResponse(String),
}

#[derive(Error, Debug)]
pub enum PlannerError {
    #[error("invalid policy: {0}")]
    InvalidPolicy(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Routing(#[from] RoutingError),

    #[error("failed to start routing workers: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PlannerError>;
