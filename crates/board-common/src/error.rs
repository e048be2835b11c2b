/// Error types shared by the board crates.
///
/// The query engine, cross-reference resolver, pager and view helpers are total and never
/// produce these. They come from the fallible edges: fetching documents and editing the
/// admin copy. Binary crates wrap `CommonError` via `#[from]`.

#[derive(Debug, thiserror::Error)]
pub enum CommonError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("fetch of {origin} returned status {status}")]
    FetchStatus { origin: String, status: u16 },

    #[error("failed to read {path}: {message}")]
    Io { path: String, message: String },

    #[error("invalid JSON in {origin}: {message}")]
    Json { origin: String, message: String },

    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: u64 },

    #[error("no {0} left to allocate for a new {1}")]
    Exhausted(&'static str, &'static str),

    #[error("invalid import bundle: {0}")]
    Import(String),
}
