//! Error type shared by the extractor, the upstream clients and the service.

use thiserror::Error;

/// Upstream service a fetch failure came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upstream {
    Nominatim,
    Overpass,
}

impl std::fmt::Display for Upstream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Upstream::Nominatim => write!(f, "Nominatim"),
            Upstream::Overpass => write!(f, "Overpass"),
        }
    }
}

#[derive(Debug, Error)]
pub enum FootprintError {
    #[error("No buildings found near this address")]
    EmptyInput,

    #[error("No building polygons found")]
    NoPolygonGeometry,

    #[error("Selected building polygon is degenerate: {0}")]
    DegeneratePolygon(String),

    #[error("Address not found: {0}")]
    AddressNotFound(String),

    #[error("{service} request failed: {message}")]
    UpstreamFetchFailure { service: Upstream, message: String },
}

impl FootprintError {
    pub fn upstream(service: Upstream, err: impl std::fmt::Display) -> Self {
        FootprintError::UpstreamFetchFailure {
            service,
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, FootprintError>;
