use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProjError {
    #[error("Failed to parse CRS definition '{input}': {reason}")]
    Parse { input: String, reason: String },

    #[error("Unknown authority code: {authority}:{code}")]
    UnknownAuthorityCode { authority: String, code: u32 },

    #[error("Unsupported projection method: {0}")]
    UnsupportedProjection(String),

    #[error("Datum shift grid '{grid}' could not be loaded: {reason}")]
    GridNotLoaded { grid: String, reason: String },

    #[error("Point ({lon}, {lat}) is outside the datum shift grids [{grids}]")]
    OutsideGrid { grids: String, lon: f64, lat: f64 },

    #[error("Degenerate affine transform: {0}")]
    DegenerateTransform(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

impl ProjError {
    pub(crate) fn parse(input: &str, reason: impl Into<String>) -> Self {
        ProjError::Parse {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ProjError>;
