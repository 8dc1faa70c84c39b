use thiserror::Error;

pub type ChartResult<T> = Result<T, ChartError>;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("invalid viewport size: width={width}, height={height}")]
    InvalidViewport { width: u32, height: u32 },

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("record is missing required field `{field}`")]
    MissingField { field: String },

    #[error("degenerate domain: {0}")]
    DegenerateDomain(String),

    #[error("invalid date `{input}`: expected `day/month/year`")]
    InvalidDateFormat { input: String },

    #[error("unknown {kind} `{value}`")]
    UnknownChoice { kind: &'static str, value: String },
}
