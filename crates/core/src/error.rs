use casematch_wire::WireError;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A chart type outside [`crate::ChartType`]. Signals a caller bug, not bad data.
    #[error("unknown chart type: {0}")]
    UnknownChartType(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("failed to read corpus file: {0}")]
    CorpusRead(std::io::Error),
    #[error("failed to parse corpus: {0}")]
    CorpusParse(#[from] WireError),
}

pub type EngineResult<T> = std::result::Result<T, EngineError>;
