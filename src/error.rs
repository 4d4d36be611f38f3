use thiserror::Error;

#[derive(Error, Debug)]
pub enum SalescopeError {
    #[error("Missing required column '{0}' in input data")]
    MissingColumn(String),

    #[error("Report generation failed: {0}")]
    Report(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SalescopeError>;
