use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unsupported database url: {0}")]
    UnsupportedUrl(String),

    #[error("{0} support not compiled in (enable the `{0}` feature of newsdesk-store)")]
    BackendDisabled(&'static str),

    #[cfg(feature = "duckdb")]
    #[error("duckdb error: {0}")]
    DuckDb(#[from] ::duckdb::Error),

    #[cfg(feature = "mysql")]
    #[error("mysql error: {0}")]
    MySql(#[from] sqlx::Error),

    #[error("{0}")]
    Other(String),
}
