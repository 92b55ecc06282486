use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("failed to read table file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("table \"{name}\" not found in any of {searched:?}")]
    NotFound { name: String, searched: Vec<PathBuf> },
    #[error("table \"{table}\" has no row \"{row}\"")]
    MissingRow { table: String, row: String },
    #[error("table \"{table}\" has no column \"{column}\"")]
    MissingColumn { table: String, column: String },
}
