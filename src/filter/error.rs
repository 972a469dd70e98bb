use thiserror::Error;

#[derive(Error, Debug)]
pub enum FilterError {
    #[error("Invalid table name: {0}")]
    InvalidTableName(String),

    #[error("Invalid value for search parameter '{param}': expected {expected}, got '{value}'")]
    InvalidParam {
        param: &'static str,
        expected: &'static str,
        value: String,
    },
}
