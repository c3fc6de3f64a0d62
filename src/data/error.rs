use thiserror::Error;

use super::model::Field;

/// Structural problems found while turning raw rows into a [`RecordStore`].
///
/// [`RecordStore`]: super::model::RecordStore
#[derive(Debug, Error, PartialEq)]
pub enum DataError {
    #[error("required column '{0}' not found")]
    MissingColumn(Field),
    #[error("row {row}: '{field}' has no value")]
    MissingValue { row: usize, field: Field },
    #[error("row {row}: '{field}' has invalid value '{value}'")]
    InvalidValue {
        row: usize,
        field: Field,
        value: String,
    },
    #[error("duplicate article id '{0}'")]
    DuplicateId(String),
    #[error("dataset contains no articles")]
    Empty,
}
