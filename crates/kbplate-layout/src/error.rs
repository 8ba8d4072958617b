use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error("layout is not valid JSON5: {0}")]
    Syntax(String),

    #[error("layout root must be an array of rows")]
    NotAnArray,

    #[error("row {row}: expected an array of keys or a properties object")]
    InvalidRow { row: usize },

    #[error("row {row}, item {item}: expected a key label or a properties object")]
    InvalidItem { row: usize, item: usize },

    #[error("row {row}, item {item}: \"{field}\" {reason}")]
    InvalidValue {
        row: usize,
        item: usize,
        field: String,
        reason: String,
    },

    #[error("keyboard properties: {0}")]
    InvalidProperties(String),

    #[error("layout has no keys")]
    NoKeys,
}
