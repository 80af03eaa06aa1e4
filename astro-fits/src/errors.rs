#[derive(Debug, thiserror::Error)]
pub enum FitsError {
    #[error("Invalid FITS format: {0}")]
    InvalidFormat(String),

    #[error("Keyword {keyword} not found")]
    KeywordNotFound { keyword: String },

    #[error("Invalid keyword value: {keyword} = {value}")]
    InvalidKeywordValue { keyword: String, value: String },

    #[error("HDU not found: {0}")]
    HduNotFound(usize),

    #[error("HDU {index} is not a binary table (XTENSION = {xtension})")]
    NotATable { index: usize, xtension: String },

    #[error("Unsupported column format '{tform}' for column {column}")]
    UnsupportedFormat { column: String, tform: String },

    #[error("Column '{0}' not found")]
    ColumnNotFound(String),

    #[error("Row mask covers {actual} rows, table has {expected}")]
    RowMaskLength { expected: usize, actual: usize },

    #[error("EOF reached unexpectedly")]
    UnexpectedEof,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FitsError>;
