// Text normalization, token-cell parsing and stopword lists.

pub mod cell;
pub mod normalize;
pub mod stopwords;

pub use cell::{parse_token_cell, parse_token_string, CellFormat};
pub use normalize::{normalize_whitespace, tokenize, tokenize_bytes};
