//! String comparison primitives used by the duplicate detector
//!
//! Edit distance and percentage similarity live in [`levenshtein`]; the
//! phonetic gate encoders live in [`phonetic`].

pub mod levenshtein;
pub mod phonetic;

pub use levenshtein::{
    edit_distance, edit_distance_bounded, similarity_percentage, try_edit_distance,
    try_similarity_percentage,
};
pub use phonetic::{soundex, PhoneticEncoder, Soundex, EMPTY_CODE};
