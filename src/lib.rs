pub mod archive;
pub mod clean;
pub mod config;
pub mod error;
pub mod merge;
pub mod pipeline;
pub mod score;
pub mod table;
pub mod validate;

pub use error::{Error, Result, ValidationError};
