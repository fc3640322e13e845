pub mod color;
pub mod error;

pub use error::*;
