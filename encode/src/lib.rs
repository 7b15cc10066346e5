pub mod base;

mod error;
pub use error::EncodeError;
