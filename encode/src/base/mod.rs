mod base64;
pub use base64::Base64;
