mod biguint_ext;
pub use biguint_ext::{BigUintExt, DEFAULT_TEST_ROUNDS};

mod candidate;
pub use candidate::CandidateSource;
