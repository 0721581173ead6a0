pub mod reviews;
pub mod verification;
pub mod workers;
