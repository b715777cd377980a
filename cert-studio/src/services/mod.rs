pub mod export;
pub mod issuance;
pub mod projection;
pub mod removal;
pub mod verification;
