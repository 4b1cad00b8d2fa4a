pub mod board;
pub mod clock;
pub mod config;
pub mod error;
pub mod identity;
pub mod repository;
pub mod telemetry;

#[cfg(test)]
pub(crate) mod test_support;
