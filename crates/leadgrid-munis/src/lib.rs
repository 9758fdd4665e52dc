pub mod cache;
pub mod client;

pub use cache::TtlCache;
pub use client::{MunisClient, MunisError};
