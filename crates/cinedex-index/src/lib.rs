pub mod bulk;
pub mod client;
pub mod mapping;

pub use client::SearchClient;
