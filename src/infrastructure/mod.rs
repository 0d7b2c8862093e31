// src/infrastructure/mod.rs
// Implementations of domain ports

pub mod cache;
pub mod llm;
pub mod ratelimit;

pub use cache::InMemoryCacheStore;
pub use llm::HyperChatClient;
pub use ratelimit::InMemoryRateLimitStore;
