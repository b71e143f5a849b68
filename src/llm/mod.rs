// LLM abstraction layer

pub mod anthropic;
pub mod provider;
pub mod sse;

pub use provider::*;
