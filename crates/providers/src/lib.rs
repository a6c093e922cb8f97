//! Text-generation provider implementations for shuttlechat.
//!
//! All providers implement the `shuttlechat_core::Provider` trait.
//! `router::build_default` builds the configured provider.

pub mod openai_compat;
pub mod router;

pub use openai_compat::OpenAiCompatProvider;
