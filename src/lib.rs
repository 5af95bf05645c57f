//! IELTS Writing Task 1 / Task 2 feedback.
//!
//! A submission flows front end → [`pipeline::Pipeline`] →
//! [`adapter::Adapter`] → [`scorer::Scorer`] → raw report →
//! [`normalize`] → [`format`] → markdown.

pub mod adapter;
pub mod config;
pub mod consts;
pub mod error;
pub mod format;
pub mod llm;
pub mod logging;
pub mod normalize;
pub mod pipeline;
pub mod scorer;
pub mod staging;
pub mod submission;

pub use adapter::Adapter;
pub use config::{KeyStore, Settings};
pub use pipeline::Pipeline;
