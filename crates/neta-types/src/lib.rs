//! # neta-types
//!
//! Shared domain types and configuration for blog-neta.
//!
//! ## Core Types
//! - [`Article`]: A Qiita article as returned by the listing endpoint
//! - [`TagCount`]: Tag frequency produced by trend aggregation
//! - [`Topic`] / [`TopicCatalog`]: The topics offered for idea generation
//! - [`Settings`]: Layered application configuration
//! - [`TracingConfig`]: Trace tagging switch, built once at startup

pub mod article;
pub mod config;
pub mod error;
pub mod topic;

pub use article::{Article, TagCount};
pub use config::{
    is_openai_provider, GenerationSettings, QiitaSettings, SearchSettings, Settings,
    TracingConfig, TracingSettings,
};
pub use error::NetaError;
pub use topic::{Topic, TopicCatalog, TopicInfo, CUSTOM_TOPIC_EMOJI};
