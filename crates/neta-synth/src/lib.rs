//! # neta-synth
//!
//! Category synthesis and blog idea proposals for blog-neta.
//!
//! ## Features
//!
//! - [`TextGenerator`]: pluggable text-generation service, with the
//!   HTTP-backed [`ApiGenerator`] and the [`MockGenerator`] test double
//! - [`CategorySynthesizer`]: trend signal to topic catalog, falling back to
//!   [`fallback_catalog`] on any failure
//! - [`IdeaProposer`]: research plus streamed proposal text
//! - [`BlogSession`]: one user's catalog, selection and latest proposal
//! - [`TraceContext`]: trace attributes attached to generation calls
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use neta_synth::{generate_tech_categories, CategorySynthesizer, MockGenerator};
//!
//! let synth = CategorySynthesizer::with_generator(Arc::new(MockGenerator::with_reply("{}")));
//! let catalog = generate_tech_categories(&qiita, &synth, 8).await;
//! assert!(!catalog.is_empty());
//! ```

pub mod error;
pub mod fallback;
pub mod generator;
pub mod proposer;
pub mod reply;
pub mod session;
pub mod synthesizer;
pub mod trace;

pub use error::SynthesisError;
pub use fallback::fallback_catalog;
pub use generator::{
    decode_event_stream, ApiGenerator, ApiGeneratorConfig, EventStream, GenerationError,
    GenerationReply, GenerationRequest, MockGenerator, Provider, SseDecoder, StreamEvent,
    TextGenerator,
};
pub use proposer::{tool_status_message, IdeaEvent, IdeaProposer};
pub use reply::{extract_json_object, ReplyContent};
pub use session::BlogSession;
pub use synthesizer::{
    generate_tech_categories, parse_catalog, CategorySynthesizer, DEFAULT_CATEGORY_COUNT,
    LEAD_PHRASES,
};
pub use trace::{TraceContext, APP_NAME, APP_VERSION, DEFAULT_TAGS};
