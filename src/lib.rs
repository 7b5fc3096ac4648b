//! Censor - multi-pass redaction of sensitive spans in plain text
//!
//! Censor replaces personal names, dates, phone numbers, addresses and
//! whole sentences about configured concepts with a censor glyph, keeping
//! the rest of the document intact and reporting how much was redacted.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                          Redactor                              │
//! │                                                                │
//! │  text ─► FieldAnchors ─► DatePatterns ─► StatisticalNer ─►     │
//! │          PhonePatterns ─► TransformerNer ─► Concepts ─► text'  │
//! │                                                                │
//! │  each entity pass:  detect ─► normalize ─► resolve ─► apply    │
//! └──────────────┬─────────────────────────────┬──────────────────┘
//!                │                             │
//!   ┌────────────▼────────────┐   ┌────────────▼────────────┐
//!   │   Built-in patterns     │   │   External detectors    │
//!   │  phone, dates, headers  │   │  NER, classifier,       │
//!   │                         │   │  synonyms (HTTP/lexicon)│
//!   └─────────────────────────┘   └─────────────────────────┘
//! ```
//!
//! Every pass works on the output of the previous one. Replacements keep
//! the character length of what they cover, and already-censored text is
//! never counted again, so running the redactor twice changes nothing.
//!
//! ## Modules
//!
//! - [`pipeline`]: the redactor, its passes and statistics
//! - [`detect`]: detector traits, built-in patterns and adapters
//! - [`batch`]: file discovery, output files and concurrent batch runs
//! - [`span`]: span and category types shared across the crate
//! - [`config`]: configuration management

pub mod batch;
pub mod config;
pub mod detect;
pub mod error;
pub mod pipeline;
pub mod span;

pub use config::CensorConfig;
pub use detect::Detectors;
pub use error::{Error, Result};
pub use pipeline::{CensorResult, Pass, Redactor, Statistics};
pub use span::{Category, Span};
