//! # Fifth Core
//!
//! Streaming parser and evaluator for Fifth, a small concatenative stack language.
//!
//! Source text arrives one character at a time. A parser task turns it into
//! phrases and hands them over a bounded channel to an evaluator task, which
//! runs each phrase against a stack and a namespace of macros and variables.
//!
//! ## Features
//!
//! - **Streaming**: phrases are evaluated as soon as they are complete
//! - **Recoverable errors**: malformed input and failed instructions are reported
//!   on an error channel and processing continues
//! - **Quotations**: lists are data until `eval` runs them
//! - **Bounded evaluation**: expansion depth and step count are limited
//!
//! ## Example
//!
//! ```ignore
//! use fifth_core::{Session, SessionConfig, StderrOutput, shared};
//!
//! #[tokio::main]
//! async fn main() {
//!     let session = Session::spawn(SessionConfig::default(), shared(StderrOutput::new()));
//!     session.feed("\"hello\" [dup] eval\n");
//!
//!     let ctx = session.finish().await.unwrap();
//!     assert_eq!(ctx.stack.len(), 2);
//! }
//! ```

pub mod builtins;
pub mod config;
pub mod context;
pub mod error;
pub mod evaluator;
pub mod namespace;
pub mod output;
pub mod parser;
pub mod phrase;
pub mod pipeline;
pub mod queue;
pub mod shutdown;
pub mod stack;
pub mod stream;

// Re-exports for convenience
pub use config::{EvalLimits, SessionConfig};
pub use context::ExecutionContext;
pub use error::{ContainerError, EvalError, ParseError, SessionError};
pub use namespace::Namespace;
pub use output::{AsyncOutput, BufferOutput, SharedOutput, StderrOutput, shared, write_line};
pub use parser::Parser;
pub use phrase::Phrase;
pub use pipeline::{Session, evaluate_phrases, spawn_pipeline};
pub use queue::PhraseQueue;
pub use shutdown::{Shutdown, ShutdownTrigger};
pub use stack::PhraseStack;
pub use stream::{CharSource, CharStream, source_from_str};
