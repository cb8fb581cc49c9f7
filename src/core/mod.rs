//! Extraction engine.
//!
//! A payload flows through the scanner, which lists literal arrays and
//! zero-argument functions, then through each strategy in the cascade until
//! one proposes a key the validator accepts. Nothing here reads files or
//! executes the payload.
//!
//! ## Module Structure
//!
//! - `syntax`: bracket-aware text helpers
//! - `scanner`: candidate arrays, functions and mapping sites
//! - `pairing`: index/fragment array pairs and their bounds check
//! - `composer`: key assembly from a pair
//! - `call_graph`: accessor-chain resolution
//! - `strategies`: the heuristics, one type each
//! - `cascade`: priority order, validation and the diagnostic trail
//! - `validator`: key plausibility

pub mod call_graph;
pub mod cascade;
pub mod composer;
pub mod error;
pub mod pairing;
pub mod scanner;
pub mod strategies;
pub mod syntax;
pub mod validator;

pub use cascade::{Analysis, Cascade, Diagnostic, ExtractionResult, Outcome};
pub use error::{ExtractError, Rejection};
pub use scanner::{ScanOutput, scan};
pub use strategies::StrategyKind;
pub use validator::{Advisory, Confidence};
