//! Step tree model for the pystep Python emitter: step types, construct vocabulary, JSON decoding.
//!
//! This crate only describes *what* to emit. Rendering, handler lookup and indentation live in the
//! root `pystep` crate.
//!
//! ## Notes
//! - Expression-level text (conditions, values, annotations) is carried verbatim and never parsed.
//! - Construct identity (canonical tags, legacy aliases, block/simple/marker kinds) comes from the
//!   [`tags`] registry.
//!
//! ## Examples
//! ```rust
//! use pystep_syntax::{decode_program, Step};
//! use serde_json::json;
//!
//! let program = decode_program(&json!([{"type": "return", "value": "x"}])).unwrap();
//! assert_eq!(program, vec![Step::ret("x")]);
//! ```

pub mod decode;
pub mod errors;
pub mod path;
pub mod step;
pub mod tags;

pub use decode::{decode_program, decode_step};
pub use errors::{DecodeError, DecodeErrorKind};
pub use path::{PathSegment, StepPath};
pub use step::*;
pub use tags::{ConstructId, ConstructInfo, ConstructKind};
