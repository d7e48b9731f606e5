#![forbid(unsafe_code)]
//! pystep: structured Python source emission
//!
//! Turns trees of [`Step`] records (typed Rust values or JSON documents) into Python 3 source
//! text. Each step names one construct (`func_def`, `if`, `import`, ...); a handler registry maps
//! construct tags to rendering functions, and the emitter walks the tree depth-first, indenting
//! nested suites one level per block.
//!
//! This is an emission engine only: expression text inside steps is copied verbatim and never
//! parsed or checked.
//!
//! ## Panic Policy
//!
//! - **Production code**: Use `Result` with `?`. The `cli` module enforces `#![deny(clippy::unwrap_used)]`.
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.
//! - **True invariants**: If a panic represents a bug (logic error), use `.expect("INVARIANT: reason")`.
//!
//! ## Examples
//! ```rust
//! use pystep::{generate, Step};
//!
//! let source = generate(&[
//!     Step::import("sys"),
//!     Step::blank(),
//!     Step::if_("len(sys.argv) > 1", vec![Step::expr("print(sys.argv[1])")]),
//! ])
//! .unwrap();
//! assert_eq!(source, "import sys\n\nif len(sys.argv) > 1:\n    print(sys.argv[1])");
//! ```

pub mod cli;
pub mod config;
pub mod context;
pub mod dispatch;
pub mod emitter;
pub mod errors;
mod handlers;
pub mod lines;
pub mod registry;

pub use pystep_syntax::{self as syntax, decode_program, decode_step, tags, CustomStep, Program, Step, StepPath};

pub use config::{EmitConfig, EmptyBodyPolicy, Indent, LineEnding, MAX_INDENT_WIDTH};
pub use context::EmitContext;
pub use emitter::{generate, Emitter};
pub use errors::{EmitError, EmitErrorKind, EmitResult};
pub use lines::{Line, LineKind};
pub use registry::{register, Handler, HandlerRegistry};
