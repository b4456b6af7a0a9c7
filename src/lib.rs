//! Comment-driven conditional compilation for arbitrary text.
//!
//! Lines such as `// #if DEV` ... `// #endif` are resolved against an
//! [`Environment`] of symbols; inactive regions and the directive lines
//! themselves are removed, or blanked when line numbers must be kept.
//!
//! ```
//! use ppd::Context;
//!
//! let mut context = Context::default();
//! context.env.set("DEV", false);
//!
//! let code = context
//!     .transform("a\n// #if DEV\nb\n// #endif\nc", "app.js")
//!     .unwrap();
//! assert_eq!(code.as_deref(), Some("a\nc"));
//! ```

pub mod config;
pub mod directives;
pub mod driver;
pub mod engine;
pub mod env;
pub mod expr;
pub mod filter;
pub mod output;
pub mod scanner;

pub use directives::{DirectiveDescriptor, DirectiveRegistry};
pub use engine::{Context, ContextOptions, TransformError, TransformOutput};
pub use env::{Environment, Value};
