pub mod context;
pub mod diagnostic;
pub mod emitter;
pub mod error;
pub mod resolver;

pub use context::{Context, ContextOptions, TransformOutput};
pub use diagnostic::{Diagnostic, Level};
pub use error::TransformError;
pub use resolver::{BlockResolver, Resolution};
