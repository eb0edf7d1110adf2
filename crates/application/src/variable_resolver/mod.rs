//! Template binding
//!
//! Substitutes `{{name}}` placeholders in step URLs, headers and bodies with
//! values from the capture table or built-in generators.

pub mod builtins;
pub mod engine;

pub use builtins::BuiltinValues;
pub use engine::TemplateEngine;
