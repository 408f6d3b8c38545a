//! Trait definitions for Coursewright generation backends.
//!
//! The structured output coercer never talks to a concrete API. It holds a
//! [`CoursewrightDriver`], so tests can substitute a scripted fake and the
//! binary can plug in an HTTP client.

mod driver;

pub use driver::CoursewrightDriver;
