#![forbid(unsafe_code)]

//! Core: geometry shared by the wrapcap layout crates, plus the logging facade.

pub mod geometry;
pub mod logging;

pub use geometry::Size;

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{
    debug, debug_span, error, error_span, info, info_span, trace, trace_span, warn, warn_span,
};
