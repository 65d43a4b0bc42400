//! Persisted formats for vartrace
//!
//! Two formats cross the process boundary:
//!
//! - the **trace format**: a tabular encoding of an annotation tree, one row
//!   per annotated range (`path;start;end;condition;style`), in the two
//!   flavors [`TraceFlavor::ProductLine`] (`.spl.csv`) and
//!   [`TraceFlavor::Variant`] (`.variant.csv`)
//! - the **configuration format**: a JSON object naming a variant and its
//!   selected features
//!
//! Round-trip behavior is part of the contract: parse→render→parse yields an
//! equal tree, and render→parse→render is byte-identical from the second
//! render on (condition normalization may rewrite spelling once).

#![warn(unreachable_pub)]

mod config;
mod error;
mod trace;

pub use config::{read_configuration, write_configuration};
pub use error::TraceIoError;
pub use trace::{
    parse_trace, read_trace, render_trace, write_trace, TraceFlavor, TRACE_HEADER,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
