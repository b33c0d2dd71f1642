//! Low-level binary buffer primitives for the sereal codec.

mod writer;

pub use writer::Writer;
