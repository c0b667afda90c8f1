//! Read entities definitions.

pub mod employment;
