//! Patch document codecs.

pub mod json;
