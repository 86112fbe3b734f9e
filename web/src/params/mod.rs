//! Typed parameters for endpoint inputs.
//!
//! Request bodies and query strings are deserialized into these types before any
//! handler logic runs. Text fields that must not be empty are checked here so that
//! nothing reaches the AI gateway or the extraction pipeline without them.

pub(crate) mod ai;
pub(crate) mod audio;
