//! Layer plumbing between the codec and caller-owned streams.

pub(crate) mod body_reader;
pub(crate) mod body_sink;
pub(crate) mod cancel;
pub(crate) mod metered;
