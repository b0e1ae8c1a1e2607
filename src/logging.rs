//! Logging for the store, the file loader and the writer thread.
//!
//! Forwards to `tracing` with the `logging` feature and expands to nothing
//! without it. Arguments vanish in the no-op form, so callers only log values
//! they also use elsewhere.

#[cfg(feature = "logging")]
macro_rules! puffer_trace {
    ($($arg:tt)*) => { tracing::trace!($($arg)*) }
}

#[cfg(not(feature = "logging"))]
macro_rules! puffer_trace {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "logging")]
macro_rules! puffer_debug {
    ($($arg:tt)*) => { tracing::debug!($($arg)*) }
}

#[cfg(not(feature = "logging"))]
macro_rules! puffer_debug {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "logging")]
macro_rules! puffer_info {
    ($($arg:tt)*) => { tracing::info!($($arg)*) }
}

#[cfg(not(feature = "logging"))]
macro_rules! puffer_info {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "logging")]
macro_rules! puffer_warn {
    ($($arg:tt)*) => { tracing::warn!($($arg)*) }
}

#[cfg(not(feature = "logging"))]
macro_rules! puffer_warn {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "logging")]
macro_rules! puffer_error {
    ($($arg:tt)*) => { tracing::error!($($arg)*) }
}

#[cfg(not(feature = "logging"))]
macro_rules! puffer_error {
    ($($arg:tt)*) => {};
}

pub(crate) use puffer_debug as debug;
pub(crate) use puffer_error as error;
pub(crate) use puffer_info as info;
pub(crate) use puffer_trace as trace;
pub(crate) use puffer_warn as warn;
