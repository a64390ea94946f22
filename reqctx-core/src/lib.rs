//! Core types for the reqctx request context layer.
//!
//! This crate defines the capability set a host framework has to provide for
//! a single in-flight request: reading form fields and path parameters, and
//! writing a response. The [`RequestContext`] trait is that capability set;
//! [`PathParams`](request::PathParams), [`FormData`](request::FormData) and
//! [`ResponseWriter`](response::ResponseWriter) are the per-request holders
//! a host can use to implement it.
//!
//! Most applications should use the main `reqctx` crate, which adds typed
//! accessors on top of any [`RequestContext`].

pub mod context;
pub mod error;
pub mod headers;
pub mod request;
pub mod response;

pub use context::RequestContext;
pub use error::Error;

/// A type alias for an HTTP status code.
pub type StatusCode = http::StatusCode;

/// A type alias for a result that can return an [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
