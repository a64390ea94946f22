//! Error types shared by every request context.
//!
//! Specific failures are described by small [`thiserror`] types, which are
//! then converted into the general [`Error`] with the
//! [`impl_into_error!`](crate::impl_into_error) macro. The general error
//! remembers the HTTP status code the failure maps to, so a host can turn it
//! into a response without knowing the concrete error type.

use std::error::Error as StdError;
use std::fmt::{Debug, Display};
use std::ops::Deref;

use crate::StatusCode;

/// An error that can occur while handling a request.
pub struct Error {
    repr: Box<ErrorImpl>,
}

impl Error {
    /// Create a new error with a custom error message or error type.
    ///
    /// The error does not have a status code of its own. If in the chain of
    /// `Error` sources there is an error with a status code, it will be used
    /// instead; otherwise 500 Internal Server Error is reported.
    #[must_use]
    pub fn wrap<E>(error: E) -> Self
    where
        E: Into<Box<dyn StdError + Send + Sync + 'static>>,
    {
        Self {
            repr: Box::new(ErrorImpl {
                inner: error.into(),
                status_code: None,
            }),
        }
    }

    /// Create a new error associated with 500 Internal Server Error.
    ///
    /// # Examples
    ///
    /// ```
    /// use reqctx_core::{Error, StatusCode};
    ///
    /// let error = Error::internal("An error occurred");
    /// assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    /// ```
    #[must_use]
    pub fn internal<E>(error: E) -> Self
    where
        E: Into<Box<dyn StdError + Send + Sync + 'static>>,
    {
        Self::with_status(error, StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Create a new error with a specific HTTP status code.
    ///
    /// # Examples
    ///
    /// ```
    /// use reqctx_core::{Error, StatusCode};
    ///
    /// let error = Error::with_status("Invalid input", StatusCode::BAD_REQUEST);
    /// assert_eq!(error.status_code(), StatusCode::BAD_REQUEST);
    /// ```
    #[must_use]
    pub fn with_status<E>(error: E, status_code: StatusCode) -> Self
    where
        E: Into<Box<dyn StdError + Send + Sync + 'static>>,
    {
        let error = Self {
            repr: Box::new(ErrorImpl {
                inner: error.into(),
                status_code: Some(status_code),
            }),
        };
        Self::wrap(WithStatusCode(error))
    }

    /// Returns the HTTP status code associated with this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        self.inner()
            .repr
            .status_code
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Returns a reference to the first `Error` in the chain that carries a
    /// status code, or `self` if there is none.
    #[must_use]
    pub fn inner(&self) -> &Self {
        let mut error: &dyn StdError = self;
        while let Some(inner) = error.source() {
            if let Some(error) = inner.downcast_ref::<Self>()
                && !error.is_wrapper()
            {
                return error;
            }
            error = inner;
        }
        self
    }

    /// Returns `true` if this error was created with [`Error::wrap`] and so
    /// has no status code of its own.
    #[must_use]
    pub fn is_wrapper(&self) -> bool {
        self.repr.status_code.is_none()
    }

    /// Returns the concrete error this `Error` was created from, if it is of
    /// type `E`.
    ///
    /// # Examples
    ///
    /// ```
    /// use reqctx_core::Error;
    /// use reqctx_core::error::FormTooLarge;
    ///
    /// let error = Error::from(FormTooLarge { limit: 16 });
    /// assert_eq!(error.downcast_ref::<FormTooLarge>().unwrap().limit, 16);
    /// ```
    #[must_use]
    pub fn downcast_ref<E: StdError + 'static>(&self) -> Option<&E> {
        self.inner().repr.inner.downcast_ref::<E>()
    }

    /// Returns `true` if this error was created from an error of type `E`.
    #[must_use]
    pub fn is<E: StdError + 'static>(&self) -> bool {
        self.downcast_ref::<E>().is_some()
    }
}

impl Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Debug::fmt(&self.repr, f)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.repr.inner, f)
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.repr.inner.source()
    }
}

impl Deref for Error {
    type Target = dyn StdError + Send + Sync;

    fn deref(&self) -> &Self::Target {
        &*self.repr.inner
    }
}

#[derive(Debug)]
struct ErrorImpl {
    inner: Box<dyn StdError + Send + Sync>,
    status_code: Option<StatusCode>,
}

/// Indicates that the inner `Error` has a status code associated with it.
///
/// This `Error` has to be returned by `std::error::Error::source` to be able
/// to extract the status code.
#[derive(Debug)]
struct WithStatusCode(Error);

impl Display for WithStatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl StdError for WithStatusCode {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(&self.0)
    }
}

/// Implements `From<$error_ty>` for [`Error`], optionally with a status code
/// (500 Internal Server Error otherwise).
#[macro_export]
macro_rules! impl_into_error {
    ($error_ty:ty) => {
        impl From<$error_ty> for $crate::Error {
            fn from(err: $error_ty) -> Self {
                $crate::Error::internal(err)
            }
        }
    };
    ($error_ty:ty, $status_code:ident) => {
        impl From<$error_ty> for $crate::Error {
            fn from(err: $error_ty) -> Self {
                $crate::Error::with_status(err, $crate::StatusCode::$status_code)
            }
        }
    };
}
pub use impl_into_error;

/// The request body exceeds the configured form size limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("form body exceeds the limit of {limit} bytes")]
pub struct FormTooLarge {
    /// The limit, in bytes, that was exceeded.
    pub limit: usize,
}
impl_into_error!(FormTooLarge, PAYLOAD_TOO_LARGE);

/// The request body could not be read or decoded as a form.
#[derive(Debug, thiserror::Error)]
#[error("could not read form body: {0}")]
pub struct FormBodyError(#[source] pub Box<dyn StdError + Send + Sync + 'static>);
impl_into_error!(FormBodyError, BAD_REQUEST);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_new() {
        let inner = std::io::Error::other("server error");
        let error = Error::wrap(inner);

        assert!(StdError::source(&error).is_none());
        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn error_display() {
        let error = Error::internal(std::io::Error::other("server error"));

        assert_eq!(format!("{error}"), "server error");
    }

    #[test]
    fn error_with_status_propagation() {
        let error = Error::with_status("bad request", StatusCode::BAD_REQUEST);
        assert_eq!(error.status_code(), StatusCode::BAD_REQUEST);
        // wrapping again should not override the status code
        let wrapped = Error::wrap(error);

        assert!(wrapped.is_wrapper());
        assert_eq!(wrapped.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn error_inner_multiple_wrapped() {
        let error = Error::with_status("bad request", StatusCode::BAD_REQUEST);
        let wrapped_thrice = Error::wrap(Error::wrap(Error::wrap(error)));

        assert_eq!(wrapped_thrice.to_string(), "bad request");
        assert_eq!(
            wrapped_thrice.inner().status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn error_downcast() {
        let error = Error::from(FormTooLarge { limit: 1024 });

        assert!(error.is::<FormTooLarge>());
        assert!(!error.is::<FormBodyError>());
        assert_eq!(error.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(error.to_string(), "form body exceeds the limit of 1024 bytes");
    }

    #[test]
    fn form_body_error_source() {
        let error = FormBodyError(Box::new(std::io::Error::other("connection reset")));

        assert_eq!(
            error.source().map(ToString::to_string).as_deref(),
            Some("connection reset")
        );
        assert_eq!(Error::from(error).status_code(), StatusCode::BAD_REQUEST);
    }
}
