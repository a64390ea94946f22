//! Typed accessors over a request context.
//!
//! [`Context`] decorates any [`RequestContext`] with accessors that read a
//! form field or a path parameter and convert it to the representation the
//! handler needs. Every form accessor has a path parameter counterpart with
//! the same behavior:
//!
//! | representation | strict                 | defaulted                 |
//! |----------------|------------------------|---------------------------|
//! | string         | [`Context::form_value`] | [`Context::form_value_or`] |
//! | `isize`        | [`Context::form_value_isize`] | [`Context::form_value_isize_or`] |
//! | `i64`          | [`Context::form_value_i64`] | [`Context::form_value_i64_or`] |
//! | `f64`          | [`Context::form_value_f64`] | [`Context::form_value_f64_or`] |
//! | `bool`         | [`Context::form_value_bool`] | [`Context::form_value_bool_or`] |
//!
//! Strict accessors return a [`FieldError`] when the field is absent or
//! malformed; defaulted ones return the given default instead. The trimmed,
//! base64 and calendar accessors never fail.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use reqctx_core::RequestContext;
use reqctx_core::request::{FormData, PathParams, RequestHead};
use reqctx_core::response::ResponseWriter;
use tracing::debug;

use crate::field::{FieldError, FieldSource, FieldValue};
use crate::redirect::{HtmlRedirect, InvalidRedirectCode};

/// A request context with typed field accessors.
///
/// `Context` implements [`RequestContext`] itself, so it can be passed
/// anywhere the wrapped context is expected.
///
/// # Examples
///
/// ```
/// use reqctx::Context;
/// use reqctx::test::TestContextBuilder;
///
/// let ctx = Context::new(
///     TestContextBuilder::post("/users/7")
///         .form_data(&[("age", " 42 "), ("admin", "t")])
///         .path_param("id", "7")
///         .build(),
/// );
///
/// assert_eq!(ctx.form_value_isize("age")?, 42);
/// assert!(ctx.form_value_bool_or("admin", false));
/// assert_eq!(ctx.param_i64("id")?, 7);
/// assert_eq!(ctx.form_value_isize_or("missing", 10), 10);
/// # Ok::<(), reqctx::field::FieldError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Context<C> {
    inner: C,
}

impl<C: RequestContext> Context<C> {
    /// Wraps a request context.
    #[must_use]
    pub fn new(inner: C) -> Self {
        Self { inner }
    }

    /// Returns the wrapped context.
    #[must_use]
    pub fn inner(&self) -> &C {
        &self.inner
    }

    /// Returns the wrapped context, for modification.
    pub fn inner_mut(&mut self) -> &mut C {
        &mut self.inner
    }

    /// Unwraps the context.
    #[must_use]
    pub fn into_inner(self) -> C {
        self.inner
    }

    fn field<'n>(&self, source: FieldSource, name: &'n str) -> FieldValue<'_, 'n> {
        let raw = match source {
            FieldSource::Form => self.inner.form_value(name),
            FieldSource::Path => self.inner.param(name),
        };
        FieldValue::new(source, name, raw)
    }

    /// Returns the field value as submitted, or `default` if it is absent or
    /// empty.
    #[must_use]
    pub fn form_value_or<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.field(FieldSource::Form, name).or(default)
    }

    /// Returns the field value without leading and trailing whitespace; an
    /// absent field yields an empty string.
    #[must_use]
    pub fn form_value_trim(&self, name: &str) -> &str {
        self.field(FieldSource::Form, name).trimmed()
    }

    /// Returns the trimmed field value decoded as URL-safe base64, or the
    /// trimmed value itself if it does not decode.
    #[must_use]
    pub fn form_value_base64(&self, name: &str) -> String {
        self.field(FieldSource::Form, name).base64()
    }

    /// Returns the field as an `isize`.
    ///
    /// # Errors
    ///
    /// [`FieldError::NotFound`] if the field is absent or blank,
    /// [`FieldError::Int`] if it is not a valid integer.
    pub fn form_value_isize(&self, name: &str) -> Result<isize, FieldError> {
        self.field(FieldSource::Form, name).parse_isize()
    }

    /// Returns the field as an `isize`, or `default` on any failure.
    #[must_use]
    pub fn form_value_isize_or(&self, name: &str, default: isize) -> isize {
        self.form_value_isize(name).unwrap_or(default)
    }

    /// Returns the field as an `i64`.
    ///
    /// # Errors
    ///
    /// [`FieldError::NotFound`] if the field is absent or blank,
    /// [`FieldError::Int`] if it is not a valid integer.
    pub fn form_value_i64(&self, name: &str) -> Result<i64, FieldError> {
        self.field(FieldSource::Form, name).parse_i64()
    }

    /// Returns the field as an `i64`, or `default` on any failure.
    #[must_use]
    pub fn form_value_i64_or(&self, name: &str, default: i64) -> i64 {
        self.form_value_i64(name).unwrap_or(default)
    }

    /// Returns the field as an `f64`.
    ///
    /// # Errors
    ///
    /// [`FieldError::NotFound`] if the field is absent or blank,
    /// [`FieldError::Float`] if it is not a valid number.
    pub fn form_value_f64(&self, name: &str) -> Result<f64, FieldError> {
        self.field(FieldSource::Form, name).parse_f64()
    }

    /// Returns the field as an `f64`, or `default` on any failure.
    #[must_use]
    pub fn form_value_f64_or(&self, name: &str, default: f64) -> f64 {
        self.form_value_f64(name).unwrap_or(default)
    }

    /// Returns the field as a `bool`.
    ///
    /// # Errors
    ///
    /// [`FieldError::NotFound`] if the field is absent or blank,
    /// [`FieldError::Bool`] if it is not an accepted boolean literal.
    pub fn form_value_bool(&self, name: &str) -> Result<bool, FieldError> {
        self.field(FieldSource::Form, name).parse_bool()
    }

    /// Returns the field as a `bool`, or `default` on any failure.
    #[must_use]
    pub fn form_value_bool_or(&self, name: &str, default: bool) -> bool {
        self.form_value_bool(name).unwrap_or(default)
    }

    /// Returns the field as a date, as sent by `<input type="date">`.
    ///
    /// An absent or malformed value yields [`ZERO_DATE`](crate::field::ZERO_DATE).
    #[must_use]
    pub fn form_value_date(&self, name: &str) -> NaiveDate {
        self.field(FieldSource::Form, name).date()
    }

    /// Returns the field as a time, as sent by `<input type="time">`.
    ///
    /// An absent or malformed value yields [`ZERO_TIME`](crate::field::ZERO_TIME).
    #[must_use]
    pub fn form_value_time(&self, name: &str) -> NaiveTime {
        self.field(FieldSource::Form, name).time()
    }

    /// Returns the field as a date and time, as sent by
    /// `<input type="datetime-local">`.
    ///
    /// An absent or malformed value yields
    /// [`ZERO_DATETIME`](crate::field::ZERO_DATETIME).
    #[must_use]
    pub fn form_value_datetime(&self, name: &str) -> NaiveDateTime {
        self.field(FieldSource::Form, name).datetime()
    }

    /// Returns the path parameter, or `default` if it is absent or empty.
    #[must_use]
    pub fn param_or<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.field(FieldSource::Path, name).or(default)
    }

    /// Returns the path parameter without leading and trailing whitespace.
    #[must_use]
    pub fn param_trim(&self, name: &str) -> &str {
        self.field(FieldSource::Path, name).trimmed()
    }

    /// Returns the trimmed path parameter decoded as URL-safe base64, or the
    /// trimmed value itself if it does not decode.
    #[must_use]
    pub fn param_base64(&self, name: &str) -> String {
        self.field(FieldSource::Path, name).base64()
    }

    /// Returns the path parameter as an `isize`.
    ///
    /// # Errors
    ///
    /// [`FieldError::NotFound`] if the parameter is absent or blank,
    /// [`FieldError::Int`] if it is not a valid integer.
    pub fn param_isize(&self, name: &str) -> Result<isize, FieldError> {
        self.field(FieldSource::Path, name).parse_isize()
    }

    /// Returns the path parameter as an `isize`, or `default` on any failure.
    #[must_use]
    pub fn param_isize_or(&self, name: &str, default: isize) -> isize {
        self.param_isize(name).unwrap_or(default)
    }

    /// Returns the path parameter as an `i64`.
    ///
    /// # Errors
    ///
    /// [`FieldError::NotFound`] if the parameter is absent or blank,
    /// [`FieldError::Int`] if it is not a valid integer.
    pub fn param_i64(&self, name: &str) -> Result<i64, FieldError> {
        self.field(FieldSource::Path, name).parse_i64()
    }

    /// Returns the path parameter as an `i64`, or `default` on any failure.
    #[must_use]
    pub fn param_i64_or(&self, name: &str, default: i64) -> i64 {
        self.param_i64(name).unwrap_or(default)
    }

    /// Returns the path parameter as an `f64`.
    ///
    /// # Errors
    ///
    /// [`FieldError::NotFound`] if the parameter is absent or blank,
    /// [`FieldError::Float`] if it is not a valid number.
    pub fn param_f64(&self, name: &str) -> Result<f64, FieldError> {
        self.field(FieldSource::Path, name).parse_f64()
    }

    /// Returns the path parameter as an `f64`, or `default` on any failure.
    #[must_use]
    pub fn param_f64_or(&self, name: &str, default: f64) -> f64 {
        self.param_f64(name).unwrap_or(default)
    }

    /// Returns the path parameter as a `bool`.
    ///
    /// # Errors
    ///
    /// [`FieldError::NotFound`] if the parameter is absent or blank,
    /// [`FieldError::Bool`] if it is not an accepted boolean literal.
    pub fn param_bool(&self, name: &str) -> Result<bool, FieldError> {
        self.field(FieldSource::Path, name).parse_bool()
    }

    /// Returns the path parameter as a `bool`, or `default` on any failure.
    #[must_use]
    pub fn param_bool_or(&self, name: &str, default: bool) -> bool {
        self.param_bool(name).unwrap_or(default)
    }

    /// Returns the path parameter as a `YYYY-MM-DD` date, or
    /// [`ZERO_DATE`](crate::field::ZERO_DATE).
    #[must_use]
    pub fn param_date(&self, name: &str) -> NaiveDate {
        self.field(FieldSource::Path, name).date()
    }

    /// Returns the path parameter as an `HH:MM` time, or
    /// [`ZERO_TIME`](crate::field::ZERO_TIME).
    #[must_use]
    pub fn param_time(&self, name: &str) -> NaiveTime {
        self.field(FieldSource::Path, name).time()
    }

    /// Returns the path parameter as a `YYYY-MM-DDTHH:MM` date and time, or
    /// [`ZERO_DATETIME`](crate::field::ZERO_DATETIME).
    #[must_use]
    pub fn param_datetime(&self, name: &str) -> NaiveDateTime {
        self.field(FieldSource::Path, name).datetime()
    }

    /// Redirects the client to `url` with the given status code.
    ///
    /// Besides the status and the `Location` header, an HTML body is written
    /// that repeats the redirect with a meta refresh tag and a script, for
    /// clients that ignore the header. See [`HtmlRedirect`].
    ///
    /// # Errors
    ///
    /// Returns [`InvalidRedirectCode`] if `code` is outside 300..=308; the
    /// response is left untouched in that case.
    pub fn redirect_html(&mut self, code: u16, url: &str) -> Result<(), InvalidRedirectCode> {
        let redirect = HtmlRedirect::new(code, url).inspect_err(|error| {
            debug!(%error, url, "refusing to redirect");
        })?;
        redirect.write_to(self.inner.response_mut());
        Ok(())
    }
}

impl<C: RequestContext> RequestContext for Context<C> {
    fn request(&self) -> &RequestHead {
        self.inner.request()
    }

    fn form(&self) -> &FormData {
        self.inner.form()
    }

    fn form_value(&self, name: &str) -> Option<&str> {
        self.inner.form_value(name)
    }

    fn path_params(&self) -> &PathParams {
        self.inner.path_params()
    }

    fn param(&self, name: &str) -> Option<&str> {
        self.inner.param(name)
    }

    fn response(&self) -> &ResponseWriter {
        self.inner.response()
    }

    fn response_mut(&mut self) -> &mut ResponseWriter {
        self.inner.response_mut()
    }
}

impl<C: RequestContext> From<C> for Context<C> {
    fn from(inner: C) -> Self {
        Self::new(inner)
    }
}
