//! Parsing of raw field values into typed values.
//!
//! [`FieldValue`] wraps the string a context returned for a form field or a
//! path parameter and knows how to turn it into the representations the
//! accessors of [`Context`](crate::Context) offer. The failure behavior
//! differs per representation:
//!
//! * numbers and booleans fail loudly: an empty value is
//!   [`FieldError::NotFound`], a malformed one carries the parser's error,
//! * calendar values never fail: malformed input yields the type's zero value
//!   (see [`ZERO_DATE`], [`ZERO_TIME`], [`ZERO_DATETIME`]),
//! * base64 never fails: input that does not decode is returned unchanged.

use std::num::{ParseFloatError, ParseIntError};

use base64::engine::{GeneralPurpose, general_purpose};
use base64::{Engine, alphabet};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use derive_more::Display;
use reqctx_core::impl_into_error;
use tracing::trace;

/// Format of an HTML `<input type="date">` value.
pub const DATE_FORMAT: &str = "%Y-%m-%d";
/// Format of an HTML `<input type="time">` value, 24-hour clock.
pub const TIME_FORMAT: &str = "%H:%M";
/// Format of an HTML `<input type="datetime-local">` value.
pub const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Returned by the date-time accessors when the value cannot be parsed.
pub const ZERO_DATETIME: NaiveDateTime = DateTime::<Utc>::UNIX_EPOCH.naive_utc();
/// Returned by the date accessors when the value cannot be parsed.
pub const ZERO_DATE: NaiveDate = ZERO_DATETIME.date();
/// Returned by the time accessors when the value cannot be parsed.
pub const ZERO_TIME: NaiveTime = NaiveTime::MIN;

// `0` stands for any ASCII digit, every other byte must match exactly
const DATE_LAYOUT: &str = "0000-00-00";
const TIME_LAYOUT: &str = "00:00";
const DATETIME_LAYOUT: &str = "0000-00-00T00:00";

/// URL-safe alphabet with padding; non-zero trailing bits are accepted.
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    general_purpose::PAD.with_decode_allow_trailing_bits(true),
);

/// Where a field value comes from.
#[derive(Debug, Display, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FieldSource {
    /// A submitted form field (request body or URL query).
    #[display("form field")]
    Form,
    /// A named segment of the matched route path.
    #[display("path parameter")]
    Path,
}

/// An error returned by the strict accessors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum FieldError {
    /// The field is absent, or present with nothing but whitespace.
    #[error("{kind} `{name}` not found")]
    NotFound {
        /// Where the field was looked up.
        kind: FieldSource,
        /// The name of the field.
        name: String,
    },
    /// The value is not a valid integer.
    #[error(transparent)]
    Int(#[from] ParseIntError),
    /// The value is not a valid floating point number.
    #[error(transparent)]
    Float(#[from] ParseFloatError),
    /// The value is not a valid boolean.
    #[error(transparent)]
    Bool(#[from] ParseBoolError),
}

impl FieldError {
    /// Returns `true` if the field was absent or empty.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<FieldError> for reqctx_core::Error {
    fn from(err: FieldError) -> Self {
        let status = if err.is_not_found() {
            reqctx_core::StatusCode::NOT_FOUND
        } else {
            reqctx_core::StatusCode::BAD_REQUEST
        };
        reqctx_core::Error::with_status(err, status)
    }
}

/// The value is not one of the accepted boolean literals.
///
/// Accepted literals are `1`, `t`, `T`, `TRUE`, `true`, `True` and `0`, `f`,
/// `F`, `FALSE`, `false`, `False`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid boolean literal `{value}`")]
pub struct ParseBoolError {
    value: String,
}
impl_into_error!(ParseBoolError, BAD_REQUEST);

/// Parses a boolean from its canonical textual forms.
///
/// # Errors
///
/// Returns [`ParseBoolError`] if `value` is not one of the accepted literals.
///
/// # Examples
///
/// ```
/// use reqctx::field::parse_bool;
///
/// assert_eq!(parse_bool("T"), Ok(true));
/// assert_eq!(parse_bool("0"), Ok(false));
/// assert!(parse_bool("yes").is_err());
/// ```
pub fn parse_bool(value: &str) -> Result<bool, ParseBoolError> {
    match value {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => Err(ParseBoolError {
            value: value.to_owned(),
        }),
    }
}

/// A raw field value, as returned by a request context.
///
/// # Examples
///
/// ```
/// use reqctx::field::{FieldSource, FieldValue};
///
/// let value = FieldValue::new(FieldSource::Form, "age", Some(" 42 "));
/// assert_eq!(value.trimmed(), "42");
/// assert_eq!(value.parse_isize(), Ok(42));
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FieldValue<'v, 'n> {
    source: FieldSource,
    name: &'n str,
    raw: &'v str,
}

impl<'v, 'n> FieldValue<'v, 'n> {
    /// Creates a field value; an absent field is treated as an empty string.
    #[must_use]
    pub fn new(source: FieldSource, name: &'n str, raw: Option<&'v str>) -> Self {
        Self {
            source,
            name,
            raw: raw.unwrap_or_default(),
        }
    }

    /// Returns where the value comes from.
    #[must_use]
    pub fn source(&self) -> FieldSource {
        self.source
    }

    /// Returns the field name.
    #[must_use]
    pub fn name(&self) -> &'n str {
        self.name
    }

    /// Returns the value exactly as submitted.
    #[must_use]
    pub fn raw(&self) -> &'v str {
        self.raw
    }

    /// Returns the value, or `default` if it is empty.
    #[must_use]
    pub fn or<'b>(&self, default: &'b str) -> &'b str
    where
        'v: 'b,
    {
        if self.raw.is_empty() {
            default
        } else {
            self.raw
        }
    }

    /// Returns the value without leading and trailing whitespace.
    #[must_use]
    pub fn trimmed(&self) -> &'v str {
        self.raw.trim()
    }

    /// Decodes the trimmed value as URL-safe base64.
    ///
    /// If the value is not valid base64, or does not decode to UTF-8 text, the
    /// trimmed value is returned unchanged.
    #[must_use]
    pub fn base64(&self) -> String {
        let value = self.trimmed();
        match URL_SAFE_LENIENT.decode(value) {
            Ok(decoded) => match String::from_utf8(decoded) {
                Ok(text) => text,
                Err(error) => {
                    trace!(name = self.name, %error, "decoded base64 is not text; keeping value");
                    value.to_owned()
                }
            },
            Err(error) => {
                trace!(name = self.name, %error, "value is not base64; keeping value");
                value.to_owned()
            }
        }
    }

    fn non_empty(&self) -> Result<&'v str, FieldError> {
        let value = self.trimmed();
        if value.is_empty() {
            return Err(FieldError::NotFound {
                kind: self.source,
                name: self.name.to_owned(),
            });
        }
        Ok(value)
    }

    /// Parses the trimmed value as a base-10 `isize`, the platform-sized
    /// integer.
    ///
    /// # Errors
    ///
    /// [`FieldError::NotFound`] if the value is empty, [`FieldError::Int`] if
    /// it is not a valid integer.
    pub fn parse_isize(&self) -> Result<isize, FieldError> {
        Ok(self.non_empty()?.parse()?)
    }

    /// Parses the trimmed value as a base-10 `i64`.
    ///
    /// # Errors
    ///
    /// [`FieldError::NotFound`] if the value is empty, [`FieldError::Int`] if
    /// it is not a valid integer.
    pub fn parse_i64(&self) -> Result<i64, FieldError> {
        Ok(self.non_empty()?.parse()?)
    }

    /// Parses the trimmed value as an `f64`.
    ///
    /// # Errors
    ///
    /// [`FieldError::NotFound`] if the value is empty, [`FieldError::Float`] if
    /// it is not a valid number.
    pub fn parse_f64(&self) -> Result<f64, FieldError> {
        Ok(self.non_empty()?.parse()?)
    }

    /// Parses the trimmed value with [`parse_bool`].
    ///
    /// # Errors
    ///
    /// [`FieldError::NotFound`] if the value is empty, [`FieldError::Bool`] if
    /// it is not an accepted boolean literal.
    pub fn parse_bool(&self) -> Result<bool, FieldError> {
        Ok(parse_bool(self.non_empty()?)?)
    }

    /// Parses the trimmed value as a `YYYY-MM-DD` date, or returns
    /// [`ZERO_DATE`].
    ///
    /// Every field must be zero-padded to its full width.
    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.calendar(DATE_LAYOUT, "date", |value| {
            NaiveDate::parse_from_str(value, DATE_FORMAT)
        })
        .unwrap_or(ZERO_DATE)
    }

    /// Parses the trimmed value as an `HH:MM` time, or returns [`ZERO_TIME`].
    ///
    /// Every field must be zero-padded to its full width.
    #[must_use]
    pub fn time(&self) -> NaiveTime {
        self.calendar(TIME_LAYOUT, "time", |value| {
            NaiveTime::parse_from_str(value, TIME_FORMAT)
        })
        .unwrap_or(ZERO_TIME)
    }

    /// Parses the trimmed value as a `YYYY-MM-DDTHH:MM` date and time, or
    /// returns [`ZERO_DATETIME`].
    ///
    /// Every field must be zero-padded to its full width.
    #[must_use]
    pub fn datetime(&self) -> NaiveDateTime {
        self.calendar(DATETIME_LAYOUT, "date-time", |value| {
            NaiveDateTime::parse_from_str(value, DATETIME_FORMAT)
        })
        .unwrap_or(ZERO_DATETIME)
    }

    fn calendar<T>(
        &self,
        layout: &str,
        what: &str,
        parse: impl FnOnce(&str) -> chrono::ParseResult<T>,
    ) -> Option<T> {
        let value = self.trimmed();
        if !matches_layout(value, layout) {
            trace!(
                name = self.name,
                value,
                layout,
                "{what} does not match layout; using zero value"
            );
            return None;
        }
        parse(value)
            .inspect_err(|error| {
                trace!(name = self.name, %error, "invalid {what}; using zero value");
            })
            .ok()
    }
}

fn matches_layout(value: &str, layout: &str) -> bool {
    value.len() == layout.len()
        && value
            .bytes()
            .zip(layout.bytes())
            .all(|(byte, expected)| match expected {
                b'0' => byte.is_ascii_digit(),
                expected => byte == expected,
            })
}

/// A value returned by the strict accessors when they fail.
pub trait Sentinel {
    /// The failure placeholder.
    const SENTINEL: Self;
}

impl Sentinel for isize {
    const SENTINEL: Self = -1;
}

impl Sentinel for i64 {
    const SENTINEL: Self = -1;
}

impl Sentinel for f64 {
    const SENTINEL: Self = -1.0;
}

impl Sentinel for bool {
    const SENTINEL: Self = false;
}

/// Extension methods for the results of the strict accessors.
pub trait FieldResultExt<T> {
    /// Returns the value, or [`Sentinel::SENTINEL`] (`-1` or `false`) on any
    /// failure.
    ///
    /// # Examples
    ///
    /// ```
    /// use reqctx::field::{FieldResultExt, FieldSource, FieldValue};
    ///
    /// let value = FieldValue::new(FieldSource::Form, "age", None);
    /// assert_eq!(value.parse_isize().or_sentinel(), -1);
    /// ```
    fn or_sentinel(self) -> T;
}

impl<T: Sentinel> FieldResultExt<T> for Result<T, FieldError> {
    fn or_sentinel(self) -> T {
        self.unwrap_or(T::SENTINEL)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Timelike;

    use super::*;

    fn form(raw: &str) -> FieldValue<'_, 'static> {
        FieldValue::new(FieldSource::Form, "field", Some(raw))
    }

    #[test]
    fn absent_value_is_empty() {
        let value = FieldValue::new(FieldSource::Path, "id", None);

        assert_eq!(value.raw(), "");
        assert_eq!(value.or("fallback"), "fallback");
    }

    #[test]
    fn or_keeps_whitespace_value() {
        assert_eq!(form(" ").or("fallback"), " ");
        assert_eq!(form("given").or("fallback"), "given");
    }

    #[test]
    fn trimmed() {
        assert_eq!(form("\t hello world \n").trimmed(), "hello world");
    }

    #[test]
    fn base64_decodes_url_safe() {
        let encoded = general_purpose::URL_SAFE.encode("subjects?_d=1");

        assert!(encoded.contains('_'));
        assert_eq!(form(&encoded).base64(), "subjects?_d=1");
    }

    #[test]
    fn base64_accepts_non_zero_trailing_bits() {
        assert_eq!(form("YR==").base64(), "a");
        assert_eq!(form("YQ==").base64(), "a");
    }

    #[test]
    fn base64_keeps_invalid_input() {
        assert_eq!(form("  not base64!  ").base64(), "not base64!");
        // valid base64, but not UTF-8 once decoded
        assert_eq!(form("_w==").base64(), "_w==");
    }

    #[test]
    fn parse_int_not_found() {
        let error = form("   ").parse_isize().unwrap_err();

        assert!(error.is_not_found());
        assert_eq!(error.to_string(), "form field `field` not found");
    }

    #[test]
    fn parse_int_malformed() {
        let error = form("abc").parse_i64().unwrap_err();

        assert_eq!(error, FieldError::Int("abc".parse::<i64>().unwrap_err()));
        assert_eq!(error.to_string(), "invalid digit found in string");
    }

    #[test]
    fn parse_numbers() {
        assert_eq!(form(" -17 ").parse_isize(), Ok(-17));
        assert_eq!(form("+8").parse_isize(), Ok(8));
        assert_eq!(form("9007199254740993").parse_i64(), Ok(9_007_199_254_740_993));
        assert_eq!(form("2.5").parse_f64(), Ok(2.5));
        assert_eq!(form("1e3").parse_f64(), Ok(1000.0));
    }

    #[test]
    fn parse_int_overflow() {
        assert!(matches!(
            form("9223372036854775808").parse_i64(),
            Err(FieldError::Int(_))
        ));
        assert!(matches!(
            form("99999999999999999999").parse_isize(),
            Err(FieldError::Int(_))
        ));
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn parse_int_is_pointer_width() {
        assert_eq!(form("4294967296").parse_isize(), Ok(4_294_967_296));
    }

    #[test]
    fn parse_bool_literals() {
        for literal in ["1", "t", "T", "TRUE", "true", "True"] {
            assert_eq!(parse_bool(literal), Ok(true), "{literal}");
        }
        for literal in ["0", "f", "F", "FALSE", "false", "False"] {
            assert_eq!(parse_bool(literal), Ok(false), "{literal}");
        }
        assert_eq!(
            parse_bool("tRuE").unwrap_err().to_string(),
            "invalid boolean literal `tRuE`"
        );
    }

    #[test]
    fn sentinel_on_failure() {
        assert_eq!(form("").parse_isize().or_sentinel(), -1);
        assert_eq!(form("x").parse_i64().or_sentinel(), -1);
        assert!((form("x").parse_f64().or_sentinel() + 1.0).abs() < f64::EPSILON);
        assert!(!form("yes").parse_bool().or_sentinel());
        assert!(form("true").parse_bool().or_sentinel());
    }

    #[test]
    fn calendar_values() {
        assert_eq!(
            form(" 2024-03-05 ").date(),
            NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()
        );
        let time = form("23:07").time();
        assert_eq!((time.hour(), time.minute()), (23, 7));
        assert_eq!(
            form("2024-03-05T08:30").datetime(),
            NaiveDate::from_ymd_opt(2024, 3, 5)
                .unwrap()
                .and_hms_opt(8, 30, 0)
                .unwrap()
        );
    }

    #[test]
    fn calendar_values_fall_back_to_zero() {
        assert_eq!(form("not-a-date").date(), ZERO_DATE);
        assert_eq!(form("2024-02-30").date(), ZERO_DATE);
        assert_eq!(form("25:00").time(), ZERO_TIME);
        assert_eq!(form("2024-03-05 08:30").datetime(), ZERO_DATETIME);
        assert_eq!(form("").datetime(), ZERO_DATETIME);
    }

    #[test]
    fn calendar_values_require_padded_fields() {
        assert_eq!(form("2024-3-5").date(), ZERO_DATE);
        assert_eq!(form("+2024-03-05").date(), ZERO_DATE);
        assert_eq!(form("2024- 3-05").date(), ZERO_DATE);
        assert_eq!(form("24-03-05").date(), ZERO_DATE);
        assert_eq!(form("9:5").time(), ZERO_TIME);
        assert_eq!(form("09:5").time(), ZERO_TIME);
        assert_eq!(form("2024-03-05T8:30").datetime(), ZERO_DATETIME);
        assert_eq!(form("2024-3-05T08:30").datetime(), ZERO_DATETIME);
    }

    #[test]
    fn zero_values_are_the_unix_epoch() {
        assert_eq!(ZERO_DATE, NaiveDate::from_ymd_opt(1970, 1, 1).unwrap());
        assert_eq!(ZERO_TIME, NaiveTime::from_hms_opt(0, 0, 0).unwrap());
        assert_eq!(ZERO_DATETIME, ZERO_DATE.and_time(ZERO_TIME));
    }

    #[test]
    fn field_error_status_codes() {
        let not_found = FieldError::NotFound {
            kind: FieldSource::Path,
            name: "id".to_owned(),
        };
        let error = reqctx_core::Error::from(not_found);
        assert_eq!(error.status_code(), reqctx_core::StatusCode::NOT_FOUND);
        assert_eq!(error.to_string(), "path parameter `id` not found");

        let malformed = form("nope").parse_bool().unwrap_err();
        let error = reqctx_core::Error::from(malformed);
        assert_eq!(error.status_code(), reqctx_core::StatusCode::BAD_REQUEST);
    }
}
