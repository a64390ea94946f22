//! HTTP header constants.
//!
//! This module provides the content type header values used when reading
//! forms and writing responses.

pub const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";
pub const URLENCODED_FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
