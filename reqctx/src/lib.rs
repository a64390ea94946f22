//! Typed access to form fields and path parameters of a request.
//!
//! `reqctx` wraps a request context, anything implementing
//! [`RequestContext`], in a [`Context`] that reads form fields and path
//! parameters as trimmed strings, base64-decoded strings, integers, floats,
//! booleans, dates and times, with or without a default value. It also
//! provides [`Context::redirect_html`], a redirect that keeps working for
//! clients that ignore the `Location` header.
//!
//! [`HttpContext`] is a request context built from [`http::Request`], which
//! can be used with any server based on the `http` crate.
//!
//! # Examples
//!
//! ```
//! use reqctx::Context;
//! use reqctx::test::TestContextBuilder;
//!
//! let mut ctx = Context::new(
//!     TestContextBuilder::post("/articles/42")
//!         .form_data(&[("title", "  Hello  "), ("published", "2024-03-05")])
//!         .path_param("id", "42")
//!         .build(),
//! );
//!
//! assert_eq!(ctx.form_value_trim("title"), "Hello");
//! assert_eq!(ctx.param_i64_or("id", 0), 42);
//! assert_eq!(ctx.form_value_date("published").to_string(), "2024-03-05");
//!
//! ctx.redirect_html(303, "/articles/42")?;
//! let response = ctx.into_inner().into_response();
//! assert_eq!(response.status(), reqctx::StatusCode::SEE_OTHER);
//! # Ok::<(), reqctx::redirect::InvalidRedirectCode>(())
//! ```

pub mod config;
mod context;
pub mod field;
mod http_context;
pub mod redirect;

pub use context::Context;
pub use http_context::HttpContext;
pub use reqctx_core::{Error, RequestContext, Result, StatusCode, headers, request, response};
