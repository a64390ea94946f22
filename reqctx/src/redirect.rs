//! Redirects that survive clients ignoring the `Location` header.
//!
//! An [`HtmlRedirect`] sends the usual redirect status and `Location` header,
//! and in addition an HTML body that redirects again with a meta refresh tag
//! and, failing that, with a script calling `window.location.replace`.

use http::header::{CONTENT_TYPE, HeaderValue, LOCATION};
use reqctx_core::headers::HTML_CONTENT_TYPE;
use reqctx_core::impl_into_error;
use reqctx_core::response::{Response, ResponseWriter};
use tracing::{debug, warn};

use crate::StatusCode;

/// The status code is not a redirect status (300 to 308 inclusive).
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid redirect status code {0}")]
pub struct InvalidRedirectCode(pub u16);
impl_into_error!(InvalidRedirectCode);

/// A redirect written as status, header and HTML fallback body.
///
/// # Examples
///
/// ```
/// use reqctx::StatusCode;
/// use reqctx::redirect::HtmlRedirect;
///
/// let response = HtmlRedirect::new(302, "https://example.com")?.into_response();
///
/// assert_eq!(response.status(), StatusCode::FOUND);
/// assert_eq!(response.headers()["location"], "https://example.com");
/// # Ok::<(), reqctx::redirect::InvalidRedirectCode>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlRedirect {
    status: StatusCode,
    url: String,
}

impl HtmlRedirect {
    /// Creates a redirect to `url`.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidRedirectCode`] if `code` is outside 300..=308.
    pub fn new<T: Into<String>>(code: u16, url: T) -> Result<Self, InvalidRedirectCode> {
        if !(300..=308).contains(&code) {
            return Err(InvalidRedirectCode(code));
        }
        let status = StatusCode::from_u16(code).map_err(|_| InvalidRedirectCode(code))?;
        Ok(Self {
            status,
            url: url.into(),
        })
    }

    /// Returns the redirect status code.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the destination URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Renders the HTML fallback document.
    ///
    /// # Examples
    ///
    /// ```
    /// use reqctx::redirect::HtmlRedirect;
    ///
    /// let html = HtmlRedirect::new(303, "/done")?.html();
    /// assert_eq!(
    ///     html,
    ///     "<html><head><meta http-equiv='Refresh' content='0; URL=/done'></head>\
    ///      <body><script>window.location.replace('/done');</script></body></html>"
    /// );
    /// # Ok::<(), reqctx::redirect::InvalidRedirectCode>(())
    /// ```
    #[must_use]
    pub fn html(&self) -> String {
        format!(
            "<html><head><meta http-equiv='Refresh' content='0; URL={}'></head>\
             <body><script>window.location.replace('{}');</script></body></html>",
            escape_html_attribute(&self.url),
            escape_js_string(&self.url),
        )
    }

    /// Writes the redirect: content type and location headers, then the
    /// status, then the HTML body.
    pub fn write_to(&self, response: &mut ResponseWriter) {
        response.set_header(CONTENT_TYPE, HeaderValue::from_static(HTML_CONTENT_TYPE));
        match HeaderValue::from_str(&self.url) {
            Ok(location) => response.set_header(LOCATION, location),
            Err(error) => {
                warn!(url = %self.url, %error, "redirect URL is not a valid header value; sending without Location");
            }
        }
        response.write_status(self.status);
        response.write_body(self.html().as_bytes());
        debug!(status = %self.status, url = %self.url, "HTML redirect written");
    }

    /// Converts the redirect into a standalone response.
    #[must_use]
    pub fn into_response(self) -> Response {
        let mut response = ResponseWriter::new();
        self.write_to(&mut response);
        response.into_response()
    }
}

fn escape_html_attribute(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

fn escape_js_string(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\'' => escaped.push_str("\\'"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            // keeps `</script>` and HTML comments from closing the script element
            '<' | '>' | '&' | '\u{2028}' | '\u{2029}' => {
                escaped.push_str(&format!("\\u{:04X}", u32::from(c)));
            }
            c => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use tracing_test::traced_test;

    use super::*;

    #[test]
    fn rejects_codes_outside_redirect_range() {
        for code in [0, 200, 299, 309, 404, 500] {
            assert_eq!(
                HtmlRedirect::new(code, "https://example.com"),
                Err(InvalidRedirectCode(code))
            );
        }
    }

    #[test]
    fn accepts_every_redirect_code() {
        for code in 300..=308 {
            let redirect = HtmlRedirect::new(code, "/").unwrap();
            assert_eq!(redirect.status().as_u16(), code);
        }
    }

    #[test]
    fn invalid_code_error() {
        let error = reqctx_core::Error::from(InvalidRedirectCode(309));

        assert_eq!(error.to_string(), "invalid redirect status code 309");
        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn response_has_all_three_mechanisms() {
        let response = HtmlRedirect::new(307, "https://example.com/a?b=c")
            .unwrap()
            .into_response();

        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(response.headers()[LOCATION], "https://example.com/a?b=c");
        assert_eq!(response.headers()[CONTENT_TYPE], HTML_CONTENT_TYPE);
        let body = std::str::from_utf8(response.body()).unwrap();
        assert!(body.contains("<meta http-equiv='Refresh' content='0; URL=https://example.com/a?b=c'>"));
        assert!(body.contains("window.location.replace('https://example.com/a?b=c')"));
    }

    #[test]
    fn url_is_escaped_in_body() {
        let html = HtmlRedirect::new(302, "/x?a=1&b='</script>")
            .unwrap()
            .html();

        assert!(html.contains("URL=/x?a=1&amp;b=&#39;&lt;/script&gt;'"));
        assert!(html.contains("replace('/x?a=1\\u0026b=\\'\\u003C/script\\u003E')"));
        assert_eq!(html.matches("</script>").count(), 1);
    }

    #[test]
    #[traced_test]
    fn url_that_is_not_a_header_value() {
        let response = HtmlRedirect::new(302, "/line\nbreak")
            .unwrap()
            .into_response();

        assert!(response.headers().get(LOCATION).is_none());
        assert_eq!(response.status(), StatusCode::FOUND);
        assert!(logs_contain("sending without Location"));
    }
}
