//! The capability set of a single in-flight request.

use crate::request::{FormData, PathParams, RequestHead};
use crate::response::ResponseWriter;

/// Access to the data of one request and to the response being written for
/// it.
///
/// A host framework implements this trait for its per-request context. Code
/// that only needs these capabilities should be generic over
/// `C: RequestContext`, so that decorators such as `reqctx::Context` can be
/// substituted for the host's own type.
///
/// # Examples
///
/// ```
/// use reqctx_core::RequestContext;
///
/// fn greeting<C: RequestContext>(ctx: &C) -> String {
///     format!("Hello, {}!", ctx.form_value("name").unwrap_or("stranger"))
/// }
/// ```
pub trait RequestContext {
    /// Returns the head (method, URI, headers) of the request.
    #[must_use]
    fn request(&self) -> &RequestHead;

    /// Returns all submitted form values.
    #[must_use]
    fn form(&self) -> &FormData;

    /// Returns the first submitted value of a form field, or `None` if the
    /// field was not submitted.
    #[must_use]
    fn form_value(&self, name: &str) -> Option<&str> {
        self.form().get(name)
    }

    /// Returns the path parameters matched for this request.
    #[must_use]
    fn path_params(&self) -> &PathParams;

    /// Returns the value of a path parameter, or `None` if the route has no
    /// parameter with that name.
    #[must_use]
    fn param(&self, name: &str) -> Option<&str> {
        self.path_params().get(name)
    }

    /// Returns the response being written.
    #[must_use]
    fn response(&self) -> &ResponseWriter;

    /// Returns the response being written, for modification.
    fn response_mut(&mut self) -> &mut ResponseWriter;
}
