use std::error::Error as StdError;

use bytes::Bytes;
use futures_util::stream::once;
use http_body_util::{BodyExt, LengthLimitError, Limited};
use multer::Multipart;
use reqctx_core::RequestContext;
use reqctx_core::error::{FormBodyError, FormTooLarge};
use reqctx_core::request::{FormData, PathParams, RequestHead};
use reqctx_core::response::{Response, ResponseWriter};
use tracing::debug;

use crate::config::ContextConfig;

/// A request context backed by the [`http`] crate types.
///
/// The form is read when the context is created: the URL query string always,
/// and the request body for `POST`, `PUT` and `PATCH` requests sent as
/// `application/x-www-form-urlencoded` or `multipart/form-data`. Only the
/// text parts of a multipart body are kept; file uploads are skipped.
///
/// # Examples
///
/// ```
/// use bytes::Bytes;
/// use http_body_util::Full;
/// use reqctx::config::ContextConfig;
/// use reqctx::{Context, HttpContext};
///
/// # #[tokio::main]
/// # async fn main() -> reqctx::Result<()> {
/// let request = http::Request::post("/orders?page=2")
///     .header(http::header::CONTENT_TYPE, "application/x-www-form-urlencoded")
///     .body(Full::new(Bytes::from("quantity=3")))
///     .unwrap();
///
/// let ctx = Context::new(HttpContext::from_request(request, &ContextConfig::default()).await?);
/// assert_eq!(ctx.form_value_isize("quantity")?, 3);
/// assert_eq!(ctx.form_value_isize("page")?, 2);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpContext {
    head: RequestHead,
    form: FormData,
    path_params: PathParams,
    response: ResponseWriter,
}

impl HttpContext {
    /// Creates a context from an already parsed form.
    #[must_use]
    pub fn from_parts(head: RequestHead, form: FormData) -> Self {
        Self {
            head,
            form,
            path_params: PathParams::new(),
            response: ResponseWriter::new(),
        }
    }

    /// Creates a context from a request, reading its form body into memory.
    ///
    /// # Errors
    ///
    /// Throws an error if the body is larger than
    /// [`ContextConfig::max_form_size`], if it could not be read, or if it is
    /// not a well-formed multipart body.
    pub async fn from_request<B>(
        request: http::Request<B>,
        config: &ContextConfig,
    ) -> crate::Result<Self>
    where
        B: http_body::Body,
        B::Error: Into<Box<dyn StdError + Send + Sync>>,
    {
        let (head, body) = request.into_parts();

        let mut form = match FormBody::of(&head) {
            Some(kind) => {
                let bytes = read_body(body, config.max_form_size).await?;
                kind.parse(bytes).await?
            }
            None => FormData::new(),
        };
        if config.query_in_form {
            append_query(&mut form, &head);
        }
        debug!(
            method = %head.method,
            uri = %head.uri,
            fields = form.len(),
            "request form parsed"
        );

        Ok(Self::from_parts(head, form))
    }

    /// Sets the path parameters matched by the router.
    #[must_use]
    pub fn with_path_params(mut self, path_params: PathParams) -> Self {
        self.path_params = path_params;
        self
    }

    /// Returns the path parameters, for modification.
    pub fn path_params_mut(&mut self) -> &mut PathParams {
        &mut self.path_params
    }

    /// Returns the form values, for modification.
    pub fn form_mut(&mut self) -> &mut FormData {
        &mut self.form
    }

    /// Converts the written response into an [`http::Response`].
    #[must_use]
    pub fn into_response(self) -> Response {
        self.response.into_response()
    }
}

impl RequestContext for HttpContext {
    fn request(&self) -> &RequestHead {
        &self.head
    }

    fn form(&self) -> &FormData {
        &self.form
    }

    fn path_params(&self) -> &PathParams {
        &self.path_params
    }

    fn response(&self) -> &ResponseWriter {
        &self.response
    }

    fn response_mut(&mut self) -> &mut ResponseWriter {
        &mut self.response
    }
}

pub(crate) fn append_query(form: &mut FormData, head: &RequestHead) {
    if let Some(query) = head.uri.query() {
        form.extend_urlencoded(query.as_bytes());
    }
}

enum FormBody {
    UrlEncoded,
    Multipart { boundary: String },
}

impl FormBody {
    fn of(head: &RequestHead) -> Option<Self> {
        let has_body = head.method == http::Method::POST
            || head.method == http::Method::PUT
            || head.method == http::Method::PATCH;
        if !has_body {
            return None;
        }

        let content_type = head
            .headers
            .get(http::header::CONTENT_TYPE)?
            .to_str()
            .ok()?;
        let mime: mime::Mime = content_type.parse().ok()?;

        if mime.essence_str() == mime::APPLICATION_WWW_FORM_URLENCODED.essence_str() {
            Some(Self::UrlEncoded)
        } else if mime.type_() == mime::MULTIPART && mime.subtype() == mime::FORM_DATA {
            let boundary = multer::parse_boundary(content_type).ok()?;
            Some(Self::Multipart { boundary })
        } else {
            None
        }
    }

    async fn parse(self, bytes: Bytes) -> crate::Result<FormData> {
        match self {
            Self::UrlEncoded => Ok(FormData::from_urlencoded(&bytes)),
            Self::Multipart { boundary } => parse_multipart(bytes, boundary).await,
        }
    }
}

async fn read_body<B>(body: B, limit: usize) -> crate::Result<Bytes>
where
    B: http_body::Body,
    B::Error: Into<Box<dyn StdError + Send + Sync>>,
{
    match Limited::new(body, limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(error) if error.is::<LengthLimitError>() => Err(FormTooLarge { limit }.into()),
        Err(error) => Err(FormBodyError(error).into()),
    }
}

async fn parse_multipart(bytes: Bytes, boundary: String) -> crate::Result<FormData> {
    let stream = once(async move { Ok::<_, std::convert::Infallible>(bytes) });
    let mut multipart = Multipart::new(stream, boundary);

    let mut form = FormData::new();
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.file_name().is_some() {
            continue;
        }
        let Some(name) = field.name().map(ToOwned::to_owned) else {
            continue;
        };
        let value = field.text().await.map_err(multipart_error)?;
        form.append(name, value);
    }
    Ok(form)
}

fn multipart_error(error: multer::Error) -> reqctx_core::Error {
    FormBodyError(Box::new(error)).into()
}
