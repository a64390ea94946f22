//! Configuration for building request contexts.
//!
//! The main struct in this module is [`ContextConfig`]. After creating an
//! instance using [`ContextConfig::from_toml`] or [`ContextConfigBuilder`],
//! it can be passed to [`HttpContext::from_request`](crate::HttpContext::from_request).

// the config might be extended with non-Copy types in the future, so to avoid
// breaking backwards compatibility, we're not implementing Copy for it
#![allow(missing_copy_implementations)]

use derive_builder::Builder;
use reqctx_core::impl_into_error;
use serde::{Deserialize, Serialize};

/// Default limit for a buffered form body: 10 MiB.
pub const DEFAULT_MAX_FORM_SIZE: usize = 10 << 20;

/// How request contexts read submitted forms.
///
/// # Examples
///
/// ```
/// use reqctx::config::ContextConfig;
///
/// let config = ContextConfig::from_toml(
///     r#"
/// max_form_size = 1024
/// "#,
/// )?;
///
/// assert_eq!(config.max_form_size, 1024);
/// assert!(config.query_in_form);
/// # Ok::<(), reqctx::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Builder, Serialize, Deserialize)]
#[builder(build_fn(skip, error = std::convert::Infallible))]
#[serde(default)]
pub struct ContextConfig {
    /// The maximum size, in bytes, of a form body that is read into memory.
    ///
    /// Larger bodies are rejected with 413 Payload Too Large.
    ///
    /// # Examples
    ///
    /// ```
    /// use reqctx::config::ContextConfig;
    ///
    /// let config = ContextConfig::builder().max_form_size(64 * 1024).build();
    /// assert_eq!(config.max_form_size, 65536);
    /// ```
    pub max_form_size: usize,
    /// Whether the pairs of the URL query string are visible as form fields.
    ///
    /// Values submitted in the request body take precedence over query
    /// values with the same name.
    ///
    /// # Examples
    ///
    /// ```
    /// use reqctx::config::ContextConfig;
    ///
    /// let config = ContextConfig::builder().query_in_form(false).build();
    /// assert!(!config.query_in_form);
    /// ```
    pub query_in_form: bool,
}

impl Default for ContextConfig {
    fn default() -> Self {
        ContextConfig::builder().build()
    }
}

impl ContextConfig {
    /// Create a new [`ContextConfigBuilder`] to build a [`ContextConfig`].
    #[must_use]
    pub fn builder() -> ContextConfigBuilder {
        ContextConfigBuilder::default()
    }

    /// Create a new [`ContextConfig`] from a TOML string.
    ///
    /// Missing keys take their default values.
    ///
    /// # Errors
    ///
    /// This function will return an error if the TOML fails to parse as a
    /// [`ContextConfig`].
    pub fn from_toml(toml_content: &str) -> crate::Result<ContextConfig> {
        let config: ContextConfig = toml::from_str(toml_content).map_err(ConfigParseError)?;
        Ok(config)
    }
}

impl ContextConfigBuilder {
    /// Builds the context configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use reqctx::config::{ContextConfig, DEFAULT_MAX_FORM_SIZE};
    ///
    /// let config = ContextConfig::builder().build();
    /// assert_eq!(config.max_form_size, DEFAULT_MAX_FORM_SIZE);
    /// ```
    #[must_use]
    pub fn build(&self) -> ContextConfig {
        ContextConfig {
            max_form_size: self.max_form_size.unwrap_or(DEFAULT_MAX_FORM_SIZE),
            query_in_form: self.query_in_form.unwrap_or(true),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("could not parse the context config: {0}")]
struct ConfigParseError(#[from] toml::de::Error);
impl_into_error!(ConfigParseError);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ContextConfig::default();

        assert_eq!(config.max_form_size, 10 * 1024 * 1024);
        assert!(config.query_in_form);
    }

    #[test]
    fn from_toml_all_fields() {
        let config = ContextConfig::from_toml(
            r#"
            max_form_size = 2048
            query_in_form = false
            "#,
        )
        .unwrap();

        assert_eq!(
            config,
            ContextConfig::builder()
                .max_form_size(2048)
                .query_in_form(false)
                .build()
        );
    }

    #[test]
    fn from_toml_empty() {
        let config = ContextConfig::from_toml("").unwrap();

        assert_eq!(config, ContextConfig::default());
    }

    #[test]
    fn from_toml_invalid() {
        let error = ContextConfig::from_toml("max_form_size = \"big\"").unwrap_err();

        assert!(
            error
                .to_string()
                .starts_with("could not parse the context config")
        );
        assert_eq!(
            error.status_code(),
            reqctx_core::StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
