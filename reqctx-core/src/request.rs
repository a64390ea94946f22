//! Per-request data a context reads from.

use indexmap::IndexMap;

/// HTTP request head type.
pub type RequestHead = http::request::Parts;

/// Path parameters extracted from the request URL by the host router.
///
/// # Examples
///
/// ```
/// use reqctx_core::request::PathParams;
///
/// let mut path_params = PathParams::new();
/// path_params.insert("id".into(), "42".into());
/// assert_eq!(path_params.get("id"), Some("42"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams {
    params: IndexMap<String, String>,
}

impl PathParams {
    /// Creates a new, empty [`PathParams`] instance.
    #[must_use]
    pub fn new() -> Self {
        Self {
            params: IndexMap::new(),
        }
    }

    /// Inserts a new path parameter, replacing any previous value.
    pub fn insert(&mut self, name: String, value: String) {
        self.params.insert(name, value);
    }

    /// Iterates over the path parameters in the order they were matched.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Returns the number of path parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Returns `true` if there are no path parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Returns the value of a path parameter.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PathParams {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            params: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        }
    }
}

/// Submitted form values, keyed by field name.
///
/// A field may be submitted more than once; [`FormData::get`] returns the
/// first value, in the order the values were appended.
///
/// # Examples
///
/// ```
/// use reqctx_core::request::FormData;
///
/// let form = FormData::from_urlencoded(b"tag=a&tag=b&name=John+Doe");
/// assert_eq!(form.get("tag"), Some("a"));
/// assert_eq!(form.get_all("tag"), ["a", "b"]);
/// assert_eq!(form.get("name"), Some("John Doe"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    values: IndexMap<String, Vec<String>>,
}

impl FormData {
    /// Creates a new, empty [`FormData`] instance.
    #[must_use]
    pub fn new() -> Self {
        Self {
            values: IndexMap::new(),
        }
    }

    /// Parses `application/x-www-form-urlencoded` data.
    #[must_use]
    pub fn from_urlencoded(bytes: &[u8]) -> Self {
        let mut form = Self::new();
        form.extend_urlencoded(bytes);
        form
    }

    /// Appends all pairs of `application/x-www-form-urlencoded` data after
    /// the values already present.
    pub fn extend_urlencoded(&mut self, bytes: &[u8]) {
        for (name, value) in form_urlencoded::parse(bytes) {
            self.append(name.into_owned(), value.into_owned());
        }
    }

    /// Appends a value to a field.
    pub fn append(&mut self, name: String, value: String) {
        self.values.entry(name).or_default().push(value);
    }

    /// Returns the first value submitted for a field.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .get(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Returns every value submitted for a field.
    #[must_use]
    pub fn get_all(&self, name: &str) -> &[String] {
        self.values
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Iterates over the field names and their values.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.values
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    /// Returns the number of distinct field names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if no field was submitted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormData {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut form = Self::new();
        for (name, value) in iter {
            form.append(name.into(), value.into());
        }
        form
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_params() {
        let mut path_params = PathParams::new();
        path_params.insert("name".into(), "world".into());

        assert_eq!(path_params.get("name"), Some("world"));
        assert_eq!(path_params.get("missing"), None);
        assert_eq!(path_params.len(), 1);
    }

    #[test]
    fn path_params_from_iter_keeps_order() {
        let path_params: PathParams = [("user", "7"), ("post", "12")].into_iter().collect();

        let pairs: Vec<_> = path_params.iter().collect();
        assert_eq!(pairs, vec![("user", "7"), ("post", "12")]);
    }

    #[test]
    fn form_data_urlencoded() {
        let form = FormData::from_urlencoded(b"hello=world&foo=bar%20baz&empty=");

        assert_eq!(form.get("hello"), Some("world"));
        assert_eq!(form.get("foo"), Some("bar baz"));
        assert_eq!(form.get("empty"), Some(""));
        assert_eq!(form.get("missing"), None);
        assert_eq!(form.len(), 3);
    }

    #[test]
    fn form_data_extend_appends_after_existing() {
        let mut form = FormData::from_urlencoded(b"id=body");
        form.extend_urlencoded(b"id=query&page=2");

        assert_eq!(form.get("id"), Some("body"));
        assert_eq!(form.get_all("id"), ["body", "query"]);
        assert_eq!(form.get("page"), Some("2"));
    }

    #[test]
    fn form_data_get_all_missing() {
        let form = FormData::new();

        assert!(form.is_empty());
        assert!(form.get_all("missing").is_empty());
    }
}
