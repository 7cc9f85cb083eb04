//! Dotted schema paths, e.g. `response.200.body.items[].name`.

use std::fmt;

/// A schema path as it appears in finding messages.
///
/// Built by repeatedly [`SchemaPath::field`]-ing into an initial root
/// (`"request.body"` or `"response.<status>.body"`), with
/// [`SchemaPath::array`] appending the `[]` array marker. Cheap to clone;
/// every recursive step in [`crate::schema::compare_schema`] clones the
/// parent path before extending it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaPath(String);

impl SchemaPath {
    /// Starts a new path at the given root, e.g. `"request.body"`.
    pub fn root(root: impl Into<String>) -> Self {
        Self(root.into())
    }

    /// Returns a new path with `.field` appended.
    pub fn field(&self, field: &str) -> Self {
        Self(format!("{}.{field}", self.0))
    }

    /// Returns a new path with the `[]` array marker appended.
    pub fn array(&self) -> Self {
        Self(format!("{}[]", self.0))
    }

    /// Borrows the path as a plain string, for building finding messages.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SchemaPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_dotted_paths() {
        let root = SchemaPath::root("response.200.body");
        let child = root.field("items").array().field("name");
        assert_eq!(child.as_str(), "response.200.body.items[].name");
        // root is untouched by the chained calls above
        assert_eq!(root.as_str(), "response.200.body");
    }
}
