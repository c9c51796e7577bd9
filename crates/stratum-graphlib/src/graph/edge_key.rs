//! Edge identity.
//!
//! An edge is identified by its endpoints and an optional name. Names only matter in
//! multigraphs; undirected graphs store endpoints in lexical order.

use std::fmt;
use std::hash::{Hash, Hasher};

/// Borrowed form of [`EdgeKey`] used for lookups without allocating.
#[derive(Clone, Copy, Hash)]
pub(in crate::graph) struct EdgeKeyView<'a> {
    pub(in crate::graph) v: &'a str,
    pub(in crate::graph) w: &'a str,
    pub(in crate::graph) name: Option<&'a str>,
}

impl hashbrown::Equivalent<EdgeKey> for EdgeKeyView<'_> {
    fn equivalent(&self, key: &EdgeKey) -> bool {
        key.v == self.v && key.w == self.w && key.name.as_deref() == self.name
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct EdgeKey {
    pub v: String,
    pub w: String,
    pub name: Option<String>,
}

impl EdgeKey {
    pub fn new(
        v: impl Into<String>,
        w: impl Into<String>,
        name: Option<impl Into<String>>,
    ) -> Self {
        Self {
            v: v.into(),
            w: w.into(),
            name: name.map(Into::into),
        }
    }

    pub fn unnamed(v: impl Into<String>, w: impl Into<String>) -> Self {
        Self::new(v, w, None::<String>)
    }

    pub fn is_loop(&self) -> bool {
        self.v == self.w
    }

    /// The endpoint opposite to `u`, or `None` if `u` is not an endpoint.
    pub fn other(&self, u: &str) -> Option<&str> {
        if self.v == u {
            Some(self.w.as_str())
        } else if self.w == u {
            Some(self.v.as_str())
        } else {
            None
        }
    }
}

// Must agree with `EdgeKeyView`'s derived hash for `Equivalent` lookups.
impl Hash for EdgeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.v.as_str().hash(state);
        self.w.as_str().hash(state);
        self.name.as_deref().hash(state);
    }
}

impl fmt::Display for EdgeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{} -> {} [{}]", self.v, self.w, name),
            None => write!(f, "{} -> {}", self.v, self.w),
        }
    }
}
