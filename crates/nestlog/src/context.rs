//! Immutable, hierarchical carrier of request-scoped values.
//!
//! A [`Context`] is a persistent chain: each node holds one entry and a
//! shared reference to its parent, and lookups walk from the newest node
//! toward the root. Nodes are never mutated after creation, so contexts can
//! be shared freely across threads and operation trees without locking.
//! "Adding" a value allocates a new head node and leaves every existing
//! holder of the old context untouched.
//!
//! The logging depth lives in a private entry variant, so no application key
//! can collide with it or overwrite it through the value API.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

/// An immutable, request-scoped value chain.
///
/// Cloning is cheap (one `Arc` clone) and shares the underlying chain.
/// Deriving a new context with [`with_depth`](Context::with_depth) or
/// [`with_value`](Context::with_value) never affects the parent: two children
/// derived from the same parent are fully independent.
///
/// # Example
///
/// ```
/// use nestlog::Context;
///
/// let root = Context::new();
/// assert_eq!(root.depth(), 0);
///
/// let child = root.with_depth(3);
/// assert_eq!(child.depth(), 3);
/// assert_eq!(root.depth(), 0);
/// ```
#[derive(Clone, Default)]
pub struct Context {
    head: Option<Arc<Node>>,
}

struct Node {
    entry: Entry,
    parent: Option<Arc<Node>>,
}

enum Entry {
    /// Logging depth. Private to the crate so application keys cannot
    /// shadow or read it except through [`Context::depth`].
    Depth(usize),
    /// Application-supplied value under a string key.
    Value {
        key: String,
        value: serde_json::Value,
    },
}

impl Context {
    /// Creates an empty root context with depth 0 and no values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the nesting depth of this context.
    ///
    /// The depth is the value stored by the nearest ancestor (including this
    /// context itself) that set one, or 0 if no ancestor ever did.
    #[must_use]
    pub fn depth(&self) -> usize {
        let mut node = self.head.as_deref();
        while let Some(n) = node {
            if let Entry::Depth(depth) = n.entry {
                return depth;
            }
            node = n.parent.as_deref();
        }
        0
    }

    /// Returns a child context whose [`depth`](Context::depth) resolves to
    /// `depth`, regardless of what this context resolves to.
    ///
    /// `self` is not modified.
    #[must_use]
    pub fn with_depth(&self, depth: usize) -> Self {
        self.push(Entry::Depth(depth))
    }

    /// Returns a child context carrying `value` under `key`.
    ///
    /// The value is serialized to JSON for storage. A nearer entry shadows
    /// ancestor entries with the same key. If serialization fails, the
    /// returned context is an unchanged clone of `self`.
    ///
    /// # Example
    ///
    /// ```
    /// use nestlog::Context;
    ///
    /// let ctx = Context::new().with_value("request_id", 42);
    /// let id: Option<i32> = ctx.value("request_id");
    /// assert_eq!(id, Some(42));
    /// ```
    #[must_use]
    pub fn with_value<T: Serialize>(&self, key: impl Into<String>, value: T) -> Self {
        let Ok(json_value) = serde_json::to_value(value) else {
            return self.clone();
        };
        self.push(Entry::Value {
            key: key.into(),
            value: json_value,
        })
    }

    /// Returns a child context carrying a raw JSON value under `key`.
    #[must_use]
    pub fn with_raw_value(&self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.push(Entry::Value {
            key: key.into(),
            value,
        })
    }

    /// Gets a value by key from this context or the nearest ancestor.
    ///
    /// Returns `None` if no ancestor set the key or if deserialization to
    /// type `T` fails.
    #[must_use]
    pub fn value<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.lookup(key)?;
        serde_json::from_value(value.clone()).ok()
    }

    /// Gets a raw JSON value by key from this context or the nearest
    /// ancestor.
    #[must_use]
    pub fn raw_value(&self, key: &str) -> Option<&serde_json::Value> {
        self.lookup(key)
    }

    /// Returns whether any ancestor (including this context) set `key`.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.lookup(key).is_some()
    }

    fn lookup(&self, key: &str) -> Option<&serde_json::Value> {
        let mut node = self.head.as_deref();
        while let Some(n) = node {
            if let Entry::Value { key: k, value } = &n.entry {
                if k == key {
                    return Some(value);
                }
            }
            node = n.parent.as_deref();
        }
        None
    }

    fn push(&self, entry: Entry) -> Self {
        Self {
            head: Some(Arc::new(Node {
                entry,
                parent: self.head.clone(),
            })),
        }
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("depth", &self.depth())
            .finish_non_exhaustive()
    }
}
