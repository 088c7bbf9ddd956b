//! Back-linked paths recording how a value was reached from its root.

use std::borrow::Cow;
use std::fmt;

/// One step of a navigation path.
///
/// The parent link borrows the enclosing node, so a chain lives exactly as
/// long as the navigation call stack that built it. Rendering joins the keys
/// root-to-leaf with `/`; the root key (usually a namespace such as
/// `/robot`) is emitted verbatim.
#[derive(Debug, Clone)]
pub struct PathNode<'a> {
    parent: Option<&'a PathNode<'a>>,
    key: Cow<'a, str>,
}

impl<'a> PathNode<'a> {
    /// A root node with the given key.
    pub fn root(key: impl Into<Cow<'a, str>>) -> Self {
        Self {
            parent: None,
            key: key.into(),
        }
    }

    /// A child of this node.
    pub fn child<'s>(&'s self, key: impl Into<Cow<'s, str>>) -> PathNode<'s> {
        PathNode {
            parent: Some(self),
            key: key.into(),
        }
    }

    pub fn parent(&self) -> Option<&'a PathNode<'a>> {
        self.parent
    }

    /// The last key: a member name, or an array index in decimal.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Number of steps below the root.
    pub fn depth(&self) -> usize {
        self.parent.map_or(0, |parent| parent.depth() + 1)
    }

    /// Keys from the root down to this node.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys = Vec::with_capacity(self.depth() + 1);
        let mut node = Some(self);
        while let Some(current) = node {
            keys.push(current.key());
            node = current.parent;
        }
        keys.reverse();
        keys
    }
}

impl fmt::Display for PathNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.parent {
            Some(parent) => write!(f, "{}/{}", parent, self.key),
            None => f.write_str(&self.key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_renders_verbatim() {
        assert_eq!(PathNode::root("/robot").to_string(), "/robot");
        assert_eq!(PathNode::root("").to_string(), "");
    }

    #[test]
    fn test_children_join_with_slash() {
        let root = PathNode::root("/robot");
        let arm = root.child("arm");
        let joint = arm.child(3.to_string());
        assert_eq!(joint.to_string(), "/robot/arm/3");
        assert_eq!(joint.key(), "3");
        assert_eq!(joint.depth(), 2);
        assert_eq!(joint.keys(), ["/robot", "arm", "3"]);
    }

    #[test]
    fn test_empty_root_key_yields_leading_slash() {
        let root = PathNode::root("");
        let child = root.child("speed");
        assert_eq!(child.to_string(), "/speed");
        assert!(!child.is_root());
        assert_eq!(child.parent().map(PathNode::key), Some(""));
    }
}
