//! Arena element tree for the Bracken markup engine.
//!
//! This is the input type of the HTML → BBCode direction: the hosting
//! application hands the engine a fragment of already-parsed HTML as an
//! element tree, and the markup serializer walks it. The tree uses arena
//! allocation with [`NodeId`] indices for all relationships, so traversal
//! never fights the borrow checker and reparenting is cheap.
//!
//! Attribute order is preserved. The reverse conversion emits the default
//! bracket value first and the remaining attributes in source order, so a
//! positional `Vec` rather than a hash map is load-bearing here.

pub mod reader;

/// An attribute on an element (or on a BBCode open tag).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Attribute name, stored lowercase.
    pub name: String,
    /// Raw (unescaped) attribute value.
    pub value: String,
}

impl Attribute {
    /// Create a new attribute with the given name and value.
    #[must_use]
    pub const fn new(name: String, value: String) -> Self {
        Self { name, value }
    }
}

/// An ordered list of attributes with map-like lookup.
///
/// Lookup is linear; attribute lists are tiny (a handful of entries at
/// most) and iteration order is part of the serialization contract.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeList {
    attrs: Vec<Attribute>,
}

impl AttributeList {
    /// Create an empty attribute list.
    #[must_use]
    pub const fn new() -> Self {
        Self { attrs: Vec::new() }
    }

    /// Build a list from `(name, value)` pairs, preserving order.
    pub fn from_pairs<N, V, I>(pairs: I) -> Self
    where
        N: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (N, V)>,
    {
        let mut list = Self::new();
        for (name, value) in pairs {
            let name: String = name.into();
            let value: String = value.into();
            list.set(&name, &value);
        }
        list
    }

    /// Look up an attribute value by (case-insensitive) name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(name))
            .map(|a| a.value.as_str())
    }

    /// Set an attribute, replacing an existing entry in place or appending.
    pub fn set(&mut self, name: &str, value: &str) {
        if let Some(existing) = self
            .attrs
            .iter_mut()
            .find(|a| a.name.eq_ignore_ascii_case(name))
        {
            existing.value = value.to_string();
        } else {
            self.attrs
                .push(Attribute::new(name.to_ascii_lowercase(), value.to_string()));
        }
    }

    /// Number of attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    /// Whether the list has no attributes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }

    /// Iterate over the attributes in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Attribute> {
        self.attrs.iter()
    }
}

impl<'a> IntoIterator for &'a AttributeList {
    type Item = &'a Attribute;
    type IntoIter = std::slice::Iter<'a, Attribute>;

    fn into_iter(self) -> Self::IntoIter {
        self.attrs.iter()
    }
}

/// A type-safe index into an [`ElementTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub usize);

impl NodeId {
    /// The fragment root is always at index 0.
    pub const ROOT: NodeId = NodeId(0);
}

/// A node in the element tree.
#[derive(Debug, Clone)]
pub struct Node {
    /// What kind of node this is.
    pub node_type: NodeType,
    /// Parent node, `None` only for the fragment root.
    pub parent: Option<NodeId>,
    /// Children in document order.
    pub children: Vec<NodeId>,
}

/// The kind of a tree node.
#[derive(Debug, Clone)]
pub enum NodeType {
    /// The synthetic root of a fragment. Never has a parent.
    Fragment,
    /// An element with a tag name and attributes.
    Element(ElementData),
    /// A text node.
    Text(String),
}

/// Element-specific data.
#[derive(Debug, Clone)]
pub struct ElementData {
    /// Lowercase tag name.
    pub tag_name: String,
    /// Attributes in source order.
    pub attrs: AttributeList,
}

impl ElementData {
    /// Look up an attribute value.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name)
    }

    /// Look up a property in the inline `style` attribute.
    ///
    /// Parses `style="a: 1; b: 2"` on demand; property names compare
    /// case-insensitively and the returned value is trimmed.
    #[must_use]
    pub fn style(&self, property: &str) -> Option<String> {
        let style = self.attrs.get("style")?;
        for declaration in style.split(';') {
            if let Some((name, value)) = declaration.split_once(':')
                && name.trim().eq_ignore_ascii_case(property)
            {
                return Some(value.trim().to_string());
            }
        }
        None
    }
}

/// Arena-backed element tree rooted at a synthetic fragment node.
///
/// All nodes live in a contiguous vector; [`NodeId`] indices provide O(1)
/// access in any direction without borrowing issues.
#[derive(Debug, Clone)]
pub struct ElementTree {
    nodes: Vec<Node>,
}

impl ElementTree {
    /// Create a new tree containing only the fragment root.
    #[must_use]
    pub fn new() -> Self {
        ElementTree {
            nodes: vec![Node {
                node_type: NodeType::Fragment,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    /// Get the fragment root node ID.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by its ID.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Number of nodes in the tree (including the root).
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree is empty (never true; the root always exists).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Allocate a new detached node and return its ID.
    pub fn alloc(&mut self, node_type: NodeType) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            node_type,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// Append `child` as the last child of `parent`.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[parent.0].children.push(child);
        self.nodes[child.0].parent = Some(parent);
    }

    /// Allocate an element node and attach it under `parent`.
    pub fn element(&mut self, parent: NodeId, tag_name: &str, attrs: AttributeList) -> NodeId {
        let id = self.alloc(NodeType::Element(ElementData {
            tag_name: tag_name.to_ascii_lowercase(),
            attrs,
        }));
        self.append_child(parent, id);
        id
    }

    /// Allocate a text node and attach it under `parent`.
    pub fn text(&mut self, parent: NodeId, data: &str) -> NodeId {
        let id = self.alloc(NodeType::Text(data.to_string()));
        self.append_child(parent, id);
        id
    }

    /// Get the parent of a node.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// Get all children of a node.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Get element data if this node is an element.
    #[must_use]
    pub fn as_element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id).and_then(|n| match &n.node_type {
            NodeType::Element(data) => Some(data),
            _ => None,
        })
    }

    /// Get text content if this node is a text node.
    #[must_use]
    pub fn as_text(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(|n| match &n.node_type {
            NodeType::Text(s) => Some(s.as_str()),
            _ => None,
        })
    }

    /// Concatenated text of a node's subtree, in document order.
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        let mut result = String::new();
        if let Some(node) = self.get(id) {
            match &node.node_type {
                NodeType::Text(data) => result.push_str(data),
                _ => {
                    for &child_id in self.children(id) {
                        result.push_str(&self.text_content(child_id));
                    }
                }
            }
        }
        result
    }
}

impl Default for ElementTree {
    fn default() -> Self {
        Self::new()
    }
}
