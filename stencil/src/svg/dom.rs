//! Owned, mutable XML tree for SVG documents.
//!
//! `roxmltree` gives a read-only view; this module copies it into an arena of
//! nodes that can be edited and serialized again. Attribute order and the
//! text outside the root element (XML declaration, doctype, comments) are
//! preserved verbatim. Namespace declarations stay on the element that
//! declared them, and prefixed names are kept as written.

#[cfg(test)]
#[path = "dom_test.rs"]
mod dom_test;

use std::fmt;

use super::SvgError;

pub const SVG_NS: &str = "http://www.w3.org/2000/svg";
pub const XLINK_NS: &str = "http://www.w3.org/1999/xlink";
pub const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

/// Index of a node in the document arena.
pub type NodeId = usize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Qualified name as written (`xlink:href`, `fill`).
    pub name: String,
    pub namespace: Option<String>,
    pub value: String,
}

/// A namespace declared on an element (`xmlns:prefix="uri"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceDecl {
    /// `None` for the default namespace.
    pub prefix: Option<String>,
    pub uri: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementData {
    /// Qualified tag name as written.
    pub name: String,
    pub namespaces: Vec<NamespaceDecl>,
    pub attributes: Vec<Attribute>,
}

impl ElementData {
    /// Tag name without prefix.
    #[must_use]
    pub fn local_name(&self) -> &str {
        self.name.rsplit_once(':').map_or(&self.name, |(_, local)| local)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Element(ElementData),
    Text(String),
    Comment(String),
    ProcessingInstruction { target: String, value: Option<String> },
}

#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Parsed SVG document.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
    prolog: String,
    epilog: String,
}

impl Document {
    /// Parse SVG text. The root element must be `<svg>`.
    ///
    /// # Errors
    ///
    /// Returns `SvgError::Parse` for malformed XML and `SvgError::NotSvg` when
    /// the root element is something else.
    pub fn parse(text: &str) -> Result<Self, SvgError> {
        let options = roxmltree::ParsingOptions { allow_dtd: true, ..roxmltree::ParsingOptions::default() };
        let source = roxmltree::Document::parse_with_options(text, options)?;
        let root = source.root_element();
        if root.tag_name().name() != "svg" {
            return Err(SvgError::NotSvg(root.tag_name().name().to_owned()));
        }

        let range = root.range();
        let mut doc = Self {
            nodes: Vec::new(),
            root: 0,
            prolog: text[..range.start].to_owned(),
            epilog: text[range.end..].to_owned(),
        };
        doc.root = doc.import(root, None);
        Ok(doc)
    }

    fn import(&mut self, node: roxmltree::Node<'_, '_>, parent: Option<NodeId>) -> NodeId {
        let kind = if node.is_element() {
            NodeKind::Element(import_element(node))
        } else if node.is_comment() {
            NodeKind::Comment(node.text().unwrap_or_default().to_owned())
        } else if let Some(pi) = node.pi() {
            NodeKind::ProcessingInstruction { target: pi.target.to_owned(), value: pi.value.map(str::to_owned) }
        } else {
            NodeKind::Text(node.text().unwrap_or_default().to_owned())
        };

        let id = self.push(kind, parent);
        for child in node.children() {
            let child_id = self.import(child, Some(id));
            self.nodes[id].children.push(child_id);
        }
        id
    }

    fn push(&mut self, kind: NodeKind, parent: Option<NodeId>) -> NodeId {
        self.nodes.push(Node { kind, parent, children: Vec::new() });
        self.nodes.len() - 1
    }

    // --- Navigation ---

    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    #[must_use]
    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        match self.nodes.get(id).map(|n| &n.kind) {
            Some(NodeKind::Element(data)) => Some(data),
            _ => None,
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        match self.nodes.get_mut(id).map(|n| &mut n.kind) {
            Some(NodeKind::Element(data)) => Some(data),
            _ => None,
        }
    }

    /// Local tag name of an element node.
    #[must_use]
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(ElementData::local_name)
    }

    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(id).map_or(&[], |n| n.children.as_slice())
    }

    /// Child nodes that are elements.
    #[must_use]
    pub fn child_elements(&self, id: NodeId) -> Vec<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .filter(|c| self.element(*c).is_some())
            .collect()
    }

    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(|n| n.parent)
    }

    /// Concatenated text of all descendant text nodes.
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        if let NodeKind::Text(text) = &node.kind {
            out.push_str(text);
        }
        for child in &node.children {
            self.collect_text(*child, out);
        }
    }

    /// Text held directly by the node (not by descendant elements).
    #[must_use]
    pub fn own_text(&self, id: NodeId) -> String {
        self.children(id)
            .iter()
            .filter_map(|c| match self.nodes.get(*c).map(|n| &n.kind) {
                Some(NodeKind::Text(text)) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    // --- Attributes ---

    #[must_use]
    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id)?
            .attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Set a plain (no namespace) attribute, keeping its position if present.
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) {
        self.set_attribute_ns(id, None, name, value);
    }

    /// Set an attribute in a namespace. For a prefixed name, the prefix is
    /// declared on the root element when no declaration is in scope.
    pub fn set_attribute_ns(&mut self, id: NodeId, namespace: Option<&str>, name: &str, value: &str) {
        if let (Some(uri), Some((prefix, _))) = (namespace, name.split_once(':')) {
            if prefix != "xml" {
                self.ensure_namespace(prefix, uri);
            }
        }
        let Some(element) = self.element_mut(id) else {
            return;
        };
        if let Some(existing) = element.attributes.iter_mut().find(|a| a.name == name) {
            existing.value = value.to_owned();
            existing.namespace = namespace.map(str::to_owned);
        } else {
            element.attributes.push(Attribute {
                name: name.to_owned(),
                namespace: namespace.map(str::to_owned),
                value: value.to_owned(),
            });
        }
    }

    pub fn remove_attribute(&mut self, id: NodeId, name: &str) {
        if let Some(element) = self.element_mut(id) {
            element.attributes.retain(|a| a.name != name);
        }
    }

    pub fn clear_attributes(&mut self, id: NodeId) {
        if let Some(element) = self.element_mut(id) {
            element.attributes.clear();
        }
    }

    /// Declare `xmlns:prefix="uri"` on the root unless the root already
    /// declares the prefix.
    pub fn ensure_namespace(&mut self, prefix: &str, uri: &str) {
        let root = self.root;
        let Some(element) = self.element_mut(root) else {
            return;
        };
        if element
            .namespaces
            .iter()
            .any(|ns| ns.prefix.as_deref() == Some(prefix))
        {
            return;
        }
        element.namespaces.push(NamespaceDecl { prefix: Some(prefix.to_owned()), uri: uri.to_owned() });
    }

    // --- Structure ---

    /// Replace every child with a single text node.
    pub fn set_text(&mut self, id: NodeId, text: &str) {
        self.clear_children(id);
        if !text.is_empty() {
            self.append_text(id, text);
        }
    }

    pub fn clear_children(&mut self, id: NodeId) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        let children = std::mem::take(&mut node.children);
        for child in children {
            self.nodes[child].parent = None;
        }
    }

    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        let id = self.push(NodeKind::Text(text.to_owned()), Some(parent));
        self.nodes[parent].children.push(id);
        id
    }

    /// Append a child element named like its parent's namespace prefix would
    /// require; `name` is taken as written.
    pub fn append_element(&mut self, parent: NodeId, name: &str, attributes: Vec<Attribute>) -> NodeId {
        let data = ElementData { name: name.to_owned(), namespaces: Vec::new(), attributes };
        let id = self.push(NodeKind::Element(data), Some(parent));
        self.nodes[parent].children.push(id);
        id
    }

    /// Remove a node from its parent. The subtree stays in the arena but is
    /// no longer reachable from the root.
    pub fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.parent(id) else {
            return;
        };
        self.nodes[parent].children.retain(|c| *c != id);
        self.nodes[id].parent = None;
    }

    /// Detach a node, moving its children into its slot in the parent.
    pub fn hoist_children(&mut self, id: NodeId) {
        let Some(parent) = self.parent(id) else {
            return;
        };
        let Some(position) = self.nodes[parent].children.iter().position(|c| *c == id) else {
            return;
        };
        let children = std::mem::take(&mut self.nodes[id].children);
        for child in &children {
            self.nodes[*child].parent = Some(parent);
        }
        self.nodes[parent].children.splice(position..=position, children);
        self.nodes[id].parent = None;
    }

    /// Insert a detached node as the next sibling of `anchor`.
    pub fn insert_after(&mut self, anchor: NodeId, node: NodeId) {
        let Some(parent) = self.parent(anchor) else {
            return;
        };
        self.detach(node);
        let siblings = &mut self.nodes[parent].children;
        let position = siblings.iter().position(|c| *c == anchor).map_or(siblings.len(), |p| p + 1);
        siblings.insert(position, node);
        self.nodes[node].parent = Some(parent);
    }

    /// Copy a subtree. The copy is detached.
    pub fn deep_clone(&mut self, id: NodeId) -> NodeId {
        let kind = self.nodes[id].kind.clone();
        let copy = self.push(kind, None);
        let children = self.nodes[id].children.clone();
        for child in children {
            let child_copy = self.deep_clone(child);
            self.nodes[child_copy].parent = Some(copy);
            self.nodes[copy].children.push(child_copy);
        }
        copy
    }

    /// Overwrite the child list of `parent`. Every id must already be a child.
    pub fn reorder_children(&mut self, parent: NodeId, children: Vec<NodeId>) {
        if let Some(node) = self.nodes.get_mut(parent) {
            node.children = children;
        }
    }

    /// Element nodes below `id` in document order (pre-order), excluding `id`.
    #[must_use]
    pub fn descendant_elements(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            if self.element(next).is_some() {
                out.push(next);
                stack.extend(self.children(next).iter().rev().copied());
            }
        }
        out
    }

    /// Find the first element whose attribute `name` equals `value`.
    #[must_use]
    pub fn find_by_attribute(&self, name: &str, value: &str) -> Option<NodeId> {
        self.descendant_elements(self.root)
            .into_iter()
            .chain(std::iter::once(self.root))
            .find(|id| self.attribute(*id, name) == Some(value))
    }

    // --- Output ---

    fn write_node(&self, id: NodeId, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(node) = self.nodes.get(id) else {
            return Ok(());
        };
        match &node.kind {
            NodeKind::Text(text) => f.write_str(&escape_text(text)),
            NodeKind::Comment(text) => write!(f, "<!--{text}-->"),
            NodeKind::ProcessingInstruction { target, value } => match value {
                Some(value) => write!(f, "<?{target} {value}?>"),
                None => write!(f, "<?{target}?>"),
            },
            NodeKind::Element(element) => {
                write!(f, "<{}", element.name)?;
                for ns in &element.namespaces {
                    match &ns.prefix {
                        Some(prefix) => write!(f, " xmlns:{prefix}=\"{}\"", escape_attr(&ns.uri))?,
                        None => write!(f, " xmlns=\"{}\"", escape_attr(&ns.uri))?,
                    }
                }
                for attr in &element.attributes {
                    write!(f, " {}=\"{}\"", attr.name, escape_attr(&attr.value))?;
                }
                if node.children.is_empty() {
                    return f.write_str("/>");
                }
                f.write_str(">")?;
                for child in &node.children {
                    self.write_node(*child, f)?;
                }
                write!(f, "</{}>", element.name)
            }
        }
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.prolog)?;
        self.write_node(self.root, f)?;
        f.write_str(&self.epilog)
    }
}

fn import_element(node: roxmltree::Node<'_, '_>) -> ElementData {
    let tag = node.tag_name();
    let prefix = tag.namespace().and_then(|uri| prefix_for(node, uri));
    let name = match prefix {
        Some(prefix) => format!("{prefix}:{}", tag.name()),
        None => tag.name().to_owned(),
    };

    let inherited: Vec<(Option<&str>, &str)> = node
        .parent_element()
        .map(|p| p.namespaces().map(|ns| (ns.name(), ns.uri())).collect())
        .unwrap_or_default();
    let namespaces = node
        .namespaces()
        .filter(|ns| ns.name() != Some("xml"))
        .filter(|ns| !inherited.contains(&(ns.name(), ns.uri())))
        .map(|ns| NamespaceDecl { prefix: ns.name().map(str::to_owned), uri: ns.uri().to_owned() })
        .collect();

    let attributes = node
        .attributes()
        .map(|attr| {
            let name = match attr.namespace().and_then(|uri| prefix_for(node, uri)) {
                Some(prefix) => format!("{prefix}:{}", attr.name()),
                None => attr.name().to_owned(),
            };
            Attribute { name, namespace: attr.namespace().map(str::to_owned), value: attr.value().to_owned() }
        })
        .collect();

    ElementData { name, namespaces, attributes }
}

fn prefix_for<'a>(node: roxmltree::Node<'a, '_>, uri: &str) -> Option<&'a str> {
    if uri == XML_NS {
        return Some("xml");
    }
    node.lookup_prefix(uri).filter(|prefix| !prefix.is_empty())
}

fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\n' => out.push_str("&#10;"),
            _ => out.push(c),
        }
    }
    out
}
