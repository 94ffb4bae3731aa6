// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A mutable SVG tree.
//!
//! Every node lives in an arena owned by its [`Document`] and is referenced by a [`NodeId`].
//! Read access goes through the [`Node`] view, while all mutations are methods of the
//! [`Document`] itself.

use crate::Error;

mod parse;
mod writer;

pub use writer::WriteOptions;

/// An SVG document.
///
/// Contains element and text nodes. Comments and processing instructions are not preserved.
pub struct Document {
    nodes: Vec<NodeData>,
}

impl Document {
    /// Returns the document node.
    ///
    /// This is not an element. Its only element child is the [`root_element`](Self::root_element).
    #[inline]
    pub fn root(&self) -> Node {
        self.get(NodeId(0))
    }

    /// Returns the root element. Usually an `svg` one.
    pub fn root_element(&self) -> Node {
        // `unwrap` is safe, because `Document` is guaranteed to have exactly one element
        // at the top level and it cannot be removed.
        self.root().first_element_child().unwrap()
    }

    /// Returns an iterator over document's descendant nodes.
    #[inline]
    pub fn descendants(&self) -> Descendants {
        self.root().descendants()
    }

    /// Returns a node view by ID.
    ///
    /// # Panics
    ///
    /// When `id` belongs to a different document and is out of bounds for this one.
    #[inline]
    pub fn get(&self, id: NodeId) -> Node {
        Node { id, d: &self.nodes[id.0], doc: self }
    }

    /// Returns all elements with the specified tag name in document order.
    ///
    /// Detached nodes are not included.
    pub fn find_all(&self, tag_name: &str) -> Vec<NodeId> {
        self.root().elements_by_tag_name(tag_name).map(|n| n.id()).collect()
    }

    /// Creates a new detached element.
    pub fn create_element(&mut self, tag_name: &str) -> NodeId {
        self.push_detached(NodeKind::Element {
            tag_name: tag_name.to_string(),
            attributes: Vec::new(),
        })
    }

    /// Sets an attribute value.
    ///
    /// An existing attribute keeps its position. A new one is added at the end.
    /// Does nothing for non-element nodes.
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: impl Into<String>) {
        if let NodeKind::Element { ref mut attributes, .. } = self.nodes[id.0].kind {
            let value = value.into();
            match attributes.iter_mut().find(|a| a.name == name) {
                Some(attr) => attr.value = value,
                None => attributes.push(Attribute { name: name.to_string(), value }),
            }
        }
    }

    /// Removes an attribute and returns its value.
    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> Option<String> {
        if let NodeKind::Element { ref mut attributes, .. } = self.nodes[id.0].kind {
            let idx = attributes.iter().position(|a| a.name == name)?;
            return Some(attributes.remove(idx).value);
        }

        None
    }

    /// Appends `child` as the last child of `parent`.
    ///
    /// If `child` is still attached somewhere else in this document, it will be moved.
    /// Nodes from other documents must be [imported](Self::import_node) first.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), Error> {
        match self.nodes[parent.0].kind {
            NodeKind::Element { .. } => {}
            // The document node can hold only the root element.
            NodeKind::Root | NodeKind::Text(_) => return Err(Error::InvalidHierarchy),
        }

        if let NodeKind::Root = self.nodes[child.0].kind {
            return Err(Error::InvalidHierarchy);
        }

        // The root element cannot be moved.
        if self.get(child).parent().map_or(false, |p| p.is_root()) {
            return Err(Error::InvalidHierarchy);
        }

        if self.get(parent).ancestors().any(|n| n.id == child) {
            return Err(Error::InvalidHierarchy);
        }

        self.detach(child);
        self.link_last(parent, child);
        Ok(())
    }

    /// Detaches `child` from `parent`.
    ///
    /// The detached node is still owned by the document and can be appended again.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), Error> {
        if self.nodes[child.0].parent != Some(parent) {
            return Err(Error::NotAChild);
        }

        if let NodeKind::Root = self.nodes[parent.0].kind {
            return Err(Error::InvalidHierarchy);
        }

        self.detach(child);
        Ok(())
    }

    /// Copies a node from another document into this one.
    ///
    /// The new node is detached. When `deep` is set, all descendants are copied too.
    pub fn import_node(&mut self, node: Node, deep: bool) -> NodeId {
        let items = collect_subtree(node, deep);
        self.insert_subtree(items)
    }

    /// Copies a node of this document.
    ///
    /// The new node is detached. When `deep` is set, all descendants are copied too.
    pub fn clone_node(&mut self, id: NodeId, deep: bool) -> NodeId {
        let items = collect_subtree(self.get(id), deep);
        self.insert_subtree(items)
    }

    fn push_detached(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            parent: None,
            prev_sibling: None,
            next_sibling: None,
            children: None,
            kind,
        });

        id
    }

    fn push_child(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = self.push_detached(kind);
        self.link_last(parent, id);
        id
    }

    fn link_last(&mut self, parent: NodeId, child: NodeId) {
        let prev = match self.nodes[parent.0].children {
            Some((first, last)) => {
                self.nodes[last.0].next_sibling = Some(child);
                self.nodes[parent.0].children = Some((first, child));
                Some(last)
            }
            None => {
                self.nodes[parent.0].children = Some((child, child));
                None
            }
        };

        let d = &mut self.nodes[child.0];
        d.parent = Some(parent);
        d.prev_sibling = prev;
        d.next_sibling = None;
    }

    fn detach(&mut self, id: NodeId) {
        let (parent_id, prev_id, next_id) = {
            let d = &self.nodes[id.0];
            match d.parent {
                Some(parent_id) => (parent_id, d.prev_sibling, d.next_sibling),
                None => return,
            }
        };

        if let Some(prev_id) = prev_id {
            self.nodes[prev_id.0].next_sibling = next_id;
        }

        if let Some(next_id) = next_id {
            self.nodes[next_id.0].prev_sibling = prev_id;
        }

        self.nodes[parent_id.0].children = match self.nodes[parent_id.0].children {
            Some((first, last)) => {
                let first = if first == id { next_id } else { Some(first) };
                let last = if last == id { prev_id } else { Some(last) };
                first.zip(last)
            }
            None => None,
        };

        let d = &mut self.nodes[id.0];
        d.parent = None;
        d.prev_sibling = None;
        d.next_sibling = None;
    }

    fn insert_subtree(&mut self, items: Vec<(Option<usize>, NodeKind)>) -> NodeId {
        let mut ids: Vec<NodeId> = Vec::with_capacity(items.len());
        for (parent_idx, kind) in items {
            let id = match parent_idx {
                Some(idx) => self.push_child(ids[idx], kind),
                None => self.push_detached(kind),
            };
            ids.push(id);
        }

        ids[0]
    }
}

/// Flattens a subtree into a list of nodes, where each item references its parent position.
///
/// The first item is the subtree root.
fn collect_subtree(node: Node, deep: bool) -> Vec<(Option<usize>, NodeKind)> {
    fn collect_children(parent: Node, parent_idx: usize, items: &mut Vec<(Option<usize>, NodeKind)>) {
        for child in parent.children() {
            let idx = items.len();
            items.push((Some(parent_idx), child.d.kind.clone()));
            collect_children(child, idx, items);
        }
    }

    let mut items = vec![(None, node.d.kind.clone())];
    if deep {
        collect_children(node, 0, &mut items);
    }

    items
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        writeln!(f, "Document [")?;
        for node in self.descendants().skip(1) {
            // Ancestors include the node itself and the document node.
            let depth = node.ancestors().count() - 1;
            writeln!(f, "{}{:?}", "    ".repeat(depth), node)?;
        }
        write!(f, "]")
    }
}


/// A node ID.
///
/// Valid only for the [`Document`] that created it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct NodeId(usize);


#[derive(Clone)]
enum NodeKind {
    Root,
    Element {
        tag_name: String,
        attributes: Vec<Attribute>,
    },
    Text(String),
}


struct NodeData {
    parent: Option<NodeId>,
    prev_sibling: Option<NodeId>,
    next_sibling: Option<NodeId>,
    children: Option<(NodeId, NodeId)>,
    kind: NodeKind,
}

/// An element attribute.
///
/// Namespace declarations are stored as regular `xmlns`/`xmlns:*` attributes
/// and prefixed names are stored qualified, like `xlink:href`.
#[derive(Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Attribute's qualified name.
    pub name: String,
    /// Attribute's value.
    pub value: String,
}

impl std::fmt::Debug for Attribute {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        write!(f, "Attribute {{ name: {:?}, value: {:?} }}", self.name, self.value)
    }
}


/// A read-only view of a node.
#[derive(Clone, Copy)]
pub struct Node<'a> {
    id: NodeId,
    doc: &'a Document,
    d: &'a NodeData,
}

impl Eq for Node<'_> {}

impl PartialEq for Node<'_> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && std::ptr::eq(self.doc, other.doc)
    }
}

impl<'a> Node<'a> {
    /// Returns node's ID.
    #[inline]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Checks that node is the document node.
    #[inline]
    pub fn is_root(&self) -> bool {
        matches!(self.d.kind, NodeKind::Root)
    }

    /// Checks that node is an element.
    #[inline]
    pub fn is_element(&self) -> bool {
        matches!(self.d.kind, NodeKind::Element { .. })
    }

    /// Checks that node is a text node.
    #[inline]
    pub fn is_text(&self) -> bool {
       matches!(self.d.kind, NodeKind::Text(_))
    }

    /// Returns element's qualified tag name.
    ///
    /// Returns `None` for non-element nodes.
    #[inline]
    pub fn tag_name(&self) -> Option<&'a str> {
        match self.d.kind {
            NodeKind::Element { ref tag_name, .. } => Some(tag_name.as_str()),
            _ => None,
        }
    }

    /// Checks that node is an element with the specified tag name.
    #[inline]
    pub fn has_tag_name(&self, name: &str) -> bool {
        self.tag_name() == Some(name)
    }

    /// Returns attribute's value.
    pub fn attribute(&self, name: &str) -> Option<&'a str> {
        self.attributes().iter().find(|a| a.name == name).map(|a| a.value.as_str())
    }

    /// Checks that element has the specified attribute.
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes().iter().any(|a| a.name == name)
    }

    /// Returns element's attributes in the document order.
    pub fn attributes(&self) -> &'a [Attribute] {
        match self.d.kind {
            NodeKind::Element { ref attributes, .. } => attributes,
            _ => &[],
        }
    }

    /// Returns node's text.
    ///
    /// For an element, returns the text of its first child, if it is a text node.
    pub fn text(&self) -> &'a str {
        match self.d.kind {
            NodeKind::Element { .. } => {
                match self.first_child() {
                    Some(child) => match child.d.kind {
                        NodeKind::Text(ref text) => text,
                        _ => "",
                    },
                    None => "",
                }
            }
            NodeKind::Text(ref text) => text,
            NodeKind::Root => "",
        }
    }

    /// Returns the parent node.
    ///
    /// Returns `None` for the document node and for detached nodes.
    pub fn parent(&self) -> Option<Self> {
        self.d.parent.map(|id| self.doc.get(id))
    }

    /// Returns the parent element.
    pub fn parent_element(&self) -> Option<Self> {
        self.ancestors().skip(1).find(|n| n.is_element())
    }

    /// Returns the previous sibling.
    pub fn prev_sibling(&self) -> Option<Self> {
        self.d.prev_sibling.map(|id| self.doc.get(id))
    }

    /// Returns the next sibling.
    pub fn next_sibling(&self) -> Option<Self> {
        self.d.next_sibling.map(|id| self.doc.get(id))
    }

    /// Returns the first child.
    pub fn first_child(&self) -> Option<Self> {
        self.d.children.map(|(id, _)| self.doc.get(id))
    }

    /// Returns the first element child.
    pub fn first_element_child(&self) -> Option<Self> {
        self.children().find(|n| n.is_element())
    }

    /// Returns the last child.
    pub fn last_child(&self) -> Option<Self> {
        self.d.children.map(|(_, id)| self.doc.get(id))
    }

    /// Checks that node has children.
    pub fn has_children(&self) -> bool {
        self.d.children.is_some()
    }

    /// Returns an iterator over ancestor nodes starting at this node.
    pub fn ancestors(&self) -> Ancestors<'a> {
        Ancestors(Some(*self))
    }

    /// Returns an iterator over children nodes.
    pub fn children(&self) -> Children<'a> {
        Children { front: self.first_child(), back: self.last_child() }
    }

    /// Returns an iterator over children elements with the specified tag name.
    pub fn children_by_tag_name<'n>(&self, name: &'n str) -> impl Iterator<Item = Node<'a>> + 'n
        where 'a: 'n
    {
        self.children().filter(move |n| n.has_tag_name(name))
    }

    /// Returns an iterator over this node and its descendants.
    pub fn descendants(&self) -> Descendants<'a> {
        Descendants { root: *self, next: Some(*self) }
    }

    /// Returns an iterator over descendant elements with the specified tag name
    /// in document order.
    ///
    /// The node itself is not included.
    pub fn elements_by_tag_name<'n>(&self, name: &'n str) -> impl Iterator<Item = Node<'a>> + 'n
        where 'a: 'n
    {
        self.descendants().skip(1).filter(move |n| n.has_tag_name(name))
    }
}

impl std::fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        match self.d.kind {
            NodeKind::Root => write!(f, "Root"),
            NodeKind::Element { ref tag_name, ref attributes } => {
                write!(f, "Element {{ tag_name: {:?}, attributes: {:?} }}", tag_name, attributes)
            }
            NodeKind::Text(ref text) => write!(f, "Text({:?})", text),
        }
    }
}

/// An iterator over a node and its ancestors.
#[derive(Clone, Debug)]
pub struct Ancestors<'a>(Option<Node<'a>>);

impl<'a> Iterator for Ancestors<'a> {
    type Item = Node<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.0?;
        self.0 = node.parent();
        Some(node)
    }
}


/// An iterator over children nodes.
///
/// Both ends walk the same sibling range and stop once they meet.
#[derive(Clone, Debug)]
pub struct Children<'a> {
    front: Option<Node<'a>>,
    back: Option<Node<'a>>,
}

impl<'a> Iterator for Children<'a> {
    type Item = Node<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.front?;
        if self.back == Some(node) {
            self.front = None;
            self.back = None;
        } else {
            self.front = node.next_sibling();
        }

        Some(node)
    }
}

impl DoubleEndedIterator for Children<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let node = self.back?;
        if self.front == Some(node) {
            self.front = None;
            self.back = None;
        } else {
            self.back = node.prev_sibling();
        }

        Some(node)
    }
}


/// An iterator over a node and its descendants in document order.
#[derive(Clone, Debug)]
pub struct Descendants<'a> {
    root: Node<'a>,
    next: Option<Node<'a>>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = Node<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.next?;
        let root = self.root;
        self.next = node.first_child().or_else(|| {
            // Climb up to the closest following sibling, staying inside the subtree.
            node.ancestors()
                .take_while(|n| *n != root)
                .find_map(|n| n.next_sibling())
        });

        Some(node)
    }
}
