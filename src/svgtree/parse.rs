// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::path::Path;

use crate::Error;
use super::{Attribute, Document, NodeData, NodeId, NodeKind};

const XML_NAMESPACE_NS: &str = "http://www.w3.org/XML/1998/namespace";

impl Document {
    /// Parses a [`Document`] from raw data.
    ///
    /// Both SVG and SVGZ are supported.
    pub fn from_data(data: &[u8]) -> Result<Document, Error> {
        if data.starts_with(&[0x1f, 0x8b]) {
            let data = decompress_svgz(data)?;
            let text = std::str::from_utf8(&data).map_err(|_| Error::NotAnUtf8Str)?;
            Self::parse_str(text)
        } else {
            let text = std::str::from_utf8(data).map_err(|_| Error::NotAnUtf8Str)?;
            Self::parse_str(text)
        }
    }

    /// Parses a [`Document`] from a string.
    pub fn parse_str(text: &str) -> Result<Document, Error> {
        let xml_opt = roxmltree::ParsingOptions {
            allow_dtd: true,
            ..Default::default()
        };

        let xml = roxmltree::Document::parse_with_options(text, xml_opt)?;
        Ok(Self::parse_tree(&xml))
    }

    /// Converts a [`roxmltree::Document`] into a [`Document`].
    pub fn parse_tree(xml: &roxmltree::Document) -> Document {
        parse(xml)
    }

    /// Loads a [`Document`] from a file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Document, Error> {
        let data = std::fs::read(path)?;
        Self::from_data(&data)
    }
}

/// Decompresses an SVGZ file.
pub fn decompress_svgz(data: &[u8]) -> Result<Vec<u8>, Error> {
    use std::io::Read;

    let mut decoder = flate2::read::GzDecoder::new(data);
    let mut decoded = Vec::with_capacity(data.len() * 2);
    decoder.read_to_end(&mut decoded).map_err(|_| Error::MalformedGZip)?;
    Ok(decoded)
}

fn parse(xml: &roxmltree::Document) -> Document {
    let mut doc = Document {
        nodes: Vec::new(),
    };

    // Add a root node.
    doc.nodes.push(NodeData {
        parent: None,
        prev_sibling: None,
        next_sibling: None,
        children: None,
        kind: NodeKind::Root,
    });

    // roxmltree guarantees exactly one root element,
    // everything else on the top level is skipped.
    let root_id = doc.root().id;
    parse_xml_node(xml.root_element(), root_id, false, &mut doc);

    log::debug!("Parsed {} nodes.", doc.nodes.len());

    doc
}

// `keep_blank` is set inside elements with text content,
// where whitespaces are a part of the text and not a formatting.
fn parse_xml_node(node: roxmltree::Node, parent_id: NodeId, keep_blank: bool, doc: &mut Document) {
    match node.node_type() {
        roxmltree::NodeType::Element => {
            let kind = NodeKind::Element {
                tag_name: qualified_tag_name(node),
                attributes: collect_attributes(node),
            };

            let node_id = doc.push_child(parent_id, kind);
            let keep_blank = keep_blank || node.children().any(|c| c.is_text() && !is_blank(c));
            for child in node.children() {
                parse_xml_node(child, node_id, keep_blank, doc);
            }
        }
        roxmltree::NodeType::Text => {
            // Formatting only. The writer will indent the output by itself.
            if !keep_blank && is_blank(node) {
                return;
            }

            let text = node.text().unwrap_or_default();
            doc.push_child(parent_id, NodeKind::Text(text.to_string()));
        }
        _ => {}
    }
}

fn is_blank(node: roxmltree::Node) -> bool {
    node.text().map_or(true, |text| text.trim().is_empty())
}

fn qualified_tag_name(node: roxmltree::Node) -> String {
    let tag_name = node.tag_name();
    let is_default = |uri: &str| node.namespaces().any(|ns| ns.name().is_none() && ns.uri() == uri);
    let prefix = match tag_name.namespace() {
        Some(uri) if !is_default(uri) => namespace_prefix(node, uri),
        _ => None,
    };

    match prefix {
        Some(prefix) => format!("{}:{}", prefix, tag_name.name()),
        None => tag_name.name().to_string(),
    }
}

fn collect_attributes(node: roxmltree::Node) -> Vec<Attribute> {
    let mut attributes = Vec::new();

    // Namespaces are stored on the element that declared them.
    let parent_namespaces: Vec<_> = match node.parent_element() {
        Some(parent) => parent.namespaces().map(|ns| (ns.name(), ns.uri())).collect(),
        None => Vec::new(),
    };

    for ns in node.namespaces() {
        if ns.uri() == XML_NAMESPACE_NS {
            continue;
        }

        if parent_namespaces.contains(&(ns.name(), ns.uri())) {
            continue;
        }

        let name = match ns.name() {
            Some(prefix) => format!("xmlns:{}", prefix),
            None => "xmlns".to_string(),
        };

        attributes.push(Attribute { name, value: ns.uri().to_string() });
    }

    for attr in node.attributes() {
        let name = match attr.namespace().and_then(|uri| namespace_prefix(node, uri)) {
            Some(prefix) => format!("{}:{}", prefix, attr.name()),
            None => attr.name().to_string(),
        };

        attributes.push(Attribute { name, value: attr.value().to_string() });
    }

    attributes
}

fn namespace_prefix(node: roxmltree::Node, uri: &str) -> Option<String> {
    if uri == XML_NAMESPACE_NS {
        return Some("xml".to_string());
    }

    // The same URI can be bound to both the default namespace and a prefix.
    node.namespaces()
        .find(|ns| ns.uri() == uri && ns.name().is_some())
        .and_then(|ns| ns.name())
        .map(|prefix| prefix.to_string())
}
