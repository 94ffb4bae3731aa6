// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::io::Write;
use std::path::Path;

use xmlwriter::{Indent, XmlWriter};

use crate::Error;
use super::{Document, Node};

/// XML writing options.
#[derive(Clone, Copy, Debug)]
pub struct WriteOptions {
    /// Use single quote marks instead of double quote.
    ///
    /// # Examples
    ///
    /// Before:
    ///
    /// ```text
    /// <rect fill="red"/>
    /// ```
    ///
    /// After:
    ///
    /// ```text
    /// <rect fill='red'/>
    /// ```
    ///
    /// Default: disabled
    pub use_single_quote: bool,

    /// Set XML nodes indention.
    ///
    /// Elements with text content are always written as is.
    ///
    /// Default: 4 spaces
    pub indent: Indent,

    /// Set XML attributes indention.
    ///
    /// Default: `None`
    pub attributes_indent: Indent,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            use_single_quote: false,
            indent: Indent::Spaces(4),
            attributes_indent: Indent::None,
        }
    }
}

impl Document {
    /// Writes the document back to SVG.
    ///
    /// The output is deterministic: attributes are written in the stored order.
    pub fn to_string(&self, opt: &WriteOptions) -> String {
        let mut xml = XmlWriter::new(xmlwriter::Options {
            use_single_quote: opt.use_single_quote,
            indent: opt.indent,
            attributes_indent: opt.attributes_indent,
        });

        write_element(self.root_element(), false, &mut xml);

        xml.end_document()
    }

    /// Writes the document into a stream.
    pub fn write_to<W: Write>(&self, mut writer: W, opt: &WriteOptions) -> Result<(), Error> {
        writer.write_all(self.to_string(opt).as_bytes())?;
        writer.flush()?;
        Ok(())
    }

    /// Writes the document into a file.
    pub fn save<P: AsRef<Path>>(&self, path: P, opt: &WriteOptions) -> Result<(), Error> {
        let path = path.as_ref();
        log::debug!("Writing '{}'.", path.display());
        let file = std::fs::File::create(path)?;
        self.write_to(std::io::BufWriter::new(file), opt)
    }
}

// `preserve` is the whitespace mode of the parent element.
fn write_element(node: Node, preserve: bool, xml: &mut XmlWriter) {
    let tag_name = match node.tag_name() {
        Some(v) => v,
        None => return,
    };

    xml.start_element(tag_name);

    for attr in node.attributes() {
        xml.write_attribute_raw(&attr.name, |buf| escape_attribute(&attr.value, buf));
    }

    // Indentation would alter the text content, including the one of nested elements.
    let preserve_children = preserve || node.children().any(|n| n.is_text());
    xml.set_preserve_whitespaces(preserve_children);

    for child in node.children() {
        if child.is_text() {
            xml.write_text(&escape_text(child.text()));
        } else {
            write_element(child, preserve_children, xml);
        }
    }

    xml.end_element();
    xml.set_preserve_whitespaces(preserve);
}

// Quotes are escaped by `XmlWriter` itself.
// Whitespace characters other than a space would be normalized on load.
fn escape_attribute(value: &str, buf: &mut Vec<u8>) {
    for c in value.chars() {
        match c {
            '&' => buf.extend_from_slice(b"&amp;"),
            '<' => buf.extend_from_slice(b"&lt;"),
            '\n' => buf.extend_from_slice(b"&#10;"),
            '\r' => buf.extend_from_slice(b"&#13;"),
            '\t' => buf.extend_from_slice(b"&#9;"),
            _ => {
                let mut tmp = [0; 4];
                buf.extend_from_slice(c.encode_utf8(&mut tmp).as_bytes());
            }
        }
    }
}

// `XmlWriter::write_text` escapes only `<`.
fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;").replace('\r', "&#13;")
}
