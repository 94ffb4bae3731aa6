// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/// List of all errors.
#[derive(Debug)]
pub enum Error {
    /// Only UTF-8 content are supported.
    NotAnUtf8Str,

    /// Compressed SVG must use the GZip algorithm.
    MalformedGZip,

    /// Input is not a well-formed XML document.
    MalformedDocument(roxmltree::Error),

    /// An element targeted by a style transform has no `style` attribute.
    MissingStyleAttribute,

    /// The node passed for removal is not a child of the given parent.
    NotAChild,

    /// The node cannot be attached at the requested position.
    ///
    /// Occurs when a node is appended to itself or to one of its descendants,
    /// or when the document node is used as a child.
    InvalidHierarchy,

    /// The root element doesn't have a third `g` child with a `rect` child.
    BoundingRectNotFound,

    /// The bounding rectangle lacks one of the `x`, `y`, `width` or `height` attributes.
    MissingGeometry(&'static str),

    /// Failed to read or write data.
    Io(std::io::Error),
}

impl From<roxmltree::Error> for Error {
    fn from(e: roxmltree::Error) -> Self {
        Error::MalformedDocument(e)
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match *self {
            Error::NotAnUtf8Str => {
                write!(f, "provided data has not an UTF-8 encoding")
            }
            Error::MalformedGZip => {
                write!(f, "provided data has a malformed GZip content")
            }
            Error::MalformedDocument(ref e) => {
                write!(f, "SVG data parsing failed cause {}", e)
            }
            Error::MissingStyleAttribute => {
                write!(f, "element doesn't have a 'style' attribute")
            }
            Error::NotAChild => {
                write!(f, "node is not a child of the specified parent")
            }
            Error::InvalidHierarchy => {
                write!(f, "node cannot be appended to the specified parent")
            }
            Error::BoundingRectNotFound => {
                write!(f, "bounding rectangle is not found in the third group")
            }
            Error::MissingGeometry(name) => {
                write!(f, "bounding rectangle doesn't have the '{}' attribute", name)
            }
            Error::Io(ref e) => {
                write!(f, "{}", e)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match *self {
            Error::MalformedDocument(ref e) => Some(e),
            Error::Io(ref e) => Some(e),
            _ => None,
        }
    }
}
