// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Layers composition.
//!
//! All operations expect a document produced by a PCB plotter: an `svg` element
//! with a flat list of styled groups, where the third group contains
//! the board bounding rectangle.

use crate::style::StyleRewriter;
use crate::svgtree::{Document, NodeId};
use crate::Error;

/// An ID of the mask produced by [`Document::invert`].
pub const MASK_ID: &str = "mask-a";

impl Document {
    /// Applies a color transform to the `fill` and `stroke` properties of all groups.
    ///
    /// Groups are processed in document order. On error, already processed groups
    /// keep their new style.
    pub fn apply_color_transform<F>(&mut self, transform: F) -> Result<(), Error>
        where F: Fn(&str) -> String
    {
        let rewriter = StyleRewriter::new()
            .property("fill", &transform)
            .property("stroke", &transform);

        let groups = self.find_all("g");
        for id in &groups {
            rewriter.apply(self, *id)?;
        }

        log::debug!("Recolored {} groups.", groups.len());
        Ok(())
    }

    /// Copies `defs` and `g` elements from the root element of `other`
    /// to the end of the root element of this document.
    ///
    /// Other elements are ignored.
    pub fn import_groups(&mut self, other: &Document) -> Result<(), Error> {
        let svg = self.root_element().id();

        let mut count = 0;
        for child in other.root_element().children() {
            match child.tag_name() {
                Some("defs") | Some("g") => {}
                _ => continue,
            }

            let id = self.import_node(child, true);
            self.append_child(svg, id)?;
            count += 1;
        }

        log::debug!("Imported {} elements.", count);
        Ok(())
    }

    /// Moves all groups of the root element into a new group with the specified attributes.
    ///
    /// The new group is appended to the root element and its ID is returned.
    pub fn wrap_with_group(&mut self, attributes: &[(&str, &str)]) -> Result<NodeId, Error> {
        let svg = self.root_element().id();

        let wrapper = self.create_element("g");
        for &(name, value) in attributes {
            self.set_attribute(wrapper, name, value);
        }

        let count = self.move_groups(svg, wrapper)?;
        self.append_child(svg, wrapper)?;

        log::debug!("Wrapped {} groups.", count);
        Ok(wrapper)
    }

    /// Replaces the whole image with a solid `color` rectangle masked by the image.
    ///
    /// The bounding rectangle is the first `rect` child of the third group
    /// of the root element. All root groups are moved into a mask inside a new `defs`,
    /// followed by a new group with a copy of the bounding rectangle.
    ///
    /// Returns the ID of the new group. The tree is not modified on error.
    pub fn invert(&mut self, color: &str, opacity: f64) -> Result<NodeId, Error> {
        let svg = self.root_element();

        let bounding_rect = svg.children_by_tag_name("g").nth(2)
            .and_then(|g| g.children_by_tag_name("rect").next())
            .ok_or(Error::BoundingRectNotFound)?;

        let mut geometry = Vec::with_capacity(4);
        for name in ["x", "y", "width", "height"] {
            let value = bounding_rect.attribute(name).ok_or(Error::MissingGeometry(name))?;
            geometry.push((name, value.to_string()));
        }

        let svg = svg.id();
        let bounding_rect = bounding_rect.id();

        let mask = self.create_element("mask");
        self.set_attribute(mask, "id", MASK_ID);
        for (name, value) in geometry {
            self.set_attribute(mask, name, value);
        }

        let mask_group = self.create_element("g");
        let count = self.move_groups(svg, mask_group)?;
        self.append_child(mask, mask_group)?;

        let defs = self.create_element("defs");
        self.append_child(defs, mask)?;
        self.append_child(svg, defs)?;

        let fill_group = self.create_element("g");
        self.set_attribute(
            fill_group,
            "style",
            format!(
                "fill:{}; fill-opacity:{}; mask: url(#{});",
                color, format_opacity(opacity), MASK_ID
            ),
        );

        let rect = self.clone_node(bounding_rect, true);
        self.append_child(fill_group, rect)?;
        self.append_child(svg, fill_group)?;

        log::debug!("Masked {} groups.", count);
        Ok(fill_group)
    }

    /// Moves all `g` children of `from` to the end of `to`, preserving their order.
    fn move_groups(&mut self, from: NodeId, to: NodeId) -> Result<usize, Error> {
        let groups: Vec<_> = self.get(from).children_by_tag_name("g").map(|n| n.id()).collect();
        for id in &groups {
            self.remove_child(from, *id)?;
            self.append_child(to, *id)?;
        }

        Ok(groups.len())
    }
}

// Integral values keep a fractional part, so `1.0` is written as `1.0` and not `1`.
fn format_opacity(opacity: f64) -> String {
    let s = opacity.to_string();
    if opacity.is_finite() && !s.contains('.') {
        format!("{}.0", s)
    } else {
        s
    }
}

/// Returns a color transform that replaces any paint with `color`.
///
/// `none` is preserved, so unfilled shapes stay unfilled.
pub fn replace_color(color: &str) -> impl Fn(&str) -> String + '_ {
    move |value: &str| {
        if value.trim() == "none" {
            value.to_string()
        } else {
            color.to_string()
        }
    }
}
