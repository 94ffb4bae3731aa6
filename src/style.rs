// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Rewriting of the flat `style` attribute.
//!
//! A style is treated as an opaque string of `name:value;` pairs. Only the values
//! of the requested properties are replaced, everything else is kept byte-for-byte,
//! including whitespaces and properties order.

use regex::Regex;

use crate::svgtree::{Document, NodeId};
use crate::Error;

/// A property value transform.
pub type ValueTransform<'a> = &'a dyn Fn(&str) -> String;

/// A set of property transforms that can be applied to multiple styles.
///
/// Transforms are applied in the order they were added, each one operating
/// on the output of the previous one.
pub struct StyleRewriter<'a> {
    rules: Vec<Rule<'a>>,
}

struct Rule<'a> {
    name: String,
    pattern: Regex,
    transform: ValueTransform<'a>,
}

impl<'a> StyleRewriter<'a> {
    /// Creates an empty rewriter.
    pub fn new() -> Self {
        StyleRewriter { rules: Vec::new() }
    }

    /// Adds a property transform.
    pub fn property(mut self, name: &str, transform: ValueTransform<'a>) -> Self {
        // The name must be a whole word followed by a colon
        // and the value must be terminated by a semicolon.
        let pat = format!(r"\b{}:(?P<value>[^;]*);", regex::escape(name));
        let Ok(pattern) = Regex::new(&pat) else {
            log::warn!("Property '{}' cannot be matched and will be skipped.", name);
            return self;
        };

        self.rules.push(Rule { name: name.to_string(), pattern, transform });
        self
    }

    /// Rewrites a style string.
    ///
    /// Only the first occurrence of each property is replaced.
    /// Missing properties are skipped.
    pub fn rewrite(&self, style: &str) -> String {
        let mut style = style.to_string();
        for rule in &self.rules {
            let (range, new_value) = match rule.pattern.captures(&style) {
                Some(caps) => {
                    // Both groups always participate in a match.
                    let (Some(whole), Some(value)) = (caps.get(0), caps.name("value")) else {
                        continue;
                    };

                    (whole.range(), (rule.transform)(value.as_str()))
                }
                None => {
                    log::trace!("Property '{}' is not set.", rule.name);
                    continue;
                }
            };

            log::trace!("Property '{}' is set to '{}'.", rule.name, new_value);
            style.replace_range(range, &format!("{}:{};", rule.name, new_value));
        }

        style
    }

    /// Rewrites the `style` attribute of an element.
    pub fn apply(&self, doc: &mut Document, id: NodeId) -> Result<(), Error> {
        let style = doc.get(id).attribute("style").ok_or(Error::MissingStyleAttribute)?;
        let style = self.rewrite(style);
        doc.set_attribute(id, "style", style);
        Ok(())
    }
}

impl Default for StyleRewriter<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for StyleRewriter<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let names: Vec<_> = self.rules.iter().map(|r| r.name.as_str()).collect();
        write!(f, "StyleRewriter {{ properties: {:?} }}", names)
    }
}

/// Applies property transforms to the `style` attribute of an element.
///
/// Transforms are applied in the specified order.
pub fn apply_style_transform(
    doc: &mut Document,
    id: NodeId,
    transforms: &[(&str, ValueTransform)],
) -> Result<(), Error> {
    let mut rewriter = StyleRewriter::new();
    for &(name, transform) in transforms {
        rewriter = rewriter.property(name, transform);
    }

    rewriter.apply(doc, id)
}
