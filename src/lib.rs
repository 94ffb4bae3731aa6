// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
`pcbsvg` post-processes SVG layers exported by PCB plotters.

It can recolor groups, merge multiple layers into a single document,
wrap layers into a common group and build a mask-based "invert" effect.

The input is expected to have a narrow, well-known shape:
an `svg` root element with a flat list of `g` elements, each one with a `style`
attribute containing a flat `name:value;` list.

## Example

```no_run
let mut base = pcbsvg::Document::open("front-copper.svg")?;
base.apply_color_transform(pcbsvg::replace_color("#b87333"))?;

let mut mask = pcbsvg::Document::open("front-mask.svg")?;
mask.apply_color_transform(pcbsvg::replace_color("#004200"))?;
base.import_groups(&mask)?;

base.wrap_with_group(&[("opacity", "0.8")])?;
base.save("board.svg", &pcbsvg::WriteOptions::default())?;
# Ok::<(), pcbsvg::Error>(())
```
*/

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![warn(missing_copy_implementations)]

mod compose;
mod error;
pub mod style;
pub mod svgtree;

pub use compose::{replace_color, MASK_ID};
pub use error::Error;
pub use style::{apply_style_transform, StyleRewriter, ValueTransform};
pub use svgtree::{Attribute, Document, Node, NodeId, WriteOptions};

pub use roxmltree;
pub use xmlwriter::Indent;
