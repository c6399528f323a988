//! SVG element factory.
//!
//! Maps a tag name to the concrete SVG element variant. Known tags are matched
//! ASCII case-insensitively; anything else becomes a generic SVG element that
//! keeps the literal tag name. Both lookup tables are `static` data, so the
//! factory can be shared freely across threads.

use crate::Document;
use crate::types::{Element, SvgElementKind};
use core_types::DocumentId;

pub mod tag_names {
    pub const SVG: &str = "svg";
    pub const CIRCLE: &str = "circle";
    pub const DESC: &str = "desc";
    pub const FOREIGN_OBJECT: &str = "foreignObject";
    pub const TITLE: &str = "title";
}

/// Builds one element variant from `(owner, local_name, prefix)`.
type Creator = fn(DocumentId, &str, Option<&str>) -> Element;

fn create_svg_root(owner: DocumentId, name: &str, prefix: Option<&str>) -> Element {
    Element::svg(owner, SvgElementKind::Svg, name, prefix)
}

fn create_circle(owner: DocumentId, name: &str, prefix: Option<&str>) -> Element {
    Element::svg(owner, SvgElementKind::Circle, name, prefix)
}

fn create_desc(owner: DocumentId, name: &str, prefix: Option<&str>) -> Element {
    Element::svg(owner, SvgElementKind::Desc, name, prefix)
}

fn create_foreign_object(owner: DocumentId, name: &str, prefix: Option<&str>) -> Element {
    Element::svg(owner, SvgElementKind::ForeignObject, name, prefix)
}

fn create_title(owner: DocumentId, name: &str, prefix: Option<&str>) -> Element {
    Element::svg(owner, SvgElementKind::Title, name, prefix)
}

static CREATORS: &[(&str, Creator)] = &[
    (tag_names::SVG, create_svg_root),
    (tag_names::CIRCLE, create_circle),
    (tag_names::DESC, create_desc),
    (tag_names::FOREIGN_OBJECT, create_foreign_object),
    (tag_names::TITLE, create_title),
];

/// Lowercase spelling -> SVG spelling, sorted by key for binary search.
static ADJUSTED_TAG_NAMES: &[(&str, &str)] = &[
    ("altglyph", "altGlyph"),
    ("altglyphdef", "altGlyphDef"),
    ("altglyphitem", "altGlyphItem"),
    ("animatecolor", "animateColor"),
    ("animatemotion", "animateMotion"),
    ("animatetransform", "animateTransform"),
    ("clippath", "clipPath"),
    ("feblend", "feBlend"),
    ("fecolormatrix", "feColorMatrix"),
    ("fecomponenttransfer", "feComponentTransfer"),
    ("fecomposite", "feComposite"),
    ("feconvolvematrix", "feConvolveMatrix"),
    ("fediffuselighting", "feDiffuseLighting"),
    ("fedisplacementmap", "feDisplacementMap"),
    ("fedistantlight", "feDistantLight"),
    ("feflood", "feFlood"),
    ("fefunca", "feFuncA"),
    ("fefuncb", "feFuncB"),
    ("fefuncg", "feFuncG"),
    ("fefuncr", "feFuncR"),
    ("fegaussianblur", "feGaussianBlur"),
    ("feimage", "feImage"),
    ("femerge", "feMerge"),
    ("femergenode", "feMergeNode"),
    ("femorphology", "feMorphology"),
    ("feoffset", "feOffset"),
    ("fepointlight", "fePointLight"),
    ("fespecularlighting", "feSpecularLighting"),
    ("fespotlight", "feSpotLight"),
    ("fetile", "feTile"),
    ("feturbulence", "feTurbulence"),
    ("foreignobject", "foreignObject"),
    ("glyphref", "glyphRef"),
    ("lineargradient", "linearGradient"),
    ("radialgradient", "radialGradient"),
    ("textpath", "textPath"),
];

/// Restore the SVG mixed-case spelling of a tag name lowercased by an
/// HTML-style tokenizer. Lookup is exact-case; unknown names pass through.
pub fn adjust_tag_name(local_name: &str) -> &str {
    match ADJUSTED_TAG_NAMES.binary_search_by(|(key, _)| (*key).cmp(local_name)) {
        Ok(index) => ADJUSTED_TAG_NAMES[index].1,
        Err(_) => local_name,
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SvgElementFactory;

impl SvgElementFactory {
    pub fn new() -> Self {
        Self
    }

    /// Create the SVG element variant for `local_name`.
    ///
    /// Never fails: unknown names yield `SvgElementKind::Unknown`. The element
    /// reports `local_name` exactly as given.
    pub fn create(&self, document: &Document, local_name: &str, prefix: Option<&str>) -> Element {
        let owner = document.id();
        let element = match CREATORS
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(local_name))
        {
            Some((_, creator)) => creator(owner, local_name, prefix),
            None => Element::svg(owner, SvgElementKind::Unknown, local_name, prefix),
        };
        log::trace!(
            target: "dom.factory",
            "svg <{}> -> {:?}",
            local_name,
            element.svg_kind()
        );
        element
    }

    /// Like [`create`](Self::create), after restoring the SVG spelling of
    /// `local_name` via [`adjust_tag_name`].
    pub fn create_normalized(&self, document: &Document, local_name: &str) -> Element {
        self.create(document, adjust_tag_name(local_name), None)
    }
}
