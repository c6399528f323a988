use super::{XmlParseError, XmlParserOptions, XmlToken, XmlTokenizer};
use crate::svg::{SvgElementFactory, adjust_tag_name};
use crate::types::{Element, Namespace, NodeId};
use crate::Document;

#[derive(Debug)]
struct OpenElement {
    node: NodeId,
    /// Qualified name as written in the source, for end-tag matching.
    name: String,
    /// Length of the prefix-binding stack before this element's declarations.
    scope_len: usize,
}

/// Builds a document's node tree from XML tokens, one token at a time.
///
/// Elements resolving to the SVG namespace are created through
/// [`SvgElementFactory`]; an `<svg>` element without an explicit namespace
/// switches its subtree to SVG, as in HTML foreign content.
#[derive(Debug)]
pub struct XmlTreeBuilder {
    options: XmlParserOptions,
    factory: SvgElementFactory,
    open: Vec<OpenElement>,
    /// `(prefix, namespace)` bindings in declaration order; `""` is the
    /// default namespace.
    bindings: Vec<(String, Namespace)>,
    seen_root: bool,
}

impl XmlTreeBuilder {
    pub fn new(options: XmlParserOptions) -> Self {
        Self {
            options,
            factory: SvgElementFactory::new(),
            open: Vec::new(),
            bindings: Vec::new(),
            seen_root: false,
        }
    }

    pub fn options(&self) -> &XmlParserOptions {
        &self.options
    }

    fn current(&self) -> NodeId {
        self.open.last().map_or(NodeId::ROOT, |open| open.node)
    }

    fn resolve(&self, prefix: &str) -> Option<&Namespace> {
        self.bindings
            .iter()
            .rev()
            .find(|(bound, _)| bound == prefix)
            .map(|(_, ns)| ns)
    }

    pub fn push_token(
        &mut self,
        document: &mut Document,
        token: XmlToken,
    ) -> Result<(), XmlParseError> {
        match token {
            XmlToken::StartTag {
                name,
                attributes,
                self_closing,
                position,
            } => {
                let parent = self.current();
                if parent == NodeId::ROOT {
                    if self.seen_root {
                        if self.options.is_strict {
                            return Err(XmlParseError::ContentOutsideRoot { position });
                        }
                        log::debug!(target: "dom.xml", "second root element <{name}> at {position}");
                    }
                    self.seen_root = true;
                }

                let scope_len = self.bindings.len();
                let mut explicit_default = false;
                for (attr, value) in &attributes {
                    if attr == "xmlns" {
                        explicit_default = true;
                        self.bindings
                            .push((String::new(), Namespace::from_uri(value)));
                    } else if let Some(prefix) = attr.strip_prefix("xmlns:") {
                        self.bindings
                            .push((prefix.to_string(), Namespace::from_uri(value)));
                    }
                }

                let (prefix, local) = match name.split_once(':') {
                    Some((prefix, local)) => (Some(prefix), local),
                    None => (None, name.as_str()),
                };
                let mut namespace = self
                    .resolve(prefix.unwrap_or(""))
                    .cloned()
                    .unwrap_or(Namespace::None);
                if prefix.is_none()
                    && !explicit_default
                    && namespace != Namespace::Svg
                    && local.eq_ignore_ascii_case("svg")
                {
                    namespace = Namespace::Svg;
                    self.bindings.push((String::new(), Namespace::Svg));
                }

                let mut element = if namespace == Namespace::Svg {
                    match prefix {
                        None if self.options.fold_case => {
                            self.factory.create_normalized(document, local)
                        }
                        Some(_) if self.options.fold_case => {
                            self.factory.create(document, adjust_tag_name(local), prefix)
                        }
                        _ => self.factory.create(document, local, prefix),
                    }
                } else {
                    Element::new(document.id(), local, prefix, namespace)
                };
                for (attr, value) in attributes {
                    element.set_attribute(&attr, value);
                }
                log::trace!(target: "dom.xml", "start <{name}> at {position}");

                let node = document.append_element(parent, element);
                if self_closing {
                    self.bindings.truncate(scope_len);
                } else {
                    self.open.push(OpenElement {
                        node,
                        name,
                        scope_len,
                    });
                }
            }
            XmlToken::EndTag { name, position } => self.close(&name, position)?,
            XmlToken::Text { text, position } => {
                let parent = self.current();
                if parent == NodeId::ROOT {
                    if text.trim().is_empty() {
                        return Ok(());
                    }
                    if self.options.is_strict {
                        return Err(XmlParseError::ContentOutsideRoot { position });
                    }
                    log::debug!(target: "dom.xml", "dropped text outside root at {position}");
                    return Ok(());
                }
                document.append_text(parent, &text);
            }
            XmlToken::Comment(text) => {
                document.append_comment(self.current(), &text);
            }
        }
        Ok(())
    }

    fn close(
        &mut self,
        name: &str,
        position: core_types::TextPosition,
    ) -> Result<(), XmlParseError> {
        let Some(top) = self.open.last() else {
            if self.options.is_strict {
                return Err(XmlParseError::UnexpectedEndTag {
                    name: name.to_string(),
                    position,
                });
            }
            log::debug!(target: "dom.xml", "ignored end tag </{name}> at {position}");
            return Ok(());
        };

        if top.name != name {
            if self.options.is_strict {
                return Err(XmlParseError::MismatchedEndTag {
                    expected: top.name.clone(),
                    found: name.to_string(),
                    position,
                });
            }
            if !self.open.iter().any(|open| open.name == name) {
                log::debug!(target: "dom.xml", "ignored stray end tag </{name}> at {position}");
                return Ok(());
            }
        }

        while let Some(open) = self.open.pop() {
            self.bindings.truncate(open.scope_len);
            if open.name == name {
                break;
            }
        }
        Ok(())
    }

    /// Close out construction at end of input.
    pub fn finish(&mut self) -> Result<(), XmlParseError> {
        if let Some(open) = self.open.last() {
            if self.options.is_strict {
                return Err(XmlParseError::UnclosedElement {
                    name: open.name.clone(),
                });
            }
            log::debug!(
                target: "dom.xml",
                "implicitly closing {} open elements",
                self.open.len()
            );
        }
        self.open.clear();
        self.bindings.clear();
        Ok(())
    }
}

/// Parse the document's own text source into its tree, synchronously.
///
/// The source is leased for the duration, not copied. On error the tree
/// keeps whatever was built before the failure.
pub fn parse_into(document: &mut Document, options: XmlParserOptions) -> Result<(), XmlParseError> {
    let mut lease = document.lease_source();
    let (document, text) = lease.split();
    let mut tokenizer = XmlTokenizer::new(text).with_fold_case(options.fold_case);
    let mut builder = XmlTreeBuilder::new(options);
    while let Some(token) = tokenizer.next_token()? {
        builder.push_token(document, token)?;
    }
    builder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ElementKind, SvgElementKind};
    use tools::TextSource;

    fn parse(input: &str, options: XmlParserOptions) -> Result<Document, XmlParseError> {
        let mut document = Document::new_xml(None, TextSource::new(input));
        parse_into(&mut document, options)?;
        Ok(document)
    }

    fn parse_lenient(input: &str) -> Document {
        parse(input, XmlParserOptions::default()).expect("lenient parse never fails here")
    }

    fn strict() -> XmlParserOptions {
        XmlParserOptions {
            is_strict: true,
            ..XmlParserOptions::default()
        }
    }

    #[test]
    fn builds_nested_tree() {
        let doc = parse_lenient("<?xml version=\"1.0\"?>\n<r a=\"1\"><c>text</c><!--n--><d/></r>\n");
        assert_eq!(
            doc.outline(),
            "#document\n  <r a=\"1\">\n    <c>\n      #text \"text\"\n    #comment \"n\"\n    <d>\n"
        );
        let root = doc.document_element().expect("root");
        assert_eq!(doc.element(root).map(Element::local_name), Some("r"));
    }

    #[test]
    fn svg_subtree_uses_factory() {
        let doc = parse_lenient(
            "<page><svg><circle/><foreignObject><p/></foreignObject><rect/></svg><p/></page>",
        );
        let root = doc.document_element().expect("root");
        let kinds: Vec<ElementKind> = doc
            .children(doc.children(root)[0])
            .iter()
            .filter_map(|&id| doc.element(id).map(Element::kind))
            .collect();
        assert_eq!(
            kinds,
            vec![
                ElementKind::Svg(SvgElementKind::Circle),
                ElementKind::Svg(SvgElementKind::ForeignObject),
                ElementKind::Svg(SvgElementKind::Unknown),
            ]
        );
        let svg = doc.element(doc.children(root)[0]).expect("svg element");
        assert_eq!(svg.svg_kind(), Some(SvgElementKind::Svg));
        let trailing_p = doc.element(doc.children(root)[1]).expect("p element");
        assert_eq!(trailing_p.namespace(), &Namespace::None);
    }

    #[test]
    fn explicit_namespaces_are_resolved() {
        let doc = parse_lenient(
            "<r xmlns:s=\"http://www.w3.org/2000/svg\"><s:title/><x xmlns=\"urn:x\"><y/></x></r>",
        );
        let root = doc.document_element().expect("root");
        let title = doc.element(doc.children(root)[0]).expect("title");
        assert_eq!(title.svg_kind(), Some(SvgElementKind::Title));
        assert_eq!(title.prefix(), Some("s"));
        let x = doc.children(root)[1];
        let y = doc.element(doc.children(x)[0]).expect("y");
        assert_eq!(y.namespace(), &Namespace::Other("urn:x".to_string()));
    }

    #[test]
    fn folded_names_are_normalized_in_svg() {
        let options = XmlParserOptions {
            fold_case: true,
            ..XmlParserOptions::default()
        };
        let doc = parse("<SVG><ForeignObject/><clipPath/></SVG>", options).expect("parse");
        let svg = doc.document_element().expect("svg");
        let names: Vec<String> = doc
            .children(svg)
            .iter()
            .filter_map(|&id| doc.element(id).map(Element::tag_name))
            .collect();
        assert_eq!(names, vec!["foreignObject", "clipPath"]);
        assert_eq!(doc.element(svg).map(Element::tag_name).as_deref(), Some("svg"));
    }

    #[test]
    fn folded_prefixed_svg_names_are_normalized() {
        let options = XmlParserOptions {
            fold_case: true,
            ..XmlParserOptions::default()
        };
        let doc = parse(
            "<r xmlns:s=\"http://www.w3.org/2000/svg\"><s:foreignObject/><s:clipPath/></r>",
            options,
        )
        .expect("parse");
        let root = doc.document_element().expect("root");
        let children: Vec<&Element> = doc
            .children(root)
            .iter()
            .filter_map(|&id| doc.element(id))
            .collect();
        assert_eq!(children[0].local_name(), "foreignObject");
        assert_eq!(children[0].prefix(), Some("s"));
        assert_eq!(children[0].svg_kind(), Some(SvgElementKind::ForeignObject));
        assert_eq!(children[1].tag_name(), "s:clipPath");
        assert_eq!(children[1].svg_kind(), Some(SvgElementKind::Unknown));
    }

    #[test]
    fn source_survives_parsing() {
        let input = "<r><a></b></r>";
        let mut doc = Document::new_xml(None, TextSource::new(input));
        assert!(parse_into(&mut doc, strict()).is_err());
        assert_eq!(doc.source().text(), input);
        let root = doc.document_element().expect("partial root");
        assert_eq!(doc.children(root).len(), 1);

        let mut doc = Document::new_xml(None, TextSource::new(input));
        parse_into(&mut doc, XmlParserOptions::default()).expect("lenient");
        assert_eq!(doc.source().text(), input);
    }

    #[test]
    fn lenient_mode_recovers() {
        let doc = parse_lenient("stray<r><a><b></a>tail</x></r>extra");
        assert_eq!(
            doc.outline(),
            "#document\n  <r>\n    <a>\n      <b>\n    #text \"tail\"\n"
        );
    }

    #[test]
    fn strict_mode_reports_errors() {
        assert!(matches!(
            parse("<r><a></b></r>", strict()),
            Err(XmlParseError::MismatchedEndTag { expected, found, .. })
                if expected == "a" && found == "b"
        ));
        assert_eq!(
            parse("<r>", strict()).err(),
            Some(XmlParseError::UnclosedElement { name: "r".into() })
        );
        assert!(matches!(
            parse("<r/>x", strict()),
            Err(XmlParseError::ContentOutsideRoot { .. })
        ));
        assert!(matches!(
            parse("<r/><s/>", strict()),
            Err(XmlParseError::ContentOutsideRoot { .. })
        ));
        assert!(matches!(
            parse("</r>", strict()),
            Err(XmlParseError::UnexpectedEndTag { .. })
        ));
        assert!(parse("<r>\n</r>\n", strict()).is_ok());
    }
}
