// src/extract/mod.rs

pub mod table;
pub mod xml;

pub use table::{extract_tables, NOISE_MARKERS};
pub use xml::TolerantXmlParser;

/// Parse possibly-malformed markup into a best-effort tree. Returns `None`
/// only when nothing at all could be recovered.
pub trait MarkupParser: Send + Sync {
    fn parse(&self, raw: &[u8]) -> Option<MarkupNode>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkupContent {
    Text(String),
    Element(MarkupNode),
}

/// An element and its mixed content, in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkupNode {
    pub tag: String,
    pub children: Vec<MarkupContent>,
}

impl MarkupNode {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            children: Vec::new(),
        }
    }

    /// This node and every element below it, depth first in document order.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }

    /// All text below this node concatenated in document order.
    pub fn text(&self) -> String {
        let mut out = String::new();
        let mut stack: Vec<&MarkupContent> = self.children.iter().rev().collect();
        while let Some(item) = stack.pop() {
            match item {
                MarkupContent::Text(t) => out.push_str(t),
                MarkupContent::Element(el) => stack.extend(el.children.iter().rev()),
            }
        }
        out
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

pub struct Descendants<'a> {
    stack: Vec<&'a MarkupNode>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a MarkupNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack
            .extend(node.children.iter().rev().filter_map(|c| match c {
                MarkupContent::Element(el) => Some(el),
                MarkupContent::Text(_) => None,
            }));
        Some(node)
    }
}
