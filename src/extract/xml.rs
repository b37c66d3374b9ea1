// src/extract/xml.rs

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::{debug, trace, warn};

use super::{MarkupContent, MarkupNode, MarkupParser};

/// Deeper start tags are dropped (their text is kept on the innermost open
/// element). EDGAR text filings open `<S>`/`<C>` column markers and never
/// close them.
const MAX_DEPTH: usize = 256;
const MAX_ERRORS: usize = 1024;

/// `MarkupParser` over quick-xml that never rejects input: end tags close the
/// nearest open element with the same name (ASCII case-insensitive), stray end
/// tags are ignored, undecodable entities are kept verbatim, and unclosed
/// elements are closed at end of input. A `<` that does not open a tag (`1 < 2`,
/// `<<`, `<!x`, an unterminated `<?`) is kept as text and reading resumes right
/// after it.
#[derive(Debug, Clone, Copy, Default)]
pub struct TolerantXmlParser;

impl MarkupParser for TolerantXmlParser {
    fn parse(&self, raw: &[u8]) -> Option<MarkupNode> {
        let text = String::from_utf8_lossy(raw);
        let mut offset = 0;
        let mut reader = tolerant_reader(&text);

        let mut tree = TreeBuilder::new();
        let mut errors = 0;
        loop {
            let before = reader.buffer_position() as usize;
            let stray = match reader.read_event() {
                Ok(Event::Start(e)) if is_tag(&e) => {
                    tree.open(tag_name(&e));
                    false
                }
                Ok(Event::Empty(e)) if is_tag(&e) => {
                    tree.leaf(tag_name(&e));
                    false
                }
                Ok(Event::Start(_)) | Ok(Event::Empty(_)) => true,
                Ok(Event::End(e)) if is_name(e.name().as_ref()) => {
                    tree.close(&String::from_utf8_lossy(e.name().as_ref()));
                    false
                }
                Ok(Event::End(_)) => true,
                Ok(Event::Text(e)) => {
                    let s = match e.unescape() {
                        Ok(s) => s.into_owned(),
                        Err(_) => String::from_utf8_lossy(&e).into_owned(),
                    };
                    tree.text(s);
                    false
                }
                Ok(Event::CData(e)) => {
                    tree.text(String::from_utf8_lossy(&e).into_owned());
                    false
                }
                Ok(Event::Eof) => break,
                Ok(_) => false,
                Err(e) => {
                    trace!(error = %e, position = offset + before, "markup error");
                    true
                }
            };
            if !stray {
                continue;
            }

            errors += 1;
            let rest = &text[offset + before..];
            let Some(lt) = rest.find('<') else {
                tree.text(rest.to_string());
                break;
            };
            if errors >= MAX_ERRORS {
                warn!(errors, "giving up on malformed markup, keeping the rest as text");
                tree.text(rest.to_string());
                break;
            }
            tree.text(rest[..=lt].to_string());
            offset += before + lt + 1;
            reader = tolerant_reader(&text[offset..]);
        }

        let root = tree.finish();
        debug!(errors, recovered = !root.is_empty(), "parsed markup");
        if root.is_empty() {
            None
        } else {
            Some(root)
        }
    }
}

fn tolerant_reader(text: &str) -> Reader<&[u8]> {
    let mut reader = Reader::from_str(text);
    let config = reader.config_mut();
    config.check_end_names = false;
    config.allow_unmatched_ends = true;
    reader
}

/// XML name start: a letter, `_`, `:` or any non-ASCII byte.
fn is_name(name: &[u8]) -> bool {
    name.first()
        .is_some_and(|&b| b.is_ascii_alphabetic() || b == b'_' || b == b':' || !b.is_ascii())
}

/// A start tag that swallowed another `<` ran over markup that was never
/// meant as a tag.
fn is_tag(e: &BytesStart<'_>) -> bool {
    is_name(e.name().as_ref()) && !e.contains(&b'<')
}

fn tag_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.name().as_ref()).into_owned()
}

struct TreeBuilder {
    stack: Vec<MarkupNode>,
}

impl TreeBuilder {
    fn new() -> Self {
        Self {
            stack: vec![MarkupNode::default()],
        }
    }

    fn top(&mut self) -> &mut MarkupNode {
        // the document root is never popped
        let last = self.stack.len() - 1;
        &mut self.stack[last]
    }

    fn open(&mut self, tag: String) {
        if self.stack.len() > MAX_DEPTH {
            return;
        }
        self.stack.push(MarkupNode::new(tag));
    }

    fn leaf(&mut self, tag: String) {
        self.top()
            .children
            .push(MarkupContent::Element(MarkupNode::new(tag)));
    }

    fn text(&mut self, s: String) {
        if !s.is_empty() {
            self.top().children.push(MarkupContent::Text(s));
        }
    }

    fn close(&mut self, tag: &str) {
        let Some(idx) = self
            .stack
            .iter()
            .rposition(|n| n.tag.eq_ignore_ascii_case(tag))
            .filter(|&i| i > 0)
        else {
            return;
        };
        while self.stack.len() > idx {
            self.pop();
        }
    }

    fn pop(&mut self) {
        if self.stack.len() < 2 {
            return;
        }
        if let Some(node) = self.stack.pop() {
            self.top().children.push(MarkupContent::Element(node));
        }
    }

    fn finish(mut self) -> MarkupNode {
        while self.stack.len() > 1 {
            self.pop();
        }
        self.stack.pop().unwrap_or_default()
    }
}
