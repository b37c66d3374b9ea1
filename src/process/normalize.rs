// src/process/normalize.rs

use tracing::trace;

/// How many leading single-space tokens may form the name.
pub const NAME_TOKENS: usize = 6;

/// One output row: `fields[0]` is the derived name, the rest are the other
/// whitespace tokens of the source line in their original order. Column counts
/// are not consistent across records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: Vec<String>,
}

impl Record {
    pub fn new(fields: Vec<String>) -> Self {
        Self { fields }
    }

    pub fn name(&self) -> &str {
        self.fields.first().map(String::as_str).unwrap_or("")
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn values(&self) -> &[String] {
        self.fields.get(1..).unwrap_or(&[])
    }
}

/// Split a free-form holdings line into a name and the remaining values.
///
/// Company names are padded with single spaces while columns are separated by
/// runs of whitespace, so the name is taken from the first six single-space
/// tokens and each of those is then removed, by value, from the leading six
/// whitespace tokens. A name token that also appears verbatim among the
/// leading values removes its first occurrence, which may be the wrong one.
pub fn normalize_line(line: &str) -> Record {
    let mut tokens: Vec<&str> = line.split_whitespace().collect();
    let name_tokens: Vec<&str> = line
        .split(' ')
        .take(NAME_TOKENS)
        .filter(|t| !t.is_empty())
        .collect();

    for tok in &name_tokens {
        let window = tokens.len().min(NAME_TOKENS);
        if let Some(pos) = tokens[..window].iter().position(|t| t == tok) {
            tokens.remove(pos);
        }
    }

    let mut fields = Vec::with_capacity(tokens.len() + 1);
    fields.push(name_tokens.join(" "));
    fields.extend(tokens.into_iter().map(str::to_string));
    let record = Record::new(fields);
    trace!(fields = ?record.fields(), "normalized");
    record
}

/// Normalize every line of an extracted table block. The block is trimmed as
/// a whole first; blank lines inside it become empty records.
pub fn normalize_block(text: &str) -> Vec<Record> {
    text.trim().split('\n').map(normalize_line).collect()
}
