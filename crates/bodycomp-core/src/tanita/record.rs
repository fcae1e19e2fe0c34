//! Tokenizer for the packed key/value line format.
//!
//! A device line is a flat comma-separated list of alternating keys and
//! values: `key0,value0,key1,value1,...`. Values may be double-quoted and a
//! quoted value may itself contain a comma (`Wk,"72,3"`).

/// Setter applied to a record when its key code is seen.
pub type FieldSetter<T> = fn(&mut T, &str);

/// One tokenized device line, as ordered key/value pairs.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyValueLine<'a> {
    pairs: Vec<(&'a str, &'a str)>,
}

impl<'a> KeyValueLine<'a> {
    /// Tokenize one line. Pairs with an empty key or value are dropped.
    pub fn parse(line: &'a str) -> Self {
        let tokens = split_tokens(line);
        let pairs = tokens
            .chunks(2)
            .filter_map(|chunk| match chunk {
                [key, value] => {
                    let key = key.trim().trim_matches('"');
                    let value = value.trim();
                    if key.is_empty() || value.is_empty() {
                        None
                    } else {
                        Some((key, value))
                    }
                }
                _ => None,
            })
            .collect();
        Self { pairs }
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Run each pair through a field table, in line order.
    ///
    /// Keys are matched exact-case; unknown keys are ignored. Returns the
    /// number of pairs that hit the table.
    pub fn apply<T>(&self, target: &mut T, table: &[(&str, FieldSetter<T>)]) -> usize {
        let mut applied = 0;
        for (key, value) in &self.pairs {
            if let Some((_, setter)) = table.iter().find(|(code, _)| code == key) {
                setter(target, value);
                applied += 1;
            }
        }
        applied
    }
}

/// Split on commas that sit outside double quotes.
///
/// An unbalanced quote falls back to splitting on every comma, so a stray
/// `"` costs at most the field it sits in.
fn split_tokens(line: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;
    for (i, c) in line.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                tokens.push(&line[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if in_quotes {
        return line.split(',').collect();
    }
    tokens.push(&line[start..]);
    tokens
}
