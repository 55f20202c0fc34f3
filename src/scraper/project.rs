//! Field projection over extracted JSON payloads.
//!
//! Bootstrap payloads are deep trees; the interesting fields sit several
//! levels down and any of them may be missing on a given page. Lookups here
//! are explicit and fallible: every accessor returns `Option`, so a missing
//! field is visible to the caller instead of silently becoming a default.

use serde_json::{Map, Value};

/// One step through the payload tree.
#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Key(String),
    Index(usize),
}

/// Parse a dotted path like `shoppingResult.products[0].price` into segments.
///
/// Returns `None` for syntactically broken paths (empty segment, unclosed or
/// non-numeric index).
fn parse_path(path: &str) -> Option<Vec<Segment>> {
    let mut segments = Vec::new();

    for part in path.split('.') {
        if part.is_empty() {
            return None;
        }

        let (key, mut rest) = match part.find('[') {
            Some(i) => (&part[..i], &part[i..]),
            None => (part, ""),
        };
        if !key.is_empty() {
            segments.push(Segment::Key(key.to_string()));
        } else if rest.is_empty() {
            return None;
        }

        while !rest.is_empty() {
            if !rest.starts_with('[') {
                return None;
            }
            let close = rest.find(']')?;
            let index: usize = rest[1..close].parse().ok()?;
            segments.push(Segment::Index(index));
            rest = &rest[close + 1..];
        }
    }

    if segments.is_empty() {
        return None;
    }
    Some(segments)
}

/// Walk `root` along `path`, returning the value it points at.
pub fn lookup<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    let segments = parse_path(path)?;
    let mut current = root;

    for segment in &segments {
        current = match segment {
            Segment::Key(key) => current.get(key.as_str())?,
            Segment::Index(index) => current.get(*index)?,
        };
    }

    Some(current)
}

/// Look up a string field.
pub fn lookup_str<'a>(root: &'a Value, path: &str) -> Option<&'a str> {
    lookup(root, path)?.as_str()
}

/// Look up an unsigned integer field.
pub fn lookup_u64(root: &Value, path: &str) -> Option<u64> {
    lookup(root, path)?.as_u64()
}

/// Look up a float field. Integers widen.
pub fn lookup_f64(root: &Value, path: &str) -> Option<f64> {
    lookup(root, path)?.as_f64()
}

/// Look up an array field.
pub fn lookup_array<'a>(root: &'a Value, path: &str) -> Option<&'a Vec<Value>> {
    lookup(root, path)?.as_array()
}

/// Declarative mapping from payload paths to flat output fields.
#[derive(Debug, Clone, Default)]
pub struct Projection {
    fields: Vec<(String, String)>, // (output name, path)
}

/// A flattened record plus the fields that failed to resolve.
#[derive(Debug, Clone)]
pub struct Projected {
    pub record: Map<String, Value>,
    pub missing: Vec<String>,
}

impl Projection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an output field sourced from `path`.
    pub fn field(mut self, name: &str, path: &str) -> Self {
        self.fields.push((name.to_string(), path.to_string()));
        self
    }

    /// Project `root` into a flat record. Fields whose path does not resolve
    /// are reported in `missing` rather than written as nulls.
    pub fn project(&self, root: &Value) -> Projected {
        let mut record = Map::new();
        let mut missing = Vec::new();

        for (name, path) in &self.fields {
            match lookup(root, path) {
                Some(value) => {
                    record.insert(name.clone(), value.clone());
                }
                None => missing.push(name.clone()),
            }
        }

        Projected { record, missing }
    }
}
