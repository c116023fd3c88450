//! JSON Pointer (RFC 6901) values used to correlate schema-validation
//! failures with the instance location that triggered them.
//!
//! Modeled after `crates/jsonschema/src/paths.rs` in the jsonschema-rs
//! family: a flat sequence of path chunks rather than a linked list,
//! since our trees are built once and walked many times rather than
//! extended on every recursive call.
use serde_json::Value;
use std::fmt;

/// A single step into a JSON document: either an object property or
/// an array index.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum PointerChunk {
    Property(String),
    Index(usize),
}

impl From<&str> for PointerChunk {
    fn from(value: &str) -> Self {
        PointerChunk::Property(value.to_string())
    }
}

impl From<String> for PointerChunk {
    fn from(value: String) -> Self {
        PointerChunk::Property(value)
    }
}

impl From<usize> for PointerChunk {
    fn from(value: usize) -> Self {
        PointerChunk::Index(value)
    }
}

/// A JSON Pointer, represented as its decoded chunks.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct JsonPointer(Vec<PointerChunk>);

impl JsonPointer {
    pub fn root() -> Self {
        JsonPointer(Vec::new())
    }

    pub fn from_chunks(chunks: Vec<PointerChunk>) -> Self {
        JsonPointer(chunks)
    }

    #[must_use]
    pub fn child(&self, chunk: impl Into<PointerChunk>) -> Self {
        let mut chunks = self.0.clone();
        chunks.push(chunk.into());
        JsonPointer(chunks)
    }

    pub fn chunks(&self) -> &[PointerChunk] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Parse a pointer string such as `/a/b/3/c` into chunks. Numeric
    /// segments are kept as `Index`; everything else is a `Property`
    /// with `~1`/`~0` escapes decoded per RFC 6901.
    pub fn parse(pointer: &str) -> Self {
        if pointer.is_empty() {
            return JsonPointer::root();
        }
        let chunks = pointer
            .split('/')
            .skip(1)
            .map(|segment| {
                let decoded = segment.replace("~1", "/").replace("~0", "~");
                match decoded.parse::<usize>() {
                    Ok(index) if !decoded.starts_with('0') || decoded == "0" => {
                        PointerChunk::Index(index)
                    }
                    _ => PointerChunk::Property(decoded),
                }
            })
            .collect();
        JsonPointer(chunks)
    }

    /// Resolve this pointer against a JSON document, mirroring
    /// `serde_json::Value::pointer` but operating on our own chunk
    /// representation so pointers built during schema compilation and
    /// pointers parsed from validator output share one resolver.
    pub fn resolve<'a>(&self, document: &'a Value) -> Option<&'a Value> {
        let mut current = document;
        for chunk in &self.0 {
            current = match (chunk, current) {
                (PointerChunk::Property(key), Value::Object(map)) => map.get(key)?,
                (PointerChunk::Index(idx), Value::Array(items)) => items.get(*idx)?,
                _ => return None,
            };
        }
        Some(current)
    }
}

impl fmt::Display for JsonPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for chunk in &self.0 {
            f.write_str("/")?;
            match chunk {
                PointerChunk::Property(value) => {
                    for ch in value.chars() {
                        match ch {
                            '~' => f.write_str("~0")?,
                            '/' => f.write_str("~1")?,
                            _ => f.write_fmt(format_args!("{}", ch))?,
                        }
                    }
                }
                PointerChunk::Index(idx) => f.write_fmt(format_args!("{}", idx))?,
            }
        }
        Ok(())
    }
}
