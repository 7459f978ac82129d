//! Asset contents with multi-part concatenation.
//!
//! Copyright (c) 2025 Posit, PBC
//!
//! A [`ConcatSource`] keeps every part it was built from, so a host that
//! emits source maps can attribute each byte range of the final asset to the
//! part it came from. Text is only flattened when asked for.

use std::borrow::Cow;
use std::sync::Arc;

/// Content of a compilation asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// Plain text. Cloning shares the underlying buffer.
    Raw(Arc<str>),
    /// Ordered concatenation of other sources.
    Concat(ConcatSource),
}

impl Source {
    pub fn raw(text: impl Into<Arc<str>>) -> Self {
        Source::Raw(text.into())
    }

    /// The full text of this source.
    pub fn source(&self) -> Cow<'_, str> {
        match self {
            Source::Raw(text) => Cow::Borrowed(&**text),
            Source::Concat(concat) => Cow::Owned(concat.source()),
        }
    }

    /// Length of the full text in bytes.
    pub fn size(&self) -> usize {
        match self {
            Source::Raw(text) => text.len(),
            Source::Concat(concat) => concat.size(),
        }
    }

    /// The full text as bytes.
    pub fn buffer(&self) -> Vec<u8> {
        self.source().into_owned().into_bytes()
    }

    fn write_to(&self, out: &mut String) {
        match self {
            Source::Raw(text) => out.push_str(text),
            Source::Concat(concat) => concat.children.iter().for_each(|c| c.write_to(out)),
        }
    }
}

impl Default for Source {
    fn default() -> Self {
        Source::Raw(Arc::from(""))
    }
}

impl From<&str> for Source {
    fn from(text: &str) -> Self {
        Source::Raw(Arc::from(text))
    }
}

impl From<String> for Source {
    fn from(text: String) -> Self {
        Source::Raw(Arc::from(text))
    }
}

impl From<Arc<str>> for Source {
    fn from(text: Arc<str>) -> Self {
        Source::Raw(text)
    }
}

impl From<ConcatSource> for Source {
    fn from(concat: ConcatSource) -> Self {
        Source::Concat(concat)
    }
}

/// Ordered list of sources treated as one asset.
///
/// Children are never merged: adding a concatenation as a child keeps it as
/// a single part.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConcatSource {
    children: Vec<Source>,
}

/// Where one part of a concatenation lands in the flattened text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourcePiece {
    /// Index of the child this piece describes
    pub index: usize,
    /// Where this piece starts in the concatenated string
    pub offset_in_concat: usize,
    /// Length of this piece
    pub length: usize,
}

impl ConcatSource {
    pub fn new<I, S>(children: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Source>,
    {
        Self {
            children: children.into_iter().map(Into::into).collect(),
        }
    }

    pub fn add(&mut self, child: impl Into<Source>) {
        self.children.push(child.into());
    }

    pub fn children(&self) -> &[Source] {
        &self.children
    }

    /// Offsets and lengths of every child in the flattened text.
    pub fn pieces(&self) -> Vec<SourcePiece> {
        let mut cumulative_offset = 0;
        self.children
            .iter()
            .enumerate()
            .map(|(index, child)| {
                let length = child.size();
                let piece = SourcePiece {
                    index,
                    offset_in_concat: cumulative_offset,
                    length,
                };
                cumulative_offset += length;
                piece
            })
            .collect()
    }

    /// Flatten every child into one string.
    pub fn source(&self) -> String {
        let mut out = String::with_capacity(self.size());
        self.children.iter().for_each(|c| c.write_to(&mut out));
        out
    }

    pub fn size(&self) -> usize {
        self.children.iter().map(Source::size).sum()
    }
}
