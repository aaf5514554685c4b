#![forbid(unsafe_code)]

//! Tiny v1 / v2 writer sink
//!
//! Output is rendered in memory, written to a temp file next to the
//! destination and persisted over it only once everything succeeded.

use super::{MappingSink, MappingTree};
use crate::error::ConvertError;
use serde::Deserialize;
use std::fmt::{self, Write as _};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::info;

/// Tiny format version to emit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Tiny1,
    #[default]
    Tiny2,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Tiny1 => f.write_str("tiny1"),
            OutputFormat::Tiny2 => f.write_str("tiny2"),
        }
    }
}

/// Writes accepted mapping tables to a tiny file
pub struct TinyWriter {
    path: PathBuf,
    format: OutputFormat,
}

impl TinyWriter {
    pub fn new(path: impl Into<PathBuf>, format: OutputFormat) -> Self {
        TinyWriter {
            path: path.into(),
            format,
        }
    }

    fn persist(&self, contents: &str) -> Result<(), ConvertError> {
        let write_err = |source: std::io::Error| ConvertError::Write {
            path: self.path.clone(),
            source,
        };

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
        tmp.write_all(contents.as_bytes()).map_err(write_err)?;
        tmp.flush().map_err(write_err)?;
        tmp.persist(&self.path).map_err(|e| write_err(e.error))?;
        Ok(())
    }
}

impl MappingSink for TinyWriter {
    fn accept(&mut self, tree: MappingTree) -> Result<(), ConvertError> {
        let contents = match self.format {
            OutputFormat::Tiny1 => render_tiny_v1(&tree),
            OutputFormat::Tiny2 => render_tiny_v2(&tree),
        };
        self.persist(&contents)?;
        info!(
            path = %self.path.display(),
            format = %self.format,
            classes = tree.classes().len(),
            "wrote mappings"
        );
        Ok(())
    }
}

fn push_names(out: &mut String, names: &[Option<String>]) {
    for name in names {
        out.push('\t');
        out.push_str(name.as_deref().unwrap_or(""));
    }
}

/// Renders a tree as tiny v1; comments and arguments have no v1 form
pub fn render_tiny_v1(tree: &MappingTree) -> String {
    let mut out = String::from("v1\t");
    out.push_str(tree.src_namespace());
    for ns in tree.dst_namespaces() {
        out.push('\t');
        out.push_str(ns);
    }
    out.push('\n');

    for class in tree.classes() {
        out.push_str("CLASS\t");
        out.push_str(&class.src_name);
        push_names(&mut out, &class.dst_names);
        out.push('\n');
    }

    for class in tree.classes() {
        for field in &class.fields {
            let _ = write!(
                out,
                "FIELD\t{}\t{}\t{}",
                class.src_name,
                field.src_desc.as_deref().unwrap_or(""),
                field.src_name
            );
            push_names(&mut out, &field.dst_names);
            out.push('\n');
        }
        for method in &class.methods {
            let _ = write!(
                out,
                "METHOD\t{}\t{}\t{}",
                class.src_name,
                method.member.src_desc.as_deref().unwrap_or(""),
                method.member.src_name
            );
            push_names(&mut out, &method.member.dst_names);
            out.push('\n');
        }
    }

    out
}

fn push_comment(out: &mut String, depth: usize, comment: Option<&str>) {
    if let Some(comment) = comment {
        out.push_str(&"\t".repeat(depth));
        out.push_str("c\t");
        // escaping is disabled, so line breaks are flattened
        out.push_str(&comment.replace(['\n', '\t'], " "));
        out.push('\n');
    }
}

/// Renders a tree as tiny v2 without name escaping
pub fn render_tiny_v2(tree: &MappingTree) -> String {
    let mut out = String::from("tiny\t2\t0\t");
    out.push_str(tree.src_namespace());
    for ns in tree.dst_namespaces() {
        out.push('\t');
        out.push_str(ns);
    }
    out.push('\n');

    for class in tree.classes() {
        out.push_str("c\t");
        out.push_str(&class.src_name);
        push_names(&mut out, &class.dst_names);
        out.push('\n');
        push_comment(&mut out, 1, class.comment.as_deref());

        for field in &class.fields {
            let _ = write!(
                out,
                "\tf\t{}\t{}",
                field.src_desc.as_deref().unwrap_or(""),
                field.src_name
            );
            push_names(&mut out, &field.dst_names);
            out.push('\n');
            push_comment(&mut out, 2, field.comment.as_deref());
        }

        for method in &class.methods {
            let _ = write!(
                out,
                "\tm\t{}\t{}",
                method.member.src_desc.as_deref().unwrap_or(""),
                method.member.src_name
            );
            push_names(&mut out, &method.member.dst_names);
            out.push('\n');
            push_comment(&mut out, 2, method.member.comment.as_deref());

            for arg in &method.args {
                let _ = write!(
                    out,
                    "\t\tp\t{}\t{}",
                    arg.lv_index,
                    arg.src_name.as_deref().unwrap_or("")
                );
                push_names(&mut out, &arg.dst_names);
                out.push('\n');
                push_comment(&mut out, 3, arg.comment.as_deref());
            }
        }
    }

    out
}
