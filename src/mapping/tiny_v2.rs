#![forbid(unsafe_code)]

//! Tiny v2 reader
//!
//! The body is indented with tabs; the indentation depth decides which
//! element a `c` (comment), `p` (parameter) or `v` (local variable) line
//! belongs to.

use super::tree::{append_comment, dst_names_from};
use super::{MappingError, MappingTree};
use std::io::BufRead;

const FORMAT: &str = "tiny v2";

/// Last element seen at each depth, as indices into the tree
#[derive(Debug, Clone, Copy)]
enum Scope {
    Root,
    Class(usize),
    Field(usize, usize),
    Method(usize, usize),
    Arg(usize, usize, usize),
    /// Inside a local variable entry; nested lines are ignored
    Local(usize, usize),
}

impl Scope {
    fn class(self) -> Option<usize> {
        match self {
            Scope::Root => None,
            Scope::Class(c)
            | Scope::Field(c, _)
            | Scope::Method(c, _)
            | Scope::Arg(c, _, _)
            | Scope::Local(c, _) => Some(c),
        }
    }

    fn method(self) -> Option<(usize, usize)> {
        match self {
            Scope::Method(c, m) | Scope::Arg(c, m, _) | Scope::Local(c, m) => Some((c, m)),
            _ => None,
        }
    }
}

/// Reads a tiny v2 table; namespaces come from the header
pub fn read(reader: impl BufRead) -> Result<MappingTree, MappingError> {
    let mut lines = reader.lines();

    let header = lines
        .next()
        .transpose()?
        .ok_or_else(|| MappingError::parse(FORMAT, 1, "empty file"))?;
    let columns: Vec<&str> = header.split('\t').collect();
    if columns.len() < 5 || columns[0] != "tiny" || columns[1] != "2" {
        return Err(MappingError::parse(FORMAT, 1, "invalid tiny v2 header"));
    }
    let dst_count = columns.len() - 4;
    let mut tree = MappingTree::new(
        columns[3],
        columns[4..].iter().map(|s| s.to_string()).collect(),
    );

    let mut escaped = false;
    let mut in_properties = true;
    let mut scope = Scope::Root;

    for (idx, line) in lines.enumerate() {
        let line = line?;
        let line_no = idx + 2;
        if line.trim().is_empty() {
            continue;
        }

        let depth = line.bytes().take_while(|&b| b == b'\t').count();
        let owned: Vec<String> = line[depth..]
            .split('\t')
            .map(|p| if escaped { unescape(p) } else { p.to_string() })
            .collect();
        let parts: Vec<&str> = owned.iter().map(String::as_str).collect();

        if in_properties && depth == 1 {
            if parts[0] == "escaped-names" {
                escaped = true;
            }
            continue;
        }
        in_properties = false;

        let unexpected =
            || MappingError::parse(FORMAT, line_no, format!("unexpected '{}' entry", parts[0]));
        let text = parts.get(1).copied().unwrap_or("");

        scope = match (depth, parts[0]) {
            (0, "c") => {
                let name = non_empty(&parts, 1)
                    .ok_or_else(|| MappingError::parse(FORMAT, line_no, "class without a name"))?;
                let c = tree.class_index(name);
                tree.classes_mut()[c].dst_names =
                    dst_names_from(parts[2..].iter().copied(), dst_count);
                Scope::Class(c)
            }
            (1, "f" | "m") => {
                let c = scope.class().ok_or_else(unexpected)?;
                let (Some(desc), Some(name)) = (non_empty(&parts, 1), non_empty(&parts, 2)) else {
                    return Err(MappingError::parse(FORMAT, line_no, "member without name or descriptor"));
                };
                let dst_names = dst_names_from(parts[3..].iter().copied(), dst_count);
                let class = &mut tree.classes_mut()[c];
                if parts[0] == "f" {
                    let f = class.field_index(name, Some(desc));
                    class.fields[f].dst_names = dst_names;
                    Scope::Field(c, f)
                } else {
                    let m = class.method_index(name, Some(desc));
                    class.methods[m].member.dst_names = dst_names;
                    Scope::Method(c, m)
                }
            }
            (1, "c") => {
                let c = scope.class().ok_or_else(unexpected)?;
                append_comment(&mut tree.classes_mut()[c].comment, text);
                Scope::Class(c)
            }
            (2, "p") => {
                let (c, m) = scope.method().ok_or_else(unexpected)?;
                let lv_index: u32 = text.parse().map_err(|_| {
                    MappingError::parse(FORMAT, line_no, format!("invalid lv index '{text}'"))
                })?;
                let method = &mut tree.classes_mut()[c].methods[m];
                let a = method.arg_index(lv_index);
                let arg = &mut method.args[a];
                arg.src_name = non_empty(&parts, 2).map(str::to_string);
                arg.dst_names = dst_names_from(parts.iter().skip(3).copied(), dst_count);
                Scope::Arg(c, m, a)
            }
            (2, "v") => {
                let (c, m) = scope.method().ok_or_else(unexpected)?;
                Scope::Local(c, m)
            }
            (2, "c") => {
                let class = &mut tree.classes_mut()[scope.class().ok_or_else(unexpected)?];
                match scope {
                    Scope::Field(_, f) => append_comment(&mut class.fields[f].comment, text),
                    Scope::Method(_, m) | Scope::Arg(_, m, _) | Scope::Local(_, m) => {
                        append_comment(&mut class.methods[m].member.comment, text)
                    }
                    _ => return Err(unexpected()),
                }
                scope
            }
            (3, "c") => match scope {
                Scope::Arg(c, m, a) => {
                    append_comment(&mut tree.classes_mut()[c].methods[m].args[a].comment, text);
                    scope
                }
                Scope::Local(..) => scope,
                _ => return Err(unexpected()),
            },
            _ => return Err(unexpected()),
        };
    }

    Ok(tree)
}

fn non_empty<'a>(parts: &[&'a str], idx: usize) -> Option<&'a str> {
    parts.get(idx).copied().filter(|s| !s.is_empty())
}

/// Reverses the tiny v2 name escaping
fn unescape(s: &str) -> String {
    if !s.contains('\\') {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('0') => out.push('\0'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}
