#![forbid(unsafe_code)]

//! Tiny v1 reader
//!
//! ```text
//! v1	official	intermediary	named
//! CLASS	a	net/minecraft/class_1	net/minecraft/Foo
//! FIELD	a	I	b	field_1	count
//! METHOD	a	(I)V	c	method_1	setCount
//! ```

use super::tree::dst_names_from;
use super::{MappingError, MappingTree};
use std::io::BufRead;

const FORMAT: &str = "tiny v1";

/// Reads a tiny v1 table; namespaces come from the header
pub fn read(reader: impl BufRead) -> Result<MappingTree, MappingError> {
    let mut lines = reader.lines();

    let header = lines
        .next()
        .transpose()?
        .ok_or_else(|| MappingError::parse(FORMAT, 1, "empty file"))?;
    let mut columns = header.split('\t');
    if columns.next() != Some("v1") {
        return Err(MappingError::parse(FORMAT, 1, "missing v1 header"));
    }
    let namespaces: Vec<String> = columns.map(str::to_string).collect();
    let Some((src, dsts)) = namespaces.split_first() else {
        return Err(MappingError::parse(FORMAT, 1, "header declares no namespaces"));
    };
    let dst_count = dsts.len();
    let mut tree = MappingTree::new(src.clone(), dsts.to_vec());

    for (idx, line) in lines.enumerate() {
        let line = line?;
        let line_no = idx + 2;
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let parts: Vec<&str> = line.split('\t').collect();
        match parts[0] {
            "CLASS" => {
                let name = required(&parts, 1, line_no)?;
                let class = tree.class_mut(name);
                class.dst_names = dst_names_from(parts[2..].iter().copied(), dst_count);
            }
            "FIELD" => {
                let owner = required(&parts, 1, line_no)?;
                let desc = required(&parts, 2, line_no)?;
                let name = required(&parts, 3, line_no)?;
                let field = tree.class_mut(owner).field_mut(name, Some(desc));
                field.dst_names = dst_names_from(parts[4..].iter().copied(), dst_count);
            }
            "METHOD" => {
                let owner = required(&parts, 1, line_no)?;
                let desc = required(&parts, 2, line_no)?;
                let name = required(&parts, 3, line_no)?;
                let method = tree.class_mut(owner).method_mut(name, Some(desc));
                method.member.dst_names = dst_names_from(parts[4..].iter().copied(), dst_count);
            }
            _ => {}
        }
    }

    Ok(tree)
}

fn required<'a>(parts: &[&'a str], idx: usize, line: usize) -> Result<&'a str, MappingError> {
    match parts.get(idx) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(MappingError::parse(
            FORMAT,
            line,
            format!("{} entry is missing column {}", parts[0], idx + 1),
        )),
    }
}
