#![forbid(unsafe_code)]

//! ProGuard / R8 mapping reader
//!
//! The left-hand side of each `->` is read into the source namespace and the
//! right-hand side into the single destination namespace. Java type names are
//! converted to JVM descriptors in the source namespace.

use super::{MappingError, MappingTree, Namespaces};
use regex::Regex;
use std::io::BufRead;
use std::sync::LazyLock;

const FORMAT: &str = "proguard";

static CLASS_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\S+) -> (\S+):$").expect("valid class regex"));

// [startLine:endLine:]type name[(args)][:origStart[:origEnd]] -> obf
static MEMBER_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s+(?:\d+:\d+:)?(\S+) ([^\s(]+)(?:\(([^)]*)\))?(?::\d+(?::\d+)?)? -> (\S+)$")
        .expect("valid member regex")
});

/// Reads a ProGuard mapping using the given default namespace names
pub fn read(reader: impl BufRead, namespaces: &Namespaces) -> Result<MappingTree, MappingError> {
    let mut tree = MappingTree::new(namespaces.source.clone(), vec![namespaces.target.clone()]);
    let mut current: Option<usize> = None;

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = idx + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        if !line.starts_with(char::is_whitespace) {
            let caps = CLASS_LINE
                .captures(&line)
                .ok_or_else(|| MappingError::parse(FORMAT, line_no, "malformed class line"))?;
            let c = tree.class_index(&internal_name(&caps[1]));
            tree.classes_mut()[c].dst_names[0] = Some(internal_name(&caps[2]));
            current = Some(c);
            continue;
        }

        let c = current
            .ok_or_else(|| MappingError::parse(FORMAT, line_no, "member line before any class"))?;
        let caps = MEMBER_LINE
            .captures(&line)
            .ok_or_else(|| MappingError::parse(FORMAT, line_no, "malformed member line"))?;
        let name = &caps[2];
        if name.contains('.') {
            // frame inlined from another class
            continue;
        }
        let ret = descriptor(&caps[1]);
        let dst = Some(caps[4].to_string());
        let class = &mut tree.classes_mut()[c];

        match caps.get(3) {
            Some(args) => {
                let params: String = args
                    .as_str()
                    .split(',')
                    .map(str::trim)
                    .filter(|a| !a.is_empty())
                    .map(descriptor)
                    .collect();
                let desc = format!("({params}){ret}");
                class.method_mut(name, Some(desc.as_str())).member.dst_names[0] = dst;
            }
            None => class.field_mut(name, Some(ret.as_str())).dst_names[0] = dst,
        }
    }

    Ok(tree)
}

fn internal_name(java_name: &str) -> String {
    java_name.replace('.', "/")
}

/// Converts a Java source type name such as `java.lang.String[]` to a descriptor
fn descriptor(java_type: &str) -> String {
    let mut base = java_type;
    let mut dims = 0;
    while let Some(stripped) = base.strip_suffix("[]") {
        base = stripped;
        dims += 1;
    }

    let elem = match base {
        "void" => "V".to_string(),
        "boolean" => "Z".to_string(),
        "byte" => "B".to_string(),
        "char" => "C".to_string(),
        "short" => "S".to_string(),
        "int" => "I".to_string(),
        "long" => "J".to_string(),
        "float" => "F".to_string(),
        "double" => "D".to_string(),
        other => format!("L{};", internal_name(other)),
    };
    format!("{}{}", "[".repeat(dims), elem)
}
