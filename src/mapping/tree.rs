#![forbid(unsafe_code)]

//! In-memory mapping table
//!
//! Classes keep insertion order and are unique by source name. Members are
//! unique by `(name, descriptor)` within their class, method arguments by
//! local variable index.

use std::collections::HashMap;

/// Names of one element in every destination namespace
///
/// `None` means the element has no name in that namespace.
pub type DstNames = Vec<Option<String>>;

/// A complete mapping table between one source and several destination namespaces
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingTree {
    src_namespace: String,
    dst_namespaces: Vec<String>,
    classes: Vec<ClassMapping>,
    index: HashMap<String, usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassMapping {
    pub src_name: String,
    pub dst_names: DstNames,
    pub comment: Option<String>,
    pub fields: Vec<MemberMapping>,
    pub methods: Vec<MethodMapping>,
}

/// A field, or the member part of a method
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberMapping {
    pub src_name: String,
    pub src_desc: Option<String>,
    pub dst_names: DstNames,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodMapping {
    pub member: MemberMapping,
    pub args: Vec<ArgMapping>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgMapping {
    pub lv_index: u32,
    pub src_name: Option<String>,
    pub dst_names: DstNames,
    pub comment: Option<String>,
}

impl MappingTree {
    pub fn new(src_namespace: impl Into<String>, dst_namespaces: Vec<String>) -> Self {
        MappingTree {
            src_namespace: src_namespace.into(),
            dst_namespaces,
            classes: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn src_namespace(&self) -> &str {
        &self.src_namespace
    }

    pub fn dst_namespaces(&self) -> &[String] {
        &self.dst_namespaces
    }

    pub fn classes(&self) -> &[ClassMapping] {
        &self.classes
    }

    pub fn class(&self, src_name: &str) -> Option<&ClassMapping> {
        self.index.get(src_name).map(|&i| &self.classes[i])
    }

    pub fn classes_mut(&mut self) -> &mut [ClassMapping] {
        &mut self.classes
    }

    /// Index of the class with the given source name, creating it if needed
    pub fn class_index(&mut self, src_name: &str) -> usize {
        if let Some(&idx) = self.index.get(src_name) {
            return idx;
        }
        let idx = self.classes.len();
        self.classes
            .push(ClassMapping::new(src_name, self.dst_namespaces.len()));
        self.index.insert(src_name.to_string(), idx);
        idx
    }

    /// Returns the class with the given source name, creating it if needed
    pub fn class_mut(&mut self, src_name: &str) -> &mut ClassMapping {
        let idx = self.class_index(src_name);
        &mut self.classes[idx]
    }
}

impl ClassMapping {
    fn new(src_name: &str, dst_count: usize) -> Self {
        ClassMapping {
            src_name: src_name.to_string(),
            dst_names: vec![None; dst_count],
            comment: None,
            fields: Vec::new(),
            methods: Vec::new(),
        }
    }

    /// Destination name at `ns`, if present
    pub fn dst_name(&self, ns: usize) -> Option<&str> {
        self.dst_names.get(ns).and_then(|n| n.as_deref())
    }

    pub fn field_index(&mut self, src_name: &str, src_desc: Option<&str>) -> usize {
        if let Some(idx) = self.fields.iter().position(|f| f.matches(src_name, src_desc)) {
            return idx;
        }
        self.fields
            .push(MemberMapping::new(src_name, src_desc, self.dst_names.len()));
        self.fields.len() - 1
    }

    pub fn field_mut(&mut self, src_name: &str, src_desc: Option<&str>) -> &mut MemberMapping {
        let idx = self.field_index(src_name, src_desc);
        &mut self.fields[idx]
    }

    pub fn method_index(&mut self, src_name: &str, src_desc: Option<&str>) -> usize {
        if let Some(idx) = self
            .methods
            .iter()
            .position(|m| m.member.matches(src_name, src_desc))
        {
            return idx;
        }
        self.methods.push(MethodMapping {
            member: MemberMapping::new(src_name, src_desc, self.dst_names.len()),
            args: Vec::new(),
        });
        self.methods.len() - 1
    }

    pub fn method_mut(&mut self, src_name: &str, src_desc: Option<&str>) -> &mut MethodMapping {
        let idx = self.method_index(src_name, src_desc);
        &mut self.methods[idx]
    }
}

impl MemberMapping {
    fn new(src_name: &str, src_desc: Option<&str>, dst_count: usize) -> Self {
        MemberMapping {
            src_name: src_name.to_string(),
            src_desc: src_desc.map(str::to_string),
            dst_names: vec![None; dst_count],
            comment: None,
        }
    }

    fn matches(&self, src_name: &str, src_desc: Option<&str>) -> bool {
        self.src_name == src_name && self.src_desc.as_deref() == src_desc
    }

    pub fn dst_name(&self, ns: usize) -> Option<&str> {
        self.dst_names.get(ns).and_then(|n| n.as_deref())
    }
}

impl MethodMapping {
    pub fn arg_index(&mut self, lv_index: u32) -> usize {
        if let Some(idx) = self.args.iter().position(|a| a.lv_index == lv_index) {
            return idx;
        }
        self.args.push(ArgMapping {
            lv_index,
            src_name: None,
            dst_names: vec![None; self.member.dst_names.len()],
            comment: None,
        });
        self.args.len() - 1
    }

    pub fn arg_mut(&mut self, lv_index: u32) -> &mut ArgMapping {
        let idx = self.arg_index(lv_index);
        &mut self.args[idx]
    }
}

/// Turns a list of names into destination names, treating empty strings as absent
pub(crate) fn dst_names_from<'a>(names: impl IntoIterator<Item = &'a str>, dst_count: usize) -> DstNames {
    let mut out: DstNames = names
        .into_iter()
        .take(dst_count)
        .map(|n| (!n.is_empty()).then(|| n.to_string()))
        .collect();
    out.resize(dst_count, None);
    out
}

/// Appends a comment line, joining consecutive comments with a newline
pub(crate) fn append_comment(slot: &mut Option<String>, text: &str) {
    match slot {
        Some(existing) => {
            existing.push('\n');
            existing.push_str(text);
        }
        None => *slot = Some(text.to_string()),
    }
}
