#![forbid(unsafe_code)]

//! Enigma mapping reader
//!
//! An Enigma mapping set is a tree of `*.mapping` files, either on disk or
//! inside a zip archive. Each file holds tab-indented entries:
//!
//! ```text
//! CLASS a net/minecraft/Foo
//! 	COMMENT A foo.
//! 	FIELD b count I
//! 	METHOD c setCount (I)V
//! 		ARG 1 value
//! 	CLASS d Inner
//! ```

use super::tree::append_comment;
use super::{MappingError, MappingTree, Namespaces};
use globset::{Glob, GlobMatcher};
use ignore::WalkBuilder;
use std::fs::File;
use std::io::{BufRead, BufReader, Cursor, Read};
use std::path::Path;
use std::sync::LazyLock;
use tracing::trace;
use zip::ZipArchive;

const FORMAT: &str = "enigma";

static MAPPING_FILES: LazyLock<GlobMatcher> = LazyLock::new(|| {
    Glob::new("**/*.mapping")
        .expect("valid mapping glob")
        .compile_matcher()
});

/// Reads every `*.mapping` file below a directory, in path order
pub fn read_directory(root: &Path, namespaces: &Namespaces) -> Result<MappingTree, MappingError> {
    let mut parser = EnigmaParser::new(namespaces);

    for entry in WalkBuilder::new(root)
        .standard_filters(false)
        .sort_by_file_path(|a, b| a.cmp(b))
        .build()
    {
        let entry = entry?;
        let is_file = entry.file_type().is_some_and(|t| t.is_file());
        let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
        if !is_file || !MAPPING_FILES.is_match(relative) {
            continue;
        }

        trace!(file = %entry.path().display(), "reading enigma file");
        let reader = BufReader::new(File::open(entry.path())?);
        parser.parse(reader, &relative.to_string_lossy())?;
    }

    Ok(parser.finish())
}

/// Reads every `*.mapping` entry of a zip archive, treating the archive as the root
pub fn read_archive(path: &Path, namespaces: &Namespaces) -> Result<MappingTree, MappingError> {
    let mut archive = ZipArchive::new(BufReader::new(File::open(path)?))?;
    let mut names: Vec<String> = archive
        .file_names()
        .filter(|name| !name.ends_with('/') && MAPPING_FILES.is_match(name))
        .map(str::to_string)
        .collect();
    names.sort();

    let mut parser = EnigmaParser::new(namespaces);
    for name in names {
        trace!(entry = %name, "reading enigma archive entry");
        let mut contents = Vec::new();
        archive.by_name(&name)?.read_to_end(&mut contents)?;
        parser.parse(Cursor::new(contents), &name)?;
    }

    Ok(parser.finish())
}

/// Element an indented line attaches to
#[derive(Debug, Clone, Copy)]
enum Frame {
    Class(usize),
    Field(usize, usize),
    Method(usize, usize),
    Arg(usize, usize, usize),
}

struct EnigmaParser {
    tree: MappingTree,
}

impl EnigmaParser {
    fn new(namespaces: &Namespaces) -> Self {
        EnigmaParser {
            tree: MappingTree::new(namespaces.source.clone(), vec![namespaces.target.clone()]),
        }
    }

    fn finish(self) -> MappingTree {
        self.tree
    }

    fn parse(&mut self, reader: impl BufRead, file: &str) -> Result<(), MappingError> {
        let mut stack: Vec<Frame> = Vec::new();

        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            let line_no = idx + 1;
            if line.trim().is_empty() {
                continue;
            }

            let depth = line.bytes().take_while(|&b| b == b'\t').count();
            if depth > stack.len() {
                return Err(self.error(file, line_no, "line is indented past its parent"));
            }
            stack.truncate(depth);
            let parent = stack.last().copied();

            let body = &line[depth..];
            let (keyword, rest) = body.split_once(' ').unwrap_or((body, ""));
            if keyword == "COMMENT" {
                let frame = parent.ok_or_else(|| self.error(file, line_no, "comment outside of any entry"))?;
                append_comment(self.comment_slot(frame), rest);
                continue;
            }

            let args: Vec<&str> = rest
                .split(' ')
                .filter(|t| !t.is_empty() && !t.starts_with("ACC:"))
                .collect();

            let frame = match (keyword, parent) {
                ("CLASS", None | Some(Frame::Class(_))) => {
                    let outer = match parent {
                        Some(Frame::Class(c)) => Some(c),
                        _ => None,
                    };
                    self.class(&args, outer)
                        .ok_or_else(|| self.error(file, line_no, "class without a name"))?
                }
                ("FIELD" | "METHOD", Some(Frame::Class(c))) => {
                    let (name, dst, desc) = match args.as_slice() {
                        [name, desc] => (*name, None, *desc),
                        [name, dst, desc, ..] => (*name, Some(dst.to_string()), *desc),
                        _ => return Err(self.error(file, line_no, "member needs a name and a descriptor")),
                    };
                    let class = &mut self.tree.classes_mut()[c];
                    if keyword == "FIELD" {
                        let f = class.field_index(name, Some(desc));
                        class.fields[f].dst_names[0] = dst;
                        Frame::Field(c, f)
                    } else {
                        let m = class.method_index(name, Some(desc));
                        class.methods[m].member.dst_names[0] = dst;
                        Frame::Method(c, m)
                    }
                }
                ("ARG", Some(Frame::Method(c, m))) => {
                    let (Some(index), Some(name)) = (args.first(), args.get(1)) else {
                        return Err(self.error(file, line_no, "argument needs an index and a name"));
                    };
                    let lv_index: u32 = index
                        .parse()
                        .map_err(|_| self.error(file, line_no, "argument index is not a number"))?;
                    let method = &mut self.tree.classes_mut()[c].methods[m];
                    let a = method.arg_index(lv_index);
                    method.args[a].dst_names[0] = Some(name.to_string());
                    Frame::Arg(c, m, a)
                }
                _ => {
                    return Err(self.error(file, line_no, &format!("unexpected {keyword} entry")));
                }
            };
            stack.push(frame);
        }

        Ok(())
    }

    /// Records a class line, qualifying nested simple names with their outer class
    fn class(&mut self, args: &[&str], outer: Option<usize>) -> Option<Frame> {
        let obf = *args.first()?;
        let deobf = args.get(1).copied();

        let (src, dst) = match outer {
            Some(o) if !obf.contains('/') => {
                let outer = &self.tree.classes()[o];
                let outer_dst = outer.dst_name(0);
                let dst = match deobf {
                    Some(d) if d.contains('/') => Some(d.to_string()),
                    Some(d) => Some(format!("{}${d}", outer_dst.unwrap_or(&outer.src_name))),
                    // an unnamed inner class still moves with a renamed outer one
                    None => outer_dst.map(|od| format!("{od}${obf}")),
                };
                (format!("{}${}", outer.src_name, obf), dst)
            }
            _ => (obf.to_string(), deobf.map(str::to_string)),
        };

        let c = self.tree.class_index(&src);
        self.tree.classes_mut()[c].dst_names[0] = dst;
        Some(Frame::Class(c))
    }

    fn comment_slot(&mut self, frame: Frame) -> &mut Option<String> {
        let classes = self.tree.classes_mut();
        match frame {
            Frame::Class(c) => &mut classes[c].comment,
            Frame::Field(c, f) => &mut classes[c].fields[f].comment,
            Frame::Method(c, m) => &mut classes[c].methods[m].member.comment,
            Frame::Arg(c, m, a) => &mut classes[c].methods[m].args[a].comment,
        }
    }

    fn error(&self, file: &str, line: usize, message: &str) -> MappingError {
        MappingError::parse(FORMAT, line, format!("{file}: {message}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Write;
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;

    const FOO: &str = "CLASS a net/minecraft/Foo
\tCOMMENT A foo.
\tCOMMENT Second line.
\tFIELD b count I
\tMETHOD c setCount (I)V
\t\tARG 1 value
\t\t\tCOMMENT The new count.
\tCLASS d Inner
\t\tFIELD e flag Z
";

    const BAR: &str = "CLASS b ACC:PUBLIC
\tMETHOD f (Ljava/lang/String;)V
";

    fn namespaces() -> Namespaces {
        Namespaces {
            source: "official".to_string(),
            target: "named".to_string(),
        }
    }

    fn check_tree(tree: &MappingTree) {
        assert_eq!(tree.src_namespace(), "official");
        assert_eq!(tree.dst_namespaces(), &["named"]);

        let foo = tree.class("a").unwrap();
        assert_eq!(foo.dst_name(0), Some("net/minecraft/Foo"));
        assert_eq!(foo.comment.as_deref(), Some("A foo.\nSecond line."));
        assert_eq!(foo.fields[0].dst_name(0), Some("count"));
        assert_eq!(foo.methods[0].args[0].dst_names[0].as_deref(), Some("value"));
        assert_eq!(
            foo.methods[0].args[0].comment.as_deref(),
            Some("The new count.")
        );

        let inner = tree.class("a$d").unwrap();
        assert_eq!(inner.dst_name(0), Some("net/minecraft/Foo$Inner"));
        assert_eq!(inner.fields[0].src_desc.as_deref(), Some("Z"));

        let bar = tree.class("b").unwrap();
        assert_eq!(bar.dst_name(0), None);
        assert_eq!(bar.methods[0].member.dst_name(0), None);
    }

    #[test]
    fn test_read_directory() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("net/minecraft")).unwrap();
        fs::write(dir.path().join("net/minecraft/Foo.mapping"), FOO).unwrap();
        fs::write(dir.path().join("b.mapping"), BAR).unwrap();
        fs::write(dir.path().join("README.txt"), "not a mapping").unwrap();

        let tree = read_directory(dir.path(), &namespaces()).unwrap();
        assert_eq!(tree.classes().len(), 3);
        check_tree(&tree);
    }

    #[test]
    fn test_read_archive() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("mappings.zip");
        let mut zip = zip::ZipWriter::new(fs::File::create(&path).unwrap());
        let options = SimpleFileOptions::default();
        zip.add_directory("net/minecraft/", options).unwrap();
        zip.start_file("net/minecraft/Foo.mapping", options).unwrap();
        zip.write_all(FOO.as_bytes()).unwrap();
        zip.start_file("b.mapping", options).unwrap();
        zip.write_all(BAR.as_bytes()).unwrap();
        zip.start_file("META-INF/MANIFEST.MF", options).unwrap();
        zip.write_all(b"Manifest-Version: 1.0\n").unwrap();
        zip.finish().unwrap();

        let tree = read_archive(&path, &namespaces()).unwrap();
        check_tree(&tree);
    }

    #[test]
    fn test_over_indented_line_is_an_error() {
        let mut parser = EnigmaParser::new(&namespaces());
        let err = parser
            .parse(Cursor::new("CLASS a\n\t\tFIELD b c I\n"), "a.mapping")
            .unwrap_err();
        assert!(err.to_string().contains("a.mapping: line is indented past its parent"));
    }

    #[test]
    fn test_unnamed_inner_class_follows_renamed_outer() {
        let mut parser = EnigmaParser::new(&namespaces());
        parser
            .parse(Cursor::new("CLASS a net/Foo\n\tCLASS d\nCLASS b\n\tCLASS e\n"), "x.mapping")
            .unwrap();
        let tree = parser.finish();

        assert_eq!(tree.class("a$d").unwrap().dst_name(0), Some("net/Foo$d"));
        assert_eq!(tree.class("b$e").unwrap().dst_name(0), None);
    }

    #[test]
    fn test_arg_outside_method_is_an_error() {
        let mut parser = EnigmaParser::new(&namespaces());
        let err = parser
            .parse(Cursor::new("CLASS a\n\tARG 1 x\n"), "a.mapping")
            .unwrap_err();
        assert!(err.to_string().contains("unexpected ARG entry"));
    }
}
