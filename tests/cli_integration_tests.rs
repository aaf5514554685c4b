//! End-to-end tests driving the `mapping2tiny` binary
//!
//! Each test runs in its own temporary working directory with no config
//! file unless the test writes one.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn mapping2tiny(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("mapping2tiny").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("MAPPING2TINY_CONFIG")
        .env_remove("MAPPING2TINY_LOG");
    cmd
}

fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
    let mut zip = zip::ZipWriter::new(File::create(path).unwrap());
    for (name, contents) in entries {
        zip.start_file(*name, SimpleFileOptions::default()).unwrap();
        zip.write_all(contents).unwrap();
    }
    zip.finish().unwrap();
}

#[test]
fn test_no_arguments_prints_help() {
    let dir = TempDir::new().unwrap();
    mapping2tiny(&dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage: mapping2tiny"))
        .stdout(predicate::str::contains("enigma_zip"));
}

#[test]
fn test_help_flag_ignores_later_arguments() {
    let dir = TempDir::new().unwrap();
    mapping2tiny(&dir)
        .args(["-h", "--no-such-flag"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--default-source-name"));
}

#[test]
fn test_tiny_v2_to_tiny_v1() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("out.tiny");

    mapping2tiny(&dir)
        .arg("-1o")
        .arg(&out)
        .arg(fixture("yarn_v2.tiny"))
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let written = fs::read_to_string(&out).unwrap();
    assert_eq!(
        written,
        "v1\tofficial\tintermediary\tnamed\n\
         CLASS\ta\tnet/minecraft/class_1\tnet/minecraft/Block\n\
         FIELD\ta\tI\tb\tfield_1\thardness\n\
         METHOD\ta\t(I)V\tc\tmethod_1\tsetHardness\n"
    );
}

#[test]
fn test_tiny_v1_to_tiny_v2() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("out.tiny");

    mapping2tiny(&dir)
        .args(["--from", "tiny1", "--output"])
        .arg(&out)
        .arg(fixture("yarn_v1.tiny"))
        .assert()
        .success();

    let written = fs::read_to_string(&out).unwrap();
    assert_eq!(
        written,
        "tiny\t2\t0\tofficial\tnamed\n\
         c\ta\tnet/minecraft/Block\n\
         \tf\tI\tb\thardness\n\
         \tm\t(I)V\tc\tsetHardness\n"
    );
}

#[test]
fn test_proguard_with_custom_namespaces() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("out.tiny");

    mapping2tiny(&dir)
        .args(["-c", "named", "-e", "official", "-o"])
        .arg(&out)
        .arg(fixture("proguard.txt"))
        .assert()
        .success();

    let written = fs::read_to_string(&out).unwrap();
    assert!(written.starts_with("tiny\t2\t0\tnamed\tofficial\n"), "{written}");
    assert!(written.contains("c\tcom/example/Block\ta\n"), "{written}");
    assert!(written.contains("\tf\tI\thardness\tb\n"), "{written}");
    assert!(written.contains("\tm\t(I)V\tsetHardness\tc\n"), "{written}");
    assert!(written.contains("\tm\t()Ljava/lang/String;\tdescribe\td\n"), "{written}");
    assert!(written.contains("c\tcom/example/Block$Face\ta$a\n"), "{written}");
}

#[test]
fn test_enigma_directory() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("out.tiny");

    mapping2tiny(&dir)
        .args(["-f", "enigma", "-c", "official", "-e", "named", "-o"])
        .arg(&out)
        .arg(fixture("enigma"))
        .assert()
        .success();

    let written = fs::read_to_string(&out).unwrap();
    assert!(written.starts_with("tiny\t2\t0\tofficial\tnamed\n"), "{written}");
    assert!(written.contains("c\ta\tnet/minecraft/Block\n"), "{written}");
    assert!(written.contains("\tc\tA placed block.\n"), "{written}");
    assert!(written.contains("\t\tp\t1\t\tvalue\n"), "{written}");
    assert!(written.contains("c\ta$d\tnet/minecraft/Block$Face\n"), "{written}");
    assert!(written.contains("\tf\t[La;\tf\tblocks\n"), "{written}");
}

#[test]
fn test_enigma_on_plain_file_fails_without_output() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("out.tiny");

    mapping2tiny(&dir)
        .args(["-f", "enigma", "-o"])
        .arg(&out)
        .arg(fixture("yarn_v1.tiny"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("directory rule of enigma"));

    assert!(!out.exists());
}

#[test]
fn test_autodetect_jar_with_embedded_tiny() {
    let dir = TempDir::new().unwrap();
    let jar = dir.path().join("yarn.jar");
    let out = dir.path().join("out.tiny");
    let tiny = fs::read(fixture("yarn_v1.tiny")).unwrap();
    write_zip(
        &jar,
        &[
            ("META-INF/MANIFEST.MF", b"Manifest-Version: 1.0\n"),
            ("mappings/mappings.tiny", tiny.as_slice()),
        ],
    );

    mapping2tiny(&dir)
        .args(["-1", "-o", "out.tiny", "yarn.jar"])
        .assert()
        .success();

    assert_eq!(fs::read(&out).unwrap(), tiny);
}

#[test]
fn test_autodetect_zip_without_entry_reads_enigma() {
    let dir = TempDir::new().unwrap();
    let zip = dir.path().join("mappings.zip");
    write_zip(
        &zip,
        &[("net/minecraft/World.mapping", b"CLASS e net/minecraft/World\n")],
    );

    mapping2tiny(&dir)
        .args(["-o", "out.tiny", "mappings.zip"])
        .assert()
        .success();

    let written = fs::read_to_string(dir.path().join("out.tiny")).unwrap();
    assert_eq!(written, "tiny\t2\t0\tsource\ttarget\nc\te\tnet/minecraft/World\n");
}

#[test]
fn test_tiny_zip_without_entry_fails() {
    let dir = TempDir::new().unwrap();
    let zip = dir.path().join("mappings.zip");
    write_zip(&zip, &[("World.mapping", b"CLASS e net/minecraft/World\n")]);

    mapping2tiny(&dir)
        .args(["-f", "tiny_zip", "-o", "out.tiny", "mappings.zip"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains(
            "required entry not found in mappings.zip: mappings/mappings.tiny",
        ));

    assert!(!dir.path().join("out.tiny").exists());
}

#[test]
fn test_unrecognized_plain_file() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("notes.txt"), "hello\n").unwrap();

    mapping2tiny(&dir)
        .args(["-o", "out.tiny", "notes.txt"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("error: unsupported mapping format"));
}

#[test]
fn test_duplicate_output_fails_before_any_io() {
    let dir = TempDir::new().unwrap();

    mapping2tiny(&dir)
        .args(["--output", "a.tiny", "--output", "b.tiny", "in.tiny"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("error: duplicated output path"));

    assert!(!dir.path().join("a.tiny").exists());
    assert!(!dir.path().join("b.tiny").exists());
}

#[test]
fn test_unknown_option() {
    let dir = TempDir::new().unwrap();
    mapping2tiny(&dir)
        .args(["--verbose", "-o", "out.tiny", "in.tiny"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("unknown option: --verbose"));
}

#[test]
fn test_missing_input() {
    let dir = TempDir::new().unwrap();
    mapping2tiny(&dir)
        .args(["-o", "out.tiny"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("missing input"));
}

#[test]
fn test_missing_output() {
    let dir = TempDir::new().unwrap();
    mapping2tiny(&dir)
        .arg("in.tiny")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("missing output"));
}

#[test]
fn test_download_file_url() {
    let dir = TempDir::new().unwrap();
    let url = format!(
        "file://{}",
        fixture("yarn_v1.tiny").display().to_string().replace('\\', "/")
    );

    mapping2tiny(&dir)
        .args(["-w", "-o", "out.tiny", &url])
        .assert()
        .success();

    let written = fs::read_to_string(dir.path().join("out.tiny")).unwrap();
    assert!(written.starts_with("tiny\t2\t0\tofficial\tnamed\n"), "{written}");
}

#[test]
fn test_download_rejects_non_url() {
    let dir = TempDir::new().unwrap();
    mapping2tiny(&dir)
        .args(["--download", "-o", "out.tiny", "not a url"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("failed to download not a url"));
}

#[test]
fn test_config_file_supplies_defaults() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("mapping2tiny.toml"),
        "output_format = \"tiny1\"\ndefault_source_name = \"obf\"\ncolor = \"never\"\n",
    )
    .unwrap();

    mapping2tiny(&dir)
        .arg("-o")
        .arg("out.tiny")
        .arg(fixture("proguard.txt"))
        .assert()
        .success();

    let written = fs::read_to_string(dir.path().join("out.tiny")).unwrap();
    assert!(written.starts_with("v1\tobf\ttarget\n"), "{written}");
}

#[test]
fn test_explicit_config_from_environment() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("custom.toml");
    fs::write(&config, "default_target_name = \"mojang\"\n").unwrap();

    mapping2tiny(&dir)
        .env("MAPPING2TINY_CONFIG", &config)
        .arg("-o")
        .arg("out.tiny")
        .arg(fixture("proguard.txt"))
        .assert()
        .success();

    let written = fs::read_to_string(dir.path().join("out.tiny")).unwrap();
    assert!(written.starts_with("tiny\t2\t0\tsource\tmojang\n"), "{written}");
}

#[test]
fn test_invalid_config_is_reported() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("mapping2tiny.toml"), "colour = \"never\"\n").unwrap();

    mapping2tiny(&dir)
        .args(["-o", "out.tiny", "in.tiny"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("invalid config"));
}

#[test]
fn test_help_works_with_invalid_config() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("mapping2tiny.toml"), "colour = \"never\"\n").unwrap();

    mapping2tiny(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage: mapping2tiny"));
    mapping2tiny(&dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage: mapping2tiny"));
}

#[test]
fn test_blank_arguments_report_missing_input() {
    let dir = TempDir::new().unwrap();
    mapping2tiny(&dir)
        .args(["", " "])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("missing input"));
}
