use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;

type STDRESULT = Result<(), Box<dyn std::error::Error>>;

fn bin() -> Command {
    Command::cargo_bin("retrocomp").unwrap()
}

#[test]
fn compresses_and_extracts_round_trip() -> STDRESULT {
    let dir = tempfile::tempdir()?;
    let archive_path = dir.path().join("out.pak");
    fs::write(dir.path().join("greeting.txt"), b"This is the chaunt of the priests.")?;

    bin()
        .current_dir(dir.path())
        .arg(&archive_path)
        .arg("greeting.txt")
        .assert()
        .success();

    let magic = fs::read(&archive_path)?;
    assert_eq!(&magic[..2], b"\\/");

    let extract_dir = tempfile::tempdir()?;
    fs::copy(&archive_path, extract_dir.path().join("out.pak"))?;
    bin()
        .current_dir(extract_dir.path())
        .arg("-x")
        .arg("out.pak")
        .assert()
        .success();

    let extracted = fs::read(extract_dir.path().join("greeting.txt"))?;
    assert_eq!(extracted, b"This is the chaunt of the priests.");
    Ok(())
}

#[test]
fn uppercase_x_flag_also_extracts() -> STDRESULT {
    let dir = tempfile::tempdir()?;
    fs::write(dir.path().join("a.txt"), b"aaaaaaaaaa")?;
    let archive_path = dir.path().join("out.pak");

    bin()
        .current_dir(dir.path())
        .arg(&archive_path)
        .arg("a.txt")
        .assert()
        .success();

    bin()
        .current_dir(dir.path())
        .arg("-X")
        .arg("out.pak")
        .assert()
        .success();

    assert_eq!(fs::read(dir.path().join("a.txt"))?, b"aaaaaaaaaa");
    Ok(())
}

#[test]
fn compresses_multiple_files_into_one_archive() -> STDRESULT {
    let dir = tempfile::tempdir()?;
    fs::write(dir.path().join("one.txt"), b"first file")?;
    fs::write(dir.path().join("two.txt"), b"second file, a bit longer")?;
    let archive_path = dir.path().join("out.pak");

    bin()
        .current_dir(dir.path())
        .arg(&archive_path)
        .arg("one.txt")
        .arg("two.txt")
        .assert()
        .success();

    let extract_dir = tempfile::tempdir()?;
    fs::copy(&archive_path, extract_dir.path().join("out.pak"))?;
    bin()
        .current_dir(extract_dir.path())
        .arg("-x")
        .arg("out.pak")
        .assert()
        .success();

    assert_eq!(fs::read(extract_dir.path().join("one.txt"))?, b"first file");
    assert_eq!(
        fs::read(extract_dir.path().join("two.txt"))?,
        b"second file, a bit longer"
    );
    Ok(())
}

#[test]
fn no_arguments_prints_usage_and_exits_nonzero() {
    bin()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn missing_input_file_is_a_warning_not_a_failure() -> STDRESULT {
    let dir = tempfile::tempdir()?;
    let archive_path = dir.path().join("out.pak");

    bin()
        .current_dir(dir.path())
        .arg(&archive_path)
        .arg("does-not-exist.txt")
        .assert()
        .success();

    // only the magic bytes: the one requested entry failed to open
    assert_eq!(fs::read(&archive_path)?[..2], *b"\\/");
    Ok(())
}

#[test]
fn unknown_flag_warns_but_does_not_abort() -> STDRESULT {
    let dir = tempfile::tempdir()?;
    fs::write(dir.path().join("f.txt"), b"hello")?;
    let archive_path = dir.path().join("out.pak");

    bin()
        .current_dir(dir.path())
        .arg("-q")
        .arg(&archive_path)
        .arg("f.txt")
        .assert()
        .success();

    assert!(archive_path.exists());
    Ok(())
}

#[test]
fn bad_magic_fails_extraction_with_nonzero_exit() -> STDRESULT {
    let dir = tempfile::tempdir()?;
    let archive_path = dir.path().join("bogus.pak");
    fs::write(&archive_path, b"not an archive at all")?;

    bin()
        .current_dir(dir.path())
        .arg("-x")
        .arg(&archive_path)
        .assert()
        .failure();
    Ok(())
}

#[test]
fn empty_file_round_trips_to_zero_length() -> STDRESULT {
    let dir = tempfile::tempdir()?;
    fs::write(dir.path().join("empty.txt"), b"")?;
    let archive_path = dir.path().join("out.pak");

    bin()
        .current_dir(dir.path())
        .arg(&archive_path)
        .arg("empty.txt")
        .assert()
        .success();

    let extract_dir = tempfile::tempdir()?;
    fs::copy(&archive_path, extract_dir.path().join("out.pak"))?;
    bin()
        .current_dir(extract_dir.path())
        .arg("-x")
        .arg("out.pak")
        .assert()
        .success();

    assert_eq!(fs::read(extract_dir.path().join("empty.txt"))?, b"");
    Ok(())
}
