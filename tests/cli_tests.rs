use assert_cmd::Command;
use predicates::str;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_version() {
    let mut cmd = Command::cargo_bin("seqmini").unwrap();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_help() {
    let mut cmd = Command::cargo_bin("seqmini").unwrap();
    cmd.arg("-h")
        .assert()
        .success()
        .stdout(str::contains("Usage"))
        .stdout(str::contains("--seqs-only"))
        .stdout(str::contains("--binary"));
}

#[test]
fn test_no_args() {
    let mut cmd = Command::cargo_bin("seqmini").unwrap();
    cmd.assert().failure().stderr(str::contains("Usage"));
}

#[test]
fn test_unknown_option() {
    let mut cmd = Command::cargo_bin("seqmini").unwrap();
    cmd.arg("--no-such-option")
        .arg("in.fa")
        .assert()
        .failure()
        .stderr(str::contains("Usage"));
}

#[test]
fn test_input_formats_are_exclusive() {
    let mut cmd = Command::cargo_bin("seqmini").unwrap();
    cmd.arg("-f")
        .arg("-g")
        .arg("in.fa")
        .assert()
        .failure()
        .stderr(str::contains("cannot be used with"));
}

#[test]
fn test_stream_and_binary_conflict() {
    let mut cmd = Command::cargo_bin("seqmini").unwrap();
    cmd.arg("--stream")
        .arg("-b")
        .arg("in.fa")
        .assert()
        .failure()
        .stderr(str::contains("cannot be used with"));
}

#[test]
fn test_invalid_kmer_window_combination() {
    let temp_dir = tempdir().unwrap();
    let fasta_path = temp_dir.path().join("in.fa");
    fs::write(&fasta_path, ">s\nACGTACGTACGTACGTACGTACGTACGTACGTACGTACGT\n").unwrap();

    // 16 + 21 is odd
    let mut cmd = Command::cargo_bin("seqmini").unwrap();
    cmd.arg(&fasta_path)
        .arg("-w")
        .arg("21")
        .assert()
        .failure()
        .stderr(str::contains("Invalid k-w combination"));
}

#[test]
fn test_missing_input_file() {
    let temp_dir = tempdir().unwrap();
    let mut cmd = Command::cargo_bin("seqmini").unwrap();
    cmd.arg(temp_dir.path().join("absent.fa"))
        .arg("--quiet")
        .assert()
        .failure()
        .stderr(str::contains("Failed to open input file"));
}

#[test]
fn test_unwritable_output() {
    let temp_dir = tempdir().unwrap();
    let fasta_path = temp_dir.path().join("in.fa");
    fs::write(&fasta_path, ">s\nACGTACGTACGTACGTACGTACGTACGTACGTACGTACGT\n").unwrap();

    let mut cmd = Command::cargo_bin("seqmini").unwrap();
    cmd.arg(&fasta_path)
        .arg("-o")
        .arg(temp_dir.path().join("no_dir").join("out.txt"))
        .assert()
        .failure()
        .stderr(str::contains("Failed to open output"));
}
