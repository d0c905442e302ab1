use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use calamine::{Reader, Xlsx, open_workbook};

fn split_sheet(l_args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_split-sheet"))
        .args(l_args)
        .env_remove("RUST_LOG")
        .output()
        .expect("spawn split-sheet")
}

fn write_sample_csv(dir: &Path) -> PathBuf {
    let path = dir.join("in.csv");
    std::fs::write(&path, "id,cat\n1,A\n2,B\n3,A\n").expect("write csv");
    path
}

fn sheet_names(path: &Path) -> Vec<String> {
    let workbook: Xlsx<_> = open_workbook(path).expect("open output workbook");
    workbook.sheet_names()
}

#[test]
fn test_cli_column_flag_prints_confirmation() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let path_in = write_sample_csv(tmp.path());
    let path_out = tmp.path().join("out.xlsx");

    let output = split_sheet(&[
        path_in.to_str().expect("utf-8 path"),
        path_out.to_str().expect("utf-8 path"),
        "-c",
        "cat",
    ]);

    assert!(output.status.success(), "{output:?}");
    let c_stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(
        c_stdout.trim_end(),
        format!("Data has been split and saved to {}", path_out.display())
    );
    assert_eq!(sheet_names(&path_out), vec!["A", "B"]);
}

#[test]
fn test_cli_number_flag_splits_rows() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let path_in = write_sample_csv(tmp.path());
    let path_out = tmp.path().join("out.xlsx");

    let output = split_sheet(&[
        path_in.to_str().expect("utf-8 path"),
        path_out.to_str().expect("utf-8 path"),
        "-n",
        "2",
    ]);

    assert!(output.status.success(), "{output:?}");
    assert_eq!(sheet_names(&path_out), vec!["Part_1", "Part_2"]);
}

#[test]
fn test_cli_both_flags_exit_non_zero() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let path_in = write_sample_csv(tmp.path());
    let path_out = tmp.path().join("out.xlsx");

    let output = split_sheet(&[
        path_in.to_str().expect("utf-8 path"),
        path_out.to_str().expect("utf-8 path"),
        "-c",
        "cat",
        "-n",
        "2",
    ]);

    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    assert!(!path_out.exists());
}

#[test]
fn test_cli_multibyte_separator_is_rejected() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let path_in = write_sample_csv(tmp.path());
    let path_out = tmp.path().join("out.xlsx");

    let output = split_sheet(&[
        path_in.to_str().expect("utf-8 path"),
        path_out.to_str().expect("utf-8 path"),
        "-n",
        "2",
        "--separator",
        "é",
    ]);

    assert!(!output.status.success());
    let c_stderr = String::from_utf8_lossy(&output.stderr);
    assert!(c_stderr.contains("single-byte"), "{c_stderr}");
    assert!(!path_out.exists());
}
