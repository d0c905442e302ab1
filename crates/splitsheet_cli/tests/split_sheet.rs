use std::path::{Path, PathBuf};

use calamine::{Data, Range, Reader, Xlsx, open_workbook};
use splitsheet_cli::{SpecSplitConfig, SplitSheetError, run};
use splitsheet_io_table::TableReadError;
use splitsheet_partition::{EnumPartitionMode, PartitionError};
use tempfile::TempDir;

fn write_csv(dir: &TempDir, name: &str, txt: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, txt).expect("write csv");
    path
}

fn open_output(path: &Path) -> Xlsx<std::io::BufReader<std::fs::File>> {
    open_workbook(path).expect("open output workbook")
}

fn sheet(path: &Path, name: &str) -> Range<Data> {
    open_output(path).worksheet_range(name).expect("sheet range")
}

fn text(value: &str) -> Data {
    Data::String(value.to_string())
}

#[test]
fn test_split_by_value_first_occurrence_order() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let path_in = write_csv(&tmp, "in.csv", "id,cat\n1,A\n2,B\n3,A\n");
    let path_out = tmp.path().join("out.xlsx");

    let report = run(&SpecSplitConfig::new(&path_in, &path_out).with_column_name("cat"))
        .expect("split by column");

    assert_eq!(report.mode, EnumPartitionMode::ColumnValue);
    assert_eq!(report.n_rows, 3);
    assert_eq!(report.l_sheets, vec!["A", "B"]);
    assert_eq!(
        report.to_string(),
        format!("Data has been split and saved to {}", path_out.display())
    );
    assert_eq!(open_output(&path_out).sheet_names(), vec!["A", "B"]);

    let range = sheet(&path_out, "A");
    assert_eq!(range.get_size(), (3, 2));
    assert_eq!(range.get((0, 0)), Some(&text("id")));
    assert_eq!(range.get((0, 1)), Some(&text("cat")));
    assert_eq!(range.get((1, 0)), Some(&Data::Float(1.0)));
    assert_eq!(range.get((2, 0)), Some(&Data::Float(3.0)));
    assert_eq!(range.get((2, 1)), Some(&text("A")));

    let range = sheet(&path_out, "B");
    assert_eq!(range.get_size(), (2, 2));
    assert_eq!(range.get((1, 0)), Some(&Data::Float(2.0)));
}

#[test]
fn test_split_by_row_count_with_remainder() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let path_in = write_csv(&tmp, "in.csv", "id,name\n1,a\n2,b\n3,c\n4,d\n5,e\n");
    let path_out = tmp.path().join("out.xlsx");

    let report =
        run(&SpecSplitConfig::new(&path_in, &path_out).with_number(2)).expect("split by rows");

    assert_eq!(report.mode, EnumPartitionMode::RowCount);
    assert_eq!(
        open_output(&path_out).sheet_names(),
        vec!["Part_1", "Part_2", "Part_3"]
    );
    assert_eq!(sheet(&path_out, "Part_1").get_size(), (3, 2));
    assert_eq!(sheet(&path_out, "Part_2").get_size(), (3, 2));

    let range = sheet(&path_out, "Part_3");
    assert_eq!(range.get_size(), (2, 2));
    assert_eq!(range.get((1, 1)), Some(&text("e")));
}

#[test]
fn test_split_date_column_by_year_keeps_original_columns() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let path_in = write_csv(
        &tmp,
        "in.csv",
        "id,date\n1,2020-01-05\n2,2021-03-04\n3,2020-12-31\n",
    );
    let path_out = tmp.path().join("out.xlsx");

    let report = run(&SpecSplitConfig::new(&path_in, &path_out).with_column_name("date"))
        .expect("split by year");

    assert_eq!(report.mode, EnumPartitionMode::ColumnYear);
    assert_eq!(open_output(&path_out).sheet_names(), vec!["2020", "2021"]);

    let range = sheet(&path_out, "2020");
    assert_eq!(range.get_size(), (3, 2));
    assert_eq!(range.get((0, 1)), Some(&text("date")));
    assert_eq!(range.get((1, 0)), Some(&Data::Float(1.0)));
    assert_eq!(range.get((2, 0)), Some(&Data::Float(3.0)));
}

#[test]
fn test_long_and_illegal_labels_are_sanitized() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let c_long = "x".repeat(40);
    let path_in = write_csv(
        &tmp,
        "in.csv",
        &format!("id,cat\n1,{c_long}\n2,a/b\n3,a:b\n"),
    );
    let path_out = tmp.path().join("out.xlsx");

    let report = run(&SpecSplitConfig::new(&path_in, &path_out).with_column_name("cat"))
        .expect("split");

    assert_eq!(report.l_labels, vec![c_long.clone(), "a/b".to_string(), "a:b".to_string()]);
    assert_eq!(
        open_output(&path_out).sheet_names(),
        vec!["x".repeat(31), "a_b".to_string(), "a_b__2".to_string()]
    );
    assert_eq!(report.warnings.len(), 1);
}

#[test]
fn test_both_or_neither_modes_fail_without_output() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let path_in = write_csv(&tmp, "in.csv", "id,cat\n1,A\n");
    let path_out = tmp.path().join("out.xlsx");

    for config in [
        SpecSplitConfig::new(&path_in, &path_out)
            .with_column_name("cat")
            .with_number(1),
        SpecSplitConfig::new(&path_in, &path_out),
    ] {
        let err = run(&config).expect_err("must fail");
        assert!(matches!(
            err,
            SplitSheetError::Partition(PartitionError::InvalidDirective(_))
        ));
        assert!(!path_out.exists());
    }
}

#[test]
fn test_unsupported_input_fails_without_output() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let path_in = write_csv(&tmp, "in.txt", "id,cat\n1,A\n");
    let path_out = tmp.path().join("out.xlsx");

    let err = run(&SpecSplitConfig::new(&path_in, &path_out).with_number(1))
        .expect_err("must fail");
    assert!(matches!(
        err,
        SplitSheetError::Read(TableReadError::UnsupportedFormat { .. })
    ));
    assert!(err.to_string().contains("Unsupported file format"));
    assert!(!path_out.exists());
}

#[test]
fn test_missing_column_fails_without_output() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let path_in = write_csv(&tmp, "in.csv", "id,name\n1,a\n");
    let path_out = tmp.path().join("out.xlsx");

    let err = run(&SpecSplitConfig::new(&path_in, &path_out).with_column_name("cat"))
        .expect_err("must fail");
    assert!(matches!(
        err,
        SplitSheetError::Partition(PartitionError::ColumnNotFound { .. })
    ));
    assert!(!path_out.exists());
}

#[test]
fn test_unwritable_output_reports_write_failed() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let path_in = write_csv(&tmp, "in.csv", "id,cat\n1,A\n");
    let path_out = tmp.path().join("missing_dir").join("out.xlsx");

    let err = run(&SpecSplitConfig::new(&path_in, &path_out).with_column_name("cat"))
        .expect_err("must fail");
    match err {
        SplitSheetError::WriteFailed { path, .. } => assert_eq!(path, path_out),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_blank_group_keeps_every_row() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let path_in = write_csv(&tmp, "in.csv", "id,cat\n1,A\n2,\n3,A\n");
    let path_out = tmp.path().join("out.xlsx");

    let report = run(&SpecSplitConfig::new(&path_in, &path_out).with_column_name("cat"))
        .expect("split");
    assert_eq!(report.l_sheets, vec!["A", "Blank"]);
    assert_eq!(sheet(&path_out, "Blank").get((1, 0)), Some(&Data::Float(2.0)));
}
