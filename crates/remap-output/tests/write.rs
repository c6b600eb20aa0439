use std::path::Path;

use remap_ingest::{load_dataset, load_workbook};
use remap_model::{CellValue, TabularDataset};
use remap_output::{WriteError, default_output_path, write_output};

fn workbook_sheets() -> Vec<TabularDataset> {
    let names = vec!["Staff".to_string(), "Notes".to_string()];
    vec![
        TabularDataset::new(
            names.clone(),
            "Staff",
            vec![CellValue::text("Name"), CellValue::Empty, CellValue::text("Dept")],
            vec![
                vec![CellValue::text("Ana"), CellValue::Empty, CellValue::text("Human Resources")],
                vec![],
                vec![CellValue::text("Bo"), CellValue::Number(42.0), CellValue::Bool(false)],
            ],
        )
        .expect("valid sheet"),
        TabularDataset::new(
            names,
            "Notes",
            vec![CellValue::text("Remark")],
            vec![vec![CellValue::text("keep me")]],
        )
        .expect("valid sheet"),
    ]
}

#[test]
fn xlsx_output_keeps_every_sheet() {
    let dir = tempfile::tempdir().expect("temp dir");
    let source = dir.path().join("staff.xlsx");
    let destination = default_output_path(&source, "_transformed");
    let sheets = workbook_sheets();

    let written = write_output(&destination, &source, &sheets, "Staff").expect("write xlsx");
    assert_eq!(written, dir.path().join("staff_transformed.xlsx"));

    let reloaded = load_workbook(&written).expect("reload");
    let names: Vec<&str> = reloaded.iter().map(|s| s.sheet_name()).collect();
    assert_eq!(names, vec!["Staff", "Notes"]);
    assert_eq!(reloaded[0].header_row(), sheets[0].header_row());
    assert_eq!(reloaded[0].rows(), sheets[0].rows());
    assert_eq!(reloaded[1].rows(), sheets[1].rows());
}

#[test]
fn csv_output_holds_the_active_sheet() {
    let dir = tempfile::tempdir().expect("temp dir");
    let source = dir.path().join("staff.csv");
    std::fs::write(&source, "Dept\nHR\n").expect("write source");
    let sheet = TabularDataset::single_sheet(
        "staff",
        vec![CellValue::text("Name"), CellValue::text("Dept")],
        vec![
            vec![CellValue::text("Ana"), CellValue::text("Human Resources")],
            vec![CellValue::text("Bo")],
        ],
    );

    let destination = default_output_path(&source, "_transformed");
    write_output(&destination, &source, std::slice::from_ref(&sheet), "staff")
        .expect("write csv");

    let reloaded = load_dataset(&destination, None).expect("reload");
    assert_eq!(reloaded.headers(), vec!["Name", "Dept"]);
    assert_eq!(reloaded.rows(), sheet.rows());
}

#[test]
fn refuses_to_overwrite_the_source() {
    let dir = tempfile::tempdir().expect("temp dir");
    let source = dir.path().join("staff.csv");
    std::fs::write(&source, "Dept\nHR\n").expect("write source");
    let sheet = TabularDataset::single_sheet("staff", vec![CellValue::text("Dept")], vec![]);

    let same = dir.path().join(".").join("staff.csv");
    let err = write_output(&same, &source, &[sheet], "staff").expect_err("same file");
    assert!(matches!(err, WriteError::SameAsSource { .. }));
    assert_eq!(
        std::fs::read_to_string(&source).expect("source intact"),
        "Dept\nHR\n"
    );
}

#[test]
fn unsupported_destination_leaves_nothing_behind() {
    let dir = tempfile::tempdir().expect("temp dir");
    let destination = dir.path().join("out.ods");
    let sheet = TabularDataset::single_sheet("staff", vec![CellValue::text("Dept")], vec![]);

    let err = write_output(&destination, Path::new("staff.csv"), &[sheet], "staff")
        .expect_err("ods cannot be written");
    assert!(matches!(err, WriteError::UnsupportedFormat { .. }));
    assert!(!destination.exists());
    assert_eq!(std::fs::read_dir(dir.path()).expect("list").count(), 0);
}

#[test]
fn missing_active_sheet_is_an_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let err = write_output(
        &dir.path().join("out.xlsx"),
        Path::new("staff.xlsx"),
        &workbook_sheets(),
        "Budget",
    )
    .expect_err("no Budget sheet");
    assert!(matches!(err, WriteError::MissingSheet { ref sheet } if sheet == "Budget"));
}
