use std::fs;
use std::io::Read;
use std::path::Path;
use syskit::core::excel;
use syskit::domain::model::SheetStyle;
use tempfile::TempDir;

fn read_part(xlsx: &Path, name: &str) -> String {
    let file = fs::File::open(xlsx).unwrap();
    let mut archive = zip::ZipArchive::new(file).unwrap();
    let mut part = archive.by_name(name).unwrap();
    let mut content = String::new();
    part.read_to_string(&mut content).unwrap();
    content
}

fn sample_records() -> Vec<serde_json::Map<String, serde_json::Value>> {
    let rows = serde_json::json!([
        {"id": 1, "name": "Printer", "stock": 4},
        {"id": 2, "name": "Scanner & Fax", "stock": 0}
    ]);
    rows.as_array()
        .unwrap()
        .iter()
        .map(|row| row.as_object().unwrap().clone())
        .collect()
}

#[test]
fn test_export_produces_all_container_parts() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("report.xlsx");

    excel::export_records(&path, &sample_records(), None, &SheetStyle::default()).unwrap();

    let file = fs::File::open(&path).unwrap();
    let mut archive = zip::ZipArchive::new(file).unwrap();
    let mut names: Vec<String> = (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect();
    names.sort();

    assert_eq!(
        names,
        vec![
            "[Content_Types].xml",
            "_rels/.rels",
            "xl/_rels/workbook.xml.rels",
            "xl/styles.xml",
            "xl/workbook.xml",
            "xl/worksheets/sheet1.xml",
        ]
    );
}

#[test]
fn test_package_rels_point_at_the_workbook() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("report.xlsx");

    excel::export_records(&path, &sample_records(), None, &SheetStyle::default()).unwrap();

    let rels = read_part(&path, "_rels/.rels");
    assert!(rels.contains("officeDocument"));
    assert!(rels.contains("xl/workbook.xml"));

    let workbook_rels = read_part(&path, "xl/_rels/workbook.xml.rels");
    assert!(workbook_rels.contains("worksheets/sheet1.xml"));
    assert!(workbook_rels.contains("styles.xml"));
}

#[test]
fn test_sheet_contains_styled_header_and_escaped_cells() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("report.xlsx");

    excel::export_records(&path, &sample_records(), None, &SheetStyle::default()).unwrap();

    let sheet = read_part(&path, "xl/worksheets/sheet1.xml");
    // Header cells carry the style index, data cells do not.
    assert!(sheet.contains(r#"<c t="inlineStr" s="1"><is><t>id</t></is></c>"#));
    assert!(sheet.contains(r#"<c t="inlineStr"><is><t>Printer</t></is></c>"#));
    assert!(sheet.contains("Scanner &amp; Fax"));
    // 3 records per row: header + 2 data rows.
    assert_eq!(sheet.matches("<row>").count(), 3);
}

#[test]
fn test_default_headers_are_sorted_first_record_keys() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("report.xlsx");

    excel::export_records(&path, &sample_records(), None, &SheetStyle::default()).unwrap();

    let sheet = read_part(&path, "xl/worksheets/sheet1.xml");
    let id_pos = sheet.find("<t>id</t>").unwrap();
    let name_pos = sheet.find("<t>name</t>").unwrap();
    let stock_pos = sheet.find("<t>stock</t>").unwrap();
    assert!(id_pos < name_pos && name_pos < stock_pos);
}

#[test]
fn test_explicit_headers_pick_fields_and_missing_keys_are_empty() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("report.xlsx");

    let headers = vec!["name".to_string(), "location".to_string()];
    excel::export_records(&path, &sample_records(), Some(&headers), &SheetStyle::default())
        .unwrap();

    let sheet = read_part(&path, "xl/worksheets/sheet1.xml");
    assert!(sheet.contains("<t>location</t>"));
    assert!(!sheet.contains("<t>id</t>"));
    // Missing keys render as empty inline strings.
    assert!(sheet.contains(r#"<c t="inlineStr"><is><t></t></is></c>"#));
}

#[test]
fn test_custom_style_colors_land_in_styles_part() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("report.xlsx");

    let style = SheetStyle {
        sheet_name: "Inventory".to_string(),
        header_bg: "1a2b3c".to_string(),
        header_color: "ffffff".to_string(),
    };
    excel::export_records(&path, &sample_records(), None, &style).unwrap();

    let styles = read_part(&path, "xl/styles.xml");
    assert!(styles.contains("FF1A2B3C"));
    assert!(styles.contains("FFFFFFFF"));

    let workbook = read_part(&path, "xl/workbook.xml");
    assert!(workbook.contains(r#"name="Inventory""#));
}

#[test]
fn test_from_csv_roundtrip() {
    let dir = TempDir::new().unwrap();
    let csv_path = dir.path().join("input.csv");
    fs::write(&csv_path, "id,name\n1,Printer\n2,\"Scanner, big\"\n").unwrap();

    let xlsx_path = dir.path().join("nested/output.xlsx");
    excel::from_csv(&csv_path, &xlsx_path, &SheetStyle::default()).unwrap();

    let sheet = read_part(&xlsx_path, "xl/worksheets/sheet1.xml");
    assert!(sheet.contains("<t>Printer</t>"));
    assert!(sheet.contains("<t>Scanner, big</t>"));
    assert_eq!(sheet.matches("<row>").count(), 3);
}

#[test]
fn test_export_rows_requires_headers() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("report.xlsx");
    let result = excel::export_rows(&path, &[], &[], &SheetStyle::default());
    assert!(result.is_err());
}
