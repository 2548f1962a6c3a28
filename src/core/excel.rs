use crate::domain::model::SheetStyle;
use crate::utils::error::{Result, SysKitError};
use std::fs;
use std::io::Write;
use std::path::Path;
use zip::write::{FileOptions, ZipWriter};

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
<Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>
<Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>
</Types>"#;

const PACKAGE_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#;

const WORKBOOK_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
</Relationships>"#;

/// Export record maps as a single-sheet XLSX. Headers default to the first
/// record's keys (sorted, so output is deterministic); missing keys render as
/// empty cells.
pub fn export_records(
    path: &Path,
    records: &[serde_json::Map<String, serde_json::Value>],
    headers: Option<&[String]>,
    style: &SheetStyle,
) -> Result<()> {
    if records.is_empty() {
        return Err(SysKitError::EmptyExportError);
    }

    let headers: Vec<String> = match headers {
        Some(headers) => headers.to_vec(),
        None => {
            let mut keys: Vec<String> = records[0].keys().cloned().collect();
            keys.sort();
            keys
        }
    };

    let rows = records.iter().map(|record| {
        headers
            .iter()
            .map(|key| record.get(key).map(cell_text).unwrap_or_default())
            .collect::<Vec<String>>()
    });
    write_xlsx(path, &headers, rows, style)
}

/// Positional export: one header row plus data rows.
pub fn export_rows(
    path: &Path,
    headers: &[String],
    rows: &[Vec<String>],
    style: &SheetStyle,
) -> Result<()> {
    if headers.is_empty() {
        return Err(SysKitError::EmptyExportError);
    }
    write_xlsx(path, headers, rows.iter().cloned(), style)
}

/// Convert a CSV file into an XLSX, first CSV record as the header row.
pub fn from_csv(csv_path: &Path, xlsx_path: &Path, style: &SheetStyle) -> Result<()> {
    let mut reader = csv::Reader::from_path(csv_path)?;
    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect::<Vec<String>>());
    }

    export_rows(xlsx_path, &headers, &rows, style)
}

fn write_xlsx<I>(path: &Path, headers: &[String], rows: I, style: &SheetStyle) -> Result<()>
where
    I: IntoIterator<Item = Vec<String>>,
{
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let file = fs::File::create(path)?;
    let mut zip = ZipWriter::new(file);

    zip.start_file::<_, ()>("[Content_Types].xml", FileOptions::default())?;
    zip.write_all(CONTENT_TYPES_XML.as_bytes())?;

    zip.start_file::<_, ()>("_rels/.rels", FileOptions::default())?;
    zip.write_all(PACKAGE_RELS_XML.as_bytes())?;

    zip.start_file::<_, ()>("xl/workbook.xml", FileOptions::default())?;
    zip.write_all(workbook_xml(&style.sheet_name).as_bytes())?;

    zip.start_file::<_, ()>("xl/_rels/workbook.xml.rels", FileOptions::default())?;
    zip.write_all(WORKBOOK_RELS_XML.as_bytes())?;

    zip.start_file::<_, ()>("xl/styles.xml", FileOptions::default())?;
    zip.write_all(styles_xml(&style.header_bg, &style.header_color).as_bytes())?;

    // The sheet streams straight into the archive, row by row.
    zip.start_file::<_, ()>("xl/worksheets/sheet1.xml", FileOptions::default())?;
    zip.write_all(
        br#"<?xml version="1.0" encoding="UTF-8"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#,
    )?;

    let mut header_row = String::from("<row>");
    for header in headers {
        header_row.push_str(&format!(
            r#"<c t="inlineStr" s="1"><is><t>{}</t></is></c>"#,
            xml_escape(header)
        ));
    }
    header_row.push_str("</row>");
    zip.write_all(header_row.as_bytes())?;

    for row in rows {
        let mut line = String::from("<row>");
        for cell in &row {
            line.push_str(&format!(
                r#"<c t="inlineStr"><is><t>{}</t></is></c>"#,
                xml_escape(cell)
            ));
        }
        line.push_str("</row>");
        zip.write_all(line.as_bytes())?;
    }

    zip.write_all(b"</sheetData></worksheet>")?;
    zip.finish()?;
    Ok(())
}

fn workbook_xml(sheet_name: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
<sheets><sheet name="{}" sheetId="1" r:id="rId1"/></sheets>
</workbook>"#,
        xml_escape(sheet_name)
    )
}

fn styles_xml(header_bg: &str, header_color: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
<fonts count="2">
<font><sz val="11"/><color rgb="FF000000"/><name val="Calibri"/></font>
<font><b/><sz val="11"/><color rgb="FF{}"/><name val="Calibri"/></font>
</fonts>
<fills count="3">
<fill><patternFill patternType="none"/></fill>
<fill><patternFill patternType="gray125"/></fill>
<fill><patternFill patternType="solid"><fgColor rgb="FF{}"/><bgColor indexed="64"/></patternFill></fill>
</fills>
<borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders>
<cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs>
<cellXfs count="2">
<xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/>
<xf numFmtId="0" fontId="1" fillId="2" borderId="0" xfId="0" applyFont="1" applyFill="1"/>
</cellXfs>
</styleSheet>"#,
        header_color.to_uppercase(),
        header_bg.to_uppercase()
    )
}

fn cell_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn xml_escape(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            c => escaped.push(c),
        }
    }
    escaped
}
