//! XLSX serialization.
//!
//! Writes the assembled workbook as an OOXML spreadsheet package: a ZIP
//! archive holding content types, relationships, workbook and worksheet
//! parts, and a stylesheet carrying the wrap-text cell format. Cell
//! values are written as inline strings, so no shared-string table is
//! needed.

use std::io::{Cursor, Write};

use chrono::{SecondsFormat, Utc};
use quick_xml::escape::escape;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::{Layout, Sheet, Workbook};
use crate::error::{Error, Result};

const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;
const NS_MAIN: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const NS_REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_PKG_REL: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

/// Wrap-text cells reference style index 1 in cellXfs.
const STYLE_WRAP: u32 = 1;
const STYLE_DEFAULT: u32 = 0;

/// Serialize a workbook into XLSX bytes.
///
/// Fails if the workbook holds no sheets; the format requires at least
/// one worksheet part.
pub fn write_workbook(workbook: &Workbook) -> Result<Vec<u8>> {
    if workbook.is_empty() {
        return Err(Error::Serialize(
            "workbook has no sheets to serialize".to_string(),
        ));
    }

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options =
        SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let put = |zip: &mut ZipWriter<Cursor<Vec<u8>>>, name: &str, body: String| -> Result<()> {
        zip.start_file(name, options)?;
        zip.write_all(body.as_bytes())?;
        Ok(())
    };

    put(&mut zip, "[Content_Types].xml", content_types(workbook))?;
    put(&mut zip, "_rels/.rels", package_rels())?;
    put(&mut zip, "docProps/core.xml", core_props())?;
    put(&mut zip, "docProps/app.xml", app_props())?;
    put(&mut zip, "xl/workbook.xml", workbook_xml(workbook))?;
    put(&mut zip, "xl/_rels/workbook.xml.rels", workbook_rels(workbook))?;
    put(&mut zip, "xl/styles.xml", styles_xml())?;

    for (i, sheet) in workbook.sheets().iter().enumerate() {
        put(
            &mut zip,
            &format!("xl/worksheets/sheet{}.xml", i + 1),
            worksheet_xml(sheet, workbook.layout()),
        )?;
    }

    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}

fn content_types(workbook: &Workbook) -> String {
    let mut xml = String::from(XML_DECL);
    xml.push_str(r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#);
    xml.push_str(r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#);
    xml.push_str(r#"<Default Extension="xml" ContentType="application/xml"/>"#);
    xml.push_str(r#"<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>"#);
    xml.push_str(r#"<Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>"#);
    xml.push_str(r#"<Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>"#);
    xml.push_str(r#"<Override PartName="/docProps/app.xml" ContentType="application/vnd.openxmlformats-officedocument.extended-properties+xml"/>"#);
    for i in 1..=workbook.sheets().len() {
        xml.push_str(&format!(
            r#"<Override PartName="/xl/worksheets/sheet{i}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#
        ));
    }
    xml.push_str("</Types>");
    xml
}

fn package_rels() -> String {
    format!(
        r#"{XML_DECL}<Relationships xmlns="{NS_PKG_REL}"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/><Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties" Target="docProps/app.xml"/></Relationships>"#
    )
}

fn core_props() -> String {
    let created = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
    format!(
        r#"{XML_DECL}<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"><dc:creator>tabxl</dc:creator><dcterms:created xsi:type="dcterms:W3CDTF">{created}</dcterms:created></cp:coreProperties>"#
    )
}

fn app_props() -> String {
    format!(
        r#"{XML_DECL}<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties"><Application>tabxl</Application></Properties>"#
    )
}

fn workbook_xml(workbook: &Workbook) -> String {
    let mut xml = String::from(XML_DECL);
    xml.push_str(&format!(
        r#"<workbook xmlns="{NS_MAIN}" xmlns:r="{NS_REL}"><sheets>"#
    ));
    for (i, sheet) in workbook.sheets().iter().enumerate() {
        let id = i + 1;
        xml.push_str(&format!(
            r#"<sheet name="{}" sheetId="{id}" r:id="rId{id}"/>"#,
            escape(sheet.name.as_str())
        ));
    }
    xml.push_str("</sheets></workbook>");
    xml
}

fn workbook_rels(workbook: &Workbook) -> String {
    let mut xml = String::from(XML_DECL);
    xml.push_str(&format!(r#"<Relationships xmlns="{NS_PKG_REL}">"#));
    for i in 1..=workbook.sheets().len() {
        xml.push_str(&format!(
            r#"<Relationship Id="rId{i}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{i}.xml"/>"#
        ));
    }
    xml.push_str(&format!(
        r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>"#,
        workbook.sheets().len() + 1
    ));
    xml.push_str("</Relationships>");
    xml
}

/// Stylesheet with exactly two cell formats: index 0 is the default,
/// index 1 adds wrap-text alignment.
fn styles_xml() -> String {
    format!(
        concat!(
            "{decl}<styleSheet xmlns=\"{ns}\">",
            "<fonts count=\"1\"><font><sz val=\"11\"/><name val=\"Calibri\"/></font></fonts>",
            "<fills count=\"2\"><fill><patternFill patternType=\"none\"/></fill>",
            "<fill><patternFill patternType=\"gray125\"/></fill></fills>",
            "<borders count=\"1\"><border/></borders>",
            "<cellStyleXfs count=\"1\"><xf numFmtId=\"0\" fontId=\"0\" fillId=\"0\" borderId=\"0\"/></cellStyleXfs>",
            "<cellXfs count=\"2\">",
            "<xf numFmtId=\"0\" fontId=\"0\" fillId=\"0\" borderId=\"0\" xfId=\"0\"/>",
            "<xf numFmtId=\"0\" fontId=\"0\" fillId=\"0\" borderId=\"0\" xfId=\"0\" applyAlignment=\"1\"><alignment wrapText=\"1\"/></xf>",
            "</cellXfs></styleSheet>"
        ),
        decl = XML_DECL,
        ns = NS_MAIN,
    )
}

fn worksheet_xml(sheet: &Sheet, layout: &Layout) -> String {
    let style = if layout.wrap_text {
        STYLE_WRAP
    } else {
        STYLE_DEFAULT
    };
    let columns = sheet.table.column_count().max(1);

    let mut xml = String::from(XML_DECL);
    xml.push_str(&format!(r#"<worksheet xmlns="{NS_MAIN}">"#));
    xml.push_str(&format!(
        r#"<cols><col min="1" max="{columns}" width="{}" customWidth="1"/></cols>"#,
        layout.column_width
    ));
    xml.push_str("<sheetData>");

    write_row(&mut xml, 1, &sheet.table.columns, style);
    for (i, row) in sheet.table.rows.iter().enumerate() {
        write_row(&mut xml, i + 2, row, style);
    }

    xml.push_str("</sheetData></worksheet>");
    xml
}

fn write_row(xml: &mut String, row_number: usize, cells: &[String], style: u32) {
    xml.push_str(&format!(r#"<row r="{row_number}">"#));
    for (col, value) in cells.iter().enumerate() {
        let reference = format!("{}{row_number}", column_letter(col));
        xml.push_str(&format!(
            r#"<c r="{reference}" s="{style}" t="inlineStr"><is><t xml:space="preserve">{}</t></is></c>"#,
            escape(value.as_str())
        ));
    }
    xml.push_str("</row>");
}

/// 0-based column index to spreadsheet letters (0 = A, 26 = AA).
fn column_letter(mut index: usize) -> String {
    let mut letters = String::new();
    loop {
        letters.insert(0, (b'A' + (index % 26) as u8) as char);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    letters
}
