//! Shared helpers: read generated workbooks back with zip + quick-xml.

use std::io::{Cursor, Read};

use quick_xml::escape::resolve_xml_entity;
use quick_xml::events::Event;
use quick_xml::Reader;

/// Read an XLSX byte buffer back into (sheet name, grid) pairs, in
/// workbook order. Cell values are inline strings.
pub fn read_sheets(bytes: &[u8]) -> Vec<(String, Vec<Vec<String>>)> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes.to_vec())).expect("valid zip");

    let names = sheet_names(&read_part(&mut archive, "xl/workbook.xml"));
    names
        .into_iter()
        .enumerate()
        .map(|(i, name)| {
            let xml = read_part(&mut archive, &format!("xl/worksheets/sheet{}.xml", i + 1));
            (name, sheet_grid(&xml))
        })
        .collect()
}

fn read_part(archive: &mut zip::ZipArchive<Cursor<Vec<u8>>>, name: &str) -> String {
    let mut part = archive.by_name(name).unwrap_or_else(|_| panic!("missing part {name}"));
    let mut content = String::new();
    part.read_to_string(&mut content).expect("utf-8 part");
    content
}

fn sheet_names(workbook_xml: &str) -> Vec<String> {
    let mut reader = Reader::from_str(workbook_xml);
    let mut names = Vec::new();
    loop {
        match reader.read_event().expect("well-formed workbook xml") {
            Event::Eof => break,
            Event::Start(e) | Event::Empty(e) if e.name().as_ref() == b"sheet" => {
                let name = e
                    .try_get_attribute("name")
                    .expect("readable attributes")
                    .expect("sheet has a name")
                    .unescape_value()
                    .expect("unescapable name")
                    .into_owned();
                names.push(name);
            }
            _ => {}
        }
    }
    names
}

fn sheet_grid(worksheet_xml: &str) -> Vec<Vec<String>> {
    let mut reader = Reader::from_str(worksheet_xml);
    let mut rows = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut cell = String::new();
    let mut in_text = false;

    loop {
        match reader.read_event().expect("well-formed worksheet xml") {
            Event::Eof => break,
            Event::Start(e) if e.name().as_ref() == b"row" => row = Vec::new(),
            Event::End(e) if e.name().as_ref() == b"row" => rows.push(std::mem::take(&mut row)),
            Event::Start(e) if e.name().as_ref() == b"t" => {
                in_text = true;
                cell.clear();
            }
            Event::End(e) if e.name().as_ref() == b"t" => {
                in_text = false;
                row.push(std::mem::take(&mut cell));
            }
            Event::Text(t) if in_text => {
                cell.push_str(&t.xml_content().expect("decodable text"));
            }
            Event::GeneralRef(r) if in_text => {
                let raw = r.xml_content().expect("decodable reference");
                if let Some(entity) = resolve_xml_entity(&raw) {
                    cell.push_str(entity);
                } else {
                    panic!("unexpected entity reference: {raw}");
                }
            }
            _ => {}
        }
    }
    rows
}
