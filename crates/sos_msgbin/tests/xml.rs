use std::path::PathBuf;

use pretty_assertions::assert_eq;
use sos_msgbin::error::{Error, Result};
use sos_msgbin::xml::{from_xml, read_xml, to_xml};
use sos_msgbin::{decode, encode, Entry, Table};
use tracing_test::traced_test;
use widestring::U16String;

fn resource(name: &str) -> PathBuf {
    PathBuf::from(format!("{}/resources/{name}", env!("CARGO_MANIFEST_DIR")))
}

fn assert_malformed(xml: &str) {
    let result = from_xml(xml);
    assert!(
        matches!(result, Err(Error::MalformedInput(_))),
        "expected malformed input, got {result:?}"
    );
}

#[traced_test]
#[test]
fn pack_fixture_document() -> Result<()> {
    let table = read_xml(std::fs::File::open(resource("three_entries.xml"))?)?;
    let expected = std::fs::read(resource("three_entries.bin"))?;

    assert_eq!(encode(&table)?, expected);

    Ok(())
}

#[traced_test]
#[test]
fn extract_writes_one_element_per_entry() -> Result<()> {
    let table = decode(&std::fs::read(resource("three_entries.bin"))?)?;
    let xml = to_xml(&table)?;

    assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>"));
    assert!(xml.contains("<Entries Count=\"3\">"));
    assert!(xml.contains("<Entry Index=\"0\">Hello</Entry>"));
    assert!(xml.contains("<Entry Index=\"1\"/>"));
    assert!(xml.contains("<Entry Index=\"2\">Wörld \u{1F600}</Entry>"));
    assert!(xml.ends_with("</Entries>\n"));

    assert_eq!(from_xml(&xml)?, table);

    Ok(())
}

#[test]
fn text_survives_roundtrip() -> Result<()> {
    let table = Table::from_texts([
        "  leading and trailing  ",
        "<tag attr=\"x\"> & 'quotes'",
        "line one\nline two",
        "windows\r\nline",
        "\t",
        "",
    ]);

    assert_eq!(from_xml(&to_xml(&table)?)?, table);

    Ok(())
}

#[test]
fn empty_table_roundtrip() -> Result<()> {
    let xml = to_xml(&Table::default())?;

    assert!(xml.contains("<Entries Count=\"0\"/>"));
    assert_eq!(from_xml(&xml)?, Table::default());

    Ok(())
}

#[test]
fn child_order_is_irrelevant() -> Result<()> {
    let table = from_xml(
        r#"<Entries Count="3"><Entry Index="2">c</Entry><Entry Index="0">a</Entry><Entry Index="1">b</Entry></Entries>"#,
    )?;

    assert_eq!(table, Table::from_texts(["a", "b", "c"]));

    Ok(())
}

#[test]
fn resolves_entities_and_cdata() -> Result<()> {
    let table = from_xml(
        r#"<Entries Count="2"><Entry Index="0">&lt;b&gt; &#x41;&#13;</Entry><Entry Index="1"><![CDATA[<raw> & text]]></Entry></Entries>"#,
    )?;

    assert_eq!(table.by_index(0).map(Entry::text_lossy).as_deref(), Some("<b> A\r"));
    assert_eq!(table.by_index(1).map(Entry::text_lossy).as_deref(), Some("<raw> & text"));

    Ok(())
}

#[test]
fn skips_unknown_elements() -> Result<()> {
    let table = from_xml(
        r#"<Entries Count="1"><!-- note --><Comment><Entry Index="7">x</Entry></Comment><Entry Index="0">a</Entry></Entries>"#,
    )?;

    assert_eq!(table, Table::from_texts(["a"]));

    Ok(())
}

#[test]
fn extract_refuses_characters_xml_cannot_hold() -> Result<()> {
    let embedded_null = Table::new(
        1,
        vec![Entry::new(0, U16String::from_vec(vec![0x41, 0, 0x42]))],
    );
    let control = Table::from_texts(["fine", "\u{1}x"]);
    let noncharacter = Table::from_texts(["x\u{FFFE}"]);

    for table in [embedded_null, control, noncharacter] {
        let result = to_xml(&table);
        assert!(
            matches!(&result, Err(Error::MalformedInput(message)) if message.contains("entry")),
            "expected malformed input, got {result:?}"
        );
    }

    // The binary codec still keeps the embedded null
    let table = decode(&encode(&Table::new(
        1,
        vec![Entry::new(0, U16String::from_vec(vec![0x41, 0, 0x42]))],
    ))?)?;
    assert_eq!(table[0].text().as_slice(), [0x41, 0, 0x42]);

    Ok(())
}

#[test]
fn rejects_duplicate_index() {
    assert_malformed(
        r#"<Entries Count="2"><Entry Index="1">a</Entry><Entry Index="1">b</Entry></Entries>"#,
    );
}

#[test]
fn rejects_count_mismatch() {
    assert_malformed(r#"<Entries Count="2"><Entry Index="0">a</Entry></Entries>"#);
    assert_malformed(r#"<Entries Count="0"><Entry Index="0">a</Entry></Entries>"#);
}

#[test]
fn rejects_index_out_of_range() {
    assert_malformed(r#"<Entries Count="1"><Entry Index="1">a</Entry></Entries>"#);
}

#[test]
fn rejects_bad_attributes() {
    assert_malformed(r#"<Entries><Entry Index="0">a</Entry></Entries>"#);
    assert_malformed(r#"<Entries Count="one"><Entry Index="0">a</Entry></Entries>"#);
    assert_malformed(r#"<Entries Count="1"><Entry>a</Entry></Entries>"#);
    assert_malformed(r#"<Entries Count="1"><Entry Index="-1">a</Entry></Entries>"#);

    let result = from_xml(r#"<Entries Count="one"/>"#);
    assert!(
        matches!(&result, Err(Error::MalformedInput(message)) if message.contains("`Count=\"one\"` is not a valid number")),
        "{result:?}"
    );
}

#[test]
fn rejects_wrong_structure() {
    assert_malformed(r#"<Strings Count="0"/>"#);
    assert_malformed("");
    assert_malformed(r#"<Entries Count="1"><Entry Index="0">a<b/></Entry></Entries>"#);
    assert!(from_xml(r#"<Entries Count="1"><Entry Index="0">a</Entry>"#).is_err());
}
