use std::path::PathBuf;

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use sos_msgbin::error::Result;
use sos_msgbin::{decode, encode, Entry, Table};
use tracing_test::traced_test;
use widestring::U16String;

fn resource(name: &str) -> PathBuf {
    PathBuf::from(format!("{}/resources/{name}", env!("CARGO_MANIFEST_DIR")))
}

#[traced_test]
#[test]
fn encode_single_entry() -> Result<()> {
    let table = Table::new(1, vec![Entry::from_text(0, "Hi")]);

    assert_eq!(
        encode(&table)?,
        [0x04, 0, 0, 0, 0x48, 0x00, 0x69, 0x00, 0x00, 0x00]
    );

    Ok(())
}

#[traced_test]
#[test]
fn encode_empty_table() -> Result<()> {
    let bytes = encode(&Table::default())?;
    assert_eq!(bytes, [0, 0, 0, 0]);

    let table = decode(&bytes)?;
    assert!(table.is_empty());
    assert_eq!(encode(&table)?, bytes);

    Ok(())
}

#[traced_test]
#[test]
fn reencode_is_byte_identical() -> Result<()> {
    for name in ["single_entry.bin", "three_entries.bin", "empty.bin"] {
        let expected = std::fs::read(resource(name))?;
        let actual = encode(&decode(&expected)?)?;

        assert_eq!(expected, actual, "{name}");
    }

    Ok(())
}

#[test]
fn encode_normalizes_entry_order() -> Result<()> {
    let ascending = Table::from_texts(["zero", "one", "two", "three"]);
    let shuffled = Table::new(
        4,
        vec![
            Entry::from_text(2, "two"),
            Entry::from_text(0, "zero"),
            Entry::from_text(3, "three"),
            Entry::from_text(1, "one"),
        ],
    );
    let descending = Table::new(4, ascending.iter().rev().cloned().collect());

    let expected = encode(&ascending)?;
    assert_eq!(encode(&shuffled)?, expected);
    assert_eq!(encode(&descending)?, expected);

    Ok(())
}

#[test]
fn encoded_length_matches_layout() -> Result<()> {
    let table = Table::from_texts(["abc", "", "\u{1F600}"]);
    let bytes = encode(&table)?;

    assert_eq!(bytes.len(), 3 * 4 + (3 * 2 + 2) + 2 + (2 * 2 + 2));
    assert_eq!(&bytes[..4], &[12, 0, 0, 0]);

    Ok(())
}

fn arbitrary_table() -> impl Strategy<Value = Table> {
    prop::collection::vec(prop::collection::vec(any::<u16>(), 0..32), 0..64).prop_map(|texts| {
        let entries: Vec<Entry> = (0u32..)
            .zip(texts)
            .map(|(index, units)| Entry::new(index, U16String::from_vec(units)))
            .collect();
        Table::new(entries.len() as u32, entries)
    })
}

proptest! {
    #[test]
    fn roundtrip_arbitrary_tables(table in arbitrary_table()) {
        let bytes = encode(&table).expect("encode failed");
        let decoded = decode(&bytes).expect("decode failed");

        prop_assert_eq!(&decoded, &table);
        prop_assert_eq!(encode(&decoded).expect("re-encode failed"), bytes);
    }
}
