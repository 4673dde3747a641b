//! Key-by-key decoding of settings documents.
//!
//! A settings file is first parsed as a plain TOML table, so only text that
//! is not TOML at all is rejected as a whole.  Each section is then decoded
//! one key at a time on top of the section's defaults: a key whose value does
//! not fit its field (a string where a number belongs, a port above 65535, an
//! integer wider than the field) is dropped with a warning and that field
//! keeps its default.  Every other key of the section is still applied.
//!
//! Arrays of entries (`[[Friends.Friend]]` and friends) are decoded the same
//! way per entry, so one bad value never costs the other entries.

use serde::de::DeserializeOwned;
use serde::Serialize;
use toml::{Table, Value};
use tracing::warn;

/// Parses `text` into its top-level table.
///
/// # Errors
///
/// Returns the parser error if `text` is not a TOML document.
pub(crate) fn parse(text: &str) -> Result<Table, toml::de::Error> {
    toml::from_str(text)
}

/// Removes the table called `name` from `doc`.  A missing section, or a
/// value that is not a table, yields an empty table.
pub(crate) fn take_section(doc: &mut Table, name: &str) -> Table {
    match doc.remove(name) {
        Some(Value::Table(table)) => table,
        Some(other) => {
            warn!(
                section = name,
                found = other.type_str(),
                "section is not a table, using defaults"
            );
            Table::new()
        }
        None => Table::new(),
    }
}

/// Decodes `table` into `T`, starting from `T::default()` and applying one
/// key at a time.  Keys whose value `T` rejects are skipped.
pub(crate) fn decode<T>(section: &str, table: Table) -> T
where
    T: Serialize + DeserializeOwned + Default,
{
    let mut accepted = match Value::try_from(T::default()) {
        Ok(Value::Table(defaults)) => defaults,
        _ => Table::new(),
    };

    for (key, value) in table {
        let previous = accepted.insert(key.clone(), value);
        if Value::Table(accepted.clone()).try_into::<T>().is_err() {
            warn!(section, key = %key, "invalid value, using default");
            match previous {
                Some(default) => accepted.insert(key, default),
                None => accepted.remove(&key),
            };
        }
    }

    Value::Table(accepted).try_into().unwrap_or_default()
}

/// Decodes the array of tables stored under `key` in `section`.  Each entry
/// is decoded with [`decode`]; elements that are not tables are skipped.
pub(crate) fn decode_entries<T>(section: &str, table: &mut Table, key: &str) -> Vec<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    let entries = match table.remove(key) {
        Some(Value::Array(entries)) => entries,
        Some(other) => {
            warn!(section, key, found = other.type_str(), "expected a list of entries");
            return Vec::new();
        }
        None => return Vec::new(),
    };

    entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| match entry {
            Value::Table(entry) => Some(decode(section, entry)),
            other => {
                warn!(section, index, found = other.type_str(), "skipping entry that is not a table");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    #[serde(default, rename_all = "camelCase")]
    struct Sample {
        name: String,
        port: u16,
        enabled: bool,
    }

    impl Default for Sample {
        fn default() -> Self {
            Self {
                name: "none".to_string(),
                port: 80,
                enabled: true,
            }
        }
    }

    fn table(text: &str) -> Table {
        parse(text).expect("valid toml")
    }

    #[test]
    fn test_valid_keys_are_applied() {
        let sample: Sample = decode("S", table("name = \"a\"\nport = 8080\nenabled = false\n"));
        assert_eq!(
            sample,
            Sample {
                name: "a".to_string(),
                port: 8080,
                enabled: false
            }
        );
    }

    #[test]
    fn test_bad_key_keeps_its_default_and_the_rest_apply() {
        // Arrange: port does not fit a u16, enabled is the wrong type.
        let text = "name = \"kept\"\nport = 70000\nenabled = \"yes\"\n";

        // Act
        let sample: Sample = decode("S", table(text));

        // Assert
        assert_eq!(sample.name, "kept");
        assert_eq!(sample.port, 80);
        assert!(sample.enabled);
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let sample: Sample = decode("S", table("other = 1\nport = 1\n"));
        assert_eq!(sample.port, 1);
    }

    #[test]
    fn test_section_that_is_not_a_table_is_empty() {
        let mut doc = table("Proxy = 3\n");
        assert!(take_section(&mut doc, "Proxy").is_empty());
        assert!(take_section(&mut doc, "Missing").is_empty());
    }

    #[test]
    fn test_entries_are_decoded_one_by_one() {
        // Arrange
        let mut section = table(
            "[[Item]]\nname = \"a\"\nport = -1\n\n[[Item]]\nname = \"b\"\nport = 2\n",
        );

        // Act
        let items: Vec<Sample> = decode_entries("S", &mut section, "Item");

        // Assert
        assert_eq!(items.len(), 2);
        assert_eq!((items[0].name.as_str(), items[0].port), ("a", 80));
        assert_eq!((items[1].name.as_str(), items[1].port), ("b", 2));
    }

    #[test]
    fn test_entries_key_with_wrong_type_yields_nothing() {
        let mut section = table("Item = \"x\"\n");
        let items: Vec<Sample> = decode_entries("S", &mut section, "Item");
        assert!(items.is_empty());
    }
}
