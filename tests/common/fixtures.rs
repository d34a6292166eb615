//! Canonical hives shared by the harnesses.

use hiveq_core::memory::MemoryHive;
use hiveq_term::OutputStyle;

use super::builders::*;

/// Three keys written on T1=2020-01-01, T2=2021-06-15 and T3=2022-12-31,
/// holding values of 300, 50 and 150 bytes in traversal order, plus a few
/// values to search by name, data and slack.
///
/// ```text
/// ROOT
/// ├── Alpha   (T1)  Large=300B  Title="Run Alpha"
/// ├── Beta    (T2)  Small=50B   RunOnce=1
/// │   └── Gamma (T3)  Medium=150B  Secret=DE-AD + "key" slack
/// └── Undated         Removed (deleted)
/// ```
pub fn three_era_hive() -> MemoryHive {
    let root = KeyBuilder::new("ROOT")
        .subkey(
            KeyBuilder::new("Alpha")
                .written(day(2020, 1, 1))
                .value(ValueBuilder::sized("Large", 300))
                .value(ValueBuilder::sz("Title", "Run Alpha")),
        )
        .subkey(
            KeyBuilder::new("Beta")
                .written(day(2021, 6, 15))
                .value(ValueBuilder::sized("Small", 50))
                .value(ValueBuilder::dword("RunOnce", 1))
                .subkey(
                    KeyBuilder::new("Gamma")
                        .written(day(2022, 12, 31))
                        .value(ValueBuilder::sized("Medium", 150))
                        .value(ValueBuilder::binary("Secret", [0xde, 0xad]).slack(utf16("key"))),
                ),
        )
        .subkey(KeyBuilder::new("Undated").value(ValueBuilder::sz("Removed", "gone").deleted()))
        .build();
    MemoryHive::new(root)
}

/// Keys and values that tie on their sort keys.
///
/// ```text
/// ROOT
/// ├── Two  (2021-06-15)  B="Run two"  A="Run one"
/// ├── One  (2021-06-15)  C="Run one"
/// └── Zero (2020-01-01)
/// ```
pub fn tied_hive() -> MemoryHive {
    let root = KeyBuilder::new("ROOT")
        .subkey(
            KeyBuilder::new("Two")
                .written(day(2021, 6, 15))
                .value(ValueBuilder::sz("B", "Run two"))
                .value(ValueBuilder::sz("A", "Run one")),
        )
        .subkey(
            KeyBuilder::new("One")
                .written(day(2021, 6, 15))
                .value(ValueBuilder::sz("C", "Run one")),
        )
        .subkey(KeyBuilder::new("Zero").written(day(2020, 1, 1)))
        .build();
    MemoryHive::new(root)
}

/// The same hive as a JSON snapshot, for runs that load from disk.
pub const THREE_ERA_SNAPSHOT: &str = r#"{
  "root": {
    "name": "ROOT",
    "subkeys": [
      {
        "name": "Alpha",
        "last_write": "2020-01-01T00:00:00Z",
        "values": [ { "name": "Title", "type": "RegSz", "text": "Run Alpha" } ]
      },
      {
        "name": "Beta",
        "last_write": "2021-06-15T00:00:00Z",
        "values": [ { "name": "RunOnce", "type": "RegDword", "dword": 1 } ],
        "subkeys": [
          {
            "name": "Gamma",
            "last_write": "2022-12-31T00:00:00Z",
            "values": [ { "name": "Secret", "type": "RegBinary", "hex": "DE-AD", "slack": "6B-00-65-00-79-00" } ]
          }
        ]
      }
    ]
  }
}"#;

/// Plain output: no colour.
pub fn plain_style() -> OutputStyle {
    OutputStyle::default()
}

/// Coloured output with the default highlight colours.
pub fn color_style() -> OutputStyle {
    OutputStyle {
        color: true,
        ..OutputStyle::default()
    }
}
