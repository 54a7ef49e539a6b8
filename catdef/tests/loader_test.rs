// SPDX-License-Identifier: Apache-2.0
// Copyright 2026 Joe Pearson
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! End-to-end: XML category definition → registry → binary decode.

use asterix::schema::Registry;
use asterix::{Decoder, FieldValue};

const CAT002_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<asterix_category>
  <header>
    <category>2</category>
    <name>Transmission of Monoradar Service Messages</name>
    <version>1.0</version>
  </header>
  <user_application_profile>
    <uap_items>
      <item>I002/010</item>
      <item>I002/000</item>
      <item>I002/020</item>
      <item>I002/030</item>
      <item>I002/041</item>
      <item>I002/050</item>
      <item>I002/060</item>
    </uap_items>
  </user_application_profile>
  <data_items>
    <data_item id="I002/010">
      <name>Data Source Identifier</name>
      <format>fixed</format>
      <length>2</length>
      <structure>
        <field name="SAC" type="uint8" bits="8"/>
        <field name="SIC" type="uint8" bits="8"/>
      </structure>
    </data_item>
    <data_item id="I002/000">
      <name>Message Type</name>
      <format>fixed</format>
      <length>1</length>
      <structure>
        <field name="MessageType" type="uint8" bits="8"/>
      </structure>
    </data_item>
    <data_item id="I002/020">
      <name>Sector Number</name>
      <format>fixed</format>
      <length>1</length>
      <structure>
        <field name="Sector" type="uint8" bits="8" lsb="1.40625" unit="degrees"/>
      </structure>
    </data_item>
    <data_item id="I002/030">
      <name>Time of Day</name>
      <format>fixed</format>
      <length>3</length>
      <structure>
        <field name="ToD" type="uint24" bits="24" lsb="1/128" unit="s"/>
      </structure>
    </data_item>
    <data_item id="I002/041">
      <name>Antenna Rotation Period</name>
      <format>fixed</format>
      <length>2</length>
      <structure>
        <field name="ARP" type="uint16" bits="16" lsb="1/128" unit="s"/>
      </structure>
    </data_item>
    <data_item id="I002/050">
      <name>Station Configuration Status</name>
      <format>variable</format>
      <structure>
        <field name="STS" type="uint7" bits="7"/>
        <field name="FX" type="bool" bits="1"/>
        <extension condition="FX==1">
          <field name="STS2" type="uint7" bits="7"/>
          <field name="FX2" type="bool" bits="1"/>
        </extension>
      </structure>
    </data_item>
    <data_item id="I002/060">
      <name>Station Processing Mode</name>
      <format>variable</format>
      <structure>
        <field name="Mode" type="uint7" bits="7"/>
        <field name="FX" type="bool" bits="1"/>
      </structure>
    </data_item>
  </data_items>
  <validation_rules>
    <rule field="I002/010" type="mandatory"/>
    <rule field="I002/000" type="mandatory"/>
  </validation_rules>
</asterix_category>"#;

fn registry() -> Registry {
    let mut registry = Registry::new();
    registry.insert(catdef::parse_category(CAT002_XML).unwrap());
    registry
}

#[test]
fn loaded_category_decodes_a_service_message() {
    let registry = registry();
    let decoder = Decoder::new(&registry);

    let block = decoder.decode_block(&[
        0x02, 0x00, 0x0B, 0xF0, 0x00, 0x10, 0x01, 0x00, 0x12, 0x34, 0x56,
    ]);

    assert!(block.valid);
    let record = &block.records[0];
    assert!(record.valid);
    assert_eq!(record.length, 8);

    assert_eq!(
        record.item("I002/010").unwrap().field("SIC").unwrap().value,
        FieldValue::U8(0x10)
    );

    let tod = record.item("I002/030").unwrap().field("ToD").unwrap();
    assert_eq!(tod.value, FieldValue::U32(0x123456));
    assert_eq!(tod.lsb, 1.0 / 128.0);
    assert_eq!(tod.unit, asterix::schema::Unit::Seconds);

    assert!(decoder.validate(record));
    assert!(decoder.validate_block(&block));
}

#[test]
fn loaded_extension_decodes_the_second_status_byte() {
    let registry = registry();
    let decoder = Decoder::new(&registry);

    // FSPEC 0x04 selects I002/050; two status bytes chained with FX
    let record = decoder.decode_message(2, &[0x04, 0x83, 0x54]);
    assert!(record.valid);
    assert_eq!(record.length, 3);

    let status = record.item("I002/050").unwrap();
    assert_eq!(status.field("STS").unwrap().value, FieldValue::U8(0x41));
    assert_eq!(status.field("FX").unwrap().value, FieldValue::Bool(true));
    assert_eq!(status.field("STS2").unwrap().value, FieldValue::U8(0x2A));
    assert_eq!(status.field("FX2").unwrap().value, FieldValue::Bool(false));
}

#[test]
fn definitions_directory_round_trip() {
    let dir = std::env::temp_dir().join("catdef-loader-test");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("cat02.xml"), CAT002_XML).unwrap();
    std::fs::write(dir.join("notes.txt"), "not a definition").unwrap();
    std::fs::write(dir.join("broken.xml"), "<asterix_category>").unwrap();

    let registry = catdef::load_dir(&dir).unwrap();
    assert_eq!(registry.supported_categories(), vec![2]);

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn empty_directory_is_an_error() {
    let dir = std::env::temp_dir().join("catdef-empty-test");
    std::fs::create_dir_all(&dir).unwrap();

    assert!(matches!(
        catdef::load_dir(&dir),
        Err(catdef::Error::NoDefinitions { .. })
    ));

    std::fs::remove_dir_all(&dir).unwrap();
}
