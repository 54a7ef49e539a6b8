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

//! Parser for ASTERIX category definition XML.
//!
//! A definition file describes one category under an `<asterix_category>`
//! root: a `<header>`, the `<user_application_profile>` listing UAP slots in
//! FSPEC order, the `<data_items>` catalog with per-item `<structure>`
//! fields, and optional `<validation_rules>`. The XML is deserialized with
//! serde into internal mapping structs that are private to this module and
//! then converted into the flat model types of the `asterix` crate.

use serde::Deserialize;

use asterix::schema::{
    Category, CategoryHeader, DataItemDef, FieldDef, FieldType, Format, RuleKind, Uap, Unit,
    ValidationRule,
};
use log::warn;

use crate::error::Error;

/// Parses one category definition from an XML string.
///
/// # Examples
///
/// ```
/// let xml = r#"
/// <asterix_category>
///   <header>
///     <category>2</category>
///     <name>Monoradar Service Messages</name>
///     <version>1.0</version>
///   </header>
///   <user_application_profile>
///     <uap_items>
///       <item>I002/010</item>
///     </uap_items>
///   </user_application_profile>
///   <data_items>
///     <data_item id="I002/010">
///       <name>Data Source Identifier</name>
///       <format>fixed</format>
///       <length>2</length>
///       <structure>
///         <field name="SAC" type="uint8" bits="8"/>
///         <field name="SIC" type="uint8" bits="8"/>
///       </structure>
///     </data_item>
///   </data_items>
/// </asterix_category>"#;
///
/// let category = catdef::parse_category(xml).unwrap();
/// assert_eq!(category.number(), 2);
/// assert_eq!(category.uap.len(), 1);
/// assert!(category.item("I002/010").is_some());
/// ```
pub fn parse_category(xml: &str) -> Result<Category, Error> {
    let raw: XmlCategory = quick_xml::de::from_str(xml)?;
    convert_category(raw)
}

// ===========================================================================
// Conversions: XML serde structs → schema model
// ===========================================================================

fn convert_category(raw: XmlCategory) -> Result<Category, Error> {
    let header = raw.header.ok_or(Error::MissingField("header"))?;
    let number = header.category.ok_or(Error::MissingField("header/category"))?;

    let slots = raw
        .uap
        .and_then(|uap| uap.uap_items)
        .map(|items| items.items)
        .unwrap_or_default();

    let mut category = Category::new(
        CategoryHeader {
            number,
            name: header.name.unwrap_or_default(),
            version: header.version.unwrap_or_default(),
        },
        Uap::new(slots),
    );

    for item in raw.data_items.map(|di| di.items).unwrap_or_default() {
        category.insert_item(convert_data_item(item)?);
    }

    for rule in raw.validation_rules.map(|vr| vr.rules).unwrap_or_default() {
        category.rules.push(convert_rule(rule)?);
    }

    Ok(category)
}

fn convert_data_item(raw: XmlDataItem) -> Result<DataItemDef, Error> {
    let id = raw.id.ok_or(Error::MissingField("data_item id"))?;
    let format = parse_format(raw.format.as_deref().ok_or(Error::MissingField("format"))?)?;

    let mut fields = Vec::new();
    let mut extensions = Vec::new();
    if let Some(structure) = raw.structure {
        for field in structure.fields {
            fields.push(convert_field(field)?);
        }
        extensions = structure.extensions;
    }

    // Extensions gate on an FX flag earlier in the structure. Each block
    // attaches to the first FX-named field that has none yet, searching
    // already-attached extensions too so chained FX levels nest.
    for extension in extensions {
        let Some(condition) = extension.condition else {
            warn!("extension without condition in {id} is dropped");
            continue;
        };
        let ext_fields = extension
            .fields
            .into_iter()
            .map(convert_field)
            .collect::<Result<Vec<_>, _>>()?;
        if !attach_extension(&mut fields, &condition, &ext_fields) {
            warn!("no FX field to attach an extension to in {id}");
        }
    }

    Ok(DataItemDef {
        id,
        name: raw.name.unwrap_or_default(),
        format,
        length: raw.length,
        fields,
    })
}

fn attach_extension(fields: &mut [FieldDef], condition: &str, ext_fields: &[FieldDef]) -> bool {
    for field in fields.iter_mut() {
        if (field.name == "FX" || field.name == "FX2") && field.extension.is_empty() {
            field.condition = Some(condition.to_string());
            field.extension = ext_fields.to_vec();
            return true;
        }
    }
    for field in fields.iter_mut() {
        if !field.extension.is_empty()
            && attach_extension(&mut field.extension, condition, ext_fields)
        {
            return true;
        }
    }
    false
}

fn convert_field(raw: XmlField) -> Result<FieldDef, Error> {
    let name = raw.name.ok_or(Error::MissingField("field name"))?;
    let type_str = raw.field_type.as_deref().ok_or(Error::MissingField("field type"))?;
    let (kind, default_bits) = parse_field_type(type_str)?;

    let bits = raw
        .bits
        .or(default_bits)
        .ok_or(Error::MissingField("field bits"))?;

    let mut field = FieldDef::new(name, kind, bits);
    if let Some(lsb) = raw.lsb.as_deref() {
        field.lsb = parse_lsb(lsb)?;
    }
    if let Some(unit) = raw.unit.as_deref() {
        field.unit = parse_unit(unit);
    }
    field.description = raw.description;
    field.encoding = raw.encoding;
    Ok(field)
}

fn convert_rule(raw: XmlRule) -> Result<ValidationRule, Error> {
    let field = raw.field.ok_or(Error::MissingField("rule field"))?;
    let kind = match raw.kind.as_deref() {
        Some("mandatory") => RuleKind::Mandatory,
        Some("conditional") => RuleKind::Conditional,
        Some("optional") | None => RuleKind::Optional,
        Some(other) => {
            warn!("unknown rule type {other:?} on {field}, treated as optional");
            RuleKind::Optional
        }
    };
    Ok(ValidationRule {
        field,
        kind,
        condition: raw.condition,
    })
}

fn parse_format(s: &str) -> Result<Format, Error> {
    match s {
        "fixed" => Ok(Format::Fixed),
        "variable" => Ok(Format::Variable),
        "explicit" => Ok(Format::Explicit),
        "repetitive" => Ok(Format::Repetitive),
        _ => Err(Error::InvalidValue {
            field: "format",
            value: s.to_string(),
        }),
    }
}

/// Maps a type string to a field kind and, for self-describing widths like
/// `uint12`, the default bit count.
fn parse_field_type(s: &str) -> Result<(FieldType, Option<u8>), Error> {
    let invalid = || Error::InvalidValue {
        field: "type",
        value: s.to_string(),
    };

    match s {
        "bool" => Ok((FieldType::Bool, Some(1))),
        "string" => Ok((FieldType::Str, None)),
        "bytes" => Ok((FieldType::Bytes, None)),
        _ => {
            if let Some(width) = s.strip_prefix("uint") {
                let bits: u8 = width.parse().map_err(|_| invalid())?;
                if (1..=32).contains(&bits) {
                    Ok((FieldType::Unsigned, Some(bits)))
                } else {
                    Err(invalid())
                }
            } else if let Some(width) = s.strip_prefix("int") {
                let bits: u8 = width.parse().map_err(|_| invalid())?;
                if matches!(bits, 8 | 16 | 24 | 32) {
                    Ok((FieldType::Signed, Some(bits)))
                } else {
                    Err(invalid())
                }
            } else {
                Err(invalid())
            }
        }
    }
}

/// Parses an LSB multiplier, either a decimal or a fraction like `1/128`.
fn parse_lsb(s: &str) -> Result<f64, Error> {
    let invalid = || Error::InvalidValue {
        field: "lsb",
        value: s.to_string(),
    };

    if let Some((numerator, denominator)) = s.split_once('/') {
        let n: f64 = numerator.trim().parse().map_err(|_| invalid())?;
        let d: f64 = denominator.trim().parse().map_err(|_| invalid())?;
        if d == 0.0 {
            return Err(invalid());
        }
        Ok(n / d)
    } else {
        s.trim().parse().map_err(|_| invalid())
    }
}

/// Unknown unit strings fall back to no unit; units are labels, not part of
/// the wire format.
fn parse_unit(s: &str) -> Unit {
    match s {
        "s" => Unit::Seconds,
        "NM" => Unit::NauticalMiles,
        "degrees" => Unit::Degrees,
        "FL" => Unit::FlightLevel,
        "ft" => Unit::Feet,
        "kts" => Unit::Knots,
        "m/s" => Unit::MetresPerSecond,
        _ => Unit::None,
    }
}

// ===========================================================================
// Internal XML serde structs
// ===========================================================================

#[derive(Debug, Deserialize)]
struct XmlCategory {
    #[serde(default)]
    header: Option<XmlHeader>,
    #[serde(rename = "user_application_profile", default)]
    uap: Option<XmlUap>,
    #[serde(default)]
    data_items: Option<XmlDataItems>,
    #[serde(default)]
    validation_rules: Option<XmlValidationRules>,
}

#[derive(Debug, Deserialize)]
struct XmlHeader {
    #[serde(default)]
    category: Option<u8>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    version: Option<String>,
}

#[derive(Debug, Deserialize)]
struct XmlUap {
    #[serde(default)]
    uap_items: Option<XmlUapItems>,
}

#[derive(Debug, Deserialize)]
struct XmlUapItems {
    #[serde(rename = "item", default)]
    items: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct XmlDataItems {
    #[serde(rename = "data_item", default)]
    items: Vec<XmlDataItem>,
}

#[derive(Debug, Deserialize)]
struct XmlDataItem {
    #[serde(rename = "@id", default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    format: Option<String>,
    #[serde(default)]
    length: Option<u16>,
    #[serde(default)]
    structure: Option<XmlStructure>,
}

#[derive(Debug, Deserialize)]
struct XmlStructure {
    #[serde(rename = "field", default)]
    fields: Vec<XmlField>,
    #[serde(rename = "extension", default)]
    extensions: Vec<XmlExtension>,
}

#[derive(Debug, Deserialize)]
struct XmlField {
    #[serde(rename = "@name", default)]
    name: Option<String>,
    #[serde(rename = "@type", default)]
    field_type: Option<String>,
    #[serde(rename = "@bits", default)]
    bits: Option<u8>,
    #[serde(rename = "@lsb", default)]
    lsb: Option<String>,
    #[serde(rename = "@unit", default)]
    unit: Option<String>,
    #[serde(rename = "@description", default)]
    description: Option<String>,
    #[serde(rename = "@encoding", default)]
    encoding: Option<String>,
}

#[derive(Debug, Deserialize)]
struct XmlExtension {
    #[serde(rename = "@condition", default)]
    condition: Option<String>,
    #[serde(rename = "field", default)]
    fields: Vec<XmlField>,
}

#[derive(Debug, Deserialize)]
struct XmlValidationRules {
    #[serde(rename = "rule", default)]
    rules: Vec<XmlRule>,
}

#[derive(Debug, Deserialize)]
struct XmlRule {
    #[serde(rename = "@field", default)]
    field: Option<String>,
    #[serde(rename = "@type", default)]
    kind: Option<String>,
    #[serde(rename = "@condition", default)]
    condition: Option<String>,
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const CAT002_XML: &str = r#"
    <asterix_category>
      <header>
        <category>2</category>
        <name>Transmission of Monoradar Service Messages</name>
        <description>Service messages from monoradar stations</description>
        <version>1.0</version>
        <date>November 1997</date>
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
          <definition>Identification of the radar station</definition>
          <format>fixed</format>
          <length>2</length>
          <structure>
            <field name="SAC" type="uint8" bits="8" description="System Area Code"/>
            <field name="SIC" type="uint8" bits="8" description="System Identification Code"/>
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
      </data_items>
      <validation_rules>
        <rule field="I002/010" type="mandatory"/>
        <rule field="I002/000" type="mandatory"/>
        <rule field="I002/020" type="conditional" condition="I002/000 == 2"/>
        <rule field="I002/041" type="optional"/>
      </validation_rules>
    </asterix_category>"#;

    #[test]
    fn parses_header_and_uap() {
        let category = parse_category(CAT002_XML).unwrap();
        assert_eq!(category.number(), 2);
        assert_eq!(
            category.header.name,
            "Transmission of Monoradar Service Messages"
        );
        assert_eq!(category.header.version, "1.0");
        assert_eq!(category.uap.len(), 7);
        assert_eq!(category.uap.slot(0), Some("I002/010"));
        assert_eq!(category.uap.slot(6), Some("I002/060"));
    }

    #[test]
    fn parses_fixed_item_with_fields() {
        let category = parse_category(CAT002_XML).unwrap();
        let item = category.item("I002/010").unwrap();
        assert_eq!(item.format, Format::Fixed);
        assert_eq!(item.length, Some(2));
        assert_eq!(item.fields.len(), 2);
        assert_eq!(item.fields[0].name, "SAC");
        assert_eq!(item.fields[0].kind, FieldType::Unsigned);
        assert_eq!(item.fields[0].bits, 8);
        assert_eq!(
            item.fields[0].description.as_deref(),
            Some("System Area Code")
        );
    }

    #[test]
    fn parses_lsb_fraction_and_unit() {
        let category = parse_category(CAT002_XML).unwrap();
        let tod = &category.item("I002/030").unwrap().fields[0];
        assert_eq!(tod.lsb, 1.0 / 128.0);
        assert_eq!(tod.unit, Unit::Seconds);
        assert_eq!(tod.bits, 24);
    }

    #[test]
    fn attaches_extension_to_fx_field() {
        let category = parse_category(CAT002_XML).unwrap();
        let item = category.item("I002/050").unwrap();
        assert_eq!(item.format, Format::Variable);

        let fx = &item.fields[1];
        assert_eq!(fx.name, "FX");
        assert_eq!(fx.condition.as_deref(), Some("FX==1"));
        assert_eq!(fx.extension.len(), 2);
        assert_eq!(fx.extension[0].name, "STS2");
    }

    #[test]
    fn parses_validation_rules() {
        let category = parse_category(CAT002_XML).unwrap();
        assert_eq!(category.rules.len(), 4);
        assert_eq!(category.rules[0].kind, RuleKind::Mandatory);
        assert_eq!(category.rules[2].kind, RuleKind::Conditional);
        assert_eq!(
            category.rules[2].condition.as_deref(),
            Some("I002/000 == 2")
        );
        assert_eq!(category.rules[3].kind, RuleKind::Optional);
    }

    #[test]
    fn chained_extensions_nest() {
        let xml = r#"
        <asterix_category>
          <header><category>1</category></header>
          <data_items>
            <data_item id="I001/020">
              <name>Target Report Descriptor</name>
              <format>variable</format>
              <structure>
                <field name="TYP" type="bool" bits="1"/>
                <field name="spare" type="uint6" bits="6"/>
                <field name="FX" type="bool" bits="1"/>
                <extension condition="FX==1">
                  <field name="SSR" type="uint7" bits="7"/>
                  <field name="FX2" type="bool" bits="1"/>
                </extension>
                <extension condition="FX2==1">
                  <field name="PSR" type="uint7" bits="7"/>
                  <field name="FX3" type="bool" bits="1"/>
                </extension>
              </structure>
            </data_item>
          </data_items>
        </asterix_category>"#;

        let category = parse_category(xml).unwrap();
        let item = category.item("I001/020").unwrap();

        let fx = &item.fields[2];
        assert_eq!(fx.condition.as_deref(), Some("FX==1"));
        let fx2 = &fx.extension[1];
        assert_eq!(fx2.name, "FX2");
        assert_eq!(fx2.condition.as_deref(), Some("FX2==1"));
        assert_eq!(fx2.extension[0].name, "PSR");
    }

    #[test]
    fn missing_category_number_is_an_error() {
        let xml = "<asterix_category><header><name>x</name></header></asterix_category>";
        assert!(matches!(
            parse_category(xml),
            Err(Error::MissingField("header/category"))
        ));
    }

    #[test]
    fn unknown_field_type_is_an_error() {
        let xml = r#"
        <asterix_category>
          <header><category>2</category></header>
          <data_items>
            <data_item id="I002/010">
              <format>fixed</format>
              <length>1</length>
              <structure><field name="X" type="float32" bits="32"/></structure>
            </data_item>
          </data_items>
        </asterix_category>"#;
        assert!(matches!(
            parse_category(xml),
            Err(Error::InvalidValue { field: "type", .. })
        ));
    }

    #[test]
    fn unknown_format_is_an_error() {
        let xml = r#"
        <asterix_category>
          <header><category>2</category></header>
          <data_items>
            <data_item id="I002/010"><format>compound</format></data_item>
          </data_items>
        </asterix_category>"#;
        assert!(matches!(
            parse_category(xml),
            Err(Error::InvalidValue { field: "format", .. })
        ));
    }

    #[test]
    fn unknown_unit_falls_back_to_none() {
        assert_eq!(parse_unit("furlongs"), Unit::None);
        assert_eq!(parse_unit("NM"), Unit::NauticalMiles);
    }

    #[test]
    fn lsb_accepts_decimals_and_fractions() {
        assert_eq!(parse_lsb("0.25").unwrap(), 0.25);
        assert_eq!(parse_lsb("1/256").unwrap(), 1.0 / 256.0);
        assert!(parse_lsb("1/0").is_err());
        assert!(parse_lsb("fast").is_err());
    }

    #[test]
    fn type_widths_default_from_the_name() {
        assert_eq!(
            parse_field_type("uint12").unwrap(),
            (FieldType::Unsigned, Some(12))
        );
        assert_eq!(
            parse_field_type("int24").unwrap(),
            (FieldType::Signed, Some(24))
        );
        assert_eq!(parse_field_type("bool").unwrap(), (FieldType::Bool, Some(1)));
        assert!(parse_field_type("uint33").is_err());
        assert!(parse_field_type("int12").is_err());
    }
}
