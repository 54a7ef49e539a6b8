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

//! Data-item parsing: byte-span determination and the bit-level field walk.
//!
//! One call decodes one data item. The item's byte span is determined first
//! from its declared format, then the declared fields are walked at a running
//! bit offset inside that span. Because the span is known up front, any
//! error during the walk stays local to the item: the cursor has already
//! advanced past the span and the surrounding record keeps decoding.

use log::warn;

use crate::cursor::{extract_bits, Cursor};
use crate::record::{DataItem, Field};
use crate::schema::{DataItemDef, FieldDef, FieldType, Format};
use crate::value::FieldValue;
use crate::Error;

/// Decodes one data item at the cursor.
///
/// On success the cursor sits exactly one span past where it started, even
/// if individual fields failed to decode. The only hard failure is a span
/// the remaining input cannot supply: that is returned as
/// [`Error::Truncated`] for the caller to handle at record scope, since
/// there is no item boundary left to resynchronize on.
pub(crate) fn parse_data_item(def: &DataItemDef, cursor: &mut Cursor) -> Result<DataItem, Error> {
    let mut item = DataItem {
        id: def.id.clone(),
        name: def.name.clone(),
        fields: Vec::new(),
        valid: true,
        error: None,
    };

    let payload = match read_span(def, cursor) {
        Ok(payload) => payload,
        Err(e @ Error::Truncated { .. }) => return Err(e),
        Err(e) => {
            item.valid = false;
            item.error = Some(e.to_string());
            return Ok(item);
        }
    };

    let mut offset = 0;
    walk_fields(&def.fields, payload, &mut offset, &mut item.fields);
    Ok(item)
}

/// Consumes the item's byte span and returns the payload the fields are
/// decoded from. For explicit and repetitive items the leading length or
/// count byte is consumed but not part of the payload.
fn read_span<'a>(def: &DataItemDef, cursor: &mut Cursor<'a>) -> Result<&'a [u8], Error> {
    match def.format {
        Format::Fixed => {
            let length = declared_length(def)?;
            cursor.read_bytes(length)
        }
        Format::Explicit => {
            let total = cursor.read_u8()? as usize;
            // the length byte counts itself, so zero is unrepresentable
            let payload = total.checked_sub(1).ok_or_else(|| Error::SchemaMismatch {
                reason: format!("item {} declares an explicit length of zero", def.id),
            })?;
            cursor.read_bytes(payload)
        }
        Format::Repetitive => {
            let length = declared_length(def)?;
            let count = cursor.read_u8()? as usize;
            cursor.read_bytes(count * length)
        }
        Format::Variable => {
            let mut n = 0;
            loop {
                let Some(byte) = cursor.peek(n) else {
                    return Err(Error::Truncated {
                        expected: n + 1,
                        available: cursor.remaining(),
                    });
                };
                n += 1;
                if byte & 0x01 == 0 {
                    break;
                }
            }
            cursor.read_bytes(n)
        }
    }
}

fn declared_length(def: &DataItemDef) -> Result<usize, Error> {
    def.length
        .map(usize::from)
        .ok_or_else(|| Error::SchemaMismatch {
            reason: format!("item {} has no declared length", def.id),
        })
}

/// Walks a field list at the running bit offset, appending decoded fields.
///
/// Field-level failures are recorded on the field itself; the offset keeps
/// advancing by the declared widths so later fields stay aligned. Extension
/// fields gated by a satisfied condition are decoded in place, immediately
/// after their trigger.
fn walk_fields(defs: &[FieldDef], payload: &[u8], offset: &mut usize, out: &mut Vec<Field>) {
    for def in defs {
        if def.is_spare() {
            *offset += def.bits as usize;
            continue;
        }

        out.push(parse_field(def, payload, *offset));
        *offset += def.bits as usize;

        if let Some(condition) = def.condition.as_deref() {
            if !def.extension.is_empty() {
                match evaluate_condition(condition, out) {
                    Ok(true) => walk_fields(&def.extension, payload, offset, out),
                    Ok(false) => {}
                    Err(e) => warn!("skipping extension of {}: {e}", def.name),
                }
            }
        }
    }
}

/// Decodes one field at `offset` bits into `payload`.
fn parse_field(def: &FieldDef, payload: &[u8], offset: usize) -> Field {
    let mut field = Field {
        name: def.name.clone(),
        value: FieldValue::U8(0),
        unit: def.unit,
        lsb: def.lsb,
        description: def.description.clone(),
        valid: true,
        error: None,
    };

    match decode_value(def, payload, offset) {
        Ok(value) => field.value = value,
        Err(e) => {
            field.valid = false;
            field.error = Some(e.to_string());
        }
    }
    field
}

fn decode_value(def: &FieldDef, payload: &[u8], offset: usize) -> Result<FieldValue, Error> {
    match def.kind {
        // ICAO-encoded strings and byte runs are backed by whole bytes of
        // the span and may exceed the 32 bit extraction ceiling (48 bit
        // callsigns).
        FieldType::Str if def.encoding.as_deref() == Some("6bit_ascii") => {
            let window = byte_window(def, payload, offset)?;
            FieldValue::convert(0, window, def)
        }
        FieldType::Bytes => {
            let window = byte_window(def, payload, offset)?;
            FieldValue::convert(0, window, def)
        }
        _ => {
            let raw = extract_bits(payload, offset, def.bits as usize)?;
            FieldValue::convert(raw, &[], def)
        }
    }
}

/// The bytes backing a string or byte-run field: `ceil(bits / 8)` bytes from
/// the byte containing the field's first bit.
fn byte_window<'a>(def: &FieldDef, payload: &'a [u8], offset: usize) -> Result<&'a [u8], Error> {
    let first = offset / 8;
    let len = (def.bits as usize + 7) / 8;
    payload
        .get(first..first + len)
        .ok_or_else(|| Error::Truncated {
            expected: first + len,
            available: payload.len(),
        })
}

/// Evaluates an extension condition of the form `<field> == <literal>`
/// against the fields parsed so far. Only boolean (`0`/`1`) and 8 bit
/// unsigned operands are supported; anything else is unsupported and the
/// caller skips the extension with a warning.
fn evaluate_condition(condition: &str, fields: &[Field]) -> Result<bool, Error> {
    let unsupported = || Error::ConditionUnsupported {
        condition: condition.to_string(),
    };

    let (name, literal) = condition.split_once("==").ok_or_else(unsupported)?;
    let name = name.trim();
    let literal = literal.trim();

    let Some(field) = fields.iter().find(|f| f.name == name) else {
        return Ok(false);
    };

    match &field.value {
        FieldValue::Bool(value) => match literal {
            "1" => Ok(*value),
            "0" => Ok(!*value),
            _ => Err(unsupported()),
        },
        FieldValue::U8(value) => {
            let expected: u8 = literal.parse().map_err(|_| unsupported())?;
            Ok(*value == expected)
        }
        _ => Err(unsupported()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Unit;

    fn fixed(id: &str, length: u16, fields: Vec<FieldDef>) -> DataItemDef {
        DataItemDef {
            id: id.into(),
            name: id.into(),
            format: Format::Fixed,
            length: Some(length),
            fields,
        }
    }

    #[test]
    fn fixed_item_advances_by_declared_length() {
        let def = fixed(
            "I/010",
            2,
            vec![
                FieldDef::new("SAC", FieldType::Unsigned, 8),
                FieldDef::new("SIC", FieldType::Unsigned, 8),
            ],
        );
        let mut cursor = Cursor::new(&[0x00, 0x10, 0xFF]);
        let item = parse_data_item(&def, &mut cursor).unwrap();

        assert_eq!(cursor.position(), 2);
        assert!(item.valid);
        assert_eq!(item.field("SAC").unwrap().value, FieldValue::U8(0x00));
        assert_eq!(item.field("SIC").unwrap().value, FieldValue::U8(0x10));
    }

    #[test]
    fn fields_straddle_byte_boundaries() {
        let def = fixed(
            "I/040",
            2,
            vec![
                FieldDef::new("RHO", FieldType::Unsigned, 12),
                FieldDef::new("THETA", FieldType::Unsigned, 4),
            ],
        );
        let mut cursor = Cursor::new(&[0xAB, 0xCD]);
        let item = parse_data_item(&def, &mut cursor).unwrap();

        assert_eq!(item.field("RHO").unwrap().value, FieldValue::U16(0xABC));
        assert_eq!(item.field("THETA").unwrap().value, FieldValue::U8(0xD));
    }

    #[test]
    fn spare_fields_advance_without_output() {
        let def = fixed(
            "I/020",
            1,
            vec![
                FieldDef::new("TYP", FieldType::Unsigned, 3),
                FieldDef::spare(4),
                FieldDef::new("E", FieldType::Bool, 1),
            ],
        );
        let mut cursor = Cursor::new(&[0b101_0000_1]);
        let item = parse_data_item(&def, &mut cursor).unwrap();

        assert_eq!(item.fields.len(), 2);
        assert_eq!(item.field("TYP").unwrap().value, FieldValue::U8(0b101));
        assert_eq!(item.field("E").unwrap().value, FieldValue::Bool(true));
    }

    #[test]
    fn variable_item_follows_the_fx_chain() {
        let def = DataItemDef {
            id: "I/050".into(),
            name: "Status".into(),
            format: Format::Variable,
            length: None,
            fields: vec![
                FieldDef::new("A", FieldType::Unsigned, 7),
                FieldDef::new("FX", FieldType::Bool, 1),
            ],
        };
        // 0x81 has FX=1, 0x80 has FX=0; the 0x00 belongs to the next item
        let mut cursor = Cursor::new(&[0x81, 0x80, 0x00]);
        let item = parse_data_item(&def, &mut cursor).unwrap();

        assert_eq!(cursor.position(), 2);
        assert_eq!(item.field("A").unwrap().value, FieldValue::U8(0x40));
        assert_eq!(item.field("FX").unwrap().value, FieldValue::Bool(true));
    }

    #[test]
    fn explicit_length_counts_itself() {
        let def = DataItemDef {
            id: "I/070".into(),
            name: "Explicit".into(),
            format: Format::Explicit,
            length: None,
            fields: vec![FieldDef::new("V", FieldType::Unsigned, 16)],
        };
        let mut cursor = Cursor::new(&[0x03, 0x12, 0x34, 0x56]);
        let item = parse_data_item(&def, &mut cursor).unwrap();

        assert_eq!(cursor.position(), 3);
        assert_eq!(item.field("V").unwrap().value, FieldValue::U16(0x1234));
    }

    #[test]
    fn explicit_length_zero_invalidates_the_item() {
        let def = DataItemDef {
            id: "I/070".into(),
            name: "Explicit".into(),
            format: Format::Explicit,
            length: None,
            fields: Vec::new(),
        };
        let mut cursor = Cursor::new(&[0x00, 0xAA]);
        let item = parse_data_item(&def, &mut cursor).unwrap();

        assert!(!item.valid);
        assert!(item.error.is_some());
        // the length byte itself was consumed; the record can resume after it
        assert_eq!(cursor.position(), 1);
    }

    #[test]
    fn repetitive_item_reads_count_times_length() {
        let def = DataItemDef {
            id: "I/080".into(),
            name: "Plots".into(),
            format: Format::Repetitive,
            length: Some(2),
            fields: vec![FieldDef::new("P", FieldType::Unsigned, 16)],
        };
        let mut cursor = Cursor::new(&[0x02, 0xAA, 0xBB, 0xCC, 0xDD, 0xEE]);
        let item = parse_data_item(&def, &mut cursor).unwrap();

        assert_eq!(cursor.position(), 5);
        assert_eq!(item.field("P").unwrap().value, FieldValue::U16(0xAABB));
    }

    #[test]
    fn missing_span_is_a_truncation() {
        let def = fixed("I/030", 3, vec![FieldDef::new("ToD", FieldType::Unsigned, 24)]);
        let mut cursor = Cursor::new(&[0x12, 0x34]);
        assert!(matches!(
            parse_data_item(&def, &mut cursor),
            Err(Error::Truncated { .. })
        ));
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn missing_declared_length_invalidates_without_consuming() {
        let def = DataItemDef {
            id: "I/090".into(),
            name: "Broken".into(),
            format: Format::Fixed,
            length: None,
            fields: Vec::new(),
        };
        let mut cursor = Cursor::new(&[0x12, 0x34]);
        let item = parse_data_item(&def, &mut cursor).unwrap();

        assert!(!item.valid);
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn field_error_stays_on_the_field() {
        let def = fixed(
            "I/100",
            1,
            vec![
                FieldDef::new("GOOD", FieldType::Unsigned, 4),
                // 12 bit signed width is not supported
                FieldDef::new("BAD", FieldType::Signed, 12),
            ],
        );
        let mut cursor = Cursor::new(&[0xA5]);
        let item = parse_data_item(&def, &mut cursor).unwrap();

        assert!(item.valid);
        assert!(item.field("GOOD").unwrap().valid);
        let bad = item.field("BAD").unwrap();
        assert!(!bad.valid);
        assert!(bad.error.is_some());
        assert_eq!(cursor.position(), 1);
    }

    #[test]
    fn bool_condition_triggers_extension() {
        let def = DataItemDef {
            id: "I/050".into(),
            name: "Status".into(),
            format: Format::Variable,
            length: None,
            fields: vec![
                FieldDef::new("A", FieldType::Unsigned, 7),
                FieldDef::new("FX", FieldType::Bool, 1).with_extension(
                    "FX == 1",
                    vec![
                        FieldDef::new("B", FieldType::Unsigned, 7),
                        FieldDef::new("FX2", FieldType::Bool, 1),
                    ],
                ),
            ],
        };
        let mut cursor = Cursor::new(&[0x81, 0x42]);
        let item = parse_data_item(&def, &mut cursor).unwrap();

        assert_eq!(cursor.position(), 2);
        assert_eq!(item.fields.len(), 4);
        assert_eq!(item.field("B").unwrap().value, FieldValue::U8(0x21));
        assert_eq!(item.field("FX2").unwrap().value, FieldValue::Bool(false));
    }

    #[test]
    fn false_condition_skips_extension() {
        let def = DataItemDef {
            id: "I/050".into(),
            name: "Status".into(),
            format: Format::Variable,
            length: None,
            fields: vec![
                FieldDef::new("A", FieldType::Unsigned, 7),
                FieldDef::new("FX", FieldType::Bool, 1)
                    .with_extension("FX == 1", vec![FieldDef::new("B", FieldType::Unsigned, 8)]),
            ],
        };
        let mut cursor = Cursor::new(&[0x80]);
        let item = parse_data_item(&def, &mut cursor).unwrap();
        assert_eq!(item.fields.len(), 2);
    }

    #[test]
    fn u8_condition_compares_decimal_literal() {
        let def = fixed(
            "I/000",
            2,
            vec![
                FieldDef::new("TYP", FieldType::Unsigned, 8)
                    .with_extension("TYP == 2", vec![FieldDef::new("EXT", FieldType::Unsigned, 8)]),
            ],
        );
        let mut cursor = Cursor::new(&[0x02, 0x99]);
        let item = parse_data_item(&def, &mut cursor).unwrap();
        assert_eq!(item.field("EXT").unwrap().value, FieldValue::U8(0x99));
    }

    #[test]
    fn unsupported_condition_skips_with_warning() {
        let def = fixed(
            "I/000",
            2,
            vec![
                FieldDef::new("TYP", FieldType::Unsigned, 8)
                    .with_extension("TYP >= 2", vec![FieldDef::new("EXT", FieldType::Unsigned, 8)]),
            ],
        );
        let mut cursor = Cursor::new(&[0x02, 0x99]);
        let item = parse_data_item(&def, &mut cursor).unwrap();

        // extension skipped, span still fully consumed
        assert_eq!(item.fields.len(), 1);
        assert_eq!(cursor.position(), 2);
    }

    #[test]
    fn condition_on_missing_field_is_false() {
        assert_eq!(evaluate_condition("NOPE == 1", &[]).unwrap(), false);
    }

    #[test]
    fn six_bit_callsign_field() {
        // "AFR" packed as 6-bit ICAO characters, then padding
        let def = fixed(
            "I/380",
            6,
            vec![FieldDef::new("CS", FieldType::Str, 48).with_encoding("6bit_ascii")],
        );
        let mut cursor = Cursor::new(&[0b0000_0100, 0b0110_0100, 0b1000_0000, 0, 0, 0]);
        let item = parse_data_item(&def, &mut cursor).unwrap();
        assert_eq!(item.field("CS").unwrap().value, FieldValue::Str("AFR".into()));
        assert_eq!(item.field("CS").unwrap().unit, Unit::None);
    }
}
