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

//! Typed values decoded from bit fields.

use std::fmt;

use log::warn;

use crate::schema::{FieldDef, FieldType};
use crate::Error;

/// The 6-bit ICAO alphabet: 0 is space, 1..=26 are A..Z, 32..=41 are 0..9,
/// everything else maps to space. Codes 48..=63 are not assigned.
const ICAO_ALPHABET: &[u8; 48] = b" ABCDEFGHIJKLMNOPQRSTUVWXYZ     0123456789      ";

/// A decoded field value.
///
/// Unsigned extractions land in the smallest containing unsigned type;
/// signed extractions keep the width they were declared with (24 bit values
/// are carried as `i32`). Strings and byte runs own their data, so decoded
/// trees never reference the input buffer.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum FieldValue {
    U8(u8),
    U16(u16),
    U32(u32),
    I8(i8),
    I16(i16),
    I32(i32),
    Bool(bool),
    Str(String),
    Bytes(Vec<u8>),
}

impl FieldValue {
    /// Converts a raw extraction to the declared scalar kind.
    ///
    /// `window` is the byte run backing the field and is only consulted for
    /// string and byte kinds; scalar kinds convert `raw` alone.
    pub(crate) fn convert(raw: u32, window: &[u8], def: &FieldDef) -> Result<Self, Error> {
        match def.kind {
            FieldType::Unsigned => Ok(match def.bits {
                ..=8 => Self::U8(raw as u8),
                9..=16 => Self::U16(raw as u16),
                _ => Self::U32(raw),
            }),
            FieldType::Signed => sign_extend(raw, def.bits),
            FieldType::Bool => Ok(Self::Bool(raw != 0)),
            FieldType::Str => match def.encoding.as_deref() {
                Some("6bit_ascii") => Ok(Self::Str(decode_6bit_ascii(window))),
                Some(other) => {
                    warn!("unknown string encoding {other:?} on field {}", def.name);
                    Ok(Self::Str(raw.to_string()))
                }
                None => Ok(Self::Str(raw.to_string())),
            },
            FieldType::Bytes => Ok(Self::Bytes(window.to_vec())),
        }
    }

    /// Returns the value as a float, if it is numeric or boolean.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Self::U8(v) => Some(v.into()),
            Self::U16(v) => Some(v.into()),
            Self::U32(v) => Some(v.into()),
            Self::I8(v) => Some(v.into()),
            Self::I16(v) => Some(v.into()),
            Self::I32(v) => Some(v.into()),
            Self::Bool(_) | Self::Str(_) | Self::Bytes(_) => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::U8(v) => write!(f, "{v}"),
            Self::U16(v) => write!(f, "{v}"),
            Self::U32(v) => write!(f, "{v}"),
            Self::I8(v) => write!(f, "{v}"),
            Self::I16(v) => write!(f, "{v}"),
            Self::I32(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Str(v) => write!(f, "{v}"),
            Self::Bytes(v) => {
                for byte in v {
                    write!(f, "{byte:02x}")?;
                }
                Ok(())
            }
        }
    }
}

/// Two's-complement sign extension for the supported signed widths.
fn sign_extend(raw: u32, bits: u8) -> Result<FieldValue, Error> {
    match bits {
        8 => Ok(FieldValue::I8(raw as u8 as i8)),
        16 => Ok(FieldValue::I16(raw as u16 as i16)),
        24 => Ok(FieldValue::I32(((raw << 8) as i32) >> 8)),
        32 => Ok(FieldValue::I32(raw as i32)),
        other => Err(Error::TypeError {
            reason: format!("signed fields must be 8, 16, 24 or 32 bits wide, not {other}"),
        }),
    }
}

/// Decodes a byte run as successive 6-bit ICAO alphabet characters.
///
/// Leading spaces are suppressed while the output is still empty, trailing
/// spaces are trimmed, and unassigned codes are skipped.
pub(crate) fn decode_6bit_ascii(data: &[u8]) -> String {
    let mut out = String::new();
    let total_bits = data.len() * 8;

    let mut bit_pos = 0;
    while bit_pos + 6 <= total_bits {
        let mut code = 0usize;
        for i in 0..6 {
            let bit = bit_pos + i;
            code <<= 1;
            if data[bit / 8] & (0x80 >> (bit % 8)) != 0 {
                code |= 1;
            }
        }
        bit_pos += 6;

        if let Some(&c) = ICAO_ALPHABET.get(code) {
            if c != b' ' || !out.is_empty() {
                out.push(c as char);
            }
        }
    }

    while out.ends_with(' ') {
        out.pop();
    }
    out
}
