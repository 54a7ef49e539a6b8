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

//! The decoded tree: blocks, records, data items and fields.
//!
//! Decoded trees own all their data, so the input buffer can be dropped as
//! soon as a decode call returns. Invalid parts carry a human-readable error
//! message; their siblings stay usable.

use crate::schema::Unit;
use crate::value::FieldValue;

/// One decoded field of a data item.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Field {
    pub name: String,
    /// The raw typed value. LSB scaling is never applied to it; use
    /// [`scaled`](Self::scaled) for the physical quantity.
    pub value: FieldValue,
    pub unit: Unit,
    /// LSB multiplier carried over from the field definition.
    pub lsb: f64,
    pub description: Option<String>,
    pub valid: bool,
    pub error: Option<String>,
}

impl Field {
    /// Returns `raw × lsb` for numeric values.
    pub fn scaled(&self) -> Option<f64> {
        self.value.as_f64().map(|v| v * self.lsb)
    }
}

/// One decoded data item.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DataItem {
    pub id: String,
    pub name: String,
    pub fields: Vec<Field>,
    pub valid: bool,
    pub error: Option<String>,
}

impl DataItem {
    /// Returns the first field with the given name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// One decoded record: the data items selected by its FSPEC.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Record {
    pub category: u8,
    /// Exact number of input bytes the record consumed (FSPEC plus items).
    pub length: usize,
    pub items: Vec<DataItem>,
    pub valid: bool,
    pub error: Option<String>,
}

impl Record {
    /// Returns the first data item with the given identifier.
    pub fn item(&self, id: &str) -> Option<&DataItem> {
        self.items.iter().find(|i| i.id == id)
    }
}

/// One decoded data block.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Block {
    pub category: u8,
    /// Block length as declared on the wire, including the 3 byte header.
    pub length: u16,
    pub records: Vec<Record>,
    /// `true` once the header parsed and at least one record decoded.
    pub valid: bool,
}
