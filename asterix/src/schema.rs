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

//! In-memory model of an ASTERIX category definition.
//!
//! A [`Category`] describes one ASTERIX category: its [`CategoryHeader`], the
//! [`Uap`] mapping FSPEC presence bits to data-item identifiers, the
//! data-item catalog, and the validation rules. The decoder only reads this
//! model; it is built by an external loader (see the `catdef` crate) and must
//! not change while decoding is in progress. Since all types own their data
//! and the decoder takes shared references, immutability falls out of the
//! borrow rules.

use std::collections::HashMap;
use std::fmt;

/// Identifying information of a category definition.
#[derive(Clone, PartialEq, Debug)]
pub struct CategoryHeader {
    /// Category number as it appears in the block header.
    pub number: u8,
    pub name: String,
    pub version: String,
}

/// User Application Profile: the ordered list of data-item identifiers
/// addressed by FSPEC presence bits.
///
/// Slot *i* corresponds to presence bit *i* counted across FSPEC bytes,
/// seven slots per byte. Slots named `"spare"` (or left empty) reserve a
/// presence bit that carries no data item.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct Uap {
    slots: Vec<String>,
}

impl Uap {
    pub fn new(slots: Vec<String>) -> Self {
        Self { slots }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Returns the item identifier at `slot`, if the UAP extends that far.
    pub fn slot(&self, slot: usize) -> Option<&str> {
        self.slots.get(slot).map(String::as_str)
    }
}

/// Wire format of a data item.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Format {
    /// A fixed number of bytes, given by the item's declared length.
    Fixed,
    /// One or more bytes, each with bit 0 as an FX continuation flag.
    Variable,
    /// A leading length byte that counts itself, then payload.
    Explicit,
    /// A leading repetition count, then that many fixed-length groups.
    Repetitive,
}

/// Primitive kind of a field. The bit width lives on [`FieldDef`].
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FieldType {
    Unsigned,
    Signed,
    Bool,
    Str,
    Bytes,
}

/// Unit of measurement attached to a field.
///
/// Units are semantic labels only; numeric scaling is applied solely through
/// the field's LSB multiplier.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Unit {
    #[default]
    None,
    Seconds,
    NauticalMiles,
    Degrees,
    FlightLevel,
    Feet,
    Knots,
    MetresPerSecond,
}

impl Unit {
    /// Returns the symbol used in category definitions and reports.
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::None => "",
            Self::Seconds => "s",
            Self::NauticalMiles => "NM",
            Self::Degrees => "degrees",
            Self::FlightLevel => "FL",
            Self::Feet => "ft",
            Self::Knots => "kts",
            Self::MetresPerSecond => "m/s",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Declaration of one field within a data item.
#[derive(Clone, PartialEq, Debug)]
pub struct FieldDef {
    /// Field name; the literal name `"spare"` reserves bits without output.
    pub name: String,
    pub kind: FieldType,
    /// Width in bits, 1..=32 for scalar kinds.
    pub bits: u8,
    /// LSB multiplier converting the raw integer to a physical quantity.
    /// Kept as metadata on decoded fields; never applied to stored values.
    pub lsb: f64,
    pub unit: Unit,
    pub description: Option<String>,
    /// Encoding hint for string fields (`"6bit_ascii"`).
    pub encoding: Option<String>,
    /// Equality condition (`"FX == 1"`) gating the extension fields.
    pub condition: Option<String>,
    /// Fields decoded right after this one when the condition holds.
    pub extension: Vec<FieldDef>,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, kind: FieldType, bits: u8) -> Self {
        Self {
            name: name.into(),
            kind,
            bits,
            lsb: 1.0,
            unit: Unit::None,
            description: None,
            encoding: None,
            condition: None,
            extension: Vec::new(),
        }
    }

    /// A reserved run of bits that produces no decoded field.
    pub fn spare(bits: u8) -> Self {
        Self::new("spare", FieldType::Unsigned, bits)
    }

    pub fn with_lsb(mut self, lsb: f64) -> Self {
        self.lsb = lsb;
        self
    }

    pub fn with_unit(mut self, unit: Unit) -> Self {
        self.unit = unit;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = Some(encoding.into());
        self
    }

    pub fn with_extension(mut self, condition: impl Into<String>, fields: Vec<FieldDef>) -> Self {
        self.condition = Some(condition.into());
        self.extension = fields;
        self
    }

    pub fn is_spare(&self) -> bool {
        self.name == "spare"
    }
}

/// Declaration of one data item of a category.
#[derive(Clone, PartialEq, Debug)]
pub struct DataItemDef {
    /// Identifier as referenced by the UAP, e.g. `"I002/010"`.
    pub id: String,
    pub name: String,
    pub format: Format,
    /// Byte length; required for [`Format::Fixed`] (total bytes) and
    /// [`Format::Repetitive`] (bytes per repetition).
    pub length: Option<u16>,
    pub fields: Vec<FieldDef>,
}

/// How a validation rule applies to its target item.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum RuleKind {
    /// The item must be present in every record.
    Mandatory,
    /// Presence depends on a predicate; accepted but not evaluated.
    Conditional,
    /// The item may be absent.
    Optional,
}

/// A per-item validation rule from the category definition.
#[derive(Clone, PartialEq, Debug)]
pub struct ValidationRule {
    /// Identifier of the data item the rule applies to.
    pub field: String,
    pub kind: RuleKind,
    pub condition: Option<String>,
}

/// A complete category definition.
#[derive(Clone, PartialEq, Debug)]
pub struct Category {
    pub header: CategoryHeader,
    pub uap: Uap,
    pub rules: Vec<ValidationRule>,
    items: HashMap<String, DataItemDef>,
}

impl Category {
    pub fn new(header: CategoryHeader, uap: Uap) -> Self {
        Self {
            header,
            uap,
            rules: Vec::new(),
            items: HashMap::new(),
        }
    }

    /// Returns the category number from the header.
    pub fn number(&self) -> u8 {
        self.header.number
    }

    /// Adds a data item to the catalog, replacing any previous definition
    /// with the same identifier.
    pub fn insert_item(&mut self, item: DataItemDef) {
        self.items.insert(item.id.clone(), item);
    }

    /// Looks up a data item by identifier.
    pub fn item(&self, id: &str) -> Option<&DataItemDef> {
        self.items.get(id)
    }

    /// Iterates over the data-item catalog in no particular order.
    pub fn items(&self) -> impl Iterator<Item = &DataItemDef> {
        self.items.values()
    }
}

/// The set of category definitions available to a decoder.
///
/// A registry is built once by a loader and then shared immutably; decoders
/// borrow it for their whole lifetime, so it can back any number of decoders
/// across threads.
#[derive(Clone, Debug, Default)]
pub struct Registry {
    categories: HashMap<u8, Category>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a category, replacing any previous definition for the same
    /// number. Returns the replaced definition.
    pub fn insert(&mut self, category: Category) -> Option<Category> {
        self.categories.insert(category.number(), category)
    }

    /// Looks up a category by number.
    pub fn get(&self, number: u8) -> Option<&Category> {
        self.categories.get(&number)
    }

    /// Returns the registered category numbers in ascending order.
    pub fn supported_categories(&self) -> Vec<u8> {
        let mut numbers: Vec<u8> = self.categories.keys().copied().collect();
        numbers.sort_unstable();
        numbers
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}
