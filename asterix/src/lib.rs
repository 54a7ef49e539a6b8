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

//! ASTERIX surveillance data decoder.
//!
//! ASTERIX is the binary format family used to exchange air-traffic
//! surveillance data. Each category of the family has its own catalog of
//! data items and a User Application Profile (UAP) mapping the presence
//! bits of a record's FSPEC to those items. This crate decodes data blocks
//! into structured, owned trees of [`Block`], [`Record`], [`DataItem`] and
//! [`Field`] values, driven by [`schema`] definitions that an external
//! loader provides; see the `catdef` crate for the XML loader.
//!
//! Decoding never panics and never fails out-of-band: corrupt input turns
//! into invalid parts of the returned tree, each carrying an error message,
//! while their siblings keep decoding.
//!
//! # Examples
//!
//! Decode a CAT002 block against a hand-built registry:
//!
//! ```
//! use asterix::schema::{
//!     Category, CategoryHeader, DataItemDef, FieldDef, FieldType, Format, Registry, Uap,
//! };
//! use asterix::{Decoder, FieldValue};
//!
//! let mut category = Category::new(
//!     CategoryHeader {
//!         number: 2,
//!         name: "Transmission of Monoradar Service Messages".into(),
//!         version: "1.0".into(),
//!     },
//!     Uap::new(vec!["I002/010".into(), "I002/000".into()]),
//! );
//! category.insert_item(DataItemDef {
//!     id: "I002/010".into(),
//!     name: "Data Source Identifier".into(),
//!     format: Format::Fixed,
//!     length: Some(2),
//!     fields: vec![
//!         FieldDef::new("SAC", FieldType::Unsigned, 8),
//!         FieldDef::new("SIC", FieldType::Unsigned, 8),
//!     ],
//! });
//! category.insert_item(DataItemDef {
//!     id: "I002/000".into(),
//!     name: "Message Type".into(),
//!     format: Format::Fixed,
//!     length: Some(1),
//!     fields: vec![FieldDef::new("MessageType", FieldType::Unsigned, 8)],
//! });
//!
//! let mut registry = Registry::new();
//! registry.insert(category);
//!
//! // CAT002 block: header (category 2, 7 bytes total), then one record
//! // whose FSPEC 0xC0 selects both items.
//! let decoder = Decoder::new(&registry);
//! let block = decoder.decode_block(&[0x02, 0x00, 0x07, 0xC0, 0x00, 0x10, 0x01]);
//!
//! assert!(block.valid);
//! let record = &block.records[0];
//! assert_eq!(record.length, 4);
//!
//! let sic = record.item("I002/010").unwrap().field("SIC").unwrap();
//! assert_eq!(sic.value, FieldValue::U8(0x10));
//! ```

mod analyze;
mod cursor;
mod decoder;
mod error;
mod fspec;
mod item;
mod record;
mod validate;
mod value;

pub mod schema;

pub use analyze::{analyze_block, BlockStats};
pub use cursor::{extract_bits, Cursor};
pub use decoder::Decoder;
pub use error::Error;
pub use record::{Block, DataItem, Field, Record};
pub use validate::{validate_block, validate_record};
pub use value::FieldValue;
