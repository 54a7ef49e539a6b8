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

//! Top-level block and record decoding.
//!
//! A data block is a 3 byte header (category, big-endian length including
//! the header) followed by payload. CAT002 blocks carry a sequence of
//! records; every other category carries a single record. Each record is an
//! FSPEC followed by the data items whose presence bits are set.
//!
//! Decoding is a single forward pass with no out-of-band failures: whatever
//! goes wrong is recorded on the affected part of the returned tree, as
//! deep down as the input still allows resynchronization.

use log::{debug, warn};

use crate::cursor::Cursor;
use crate::fspec::read_fspec;
use crate::item::parse_data_item;
use crate::record::{Block, DataItem, Record};
use crate::schema::{Category, Registry};
use crate::{analyze, validate, BlockStats, Error};

/// Ceiling on records per block. Like the FSPEC byte ceiling this is a
/// defensive bound against corrupt input, not an ASTERIX limit.
const MAX_RECORDS_PER_BLOCK: usize = 1000;

/// An ASTERIX decoder borrowing a category [`Registry`].
///
/// The decoder carries only configuration; it keeps no state between calls,
/// so one instance can decode any number of independent buffers, also from
/// several threads at once.
///
/// # Examples
///
/// ```
/// use asterix::schema::{Category, CategoryHeader, DataItemDef, FieldDef, FieldType, Format, Registry, Uap};
/// use asterix::{Decoder, FieldValue};
///
/// let mut category = Category::new(
///     CategoryHeader {
///         number: 2,
///         name: "Monoradar Service Messages".into(),
///         version: "1.0".into(),
///     },
///     Uap::new(vec!["I002/010".into()]),
/// );
/// category.insert_item(DataItemDef {
///     id: "I002/010".into(),
///     name: "Data Source Identifier".into(),
///     format: Format::Fixed,
///     length: Some(2),
///     fields: vec![
///         FieldDef::new("SAC", FieldType::Unsigned, 8),
///         FieldDef::new("SIC", FieldType::Unsigned, 8),
///     ],
/// });
///
/// let mut registry = Registry::new();
/// registry.insert(category);
///
/// let decoder = Decoder::new(&registry);
/// let block = decoder.decode_block(&[0x02, 0x00, 0x06, 0x80, 0x19, 0x2A]);
///
/// assert!(block.valid);
/// let record = &block.records[0];
/// let sic = record.item("I002/010").unwrap().field("SIC").unwrap();
/// assert_eq!(sic.value, FieldValue::U8(0x2A));
/// ```
#[derive(Clone, Debug)]
pub struct Decoder<'a> {
    registry: &'a Registry,
    strict: bool,
    debug: bool,
}

impl<'a> Decoder<'a> {
    pub fn new(registry: &'a Registry) -> Self {
        Self {
            registry,
            strict: false,
            debug: false,
        }
    }

    /// In strict mode validation warnings become failures and a failed
    /// record stops its block.
    pub fn set_strict(&mut self, strict: bool) {
        self.strict = strict;
    }

    /// Enables per-record debug logging. Decoding behaves the same either
    /// way.
    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
    }

    /// Returns the registered category numbers in ascending order.
    pub fn supported_categories(&self) -> Vec<u8> {
        self.registry.supported_categories()
    }

    /// Returns the definition of a category, if registered.
    pub fn get_category(&self, number: u8) -> Option<&'a Category> {
        self.registry.get(number)
    }

    /// Decodes one data block.
    ///
    /// The returned block is marked invalid if the header is unreadable,
    /// the category is unknown, or no record decoded successfully; it still
    /// carries whatever records were recovered.
    pub fn decode_block(&self, data: &[u8]) -> Block {
        let mut block = Block {
            category: 0,
            length: 0,
            records: Vec::new(),
            valid: false,
        };

        let mut cursor = Cursor::new(data);
        match cursor.read_u8() {
            Ok(category) => block.category = category,
            Err(e) => {
                warn!("unreadable block header: {e}");
                return block;
            }
        }
        match cursor.read_u16_be() {
            Ok(length) => block.length = length,
            Err(e) => {
                warn!("unreadable block header: {e}");
                return block;
            }
        }

        let Some(category) = self.registry.get(block.category) else {
            warn!("unsupported category: {}", block.category);
            return block;
        };

        if self.debug {
            debug!(
                "decoding block: category={} length={}",
                block.category, block.length
            );
        }

        let declared = block.length as usize;
        if declared > data.len() {
            warn!(
                "block declares {declared} bytes but only {} were supplied",
                data.len()
            );
        }
        // Lenient resynchronization must not run past the supplied input:
        // beyond it there is nothing left to read, only empty truncation
        // records to fabricate.
        let end = declared.min(data.len());

        if block.category == 2 {
            self.decode_multi_record(&mut cursor, category, end, &mut block);
        } else {
            self.decode_single_record(&mut cursor, category, end, &mut block);
        }

        block.valid = block.records.iter().any(|r| r.valid);
        block
    }

    /// Decodes a lone record of the given category, without block framing.
    pub fn decode_message(&self, category: u8, data: &[u8]) -> Record {
        let Some(definition) = self.registry.get(category) else {
            return Record {
                category,
                length: 0,
                items: Vec::new(),
                valid: false,
                error: Some(format!("unsupported category: {category}")),
            };
        };
        self.decode_record(&mut Cursor::new(data), definition)
    }

    /// Splits a capture into blocks along the declared block lengths and
    /// decodes each one.
    ///
    /// Trailing bytes that do not amount to a whole block are reported with
    /// a warning and left undecoded.
    pub fn decode_stream(&self, data: &[u8]) -> Vec<Block> {
        let mut blocks = Vec::new();
        let mut offset = 0;

        while offset < data.len() {
            if offset + 3 > data.len() {
                warn!(
                    "{} trailing bytes are too short for a block header",
                    data.len() - offset
                );
                break;
            }
            let length = u16::from_be_bytes([data[offset + 1], data[offset + 2]]) as usize;
            if length < 3 {
                warn!("block at offset {offset} declares length {length}, below its own header");
                break;
            }
            if offset + length > data.len() {
                warn!(
                    "block at offset {offset} declares {length} bytes but only {} remain",
                    data.len() - offset
                );
                break;
            }

            blocks.push(self.decode_block(&data[offset..offset + length]));
            offset += length;
        }

        blocks
    }

    /// Checks a record against its category's validation rules.
    pub fn validate(&self, record: &Record) -> bool {
        match self.registry.get(record.category) {
            Some(category) => validate::validate_record(record, category, self.strict),
            None => false,
        }
    }

    /// Checks every record of a block and the block-length consistency.
    pub fn validate_block(&self, block: &Block) -> bool {
        match self.registry.get(block.category) {
            Some(category) => validate::validate_block(block, category, self.strict),
            None => false,
        }
    }

    /// Computes record statistics for a decoded block.
    pub fn analyze(&self, block: &Block) -> BlockStats {
        analyze::analyze_block(block)
    }

    /// CAT002 payloads hold a sequence of records; decode until the block
    /// range is exhausted.
    fn decode_multi_record(
        &self,
        cursor: &mut Cursor,
        category: &Category,
        end: usize,
        block: &mut Block,
    ) {
        let mut count = 0;
        while cursor.position() < end {
            count += 1;
            if count > MAX_RECORDS_PER_BLOCK {
                warn!("record ceiling of {MAX_RECORDS_PER_BLOCK} reached, stopping block");
                break;
            }
            if self.debug {
                debug!("decoding record #{count} at offset {}", cursor.position());
            }

            let record = self.decode_record(cursor, category);
            let failed = !record.valid;
            block.records.push(record);

            if failed {
                if self.strict {
                    break;
                }
                // lenient mode: slide one byte and look for the next record
                if cursor.skip(1).is_err() {
                    break;
                }
            }
        }
    }

    /// All other categories: one record per block, trailing bytes ignored.
    fn decode_single_record(
        &self,
        cursor: &mut Cursor,
        category: &Category,
        end: usize,
        block: &mut Block,
    ) {
        let record = self.decode_record(cursor, category);
        block.records.push(record);

        if cursor.position() < end {
            warn!(
                "{} trailing bytes after the record are ignored",
                end - cursor.position()
            );
        }
    }

    /// Decodes one record at the cursor. The record's `length` is always
    /// the exact number of bytes consumed, including for failed records.
    fn decode_record(&self, cursor: &mut Cursor, category: &Category) -> Record {
        let start = cursor.position();
        let mut record = Record {
            category: category.number(),
            length: 0,
            items: Vec::new(),
            valid: true,
            error: None,
        };

        if let Err(e) = self.decode_record_items(cursor, category, &mut record) {
            record.valid = false;
            record.error = Some(e.to_string());
        }
        record.length = cursor.position() - start;
        record
    }

    fn decode_record_items(
        &self,
        cursor: &mut Cursor,
        category: &Category,
        record: &mut Record,
    ) -> Result<(), Error> {
        let fspec = read_fspec(cursor, &category.uap)?;
        if self.debug {
            debug!(
                "record FSPEC: {} bytes, {} items present",
                fspec.bytes,
                fspec.items.len()
            );
        }

        for id in fspec.items {
            let Some(item_def) = category.item(id) else {
                warn!("UAP references unknown data item {id}");
                record.items.push(DataItem {
                    id: id.to_string(),
                    name: String::new(),
                    fields: Vec::new(),
                    valid: false,
                    error: Some(
                        Error::SchemaMismatch {
                            reason: format!("no definition for data item {id}"),
                        }
                        .to_string(),
                    ),
                });
                continue;
            };
            record.items.push(parse_data_item(item_def, cursor)?);
        }
        Ok(())
    }
}
