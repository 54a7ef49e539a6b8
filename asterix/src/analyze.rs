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

//! Post-decode statistics over decoded blocks.

use std::collections::HashMap;
use std::fmt;

use crate::record::Block;

/// Record statistics for one or more decoded blocks.
///
/// Produced by [`analyze_block`]; stats of several blocks can be folded
/// together with [`merge`](Self::merge).
#[derive(Clone, PartialEq, Debug, Default)]
pub struct BlockStats {
    pub total_records: usize,
    pub valid_records: usize,
    pub invalid_records: usize,
    /// Shortest record in bytes; 0 when there are no records.
    pub min_length: usize,
    /// Longest record in bytes; 0 when there are no records.
    pub max_length: usize,
    /// Sum of all record lengths in bytes.
    pub total_length: usize,
    /// How often each data item occurred across all records.
    pub item_frequency: HashMap<String, usize>,
}

impl BlockStats {
    /// Mean record length in bytes; 0 when there are no records.
    pub fn mean_length(&self) -> f64 {
        if self.total_records == 0 {
            0.0
        } else {
            self.total_length as f64 / self.total_records as f64
        }
    }

    /// Folds another set of statistics into this one.
    pub fn merge(&mut self, other: &BlockStats) {
        if other.total_records == 0 {
            return;
        }
        if self.total_records == 0 {
            self.min_length = other.min_length;
            self.max_length = other.max_length;
        } else {
            self.min_length = self.min_length.min(other.min_length);
            self.max_length = self.max_length.max(other.max_length);
        }
        self.total_records += other.total_records;
        self.valid_records += other.valid_records;
        self.invalid_records += other.invalid_records;
        self.total_length += other.total_length;
        for (id, count) in &other.item_frequency {
            *self.item_frequency.entry(id.clone()).or_default() += count;
        }
    }
}

/// Computes record statistics for a decoded block. The block is not
/// modified.
pub fn analyze_block(block: &Block) -> BlockStats {
    let mut stats = BlockStats::default();

    for record in &block.records {
        stats.total_records += 1;
        if record.valid {
            stats.valid_records += 1;
        } else {
            stats.invalid_records += 1;
        }

        if stats.total_records == 1 {
            stats.min_length = record.length;
            stats.max_length = record.length;
        } else {
            stats.min_length = stats.min_length.min(record.length);
            stats.max_length = stats.max_length.max(record.length);
        }
        stats.total_length += record.length;

        for item in &record.items {
            *stats.item_frequency.entry(item.id.clone()).or_default() += 1;
        }
    }

    stats
}

impl fmt::Display for BlockStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "records: {} total, {} valid, {} invalid",
            self.total_records, self.valid_records, self.invalid_records)?;
        writeln!(
            f,
            "record length: min {} / max {} / mean {:.1} bytes",
            self.min_length,
            self.max_length,
            self.mean_length()
        )?;

        // most frequent items first, ties by identifier
        let mut items: Vec<(&String, &usize)> = self.item_frequency.iter().collect();
        items.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
        for (id, count) in items {
            writeln!(f, "  {id:<12} {count}")?;
        }
        Ok(())
    }
}
