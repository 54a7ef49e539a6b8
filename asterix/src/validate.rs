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

//! Rule-based validation of decoded records and blocks.
//!
//! The rules come from the category definition. In lenient mode every
//! finding is logged as a warning and validation still passes; strict mode
//! turns findings into failures. Conditional rules are accepted but their
//! predicates are not evaluated in this version.

use log::{debug, warn};

use crate::record::{Block, Record};
use crate::schema::{Category, RuleKind};
use crate::Error;

/// Checks one record against its category's validation rules.
///
/// A record that failed to decode never validates.
pub fn validate_record(record: &Record, category: &Category, strict: bool) -> bool {
    let mut ok = record.valid;

    for rule in &category.rules {
        match rule.kind {
            RuleKind::Mandatory => {
                if record.item(&rule.field).is_none() {
                    let failure = Error::ValidationFailed {
                        reason: format!(
                            "record is missing mandatory item {} of CAT{:03}",
                            rule.field,
                            category.number()
                        ),
                    };
                    warn!("{failure}");
                    if strict {
                        ok = false;
                    }
                }
            }
            RuleKind::Conditional => {
                if let Some(condition) = &rule.condition {
                    debug!(
                        "conditional rule on {} not evaluated ({condition:?})",
                        rule.field
                    );
                }
            }
            RuleKind::Optional => {}
        }
    }

    ok
}

/// Checks every record of a block, plus the block-length consistency: the
/// record lengths and the 3 byte header must add up to the declared length.
pub fn validate_block(block: &Block, category: &Category, strict: bool) -> bool {
    let mut ok = block.valid;

    for record in &block.records {
        if !validate_record(record, category, strict) {
            ok = false;
        }
    }

    let calculated: usize = 3 + block.records.iter().map(|r| r.length).sum::<usize>();
    if calculated != block.length as usize {
        let failure = Error::ValidationFailed {
            reason: format!(
                "block length mismatch: declared={}, calculated={calculated}",
                block.length
            ),
        };
        warn!("{failure}");
        if strict {
            ok = false;
        }
    }

    ok
}
