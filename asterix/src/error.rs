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

use std::error;
use std::fmt;

/// Errors raised while decoding ASTERIX data.
///
/// Errors are captured at the lowest scope that can still resynchronize: a
/// field error invalidates the field only, an item error invalidates the item
/// while the cursor skips to the item's declared end, and so on up to the
/// block. The public decoding API therefore never returns these directly;
/// they end up as error messages on the affected part of the decoded tree.
#[derive(Clone, PartialEq, Debug)]
pub enum Error {
    /// The cursor ran past the end of the input.
    Truncated { expected: usize, available: usize },
    /// The input disagrees with the loaded category definition.
    SchemaMismatch { reason: String },
    /// A field cannot be decoded as declared.
    TypeError { reason: String },
    /// An extension condition uses an unsupported operator or operand type.
    ConditionUnsupported { condition: String },
    /// A validation rule failed in strict mode.
    ValidationFailed { reason: String },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Truncated {
                expected,
                available,
            } => {
                write!(f, "need {expected} bytes but only {available} available")
            }
            Self::SchemaMismatch { reason } => write!(f, "schema mismatch: {reason}"),
            Self::TypeError { reason } => write!(f, "type error: {reason}"),
            Self::ConditionUnsupported { condition } => {
                write!(f, "unsupported condition: {condition:?}")
            }
            Self::ValidationFailed { reason } => write!(f, "validation failed: {reason}"),
        }
    }
}

impl error::Error for Error {}
