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

//! Field Specification (FSPEC) decoding.
//!
//! Each record starts with a variable-length presence bitmap. Bits 7..1 of
//! every FSPEC byte flag the next seven UAP slots in order; bit 0 is the FX
//! flag and announces another FSPEC byte. The UAP slot for bit position `p`
//! of the 0-indexed byte `b` is `7 * b + (7 - p)`. The FX bit never maps to
//! a slot, so the slot index advances by seven per byte whether or not FX is
//! set.

use crate::cursor::Cursor;
use crate::schema::Uap;
use crate::Error;

/// Ceiling on FSPEC bytes per record. Not part of the ASTERIX standard; a
/// defensive bound against corrupt input keeping the FX chain alive.
const MAX_FSPEC_BYTES: usize = 16;

/// A decoded FSPEC.
#[derive(Clone, PartialEq, Debug)]
pub(crate) struct Fspec<'u> {
    /// Number of FSPEC bytes consumed.
    pub bytes: usize,
    /// Identifiers of the present data items, in UAP order. Slots named
    /// `"spare"` or left empty are dropped; presence bits beyond the end of
    /// the UAP are ignored.
    pub items: Vec<&'u str>,
}

/// Reads the FSPEC at the cursor and resolves it against the UAP.
pub(crate) fn read_fspec<'u>(cursor: &mut Cursor, uap: &'u Uap) -> Result<Fspec<'u>, Error> {
    let mut items = Vec::new();
    let mut bytes = 0;

    loop {
        let byte = cursor.read_u8()?;
        for p in (1..=7u8).rev() {
            if byte & (1 << p) == 0 {
                continue;
            }
            let slot = 7 * bytes + (7 - p as usize);
            match uap.slot(slot) {
                Some("") | Some("spare") | None => {}
                Some(id) => items.push(id),
            }
        }
        bytes += 1;

        if byte & 0x01 == 0 {
            break;
        }
        if bytes == MAX_FSPEC_BYTES {
            return Err(Error::SchemaMismatch {
                reason: format!("FSPEC continues past {MAX_FSPEC_BYTES} bytes"),
            });
        }
    }

    Ok(Fspec { bytes, items })
}
