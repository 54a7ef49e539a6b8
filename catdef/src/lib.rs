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

//! Loader for ASTERIX category definition XML files.
//!
//! The `asterix` crate decodes binary data against an in-memory
//! [`Registry`] of category definitions; this crate builds that registry
//! from the XML definition dialect, one file per category. Load a whole
//! directory of definitions with [`load_dir`], a single file with
//! [`load_file`], or parse from a string with [`parse_category`].

use std::fs;
use std::path::Path;

use log::{debug, warn};

use asterix::schema::Registry;

mod error;
mod parser;

pub use error::Error;
pub use parser::parse_category;

/// Loads one category definition from an XML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or does not parse as a
/// category definition.
pub fn load_file(path: impl AsRef<Path>) -> Result<asterix::schema::Category, Error> {
    let xml = fs::read_to_string(path)?;
    parse_category(&xml)
}

/// Loads every `.xml` category definition in a directory into a registry.
///
/// Files that fail to parse are skipped with a warning, so one bad
/// definition does not take down the rest of the set.
///
/// # Errors
///
/// Returns an error if the directory cannot be read or contains no usable
/// definitions at all.
pub fn load_dir(path: impl AsRef<Path>) -> Result<Registry, Error> {
    let path = path.as_ref();
    let mut registry = Registry::new();

    for entry in fs::read_dir(path)? {
        let file = entry?.path();
        if file.extension().and_then(|e| e.to_str()) != Some("xml") {
            continue;
        }
        match load_file(&file) {
            Ok(category) => {
                debug!("loaded CAT{:03} from {}", category.number(), file.display());
                if let Some(replaced) = registry.insert(category) {
                    warn!(
                        "{} replaces an earlier definition of CAT{:03}",
                        file.display(),
                        replaced.number()
                    );
                }
            }
            Err(e) => warn!("skipping {}: {e}", file.display()),
        }
    }

    if registry.is_empty() {
        return Err(Error::NoDefinitions {
            dir: path.display().to_string(),
        });
    }
    Ok(registry)
}
