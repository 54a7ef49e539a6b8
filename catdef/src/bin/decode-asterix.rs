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

//! Decode an ASTERIX capture file against a directory of XML category
//! definitions and print the decoded records, either as text or JSON,
//! followed by aggregate record statistics.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::LevelFilter;

use asterix::{analyze_block, Block, BlockStats, Decoder, Field};

/// Forwards decoder diagnostics from the log facade to stderr.
struct StderrLogger;

impl log::Log for StderrLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if self.enabled(record.metadata()) {
            eprintln!("[{}] {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;

#[derive(Parser)]
#[command(
    name = "decode-asterix",
    version,
    about = "Decode ASTERIX surveillance data captures"
)]
struct Cli {
    /// ASTERIX capture file
    file: PathBuf,

    /// Directory containing category definition XML files
    #[arg(
        short = 'd',
        long = "definitions",
        default_value = "data/asterix_categories"
    )]
    definitions: PathBuf,

    /// Print decoded blocks as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Promote validation warnings to failures and stop blocks at the
    /// first bad record
    #[arg(long)]
    strict: bool,

    /// Emit per-record decoder diagnostics on the log facade
    #[arg(long)]
    debug: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(if cli.debug {
            LevelFilter::Debug
        } else {
            LevelFilter::Warn
        });
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let registry = catdef::load_dir(&cli.definitions)?;
    let categories: Vec<String> = registry
        .supported_categories()
        .iter()
        .map(|n| n.to_string())
        .collect();
    println!("supported categories: {}", categories.join(", "));

    let mut decoder = Decoder::new(&registry);
    decoder.set_strict(cli.strict);
    decoder.set_debug(cli.debug);

    let data = fs::read(&cli.file)?;
    let blocks = decoder.decode_stream(&data);
    if blocks.is_empty() {
        return Err(format!("no blocks decoded from {}", cli.file.display()).into());
    }

    for (index, block) in blocks.iter().enumerate() {
        if cli.json {
            println!("{}", serde_json::to_string_pretty(block)?);
        } else {
            print_block(index, block);
        }
    }

    let mut stats = BlockStats::default();
    for block in &blocks {
        stats.merge(&analyze_block(block));
    }
    let valid_blocks = blocks.iter().filter(|b| decoder.validate_block(b)).count();

    println!("=== record statistics ===");
    println!("blocks: {} decoded, {} valid", blocks.len(), valid_blocks);
    print!("{stats}");

    Ok(())
}

fn print_block(index: usize, block: &Block) {
    println!(
        "=== block #{index} (CAT{:03}, {} bytes declared, {} records{}) ===",
        block.category,
        block.length,
        block.records.len(),
        if block.valid { "" } else { ", INVALID" },
    );

    for record in &block.records {
        if !record.valid {
            let error = record.error.as_deref().unwrap_or("unknown error");
            println!("  record ({} bytes): INVALID: {error}", record.length);
            continue;
        }
        println!("  record ({} bytes)", record.length);
        for item in &record.items {
            if !item.valid {
                let error = item.error.as_deref().unwrap_or("unknown error");
                println!("    [{}] {}: ERROR: {error}", item.id, item.name);
                continue;
            }
            println!("    [{}] {}", item.id, item.name);
            for field in &item.fields {
                println!("      {}", format_field(field));
            }
        }
    }
}

fn format_field(field: &Field) -> String {
    if !field.valid {
        let error = field.error.as_deref().unwrap_or("unknown error");
        return format!("{}: ERROR: {error}", field.name);
    }

    let mut out = match (field.lsb != 1.0, field.scaled()) {
        // scaled physical quantity, raw value in parentheses
        (true, Some(scaled)) => {
            format!("{}: {} {} (raw {})", field.name, scaled, field.unit, field.value)
        }
        _ => {
            let unit = field.unit.symbol();
            if unit.is_empty() {
                format!("{}: {}", field.name, field.value)
            } else {
                format!("{}: {} {}", field.name, field.value, unit)
            }
        }
    };
    if let Some(description) = &field.description {
        out.push_str(&format!(" ({description})"));
    }
    out
}
