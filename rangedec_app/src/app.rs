use std::path::PathBuf;
use clap::{Parser, Subcommand};
use num_traits::ToPrimitive;
use tracing::{info, warn};
use rangedec_lib::verify::DEFAULT_SAMPLES;
use rangedec_lib::{LookupRequest, LookupResult, PropertyChecker, Selection};
use crate::config::{parse_number, DecoderMap};
use crate::error::{AppError, Result};

#[derive(Parser, Debug)]
#[command(name = "rangedec")]
#[command(about = "Decode addresses against a static region map", long_about = None)]
pub struct Args {
    /// Decoder map in INI format
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Decoder map frozen with `freeze`, used instead of --config
    #[arg(long, global = true, conflicts_with = "config")]
    snapshot: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decode addresses and print the selected region and offset
    Decode {
        /// Addresses, decimal or 0x prefixed
        #[arg(required = true, value_parser = parse_address)]
        addresses: Vec<u64>,

        /// Drive the lookups with the enable line low
        #[arg(long)]
        disable: bool,

        /// Drive the lookups with the select line low
        #[arg(long)]
        deselect: bool,
    },
    /// Print the range table and the decode window
    Table,
    /// Check the decoder against the reference model
    Verify {
        /// Random addresses to try when the bus is too wide to enumerate
        #[arg(long, default_value_t = DEFAULT_SAMPLES)]
        samples: u64,

        #[arg(long, default_value_t = 0)]
        seed: u64,
    },
    /// Save the decoder map as a snapshot
    Freeze {
        #[arg(long)]
        out: PathBuf,
    },
}

fn parse_address(s: &str) -> std::result::Result<u64, String> {
    parse_number(s).map_err(|e| e.to_string())
}

pub fn run(args: Args) -> Result<()> {
    let map = match (&args.config, &args.snapshot) {
        (Some(path), _) => DecoderMap::load(path)?,
        (None, Some(path)) => DecoderMap::thaw(path)?,
        (None, None) => return Err(AppError::NoMap),
    };

    match args.command {
        Command::Decode {
            addresses,
            disable,
            deselect,
        } => {
            for address in addresses {
                let req = LookupRequest {
                    address,
                    enable: !disable,
                    select: !deselect,
                };
                let result = map.decoder().decode(req);

                if result.is_error() {
                    warn!("Lookup of 0x{:x} is out of range", address);
                }

                println!("{}", describe(&map, address, &result));
            }
        }
        Command::Table => print_table(&map),
        Command::Verify { samples, seed } => {
            let report = PropertyChecker::new(map.decoder()).check(samples, seed)?;

            println!("OK: {}", report);
        }
        Command::Freeze { out } => map.freeze(&out)?,
    }

    Ok(())
}

/// Hex digits needed to print any address of the bus
fn address_digits(map: &DecoderMap) -> usize {
    map.decoder().config().address_width().div_ceil(4) as usize
}

fn region_label(map: &DecoderMap, index: usize) -> String {
    match map.name(index) {
        Some(name) => format!("region {} ({})", index, name),
        None => format!("region {}", index),
    }
}

fn describe(map: &DecoderMap, address: u64, result: &LookupResult) -> String {
    let digits = address_digits(map);

    let outcome = match result.selection() {
        Selection::Idle => "idle".to_string(),
        Selection::Region { index, offset } => {
            format!("{} offset 0x{:x}", region_label(map, index), offset)
        }
        Selection::OutOfRange { address } => format!(
            "out of range (error {}, address 0x{:x})",
            result.error.to_u8().unwrap_or(u8::MAX),
            address
        ),
    };

    format!("0x{:0digits$x} -> {}", address, outcome, digits = digits)
}

fn print_table(map: &DecoderMap) {
    let decoder = map.decoder();
    let config = decoder.config();
    let mask = decoder.mask();
    let digits = address_digits(map);

    println!(
        "{}-bit address bus, {}-bit data bus",
        config.address_width(),
        config.data_width()
    );
    println!(
        "decode window: {} bits, mask 0x{:0digits$x}",
        mask.bits(),
        mask.mask(),
        digits = digits
    );

    for (index, range) in decoder.table().iter().enumerate() {
        println!(
            "{:>4}  0x{:0digits$x}..=0x{:0digits$x}  {:>10}  {}",
            index,
            range.start(),
            range.end(),
            range.size(),
            map.name(index).unwrap_or("-"),
            digits = digits
        );
    }

    info!(
        "{} of 0x{:x} addresses in the window are mapped",
        decoder.table().total_size(),
        mask.mask() as u128 + 1
    );
}
