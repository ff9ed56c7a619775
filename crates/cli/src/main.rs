// SocFab - SoC Bus Fabric and Address Map Toolkit
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

mod replay;

use clap::{Parser, Subcommand};
use socfab_codegen::{Exporter, JSON_FILE};
use socfab_config::{ReplayScript, SocDescriptor};
use socfab_core::Soc;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;
use tracing::{error, info};

const EXIT_OK: u8 = 0;
const EXIT_CONFIG_ERROR: u8 = 2;
const EXIT_RUNTIME_ERROR: u8 = 3;

const DEFAULT_MAX_CYCLES: u64 = 10_000;

fn parse_u32_addr(s: &str) -> Result<u32, String> {
    let trimmed = s.trim();
    if let Some(hex) = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        u32::from_str_radix(&hex.replace('_', ""), 16)
            .map_err(|e| format!("Invalid hex address '{}': {}", s, e))
    } else {
        u32::from_str(trimmed).map_err(|e| format!("Invalid address '{}': {}", s, e))
    }
}

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "SocFab: SoC bus fabric and address map toolkit",
    long_about = None
)]
struct Cli {
    /// Enable debug logging (decoder registrations, grants, wait states)
    #[arg(short, long, global = true)]
    trace: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Assemble the SoC and print its address map.
    Check(SocArgs),

    /// Resolve addresses against the assembled decoder.
    Decode(DecodeArgs),

    /// Generate the firmware descriptor (C header, linker script, Rust, JSON).
    Export(ExportArgs),

    /// Drive scripted transactions through the fabric from named masters.
    Replay(ReplayArgs),
}

#[derive(Parser, Debug)]
struct SocArgs {
    /// Path to the SoC descriptor (YAML)
    #[arg(short, long)]
    soc: PathBuf,
}

#[derive(Parser, Debug)]
struct DecodeArgs {
    #[command(flatten)]
    soc: SocArgs,

    /// Addresses to decode (decimal or 0x-prefixed hex)
    #[arg(required = true, value_parser = parse_u32_addr)]
    addresses: Vec<u32>,
}

#[derive(Parser, Debug)]
struct ExportArgs {
    #[command(flatten)]
    soc: SocArgs,

    /// Output directory for the generated files
    #[arg(short, long)]
    out: PathBuf,

    /// Also print the JSON descriptor to stdout
    #[arg(long)]
    json: bool,
}

#[derive(Parser, Debug)]
struct ReplayArgs {
    #[command(flatten)]
    soc: SocArgs,

    /// Path to the replay script (YAML)
    #[arg(short = 'c', long)]
    script: PathBuf,

    /// Override max cycles (takes precedence over script)
    #[arg(long)]
    max_cycles: Option<u64>,

    /// Raw image loaded into the ROM region before the replay starts
    #[arg(long)]
    image: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays machine-readable.
    if cli.trace {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .with_writer(std::io::stderr)
            .init();
    }

    match cli.command {
        Commands::Check(args) => run_check(args),
        Commands::Decode(args) => run_decode(args),
        Commands::Export(args) => run_export(args),
        Commands::Replay(args) => run_replay(args),
    }
}

fn load_soc(args: &SocArgs) -> Result<(SocDescriptor, Soc), ExitCode> {
    let desc = SocDescriptor::from_file(&args.soc).map_err(|e| {
        error!("{:#}", e);
        ExitCode::from(EXIT_CONFIG_ERROR)
    })?;
    let soc = Soc::assemble(&desc).map_err(|e| {
        error!("SoC assembly failed: {}", e);
        ExitCode::from(EXIT_CONFIG_ERROR)
    })?;
    Ok((desc, soc))
}

fn run_check(args: SocArgs) -> ExitCode {
    let (desc, soc) = match load_soc(&args) {
        Ok(loaded) => loaded,
        Err(code) => return code,
    };

    let map = soc.map();
    println!("SoC '{}'", map.soc);
    match &desc.cpu.variant {
        Some(variant) => println!(
            "cpu {} ({}) reset {:#010x}",
            desc.cpu.name, variant, map.reset_vector
        ),
        None => println!("cpu {} reset {:#010x}", desc.cpu.name, map.reset_vector),
    }
    println!("{:<16} {:<24} {:<12} TARGET", "NAME", "RANGE", "TYPE");
    for entry in soc.decoder().iter() {
        let kind = map.entry(&entry.name).map(|e| e.kind.as_str()).unwrap_or("-");
        let target = match entry.target {
            Some(id) => format!("{}", id.0),
            None => "reserved".to_string(),
        };
        println!(
            "{:<16} {:<24} {:<12} {}",
            entry.name,
            entry.range.to_string(),
            kind,
            target
        );
    }
    println!("rom {}", map.regions.rom.as_range());
    println!("ram {}", map.regions.ram.as_range());
    println!("masters: {}", soc.master_names().collect::<Vec<_>>().join(", "));
    for conn in soc.sideband().connections() {
        let source = conn
            .source
            .and_then(|t| soc.interconnect().targets().get(t.0))
            .map(|slot| slot.name.as_str())
            .unwrap_or("tied low");
        println!("irq {:?} <- {}", conn.line, source);
    }
    ExitCode::from(EXIT_OK)
}

fn run_decode(args: DecodeArgs) -> ExitCode {
    let soc = match load_soc(&args.soc) {
        Ok((_, soc)) => soc,
        Err(code) => return code,
    };

    for addr in args.addresses {
        let hit = soc
            .decoder()
            .entry_at(addr)
            .filter(|entry| entry.target.is_some())
            .and_then(|entry| Some((entry.name.as_str(), entry.range.offset_of(addr)?)));
        match hit {
            Some((name, offset)) => println!("{:#010x} -> {} +{:#x}", addr, name, offset),
            None => println!("{:#010x} -> UNMAPPED", addr),
        }
    }
    ExitCode::from(EXIT_OK)
}

fn run_export(args: ExportArgs) -> ExitCode {
    let soc = match load_soc(&args.soc) {
        Ok((_, soc)) => soc,
        Err(code) => return code,
    };
    let map = soc.map();

    let artifact = match Exporter::new(soc.decoder())
        .named(&map.soc)
        .export(&map.descriptor_entries(), &map.regions)
    {
        Ok(artifact) => artifact,
        Err(e) => {
            error!("Descriptor export failed: {}", e);
            return ExitCode::from(EXIT_CONFIG_ERROR);
        }
    };

    if let Err(e) = artifact.write_to(&args.out) {
        error!("{:#}", e);
        return ExitCode::from(EXIT_RUNTIME_ERROR);
    }

    if args.json {
        print!("{}", artifact.file(JSON_FILE).unwrap_or_default());
    }
    println!("{}", artifact.digest());
    ExitCode::from(EXIT_OK)
}

fn run_replay(args: ReplayArgs) -> ExitCode {
    let (desc, mut soc) = match load_soc(&args.soc) {
        Ok(loaded) => loaded,
        Err(code) => return code,
    };

    let script = match ReplayScript::from_file(&args.script) {
        Ok(script) => script,
        Err(e) => {
            error!("{:#}", e);
            return ExitCode::from(EXIT_CONFIG_ERROR);
        }
    };

    if let Some(path) = &args.image {
        let rom = &desc.software.rom;
        let loaded = std::fs::read(path)
            .map_err(anyhow::Error::from)
            .and_then(|bytes| soc.load_memory(&rom.target, rom.offset, &bytes));
        if let Err(e) = loaded {
            error!("Failed to load image {:?}: {:#}", path, e);
            return ExitCode::from(EXIT_CONFIG_ERROR);
        }
    }

    let expected = match replay::attach_script(&mut soc, &script) {
        Ok(n) => n,
        Err(e) => {
            error!("{:#}", e);
            return ExitCode::from(EXIT_CONFIG_ERROR);
        }
    };

    let max_cycles = args
        .max_cycles
        .or(script.max_cycles)
        .unwrap_or(DEFAULT_MAX_CYCLES);
    info!(
        "Replaying {} transactions on '{}' (max {} cycles)",
        expected,
        soc.map().soc,
        max_cycles
    );

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let result = replay::run(&mut soc, expected, max_cycles, |record| {
        writeln!(out, "{}", serde_json::to_string(record)?)?;
        Ok(())
    });

    match result {
        Ok(_) => ExitCode::from(EXIT_OK),
        Err(e) => {
            error!("{:#}", e);
            ExitCode::from(EXIT_RUNTIME_ERROR)
        }
    }
}
