// Command-line front end for the block and transaction transforms.
//
// Subcommands wrap the library directly: `compress` / `decompress` run the
// block container path over a file or stdio, `inspect` prints a record's
// header, `scan` runs the transaction transform over a batch of files and
// reports deduplication.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::{ArgAction, Args, Parser, Subcommand, ValueHint};

use crate::container::{self, ContainerHeader, HEADER_LEN};
use crate::dedup::DedupRef;
use crate::engine::{DEFAULT_LEVEL, Engine, EngineConfig, MAX_LEVEL, MIN_LEVEL};
use crate::io::{self as file_io, FileStats};

const BUF_SIZE: usize = 64 * 1024;

// ---------------------------------------------------------------------------
// Clap CLI definition
// ---------------------------------------------------------------------------

/// Run-length block compression and transaction deduplication.
#[derive(Parser, Debug)]
#[command(
    name = "blockpress",
    version,
    about = "Ledger block compression and transaction deduplication",
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Cmd,

    /// Force overwrite existing output files.
    #[arg(short = 'f', long, global = true)]
    force: bool,

    /// Quiet mode (suppress non-error output).
    #[arg(short = 'q', long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Verbose mode (use multiple times for more detail).
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Output stats as JSON to stderr.
    #[arg(long = "json", global = true)]
    json_output: bool,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Compress a serialized block into a container record.
    Compress(TransformArgs),
    /// Decompress a container record back into the serialized block.
    Decompress(TransformArgs),
    /// Print the header of a container record or dedup reference.
    Inspect(InspectArgs),
    /// Run transaction deduplication over a set of files and report.
    Scan(ScanArgs),
    /// Print build/configuration details.
    Config,
}

#[derive(Args, Debug)]
struct TransformArgs {
    /// Compression level (1-9).
    #[arg(long, short = 'l', value_parser = clap::value_parser!(u32).range(MIN_LEVEL as i64..=MAX_LEVEL as i64), default_value_t = DEFAULT_LEVEL)]
    level: u32,

    /// Input file (default: stdin).
    #[arg(long, value_hint = ValueHint::FilePath, conflicts_with = "input_pos")]
    input: Option<PathBuf>,

    /// Output file (default: stdout).
    #[arg(long, value_hint = ValueHint::FilePath, conflicts_with = "output_pos")]
    output: Option<PathBuf>,

    /// Write output to stdout.
    #[arg(short = 'c', long)]
    stdout: bool,

    /// Input file (positional form).
    #[arg(value_hint = ValueHint::FilePath)]
    input_pos: Option<PathBuf>,

    /// Output file (positional form).
    #[arg(value_hint = ValueHint::FilePath)]
    output_pos: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct InspectArgs {
    /// Record to inspect.
    #[arg(value_hint = ValueHint::FilePath)]
    input: PathBuf,
}

#[derive(Args, Debug)]
struct ScanArgs {
    /// Serialized transaction files, processed in order.
    #[arg(required = true, value_hint = ValueHint::FilePath)]
    transactions: Vec<PathBuf>,
}

// ---------------------------------------------------------------------------
// Resolved command + options (flattened from Cli)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Compress,
    Decompress,
    Inspect,
    Scan,
    Config,
}

struct Options {
    command: Command,
    use_stdout: bool,
    force: bool,
    quiet: bool,
    verbose: u8,
    level: u32,
    input_file: Option<PathBuf>,
    output_file: Option<PathBuf>,
    scan_files: Vec<PathBuf>,
    json_output: bool,
}

fn resolve_options(cli: Cli) -> Options {
    let base = Options {
        command: Command::Config,
        use_stdout: false,
        force: cli.force,
        quiet: cli.quiet,
        verbose: cli.verbose.min(2),
        level: DEFAULT_LEVEL,
        input_file: None,
        output_file: None,
        scan_files: Vec::new(),
        json_output: cli.json_output,
    };

    match cli.command {
        Cmd::Compress(args) => Options {
            command: Command::Compress,
            ..transform_options(base, args)
        },
        Cmd::Decompress(args) => Options {
            command: Command::Decompress,
            ..transform_options(base, args)
        },
        Cmd::Inspect(args) => Options {
            command: Command::Inspect,
            input_file: Some(args.input),
            ..base
        },
        Cmd::Scan(args) => Options {
            command: Command::Scan,
            scan_files: args.transactions,
            ..base
        },
        Cmd::Config => base,
    }
}

fn transform_options(base: Options, args: TransformArgs) -> Options {
    Options {
        use_stdout: args.stdout,
        level: args.level,
        input_file: args.input.or(args.input_pos),
        output_file: args.output.or(args.output_pos),
        ..base
    }
}

#[cfg(any(test, feature = "fuzzing"))]
pub fn fuzz_try_parse_args(args: &[String]) {
    let argv: Vec<String> = std::iter::once("blockpress".to_string())
        .chain(args.iter().cloned())
        .collect();
    if let Ok(cli) = Cli::try_parse_from(argv) {
        let _ = resolve_options(cli);
    }
}

fn print_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => eprintln!("{s}"),
        Err(e) => log::error!("failed to render JSON stats: {e}"),
    }
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

// ---------------------------------------------------------------------------
// Config command
// ---------------------------------------------------------------------------

fn cmd_config() -> i32 {
    let version = env!("CARGO_PKG_VERSION");
    eprintln!("blockpress version {version}");

    let parallel = cfg!(feature = "parallel") as u8;

    eprintln!("PARALLEL={parallel}");
    eprintln!("CONTAINER_MAGIC={}", String::from_utf8_lossy(&container::CONTAINER_MAGIC));
    eprintln!("CONTAINER_VERSION={}", container::CONTAINER_VERSION);
    eprintln!("HEADER_LEN={HEADER_LEN}");
    eprintln!("DEDUP_RECORD_LEN={}", crate::dedup::DEDUP_RECORD_LEN);
    eprintln!("DEFAULT_LEVEL={DEFAULT_LEVEL}");

    0
}

// ---------------------------------------------------------------------------
// Compress / decompress commands
// ---------------------------------------------------------------------------

fn open_input(opts: &Options) -> Result<Box<dyn Read>, String> {
    match &opts.input_file {
        Some(path) => File::open(path)
            .map(|f| Box::new(BufReader::with_capacity(BUF_SIZE, f)) as Box<dyn Read>)
            .map_err(|e| format!("input file: {}: {e}", path.display())),
        None => Ok(Box::new(BufReader::new(io::stdin()))),
    }
}

fn open_output(opts: &Options) -> Result<Box<dyn Write>, String> {
    match (opts.use_stdout, &opts.output_file) {
        (true, _) | (_, None) => Ok(Box::new(BufWriter::with_capacity(
            BUF_SIZE,
            io::stdout().lock(),
        ))),
        (false, Some(path)) => {
            if path.exists() && !opts.force {
                return Err(format!(
                    "output file exists, use -f to overwrite: {}",
                    path.display()
                ));
            }
            File::create(path)
                .map(|f| Box::new(BufWriter::with_capacity(BUF_SIZE, f)) as Box<dyn Write>)
                .map_err(|e| format!("output file: {}: {e}", path.display()))
        }
    }
}

fn cmd_transform(opts: &Options) -> i32 {
    let engine = Engine::with_config(EngineConfig::enabled(opts.level as i64));

    let reader = match open_input(opts) {
        Ok(r) => r,
        Err(msg) => {
            eprintln!("blockpress: {msg}");
            return 1;
        }
    };
    let writer = match open_output(opts) {
        Ok(w) => w,
        Err(msg) => {
            eprintln!("blockpress: {msg}");
            return 1;
        }
    };

    let (name, result) = match opts.command {
        Command::Compress => ("compress", file_io::compress_stream(&engine, reader, writer)),
        _ => ("decompress", file_io::decompress_stream(&engine, reader, writer)),
    };

    let stats: FileStats = match result {
        Ok(stats) => stats,
        Err(e) => {
            eprintln!("blockpress: {name} error: {e}");
            return 1;
        }
    };

    if opts.verbose > 0 && !opts.quiet {
        eprintln!(
            "blockpress: {name}: input size: {}, output size: {}",
            stats.input_size, stats.output_size
        );
    }
    if opts.verbose > 1 && !opts.quiet {
        eprintln!("blockpress: output sha256: {}", hex(&stats.output_sha256));
    }

    if opts.json_output {
        let engine_stats = engine.stats();
        print_json(&serde_json::json!({
            "command": name,
            "input_size": stats.input_size,
            "output_size": stats.output_size,
            "output_sha256": hex(&stats.output_sha256),
            "level": opts.level,
            "compression_ratio": engine_stats.compression_ratio(),
        }));
    }

    0
}

// ---------------------------------------------------------------------------
// Inspect command
// ---------------------------------------------------------------------------

fn cmd_inspect(opts: &Options) -> i32 {
    let Some(path) = opts.input_file.as_deref() else {
        eprintln!("blockpress: inspect: no input file");
        return 1;
    };
    let data = match std::fs::read(path) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("blockpress: input file: {}: {e}", path.display());
            return 1;
        }
    };

    if let Some(reference) = DedupRef::parse(&data) {
        println!("{}: dedup reference", path.display());
        println!("  fingerprint: {}", reference.fingerprint());
        return 0;
    }

    if !container::is_container(&data) {
        println!(
            "{}: not a container record ({} bytes)",
            path.display(),
            data.len()
        );
        return 1;
    }

    match ContainerHeader::parse(&data) {
        Ok(header) => {
            print_header(path, &header, data.len());
            if opts.json_output {
                print_json(&serde_json::json!({
                    "command": "inspect",
                    "version": header.version,
                    "flags": header.flags.bits(),
                    "original_size": header.original_size,
                    "compressed_size": header.compressed_size,
                    "record_len": data.len(),
                }));
            }
            0
        }
        Err(e) => {
            eprintln!("blockpress: {}: {e}", path.display());
            1
        }
    }
}

fn print_header(path: &Path, header: &ContainerHeader, record_len: usize) {
    let declared = header.record_len();
    println!("{}: container record", path.display());
    println!("  version:          {:#04X}", header.version);
    println!("  flags:            {:#04X} {:?}", header.flags.bits(), header.flags);
    println!("  original size:    {}", header.original_size);
    println!("  compressed size:  {}", header.compressed_size);
    println!("  record length:    {record_len} (declared {declared})");
    if header.original_size > 0 {
        let ratio = header.compressed_size as f64 / header.original_size as f64;
        println!("  payload ratio:    {ratio:.4}");
    }
    if declared > record_len {
        println!("  warning: record is truncated");
    }
}

// ---------------------------------------------------------------------------
// Scan command
// ---------------------------------------------------------------------------

fn cmd_scan(opts: &Options) -> i32 {
    let engine = Engine::with_config(EngineConfig::enabled(opts.level as i64));
    let mut bytes_in = 0u64;
    let mut bytes_out = 0u64;

    for path in &opts.scan_files {
        let tx = match std::fs::read(path) {
            Ok(d) => d,
            Err(e) => {
                eprintln!("blockpress: transaction file: {}: {e}", path.display());
                return 1;
            }
        };
        let out = match engine.compress_transaction(&tx) {
            Ok(out) => out,
            Err(e) => {
                eprintln!("blockpress: {}: {e}", path.display());
                return 1;
            }
        };
        if opts.verbose > 1 && !opts.quiet {
            let kind = if DedupRef::parse(&out).is_some() {
                "dedup"
            } else {
                "encoded"
            };
            eprintln!(
                "blockpress: {}: {} -> {} bytes ({kind})",
                path.display(),
                tx.len(),
                out.len()
            );
        }
        bytes_in += tx.len() as u64;
        bytes_out += out.len() as u64;
    }

    let stats = engine.stats();
    let ratio = if bytes_in > 0 {
        bytes_out as f64 / bytes_in as f64
    } else {
        1.0
    };

    if !opts.quiet {
        println!("transactions:     {}", opts.scan_files.len());
        println!("unique patterns:  {}", engine.cache_len());
        println!("dedup hits:       {}", stats.deduped_transactions);
        println!("cache size:       {} bytes", engine.cache_size_bytes());
        println!("bytes in / out:   {bytes_in} / {bytes_out} ({ratio:.4})");
    }

    if opts.json_output {
        print_json(&serde_json::json!({
            "command": "scan",
            "transactions": opts.scan_files.len(),
            "unique_patterns": engine.cache_len(),
            "dedup_hits": stats.deduped_transactions,
            "cache_size_bytes": engine.cache_size_bytes(),
            "bytes_in": bytes_in,
            "bytes_out": bytes_out,
            "ratio": ratio,
        }));
    }

    0
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Main CLI entry point. Parses arguments via clap, dispatches commands.
pub fn run() -> ! {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .format_target(false)
        .init();

    let cli = Cli::parse();
    let mut opts = resolve_options(cli);

    // Warn if -c overrides output filename.
    if opts.use_stdout && !opts.quiet
        && let Some(path) = opts.output_file.take()
    {
        eprintln!(
            "blockpress: warning: -c option overrides output filename: {}",
            path.display()
        );
    }

    let exit_code = match opts.command {
        Command::Compress | Command::Decompress => cmd_transform(&opts),
        Command::Inspect => cmd_inspect(&opts),
        Command::Scan => cmd_scan(&opts),
        Command::Config => cmd_config(),
    };

    process::exit(exit_code);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
