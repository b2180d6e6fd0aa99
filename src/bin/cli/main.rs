//! CLI tool for creating ZIP archives with portable entry names.

mod exit_codes;

use std::fs::File;
use std::io::{self, BufRead, BufWriter};
use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use portzip::{TargetEncoding, WriteOptions, Writer};

use exit_codes::ExitCode;

/// Create ZIP archives whose entry names survive platform transitions
#[derive(Parser)]
#[command(name = "portzip")]
#[command(author, version, about = "ZIP archiver with platform-portable entry names")]
struct Cli {
    /// Archive file to create
    zipfile: PathBuf,

    /// Files and directories to add; a single `-` reads paths from stdin,
    /// one per line
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Disable NFC normalization of entry names
    #[arg(long)]
    no_normalize: bool,

    /// Archive .DS_Store files instead of skipping them
    #[arg(long)]
    include_ds_store: bool,

    /// Skip files and directories whose name starts with '.'
    #[arg(long)]
    exclude_dotfiles: bool,

    /// Store modification times as UTC instead of local time
    #[arg(long)]
    utc: bool,

    /// Compression level (0-9)
    #[arg(short, long, default_value_t = 6)]
    level: u32,

    /// Entry-name encoding
    #[arg(long, value_enum, default_value = "utf8")]
    encoding: EncodingArg,

    /// Suppress per-entry output
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum EncodingArg {
    /// UTF-8 names with the ZIP UTF-8 flag
    Utf8,
    /// Shift_JIS names for legacy Japanese Windows tools
    ShiftJis,
}

impl From<EncodingArg> for TargetEncoding {
    fn from(encoding: EncodingArg) -> Self {
        match encoding {
            EncodingArg::Utf8 => TargetEncoding::Utf8,
            EncodingArg::ShiftJis => TargetEncoding::ShiftJis,
        }
    }
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // --help and --version are not usage errors.
            let code = if err.use_stderr() {
                exit_codes::USAGE
            } else {
                exit_codes::SUCCESS
            };
            let _ = err.print();
            std::process::exit(code);
        }
    };

    std::process::exit(run(cli).code());
}

fn run(cli: Cli) -> ExitCode {
    let options = match build_options(&cli) {
        Ok(options) => options,
        Err(err) => {
            eprintln!("portzip: {err}");
            return ExitCode::Usage;
        }
    };

    let paths = match resolve_paths(&cli.paths) {
        Ok(paths) => paths,
        Err(err) => {
            eprintln!("portzip: reading paths from stdin: {err}");
            return ExitCode::Runtime;
        }
    };
    if paths.is_empty() {
        eprintln!("portzip: no input paths");
        return ExitCode::Usage;
    }

    let out = match File::create(&cli.zipfile) {
        Ok(file) => file,
        Err(err) => {
            eprintln!("portzip: creating {}: {err}", cli.zipfile.display());
            return ExitCode::Runtime;
        }
    };

    let mut writer = Writer::new(BufWriter::new(out), options);
    if !cli.quiet {
        writer = writer.with_progress(|name| println!("{name}"));
    }

    // A failed run leaves the partial archive behind; entries written
    // before the failure are still structurally valid.
    for path in &paths {
        if let Err(err) = writer.write_entry(path) {
            eprintln!("portzip: {err}");
            return exit_codes::error_to_exit_code(&err);
        }
    }

    if let Err(err) = writer.finish() {
        eprintln!("portzip: {err}");
        return exit_codes::error_to_exit_code(&err);
    }

    ExitCode::Success
}

fn build_options(cli: &Cli) -> portzip::Result<WriteOptions> {
    WriteOptions::new()
        .normalize(!cli.no_normalize)
        .exclude_ds_store(!cli.include_ds_store)
        .exclude_dotfiles(cli.exclude_dotfiles)
        .use_utc(cli.utc)
        .target_encoding(cli.encoding.into())
        .level(cli.level)
}

/// Expands the stdin placeholder `-` into one path per non-empty line.
fn resolve_paths(args: &[PathBuf]) -> io::Result<Vec<PathBuf>> {
    if args.len() == 1 && args[0].as_os_str() == "-" {
        let mut paths = Vec::new();
        for line in io::stdin().lock().lines() {
            let line = line?;
            let line = line.trim();
            if !line.is_empty() {
                paths.push(PathBuf::from(line));
            }
        }
        return Ok(paths);
    }
    Ok(args.to_vec())
}
