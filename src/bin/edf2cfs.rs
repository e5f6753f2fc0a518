use std::io::{BufRead, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::Parser;

use edf2cfs::htmllog::HtmlLog;
use edf2cfs::{convert_all, detected_parallelism, ChannelSelection, ConvertConfig, EdfFile};

#[derive(Parser)]
#[command(
    name = "edf2cfs",
    version,
    about = "Convert EDF polysomnography recordings to CFS feature files",
    after_help = "If no channel labels are given and stdin is a terminal, a selection menu \
                  built from the first file's signals is shown."
)]
struct Args {
    /// C3-A2 channel label
    #[arg(short = 'a', long = "c3")]
    c3: Option<String>,

    /// C4-A1 channel label
    #[arg(short = 'b', long = "c4")]
    c4: Option<String>,

    /// EL-A2 channel label
    #[arg(short = 'x', long = "el")]
    el: Option<String>,

    /// ER-A1 channel label
    #[arg(short = 'z', long = "er")]
    er: Option<String>,

    /// Directory of EDF files (non-recursive, `.edf` extension only)
    #[arg(short = 'd', long = "dir")]
    dir: Option<PathBuf>,

    /// Silence per-file success messages
    #[arg(short = 'q', long = "quiet")]
    quiet: bool,

    /// Overwrite existing .cfs files
    #[arg(short = 'o', long = "overwrite")]
    overwrite: bool,

    /// Save an HTML log next to the first input
    #[arg(short = 'l', long = "log")]
    log: bool,

    /// EDF files to convert
    #[arg(value_name = "FILES")]
    files: Vec<PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) if e.use_stderr() => {
            let _ = e.print();
            return ExitCode::from(1);
        }
        Err(e) => {
            // --help / --version
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
    };

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(1)
        }
    }
}

fn run(args: Args) -> Result<()> {
    let mut files = args.files.clone();
    if let Some(dir) = &args.dir {
        collect_edf_files(dir, &mut files)
            .with_context(|| format!("scanning {}", dir.display()))?;
    }
    if files.is_empty() {
        bail!("no EDF files found; see `edf2cfs --help` for usage");
    }

    let channels = match (args.c3, args.c4, args.el, args.er) {
        (Some(c3), Some(c4), Some(el), Some(er)) => ChannelSelection::new(c3, c4, el, er),
        (c3, c4, el, er) => {
            if !std::io::stdin().is_terminal() {
                bail!("all four channel labels (-a, -b, -x, -z) are required when stdin is not a terminal");
            }
            prompt_channels(&files[0], c3, c4, el, er)?
        }
    };

    let cfg = ConvertConfig {
        channels: channels.clone(),
        overwrite: args.overwrite,
    };

    let mut html_log = if args.log {
        let log = HtmlLog::create_next_to(&files[0], &channels)
            .context("creating the HTML log file")?;
        println!("Log will be saved at:\n{}", log.path().display());
        Some(log)
    } else {
        None
    };

    let parallelism = detected_parallelism();
    println!("Processing up to {parallelism} files simultaneously...");
    let started = Instant::now();

    let totals = convert_all(&files, &cfg, parallelism, |outcomes| {
        for outcome in outcomes {
            match &outcome.result {
                Ok(_) if !args.quiet => {
                    println!("Filename: {}, processed successfully", outcome.path.display());
                }
                Ok(_) => {}
                Err(_) if args.log => {
                    println!("ERROR: Filename: {}, please check log.", outcome.path.display());
                }
                Err(_) => {
                    println!(
                        "ERROR: Filename: {}, please enable logging to see details.",
                        outcome.path.display()
                    );
                }
            }
            if let Some(log) = &mut html_log {
                if let Err(err) = log.append_outcome(outcome) {
                    eprintln!("warning: could not append to log: {err}");
                }
            }
        }
    });

    let elapsed_secs = started.elapsed().as_secs();
    println!(
        "{} files processed in {elapsed_secs} seconds.\n\
         {} files converted successfully. {} files could not be converted.",
        totals.processed(),
        totals.converted,
        totals.failed
    );

    if let Some(log) = html_log {
        log.finish(totals, elapsed_secs)
            .context("finalising the HTML log")?;
    }
    Ok(())
}

/// Append every regular `*.edf` file directly inside `dir` to `files`.
fn collect_edf_files(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "edf") {
            files.push(path);
        }
    }
    Ok(())
}

/// Interactive channel selection from the first file's signal list.
///
/// Labels already given on the command line are kept; the rest are picked by
/// 1-based index and stored lowercased.
fn prompt_channels(
    first: &Path,
    c3: Option<String>,
    c4: Option<String>,
    el: Option<String>,
    er: Option<String>,
) -> Result<ChannelSelection> {
    let edf = EdfFile::open(first)
        .with_context(|| format!("opening {} for channel selection", first.display()))?;

    println!("Please make sure all files share the same channel labels.");
    println!("Following channels are found:");
    for (i, sig) in edf.signals.iter().enumerate() {
        println!("{}: {}", i + 1, sig.label);
    }

    let stdin = std::io::stdin();
    let mut input = stdin.lock();
    let mut pick = |role: &str, given: Option<String>| -> Result<String> {
        if let Some(label) = given {
            return Ok(label);
        }
        print!("Please select the {role} channel number: ");
        std::io::stdout().flush()?;
        let mut line = String::new();
        input.read_line(&mut line)?;
        let n: usize = line.trim().parse().context("not a channel number")?;
        if n < 1 || n > edf.signals.len() {
            bail!("invalid channel number {n}");
        }
        Ok(edf.signals[n - 1].label.to_lowercase())
    };

    Ok(ChannelSelection {
        c3: pick("C3:A2", c3)?,
        c4: pick("C4:A1", c4)?,
        el: pick("EOGl:A2", el)?,
        er: pick("EOGr:A1", er)?,
    })
}
