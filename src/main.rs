//! # chatvault CLI
//!
//! Command-line interface for the chatvault library.

use std::path::Path;
use std::process;
use std::time::Instant;

use clap::Parser as ClapParser;
use tracing::info;

use chatvault::ChatvaultError;
use chatvault::cli::{Args, OutputFormat};
use chatvault::core::output::{JsonlSink, MemorySink, RoomSink, write_json};
use chatvault::core::senders::{SenderTable, SystemSender};
use chatvault::import::{ImportReport, Importer, RoomSource, discover_chat_files};
use chatvault::progress::stderr_progress;

fn main() {
    let args = <Args as ClapParser>::parse();
    init_tracing(args.verbose);

    match run(&args) {
        Ok(report) if !report.rooms.is_empty() || report.failures.is_empty() => {}
        Ok(_) => {
            eprintln!("❌ Error: no chat could be imported");
            process::exit(1);
        }
        Err(e) => {
            eprintln!("❌ Error: {}", e);
            process::exit(1);
        }
    }
}

/// Logs go to stderr; `RUST_LOG` overrides the level picked by `-v`.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{EnvFilter, fmt};

    let default = if verbose { "chatvault=debug" } else { "chatvault=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: &Args) -> Result<ImportReport, ChatvaultError> {
    let total_start = Instant::now();
    let config = args.import_config();
    let locale = config.parser.locale.locale();
    let format = args.output_format();

    println!("📦 chatvault v{}", env!("CARGO_PKG_VERSION"));
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("📂 Input:   {}", args.input.display());
    println!("💾 Output:  {}", args.output.display());
    println!("📄 Format:  {}", format);
    println!("🌐 Locale:  {}", config.parser.locale);
    println!();

    let files = discover_chat_files(&args.input, locale)?;
    info!(files = files.len(), "found chat exports");
    let sources: Vec<RoomSource> = files
        .iter()
        .map(|path| RoomSource::from_path(path, locale))
        .collect();

    let mut senders = match &args.senders {
        Some(path) if path.exists() => SenderTable::load_json(path)?,
        _ => SenderTable::new(),
    };
    // --system-sender wins over the stored id, which wins over a fresh one
    let system = match args.system_sender {
        Some(id) => SystemSender::new(id),
        None => senders.system_sender().unwrap_or_else(SystemSender::generate),
    };
    senders.set_system_sender(&system);

    let setup = Setup {
        args,
        senders,
        system,
    };
    let (report, senders) = match format {
        OutputFormat::Jsonl => {
            let sink = JsonlSink::create(&args.output)?;
            let (report, _, senders) = import_into(setup.importer(sink), &sources)?;
            (report, senders)
        }
        OutputFormat::Json => {
            let (report, sink, senders) = import_into(setup.importer(MemorySink::new()), &sources)?;
            write_json(sink.senders(), sink.rooms(), &args.output)?;
            (report, senders)
        }
    };

    if let Some(path) = &args.senders {
        senders.save_json(path)?;
    }

    print_summary(&report, &args.output, total_start);
    Ok(report)
}

struct Setup<'a> {
    args: &'a Args,
    senders: SenderTable,
    system: SystemSender,
}

impl Setup<'_> {
    fn importer<S: RoomSink>(self, sink: S) -> Importer<S> {
        let importer = Importer::new(sink)
            .with_config(self.args.import_config())
            .with_senders(self.senders)
            .with_system_sender(self.system);
        if self.args.progress {
            importer.with_progress(stderr_progress())
        } else {
            importer
        }
    }
}

fn import_into<S: RoomSink>(
    mut importer: Importer<S>,
    sources: &[RoomSource],
) -> Result<(ImportReport, S, SenderTable), ChatvaultError> {
    let report = importer.import(sources)?;
    let (sink, senders) = importer.into_parts();
    Ok((report, sink, senders))
}

fn print_summary(report: &ImportReport, output: &Path, start: Instant) {
    println!();
    println!("✅ Done! Output saved to {}", output.display());
    println!();
    println!("📊 Summary:");
    println!("   Rooms:     {}", report.rooms.len());
    println!("   Messages:  {}", report.messages());
    println!(
        "   Senders:   {} new",
        report.rooms.iter().map(|r| r.new_senders).sum::<usize>()
    );
    if !report.empty.is_empty() {
        println!("   Empty:     {}", report.empty.len());
    }
    if !report.failures.is_empty() {
        println!("   Failed:    {}", report.failures.len());
        for failure in &report.failures {
            println!("     - {}: {}", failure.room_name, failure.error);
        }
    }
    println!();
    println!("⚡ Total time: {:.2}s", start.elapsed().as_secs_f64());
}
