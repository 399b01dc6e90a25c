use std::fs;
use std::path::Path;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::Parser;
use tracing_subscriber::EnvFilter;

use biosift::binary::{AssetSummary, FormatFlags};
use biosift::{
    run_build, Command, Domain, Event, QueryResult, SearchConfig, SerializedIndex, WorkerBridge,
};

mod cli;
use cli::display::*;
use cli::{Cli, Commands};

/// Exit code when a query ran but matched nothing.
const EXIT_NO_MATCHES: u8 = 1;
/// Exit code for every failure, including an unavailable index.
const EXIT_FAILURE: u8 = 2;

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "biosift=info",
        1 => "biosift=debug",
        _ => "biosift=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Index { input, output } => run_index(&input, &output),
        Commands::Inspect { file } => run_inspect(&file),
        Commands::Search {
            domain,
            dir,
            query,
            limit,
            json,
            timeout_ms,
        } => load_config(cli.config.as_deref()).and_then(|mut config| {
            if let Some(dir) = dir {
                config.index_dir = dir;
            }
            run_search(
                &config,
                domain,
                &query,
                limit,
                json,
                Duration::from_millis(timeout_ms),
            )
        }),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            tracing::debug!(kind = e.error_type(), "command failed");
            eprintln!("{} {}", error_line("error:"), e);
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

fn load_config(path: Option<&Path>) -> biosift::Result<SearchConfig> {
    match path {
        Some(path) => SearchConfig::from_file(path),
        None => Ok(SearchConfig::default()),
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// index
// ═══════════════════════════════════════════════════════════════════════════

fn run_index(input: &Path, output: &Path) -> biosift::Result<ExitCode> {
    let started = Instant::now();
    let report = run_build(input, output)?;

    section_top("Built");
    for (path, index) in &report.assets {
        row(&format!(
            "  {} {} {} {}",
            pad_right(&themed(CYAN, &[BOLD], index.domain.tag()), 26),
            pad_left(&format!("{} docs", index.doc_count), 12),
            pad_left(&format_size(index.bytes.len()), 10),
            dim(&file_name(path)),
        ));
    }
    section_mid("Total");
    row(&format!(
        "  {} assets, {} docs, {} in {:.2?}",
        report.assets.len(),
        report.total_docs(),
        format_size(report.total_bytes()),
        started.elapsed()
    ));
    section_bot();
    Ok(ExitCode::SUCCESS)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

// ═══════════════════════════════════════════════════════════════════════════
// inspect
// ═══════════════════════════════════════════════════════════════════════════

fn run_inspect(path: &Path) -> biosift::Result<ExitCode> {
    let bytes = fs::read(path)?;
    let summary = SerializedIndex::summarize(&bytes)?;
    print_summary(path, &summary);

    // A full decode catches what the header alone cannot.
    match SerializedIndex::from_bytes(&bytes) {
        Ok(_) => Ok(ExitCode::SUCCESS),
        Err(e) => {
            eprintln!("{} {}", error_line("invalid:"), e);
            Ok(ExitCode::from(EXIT_FAILURE))
        }
    }
}

fn print_summary(path: &Path, summary: &AssetSummary) {
    let header = &summary.header;
    let domain = summary
        .domain()
        .map(|d| d.tag().to_string())
        .unwrap_or_else(|| format!("unknown ({})", header.domain_code));

    section_top(&file_name(path));
    row(&format!("  version      {}", header.version));
    row(&format!("  domain       {}", domain));
    row(&format!(
        "  flags        {:#04x}{}",
        header.flags.bits(),
        if header.flags.folded_diacritics() {
            " folded-diacritics"
        } else {
            ""
        }
    ));
    if header.flags != FormatFlags::current() {
        row(&format!("  {}", dim("flags differ from this build's tokenizer")));
    }
    row(&format!("  documents    {}", header.doc_count));
    row(&format!("  terms        {}", header.term_count));

    section_mid("Sections");
    let offsets = &summary.offsets;
    let sections = [
        ("ids", offsets.ids),
        ("vocabulary", offsets.vocabulary),
        ("postings", offsets.postings),
        ("doc lengths", offsets.doc_lengths),
    ];
    for (name, (start, end)) in sections {
        let len = end.saturating_sub(start);
        row(&format!(
            "  {} {} {}",
            pad_right(name, 12),
            pad_left(&format_size(len), 10),
            share_bar(len, summary.file_len, 30)
        ));
    }
    row(&format!(
        "  {} {}",
        pad_right("total", 12),
        pad_left(&format_size(summary.file_len), 10)
    ));

    section_mid("Checksum");
    let stored = summary
        .stored_crc32
        .map(|crc| format!("{:08x}", crc))
        .unwrap_or_else(|| "missing".to_string());
    row(&format!(
        "  stored {}  computed {:08x}  {}",
        stored,
        summary.computed_crc32,
        checksum_badge(summary.checksum_ok())
    ));
    section_bot();
}

// ═══════════════════════════════════════════════════════════════════════════
// search
// ═══════════════════════════════════════════════════════════════════════════

fn run_search(
    config: &SearchConfig,
    domain: Domain,
    query: &str,
    limit: usize,
    json: bool,
    timeout: Duration,
) -> biosift::Result<ExitCode> {
    let give_up = Instant::now() + timeout;
    let mut bridge = WorkerBridge::create(domain, config.source(), &config.worker_options())?;

    // The worker answers queued queries once loaded, so sending up front is fine.
    bridge.send(Command::Query(query.to_string()))?;

    let outcome = loop {
        let now = Instant::now();
        if now >= give_up {
            break None;
        }
        let Some(event) = bridge.recv_timeout(give_up - now) else {
            if bridge.has_exited() {
                bridge.shutdown();
                eprintln!("{} the {} worker exited", error_line("search unavailable:"), domain);
                return Ok(ExitCode::from(EXIT_FAILURE));
            }
            continue;
        };
        if json {
            println!("{}", serde_json::to_string(&event)?);
        }
        match event {
            Event::IndexLoaded {
                doc_count,
                term_count,
            } => {
                tracing::debug!(%domain, doc_count, term_count, "index ready");
            }
            Event::IndexLoadFailed { reason } => {
                bridge.shutdown();
                eprintln!("{} {}", error_line("search unavailable:"), reason);
                return Ok(ExitCode::from(EXIT_FAILURE));
            }
            Event::QueryResult(result) if result.query_echo == query => break Some(result),
            Event::QueryResult(stale) => {
                tracing::debug!(echo = %stale.query_echo, "ignoring unrelated result");
            }
        }
    };
    bridge.shutdown();

    let Some(result) = outcome else {
        eprintln!(
            "{} no answer from the {} worker within {:?}",
            error_line("timeout:"),
            domain,
            timeout
        );
        return Ok(ExitCode::from(EXIT_FAILURE));
    };

    if !json {
        print_result(domain, &result, limit);
    }
    if result.no_matches {
        Ok(ExitCode::from(EXIT_NO_MATCHES))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn print_result(domain: Domain, result: &QueryResult, limit: usize) {
    section_top(&format!("{} · \"{}\"", domain, result.query_echo));
    if result.no_matches {
        row(&format!("  {}", dim("no matches")));
    }
    for (rank, id) in result.matching_ids.iter().take(limit).enumerate() {
        row(&format!("  {} {}", pad_left(&format!("{}.", rank + 1), 4), id.as_str()));
    }
    if result.matching_ids.len() > limit {
        row(&format!(
            "  {}",
            dim(&format!("… {} more", result.matching_ids.len() - limit))
        ));
    }
    section_bot();
}
