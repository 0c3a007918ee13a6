mod cli;

use std::path::Path;
use std::sync::atomic::AtomicBool;

use anyhow::Context;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use audio_clip_finder::orchestrator::{self, RunOptions};
use audio_clip_finder::progress::ProgressSink;
use audio_clip_finder::result;

struct CliProgress {
    bar: ProgressBar,
}

impl ProgressSink for CliProgress {
    fn on_progress(&self, fraction: f64) {
        self.bar.set_position((fraction * 1000.0).round() as u64);
    }

    fn on_match(&self, index: usize, path: &Path, score: i64) {
        tracing::debug!(index, path = %path.display(), score, "candidate scored");
        self.bar.set_message(format!("{}", path.display()));
    }

    fn on_finished(&self) {
        self.bar.finish_with_message("done");
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    init_logging(cli.verbose);

    let options = RunOptions {
        channel_indices: cli.channels.clone(),
        force_mono: cli.force_mono,
        threads: cli.threads,
    };

    let bar = ProgressBar::new(1000);
    bar.set_style(
        ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-"),
    );
    let sink = CliProgress { bar };
    let cancel = AtomicBool::new(false);

    let outcome = orchestrator::run(&cli.query, &cli.candidates, &options, &sink, &cancel)
        .with_context(|| {
            format!(
                "matching {} against {}",
                cli.query.display(),
                cli.candidates.display()
            )
        })?;

    let out_path = result::write_csv(&cli.output, &cli.query, &outcome.ranked)
        .context("writing result CSV")?;
    println!("Wrote {}", out_path.display());

    println!("Top matches:");
    for (i, entry) in outcome.ranked.iter().take(5).enumerate() {
        println!("{}. {} ({})", i + 1, entry.path.display(), entry.score);
    }

    if outcome.cancelled {
        eprintln!("run was cancelled; results above are partial");
    }

    Ok(())
}
