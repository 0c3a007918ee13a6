//! Drives a full match run: fingerprints the query, scans and scores every
//! candidate in parallel, and returns a deterministically ranked list.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use rayon::prelude::*;
use walkdir::WalkDir;

use crate::audio::decode::DecoderRegistry;
use crate::error::{MatchError, Result};
use crate::fingerprint::params::{samples_per_window, CANONICAL_SAMPLE_RATE, PROGRESS_STEP};
use crate::fingerprint::{build_fingerprint, Fingerprint};
use crate::matcher::max_score;
use crate::preprocess::{preprocess_channel, select_streams};
use crate::progress::ProgressSink;
use crate::result::{rank, CandidateScore};

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub channel_indices: Option<Vec<usize>>,
    pub force_mono: bool,
    pub threads: Option<usize>,
}

pub struct RunOutcome {
    pub ranked: Vec<CandidateScore>,
    pub cancelled: bool,
}

/// Run one full query-against-directory match pass.
pub fn run(
    query_path: &Path,
    candidate_dir: &Path,
    options: &RunOptions,
    progress: &dyn ProgressSink,
    cancel: &AtomicBool,
) -> Result<RunOutcome> {
    let registry = DecoderRegistry::new();

    tracing::info!(
        query = %query_path.display(),
        candidates = %candidate_dir.display(),
        "starting match run"
    );

    let buffer = registry.decode(query_path)?;
    let streams = select_streams(&buffer, options.channel_indices.as_deref(), options.force_mono);

    let mut query_fps = Vec::with_capacity(streams.len());
    for stream in &streams {
        let preprocessed = preprocess_channel(stream, buffer.sample_rate)?;
        if preprocessed.len() < samples_per_window(CANONICAL_SAMPLE_RATE) {
            return Err(MatchError::EmptyAfterTrim {
                path: query_path.to_path_buf(),
            });
        }
        tracing::debug!(samples = preprocessed.len(), "query channel preprocessed");
        query_fps.push(build_fingerprint(&preprocessed, CANONICAL_SAMPLE_RATE)?);
    }

    let mut candidates: Vec<PathBuf> = WalkDir::new(candidate_dir)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            entry
                .path()
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| ext.eq_ignore_ascii_case("wav"))
                .unwrap_or(false)
        })
        .map(|entry| entry.path().to_path_buf())
        .collect();
    candidates.sort();

    let total = candidates.len();
    if total == 0 {
        progress.on_finished();
        return Ok(RunOutcome {
            ranked: Vec::new(),
            cancelled: false,
        });
    }

    let completed = AtomicUsize::new(0);
    let last_step = Mutex::new(0.0_f64);
    let cancelled_flag = AtomicBool::new(false);

    let scores = match options.threads {
        Some(n) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(n)
                .build()
                .map_err(|e| MatchError::ParameterInvalid(e.to_string()))?;
            pool.install(|| {
                score_candidates(
                    &candidates,
                    &registry,
                    &query_fps,
                    progress,
                    cancel,
                    &completed,
                    &last_step,
                    total,
                    &cancelled_flag,
                )
            })
        }
        None => score_candidates(
            &candidates,
            &registry,
            &query_fps,
            progress,
            cancel,
            &completed,
            &last_step,
            total,
            &cancelled_flag,
        ),
    };

    progress.on_finished();

    let cancelled = cancelled_flag.load(Ordering::Relaxed);
    if cancelled {
        tracing::warn!("run cancelled; returning partial results");
    }

    let ranked = rank(scores);
    tracing::info!(candidates = ranked.len(), "run finished");
    Ok(RunOutcome { ranked, cancelled })
}

#[allow(clippy::too_many_arguments)]
fn score_candidates(
    candidates: &[PathBuf],
    registry: &DecoderRegistry,
    query_fps: &[Fingerprint],
    progress: &dyn ProgressSink,
    cancel: &AtomicBool,
    completed: &AtomicUsize,
    last_step: &Mutex<f64>,
    total: usize,
    cancelled_flag: &AtomicBool,
) -> Vec<CandidateScore> {
    candidates
        .par_iter()
        .enumerate()
        .map(|(index, path)| {
            if cancel.load(Ordering::Relaxed) {
                cancelled_flag.store(true, Ordering::Relaxed);
                return CandidateScore {
                    path: path.clone(),
                    score: 0,
                };
            }

            let score = score_one(registry, query_fps, path).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "skipping candidate");
                0
            });

            progress.on_match(index, path, score);

            let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
            let fraction = done as f64 / total as f64;
            let mut last = last_step.lock().unwrap();
            if fraction - *last >= PROGRESS_STEP || done == total {
                *last = fraction;
                progress.on_progress(fraction.min(1.0));
            }

            CandidateScore {
                path: path.clone(),
                score,
            }
        })
        .collect()
}

fn score_one(registry: &DecoderRegistry, query_fps: &[Fingerprint], path: &Path) -> Result<i64> {
    let buffer = registry.decode(path)?;
    let channel = buffer
        .channels
        .first()
        .ok_or_else(|| MatchError::DecodeFailed {
            path: path.to_path_buf(),
            reason: "no channels".to_string(),
        })?;
    let preprocessed = preprocess_channel(channel, buffer.sample_rate)?;
    if preprocessed.len() < samples_per_window(CANONICAL_SAMPLE_RATE) {
        return Err(MatchError::EmptyAfterTrim {
            path: path.to_path_buf(),
        });
    }
    let fp = build_fingerprint(&preprocessed, CANONICAL_SAMPLE_RATE)?;
    Ok(query_fps.iter().map(|q| max_score(q, &fp)).max().unwrap_or(0))
}
