//! Ranked result list and its CSV serialization.

use std::path::{Path, PathBuf};

use crate::error::Result;

#[derive(Debug, Clone, PartialEq)]
pub struct CandidateScore {
    pub path: PathBuf,
    pub score: i64,
}

/// Sort descending by score, ties broken by path, for deterministic output
/// regardless of the order candidates finished scoring in.
pub fn rank(mut scores: Vec<CandidateScore>) -> Vec<CandidateScore> {
    scores.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.path.cmp(&b.path)));
    scores
}

/// Write the ranked list as `Path,Score` to `output_dir/<query_stem>.csv`.
pub fn write_csv(output_dir: &Path, query_path: &Path, ranked: &[CandidateScore]) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir)?;

    let stem = query_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("query");
    let out_path = output_dir.join(format!("{stem}.csv"));

    let mut writer = csv::Writer::from_path(&out_path)?;
    writer.write_record(["Path", "Score"])?;
    for entry in ranked {
        writer.write_record([entry.path.to_string_lossy().as_ref(), &entry.score.to_string()])?;
    }
    writer.flush()?;

    Ok(out_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rank_orders_by_score_desc_then_path() {
        let scores = vec![
            CandidateScore { path: PathBuf::from("b.wav"), score: 10 },
            CandidateScore { path: PathBuf::from("a.wav"), score: 10 },
            CandidateScore { path: PathBuf::from("c.wav"), score: 20 },
        ];
        let ranked = rank(scores);
        assert_eq!(ranked[0].path, PathBuf::from("c.wav"));
        assert_eq!(ranked[1].path, PathBuf::from("a.wav"));
        assert_eq!(ranked[2].path, PathBuf::from("b.wav"));
    }

    #[test]
    fn write_csv_creates_output_dir_and_header() {
        let tmp = tempfile::tempdir().unwrap();
        let out_dir = tmp.path().join("nested");
        let query = PathBuf::from("my_query.wav");
        let ranked = vec![CandidateScore { path: PathBuf::from("x.wav"), score: 5 }];

        let out_path = write_csv(&out_dir, &query, &ranked).unwrap();
        assert_eq!(out_path, out_dir.join("my_query.csv"));

        let contents = std::fs::read_to_string(out_path).unwrap();
        assert!(contents.starts_with("Path,Score"));
        assert!(contents.contains("x.wav,5"));
    }
}
