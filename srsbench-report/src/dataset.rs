use rand::seq::SliceRandom;
use rand::Rng;
use std::path::{Path, PathBuf};
use tracing::info;

use srsbench_common::{BenchError, Result};

/// Shortest and longest random word, in letters.
pub const WORD_LEN: std::ops::RangeInclusive<usize> = 3..=10;

/// Paths and sizes produced by [`split_file`].
#[derive(Debug, Clone, PartialEq)]
pub struct SplitOutcome {
    pub total: usize,
    pub part1: PathBuf,
    pub part1_len: usize,
    pub part2: PathBuf,
    pub part2_len: usize,
}

/// Shuffle `lines` and split them in two; the first half gets `ceil(n / 2)`.
pub fn split_lines<T>(mut lines: Vec<T>, rng: &mut impl Rng) -> (Vec<T>, Vec<T>) {
    lines.shuffle(rng);
    let half = lines.len().div_ceil(2);
    let second = lines.split_off(half);
    (lines, second)
}

/// Split a JSONL prompt file into `<stem>_part1.jsonl` and `<stem>_part2.jsonl`
/// next to it, so two replicas can each replay a disjoint half of the workload.
pub fn split_file(path: &Path, rng: &mut impl Rng) -> Result<SplitOutcome> {
    let content = std::fs::read_to_string(path).map_err(|e| BenchError::io(path, e))?;
    let lines: Vec<&str> = content.lines().filter(|l| !l.trim().is_empty()).collect();
    let total = lines.len();
    let (first, second) = split_lines(lines, rng);

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .ok_or_else(|| BenchError::InvalidArgument(format!("{} has no file name", path.display())))?;
    let part1 = path.with_file_name(format!("{stem}_part1.jsonl"));
    let part2 = path.with_file_name(format!("{stem}_part2.jsonl"));

    write_lines(&part1, &first)?;
    write_lines(&part2, &second)?;
    info!(total, part1 = first.len(), part2 = second.len(), "prompt file split");

    Ok(SplitOutcome {
        total,
        part1,
        part1_len: first.len(),
        part2,
        part2_len: second.len(),
    })
}

/// Space-separated random lowercase words totalling roughly `target_bytes`.
///
/// Words are added while the running size, counting one separator per word,
/// is below the target; the result is therefore at least `target_bytes - 1`
/// bytes long.
pub fn random_text(target_bytes: usize, rng: &mut impl Rng) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut size = 0;
    while size < target_bytes {
        let len = rng.gen_range(WORD_LEN);
        let word: String = (0..len).map(|_| rng.gen_range(b'a'..=b'z') as char).collect();
        size += word.len() + 1;
        words.push(word);
    }
    words.join(" ")
}

fn write_lines(path: &Path, lines: &[&str]) -> Result<()> {
    let mut body = lines.join("\n");
    if !lines.is_empty() {
        body.push('\n');
    }
    std::fs::write(path, body).map_err(|e| BenchError::io(path, e))
}
