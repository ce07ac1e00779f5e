use rand::{rngs::StdRng, SeedableRng};
use srsbench_report::dataset::{random_text, split_file, split_lines};
use std::fs;

#[test]
fn test_split_lines_halves_with_ceiling() {
    let mut rng = StdRng::seed_from_u64(42);
    let (a, b) = split_lines((0..7).collect::<Vec<u32>>(), &mut rng);
    assert_eq!(a.len(), 4);
    assert_eq!(b.len(), 3);

    let mut all: Vec<u32> = a.into_iter().chain(b).collect();
    all.sort_unstable();
    assert_eq!(all, (0..7).collect::<Vec<u32>>());
}

#[test]
fn test_split_lines_is_reproducible_per_seed() {
    let lines: Vec<u32> = (0..100).collect();
    let first = split_lines(lines.clone(), &mut StdRng::seed_from_u64(1));
    let again = split_lines(lines.clone(), &mut StdRng::seed_from_u64(1));
    assert_eq!(first, again);
    assert_ne!(first.0, (0..50).collect::<Vec<u32>>(), "lines were not shuffled");
}

#[test]
fn test_split_lines_empty_and_single() {
    let mut rng = StdRng::seed_from_u64(3);
    let (a, b) = split_lines(Vec::<u8>::new(), &mut rng);
    assert!(a.is_empty() && b.is_empty());
    let (a, b) = split_lines(vec!["only"], &mut rng);
    assert_eq!(a, vec!["only"]);
    assert!(b.is_empty());
}

#[test]
fn test_split_file_writes_both_parts() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("narrativeqa.jsonl");
    let lines: Vec<String> = (0..5).map(|i| format!(r#"{{"prompt": "q{i}"}}"#)).collect();
    fs::write(&path, lines.join("\n") + "\n\n").unwrap();

    let outcome = split_file(&path, &mut StdRng::seed_from_u64(9)).unwrap();
    assert_eq!(outcome.total, 5);
    assert_eq!(outcome.part1, dir.path().join("narrativeqa_part1.jsonl"));
    assert_eq!(outcome.part2, dir.path().join("narrativeqa_part2.jsonl"));
    assert_eq!((outcome.part1_len, outcome.part2_len), (3, 2));

    let part1 = fs::read_to_string(&outcome.part1).unwrap();
    let part2 = fs::read_to_string(&outcome.part2).unwrap();
    let mut seen: Vec<&str> = part1.lines().chain(part2.lines()).collect();
    seen.sort_unstable();
    let mut expected: Vec<&str> = lines.iter().map(String::as_str).collect();
    expected.sort_unstable();
    assert_eq!(seen, expected);
}

#[test]
fn test_split_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = split_file(&dir.path().join("missing.jsonl"), &mut StdRng::seed_from_u64(0));
    assert!(matches!(result, Err(srsbench_common::BenchError::Io { .. })));
}

#[test]
fn test_random_text_size_and_alphabet() {
    let mut rng = StdRng::seed_from_u64(42);
    for target in [1, 100, 5_000] {
        let text = random_text(target, &mut rng);
        assert!(text.len() + 1 >= target, "too short: {} for {target}", text.len());
        assert!(text.len() < target + 11, "too long: {} for {target}", text.len());
        for word in text.split(' ') {
            assert!((3..=10).contains(&word.len()), "bad word {word:?}");
            assert!(word.chars().all(|c| c.is_ascii_lowercase()));
        }
    }
    assert!(random_text(0, &mut rng).is_empty());
}
