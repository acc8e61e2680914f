use search_core::persist::{load_index, load_snippet, publish_index, IndexPaths, MetaFile};
use search_core::{Document, Index, IndexError};
use std::fs;
use tempfile::tempdir;

fn corpus() -> Vec<Document> {
    vec![
        Document {
            title: "Coin Change".into(),
            url: Some("https://leetcode.com/problems/coin-change/".into()),
            body: "Coin Change\n\nReturn the fewest number of coins needed to make up 11.".into(),
        },
        Document {
            title: "Pattern\nMatch".into(),
            url: None,
            body: "Count subarrays of an array that match a pattern.".into(),
        },
    ]
}

fn publish(root: &std::path::Path) -> Index {
    let docs = corpus();
    let index = Index::build(&docs).unwrap();
    let texts: Vec<&str> = docs.iter().map(|d| d.body.as_str()).collect();
    let meta = MetaFile::for_index(&index, "2024-01-01T00:00:00Z".into());
    publish_index(&IndexPaths::new(root), &index, &texts, &meta).unwrap();
    index
}

#[test]
fn round_trip_preserves_ranking() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("index");
    let built = publish(&root);
    let loaded = load_index(&IndexPaths::new(&root)).unwrap();

    assert_eq!(loaded.vocabulary(), built.vocabulary());
    assert_eq!(loaded.num_docs(), 2);
    assert_eq!(loaded.doc(2).unwrap().title, "Pattern Match");
    assert_eq!(loaded.doc(2).unwrap().url, None);

    let a = built.search("minimum coins", None);
    let b = loaded.search("minimum coins", None);
    assert_eq!(a.len(), b.len());
    assert_eq!(a[0].doc_id, b[0].doc_id);
    assert!((a[0].score - b[0].score).abs() <= 1e-4);
}

#[test]
fn tfidf_file_uses_one_based_ordinals() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("index");
    publish(&root);
    let tfidf = fs::read_to_string(root.join("tfidf.txt")).unwrap();
    let first = tfidf.lines().next().unwrap();
    let fields: Vec<&str> = first.split_whitespace().collect();
    assert_eq!(fields[0], "1");
    assert_eq!(fields[2].split('.').nth(1).unwrap().len(), 6);
    assert!(tfidf.lines().all(|l| !l.starts_with("0 ")));
}

#[test]
fn republishing_unchanged_corpus_is_byte_identical() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("index");
    publish(&root);
    let files = ["keywords.txt", "idf.txt", "tfidf.txt", "magnitude.txt"];
    let before: Vec<Vec<u8>> = files.iter().map(|f| fs::read(root.join(f)).unwrap()).collect();
    publish(&root);
    let after: Vec<Vec<u8>> = files.iter().map(|f| fs::read(root.join(f)).unwrap()).collect();
    assert_eq!(before, after);
    assert!(!dir.path().join(".index.staging").exists());
    assert!(!dir.path().join(".index.old").exists());
}

#[test]
fn missing_artifact_is_reported() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("index");
    publish(&root);
    fs::remove_file(root.join("magnitude.txt")).unwrap();
    let err = load_index(&IndexPaths::new(&root)).unwrap_err();
    assert!(matches!(err, IndexError::MissingArtifact { ref path, .. } if path.ends_with("magnitude.txt")));
}

#[test]
fn truncated_idf_is_a_size_mismatch() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("index");
    publish(&root);
    let idf = fs::read_to_string(root.join("idf.txt")).unwrap();
    let shorter: String = idf.lines().skip(1).map(|l| format!("{l}\n")).collect();
    fs::write(root.join("idf.txt"), shorter).unwrap();
    let err = load_index(&IndexPaths::new(&root)).unwrap_err();
    assert!(matches!(err, IndexError::ArtifactSizeMismatch { artifact: "idf", .. }));
}

#[test]
fn out_of_range_term_is_a_size_mismatch() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("index");
    let index = publish(&root);
    let mut tfidf = fs::read_to_string(root.join("tfidf.txt")).unwrap();
    tfidf.push_str(&format!("1 {} 0.500000\n", index.vocabulary().len()));
    fs::write(root.join("tfidf.txt"), tfidf).unwrap();
    let err = load_index(&IndexPaths::new(&root)).unwrap_err();
    assert!(matches!(err, IndexError::ArtifactSizeMismatch { artifact: "tfidf term index", .. }));
}

#[test]
fn extra_magnitude_is_a_size_mismatch() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("index");
    publish(&root);
    let mut mags = fs::read_to_string(root.join("magnitude.txt")).unwrap();
    mags.push_str("1.000000\n");
    fs::write(root.join("magnitude.txt"), mags).unwrap();
    let err = load_index(&IndexPaths::new(&root)).unwrap_err();
    assert!(matches!(err, IndexError::ArtifactSizeMismatch { artifact: "magnitudes", .. }));
}

#[test]
fn missing_title_is_a_size_mismatch() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("index");
    publish(&root);
    let titles = fs::read_to_string(root.join("titles.txt")).unwrap();
    let first: String = titles.lines().take(1).map(|l| format!("{l}\n")).collect();
    fs::write(root.join("titles.txt"), first).unwrap();
    let err = load_index(&IndexPaths::new(&root)).unwrap_err();
    assert!(matches!(err, IndexError::ArtifactSizeMismatch { artifact: "titles", expected: 2, found: 1 }));
}

#[test]
fn extra_url_is_a_size_mismatch() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("index");
    publish(&root);
    let mut urls = fs::read_to_string(root.join("urls.txt")).unwrap();
    urls.push_str("https://leetcode.com/problems/two-sum/\n");
    fs::write(root.join("urls.txt"), urls).unwrap();
    let err = load_index(&IndexPaths::new(&root)).unwrap_err();
    assert!(matches!(err, IndexError::ArtifactSizeMismatch { artifact: "urls", expected: 2, found: 3 }));
}

#[test]
fn repeated_tfidf_cell_is_rejected() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("index");
    publish(&root);
    let mut tfidf = fs::read_to_string(root.join("tfidf.txt")).unwrap();
    let first = tfidf.lines().next().unwrap().to_string();
    tfidf.push_str(&format!("{first}\n"));
    fs::write(root.join("tfidf.txt"), tfidf).unwrap();
    let err = load_index(&IndexPaths::new(&root)).unwrap_err();
    assert!(matches!(err, IndexError::DuplicateCell { doc_id: 1, .. }));
}

#[test]
fn garbage_weight_is_malformed() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("index");
    publish(&root);
    fs::write(root.join("tfidf.txt"), "1 0 abc\n").unwrap();
    let err = load_index(&IndexPaths::new(&root)).unwrap_err();
    assert!(matches!(err, IndexError::MalformedArtifact { line: 1, .. }));
}

#[test]
fn snippets_are_optional() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("index");
    publish(&root);
    let paths = IndexPaths::new(&root);
    assert_eq!(load_snippet(&paths, 1, 11).unwrap().as_deref(), Some("Coin Change..."));
    assert!(load_snippet(&paths, 2, 300).unwrap().unwrap().starts_with("Count subarrays"));
    assert_eq!(load_snippet(&paths, 3, 300).unwrap(), None);
}

#[test]
fn unreadable_snippet_is_an_error() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("index");
    publish(&root);
    fs::write(root.join("texts").join("1.txt"), [0xff, 0xfe, 0x00]).unwrap();
    let err = load_snippet(&IndexPaths::new(&root), 1, 300).unwrap_err();
    assert!(matches!(err, IndexError::Io(_)));
}
