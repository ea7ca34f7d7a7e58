use std::path::Path;

use morph_corpus::{EvalInputs, ExampleRecord, InputPaths, LoadMode, Score};
use morph_types::{FreqBand, Side};

fn write_inputs(dir: &Path, translations: &str, meta: &str, scores: &str) -> InputPaths {
    let paths = InputPaths::new(
        dir.join("translations.txt"),
        dir.join("meta.tsv"),
        dir.join("scores.txt"),
    );
    std::fs::write(&paths.translations, translations).unwrap();
    std::fs::write(&paths.meta_info, meta).unwrap();
    std::fs::write(&paths.scores, scores).unwrap();
    paths
}

#[test]
fn yields_aligned_triples_in_both_modes() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_inputs(
        dir.path(),
        "ein bico haus\r\nzwei tedubo\n",
        "sona_surface-bico\tsrc-0-x:bico\nsaxuj_surface-tedubo\ttrg-700-x:tedubo\n",
        "-inf\n-3.25\n",
    );

    for mode in [LoadMode::Mmap, LoadMode::Owned] {
        let inputs = EvalInputs::load_with_mode(&paths, mode).expect("load inputs");
        assert_eq!(inputs.len(), 2);
        let triples: Vec<_> = inputs.triples().map(|t| t.unwrap()).collect();
        assert_eq!(triples[0].line, 1);
        assert_eq!(triples[0].translation, "ein bico haus");
        assert_eq!(triples[1].line, 2);

        let record = ExampleRecord::parse(triples[1].meta).unwrap();
        assert_eq!(record.side, Side::Target);
        assert_eq!(record.freq_band, Some(FreqBand::FiveHundredOneToThousand));
        assert_eq!(Score::parse(triples[1].score), Ok(Score::Augmented(-3.25)));
    }
}

#[test]
fn stops_at_the_shortest_input() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_inputs(
        dir.path(),
        "a\nb\nc\n",
        "p_surface-x\tsrc-0-x:a\np_surface-x\tsrc-0-x:b\n",
        "-inf\n-inf\n-inf\n",
    );
    let inputs = EvalInputs::load(&paths).unwrap();
    assert_eq!(inputs.line_counts(), [3, 2, 3]);
    assert_eq!(inputs.triples().count(), 2);
}

#[test]
fn empty_inputs_have_no_triples() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_inputs(dir.path(), "", "", "");
    let inputs = EvalInputs::load(&paths).unwrap();
    assert!(inputs.is_empty());
    assert_eq!(inputs.triples().count(), 0);
}

#[test]
fn missing_file_names_the_path() {
    let dir = tempfile::tempdir().unwrap();
    let paths = InputPaths::new(
        dir.path().join("nope.txt"),
        dir.path().join("meta.tsv"),
        dir.path().join("scores.txt"),
    );
    let err = EvalInputs::load_with_mode(&paths, LoadMode::Owned)
        .err()
        .expect("missing file must fail");
    assert!(format!("{err:#}").contains("nope.txt"));
}
