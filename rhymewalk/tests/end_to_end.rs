// End-to-end generation over small in-memory corpora.

use rhymewalk::chain::{BEGIN, END};
use rhymewalk::config::Baseline;
use rhymewalk::{
    AnchorPhrases, CandidateExpander, ChainEntry, ChainFile, ChainSource, ChainTable,
    EmbeddingScorer, GenerateError, GenerateRequest, GeneratorConfig, InputError, Mode,
    RhymeDistanceMeter, VectorTable, VerseGenerator,
};
use rhymewalk_lang::{LexiconTagger, PhoneticTable, Tagger};
use rhymewalk_prng::WalkRng;
use std::collections::BTreeMap;
use std::sync::Arc;

const LEXICON: &str = r#"{"entries": [
    {"surface": "夏", "feature": "名詞,一般,*,*,*,*,夏,ナツ"},
    {"surface": "の", "feature": "助詞,連体化,*,*,*,*,の,ノ"},
    {"surface": "空", "feature": "名詞,一般,*,*,*,*,空,ソラ"},
    {"surface": "青い", "feature": "形容詞,自立,*,*,形容詞・アウオ段,基本形,青い,アオイ"},
    {"surface": "花", "feature": "名詞,一般,*,*,*,*,花,ハナ"},
    {"surface": "遠い", "feature": "形容詞,自立,*,*,形容詞・アウオ段,基本形,遠い,トオイ"},
    {"surface": "夢", "feature": "名詞,一般,*,*,*,*,夢,ユメ"},
    {"surface": "野球", "feature": "名詞,一般,*,*,*,*,野球,ヤキュウ"}
]}"#;

/// Trigram table of the given tokenized lines, counting repeats.
fn chain_from_lines(lines: &[&[&str]]) -> ChainTable {
    let mut counts: BTreeMap<(String, String, String), u32> = BTreeMap::new();
    let mut order = Vec::new();
    for line in lines {
        let mut tokens = vec![BEGIN];
        tokens.extend_from_slice(line);
        tokens.push(END);
        for w in tokens.windows(3) {
            let key = (w[0].to_string(), w[1].to_string(), w[2].to_string());
            let count = counts.entry(key.clone()).or_insert(0);
            if *count == 0 {
                order.push(key);
            }
            *count += 1;
        }
    }
    let entries = order
        .into_iter()
        .map(|key| {
            let frequency = counts[&key];
            let (context1, context2, next) = key;
            ChainEntry {
                context1,
                context2,
                next,
                frequency,
            }
        })
        .collect();
    ChainTable::from_entries(entries).unwrap()
}

fn corpus() -> ChainTable {
    chain_from_lines(&[
        &["夏", "の", "空"],
        &["青い", "空", "の", "花"],
        &["遠い", "夢"],
    ])
}

fn vectors() -> VectorTable {
    let mut t = VectorTable::new(3);
    for (token, v) in [
        ("夏", [1.0, 0.2, 0.0]),
        ("空", [0.8, 0.6, 0.1]),
        ("花", [0.6, 0.8, 0.2]),
        ("夢", [0.2, 0.4, 1.0]),
        ("野球", [1.0, 0.0, 0.3]),
    ] {
        t.insert(token, v.to_vec()).unwrap();
    }
    t
}

fn generator<S: ChainSource>(
    source: S,
    table: PhoneticTable,
    lexicon: &str,
    anchors: &[&str],
    config: &GeneratorConfig,
) -> VerseGenerator<S> {
    let tagger: Arc<dyn Tagger> = Arc::new(LexiconTagger::from_json(lexicon).unwrap());
    let vectors = Arc::new(vectors());
    let scorer = Arc::new(EmbeddingScorer::new(
        vectors.clone(),
        tagger.clone(),
        Baseline::default(),
    ));
    let meter = RhymeDistanceMeter::new(table, tagger.clone(), scorer, config.theme_word.clone());
    let expander = CandidateExpander::new(tagger, vectors, config);
    let anchors = AnchorPhrases::new(anchors.iter().map(|s| s.to_string()).collect())
        .unwrap();
    VerseGenerator::new(source, expander, meter, anchors, config)
}

#[test]
fn forward_generation_from_content_word() {
    let table = ChainTable::from_entries(vec![
        ChainEntry {
            context1: BEGIN.to_string(),
            context2: "a".to_string(),
            next: "b".to_string(),
            frequency: 1,
        },
        ChainEntry {
            context1: "a".to_string(),
            context2: "b".to_string(),
            next: END.to_string(),
            frequency: 1,
        },
    ])
    .unwrap();
    let config = GeneratorConfig::default();
    let generator = generator(
        table,
        PhoneticTable::kana(),
        r#"{"entries": []}"#,
        &["あ"],
        &config,
    );
    let request = GenerateRequest::new("a", Mode::Forward);
    let verse = generator.generate(&request, &mut WalkRng::new(1)).unwrap();
    assert_eq!(verse.text, "ab");
    assert_eq!(verse.distance, None);
    assert!(verse.candidates.is_empty());
}

#[test]
fn most_rhyming_with_fixed_vowel_table() {
    let config = GeneratorConfig::default();
    let table = PhoneticTable::from_pairs([
        ("a", "ka"),
        ("b", "bo"),
        ("c", "ki"),
        ("x", "ku"),
        ("y", "ke"),
        ("z", "mi"),
        ("q", "su"),
        ("r", "ro"),
    ]);
    let generator = generator(corpus(), table, r#"{"entries": []}"#, &["あ"], &config);
    let meter = generator.meter();
    let candidates: Vec<String> = ["xyz", "abz", "qrc"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    assert_eq!(meter.count_rhyme("abc", "abz"), 3);
    assert_eq!(meter.count_rhyme("abc", "qrc"), 2);
    assert_eq!(meter.count_rhyme("abc", "xyz"), 1);
    assert_eq!(
        meter.most_rhyming("abc", &candidates, 3),
        vec!["abz", "qrc", "xyz"]
    );
}

#[test]
fn reverse_generation_selects_best_candidate() {
    let config = GeneratorConfig::default();
    let anchor = "青い空の花";
    let generator = generator(corpus(), PhoneticTable::kana(), LEXICON, &[anchor], &config);
    let request = GenerateRequest::new("夏の夢", Mode::Reverse);
    let verse = generator.generate(&request, &mut WalkRng::new(42)).unwrap();

    assert_eq!(verse.anchor.as_deref(), Some(anchor));
    assert!(!verse.candidates.is_empty());
    let max = verse.candidates.iter().map(|c| c.distance).max().unwrap();
    let first_best = verse.candidates.iter().find(|c| c.distance == max).unwrap();
    assert_eq!(verse.distance, Some(max));
    assert_eq!(verse.text, format!("{}\n{}", first_best.text, anchor));

    let lines = ["夏の空", "青い空", "青い空の花", "遠い夢"];
    for candidate in &verse.candidates {
        assert!(lines.contains(&candidate.text.as_str()), "{}", candidate.text);
        assert!(!candidate.text.contains(BEGIN) && !candidate.text.contains(END));
    }
}

#[test]
fn reverse_generation_is_deterministic_across_parallelism() {
    let sequential = GeneratorConfig::default();
    let parallel = GeneratorConfig {
        parallel: true,
        ..GeneratorConfig::default()
    };
    let anchors = ["青い空の花", "遠い夢", "夏の空"];
    let request = GenerateRequest::new("夏の青い夢", Mode::Reverse);

    let a = generator(corpus(), PhoneticTable::kana(), LEXICON, &anchors, &sequential)
        .generate(&request, &mut WalkRng::new(7))
        .unwrap();
    let b = generator(corpus(), PhoneticTable::kana(), LEXICON, &anchors, &parallel)
        .generate(&request, &mut WalkRng::new(7))
        .unwrap();
    assert_eq!(a, b);
}

#[test]
fn all_candidates_failed_when_every_walk_breaks() {
    // Every backward walk dead-ends one step after its line end.
    let broken = ChainTable::from_entries(vec![ChainEntry {
        context1: "x".to_string(),
        context2: "y".to_string(),
        next: END.to_string(),
        frequency: 1,
    }])
    .unwrap();
    let config = GeneratorConfig::default();
    let generator = generator(broken, PhoneticTable::kana(), LEXICON, &["夢"], &config);
    let request = GenerateRequest::new("夏の夢", Mode::Reverse);
    let err = generator
        .generate(&request, &mut WalkRng::new(1))
        .unwrap_err();
    assert!(matches!(err, GenerateError::AllCandidatesFailed { attempted } if attempted >= 2));
}

#[test]
fn verse_without_content_words_has_no_candidates() {
    let config = GeneratorConfig::default();
    let generator = generator(corpus(), PhoneticTable::kana(), LEXICON, &["夢"], &config);
    let request = GenerateRequest::new("の", Mode::Reverse);
    let err = generator
        .generate(&request, &mut WalkRng::new(1))
        .unwrap_err();
    assert!(matches!(err, GenerateError::AllCandidatesFailed { attempted: 0 }));
}

#[test]
fn stalled_walks_are_skipped_not_fatal() {
    // "夢" walks back into a loop. Seeds that start from a line end almost
    // always pick the heavy one-token line "空".
    let mut entries = corpus_entries_with_cycle();
    entries.push(ChainEntry {
        context1: BEGIN.to_string(),
        context2: "空".to_string(),
        next: END.to_string(),
        frequency: 1000,
    });
    let table = ChainTable::from_entries(entries).unwrap();
    let config = GeneratorConfig {
        max_walk_steps: 8,
        ..GeneratorConfig::default()
    };
    let generator = generator(table, PhoneticTable::kana(), LEXICON, &["空"], &config);
    let request = GenerateRequest::new("夢の空", Mode::Reverse);
    let verse = generator.generate(&request, &mut WalkRng::new(3)).unwrap();
    assert!(verse.candidates.iter().all(|c| c.seed != "夢"));
    assert!(verse.candidates.iter().any(|c| c.text == "空"));
}

fn corpus_entries_with_cycle() -> Vec<ChainEntry> {
    let entry = |c1: &str, c2: &str, next: &str| ChainEntry {
        context1: c1.to_string(),
        context2: c2.to_string(),
        next: next.to_string(),
        frequency: 1,
    };
    vec![
        entry("花", "夢", END),
        entry("夢", "花", "夢"),
        entry("花", "夢", "花"),
    ]
}

#[test]
fn expired_deadline_stops_reverse_generation() {
    let config = GeneratorConfig {
        request_timeout_ms: Some(0),
        ..GeneratorConfig::default()
    };
    let generator = generator(corpus(), PhoneticTable::kana(), LEXICON, &["夢"], &config);
    let request = GenerateRequest::new("夏の夢", Mode::Reverse);
    let err = generator
        .generate(&request, &mut WalkRng::new(1))
        .unwrap_err();
    assert!(matches!(err, GenerateError::DeadlineExceeded(budget) if budget.is_zero()));
    assert!(err.is_retryable());
}

#[test]
fn missing_chain_store_is_fatal() {
    let config = GeneratorConfig::default();
    let generator = generator(
        ChainFile::new("/nonexistent/rhymewalk/chain.json"),
        PhoneticTable::kana(),
        LEXICON,
        &["夢"],
        &config,
    );
    let request = GenerateRequest::new("夏の夢", Mode::Reverse);
    let err = generator
        .generate(&request, &mut WalkRng::new(1))
        .unwrap_err();
    assert!(matches!(err, GenerateError::MissingChainStore { .. }));
}

#[test]
fn missing_verse_is_rejected_before_generation() {
    let config = GeneratorConfig::default();
    let generator = generator(
        ChainFile::new("/nonexistent/rhymewalk/chain.json"),
        PhoneticTable::kana(),
        LEXICON,
        &["夢"],
        &config,
    );
    let request = GenerateRequest {
        verse: None,
        mode: Mode::Reverse,
    };
    let err = generator
        .generate(&request, &mut WalkRng::new(1))
        .unwrap_err();
    assert!(matches!(err, GenerateError::Input(InputError::MissingVerse)));
}
