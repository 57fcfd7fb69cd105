use proptest::prelude::*;
use rhymewalk_lang::PhoneticTable;
use rhymewalk_lang::rhyme::{count_rhyme, length_ratio};

fn kana_line() -> impl Strategy<Value = String> {
    // Mix of hiragana, katakana, marks, and noise the table must skip.
    proptest::string::string_regex("[あ-んア-ンーっ、 a-z野球]{0,16}").unwrap()
}

proptest! {
    #[test]
    fn count_rhyme_is_symmetric(a in kana_line(), b in kana_line()) {
        let table = PhoneticTable::kana();
        let va = table.vowels(&a);
        let vb = table.vowels(&b);
        prop_assert_eq!(count_rhyme(&va, &vb), count_rhyme(&vb, &va));
    }

    #[test]
    fn line_fully_rhymes_with_itself(a in kana_line()) {
        let table = PhoneticTable::kana();
        let va = table.vowels(&a);
        prop_assert_eq!(count_rhyme(&va, &va), va.len());
    }

    #[test]
    fn rhyme_never_exceeds_shorter_line(a in kana_line(), b in kana_line()) {
        let table = PhoneticTable::kana();
        let va = table.vowels(&a);
        let vb = table.vowels(&b);
        prop_assert!(count_rhyme(&va, &vb) <= va.len().min(vb.len()));
    }

    #[test]
    fn length_ratio_is_bounded_and_symmetric(a in kana_line(), b in kana_line()) {
        let r = length_ratio(&a, &b);
        prop_assert!((0.0..=1.0).contains(&r));
        prop_assert_eq!(r, length_ratio(&b, &a));
        prop_assert_eq!(length_ratio(&a, &a), 1.0);
    }
}

#[test]
fn fixed_table_ranks_by_tail_vowels() {
    use rhymewalk_lang::rhyme::most_rhyming;

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
    let anchor = table.vowels("abc");
    let candidates: Vec<String> = ["xyz", "abz", "qrc"]
        .iter()
        .map(|s| s.to_string())
        .collect();

    let ranked = most_rhyming(&anchor, &candidates, 3, |c| table.vowels(c));
    // abz shares 3 trailing vowels, qrc 2, xyz 1.
    assert_eq!(ranked, vec!["abz", "qrc", "xyz"]);
}
