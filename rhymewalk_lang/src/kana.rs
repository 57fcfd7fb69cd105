// Table-driven romanization of kana into consonant-vowel syllable units.
//
// Rhyme in rhymewalk is purely vowel-based: two lines rhyme to the extent
// their vowel sequences agree. This module owns the only phonetic system
// the project supports, a Hepburn-style kana table, plus the hooks needed
// to build small fixed tables (used by tests and by callers with another
// romanization scheme).
//
// Rules applied during `romanize`:
// - Longest match wins, so digraphs (`きゃ` -> `kya`) beat their parts.
// - `ん` is a nasal final `n`; its vowel slot is `n`, so it counts as a mora.
// - `っ` (geminate) emits a vowelless unit doubling the next consonant.
// - `ー` (long vowel) repeats the previous unit's vowel.
// - Characters with no mapping (punctuation, kanji without a reading,
//   whitespace) emit nothing. Romanization is total over any input.
//
// Hiragana and katakana share one table: katakana keys are derived from the
// hiragana keys by the fixed Unicode offset between the two blocks.

use std::collections::BTreeMap;

/// Vowels recognized at the end of a romaji syllable.
const VOWELS: &[char] = &['a', 'i', 'u', 'e', 'o'];
/// Vowel slot assigned to the nasal final.
pub const NASAL: char = 'n';

/// Offset from a hiragana code point to its katakana counterpart.
const KATAKANA_OFFSET: u32 = 0x60;

#[rustfmt::skip]
const MONOGRAPHS: &[(&str, &str)] = &[
    ("あ", "a"), ("い", "i"), ("う", "u"), ("え", "e"), ("お", "o"),
    ("か", "ka"), ("き", "ki"), ("く", "ku"), ("け", "ke"), ("こ", "ko"),
    ("が", "ga"), ("ぎ", "gi"), ("ぐ", "gu"), ("げ", "ge"), ("ご", "go"),
    ("さ", "sa"), ("し", "shi"), ("す", "su"), ("せ", "se"), ("そ", "so"),
    ("ざ", "za"), ("じ", "ji"), ("ず", "zu"), ("ぜ", "ze"), ("ぞ", "zo"),
    ("た", "ta"), ("ち", "chi"), ("つ", "tsu"), ("て", "te"), ("と", "to"),
    ("だ", "da"), ("ぢ", "ji"), ("づ", "zu"), ("で", "de"), ("ど", "do"),
    ("な", "na"), ("に", "ni"), ("ぬ", "nu"), ("ね", "ne"), ("の", "no"),
    ("は", "ha"), ("ひ", "hi"), ("ふ", "fu"), ("へ", "he"), ("ほ", "ho"),
    ("ば", "ba"), ("び", "bi"), ("ぶ", "bu"), ("べ", "be"), ("ぼ", "bo"),
    ("ぱ", "pa"), ("ぴ", "pi"), ("ぷ", "pu"), ("ぺ", "pe"), ("ぽ", "po"),
    ("ま", "ma"), ("み", "mi"), ("む", "mu"), ("め", "me"), ("も", "mo"),
    ("や", "ya"), ("ゆ", "yu"), ("よ", "yo"),
    ("ら", "ra"), ("り", "ri"), ("る", "ru"), ("れ", "re"), ("ろ", "ro"),
    ("わ", "wa"), ("ゐ", "i"), ("ゑ", "e"), ("を", "o"), ("ん", "n"),
    ("ゔ", "vu"),
    ("ぁ", "a"), ("ぃ", "i"), ("ぅ", "u"), ("ぇ", "e"), ("ぉ", "o"),
    ("ゃ", "ya"), ("ゅ", "yu"), ("ょ", "yo"), ("ゎ", "wa"),
];

/// Kana that combine with a small `ゃゅょ` (and sometimes `ぇ`) into one
/// syllable, with the consonant cluster they contribute.
#[rustfmt::skip]
const PALATAL_HEADS: &[(&str, &str)] = &[
    ("き", "ky"), ("ぎ", "gy"), ("し", "sh"), ("じ", "j"), ("ち", "ch"),
    ("ぢ", "j"), ("に", "ny"), ("ひ", "hy"), ("び", "by"), ("ぴ", "py"),
    ("み", "my"), ("り", "ry"),
];

const PALATAL_TAILS: &[(&str, &str)] = &[("ゃ", "a"), ("ゅ", "u"), ("ょ", "o")];

/// Loanword digraphs built with a small vowel.
#[rustfmt::skip]
const SMALL_VOWEL_DIGRAPHS: &[(&str, &str)] = &[
    ("しぇ", "she"), ("じぇ", "je"), ("ちぇ", "che"),
    ("ふぁ", "fa"), ("ふぃ", "fi"), ("ふぇ", "fe"), ("ふぉ", "fo"),
    ("てぃ", "ti"), ("でぃ", "di"), ("とぅ", "tu"), ("どぅ", "du"),
    ("うぃ", "wi"), ("うぇ", "we"), ("うぉ", "wo"),
    ("ゔぁ", "va"), ("ゔぃ", "vi"), ("ゔぇ", "ve"), ("ゔぉ", "vo"),
];

const GEMINATE_MARK: &str = "っ";
const LONG_VOWEL_MARK: &str = "ー";

/// One romanized syllable unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyllableUnit {
    pub romaji: String,
    /// `None` for the consonant-only unit a geminate produces.
    pub vowel: Option<char>,
}

impl SyllableUnit {
    fn from_romaji(romaji: &str) -> Self {
        let vowel = if romaji == "n" {
            Some(NASAL)
        } else {
            romaji.chars().last().filter(|c| VOWELS.contains(c))
        };
        SyllableUnit {
            romaji: romaji.to_string(),
            vowel,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Rule {
    Syllable(String),
    Geminate,
    LongVowel,
}

/// A grapheme -> syllable mapping applied by longest match.
#[derive(Debug, Clone, Default)]
pub struct PhoneticTable {
    rules: BTreeMap<String, Rule>,
    max_key_chars: usize,
}

impl PhoneticTable {
    /// The default table: hiragana and katakana, Hepburn romanization.
    pub fn kana() -> Self {
        let mut table = PhoneticTable::default();
        for &(kana, romaji) in MONOGRAPHS.iter().chain(SMALL_VOWEL_DIGRAPHS) {
            table.insert_kana(kana, Rule::Syllable(romaji.to_string()));
        }
        for &(head, cluster) in PALATAL_HEADS {
            for &(tail, vowel) in PALATAL_TAILS {
                let key = format!("{head}{tail}");
                table.insert_kana(&key, Rule::Syllable(format!("{cluster}{vowel}")));
            }
        }
        table.insert_kana(GEMINATE_MARK, Rule::Geminate);
        // The long vowel mark has no hiragana form.
        table.with_long_vowel(LONG_VOWEL_MARK)
    }

    /// Build a table of plain syllables from `(grapheme, romaji)` pairs.
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut table = PhoneticTable::default();
        for (grapheme, romaji) in pairs {
            table.insert(grapheme, Rule::Syllable(romaji.to_string()));
        }
        table
    }

    /// Register a grapheme that lengthens the previous vowel.
    pub fn with_long_vowel(mut self, grapheme: &str) -> Self {
        self.insert(grapheme, Rule::LongVowel);
        self
    }

    fn insert(&mut self, grapheme: &str, rule: Rule) {
        let len = grapheme.chars().count();
        if len == 0 {
            return;
        }
        self.max_key_chars = self.max_key_chars.max(len);
        self.rules.insert(grapheme.to_string(), rule);
    }

    fn insert_kana(&mut self, hiragana: &str, rule: Rule) {
        let katakana: String = hiragana.chars().map(to_katakana).collect();
        self.insert(&katakana, rule.clone());
        self.insert(hiragana, rule);
    }

    /// Transliterate text into syllable units.
    pub fn romanize(&self, text: &str) -> Vec<SyllableUnit> {
        let chars: Vec<char> = text.chars().collect();
        let mut units: Vec<SyllableUnit> = Vec::new();
        let mut pending_geminate = false;
        let mut i = 0;

        while i < chars.len() {
            let longest = self.max_key_chars.min(chars.len() - i);
            let matched = (1..=longest).rev().find_map(|len| {
                let key: String = chars[i..i + len].iter().collect();
                self.rules.get(&key).map(|rule| (len, rule))
            });
            let Some((len, rule)) = matched else {
                i += 1;
                continue;
            };
            i += len;

            match rule {
                Rule::Syllable(romaji) => {
                    if pending_geminate {
                        pending_geminate = false;
                        if let Some(consonant) =
                            romaji.chars().next().filter(|c| !VOWELS.contains(c))
                        {
                            units.push(SyllableUnit {
                                romaji: consonant.to_string(),
                                vowel: None,
                            });
                        }
                    }
                    units.push(SyllableUnit::from_romaji(romaji));
                }
                Rule::Geminate => pending_geminate = true,
                Rule::LongVowel => {
                    if let Some(vowel) = units.last().and_then(|u| u.vowel) {
                        units.push(SyllableUnit {
                            romaji: vowel.to_string(),
                            vowel: Some(vowel),
                        });
                    }
                }
            }
        }

        units
    }

    /// Romanize then vowelize in one step.
    pub fn vowels(&self, text: &str) -> Vec<char> {
        vowelize(&self.romanize(text))
    }
}

/// The vowel of each syllable unit, in order. Vowelless units are dropped.
pub fn vowelize(units: &[SyllableUnit]) -> Vec<char> {
    units.iter().filter_map(|u| u.vowel).collect()
}

fn to_katakana(c: char) -> char {
    match c {
        '\u{3041}'..='\u{3096}' => char::from_u32(c as u32 + KATAKANA_OFFSET).unwrap_or(c),
        _ => c,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn romaji(units: &[SyllableUnit]) -> Vec<&str> {
        units.iter().map(|u| u.romaji.as_str()).collect()
    }

    #[test]
    fn test_basic_hiragana() {
        let table = PhoneticTable::kana();
        let units = table.romanize("やきゅう");
        assert_eq!(romaji(&units), vec!["ya", "kyu", "u"]);
        assert_eq!(vowelize(&units), vec!['a', 'u', 'u']);
    }

    #[test]
    fn test_katakana_matches_hiragana() {
        let table = PhoneticTable::kana();
        assert_eq!(table.vowels("ヤキュウ"), table.vowels("やきゅう"));
    }

    #[test]
    fn test_long_vowel_repeats_previous() {
        let table = PhoneticTable::kana();
        let units = table.romanize("ラーメン");
        assert_eq!(romaji(&units), vec!["ra", "a", "me", "n"]);
        assert_eq!(vowelize(&units), vec!['a', 'a', 'e', NASAL]);
    }

    #[test]
    fn test_geminate_doubles_consonant() {
        let table = PhoneticTable::kana();
        let units = table.romanize("きって");
        assert_eq!(romaji(&units), vec!["ki", "t", "te"]);
        assert_eq!(vowelize(&units), vec!['i', 'e']);
    }

    #[test]
    fn test_trailing_geminate_emits_nothing() {
        let table = PhoneticTable::kana();
        assert_eq!(romaji(&table.romanize("あっ")), vec!["a"]);
    }

    #[test]
    fn test_loanword_digraph() {
        let table = PhoneticTable::kana();
        assert_eq!(romaji(&table.romanize("ファン")), vec!["fa", "n"]);
    }

    #[test]
    fn test_unmapped_characters_are_skipped() {
        let table = PhoneticTable::kana();
        assert_eq!(table.vowels("空、そら!"), vec!['o', 'a']);
        assert!(table.romanize("").is_empty());
    }

    #[test]
    fn test_leading_long_vowel_is_ignored() {
        let table = PhoneticTable::kana();
        assert_eq!(table.vowels("ーあ"), vec!['a']);
    }

    #[test]
    fn test_custom_table() {
        let table = PhoneticTable::from_pairs([("a", "ka"), ("b", "bo"), ("q", "n")])
            .with_long_vowel("-");
        let units = table.romanize("ab-q");
        assert_eq!(romaji(&units), vec!["ka", "bo", "o", "n"]);
        assert_eq!(vowelize(&units), vec!['a', 'o', 'o', NASAL]);
    }
}
