// Pure rhyme arithmetic over vowel sequences.
//
// Tail rhyme counts matching vowels from the end of both lines backward
// until the first mismatch. Only when the tail count is zero does head
// rhyme (the same count from the start forward) apply. Both are symmetric
// in their arguments, and a line fully rhymes with itself.
//
// Text-level wrappers that romanize first live with the distance meter in
// the `rhymewalk` crate; these functions take vowels already extracted.

/// Tail rhyme count, falling back to head rhyme when the tail count is zero.
pub fn count_rhyme(a: &[char], b: &[char]) -> usize {
    let tail = a
        .iter()
        .rev()
        .zip(b.iter().rev())
        .take_while(|(x, y)| x == y)
        .count();
    if tail > 0 {
        return tail;
    }
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

/// `min(len) / max(len)` over character counts. Two empty strings have
/// equal length and score 1.0.
pub fn length_ratio(s1: &str, s2: &str) -> f64 {
    let l1 = s1.chars().count();
    let l2 = s2.chars().count();
    let longest = l1.max(l2);
    if longest == 0 {
        return 1.0;
    }
    l1.min(l2) as f64 / longest as f64
}

/// Rank candidates by rhyme count against `anchor` (descending, stable on
/// ties) and return the first `top_n`.
pub fn most_rhyming<'c, F>(
    anchor: &[char],
    candidates: &'c [String],
    top_n: usize,
    mut vowels: F,
) -> Vec<&'c str>
where
    F: FnMut(&str) -> Vec<char>,
{
    let mut ranked: Vec<(usize, &str)> = candidates
        .iter()
        .map(|c| (count_rhyme(anchor, &vowels(c)), c.as_str()))
        .collect();
    // sort_by is stable, so equal counts keep their input order.
    ranked.sort_by(|a, b| b.0.cmp(&a.0));
    ranked.into_iter().take(top_n).map(|(_, c)| c).collect()
}
