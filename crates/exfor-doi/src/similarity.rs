//! Ratcliff/Obershelp string similarity.
//!
//! The ratio is `2·M / T` where `T` is the combined length of both strings and
//! `M` the number of characters in matching blocks. Blocks are found by taking
//! the longest common substring and recursing on the pieces to its left and
//! right. Comparison is per Unicode scalar value and case-sensitive; use
//! [`title_case`] to normalize first.

use std::collections::HashMap;

/// Second sequences at least this long get the popular-element heuristic.
const AUTOJUNK_MIN_LEN: usize = 200;

/// Similarity ratio in `[0, 1]`.
///
/// Two empty strings are identical (`1.0`); an empty string shares nothing
/// with a non-empty one (`0.0`).
#[must_use]
pub fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }

    let matched = SequenceMatcher::new(&a, &b).matched_len();
    2.0 * matched as f64 / total as f64
}

/// Title-case the first cased character of every word and lower-case the rest.
///
/// A word starts after any character that has no case, so digits and
/// punctuation start new words: `"48ti o'neil"` becomes `"48Ti O'Neil"`.
/// Digraphs take their titlecase form (`"ǆemal"` gives `"ǅemal"`), ligatures
/// expand to one capital (`"ﬁne"` gives `"Fine"`) and a word-final capital
/// sigma lowers to `ς`.
#[must_use]
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut previous_is_cased = false;

    for (i, c) in s.char_indices() {
        if !previous_is_cased {
            push_titlecase(c, &mut out);
        } else if c == 'Σ' && is_final_sigma(&s[i..]) {
            out.push('ς');
        } else {
            out.extend(c.to_lowercase());
        }
        previous_is_cased = is_cased(c);
    }

    out
}

/// Characters whose titlecase form differs from their uppercase form.
fn push_titlecase(c: char, out: &mut String) {
    let title = match c {
        'Ǆ' | 'ǅ' | 'ǆ' => "ǅ",
        'Ǉ' | 'ǈ' | 'ǉ' => "ǈ",
        'Ǌ' | 'ǋ' | 'ǌ' => "ǋ",
        'Ǳ' | 'ǲ' | 'ǳ' => "ǲ",
        'ŉ' => "ʼN",
        'ᾳ' | 'ᾼ' => "ᾼ",
        'ῃ' | 'ῌ' => "ῌ",
        'ῳ' | 'ῼ' => "ῼ",
        '\u{1FB2}' => "\u{1FBA}\u{345}",
        '\u{1FB4}' => "\u{386}\u{345}",
        '\u{1FB7}' => "\u{391}\u{342}\u{345}",
        '\u{1FC2}' => "\u{1FCA}\u{345}",
        '\u{1FC4}' => "\u{389}\u{345}",
        '\u{1FC7}' => "\u{397}\u{342}\u{345}",
        '\u{1FF2}' => "\u{1FFA}\u{345}",
        '\u{1FF4}' => "\u{38F}\u{345}",
        '\u{1FF7}' => "\u{3A9}\u{342}\u{345}",
        // Georgian Mkhedruli has an uppercase script but titlecases to itself
        '\u{10D0}'..='\u{10FA}' | '\u{10FD}'..='\u{10FF}' => {
            out.push(c);
            return;
        }
        // Greek with ypogegrammeni: lower forms sit 8 code points below the title forms
        '\u{1F80}'..='\u{1FAF}' => {
            out.push(char::from_u32(c as u32 | 0x8).unwrap_or(c));
            return;
        }
        _ => {
            // ligatures and ß expand to one capital followed by lower case
            let mut upper = c.to_uppercase();
            if let Some(first) = upper.next() {
                out.push(first);
            }
            for rest in upper {
                out.extend(rest.to_lowercase());
            }
            return;
        }
    };
    out.push_str(title);
}

/// Titlecase letters (category Lt) are cased but neither upper nor lower.
fn is_titlecase(c: char) -> bool {
    matches!(
        c,
        'ǅ' | 'ǈ' | 'ǋ' | 'ǲ'
            | '\u{1F88}'..='\u{1F8F}'
            | '\u{1F98}'..='\u{1F9F}'
            | '\u{1FA8}'..='\u{1FAF}'
            | 'ᾼ'
            | 'ῌ'
            | 'ῼ'
    )
}

fn is_cased(c: char) -> bool {
    c.is_lowercase() || c.is_uppercase() || is_titlecase(c)
}

/// `rest` starts with `Σ` following a cased letter; it is final unless a
/// cased letter follows after any case-ignorable characters.
fn is_final_sigma(rest: &str) -> bool {
    // std lowercasing applies the same context rule given a cased letter before
    format!("a{rest}").to_lowercase().chars().nth(1) == Some('ς')
}

struct SequenceMatcher<'a> {
    a: &'a [char],
    b: &'a [char],
    /// Positions of each element of `b`, popular elements removed.
    b2j: HashMap<char, Vec<usize>>,
}

impl<'a> SequenceMatcher<'a> {
    fn new(a: &'a [char], b: &'a [char]) -> Self {
        let mut b2j: HashMap<char, Vec<usize>> = HashMap::new();
        for (j, &c) in b.iter().enumerate() {
            b2j.entry(c).or_default().push(j);
        }

        if b.len() >= AUTOJUNK_MIN_LEN {
            let ntest = b.len() / 100 + 1;
            b2j.retain(|_, positions| positions.len() <= ntest);
        }

        Self { a, b, b2j }
    }

    /// Longest block `a[i..i+k] == b[j..j+k]` inside the given window.
    ///
    /// Among equally long blocks the one starting earliest in `a`, then in
    /// `b`, wins.
    fn find_longest_match(
        &self,
        alo: usize,
        ahi: usize,
        blo: usize,
        bhi: usize,
    ) -> (usize, usize, usize) {
        let (mut besti, mut bestj, mut bestsize) = (alo, blo, 0);

        // j2len[j] = length of the longest match ending with a[i-1] and b[j]
        let mut j2len: HashMap<usize, usize> = HashMap::new();
        for i in alo..ahi {
            let mut next: HashMap<usize, usize> = HashMap::new();
            if let Some(positions) = self.b2j.get(&self.a[i]) {
                for &j in positions {
                    if j < blo {
                        continue;
                    }
                    if j >= bhi {
                        break;
                    }
                    let k = j.checked_sub(1).and_then(|p| j2len.get(&p)).copied().unwrap_or(0) + 1;
                    next.insert(j, k);
                    if k > bestsize {
                        besti = i + 1 - k;
                        bestj = j + 1 - k;
                        bestsize = k;
                    }
                }
            }
            j2len = next;
        }

        // Popular elements never seed a block but may extend one.
        while besti > alo && bestj > blo && self.a[besti - 1] == self.b[bestj - 1] {
            besti -= 1;
            bestj -= 1;
            bestsize += 1;
        }
        while besti + bestsize < ahi
            && bestj + bestsize < bhi
            && self.a[besti + bestsize] == self.b[bestj + bestsize]
        {
            bestsize += 1;
        }

        (besti, bestj, bestsize)
    }

    /// Total length of all matching blocks.
    fn matched_len(&self) -> usize {
        let mut matched = 0;
        let mut queue = vec![(0, self.a.len(), 0, self.b.len())];

        while let Some((alo, ahi, blo, bhi)) = queue.pop() {
            let (i, j, k) = self.find_longest_match(alo, ahi, blo, bhi);
            if k == 0 {
                continue;
            }
            matched += k;
            if alo < i && blo < j {
                queue.push((alo, i, blo, j));
            }
            if i + k < ahi && j + k < bhi {
                queue.push((i + k, ahi, j + k, bhi));
            }
        }

        matched
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_identical() {
        assert!(approx(similarity("Elastic Scattering Study", "Elastic Scattering Study"), 1.0));
    }

    #[test]
    fn test_empty_strings() {
        assert!(approx(similarity("", ""), 1.0));
        assert!(approx(similarity("", "Koning"), 0.0));
        assert!(approx(similarity("Koning", ""), 0.0));
    }

    #[test]
    fn test_no_common_characters() {
        assert!(approx(similarity("M", "Brischetto"), 0.0));
    }

    #[test]
    fn test_known_ratios() {
        // "bcd" is the only block
        assert!(approx(similarity("abcd", "bcde"), 0.75));
        assert!(approx(similarity("bcde", "abcd"), 0.75));
        // "Brischett"
        assert!(approx(similarity("Brischetto", "Brischetti"), 0.9));
        // blocks "ab" then "d": 2·3 / 8
        assert!(approx(similarity("abxd", "abyd"), 0.75));
    }

    #[test]
    fn test_recursion_finds_blocks_on_both_sides() {
        // longest block "cde", then "a" on the left and "g" on the right
        assert!(approx(similarity("abcdefg", "axcdeyg"), 10.0 / 14.0));
    }

    #[test]
    fn test_case_sensitive() {
        assert!(similarity("koning", "Koning") < 1.0);
        assert!(approx(similarity(&title_case("koning"), "Koning"), 1.0));
    }

    #[test]
    fn test_unicode_scalars() {
        assert!(approx(similarity("Müller", "Müller"), 1.0));
        // one differing scalar out of six on each side
        assert!(approx(similarity("Müller", "Muller"), 10.0 / 12.0));
    }

    #[test]
    fn test_long_sequences_with_popular_elements() {
        let long = "ab".repeat(150);
        assert!(approx(similarity(&long, &long), 1.0));
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("elastic scattering STUDY"), "Elastic Scattering Study");
        assert_eq!(title_case("brischetto"), "Brischetto");
        assert_eq!(title_case("48ti o'neil"), "48Ti O'Neil");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn test_title_case_digraphs_and_ligatures() {
        assert_eq!(title_case("ǆemal"), "ǅemal");
        assert_eq!(title_case("ǅEMAL"), "ǅemal");
        assert_eq!(title_case("ﬁne day"), "Fine Day");
        assert_eq!(title_case("straße"), "Straße");
        assert_eq!(title_case("ßtrasse"), "Sstrasse");
        assert_eq!(title_case("ŉ"), "ʼN");
    }

    #[test]
    fn test_title_case_greek() {
        assert_eq!(title_case("ΣΑΣ lol"), "Σας Lol");
        assert_eq!(title_case("ΟΔΟΣ'Σ"), "Οδοσ'Σ");
        assert_eq!(title_case("\u{1FB7}"), "\u{391}\u{342}\u{345}");
        assert_eq!(title_case("σίγμα"), "Σίγμα");
        assert_eq!(title_case("ᾳ ᾀ"), "ᾼ ᾈ");
        assert_eq!(title_case("ᾼσ"), "ᾼσ");
    }

    #[test]
    fn test_title_case_georgian_keeps_script() {
        assert_eq!(title_case("ბირთვი"), "ბირთვი");
    }
}
