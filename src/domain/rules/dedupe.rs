// Duplicate speech detection

use std::collections::HashMap;
use std::ops::Range;

use crate::domain::model::Segment;

use super::PREFIX_OVERLAP_THRESHOLD;

/// Lowercase, keep ASCII alphanumerics and collapse everything else to single spaces
pub fn normalize(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Longest-matching-blocks similarity in `[0, 1]`
///
/// Computes `2 * M / T` where `M` is the total size of the matching
/// blocks found by recursive longest-common-substring search and `T` the
/// combined length. Two empty strings are identical (1.0). Elements of
/// `b` that occur in more than 1% of a 200+ character string are ignored
/// when seeding matches, same as the common "autojunk" heuristic.
pub fn similarity_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }

    let matched = BlockMatcher::new(&a, &b).matched_len();
    2.0 * matched as f64 / total as f64
}

/// True when `a` and `b` say the same thing
///
/// Either a similarity ratio at or above `threshold`, or a common prefix
/// covering at least 80% of the shorter normalized phrase (truncated
/// restarts like "I think that we" / "I think that we should").
pub fn is_duplicate(a: &str, b: &str, threshold: f64) -> bool {
    let norm_a = normalize(a);
    let norm_b = normalize(b);

    if similarity_ratio(&norm_a, &norm_b) >= threshold {
        return true;
    }

    let min_len = norm_a.chars().count().min(norm_b.chars().count());
    if min_len == 0 {
        return norm_a.is_empty() && norm_b.is_empty();
    }

    let prefix_len = norm_a
        .chars()
        .zip(norm_b.chars())
        .take_while(|(x, y)| x == y)
        .count();

    prefix_len as f64 / min_len as f64 >= PREFIX_OVERLAP_THRESHOLD
}

/// Index ranges of chained duplicate groups
///
/// A group grows while the next segment duplicates the group's *last*
/// member, so "a" ~ "b" ~ "c" forms one group even if "a" and "c" differ.
pub fn duplicate_groups(segments: &[Segment], threshold: f64) -> Vec<Range<usize>> {
    let mut groups = Vec::new();
    let mut i = 0;

    while i < segments.len() {
        let mut j = i + 1;
        while j < segments.len() && is_duplicate(&segments[j - 1].text, &segments[j].text, threshold) {
            j += 1;
        }
        groups.push(i..j);
        i = j;
    }

    groups
}

/// Drop repeated takes, keeping the last segment of every duplicate group
pub fn dedupe(segments: &[Segment], threshold: f64) -> Vec<Segment> {
    duplicate_groups(segments, threshold)
        .into_iter()
        .map(|group| segments[group.end - 1].clone())
        .collect()
}

struct BlockMatcher<'a> {
    a: &'a [char],
    b: &'a [char],
    b2j: HashMap<char, Vec<usize>>,
}

impl<'a> BlockMatcher<'a> {
    fn new(a: &'a [char], b: &'a [char]) -> Self {
        let mut b2j: HashMap<char, Vec<usize>> = HashMap::new();
        for (j, c) in b.iter().enumerate() {
            b2j.entry(*c).or_default().push(j);
        }

        if b.len() >= 200 {
            let ntest = b.len() / 100 + 1;
            b2j.retain(|_, indices| indices.len() <= ntest);
        }

        Self { a, b, b2j }
    }

    /// Longest matching block inside `a[alo..ahi]` and `b[blo..bhi]`
    fn longest_match(&self, alo: usize, ahi: usize, blo: usize, bhi: usize) -> (usize, usize, usize) {
        let (mut best_i, mut best_j, mut best_size) = (alo, blo, 0);
        let mut j2len: HashMap<usize, usize> = HashMap::new();

        for i in alo..ahi {
            let mut next_j2len = HashMap::new();
            if let Some(indices) = self.b2j.get(&self.a[i]) {
                for &j in indices {
                    if j < blo {
                        continue;
                    }
                    if j >= bhi {
                        break;
                    }
                    let k = j
                        .checked_sub(1)
                        .and_then(|prev| j2len.get(&prev))
                        .copied()
                        .unwrap_or(0)
                        + 1;
                    next_j2len.insert(j, k);
                    if k > best_size {
                        best_i = i + 1 - k;
                        best_j = j + 1 - k;
                        best_size = k;
                    }
                }
            }
            j2len = next_j2len;
        }

        // Popular characters were skipped while seeding; let the match absorb them
        while best_i > alo && best_j > blo && self.a[best_i - 1] == self.b[best_j - 1] {
            best_i -= 1;
            best_j -= 1;
            best_size += 1;
        }
        while best_i + best_size < ahi
            && best_j + best_size < bhi
            && self.a[best_i + best_size] == self.b[best_j + best_size]
        {
            best_size += 1;
        }

        (best_i, best_j, best_size)
    }

    /// Total size of all matching blocks
    fn matched_len(&self) -> usize {
        let mut queue = vec![(0, self.a.len(), 0, self.b.len())];
        let mut matched = 0;

        while let Some((alo, ahi, blo, bhi)) = queue.pop() {
            let (i, j, k) = self.longest_match(alo, ahi, blo, bhi);
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
