//! Sequence similarity over function text.
//!
//! The ratio is `2 * M / (len(a) + len(b))`, where `M` is the number of
//! characters covered by recursively taking the longest common block and
//! repeating on both sides of it. No characters are treated as junk.
//! Inputs are put in a canonical order before matching, so
//! `ratio(a, b) == ratio(b, a)` holds exactly even when longest-block ties
//! would break differently.

use std::collections::HashMap;

/// How function text is normalized before comparison.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Normalization {
    /// Remove every double space, then trim.
    #[default]
    DoubleSpace,
    /// Remove every space.
    AllSpaces,
}

impl Normalization {
    pub fn apply(self, text: &str) -> String {
        match self {
            Normalization::DoubleSpace => text.replace("  ", "").trim().to_string(),
            Normalization::AllSpaces => text.replace(' ', ""),
        }
    }
}

// ---------------------------------------------------------------------------
// Matcher
// ---------------------------------------------------------------------------

struct BlockMatcher<'s> {
    a: &'s [char],
    b: &'s [char],
    b2j: HashMap<char, Vec<usize>>,
}

impl<'s> BlockMatcher<'s> {
    fn new(a: &'s [char], b: &'s [char]) -> Self {
        let mut b2j: HashMap<char, Vec<usize>> = HashMap::new();
        for (j, &c) in b.iter().enumerate() {
            b2j.entry(c).or_default().push(j);
        }
        Self { a, b, b2j }
    }

    /// Longest block `a[i..i+k] == b[j..j+k]` inside the given ranges,
    /// earliest in `a` on ties, then earliest in `b`.
    fn longest_match(
        &self,
        alo: usize,
        ahi: usize,
        blo: usize,
        bhi: usize,
        prev: &mut Vec<usize>,
        cur: &mut Vec<usize>,
    ) -> (usize, usize, usize) {
        let (mut best_i, mut best_j, mut best_k) = (alo, blo, 0);
        // prev[j + 1] = length of the match ending at (i - 1, j).
        let mut touched_prev: Vec<usize> = Vec::new();
        let mut touched_cur: Vec<usize> = Vec::new();

        for i in alo..ahi {
            if let Some(positions) = self.b2j.get(&self.a[i]) {
                for &j in positions {
                    if j < blo {
                        continue;
                    }
                    if j >= bhi {
                        break;
                    }
                    let k = prev[j] + 1;
                    cur[j + 1] = k;
                    touched_cur.push(j + 1);
                    if k > best_k {
                        best_i = i + 1 - k;
                        best_j = j + 1 - k;
                        best_k = k;
                    }
                }
            }
            for &t in &touched_prev {
                prev[t] = 0;
            }
            touched_prev.clear();
            std::mem::swap(prev, cur);
            std::mem::swap(&mut touched_prev, &mut touched_cur);
        }
        for &t in &touched_prev {
            prev[t] = 0;
        }
        (best_i, best_j, best_k)
    }

    /// Total size of all matching blocks.
    fn matched_chars(&self) -> usize {
        let mut prev = vec![0usize; self.b.len() + 1];
        let mut cur = vec![0usize; self.b.len() + 1];
        let mut matched = 0;
        let mut queue = vec![(0, self.a.len(), 0, self.b.len())];
        while let Some((alo, ahi, blo, bhi)) = queue.pop() {
            let (i, j, k) = self.longest_match(alo, ahi, blo, bhi, &mut prev, &mut cur);
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

fn ratio_of(matched: usize, total: usize) -> f64 {
    if total == 0 {
        1.0
    } else {
        2.0 * matched as f64 / total as f64
    }
}

/// Similarity ratio in `[0, 1]`; two empty strings are identical.
pub fn ratio(a: &str, b: &str) -> f64 {
    let (a, b) = if a <= b { (a, b) } else { (b, a) };
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let matched = BlockMatcher::new(&a, &b).matched_chars();
    ratio_of(matched, a.len() + b.len())
}

/// Upper bound on [`ratio`] from lengths alone.
pub fn real_quick_ratio(a: &str, b: &str) -> f64 {
    let (la, lb) = (a.chars().count(), b.chars().count());
    ratio_of(la.min(lb), la + lb)
}

/// Upper bound on [`ratio`] from character multisets.
pub fn quick_ratio(a: &str, b: &str) -> f64 {
    let mut counts: HashMap<char, isize> = HashMap::new();
    for c in b.chars() {
        *counts.entry(c).or_default() += 1;
    }
    let mut matched = 0;
    let mut la = 0;
    for c in a.chars() {
        la += 1;
        let slot = counts.entry(c).or_default();
        if *slot > 0 {
            matched += 1;
        }
        *slot -= 1;
    }
    ratio_of(matched, la + b.chars().count())
}

/// `ratio(a, b) > threshold`, skipping the full match when a cheap upper
/// bound already rules it out.
pub fn exceeds(a: &str, b: &str, threshold: f64) -> bool {
    real_quick_ratio(a, b) > threshold && quick_ratio(a, b) > threshold && ratio(a, b) > threshold
}
