//! Order-aware similarity ratio between two normalized strings.
//!
//! The ratio is `2 * M / T`, where `M` is the number of characters covered by
//! matching blocks and `T` the combined length of both strings. Blocks are
//! found greedily: take the longest common contiguous run, then recurse into
//! the unmatched regions to its left and right.

use std::collections::HashMap;

/// A contiguous run where `a[a_start..a_start + len] == b[b_start..b_start + len]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct MatchingBlock {
    pub a_start: usize,
    pub b_start: usize,
    pub len: usize,
}

/// Similarity of `a` and `b` in `[0, 1]`.
///
/// Two empty strings are identical (`1.0`). The pair is aligned in a
/// canonical order, so `similarity(a, b) == similarity(b, a)` exactly.
pub fn similarity(a: &str, b: &str) -> f64 {
    let (first, second) = if a <= b { (a, b) } else { (b, a) };
    let first = first.chars().collect::<Vec<_>>();
    let second = second.chars().collect::<Vec<_>>();

    let total = first.len() + second.len();
    if total == 0 {
        return 1.0;
    }

    let matched = matching_blocks(&first, &second)
        .iter()
        .map(|block| block.len)
        .sum::<usize>();
    (2 * matched) as f64 / total as f64
}

/// All matching blocks between `a` and `b`, ordered by position.
pub fn matching_blocks(a: &[char], b: &[char]) -> Vec<MatchingBlock> {
    if a.is_empty() || b.is_empty() {
        return Vec::new();
    }

    let mut b2j: HashMap<char, Vec<usize>> = HashMap::new();
    for (j, ch) in b.iter().enumerate() {
        b2j.entry(*ch).or_default().push(j);
    }

    let mut queue = vec![(0, a.len(), 0, b.len())];
    let mut blocks = Vec::new();

    while let Some((alo, ahi, blo, bhi)) = queue.pop() {
        let block = find_longest_match(a, &b2j, alo, ahi, blo, bhi);
        if block.len == 0 {
            continue;
        }
        blocks.push(block);

        if alo < block.a_start && blo < block.b_start {
            queue.push((alo, block.a_start, blo, block.b_start));
        }
        let a_end = block.a_start + block.len;
        let b_end = block.b_start + block.len;
        if a_end < ahi && b_end < bhi {
            queue.push((a_end, ahi, b_end, bhi));
        }
    }

    blocks.sort();
    blocks
}

// Ties resolve to the block that starts earliest in `a`, then in `b`.
//
// `prev[k]` / `cur[k]` hold the length of the run ending at `b[blo + k - 1]`;
// slot 0 stays zero so a run can start at `blo`. Only touched slots are reset
// between rows.
fn find_longest_match(
    a: &[char],
    b2j: &HashMap<char, Vec<usize>>,
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> MatchingBlock {
    let mut best = MatchingBlock {
        a_start: alo,
        b_start: blo,
        len: 0,
    };

    let width = bhi - blo + 1;
    let mut prev = vec![0usize; width];
    let mut cur = vec![0usize; width];
    let mut prev_touched = Vec::new();
    let mut cur_touched = Vec::new();

    for (i, ch) in a.iter().enumerate().take(ahi).skip(alo) {
        if let Some(positions) = b2j.get(ch) {
            let first = positions.partition_point(|&j| j < blo);
            for &j in &positions[first..] {
                if j >= bhi {
                    break;
                }
                let slot = j - blo + 1;
                let k = prev[slot - 1] + 1;
                cur[slot] = k;
                cur_touched.push(slot);

                if k > best.len {
                    best = MatchingBlock {
                        a_start: i + 1 - k,
                        b_start: j + 1 - k,
                        len: k,
                    };
                }
            }
        }

        for &slot in &prev_touched {
            prev[slot] = 0;
        }
        prev_touched.clear();
        std::mem::swap(&mut prev, &mut cur);
        std::mem::swap(&mut prev_touched, &mut cur_touched);
    }

    best
}
