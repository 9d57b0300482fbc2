use crate::constants::limits;
use crate::utils::filter::fold;

fn levenshtein(a: &[char], b: &[char]) -> usize {
    if a == b {
        return 0;
    }
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        prev.clone_from_slice(&curr);
    }
    prev[b.len()]
}

fn score_candidate(input: &[char], candidate: &str) -> Option<usize> {
    let folded: Vec<char> = fold(candidate.trim()).chars().collect();
    if input.is_empty() || folded.is_empty() {
        return None;
    }
    if input == folded.as_slice() {
        return Some(0);
    }
    Some(levenshtein(input, &folded))
}

fn max_allowed_distance(len: usize) -> usize {
    match len {
        0 => 0,
        1..=4 => 1,
        5..=8 => 2,
        _ => ((len as f32 * 0.35).floor() as usize).max(3),
    }
}

/// Near misses for a term that has no exact match, closest first.
///
/// Substring hits are left to the filter; this ranks by edit distance on
/// folded text only.
pub fn suggest<S: AsRef<str>>(input: &str, candidates: &[S], limit: usize) -> Vec<String> {
    let input: Vec<char> = fold(input.trim()).chars().collect();
    if input.is_empty() || candidates.is_empty() {
        return Vec::new();
    }
    let limit = limit.max(1);
    let allowed = max_allowed_distance(input.len());

    let mut scored: Vec<(&str, usize)> = candidates
        .iter()
        .take(limits::NEAR_MISS_SCAN)
        .map(|candidate| candidate.as_ref())
        .filter_map(|candidate| {
            score_candidate(&input, candidate)
                .filter(|score| *score <= allowed)
                .map(|score| (candidate, score))
        })
        .collect();

    scored.sort_by(|a, b| {
        a.1.cmp(&b.1)
            .then_with(|| a.0.chars().count().cmp(&b.0.chars().count()))
            .then_with(|| a.0.cmp(b.0))
    });

    let mut out: Vec<String> = Vec::new();
    for (candidate, _) in scored {
        if out.iter().any(|existing| existing == candidate) {
            continue;
        }
        out.push(candidate.to_string());
        if out.len() >= limit {
            break;
        }
    }
    out
}
