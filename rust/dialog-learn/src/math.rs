//! Small numeric helpers shared by the optimizers and decoders.

/// Index of the largest score; the lowest index wins ties.
pub fn argmax(scores: &[f32]) -> Option<usize> {
    argmax_of(scores, 0..scores.len())
}

/// Index of the largest score among `labels`; the lowest index wins ties.
///
/// Labels outside `scores` are ignored.
pub fn argmax_of<I>(scores: &[f32], labels: I) -> Option<usize>
where
    I: IntoIterator<Item = usize>,
{
    let mut best: Option<(usize, f32)> = None;

    for label in labels {
        let Some(&score) = scores.get(label) else {
            continue;
        };
        match best {
            Some((best_label, best_score))
                if score < best_score || (score == best_score && label > best_label) => {}
            _ => best = Some((label, score)),
        }
    }

    best.map(|(label, _)| label)
}

/// Replaces `scores` with their softmax distribution.
pub fn softmax(scores: &mut [f32]) {
    let Some(max) = scores.iter().copied().reduce(f32::max) else {
        return;
    };

    let mut sum = 0.0;
    for score in scores.iter_mut() {
        *score = (*score - max).exp();
        sum += *score;
    }
    for score in scores.iter_mut() {
        *score /= sum;
    }
}
