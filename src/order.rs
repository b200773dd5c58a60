//! Priority ordering of boxes.

use crate::util::{NmsError, NmsResult};

/// Checks that `scores` is index-aligned with `len` boxes.
pub(crate) fn check_scores(len: usize, scores: Option<&[f32]>) -> NmsResult<()> {
    match scores {
        Some(s) if s.len() != len => Err(NmsError::ScoreLengthMismatch {
            boxes: len,
            scores: s.len(),
        }),
        _ => Ok(()),
    }
}

/// Returns box indices sorted by descending score.
///
/// The sort is stable, so equal scores keep ascending index order. Scores use
/// IEEE total ordering: a positive NaN ranks above `+inf` and is selected
/// first. Returns `None` when no scores are given, meaning the identity order.
pub fn priority_order(len: usize, scores: Option<&[f32]>) -> NmsResult<Option<Vec<usize>>> {
    check_scores(len, scores)?;
    let Some(scores) = scores else {
        return Ok(None);
    };
    let mut order: Vec<usize> = (0..len).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));
    Ok(Some(order))
}

/// Maps positions in priority order back to original box indices.
pub(crate) fn map_back(selected: &mut [usize], order: Option<&[usize]>) {
    if let Some(order) = order {
        for idx in selected.iter_mut() {
            *idx = order[*idx];
        }
    }
}
