//! Sequential greedy selector.
//!
//! Boxes are visited once in priority order; a box is kept when its overlap
//! with every box kept so far stays below the threshold. Worst case is
//! quadratic in the number of boxes, which is fine for the low thousands of
//! candidates a detector emits per image.

use crate::bbox::{permute, BBox};
use crate::order::{map_back, priority_order};
use crate::overlap::iou_masked;
use crate::trace::{trace_event, trace_span};
use crate::util::NmsResult;
use std::borrow::Cow;

/// Runs greedy suppression and returns kept indices in acceptance order.
///
/// With `scores`, boxes are visited by descending score; otherwise by
/// ascending index. Processing stops as soon as `limit` boxes are kept.
pub fn greedy_nms(
    boxes: &[BBox],
    threshold: f32,
    scores: Option<&[f32]>,
    limit: Option<usize>,
) -> NmsResult<Vec<usize>> {
    let order = priority_order(boxes.len(), scores)?;
    if boxes.is_empty() {
        return Ok(Vec::new());
    }

    let _span = trace_span!("greedy_nms", boxes = boxes.len()).entered();

    let sorted: Cow<'_, [BBox]> = match order.as_deref() {
        Some(order) => Cow::Owned(permute(boxes, order)),
        None => Cow::Borrowed(boxes),
    };
    let mut selected = select_sorted(&sorted, threshold, limit);
    map_back(&mut selected, order.as_deref());

    trace_event!("greedy_selected", count = selected.len());
    Ok(selected)
}

/// Greedy pass over boxes that are already in priority order.
pub(crate) fn select_sorted(boxes: &[BBox], threshold: f32, limit: Option<usize>) -> Vec<usize> {
    if limit == Some(0) {
        return Vec::new();
    }

    let areas: Vec<f32> = boxes.iter().map(BBox::area).collect();
    let mut selected: Vec<usize> = Vec::new();

    'candidates: for (i, candidate) in boxes.iter().enumerate() {
        for &j in selected.iter() {
            if iou_masked(candidate, areas[i], &boxes[j], areas[j]) >= threshold {
                continue 'candidates;
            }
        }
        selected.push(i);
        if limit.is_some_and(|limit| selected.len() >= limit) {
            break;
        }
    }

    selected
}

#[cfg(test)]
mod tests {
    use super::{greedy_nms, select_sorted};
    use crate::bbox::BBox;

    fn scenario() -> Vec<BBox> {
        vec![
            BBox::new(0.0, 0.0, 10.0, 10.0),
            BBox::new(1.0, 1.0, 11.0, 11.0),
            BBox::new(20.0, 20.0, 30.0, 30.0),
        ]
    }

    #[test]
    fn index_priority_without_scores() {
        assert_eq!(greedy_nms(&scenario(), 0.5, None, None).unwrap(), vec![0, 2]);
    }

    #[test]
    fn score_priority_returns_acceptance_order() {
        let scores = [0.1, 0.9, 0.5];
        let keep = greedy_nms(&scenario(), 0.5, Some(&scores), None).unwrap();
        assert_eq!(keep, vec![1, 2]);
    }

    #[test]
    fn limit_stops_early() {
        let scores = [0.1, 0.9, 0.5];
        let keep = greedy_nms(&scenario(), 0.5, Some(&scores), Some(1)).unwrap();
        assert_eq!(keep, vec![1]);
    }

    #[test]
    fn zero_limit_keeps_nothing() {
        assert!(select_sorted(&scenario(), 0.5, Some(0)).is_empty());
    }

    #[test]
    fn nested_small_box_survives_large_one() {
        let boxes = vec![
            BBox::new(0.0, 0.0, 100.0, 100.0),
            BBox::new(0.0, 0.0, 10.0, 10.0),
        ];
        let keep = greedy_nms(&boxes, 0.5, Some(&[0.1, 0.9]), None).unwrap();
        assert_eq!(keep, vec![1, 0]);
    }
}
