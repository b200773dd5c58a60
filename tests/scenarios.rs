use boxnms::lowlevel::{bitmask_nms, greedy_nms};
use boxnms::{non_maximum_suppression, BBox, NmsConfig, NmsResult, Strategy, Suppressor};

fn three_boxes() -> Vec<BBox> {
    vec![
        BBox::new(0.0, 0.0, 10.0, 10.0),
        BBox::new(1.0, 1.0, 11.0, 11.0),
        BBox::new(20.0, 20.0, 30.0, 30.0),
    ]
}

fn run_with(
    strategy: Strategy,
    boxes: &[BBox],
    threshold: f32,
    scores: Option<&[f32]>,
    limit: Option<usize>,
) -> NmsResult<Vec<usize>> {
    Suppressor::new()
        .with_config(NmsConfig {
            threshold,
            limit,
            strategy,
            ..NmsConfig::default()
        })
        .run(boxes, scores)
}

const STRATEGIES: [Strategy; 3] = [Strategy::Auto, Strategy::Greedy, Strategy::Bitmask];

#[test]
fn unscored_boxes_follow_index_priority() {
    for strategy in STRATEGIES {
        let keep = run_with(strategy, &three_boxes(), 0.5, None, None).unwrap();
        assert_eq!(keep, vec![0, 2], "{strategy:?}");
    }
}

#[test]
fn scored_boxes_follow_score_priority() {
    let scores = [0.1, 0.9, 0.5];
    for strategy in STRATEGIES {
        let keep = run_with(strategy, &three_boxes(), 0.5, Some(&scores), None).unwrap();
        assert_eq!(keep, vec![1, 2], "{strategy:?}");
    }
}

#[test]
fn limit_truncates_to_highest_priority() {
    let scores = [0.1, 0.9, 0.5];
    for strategy in STRATEGIES {
        let keep = run_with(strategy, &three_boxes(), 0.5, Some(&scores), Some(1)).unwrap();
        assert_eq!(keep, vec![1], "{strategy:?}");
    }
}

#[test]
fn generous_limit_changes_nothing() {
    let keep = non_maximum_suppression(&three_boxes(), 0.5, None, Some(10)).unwrap();
    assert_eq!(keep, vec![0, 2]);
}

#[test]
fn unit_threshold_keeps_distinct_boxes() {
    let boxes = three_boxes();
    for strategy in STRATEGIES {
        let keep = run_with(strategy, &boxes, 1.0, None, None).unwrap();
        assert_eq!(keep, vec![0, 1, 2], "{strategy:?}");
    }
}

#[test]
fn unit_threshold_still_drops_duplicates() {
    let mut boxes = three_boxes();
    boxes.push(boxes[0]);
    for strategy in STRATEGIES {
        let keep = run_with(strategy, &boxes, 1.0, None, None).unwrap();
        assert_eq!(keep, vec![0, 1, 2], "{strategy:?}");
    }
}

#[test]
fn empty_input_yields_empty_output() {
    for strategy in STRATEGIES {
        assert!(run_with(strategy, &[], 0.5, None, None).unwrap().is_empty());
        assert!(run_with(strategy, &[], 0.5, Some(&[]), Some(3))
            .unwrap()
            .is_empty());
    }
}

#[test]
fn lone_box_is_always_kept() {
    let boxes = [BBox::new(5.0, 5.0, 6.0, 9.0)];
    for threshold in [0.0f32, 0.3, 1.0, -1.0] {
        for strategy in STRATEGIES {
            let keep = run_with(strategy, &boxes, threshold, Some(&[0.2]), None).unwrap();
            assert_eq!(keep, vec![0], "{strategy:?} threshold={threshold}");
        }
    }
}

#[test]
fn zero_threshold_keeps_only_the_top_box() {
    // IoU >= 0 holds for every pair, so the first accepted box suppresses all.
    let scores = [0.1, 0.9, 0.5];
    let greedy = greedy_nms(&three_boxes(), 0.0, Some(&scores), None).unwrap();
    let bitmask = bitmask_nms(&three_boxes(), 0.0, Some(&scores), None).unwrap();
    assert_eq!(greedy, vec![1]);
    assert_eq!(bitmask, vec![1]);
}

#[test]
fn output_is_in_acceptance_order_not_sorted() {
    let boxes = vec![
        BBox::new(0.0, 0.0, 10.0, 10.0),
        BBox::new(30.0, 0.0, 40.0, 10.0),
        BBox::new(60.0, 0.0, 70.0, 10.0),
    ];
    let scores = [0.2, 0.3, 0.9];
    for strategy in STRATEGIES {
        let keep = run_with(strategy, &boxes, 0.5, Some(&scores), None).unwrap();
        assert_eq!(keep, vec![2, 1, 0], "{strategy:?}");
    }
}

#[test]
fn chained_overlaps_resolve_greedily() {
    // 0 suppresses 1, so 1 cannot suppress 2 even though they overlap.
    let boxes: Vec<BBox> = (0..3)
        .map(|i| {
            let x = i as f32 * 4.0;
            BBox::new(x, 0.0, x + 10.0, 10.0)
        })
        .collect();
    for strategy in STRATEGIES {
        let keep = run_with(strategy, &boxes, 0.4, None, None).unwrap();
        assert_eq!(keep, vec![0, 2], "{strategy:?}");
    }
}

#[test]
fn degenerate_point_boxes_never_suppress() {
    // Coincident zero-area boxes have an undefined (NaN) overlap.
    let boxes = vec![BBox::new(3.0, 3.0, 3.0, 3.0); 2];
    for strategy in STRATEGIES {
        let keep = run_with(strategy, &boxes, 0.5, None, None).unwrap();
        assert_eq!(keep, vec![0, 1], "{strategy:?}");
    }
}
