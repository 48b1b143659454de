mod common;

use common::synthetic_frame::rotated_rect_mask;
use qc_measure::extract::EndpointExtractor;
use qc_measure::quality::{score_mask, QualityOptions};
use qc_measure::Mask;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[test]
fn extent_is_rotation_invariant() {
    let extractor = EndpointExtractor::default();
    let reference = extractor
        .extract(&rotated_rect_mask(320, 320, 200.0, 80.0, 0.0))
        .unwrap();
    for angle in [15.0f32, 30.0, 45.0, 60.0, 90.0] {
        let ep = extractor
            .extract(&rotated_rect_mask(320, 320, 200.0, 80.0, angle))
            .unwrap();
        assert!(
            (ep.length_px - reference.length_px).abs() <= 2.5,
            "angle {angle}: length {} vs {}",
            ep.length_px,
            reference.length_px
        );
        assert!(
            (ep.width_px - reference.width_px).abs() <= 2.5,
            "angle {angle}: width {} vs {}",
            ep.width_px,
            reference.width_px
        );
    }
}

#[test]
fn quality_decreases_as_boundary_damage_grows() {
    // Axis-aligned article: x in [40, 160], y in [45, 105].
    let clean = rotated_rect_mask(200, 150, 120.0, 60.0, 0.0);
    let opts = QualityOptions::default();
    let clean_score = score_mask(&clean, &opts).score;
    assert!(clean_score > opts.floor);

    let mut rng = StdRng::seed_from_u64(11);
    let mut damaged = clean.clone();
    let mut previous = clean_score;
    // Carve random notches into the top edge; each batch of damage must
    // score no better than the mask before it.
    for batch in 0..3 {
        for _ in 0..6 {
            let x0 = rng.gen_range(44..152);
            for y in 45..53 {
                for x in x0..x0 + 3 {
                    damaged.set(x, y, false);
                }
            }
        }
        let score = score_mask(&damaged, &opts).score;
        assert!(
            score <= previous + 1e-3,
            "batch {batch} scored {score} > {previous}"
        );
        previous = score;
    }
    assert!(previous < clean_score, "damage never lowered the score");
}
