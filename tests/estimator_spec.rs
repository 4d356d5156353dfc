use speculate2::speculate;
use tree_carbon::estimator::{estimate, MODEL};

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
}

const CIRCUMFERENCES: [f64; 7] = [0.0, 0.5, 3.0, 22.0, 50.0, 137.5, 420.0];
const HEIGHTS: [f64; 6] = [0.0, 0.3, 2.0, 10.0, 25.5, 60.0];

speculate! {
    describe "estimate" {
        describe "reference tree" {
            before {
                let b = estimate(50.0, 10.0).expect("valid measurement");
            }

            it "derives diameter with 22/7 for pi" {
                assert_eq!(b.diameter, 50.0 * 7.0 / 22.0);
                assert!(close(b.diameter, 15.909090909090908));
            }

            it "applies the fixed component formulas" {
                let base = b.diameter * b.diameter * 10.0;
                assert!(close(b.above_ground_stem_biomass, 0.05466 * base.powf(0.945)));
                assert!(close(b.above_ground_branch_biomass, 0.01579 * base.powf(0.9124)));
                assert!(close(b.above_ground_leaf_biomass, 0.0678 * base.powf(0.5806)));
            }

            it "converts total biomass to CO2 equivalent" {
                assert!(close(b.carbon_storage, b.total_biomass * 0.4715 * (44.0 / 12.0)));
            }

            it "is reproducible" {
                assert_eq!(estimate(50.0, 10.0).unwrap(), b);
            }
        }

        describe "invariants" {
            it "sums above-ground components" {
                for c in CIRCUMFERENCES {
                    for h in HEIGHTS {
                        let b = estimate(c, h).unwrap();
                        let sum = b.above_ground_stem_biomass
                            + b.above_ground_branch_biomass
                            + b.above_ground_leaf_biomass;
                        assert!(close(b.above_ground_total_biomass, sum), "c={c} h={h}");
                    }
                }
            }

            it "adds below-ground biomass as a fixed fraction" {
                for c in CIRCUMFERENCES {
                    for h in HEIGHTS {
                        let b = estimate(c, h).unwrap();
                        assert!(close(b.below_ground_biomass, 0.48 * b.above_ground_total_biomass));
                        assert!(close(b.total_biomass, b.above_ground_total_biomass + b.below_ground_biomass));
                    }
                }
            }

            it "never goes negative for non-negative input" {
                for c in CIRCUMFERENCES {
                    for h in HEIGHTS {
                        let b = estimate(c, h).unwrap();
                        for v in [
                            b.diameter,
                            b.above_ground_stem_biomass,
                            b.above_ground_branch_biomass,
                            b.above_ground_leaf_biomass,
                            b.above_ground_total_biomass,
                            b.below_ground_biomass,
                            b.total_biomass,
                            b.carbon_storage,
                        ] {
                            assert!(v >= 0.0, "c={c} h={h}");
                        }
                    }
                }
            }
        }

        describe "zero measurements" {
            it "gives zero everywhere for zero circumference" {
                for h in HEIGHTS {
                    let b = estimate(0.0, h).unwrap();
                    assert_eq!(b.above_ground_stem_biomass, 0.0);
                    assert_eq!(b.above_ground_branch_biomass, 0.0);
                    assert_eq!(b.above_ground_leaf_biomass, 0.0);
                    assert_eq!(b.above_ground_total_biomass, 0.0);
                    assert_eq!(b.below_ground_biomass, 0.0);
                    assert_eq!(b.total_biomass, 0.0);
                    assert_eq!(b.carbon_storage, 0.0);
                }
            }

            it "gives zero everywhere for zero height" {
                for c in CIRCUMFERENCES {
                    let b = estimate(c, 0.0).unwrap();
                    assert_eq!(b.above_ground_total_biomass, 0.0);
                    assert_eq!(b.total_biomass, 0.0);
                    assert_eq!(b.carbon_storage, 0.0);
                }
            }
        }

        describe "monotonicity" {
            it "never decreases with circumference" {
                for h in HEIGHTS {
                    let storage: Vec<f64> = CIRCUMFERENCES
                        .iter()
                        .map(|&c| estimate(c, h).unwrap().carbon_storage)
                        .collect();
                    assert!(storage.windows(2).all(|w| w[0] <= w[1]), "h={h}");
                }
            }

            it "never decreases with height" {
                for c in CIRCUMFERENCES {
                    let storage: Vec<f64> = HEIGHTS
                        .iter()
                        .map(|&h| estimate(c, h).unwrap().carbon_storage)
                        .collect();
                    assert!(storage.windows(2).all(|w| w[0] <= w[1]), "c={c}");
                }
            }
        }

        describe "domain errors" {
            it "rejects a negative height" {
                let err = estimate(50.0, -10.0).unwrap_err();
                assert_eq!(err.circumference, 50.0);
                assert_eq!(err.height, -10.0);
                assert!(err.base < 0.0);
            }

            it "rejects non-finite measurements instead of returning NaN" {
                assert!(estimate(f64::NAN, 1.0).is_err());
                assert!(estimate(1.0, f64::NAN).is_err());
                assert!(estimate(f64::INFINITY, 1.0).is_err());
            }
        }
    }

    describe "model constants" {
        it "keeps the calibrated coefficients" {
            assert_eq!(MODEL.stem.coefficient, 0.05466);
            assert_eq!(MODEL.stem.exponent, 0.945);
            assert_eq!(MODEL.branch.coefficient, 0.01579);
            assert_eq!(MODEL.branch.exponent, 0.9124);
            assert_eq!(MODEL.leaf.coefficient, 0.0678);
            assert_eq!(MODEL.leaf.exponent, 0.5806);
            assert_eq!(MODEL.root_ratio, 0.48);
            assert_eq!(MODEL.carbon_fraction, 0.4715);
        }
    }
}
