use super::*;
use crate::catalog::ParamDef;

fn seeded(seed: u64) -> Reproducibility {
    let mut r = Reproducibility::new();
    r.begin_job(seed);
    r
}

#[test]
fn empty_and_fixed_ignore_mode() {
    let mut r = seeded(1);
    for mode in [SampleMode::Random, SampleMode::Sweep { step: 3, steps: 5 }] {
        assert_eq!(
            resolve(&ParameterSpec::Empty, SweepLaw::Linear, mode, &mut r).unwrap(),
            None
        );
        assert_eq!(
            resolve(&ParameterSpec::fixed(2.5), SweepLaw::Linear, mode, &mut r).unwrap(),
            Some(2.5)
        );
    }
}

#[test]
fn random_draws_stay_in_range_and_vary() {
    let mut r = seeded(42);
    let spec = ParameterSpec::range(-30.0, 30.0);
    let draws: Vec<f64> = (0..32)
        .map(|_| {
            resolve(&spec, SweepLaw::Linear, SampleMode::Random, &mut r)
                .unwrap()
                .unwrap()
        })
        .collect();
    assert!(draws.iter().all(|v| (-30.0..=30.0).contains(v)));
    assert!(draws.windows(2).any(|w| w[0] != w[1]));
}

#[test]
fn sweep_is_monotonic_and_hits_endpoints_for_every_law() {
    let cases = [
        (SweepLaw::Linear, -30.0, 30.0),
        (SweepLaw::BorderFromArea, 0.02, 0.34),
        (SweepLaw::ScaleFromArea, 0.1, 0.9),
    ];
    let mut r = seeded(0);
    for (law, min, max) in cases {
        let spec = ParameterSpec::range(min, max);
        let steps = 9;
        let values: Vec<f64> = (1..=steps)
            .map(|step| {
                resolve(&spec, law, SampleMode::Sweep { step, steps }, &mut r)
                    .unwrap()
                    .unwrap()
            })
            .collect();
        assert!((values[0] - min).abs() < 1e-9, "{law:?} start {}", values[0]);
        assert!((values[8] - max).abs() < 1e-9, "{law:?} end {}", values[8]);
        assert!(
            values.windows(2).all(|w| w[0] < w[1]),
            "{law:?} not increasing: {values:?}"
        );
    }
}

#[test]
fn border_law_walks_area_evenly() {
    // (1 - 2b)^2 should move in equal steps
    let areas: Vec<f64> = (0..=4)
        .map(|i| {
            let b = sweep_value(0.0, 0.25, SweepLaw::BorderFromArea, f64::from(i) / 4.0).unwrap();
            (1.0 - 2.0 * b).powi(2)
        })
        .collect();
    let deltas: Vec<f64> = areas.windows(2).map(|w| w[0] - w[1]).collect();
    for d in &deltas {
        assert!((d - deltas[0]).abs() < 1e-9);
    }
}

#[test]
fn single_step_sweep_uses_midpoint() {
    let mut r = seeded(0);
    let v = resolve(
        &ParameterSpec::range(10.0, 20.0),
        SweepLaw::Linear,
        SampleMode::Sweep { step: 1, steps: 1 },
        &mut r,
    )
    .unwrap();
    assert_eq!(v, Some(15.0));
}

#[test]
fn malformed_inputs_fail_without_clamping() {
    let mut r = seeded(0);
    let inverted = ParameterSpec::range(5.0, 1.0);
    for mode in [SampleMode::Random, SampleMode::Sweep { step: 1, steps: 3 }] {
        let err = resolve(&inverted, SweepLaw::Linear, mode, &mut r).unwrap_err();
        assert!(matches!(err, AugsweepError::InvalidParameterSpec(_)));
    }
    let err = resolve(
        &ParameterSpec::range(0.0, 1.0),
        SweepLaw::Linear,
        SampleMode::Sweep { step: 4, steps: 3 },
        &mut r,
    )
    .unwrap_err();
    assert!(matches!(err, AugsweepError::InvalidParameterSpec(_)));
}

#[test]
fn secondary_ranges_hold_midpoint_in_sweep() {
    let params = [
        ParamDef::fixed("loc", 0.0),
        ParamDef::range("scale", 0.0, 10.0),
        ParamDef::range("angle", -40.0, 40.0),
    ];
    let mut r = seeded(0);
    let first = resolve_params(&params, SampleMode::Sweep { step: 1, steps: 5 }, &mut r).unwrap();
    let last = resolve_params(&params, SampleMode::Sweep { step: 5, steps: 5 }, &mut r).unwrap();
    assert_eq!(first.get("loc"), Some(0.0));
    assert_eq!(first.get("scale"), Some(0.0));
    assert_eq!(last.get("scale"), Some(10.0));
    assert_eq!(first.get("angle"), Some(0.0));
    assert_eq!(last.get("angle"), Some(0.0));
    let names: Vec<&str> = first.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["loc", "scale", "angle"]);
}

#[test]
fn unknown_operator_is_an_invalid_spec() {
    let catalog = Catalog::builtin();
    let mut r = seeded(0);
    let err = resolve_named(&catalog, "Nope", SampleMode::Random, &mut r).unwrap_err();
    assert!(matches!(err, AugsweepError::InvalidParameterSpec(_)));
    let ok = resolve_named(&catalog, "FlipUpDown", SampleMode::Random, &mut r).unwrap();
    assert!(ok.is_empty());
}
