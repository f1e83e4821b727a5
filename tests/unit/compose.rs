use super::*;

fn seeded(seed: u64) -> Reproducibility {
    let mut r = Reproducibility::new();
    r.begin_job(seed);
    r
}

fn run_random(catalog: &Catalog, sel: &SelectionSet, seed: u64, n: u32) -> Vec<Pipeline> {
    let composer = Composer::new(catalog, sel).unwrap();
    let mut repro = seeded(seed);
    (1..=n)
        .map(|v| composer.random_variant(v, &mut repro).unwrap())
        .collect()
}

#[test]
fn empty_selection_is_rejected() {
    let catalog = Catalog::builtin();
    let err = Composer::new(&catalog, &SelectionSet::new()).err().unwrap();
    assert!(matches!(err, AugsweepError::NoOperatorsSelected));
}

#[test]
fn unknown_name_is_rejected() {
    let catalog = Catalog::builtin();
    let err = Composer::new(&catalog, &SelectionSet::of(["Rotate", "Wobble"]))
        .err()
        .unwrap();
    assert!(matches!(err, AugsweepError::UnknownOperator(ref n) if n == "Wobble"));
}

#[test]
fn random_variants_contain_every_operator_and_reproduce() {
    let catalog = Catalog::builtin();
    let sel = SelectionSet::of(["Rotate", "GaussianBlur", "AddToHue", "Grayscale"]);
    let a = run_random(&catalog, &sel, 42, 5);
    let b = run_random(&catalog, &sel, 42, 5);
    assert_eq!(a, b);

    for p in &a {
        let mut names: Vec<&str> = p.ops.iter().map(|o| o.name.as_str()).collect();
        names.sort_unstable();
        assert_eq!(names, ["AddToHue", "GaussianBlur", "Grayscale", "Rotate"]);
        assert_eq!(p.family, RANDOM_FAMILY);
    }
    assert_eq!(a[0].label, "01");
    assert_eq!(a[4].label, "05");

    let c = run_random(&catalog, &sel, 7, 5);
    assert_ne!(a, c);
}

#[test]
fn parameters_are_drawn_fresh_per_variant() {
    let catalog = Catalog::builtin();
    let sel = SelectionSet::of(["Rotate"]);
    let runs = run_random(&catalog, &sel, 42, 4);
    let angles: Vec<f64> = runs
        .iter()
        .map(|p| p.ops[0].params.get("rotate").unwrap())
        .collect();
    assert!(angles.windows(2).any(|w| w[0] != w[1]));
}

#[test]
fn overrides_narrow_draws_and_are_bounds_checked() {
    let catalog = Catalog::builtin();
    let sel = SelectionSet::new().with(SelectionEntry::new("Rotate").with_range("rotate", 5.0, 6.0));
    for p in run_random(&catalog, &sel, 3, 10) {
        let v = p.ops[0].params.get("rotate").unwrap();
        assert!((5.0..=6.0).contains(&v));
    }

    let outside =
        SelectionSet::new().with(SelectionEntry::new("Rotate").with_range("rotate", -90.0, 0.0));
    let err = Composer::new(&catalog, &outside).err().unwrap();
    assert!(matches!(err, AugsweepError::InvalidParameterSpec(_)));

    let inverted =
        SelectionSet::new().with(SelectionEntry::new("Rotate").with_range("rotate", 10.0, 0.0));
    assert!(Composer::new(&catalog, &inverted).is_err());

    let unknown_param =
        SelectionSet::new().with(SelectionEntry::new("Rotate").with_range("angle", 0.0, 1.0));
    assert!(Composer::new(&catalog, &unknown_param).is_err());
}

#[test]
fn sweep_plan_isolates_families() {
    let catalog = Catalog::builtin();
    let sel = SelectionSet::of(["Rotate", "FlipLeftRight"])
        .with(SelectionEntry::new("JpegCompression").with_steps(3));
    let composer = Composer::new(&catalog, &sel).unwrap();
    let mode = PipelineMode::sweep(8);
    assert_eq!(composer.units_per_item(&mode), 8 + 1 + 3);

    let plan = composer.sweep_plan(8);
    assert_eq!(plan.len(), 12);
    let mut repro = seeded(42);
    let pipelines: Vec<Pipeline> = plan
        .iter()
        .enumerate()
        .map(|(i, slot)| {
            composer
                .sweep_variant(i as u32 + 1, *slot, &mut repro)
                .unwrap()
        })
        .collect();
    assert!(pipelines.iter().all(|p| p.ops.len() == 1));

    let rotate: Vec<f64> = pipelines[..8]
        .iter()
        .map(|p| p.ops[0].params.get("rotate").unwrap())
        .collect();
    assert_eq!(rotate[0], -30.0);
    assert_eq!(rotate[7], 30.0);
    assert!(rotate.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(pipelines[0].label, "-30deg");

    assert_eq!(pipelines[8].family, "flip_left_right");
    assert_eq!(pipelines[8].label, "step1");
    assert_eq!(pipelines[9].label, "q10");
    assert_eq!(pipelines[11].label, "q90");
}

#[test]
fn recommended_selection_is_seeded_and_capped() {
    let catalog = Catalog::builtin();
    let a = SelectionSet::recommended(&catalog, 42);
    let b = SelectionSet::recommended(&catalog, 42);
    assert_eq!(a, b);
    assert!(!a.is_empty());
    assert!(a.len() <= RECOMMENDED_CAP);
    for name in a.names() {
        assert!(catalog.lookup(name).unwrap().recommended);
    }
}

#[test]
fn category_selection_takes_every_member() {
    let catalog = Catalog::builtin();
    let sel = SelectionSet::from_category(&catalog, Category::Weather);
    let names: Vec<&str> = sel.names().collect();
    assert_eq!(names, ["Clouds", "Rain", "Snowflakes", "Fog"]);
}

#[test]
fn selection_json_accepts_bare_names() {
    let json = r#"["Rotate", {"operator": "Crop", "overrides": {"border_ratio": {"min": 0.05, "max": 0.2}}, "steps": 4}]"#;
    let sel: SelectionSet = serde_json::from_str(json).unwrap();
    assert_eq!(sel.len(), 2);
    assert_eq!(sel.entries()[0], SelectionEntry::new("Rotate"));
    assert_eq!(sel.entries()[1].steps, Some(4));
    assert_eq!(
        sel.entries()[1].overrides["border_ratio"],
        RangeOverride {
            min: 0.05,
            max: 0.2
        }
    );
}

#[test]
fn names_differing_only_in_case_select_one_operator() {
    let catalog = Catalog::builtin();
    let sel = SelectionSet::of(["Rotate", "rotate", " ROTATE "]);
    assert_eq!(sel.len(), 1);
    let composer = Composer::new(&catalog, &sel).unwrap();
    assert_eq!(composer.units_per_item(&PipelineMode::sweep(8)), 8);
    let p = composer.random_variant(1, &mut seeded(3)).unwrap();
    assert_eq!(p.ops.len(), 1);

    // a job file can still list both spellings
    let json = r#"["Rotate", {"operator": "rotate", "steps": 2}]"#;
    let sel: SelectionSet = serde_json::from_str(json).unwrap();
    assert_eq!(sel.len(), 2);
    let err = Composer::new(&catalog, &sel).err().unwrap();
    assert!(matches!(err, AugsweepError::Validation(ref m) if m.contains("more than once")));
}
