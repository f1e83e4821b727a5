use super::*;

#[test]
fn minimal_job_file_takes_defaults() {
    let job = Job::from_json_str(
        r#"{
            "input": {"kind": "directory", "path": "in"},
            "output_root": "out",
            "selection": ["Rotate"]
        }"#,
    )
    .unwrap();
    assert_eq!(job.mode, PipelineMode::random(5, 42));
    assert_eq!(job.output_format, OutputFormat::Png);
    assert_eq!(job.jpeg_quality, 95);
    assert!(!job.keep_size);
    assert!(!job.save_original);
}

#[test]
fn sweep_mode_and_format_aliases_parse() {
    let job = Job::from_json_str(
        r#"{
            "input": {"kind": "remote", "urls": ["https://example.com/a/cat.jpg"]},
            "output_root": "out",
            "selection": ["Crop"],
            "mode": {"kind": "deterministic_sweep"},
            "output_format": "jpg"
        }"#,
    )
    .unwrap();
    assert_eq!(
        job.mode,
        PipelineMode::DeterministicSweep {
            steps_per_family: 9,
            seed: 42
        }
    );
    assert_eq!(job.output_format, OutputFormat::Jpeg);
    assert_eq!(job.output_format.extension(), "jpg");
}

#[test]
fn job_json_survives_a_write_and_read() {
    let job = Job::new(
        InputSource::File {
            path: "a.png".into(),
        },
        "out",
        SelectionSet::of(["Rotate", "Grid"]),
        PipelineMode::sweep(4),
    );
    let s = job.to_json_pretty().unwrap();
    assert_eq!(Job::from_json_str(&s).unwrap(), job);
}

#[test]
fn validate_reports_preflight_problems() {
    let catalog = Catalog::builtin();
    let dir = std::env::temp_dir();

    let mut job = Job::new(
        InputSource::Directory { path: dir.clone() },
        "out",
        SelectionSet::new(),
        PipelineMode::default(),
    );
    assert!(matches!(
        job.validate(&catalog),
        Err(AugsweepError::NoOperatorsSelected)
    ));

    job.selection = SelectionSet::of(["Rotate"]);
    job.validate(&catalog).unwrap();

    job.mode = PipelineMode::random(0, 1);
    assert!(matches!(
        job.validate(&catalog),
        Err(AugsweepError::Validation(_))
    ));

    job.mode = PipelineMode::default();
    job.input = InputSource::Directory {
        path: dir.join("augsweep-does-not-exist-7f3a"),
    };
    assert!(matches!(
        job.validate(&catalog),
        Err(AugsweepError::NoInputItemsFound(_))
    ));

    job.input = InputSource::Remote {
        urls: vec!["ftp://host/x.png".to_string()],
    };
    assert!(job.validate(&catalog).is_err());
}

#[test]
fn output_format_parses_loosely() {
    assert_eq!("JPEG".parse::<OutputFormat>().unwrap(), OutputFormat::Jpeg);
    assert_eq!("tif".parse::<OutputFormat>().unwrap(), OutputFormat::Tiff);
    assert!("gif".parse::<OutputFormat>().is_err());
}
