use super::*;

#[test]
fn progress_fraction_tracks_completed_units() {
    let st = ExecutionState::new();
    assert_eq!(st.progress().fraction(), 0.0);
    st.reset(4);
    st.record_completed();
    st.record_failed(1);
    let p = st.progress();
    assert_eq!((p.total, p.completed, p.failed), (4, 1, 1));
    assert!((p.fraction() - 0.25).abs() < 1e-12);
}

#[test]
fn reset_clears_errors_but_keeps_cancellation() {
    let st = ExecutionState::new();
    st.push_error(UnitError::new("a", Some(2), &AugsweepError::operator("boom")));
    st.cancel();
    st.reset(3);
    assert!(st.errors().is_empty());
    assert!(st.is_cancelled());
    assert!(st.progress().cancelled);
}

#[test]
fn unit_errors_keep_kind_and_message() {
    let e = UnitError::new("cat", None, &AugsweepError::io("decode failed"));
    assert_eq!(e.kind, ErrorKind::Io);
    assert_eq!(e.message, "io error: decode failed");
    assert_eq!(e.variant, None);
}

#[test]
fn report_serializes_status_in_snake_case() {
    let report = JobReport {
        status: JobStatus::Cancelled,
        requested_units: 10,
        completed_units: 3,
        failed_units: 1,
        ..JobReport::default()
    };
    let json = report.to_json_pretty().unwrap();
    assert!(json.contains("\"status\": \"cancelled\""));
    assert!(!json.contains("failure"));
    assert_eq!(report.summary(), "produced 3 of 10 requested units, 1 failed");

    let back: JobReport = serde_json::from_str(&json).unwrap();
    assert_eq!(back, report);
}

#[test]
fn terminal_states() {
    assert!(!JobStatus::Idle.is_terminal());
    assert!(!JobStatus::Running.is_terminal());
    assert!(JobStatus::Failed.is_terminal());
}
