use image::DynamicImage;
use image::imageops::FilterType;

use crate::catalog::Catalog;
use crate::compose::{AppliedOperator, Composer, Pipeline, SweepSlot};
use crate::foundation::error::{AugsweepError, AugsweepResult};
use crate::foundation::repro::Reproducibility;
use crate::input::{self, InputItem};
use crate::job::{Job, PipelineMode};
use crate::layout::OutputLayout;
use crate::ops::OperatorRegistry;

use super::observer::JobObserver;
use super::state::{ExecutionState, JobReport, JobStatus, OutputRecord, UnitError};

/// Every check that must pass before a job may start: job validation, operator bindings, a unit
/// count that fits the counters, and a non-empty input item list.
pub fn preflight(
    catalog: &Catalog,
    registry: &OperatorRegistry,
    job: &Job,
) -> AugsweepResult<Vec<InputItem>> {
    job.validate(catalog)?;
    let mut names = Vec::with_capacity(job.selection.len());
    for n in job.selection.names() {
        names.push(catalog.lookup(n)?.name);
    }
    registry.check_bindings(names)?;
    let per_item = Composer::new(catalog, &job.selection)?.units_per_item(&job.mode);
    variants_per_item(per_item)?;
    let items = input::enumerate(&job.input)?;
    per_item.checked_mul(items.len() as u64).ok_or_else(|| {
        AugsweepError::validation(format!(
            "{per_item} units for each of {} items overflows the unit counter",
            items.len()
        ))
    })?;
    Ok(items)
}

fn variants_per_item(per_item: u64) -> AugsweepResult<u32> {
    u32::try_from(per_item).map_err(|_| {
        AugsweepError::validation(format!("{per_item} units per item exceeds {}", u32::MAX))
    })
}

/// Run `job` to completion on the calling thread.
///
/// Pre-flight failures are returned as errors and nothing is written. Once running, the job
/// always ends with a report, whatever happens to individual units. A cancellation left on
/// `state` by an earlier job is cleared before the first item.
pub fn run_job(
    catalog: &Catalog,
    registry: &OperatorRegistry,
    job: &Job,
    state: &ExecutionState,
    observer: &dyn JobObserver,
) -> AugsweepResult<JobReport> {
    let items = preflight(catalog, registry, job)?;
    state.clear_cancel();
    Ok(execute(catalog, registry, job, &items, state, observer))
}

/// Process pre-flighted `items` sequentially: items in order, variants in order within an item.
#[tracing::instrument(skip(catalog, registry, job, items, state, observer), fields(items = items.len()))]
pub fn execute(
    catalog: &Catalog,
    registry: &OperatorRegistry,
    job: &Job,
    items: &[InputItem],
    state: &ExecutionState,
    observer: &dyn JobObserver,
) -> JobReport {
    let mut report = JobReport {
        status: JobStatus::Running,
        ..JobReport::default()
    };

    let composer = match Composer::new(catalog, &job.selection) {
        Ok(c) => c,
        Err(e) => return fail(report, state, observer, e),
    };
    let mut repro = Reproducibility::new();
    repro.begin_job(job.mode.seed());
    let layout = OutputLayout::new(
        &job.output_root,
        job.output_format,
        job.jpeg_quality,
        repro.counter(),
    );

    let per_item = composer.units_per_item(&job.mode);
    let variants = match variants_per_item(per_item) {
        Ok(v) => v,
        Err(e) => return fail(report, state, observer, e),
    };
    report.requested_units = per_item.saturating_mul(items.len() as u64);
    state.reset(report.requested_units);

    if let Err(e) = layout.prepare_root() {
        return fail(report, state, observer, e);
    }

    let plan: Option<Vec<SweepSlot>> = match job.mode {
        PipelineMode::DeterministicSweep {
            steps_per_family, ..
        } => Some(composer.sweep_plan(steps_per_family)),
        PipelineMode::RandomSample { .. } => None,
    };

    let mut cancelled = false;
    'items: for (index, item) in items.iter().enumerate() {
        if state.is_cancelled() {
            cancelled = true;
            break;
        }
        observer.on_item_started(item, index, items.len());
        if state.is_cancelled() {
            cancelled = true;
            break;
        }

        let src = match item.load() {
            Ok(img) => img,
            Err(e) => {
                unit_failed(state, observer, item.id(), None, &e);
                state.record_failed(per_item);
                continue;
            }
        };

        if job.save_original {
            let dest = layout.original_destination(item.id());
            match layout.save(&src, &dest) {
                Ok(()) => report.originals.push(dest),
                Err(e) => unit_failed(state, observer, item.id(), None, &e),
            }
        }

        for variant in 1..=variants {
            if state.is_cancelled() {
                cancelled = true;
                break 'items;
            }
            let pipeline = match &plan {
                Some(plan) => match plan.get(variant as usize - 1) {
                    Some(slot) => composer.sweep_variant(variant, *slot, &mut repro),
                    None => Err(AugsweepError::validation(format!(
                        "sweep plan has no slot for variant {variant}"
                    ))),
                },
                None => composer.random_variant(variant, &mut repro),
            };
            let outcome = pipeline.and_then(|p| {
                produce_unit(registry, job, &layout, item.id(), &src, p)
            });
            match outcome {
                Ok(record) => {
                    state.record_completed();
                    observer.on_output(&record, state.progress());
                    report.records.push(record);
                }
                Err(e) => {
                    unit_failed(state, observer, item.id(), Some(variant), &e);
                    state.record_failed(1);
                }
            }
        }
    }

    let progress = state.progress();
    report.status = if cancelled {
        JobStatus::Cancelled
    } else {
        JobStatus::Completed
    };
    report.completed_units = progress.completed;
    report.failed_units = progress.failed;
    report.errors = state.errors();
    tracing::info!(status = ?report.status, "{}", report.summary());
    observer.on_finished(&report);
    report
}

/// Apply `pipeline` to a copy of `src` and write the result.
fn produce_unit(
    registry: &OperatorRegistry,
    job: &Job,
    layout: &OutputLayout,
    item_id: &str,
    src: &DynamicImage,
    pipeline: Pipeline,
) -> AugsweepResult<OutputRecord> {
    let mut img = apply_ops(registry, &pipeline.ops, src.clone())?;
    let same_size = img.width() == src.width() && img.height() == src.height();
    if job.keep_size && !job.mode.is_sweep() && !same_size {
        img = img.resize_exact(src.width(), src.height(), FilterType::Triangle);
    }
    let dest = layout.destination_for(item_id, &pipeline.family, &pipeline.label);
    layout.save(&img, &dest)?;
    Ok(OutputRecord {
        source_item_id: item_id.to_string(),
        variant_index: pipeline.variant,
        family: pipeline.family,
        label: pipeline.label,
        applied_operators: pipeline.ops,
        destination_path: dest,
    })
}

fn apply_ops(
    registry: &OperatorRegistry,
    ops: &[AppliedOperator],
    mut img: DynamicImage,
) -> AugsweepResult<DynamicImage> {
    for op in ops {
        img = registry.apply(&op.name, &op.params, img, op.seed)?;
    }
    Ok(img)
}

fn unit_failed(
    state: &ExecutionState,
    observer: &dyn JobObserver,
    item_id: &str,
    variant: Option<u32>,
    err: &AugsweepError,
) {
    tracing::warn!(item = item_id, variant = ?variant, "unit failed: {err}");
    let rec = UnitError::new(item_id, variant, err);
    observer.on_unit_error(&rec);
    state.push_error(rec);
}

fn fail(
    mut report: JobReport,
    state: &ExecutionState,
    observer: &dyn JobObserver,
    err: AugsweepError,
) -> JobReport {
    tracing::error!("job failed: {err}");
    report.status = JobStatus::Failed;
    report.failure = Some(err.to_string());
    report.errors = state.errors();
    observer.on_finished(&report);
    report
}

/// Result of [`preview`]: the pipeline that was applied and its output.
#[derive(Clone, Debug)]
pub struct Preview {
    pub item_id: String,
    pub ops: Vec<AppliedOperator>,
    pub image: DynamicImage,
}

/// Apply one pipeline to item `item_index` in memory, writing nothing.
///
/// Random mode uses the job's first variant; sweep mode chains the first step of every family.
pub fn preview(
    catalog: &Catalog,
    registry: &OperatorRegistry,
    job: &Job,
    item_index: usize,
) -> AugsweepResult<Preview> {
    let items = preflight(catalog, registry, job)?;
    let item = items.get(item_index).ok_or_else(|| {
        AugsweepError::validation(format!(
            "item index {item_index} is out of range ({} items)",
            items.len()
        ))
    })?;
    let composer = Composer::new(catalog, &job.selection)?;
    let mut repro = Reproducibility::new();
    repro.begin_job(job.mode.seed());

    let ops = match job.mode {
        PipelineMode::RandomSample { .. } => composer.random_variant(1, &mut repro)?.ops,
        PipelineMode::DeterministicSweep {
            steps_per_family, ..
        } => {
            let mut ops = Vec::new();
            for slot in composer
                .sweep_plan(steps_per_family)
                .into_iter()
                .filter(|s| s.step == 1)
            {
                ops.extend(composer.sweep_variant(1, slot, &mut repro)?.ops);
            }
            ops
        }
    };
    let image = apply_ops(registry, &ops, item.load()?)?;
    Ok(Preview {
        item_id: item.id().to_string(),
        ops,
        image,
    })
}
