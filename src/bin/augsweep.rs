use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use augsweep::{
    Catalog, Category, Engine, InputSource, Job, JobReport, JobStatus, LogObserver, OutputFormat,
    PipelineMode, SelectionEntry, SelectionSet,
};

#[derive(Parser, Debug)]
#[command(name = "augsweep", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write randomized augmentation variants for every input image.
    Augment(AugmentArgs),
    /// Write an evenly spaced parameter ladder per operator family.
    Sweep(SweepArgs),
    /// Run a JSON job file as written.
    Run(RunArgs),
    /// Apply one pipeline to one input image and write only that image.
    Preview(PreviewArgs),
    /// List the operator catalog.
    Catalog(CatalogArgs),
}

#[derive(Args, Debug)]
struct JobArgs {
    /// JSON job file to start from; flags below override its fields.
    #[arg(long)]
    job: Option<PathBuf>,

    /// Input image file or directory.
    #[arg(long, conflicts_with = "url")]
    input: Option<PathBuf>,

    /// Remote input image (repeatable).
    #[arg(long)]
    url: Vec<String>,

    /// Output root directory.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Operator to select (repeatable).
    #[arg(long = "op")]
    ops: Vec<String>,

    /// Select a whole category.
    #[arg(long)]
    category: Option<Category>,

    /// Select a seeded sample of recommended operators.
    #[arg(long, default_value_t = false)]
    recommended: bool,

    /// Narrow a parameter range: `Operator.param=min:max` (repeatable).
    #[arg(long = "range")]
    ranges: Vec<String>,

    /// Generator seed.
    #[arg(long)]
    seed: Option<u64>,

    /// Output image format (png, jpg, bmp, tiff).
    #[arg(long)]
    format: Option<OutputFormat>,

    /// JPEG quality (1-100).
    #[arg(long)]
    jpeg_quality: Option<u8>,

    /// Also write each input once, untransformed.
    #[arg(long, default_value_t = false)]
    save_original: bool,

    /// Write the job report as JSON.
    #[arg(long)]
    manifest: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct AugmentArgs {
    #[command(flatten)]
    job: JobArgs,

    /// Variants per input image.
    #[arg(long)]
    count: Option<u32>,

    /// Resize every variant back to its source size.
    #[arg(long, default_value_t = false)]
    keep_size: bool,
}

#[derive(Parser, Debug)]
struct SweepArgs {
    #[command(flatten)]
    job: JobArgs,

    /// Steps per operator family.
    #[arg(long)]
    steps: Option<u32>,
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// JSON job file.
    #[arg(long)]
    job: PathBuf,

    /// Write the job report as JSON.
    #[arg(long)]
    manifest: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct PreviewArgs {
    #[command(flatten)]
    job: JobArgs,

    /// Preview the first sweep step of every family instead of a random variant.
    #[arg(long, default_value_t = false)]
    sweep: bool,

    /// Index of the input image to preview (0-based, in processing order).
    #[arg(long, default_value_t = 0)]
    item: usize,

    /// Path of the preview image.
    #[arg(long)]
    save: PathBuf,
}

#[derive(Parser, Debug)]
struct CatalogArgs {
    /// Only list this category.
    #[arg(long)]
    category: Option<Category>,

    /// Print JSON instead of a table.
    #[arg(long, default_value_t = false)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Augment(args) => cmd_augment(args),
        Command::Sweep(args) => cmd_sweep(args),
        Command::Run(args) => cmd_run(args),
        Command::Preview(args) => cmd_preview(args),
        Command::Catalog(args) => cmd_catalog(args),
    }
}

fn cmd_augment(args: AugmentArgs) -> anyhow::Result<()> {
    let engine = Engine::builtin();
    let mut job = build_job(&args.job, engine.catalog())?;
    let (count, seed) = match job.mode {
        PipelineMode::RandomSample {
            invocations_per_item,
            seed,
        } => (invocations_per_item, seed),
        PipelineMode::DeterministicSweep { seed, .. } => (augsweep::job::DEFAULT_INVOCATIONS, seed),
    };
    job.mode = PipelineMode::random(
        args.count.unwrap_or(count),
        args.job.seed.unwrap_or(seed),
    );
    job.keep_size |= args.keep_size;
    run(&engine, job, args.job.manifest.as_deref())
}

fn cmd_sweep(args: SweepArgs) -> anyhow::Result<()> {
    let engine = Engine::builtin();
    let mut job = build_job(&args.job, engine.catalog())?;
    job.mode = sweep_mode(job.mode, args.steps, args.job.seed);
    run(&engine, job, args.job.manifest.as_deref())
}

fn cmd_run(args: RunArgs) -> anyhow::Result<()> {
    let engine = Engine::builtin();
    let job = Job::from_path(&args.job)?;
    run(&engine, job, args.manifest.as_deref())
}

fn cmd_preview(args: PreviewArgs) -> anyhow::Result<()> {
    let engine = Engine::builtin();
    let mut job = build_job(&args.job, engine.catalog())?;
    if args.sweep {
        job.mode = sweep_mode(job.mode, None, args.job.seed);
    } else if let Some(seed) = args.job.seed {
        job.mode = match job.mode {
            PipelineMode::RandomSample {
                invocations_per_item,
                ..
            } => PipelineMode::random(invocations_per_item, seed),
            PipelineMode::DeterministicSweep {
                steps_per_family, ..
            } => PipelineMode::DeterministicSweep {
                steps_per_family,
                seed,
            },
        };
    }

    let preview = engine.preview(&job, args.item)?;
    let format = job.output_format;
    augsweep::layout::save_image(&preview.image, &args.save, format, job.jpeg_quality)?;
    for op in &preview.ops {
        let params: Vec<String> = op
            .params
            .iter()
            .map(|p| format!("{}={:.3}", p.name, p.value))
            .collect();
        eprintln!("  {} {}", op.name, params.join(" "));
    }
    eprintln!("wrote {}", args.save.display());
    Ok(())
}

fn cmd_catalog(args: CatalogArgs) -> anyhow::Result<()> {
    let catalog = Catalog::builtin();
    let descs: Vec<_> = match args.category {
        Some(c) => catalog.list_by_category(c),
        None => catalog.iter().collect(),
    };
    if args.json {
        let s = serde_json::to_string_pretty(&descs).context("serialize catalog")?;
        println!("{s}");
        return Ok(());
    }
    for d in descs {
        let params: Vec<String> = d
            .params
            .iter()
            .map(|p| match p.spec {
                augsweep::ParameterSpec::Range { min, max } => format!("{}=[{min}, {max}]", p.name),
                augsweep::ParameterSpec::Fixed { value } => format!("{}={value}", p.name),
                augsweep::ParameterSpec::Empty => p.name.to_string(),
            })
            .collect();
        let mark = if d.recommended { "*" } else { " " };
        println!(
            "{mark} {:<24} {:<16} {}",
            d.name,
            d.category.as_str(),
            params.join(" ")
        );
    }
    Ok(())
}

fn run(engine: &Engine, job: Job, manifest: Option<&Path>) -> anyhow::Result<()> {
    let root = job.output_root.clone();
    let handle = engine.start(job, Arc::new(LogObserver))?;
    let report = handle.join()?;

    if let Some(path) = manifest {
        write_manifest(&report, path)?;
        eprintln!("wrote {}", path.display());
    }
    if report.status == JobStatus::Failed {
        anyhow::bail!(
            "job failed: {}",
            report.failure.as_deref().unwrap_or("unknown failure")
        );
    }
    eprintln!("{} into {}", report.summary(), root.display());
    Ok(())
}

fn write_manifest(report: &JobReport, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create manifest dir '{}'", parent.display()))?;
    }
    std::fs::write(path, report.to_json_pretty()?)
        .with_context(|| format!("write manifest '{}'", path.display()))?;
    Ok(())
}

fn sweep_mode(current: PipelineMode, steps: Option<u32>, seed: Option<u64>) -> PipelineMode {
    let (cur_steps, cur_seed) = match current {
        PipelineMode::DeterministicSweep {
            steps_per_family,
            seed,
        } => (steps_per_family, seed),
        PipelineMode::RandomSample { seed, .. } => (augsweep::job::DEFAULT_STEPS, seed),
    };
    PipelineMode::DeterministicSweep {
        steps_per_family: steps.unwrap_or(cur_steps),
        seed: seed.unwrap_or(cur_seed),
    }
}

/// Job from `--job` (if given) with every flag applied over it.
fn build_job(args: &JobArgs, catalog: &Catalog) -> anyhow::Result<Job> {
    let base = args.job.as_deref().map(Job::from_path).transpose()?;

    let input = match (&args.input, args.url.is_empty()) {
        (Some(p), _) => Some(InputSource::from_path(p)),
        (None, false) => Some(InputSource::Remote {
            urls: args.url.clone(),
        }),
        (None, true) => None,
    };
    let seed = args
        .seed
        .or_else(|| base.as_ref().map(|j| j.mode.seed()))
        .unwrap_or(augsweep::job::DEFAULT_SEED);

    let mut selection = if args.recommended {
        SelectionSet::recommended(catalog, seed)
    } else {
        SelectionSet::new()
    };
    if let Some(c) = args.category {
        for e in SelectionSet::from_category(catalog, c).entries() {
            selection.insert(e.clone());
        }
    }
    for op in &args.ops {
        selection.insert(SelectionEntry::new(op.clone()));
    }

    let mut job = match base {
        Some(mut job) => {
            if let Some(input) = input {
                job.input = input;
            }
            if let Some(out) = &args.out {
                job.output_root = out.clone();
            }
            if !selection.is_empty() {
                job.selection = selection;
            }
            job
        }
        None => {
            let input = input.context("one of --input, --url or --job is required")?;
            let out = args.out.clone().context("--out is required without --job")?;
            Job::new(input, out, selection, PipelineMode::default())
        }
    };

    for spec in &args.ranges {
        apply_range(&mut job.selection, spec)?;
    }
    if let Some(f) = args.format {
        job.output_format = f;
    }
    if let Some(q) = args.jpeg_quality {
        job.jpeg_quality = q;
    }
    job.save_original |= args.save_original;
    Ok(job)
}

/// Parse `Operator.param=min:max` and narrow that entry of `selection`.
fn apply_range(selection: &mut SelectionSet, spec: &str) -> anyhow::Result<()> {
    let bad = || format!("--range '{spec}' is not of the form Operator.param=min:max");
    let (target, bounds) = spec.split_once('=').with_context(bad)?;
    let (op, param) = target.split_once('.').with_context(bad)?;
    let (min, max) = bounds.split_once(':').with_context(bad)?;
    let min: f64 = min.trim().parse().with_context(bad)?;
    let max: f64 = max.trim().parse().with_context(bad)?;

    let entry = selection
        .get_mut(op.trim())
        .with_context(|| format!("--range names operator '{op}', which is not selected"))?;
    entry
        .overrides
        .insert(param.trim().to_string(), augsweep::compose::RangeOverride { min, max });
    Ok(())
}
