//! Selection sets and the Pipeline Composer.

use std::collections::BTreeMap;

use rand::{Rng, SeedableRng, seq::SliceRandom};
use rand_chacha::ChaCha8Rng;

use crate::catalog::{Catalog, Category, OperatorDescriptor, ParamDef, ParameterSpec};
use crate::foundation::error::{AugsweepError, AugsweepResult};
use crate::foundation::repro::Reproducibility;
use crate::job::PipelineMode;
use crate::sampler::{self, ConcreteParams, SampleMode};

/// Upper bound on the size of a recommended selection.
pub const RECOMMENDED_CAP: usize = 10;

/// Family slug used for every randomized variant.
pub const RANDOM_FAMILY: &str = "aug";

/// Narrowed bounds for one named range parameter.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RangeOverride {
    pub min: f64,
    pub max: f64,
}

/// One selected operator with optional per-parameter range overrides.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(from = "EntryRepr")]
pub struct SelectionEntry {
    pub operator: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub overrides: BTreeMap<String, RangeOverride>,
    /// Sweep step count for this family, overriding the job-wide value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub steps: Option<u32>,
}

// Job files may list a bare operator name instead of a full entry.
#[derive(serde::Deserialize)]
#[serde(untagged)]
enum EntryRepr {
    Name(String),
    Full {
        operator: String,
        #[serde(default)]
        overrides: BTreeMap<String, RangeOverride>,
        #[serde(default)]
        steps: Option<u32>,
    },
}

impl From<EntryRepr> for SelectionEntry {
    fn from(r: EntryRepr) -> Self {
        match r {
            EntryRepr::Name(operator) => SelectionEntry::new(operator),
            EntryRepr::Full {
                operator,
                overrides,
                steps,
            } => SelectionEntry {
                operator,
                overrides,
                steps,
            },
        }
    }
}

impl SelectionEntry {
    pub fn new(operator: impl Into<String>) -> Self {
        Self {
            operator: operator.into(),
            overrides: BTreeMap::new(),
            steps: None,
        }
    }

    /// Builder: narrow `param` to `[min, max]`.
    pub fn with_range(mut self, param: impl Into<String>, min: f64, max: f64) -> Self {
        self.overrides
            .insert(param.into(), RangeOverride { min, max });
        self
    }

    /// Builder: override the sweep step count.
    pub fn with_steps(mut self, steps: u32) -> Self {
        self.steps = Some(steps);
        self
    }

    /// The descriptor's parameters with this entry's overrides applied.
    ///
    /// Overrides must name a declared range parameter and stay inside its bounds.
    pub fn effective_params(&self, desc: &OperatorDescriptor) -> AugsweepResult<Vec<ParamDef>> {
        for (name, ov) in &self.overrides {
            let def = desc.param_named(name).ok_or_else(|| {
                AugsweepError::invalid_param(format!(
                    "operator '{}' has no parameter '{name}'",
                    desc.name
                ))
            })?;
            let ParameterSpec::Range { min, max } = def.spec else {
                return Err(AugsweepError::invalid_param(format!(
                    "{}.{name} is not a range parameter",
                    desc.name
                )));
            };
            ParameterSpec::range(ov.min, ov.max).validate()?;
            if ov.min < min || ov.max > max {
                return Err(AugsweepError::invalid_param(format!(
                    "{}.{name} override [{}, {}] leaves declared range [{min}, {max}]",
                    desc.name, ov.min, ov.max
                )));
            }
        }
        if self.steps == Some(0) {
            return Err(AugsweepError::validation(format!(
                "operator '{}' requests zero sweep steps",
                desc.name
            )));
        }
        Ok(desc
            .params
            .iter()
            .map(|p| match self.overrides.get(p.name) {
                Some(ov) => ParamDef {
                    spec: ParameterSpec::range(ov.min, ov.max),
                    ..*p
                },
                None => *p,
            })
            .collect())
    }
}

/// Ordered, duplicate-free set of selected operators.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct SelectionSet(Vec<SelectionEntry>);

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select operators by name, without overrides.
    pub fn of<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut out = Self::new();
        for n in names {
            out.insert(SelectionEntry::new(n));
        }
        out
    }

    /// Every operator of `category`, in catalog order.
    pub fn from_category(catalog: &Catalog, category: Category) -> Self {
        Self::of(catalog.list_by_category(category).into_iter().map(|d| d.name))
    }

    /// One or two operators from each category's recommended pool, at most
    /// [`RECOMMENDED_CAP`] in total. The pick depends only on `seed` and the catalog.
    pub fn recommended(catalog: &Catalog, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut out = Self::new();
        for cat in Category::ALL {
            let mut pool: Vec<&str> = catalog
                .list_by_category(cat)
                .into_iter()
                .filter(|d| d.recommended)
                .map(|d| d.name)
                .collect();
            if pool.is_empty() {
                continue;
            }
            pool.shuffle(&mut rng);
            let take = rng.gen_range(1..=pool.len().min(2));
            for name in pool.into_iter().take(take) {
                if out.len() >= RECOMMENDED_CAP {
                    return out;
                }
                out.insert(SelectionEntry::new(name));
            }
        }
        out
    }

    /// Add an entry, replacing any existing entry for the same operator in place.
    ///
    /// Names compare ASCII case-insensitively, like [`Catalog::get`].
    pub fn insert(&mut self, entry: SelectionEntry) {
        match self.0.iter_mut().find(|e| same_name(&e.operator, &entry.operator)) {
            Some(slot) => *slot = entry,
            None => self.0.push(entry),
        }
    }

    /// Builder form of [`SelectionSet::insert`].
    pub fn with(mut self, entry: SelectionEntry) -> Self {
        self.insert(entry);
        self
    }

    pub fn get_mut(&mut self, operator: &str) -> Option<&mut SelectionEntry> {
        self.0.iter_mut().find(|e| same_name(&e.operator, operator))
    }

    pub fn entries(&self) -> &[SelectionEntry] {
        &self.0
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|e| e.operator.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn same_name(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

/// One operator application inside a pipeline.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AppliedOperator {
    pub name: String,
    pub params: ConcreteParams,
    /// Seed for any randomness inside the operator itself (noise, line placement).
    pub seed: u64,
}

/// A fully resolved pipeline for one variant of one item.
#[derive(Clone, Debug, PartialEq)]
pub struct Pipeline {
    /// 1-based variant index within the item.
    pub variant: u32,
    /// Family slug for the output file name.
    pub family: String,
    /// Human-readable parameter label for the output file name.
    pub label: String,
    /// Operators in application order.
    pub ops: Vec<AppliedOperator>,
}

/// One sweep output slot: which family, and which step of how many.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SweepSlot {
    entry: usize,
    pub step: u32,
    pub steps: u32,
}

struct Resolved<'a> {
    desc: &'a OperatorDescriptor,
    params: Vec<ParamDef>,
    steps: Option<u32>,
}

/// Builds pipelines from a validated selection.
pub struct Composer<'a> {
    entries: Vec<Resolved<'a>>,
}

impl<'a> Composer<'a> {
    /// Resolve every selected name against the catalog and check overrides.
    ///
    /// Two entries resolving to the same cataloged operator are a validation error.
    pub fn new(catalog: &'a Catalog, selection: &SelectionSet) -> AugsweepResult<Self> {
        if selection.is_empty() {
            return Err(AugsweepError::NoOperatorsSelected);
        }
        let mut entries: Vec<Resolved<'a>> = Vec::with_capacity(selection.len());
        for e in selection.entries() {
            let desc = catalog.lookup(&e.operator)?;
            if entries.iter().any(|r| r.desc.name == desc.name) {
                return Err(AugsweepError::validation(format!(
                    "operator '{}' is selected more than once (as '{}')",
                    desc.name, e.operator
                )));
            }
            let params = e.effective_params(desc)?;
            entries.push(Resolved {
                desc,
                params,
                steps: e.steps,
            });
        }
        Ok(Self { entries })
    }

    /// Output units one item yields under `mode`.
    pub fn units_per_item(&self, mode: &PipelineMode) -> u64 {
        match *mode {
            PipelineMode::RandomSample {
                invocations_per_item,
                ..
            } => u64::from(invocations_per_item),
            PipelineMode::DeterministicSweep {
                steps_per_family, ..
            } => self
                .entries
                .iter()
                .map(|r| u64::from(r.desc.sweep_steps(r.steps.unwrap_or(steps_per_family))))
                .sum(),
        }
    }

    /// Random-order pipeline holding every selected operator with freshly drawn parameters.
    pub fn random_variant(
        &self,
        variant: u32,
        repro: &mut Reproducibility,
    ) -> AugsweepResult<Pipeline> {
        let mut order: Vec<usize> = (0..self.entries.len()).collect();
        order.shuffle(repro.rng()?);
        let mut ops = Vec::with_capacity(order.len());
        for i in order {
            let r = &self.entries[i];
            let params = sampler::resolve_params(&r.params, SampleMode::Random, repro)?;
            ops.push(AppliedOperator {
                name: r.desc.name.to_string(),
                params,
                seed: repro.next_u64()?,
            });
        }
        Ok(Pipeline {
            variant,
            family: RANDOM_FAMILY.to_string(),
            label: format!("{variant:02}"),
            ops,
        })
    }

    /// Every sweep slot for one item: families in selection order, steps ascending.
    pub fn sweep_plan(&self, steps_per_family: u32) -> Vec<SweepSlot> {
        let mut out = Vec::new();
        for (entry, r) in self.entries.iter().enumerate() {
            let steps = r.desc.sweep_steps(r.steps.unwrap_or(steps_per_family));
            out.extend((1..=steps).map(|step| SweepSlot { entry, step, steps }));
        }
        out
    }

    /// Single-operator pipeline for one sweep slot.
    pub fn sweep_variant(
        &self,
        variant: u32,
        slot: SweepSlot,
        repro: &mut Reproducibility,
    ) -> AugsweepResult<Pipeline> {
        let r = self.entries.get(slot.entry).ok_or_else(|| {
            AugsweepError::validation(format!("sweep slot {} is out of range", slot.entry))
        })?;
        let mode = SampleMode::Sweep {
            step: slot.step,
            steps: slot.steps,
        };
        let params = sampler::resolve_params(&r.params, mode, repro)?;
        let label = match r.desc.primary() {
            Some((_, p)) => params
                .get(p.name)
                .map(|v| p.label.render(v))
                .unwrap_or_else(|| format!("step{}", slot.step)),
            None => format!("step{}", slot.step),
        };
        Ok(Pipeline {
            variant,
            family: r.desc.family.to_string(),
            label,
            ops: vec![AppliedOperator {
                name: r.desc.name.to_string(),
                params,
                seed: repro.next_u64()?,
            }],
        })
    }
}

#[cfg(test)]
#[path = "../tests/unit/compose.rs"]
mod tests;
