//! Parameter Sampler: turns parameter specs into concrete values.
//!
//! Random mode draws uniformly from the job generator, a fresh draw per call. Sweep mode maps a
//! 1-based step index onto the range through the parameter's [`SweepLaw`]; step 1 lands on the
//! `min` bound and step `S` on the `max` bound.

use crate::catalog::{Catalog, ParamDef, ParameterSpec, SweepLaw};
use crate::foundation::error::{AugsweepError, AugsweepResult};
use crate::foundation::repro::Reproducibility;

/// One resolved parameter.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ParamValue {
    pub name: String,
    pub value: f64,
}

/// Ordered name/value pairs handed to an operator implementation.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct ConcreteParams(Vec<ParamValue>);

impl ConcreteParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`ConcreteParams::push`].
    pub fn with(mut self, name: impl Into<String>, value: f64) -> Self {
        self.push(name, value);
        self
    }

    pub fn push(&mut self, name: impl Into<String>, value: f64) {
        self.0.push(ParamValue {
            name: name.into(),
            value,
        });
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.0.iter().find(|p| p.name == name).map(|p| p.value)
    }

    /// Value of `name`, or an operator error naming the missing parameter.
    pub fn require(&self, name: &str) -> AugsweepResult<f64> {
        self.get(name)
            .ok_or_else(|| AugsweepError::operator(format!("missing parameter '{name}'")))
    }

    /// Value of `name`, or `default` when the operator was configured without it.
    pub fn get_or(&self, name: &str, default: f64) -> f64 {
        self.get(name).unwrap_or(default)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParamValue> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// How a single resolve call picks its value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SampleMode {
    /// Uniform draw from the seeded generator.
    Random,
    /// Deterministic point `step` (1-based) of `steps`.
    Sweep { step: u32, steps: u32 },
}

impl SampleMode {
    /// Position along the range in `[0, 1]`. A single-step sweep sits at the middle.
    fn position(self) -> AugsweepResult<f64> {
        match self {
            SampleMode::Random => Err(AugsweepError::validation(
                "random mode has no sweep position",
            )),
            SampleMode::Sweep { step, steps } => {
                if steps == 0 || step == 0 || step > steps {
                    return Err(AugsweepError::invalid_param(format!(
                        "sweep step {step} is outside 1..={steps}"
                    )));
                }
                if steps == 1 {
                    return Ok(0.5);
                }
                Ok(f64::from(step - 1) / f64::from(steps - 1))
            }
        }
    }
}

/// Resolve one spec. `Empty` yields `None`.
pub fn resolve(
    spec: &ParameterSpec,
    law: SweepLaw,
    mode: SampleMode,
    repro: &mut Reproducibility,
) -> AugsweepResult<Option<f64>> {
    spec.validate()?;
    match *spec {
        ParameterSpec::Empty => Ok(None),
        ParameterSpec::Fixed { value } => Ok(Some(value)),
        ParameterSpec::Range { min, max } => match mode {
            SampleMode::Random => repro.uniform(min, max).map(Some),
            SampleMode::Sweep { .. } => {
                let t = mode.position()?;
                sweep_value(min, max, law, t).map(Some)
            }
        },
    }
}

/// Map `t` in `[0, 1]` onto `[min, max]` under `law`.
pub fn sweep_value(min: f64, max: f64, law: SweepLaw, t: f64) -> AugsweepResult<f64> {
    ParameterSpec::range(min, max).validate()?;
    let v = match law {
        SweepLaw::Linear => min + t * (max - min),
        SweepLaw::BorderFromArea => {
            if min < 0.0 || max > 0.5 {
                return Err(AugsweepError::invalid_param(format!(
                    "border ratio range [{min}, {max}] must lie within [0, 0.5]"
                )));
            }
            let area_lo = (1.0 - 2.0 * min).powi(2);
            let area_hi = (1.0 - 2.0 * max).powi(2);
            let area = area_lo + t * (area_hi - area_lo);
            (1.0 - area.sqrt()) / 2.0
        }
        SweepLaw::ScaleFromArea => {
            if min < 0.0 {
                return Err(AugsweepError::invalid_param(format!(
                    "scale range [{min}, {max}] must be non-negative"
                )));
            }
            (min * min + t * (max * max - min * min)).sqrt()
        }
    };
    // sqrt round trips can drift past the bounds by an ulp
    Ok(v.clamp(min, max))
}

/// Resolve every parameter of one operator application.
///
/// In sweep mode only the first range parameter follows the step; other range parameters take
/// their midpoint so that a family ladder varies along one axis.
pub fn resolve_params(
    params: &[ParamDef],
    mode: SampleMode,
    repro: &mut Reproducibility,
) -> AugsweepResult<ConcreteParams> {
    let primary = params.iter().position(|p| p.spec.is_range());
    let mut out = ConcreteParams::new();
    for (i, p) in params.iter().enumerate() {
        let value = match (mode, p.spec) {
            (SampleMode::Sweep { .. }, ParameterSpec::Range { min, max })
                if Some(i) != primary =>
            {
                p.spec.validate()?;
                Some(min + 0.5 * (max - min))
            }
            _ => resolve(&p.spec, p.law, mode, repro)?,
        };
        if let Some(v) = value {
            out.push(p.name, v);
        }
    }
    Ok(out)
}

/// Resolve a cataloged operator's declared parameters by name.
pub fn resolve_named(
    catalog: &Catalog,
    name: &str,
    mode: SampleMode,
    repro: &mut Reproducibility,
) -> AugsweepResult<ConcreteParams> {
    let desc = catalog
        .get(name)
        .ok_or_else(|| AugsweepError::invalid_param(format!("operator '{name}' is not cataloged")))?;
    resolve_params(&desc.params, mode, repro)
}

#[cfg(test)]
#[path = "../tests/unit/sampler.rs"]
mod tests;
