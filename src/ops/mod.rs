//! Operator implementations and the name-keyed registry that binds catalog entries to them.
//!
//! Built-in operators work on 8-bit RGB; alpha is dropped on entry. Operators that need
//! randomness draw it from the [`OpContext`] generator, which is seeded per application so that a
//! fixed job seed reproduces pixel output too.

use std::{collections::HashMap, fmt, sync::Arc};

use image::{DynamicImage, RgbImage};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::foundation::error::{AugsweepError, AugsweepResult};
use crate::sampler::ConcreteParams;

mod blur_noise;
mod color;
mod contrast;
mod edge;
mod geometric;
pub(crate) mod kernel;
mod texture;
mod weather;

/// Per-application state handed to an operator.
#[derive(Debug)]
pub struct OpContext {
    seed: u64,
    rng: ChaCha8Rng,
}

impl OpContext {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn rng(&mut self) -> &mut ChaCha8Rng {
        &mut self.rng
    }
}

/// One image transform.
pub trait Operator: Send + Sync {
    /// Check that `params` carries what [`Operator::apply`] needs.
    fn validate_params(&self, _params: &ConcreteParams) -> AugsweepResult<()> {
        Ok(())
    }

    fn apply(
        &self,
        params: &ConcreteParams,
        img: DynamicImage,
        ctx: &mut OpContext,
    ) -> AugsweepResult<DynamicImage>;
}

/// Operator backed by a closure.
pub struct FnOperator<F>(F);

/// Wrap a closure as an [`Operator`].
pub fn from_fn<F>(f: F) -> FnOperator<F>
where
    F: Fn(&ConcreteParams, DynamicImage, &mut OpContext) -> AugsweepResult<DynamicImage>
        + Send
        + Sync,
{
    FnOperator(f)
}

impl<F> Operator for FnOperator<F>
where
    F: Fn(&ConcreteParams, DynamicImage, &mut OpContext) -> AugsweepResult<DynamicImage>
        + Send
        + Sync,
{
    fn apply(
        &self,
        params: &ConcreteParams,
        img: DynamicImage,
        ctx: &mut OpContext,
    ) -> AugsweepResult<DynamicImage> {
        (self.0)(params, img, ctx)
    }
}

type RgbFn = fn(&ConcreteParams, RgbImage, &mut OpContext) -> AugsweepResult<RgbImage>;

/// Built-in RGB operator with a fixed list of required parameters.
struct Builtin {
    required: &'static [&'static str],
    run: RgbFn,
}

impl Operator for Builtin {
    fn validate_params(&self, params: &ConcreteParams) -> AugsweepResult<()> {
        for name in self.required {
            let v = params.require(name)?;
            if !v.is_finite() {
                return Err(AugsweepError::operator(format!(
                    "parameter '{name}' is not finite"
                )));
            }
        }
        Ok(())
    }

    fn apply(
        &self,
        params: &ConcreteParams,
        img: DynamicImage,
        ctx: &mut OpContext,
    ) -> AugsweepResult<DynamicImage> {
        (self.run)(params, img.into_rgb8(), ctx).map(DynamicImage::ImageRgb8)
    }
}

/// Mapping from operator name to implementation.
#[derive(Clone, Default)]
pub struct OperatorRegistry {
    bindings: HashMap<String, Arc<dyn Operator>>,
}

impl fmt::Debug for OperatorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperatorRegistry")
            .field("names", &self.names())
            .finish()
    }
}

impl OperatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with a binding for every built-in catalog operator.
    pub fn builtin() -> Self {
        let mut reg = Self::new();
        geometric::register(&mut reg);
        color::register(&mut reg);
        blur_noise::register(&mut reg);
        contrast::register(&mut reg);
        weather::register(&mut reg);
        edge::register(&mut reg);
        texture::register(&mut reg);
        reg
    }

    /// Bind `name`, returning the binding it replaces.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        op: impl Operator + 'static,
    ) -> Option<Arc<dyn Operator>> {
        self.bindings.insert(name.into(), Arc::new(op))
    }

    fn register_rgb(&mut self, name: &str, required: &'static [&'static str], run: RgbFn) {
        self.register(name, Builtin { required, run });
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    pub fn get(&self, name: &str) -> AugsweepResult<&dyn Operator> {
        self.bindings
            .get(name)
            .map(|op| op.as_ref())
            .ok_or_else(|| AugsweepError::missing_binding(name.to_string()))
    }

    /// Fail with [`AugsweepError::MissingBinding`] on the first unbound name.
    pub fn check_bindings<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> AugsweepResult<()> {
        for n in names {
            self.get(n)?;
        }
        Ok(())
    }

    /// Validate and apply one operator. An empty result image is an operator error.
    pub fn apply(
        &self,
        name: &str,
        params: &ConcreteParams,
        img: DynamicImage,
        seed: u64,
    ) -> AugsweepResult<DynamicImage> {
        let op = self.get(name)?;
        op.validate_params(params)?;
        let mut ctx = OpContext::new(seed);
        let out = op.apply(params, img, &mut ctx)?;
        if out.width() == 0 || out.height() == 0 {
            return Err(AugsweepError::operator(format!(
                "{name} produced an empty image"
            )));
        }
        Ok(out)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut v: Vec<&str> = self.bindings.keys().map(String::as_str).collect();
        v.sort_unstable();
        v
    }
}

#[cfg(test)]
#[path = "../../tests/unit/ops/registry.rs"]
mod tests;
