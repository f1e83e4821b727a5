//! Operator catalog: the single source of truth for which operators exist and which
//! parameters they accept.

use std::collections::HashMap;

use crate::foundation::error::{AugsweepError, AugsweepResult};

mod builtin;

/// Closed set of operator categories.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Geometric transforms (affine, rotate, resize, crop, flips).
    Geometric,
    /// Color adjustments.
    Color,
    /// Blur, noise and compression artifacts.
    BlurNoise,
    /// Contrast and sharpening.
    ContrastSharpen,
    /// Weather overlays.
    Weather,
    /// Edge detection and texture interference.
    EdgeTexture,
}

impl Category {
    /// Every category, in catalog order.
    pub const ALL: [Category; 6] = [
        Category::Geometric,
        Category::Color,
        Category::BlurNoise,
        Category::ContrastSharpen,
        Category::Weather,
        Category::EdgeTexture,
    ];

    /// Stable snake_case name.
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Geometric => "geometric",
            Category::Color => "color",
            Category::BlurNoise => "blur_noise",
            Category::ContrastSharpen => "contrast_sharpen",
            Category::Weather => "weather",
            Category::EdgeTexture => "edge_texture",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm = s.trim().to_ascii_lowercase().replace(['-', '/', ' '], "_");
        match norm.as_str() {
            "geometric" | "geometry" => Ok(Category::Geometric),
            "color" | "colour" => Ok(Category::Color),
            "blur_noise" | "blur_and_noise" | "blur" | "noise" => Ok(Category::BlurNoise),
            "contrast_sharpen" | "contrast" | "sharpen" => Ok(Category::ContrastSharpen),
            "weather" => Ok(Category::Weather),
            "edge_texture" | "edge" | "texture" => Ok(Category::EdgeTexture),
            _ => Err(format!("unknown category '{s}'")),
        }
    }
}

/// Accepted values of one named operator parameter.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParameterSpec {
    /// No value.
    Empty,
    /// Always this value, in every mode.
    Fixed {
        /// The value.
        value: f64,
    },
    /// Inclusive numeric range.
    Range {
        /// Lower bound (inclusive).
        min: f64,
        /// Upper bound (inclusive).
        max: f64,
    },
}

impl ParameterSpec {
    /// Shorthand for [`ParameterSpec::Range`].
    pub fn range(min: f64, max: f64) -> Self {
        Self::Range { min, max }
    }

    /// Shorthand for [`ParameterSpec::Fixed`].
    pub fn fixed(value: f64) -> Self {
        Self::Fixed { value }
    }

    /// Reject non-finite values and inverted ranges.
    pub fn validate(&self) -> AugsweepResult<()> {
        match *self {
            ParameterSpec::Empty => Ok(()),
            ParameterSpec::Fixed { value } => {
                if !value.is_finite() {
                    return Err(AugsweepError::invalid_param(
                        "fixed parameter value must be finite",
                    ));
                }
                Ok(())
            }
            ParameterSpec::Range { min, max } => {
                if !min.is_finite() || !max.is_finite() {
                    return Err(AugsweepError::invalid_param(
                        "range bounds must be finite",
                    ));
                }
                if min > max {
                    return Err(AugsweepError::invalid_param(format!(
                        "range min {min} is greater than max {max}"
                    )));
                }
                Ok(())
            }
        }
    }

    /// True for [`ParameterSpec::Range`].
    pub fn is_range(&self) -> bool {
        matches!(self, ParameterSpec::Range { .. })
    }
}

/// How a swept parameter maps a similarity level onto its range.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SweepLaw {
    /// Straight interpolation between the bounds.
    #[default]
    Linear,
    /// Parameter is a crop border ratio; the step walks the retained area fraction.
    BorderFromArea,
    /// Parameter is a linear scale; the step walks the area fraction (scale squared).
    ScaleFromArea,
}

/// How a resolved value renders into a file-name label.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelStyle {
    /// Value with a fixed number of decimals (`0.25`).
    Decimal(u8),
    /// Rounded integer after a prefix (`q90`, `size8`).
    Prefix(&'static str),
    /// Rounded integer before a suffix (`45deg`, `15lines`).
    Suffix(&'static str),
    /// Value times 100, rounded, with `pct` (`55pct`).
    Percent,
    /// Crop border ratio rendered as the retained area fraction (`0.90`).
    AreaFromBorder,
}

impl LabelStyle {
    /// Render `value` in this style.
    pub fn render(self, value: f64) -> String {
        match self {
            LabelStyle::Decimal(places) => format!("{:.*}", places as usize, value),
            LabelStyle::Prefix(p) => format!("{p}{}", value.round() as i64),
            LabelStyle::Suffix(s) => format!("{}{s}", value.round() as i64),
            LabelStyle::Percent => format!("{}pct", (value * 100.0).round() as i64),
            LabelStyle::AreaFromBorder => {
                let side = 1.0 - 2.0 * value;
                format!("{:.2}", side * side)
            }
        }
    }
}

/// One named parameter of an operator.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct ParamDef {
    /// Parameter name, unique within its operator.
    pub name: &'static str,
    /// Accepted values.
    pub spec: ParameterSpec,
    /// Interpolation law used when this parameter is swept.
    pub law: SweepLaw,
    /// Label rendering for file names.
    pub label: LabelStyle,
}

impl ParamDef {
    /// Linear-law range parameter labelled with two decimals.
    pub fn range(name: &'static str, min: f64, max: f64) -> Self {
        Self {
            name,
            spec: ParameterSpec::range(min, max),
            law: SweepLaw::Linear,
            label: LabelStyle::Decimal(2),
        }
    }

    /// Fixed-value parameter.
    pub fn fixed(name: &'static str, value: f64) -> Self {
        Self {
            name,
            spec: ParameterSpec::fixed(value),
            law: SweepLaw::Linear,
            label: LabelStyle::Decimal(2),
        }
    }

    /// Builder: set the sweep law.
    pub fn law(mut self, law: SweepLaw) -> Self {
        self.law = law;
        self
    }

    /// Builder: set the label style.
    pub fn label(mut self, label: LabelStyle) -> Self {
        self.label = label;
        self
    }
}

/// Immutable description of one operator.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct OperatorDescriptor {
    /// Unique operator name (`"Rotate"`).
    pub name: &'static str,
    /// Family slug used in output file names (`"rotate"`).
    pub family: &'static str,
    /// Category.
    pub category: Category,
    /// Named parameters in application order. Empty for parameterless operators.
    pub params: Vec<ParamDef>,
    /// One-line human description.
    pub summary: &'static str,
    /// Member of the recommended pool for its category.
    pub recommended: bool,
}

impl OperatorDescriptor {
    /// Build a descriptor with no parameters.
    pub fn new(
        name: &'static str,
        family: &'static str,
        category: Category,
        summary: &'static str,
    ) -> Self {
        Self {
            name,
            family,
            category,
            params: Vec::new(),
            summary,
            recommended: false,
        }
    }

    /// Builder: append a parameter.
    pub fn param(mut self, p: ParamDef) -> Self {
        self.params.push(p);
        self
    }

    /// Builder: mark as part of the category's recommended pool.
    pub fn recommended(mut self) -> Self {
        self.recommended = true;
        self
    }

    /// Index and definition of the swept parameter (the first range parameter).
    pub fn primary(&self) -> Option<(usize, &ParamDef)> {
        self.params
            .iter()
            .enumerate()
            .find(|(_, p)| p.spec.is_range())
    }

    /// Spec of the primary parameter, or [`ParameterSpec::Empty`] when there is none.
    pub fn parameter_spec(&self) -> ParameterSpec {
        self.primary()
            .map(|(_, p)| p.spec)
            .unwrap_or(ParameterSpec::Empty)
    }

    /// Lookup a parameter by name.
    pub fn param_named(&self, name: &str) -> Option<&ParamDef> {
        self.params.iter().find(|p| p.name == name)
    }

    /// Number of sweep outputs this family yields for `steps` requested steps.
    pub fn sweep_steps(&self, steps: u32) -> u32 {
        if self.primary().is_some() { steps } else { 1 }
    }

    /// Validate names and every parameter spec.
    pub fn validate(&self) -> AugsweepResult<()> {
        if self.name.trim().is_empty() {
            return Err(AugsweepError::invalid_param("operator name must be non-empty"));
        }
        if self.family.trim().is_empty() || self.family.contains(['/', '\\']) {
            return Err(AugsweepError::invalid_param(format!(
                "operator '{}' has an invalid family slug '{}'",
                self.name, self.family
            )));
        }
        for (i, p) in self.params.iter().enumerate() {
            if self.params[..i].iter().any(|q| q.name == p.name) {
                return Err(AugsweepError::invalid_param(format!(
                    "operator '{}' declares parameter '{}' twice",
                    self.name, p.name
                )));
            }
            p.spec.validate().map_err(|e| {
                AugsweepError::invalid_param(format!("{}.{}: {e}", self.name, p.name))
            })?;
        }
        Ok(())
    }
}

/// Registry of operator descriptors, keyed by unique name.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    ops: Vec<OperatorDescriptor>,
    by_name: HashMap<&'static str, usize>,
}

impl Catalog {
    /// Empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog holding every built-in operator.
    pub fn builtin() -> Self {
        let mut out = Self::new();
        for d in builtin::descriptors() {
            if let Err(e) = out.insert(d) {
                tracing::error!("dropping built-in operator: {e}");
            }
        }
        out
    }

    /// Add a descriptor. Names must be unique.
    pub fn insert(&mut self, desc: OperatorDescriptor) -> AugsweepResult<()> {
        desc.validate()?;
        if self.by_name.contains_key(desc.name) {
            return Err(AugsweepError::validation(format!(
                "operator '{}' is already cataloged",
                desc.name
            )));
        }
        self.by_name.insert(desc.name, self.ops.len());
        self.ops.push(desc);
        Ok(())
    }

    /// Builder form of [`Catalog::insert`].
    pub fn with(mut self, desc: OperatorDescriptor) -> AugsweepResult<Self> {
        self.insert(desc)?;
        Ok(self)
    }

    /// Exact-name lookup, falling back to an ASCII case-insensitive match.
    pub fn lookup(&self, name: &str) -> AugsweepResult<&OperatorDescriptor> {
        self.get(name)
            .ok_or_else(|| AugsweepError::unknown_operator(name.to_string()))
    }

    /// Non-failing form of [`Catalog::lookup`].
    pub fn get(&self, name: &str) -> Option<&OperatorDescriptor> {
        let name = name.trim();
        if let Some(&i) = self.by_name.get(name) {
            return Some(&self.ops[i]);
        }
        self.ops.iter().find(|d| d.name.eq_ignore_ascii_case(name))
    }

    /// Operators of one category, in catalog order.
    pub fn list_by_category(&self, category: Category) -> Vec<&OperatorDescriptor> {
        self.ops.iter().filter(|d| d.category == category).collect()
    }

    /// All operators in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &OperatorDescriptor> {
        self.ops.iter()
    }

    /// Number of cataloged operators.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// True when no operator is cataloged.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/catalog/catalog.rs"]
mod tests;
