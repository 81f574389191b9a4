use std::collections::BTreeMap;

use crate::animation::ease::{ALIASES, CURVES, Curve, RateFunction, normalize_name};
use crate::foundation::error::{ChoreoError, ChoreoResult};

/// Which library a catalogue entry belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Family {
    /// Renderer-style built-ins (`smooth`, `there_and_back`, ...).
    Engine,
    /// easings.net style curves and CSS/spring presets.
    Easing,
    /// Short name for another entry.
    Alias,
    /// Registered at runtime.
    Custom,
}

/// One row of [`RateFunctionBridge::catalogue`].
#[derive(Clone, Debug, serde::Serialize)]
pub struct CatalogueEntry {
    /// Lookup name.
    pub name: String,
    /// Owning family.
    pub family: Family,
    /// Alias target, for [`Family::Alias`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

impl Curve {
    /// Library this curve comes from.
    pub fn family(self) -> Family {
        match self {
            Self::Linear
            | Self::Smooth
            | Self::RushInto
            | Self::RushFrom
            | Self::SlowInto
            | Self::DoubleSmooth
            | Self::ThereAndBack
            | Self::ThereAndBackWithPause
            | Self::RunningStart
            | Self::Wiggle
            | Self::Lingering
            | Self::ExponentialDecay
            | Self::NotQuiteThere => Family::Engine,
            _ => Family::Easing,
        }
    }
}

/// A rate function as written in a descriptor: a name to resolve, a combinator over further
/// references, or an inline definition.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum RateFunctionRef {
    /// Looked up through a [`RateFunctionBridge`], so custom names work.
    Name(String),
    /// `{"compose": ..}` or `{"chain": ..}` whose members resolve through the bridge.
    Combinator(CombinatorRef),
    /// Fully specified function.
    Inline(RateFunction),
}

/// Combinator whose members are references rather than resolved functions.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub enum CombinatorRef {
    Compose {
        functions: Vec<RateFunctionRef>,
        weights: Vec<f64>,
    },
    Chain {
        functions: Vec<RateFunctionRef>,
        durations: Vec<f64>,
    },
}

impl From<&str> for RateFunctionRef {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

/// Single lookup-by-name interface over the built-in curves and user-registered functions.
#[derive(Clone, Debug, Default)]
pub struct RateFunctionBridge {
    custom: BTreeMap<String, RateFunction>,
}

impl RateFunctionBridge {
    /// Bridge with only the built-in catalogue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve `name` (case-insensitive, `-` or `_`) to a rate function.
    pub fn get_rate_function(&self, name: &str) -> ChoreoResult<RateFunction> {
        if let Some(curve) = Curve::from_name(name) {
            return Ok(RateFunction::Curve(curve));
        }
        self.custom
            .get(&normalize_name(name))
            .cloned()
            .ok_or_else(|| ChoreoError::unknown_rate_function(name))
    }

    /// Resolve a descriptor reference.
    pub fn resolve(&self, r: &RateFunctionRef) -> ChoreoResult<RateFunction> {
        match r {
            RateFunctionRef::Name(name) => self.get_rate_function(name),
            RateFunctionRef::Combinator(CombinatorRef::Compose { functions, weights }) => {
                let functions = self.resolve_refs(functions)?;
                RateFunction::compose(functions, weights.clone())
            }
            RateFunctionRef::Combinator(CombinatorRef::Chain {
                functions,
                durations,
            }) => {
                let functions = self.resolve_refs(functions)?;
                RateFunction::chain(functions, durations.clone())
            }
            RateFunctionRef::Inline(f) => Ok(f.clone()),
        }
    }

    fn resolve_refs(&self, refs: &[RateFunctionRef]) -> ChoreoResult<Vec<RateFunction>> {
        refs.iter().map(|r| self.resolve(r)).collect()
    }

    /// Return `true` when `name` resolves.
    pub fn contains(&self, name: &str) -> bool {
        self.get_rate_function(name).is_ok()
    }

    /// Register a named function. Built-in and already registered names are rejected.
    pub fn register(&mut self, name: &str, function: RateFunction) -> ChoreoResult<()> {
        let key = normalize_name(name);
        if key.is_empty() {
            return Err(ChoreoError::validation("rate function name must be non-empty"));
        }
        if Curve::from_name(&key).is_some() {
            return Err(ChoreoError::validation(format!(
                "rate function '{key}' is built in and cannot be redefined"
            )));
        }
        if self.custom.contains_key(&key) {
            return Err(ChoreoError::validation(format!(
                "rate function '{key}' is already registered"
            )));
        }
        tracing::debug!(name = %key, "registered rate function");
        self.custom.insert(key, function);
        Ok(())
    }

    /// Weighted blend of named functions.
    pub fn compose(&self, names: &[&str], weights: &[f64]) -> ChoreoResult<RateFunction> {
        let functions = self.resolve_all(names)?;
        RateFunction::compose(functions, weights.to_vec())
    }

    /// Sequential chain of named functions with per-segment duration weights.
    pub fn chain(&self, names: &[&str], durations: &[f64]) -> ChoreoResult<RateFunction> {
        let functions = self.resolve_all(names)?;
        RateFunction::chain(functions, durations.to_vec())
    }

    fn resolve_all(&self, names: &[&str]) -> ChoreoResult<Vec<RateFunction>> {
        names
            .iter()
            .map(|n| self.get_rate_function(n))
            .collect::<ChoreoResult<Vec<_>>>()
    }

    /// Every resolvable name: built-ins, aliases, then custom entries.
    pub fn catalogue(&self) -> Vec<CatalogueEntry> {
        let builtins = CURVES.iter().map(|(name, curve)| CatalogueEntry {
            name: (*name).to_string(),
            family: curve.family(),
            target: None,
        });
        let aliases = ALIASES.iter().map(|(alias, target)| CatalogueEntry {
            name: (*alias).to_string(),
            family: Family::Alias,
            target: Some((*target).to_string()),
        });
        let custom = self.custom.keys().map(|name| CatalogueEntry {
            name: name.clone(),
            family: Family::Custom,
            target: None,
        });
        builtins.chain(aliases).chain(custom).collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/bridge.rs"]
mod tests;
