use crate::noise::NoiseCurve;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Noise curves of a detector network keyed by instrument name
#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct NoiseCurveSet(BTreeMap<String, NoiseCurve>);

impl NoiseCurveSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        instrument: impl Into<String>,
        noise: NoiseCurve,
    ) -> Option<NoiseCurve> {
        self.0.insert(instrument.into(), noise)
    }

    pub fn get(&self, instrument: &str) -> Option<&NoiseCurve> {
        self.0.get(instrument)
    }

    /// Reference instrument: the lexicographically smallest instrument name
    pub fn reference(&self) -> Option<(&str, &NoiseCurve)> {
        self.0.iter().next().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &NoiseCurve)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<S: Into<String>> FromIterator<(S, NoiseCurve)> for NoiseCurveSet {
    fn from_iter<I: IntoIterator<Item = (S, NoiseCurve)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}
