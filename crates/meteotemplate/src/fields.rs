//! Mapping of host observations to Meteotemplate request parameters.

use std::collections::BTreeMap;

use crate::units::UnitGroup;

/// Parameters understood by `plugins/api/update.php`, in request order.
const METEOTEMPLATE_FIELDS: &[(&str, &str)] = &[
    ("T", "outTemp"),
    ("H", "outHumidity"),
    ("P", "barometer"),
    ("W", "windSpeed"),
    ("G", "windGust"),
    ("B", "windDir"),
    ("RR", "rainRate"),
    ("R", "dayRain"),
    ("S", "radiation"),
];

/// One request parameter and the observation it is read from.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub param: String,
    pub observation: String,
    pub group: UnitGroup,
}

impl FieldSpec {
    pub fn new(param: impl Into<String>, observation: impl Into<String>) -> Self {
        let observation = observation.into();
        Self {
            param: param.into(),
            group: UnitGroup::for_observation(&observation),
            observation,
        }
    }
}

/// Ordered parameter table.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldMap {
    specs: Vec<FieldSpec>,
}

impl Default for FieldMap {
    fn default() -> Self {
        Self::meteotemplate()
    }
}

impl FieldMap {
    /// The table for the stock Meteotemplate API.
    pub fn meteotemplate() -> Self {
        Self {
            specs: METEOTEMPLATE_FIELDS
                .iter()
                .map(|(param, observation)| FieldSpec::new(*param, *observation))
                .collect(),
        }
    }

    /// A table with exactly the given `(param, observation)` pairs.
    pub fn from_pairs<P, O>(pairs: impl IntoIterator<Item = (P, O)>) -> Self
    where
        P: Into<String>,
        O: Into<String>,
    {
        Self {
            specs: pairs
                .into_iter()
                .map(|(param, observation)| FieldSpec::new(param, observation))
                .collect(),
        }
    }

    /// Apply `param -> observation` overrides.
    ///
    /// An existing parameter is remapped in place, a new one is appended, and
    /// `None` removes the parameter.
    pub fn with_overrides(mut self, overrides: &BTreeMap<String, Option<String>>) -> Self {
        for (param, observation) in overrides {
            let existing = self.specs.iter().position(|s| &s.param == param);
            match (existing, observation) {
                (Some(idx), Some(obs)) => {
                    self.specs[idx] = FieldSpec::new(param.clone(), obs.clone());
                }
                (Some(idx), None) => {
                    self.specs.remove(idx);
                }
                (None, Some(obs)) => self.specs.push(FieldSpec::new(param.clone(), obs.clone())),
                (None, None) => {}
            }
        }
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldSpec> {
        self.specs.iter()
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table() {
        let map = FieldMap::meteotemplate();
        assert_eq!(map.len(), 9);
        let first = map.iter().next().unwrap();
        assert_eq!(first.param, "T");
        assert_eq!(first.observation, "outTemp");
        assert_eq!(first.group, UnitGroup::Temperature);
    }

    #[test]
    fn test_overrides_remap_remove_and_append() {
        let overrides = BTreeMap::from([
            ("T".to_string(), Some("extraTemp1".to_string())),
            ("S".to_string(), None),
            ("UV".to_string(), Some("UV".to_string())),
        ]);
        let map = FieldMap::meteotemplate().with_overrides(&overrides);

        let params: Vec<&str> = map.iter().map(|s| s.param.as_str()).collect();
        assert_eq!(params, ["T", "H", "P", "W", "G", "B", "RR", "R", "UV"]);

        let t = map.iter().find(|s| s.param == "T").unwrap();
        assert_eq!(t.observation, "extraTemp1");
        assert_eq!(t.group, UnitGroup::Temperature);

        let uv = map.iter().find(|s| s.param == "UV").unwrap();
        assert_eq!(uv.group, UnitGroup::Other);
    }

    #[test]
    fn test_removing_unknown_param_is_noop() {
        let overrides = BTreeMap::from([("X".to_string(), None)]);
        let map = FieldMap::meteotemplate().with_overrides(&overrides);
        assert_eq!(map, FieldMap::meteotemplate());
    }

    #[test]
    fn test_from_pairs_keeps_order() {
        let map = FieldMap::from_pairs([("temp", "outTemp"), ("humidity", "outHumidity")]);
        let params: Vec<&str> = map.iter().map(|s| s.param.as_str()).collect();
        assert_eq!(params, ["temp", "humidity"]);
    }
}
