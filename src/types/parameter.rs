//! This module defines the canonical, type-safe description of a single input
//! or output parameter of the scripted calculation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The kind of a parameter. Determines the on-the-wire encoding rule.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ParameterKind {
    Scalar,
    Vector,
    Matrix,
    #[serde(rename = "timeseries")]
    TimeSeries,
    Table,
}

impl ParameterKind {
    /// The number of dimension sources a dynamically-shaped parameter of this
    /// kind must declare. `None` for kinds that cannot be dynamically shaped.
    pub fn rank(&self) -> Option<usize> {
        match self {
            Self::Vector => Some(1),
            Self::Matrix => Some(2),
            Self::Scalar | Self::TimeSeries | Self::Table => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scalar => "scalar",
            Self::Vector => "vector",
            Self::Matrix => "matrix",
            Self::TimeSeries => "timeseries",
            Self::Table => "table",
        }
    }
}

impl fmt::Display for ParameterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParameterKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "scalar" => Ok(Self::Scalar),
            "vector" => Ok(Self::Vector),
            "matrix" => Ok(Self::Matrix),
            "timeseries" => Ok(Self::TimeSeries),
            "table" => Ok(Self::Table),
            other => Err(format!(
                "Invalid type '{}'. Must be 'scalar', 'vector', 'matrix', 'timeseries', or 'table'.",
                other
            )),
        }
    }
}

/// Describes one parameter in a schema list.
///
/// `dimensions` is the static shape (empty for scalars). `dimension_sources`
/// names the scalar inputs that supply the shape at call time instead; the two
/// are mutually exclusive. `max_points` and `max_elements` are capacity hints
/// for time-series and table outputs respectively.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ParameterDescriptor {
    pub name: String,
    pub kind: ParameterKind,
    #[serde(default)]
    pub dimensions: Vec<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimension_sources: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_points: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_elements: Option<usize>,
}

impl ParameterDescriptor {
    fn new(name: impl Into<String>, kind: ParameterKind, dimensions: Vec<usize>) -> Self {
        Self {
            name: name.into(),
            kind,
            dimensions,
            dimension_sources: None,
            max_points: None,
            max_elements: None,
        }
    }

    pub fn scalar(name: impl Into<String>) -> Self {
        Self::new(name, ParameterKind::Scalar, Vec::new())
    }

    pub fn vector(name: impl Into<String>, len: usize) -> Self {
        Self::new(name, ParameterKind::Vector, vec![len])
    }

    pub fn matrix(name: impl Into<String>, rows: usize, cols: usize) -> Self {
        Self::new(name, ParameterKind::Matrix, vec![rows, cols])
    }

    /// A vector whose length is read from the scalar input `len_from` at call time.
    pub fn dynamic_vector(name: impl Into<String>, len_from: impl Into<String>) -> Self {
        let mut desc = Self::new(name, ParameterKind::Vector, Vec::new());
        desc.dimension_sources = Some(vec![len_from.into()]);
        desc
    }

    /// A matrix whose shape is read from the scalar inputs `rows_from` and `cols_from`.
    pub fn dynamic_matrix(
        name: impl Into<String>,
        rows_from: impl Into<String>,
        cols_from: impl Into<String>,
    ) -> Self {
        let mut desc = Self::new(name, ParameterKind::Matrix, Vec::new());
        desc.dimension_sources = Some(vec![rows_from.into(), cols_from.into()]);
        desc
    }

    /// A time series. For outputs, `dimensions` gives the `[rows, cols]` of each
    /// time slice and `max_points` the capacity used for buffer sizing.
    pub fn time_series(name: impl Into<String>, max_points: usize, dimensions: Vec<usize>) -> Self {
        let mut desc = Self::new(name, ParameterKind::TimeSeries, dimensions);
        desc.max_points = Some(max_points);
        desc
    }

    pub fn table(name: impl Into<String>, max_elements: usize) -> Self {
        let mut desc = Self::new(name, ParameterKind::Table, Vec::new());
        desc.max_elements = Some(max_elements);
        desc
    }

    /// Product of the static dimensions, or 1 for an empty shape.
    pub fn static_element_count(&self) -> usize {
        self.dimensions.iter().product()
    }

    /// Returns `true` if the shape of this parameter is resolved at call time.
    pub fn is_dynamic(&self) -> bool {
        self.dimension_sources.is_some()
    }

    /// Returns `true` if the wire length of this parameter cannot be known
    /// from the schema alone.
    pub fn is_variable_length(&self) -> bool {
        self.is_dynamic() || self.kind == ParameterKind::TimeSeries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_element_count() {
        assert_eq!(ParameterDescriptor::scalar("x").static_element_count(), 1);
        assert_eq!(ParameterDescriptor::vector("v", 4).static_element_count(), 4);
        assert_eq!(ParameterDescriptor::matrix("m", 2, 3).static_element_count(), 6);
    }

    #[test]
    fn test_variable_length_detection() {
        assert!(!ParameterDescriptor::vector("v", 3).is_variable_length());
        assert!(ParameterDescriptor::dynamic_vector("v", "n").is_variable_length());
        assert!(ParameterDescriptor::time_series("ts", 10, vec![]).is_variable_length());
        assert!(!ParameterDescriptor::table("t", 20).is_variable_length());
    }

    #[test]
    fn test_kind_serde_names() {
        let kind: ParameterKind = serde_json::from_str("\"timeseries\"").unwrap();
        assert_eq!(kind, ParameterKind::TimeSeries);
        assert_eq!(serde_json::to_string(&ParameterKind::Matrix).unwrap(), "\"matrix\"");
        assert_eq!("Table".parse::<ParameterKind>(), Ok(ParameterKind::Table));
        assert!("tensor".parse::<ParameterKind>().is_err());
    }
}
