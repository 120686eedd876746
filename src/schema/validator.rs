//! Structural checks over a [`Schema`].
//!
//! Validation is pure and deterministic. A schema that fails here is never
//! repaired; initialization stops with the returned error.

use hashbrown::HashSet;

use super::Schema;
use crate::error::ValidationError;
use crate::types::{ParameterDescriptor, ParameterKind};

/// Checks every structural rule over the schema, returning the first violation.
///
/// Rules, in order:
/// 1. Names are unique within each list, static dimensions are positive, and
///    no input is a table. A table input fails here with `OutputOnlyKind`
///    even when it also declares `dimension_sources`.
/// 2. For every input with `dimension_sources`: the kind is Vector or Matrix,
///    the source count equals the kind's rank, static dimensions are absent,
///    and every source names an existing scalar input.
/// 3. Every referenced scalar precedes the first variable-length input, so
///    the scalar harvest pass stays aligned.
/// 4. No output declares `dimension_sources`.
pub fn validate(schema: &Schema) -> Result<(), ValidationError> {
    check_list(&schema.inputs)?;
    check_list(&schema.outputs)?;

    if let Some(desc) = schema.inputs.iter().find(|d| d.kind == ParameterKind::Table) {
        return Err(ValidationError::OutputOnlyKind {
            name: desc.name.clone(),
        });
    }

    let first_variable = schema
        .inputs
        .iter()
        .position(ParameterDescriptor::is_variable_length);

    for desc in &schema.inputs {
        if let Some(sources) = &desc.dimension_sources {
            check_dimension_sources(schema, desc, sources, first_variable)?;
        }
    }

    if let Some(desc) = schema.outputs.iter().find(|d| d.dimension_sources.is_some()) {
        return Err(ValidationError::IllegalDimensionSource {
            name: desc.name.clone(),
        });
    }

    log::debug!(
        "Schema validated: {} input(s), {} output(s).",
        schema.inputs.len(),
        schema.outputs.len()
    );
    Ok(())
}

fn check_list(list: &[ParameterDescriptor]) -> Result<(), ValidationError> {
    let mut seen = HashSet::with_capacity(list.len());
    for desc in list {
        if !seen.insert(desc.name.as_str()) {
            return Err(ValidationError::DuplicateName {
                name: desc.name.clone(),
            });
        }
        if let Some(&zero) = desc.dimensions.iter().find(|&&d| d == 0) {
            return Err(ValidationError::NonPositiveDimension {
                name: desc.name.clone(),
                value: zero as i64,
            });
        }
    }
    Ok(())
}

fn check_dimension_sources(
    schema: &Schema,
    desc: &ParameterDescriptor,
    sources: &[String],
    first_variable: Option<usize>,
) -> Result<(), ValidationError> {
    let expected = desc
        .kind
        .rank()
        .ok_or_else(|| ValidationError::IllegalDimensionSource {
            name: desc.name.clone(),
        })?;

    if sources.len() != expected {
        return Err(ValidationError::ArityMismatch {
            name: desc.name.clone(),
            expected,
            found: sources.len(),
        });
    }

    if !desc.dimensions.is_empty() {
        return Err(ValidationError::ConflictingShape {
            name: desc.name.clone(),
        });
    }

    for reference in sources {
        let (position, target) = schema
            .inputs
            .iter()
            .enumerate()
            .find(|(_, d)| &d.name == reference)
            .ok_or_else(|| ValidationError::UnknownReference {
                name: desc.name.clone(),
                reference: reference.clone(),
            })?;

        if target.kind != ParameterKind::Scalar {
            return Err(ValidationError::NotScalar {
                name: desc.name.clone(),
                reference: reference.clone(),
            });
        }

        // A dynamic input exists, so `first_variable` is always set here.
        if let Some(first) = first_variable {
            if position > first {
                return Err(ValidationError::ReferenceAfterVariableField {
                    name: desc.name.clone(),
                    reference: reference.clone(),
                    field: schema.inputs[first].name.clone(),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ParameterDescriptor as P;

    fn with_sources(mut desc: P, sources: &[&str]) -> P {
        desc.dimension_sources = Some(sources.iter().map(|s| s.to_string()).collect());
        desc
    }

    #[test]
    fn test_valid_dynamic_schema_passes() {
        let schema = Schema::new(
            vec![
                P::scalar("n"),
                P::scalar("rows"),
                P::scalar("cols"),
                P::vector("static_v", 3),
                P::dynamic_vector("v", "n"),
                P::dynamic_matrix("m", "rows", "cols"),
                P::time_series("ts", 10, vec![]),
            ],
            vec![P::scalar("y"), P::time_series("out_ts", 10, vec![2, 3])],
        );
        assert_eq!(validate(&schema), Ok(()));
    }

    #[test]
    fn test_dimension_source_on_scalar_or_time_series_input() {
        for desc in [
            with_sources(P::scalar("s"), &["n"]),
            with_sources(P::time_series("ts", 5, vec![]), &["n"]),
        ] {
            let name = desc.name.clone();
            let schema = Schema::new(vec![P::scalar("n"), desc], vec![]);
            assert_eq!(
                validate(&schema),
                Err(ValidationError::IllegalDimensionSource { name })
            );
        }
    }

    #[test]
    fn test_dimension_source_on_output() {
        let schema = Schema::new(
            vec![P::scalar("n")],
            vec![with_sources(P::vector("out", 1), &["n"])],
        );
        assert!(matches!(
            validate(&schema),
            Err(ValidationError::IllegalDimensionSource { .. })
        ));
    }

    #[test]
    fn test_arity_mismatch() {
        let schema = Schema::new(
            vec![
                P::scalar("r"),
                with_sources(P::matrix("m", 1, 1), &["r"]),
            ],
            vec![],
        );
        assert_eq!(
            validate(&schema),
            Err(ValidationError::ArityMismatch {
                name: "m".into(),
                expected: 2,
                found: 1
            })
        );
    }

    #[test]
    fn test_unknown_and_non_scalar_references() {
        let unknown = Schema::new(vec![P::dynamic_vector("v", "missing")], vec![]);
        assert!(matches!(
            validate(&unknown),
            Err(ValidationError::UnknownReference { .. })
        ));

        let not_scalar = Schema::new(
            vec![P::vector("w", 2), P::dynamic_vector("v", "w")],
            vec![],
        );
        assert_eq!(
            validate(&not_scalar),
            Err(ValidationError::NotScalar {
                name: "v".into(),
                reference: "w".into()
            })
        );
    }

    #[test]
    fn test_static_and_dynamic_shape_conflict() {
        let schema = Schema::new(
            vec![P::scalar("n"), with_sources(P::vector("v", 3), &["n"])],
            vec![],
        );
        assert!(matches!(
            validate(&schema),
            Err(ValidationError::ConflictingShape { .. })
        ));
    }

    #[test]
    fn test_reference_positioned_after_variable_field() {
        let schema = Schema::new(
            vec![
                P::time_series("ts", 4, vec![]),
                P::scalar("n"),
                P::dynamic_vector("v", "n"),
            ],
            vec![],
        );
        assert_eq!(
            validate(&schema),
            Err(ValidationError::ReferenceAfterVariableField {
                name: "v".into(),
                reference: "n".into(),
                field: "ts".into()
            })
        );
    }

    #[test]
    fn test_table_input_is_rejected() {
        let schema = Schema::new(vec![P::table("t", 10)], vec![]);
        assert_eq!(
            validate(&schema),
            Err(ValidationError::OutputOnlyKind { name: "t".into() })
        );
    }

    #[test]
    fn test_table_input_with_sources_is_output_only() {
        let schema = Schema::new(
            vec![P::scalar("n"), with_sources(P::table("t", 10), &["n"])],
            vec![],
        );
        assert_eq!(
            validate(&schema),
            Err(ValidationError::OutputOnlyKind { name: "t".into() })
        );
    }

    #[test]
    fn test_duplicate_names_and_zero_dimensions() {
        let dup = Schema::new(vec![P::scalar("x"), P::scalar("x")], vec![]);
        assert!(matches!(
            validate(&dup),
            Err(ValidationError::DuplicateName { .. })
        ));

        let zero = Schema::new(vec![], vec![P::matrix("m", 2, 0)]);
        assert!(matches!(
            validate(&zero),
            Err(ValidationError::NonPositiveDimension { value: 0, .. })
        ));
    }
}
