//! Schema validation of model output.
//!
//! This is the single source of truth for whether AI output is trustworthy
//! enough to create tasks from: callers receive a fully-typed result and
//! never re-validate. Violations are collected exhaustively, so a rejected
//! response reports every broken field rather than the first one found.

use serde_json::Value;

use crate::task::{Category, Priority};

use super::error::{SchemaViolation, ValidateError};
use super::{GeneratedTask, GenerationMode, GenerationResult};

/// Parse normalized model output and validate it against the task contract.
///
/// A JSON parse failure is a [`ValidateError::Malformed`], distinct from a
/// schema violation. In `Subtasks` mode a single object where an array was
/// expected is wrapped into a one-element batch before validation, a common
/// model mistake worth forgiving.
pub fn parse_generation(
    text: &str,
    mode: GenerationMode,
) -> Result<GenerationResult, ValidateError> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| ValidateError::Malformed(e.to_string()))?;

    match mode {
        GenerationMode::Enhance => {
            let task = validate_task(&value, None).map_err(ValidateError::Schema)?;
            Ok(GenerationResult::Single(task))
        }
        GenerationMode::Subtasks => {
            let items = match value {
                Value::Array(items) => items,
                Value::Object(_) => vec![value],
                other => {
                    return Err(ValidateError::Schema(vec![SchemaViolation {
                        field: "$".to_string(),
                        message: format!(
                            "expected an array of task objects, got {}",
                            type_name(&other)
                        ),
                    }]))
                }
            };

            if items.is_empty() {
                return Err(ValidateError::Schema(vec![SchemaViolation {
                    field: "$".to_string(),
                    message: "expected a non-empty array of tasks".to_string(),
                }]));
            }

            let mut tasks = Vec::with_capacity(items.len());
            let mut violations = Vec::new();
            for (index, item) in items.iter().enumerate() {
                match validate_task(item, Some(index)) {
                    Ok(task) => tasks.push(task),
                    Err(mut found) => violations.append(&mut found),
                }
            }

            if violations.is_empty() {
                Ok(GenerationResult::Batch(tasks))
            } else {
                Err(ValidateError::Schema(violations))
            }
        }
    }
}

/// Validate one task object, collecting every violation.
fn validate_task(value: &Value, index: Option<usize>) -> Result<GeneratedTask, Vec<SchemaViolation>> {
    let path = |field: &str| match index {
        Some(i) => format!("[{}].{}", i, field),
        None => field.to_string(),
    };

    let Some(obj) = value.as_object() else {
        return Err(vec![SchemaViolation {
            field: path("$"),
            message: format!("expected a task object, got {}", type_name(value)),
        }]);
    };

    let mut violations = Vec::new();

    let title = required_string(obj, "title", &path, &mut violations);
    let description = required_string(obj, "description", &path, &mut violations);

    let category = required_string(obj, "category", &path, &mut violations).and_then(|s| {
        s.parse::<Category>().map_err(|_| {
            violations.push(SchemaViolation {
                field: path("category"),
                message: format!(
                    "\"{}\" is not one of WORK, PERSONAL, HEALTH, FINANCE, SHOPPING",
                    s
                ),
            })
        })
        .ok()
    });

    let priority = required_string(obj, "priority", &path, &mut violations).and_then(|s| {
        s.parse::<Priority>().map_err(|_| {
            violations.push(SchemaViolation {
                field: path("priority"),
                message: format!("\"{}\" is not one of HIGH, MEDIUM, LOW", s),
            })
        })
        .ok()
    });

    // Required but nullable.
    let suggested_deadline = match obj.get("suggestedDeadline") {
        Some(Value::String(s)) => Some(Some(s.clone())),
        Some(Value::Null) => Some(None),
        Some(other) => {
            violations.push(SchemaViolation {
                field: path("suggestedDeadline"),
                message: format!("expected an ISO date string or null, got {}", type_name(other)),
            });
            None
        }
        None => {
            violations.push(SchemaViolation {
                field: path("suggestedDeadline"),
                message: "missing required field".to_string(),
            });
            None
        }
    };

    match (title, description, category, priority, suggested_deadline) {
        (Some(title), Some(description), Some(category), Some(priority), Some(deadline))
            if violations.is_empty() =>
        {
            Ok(GeneratedTask {
                title,
                description,
                category,
                priority,
                suggested_deadline: deadline,
            })
        }
        _ => Err(violations),
    }
}

fn required_string(
    obj: &serde_json::Map<String, Value>,
    key: &str,
    path: &impl Fn(&str) -> String,
    violations: &mut Vec<SchemaViolation>,
) -> Option<String> {
    match obj.get(key) {
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => {
            violations.push(SchemaViolation {
                field: path(key),
                message: format!("expected a string, got {}", type_name(other)),
            });
            None
        }
        None => {
            violations.push(SchemaViolation {
                field: path(key),
                message: "missing required field".to_string(),
            });
            None
        }
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
