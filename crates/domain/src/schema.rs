//! Write-time schema enforcement for resource payloads.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::model::Resource;

/// Reasons a payload cannot be stored as a resource.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("payload must be a JSON object")]
    NotAnObject,
    #[error("`{field}` is required")]
    MissingRequired { field: &'static str },
    #[error("{0}")]
    Invalid(String),
}

/// Builds a resource from a raw payload, enforcing types and required fields.
///
/// Keys that are not fields of `R` are dropped.
pub fn validate_document<R: Resource>(payload: Value) -> Result<R, SchemaError> {
    if !payload.is_object() {
        return Err(SchemaError::NotAnObject);
    }
    let candidate: R =
        serde_json::from_value(payload).map_err(|err| SchemaError::Invalid(err.to_string()))?;
    candidate.check_required()?;
    Ok(candidate)
}

/// Overlays `patch` on `current` and re-validates the merged record.
pub fn apply_patch<R: Resource>(current: &R, patch: &Map<String, Value>) -> Result<R, SchemaError> {
    let mut merged = match serde_json::to_value(current) {
        Ok(Value::Object(map)) => map,
        Ok(_) => return Err(SchemaError::NotAnObject),
        Err(err) => return Err(SchemaError::Invalid(err.to_string())),
    };
    for (field, value) in patch {
        merged.insert(field.clone(), value.clone());
    }
    validate_document(Value::Object(merged))
}

pub(crate) fn require_text(field: &'static str, value: &str) -> Result<(), SchemaError> {
    if value.is_empty() {
        Err(SchemaError::MissingRequired { field })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Exercise, User, Workout};
    use serde_json::json;

    fn patch(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    fn james() -> User {
        validate_document(json!({
            "username": "James",
            "password": "verysecurepassword66",
            "weight": 80
        }))
        .unwrap()
    }

    #[test]
    fn accepts_complete_user() {
        let user = james();
        assert_eq!(user.username, "James");
        assert_eq!(user.weight, Some(80.into()));
    }

    #[test]
    fn rejects_missing_required_field() {
        let err = validate_document::<User>(json!({"password": "x", "weight": 80})).unwrap_err();
        assert!(matches!(err, SchemaError::Invalid(_)));
    }

    #[test]
    fn rejects_empty_required_text() {
        let err =
            validate_document::<User>(json!({"username": "", "password": "x"})).unwrap_err();
        assert_eq!(err, SchemaError::MissingRequired { field: "username" });
    }

    #[test]
    fn rejects_wrong_types_and_non_objects() {
        assert!(validate_document::<User>(json!({"username": "a", "password": "b", "weight": "heavy"})).is_err());
        assert_eq!(
            validate_document::<User>(json!(["username"])),
            Err(SchemaError::NotAnObject)
        );
        assert!(validate_document::<Exercise>(json!({
            "exercise_name": "Pull Up",
            "bodyweightBoolean": "yes",
            "finishedBoolean": false
        }))
        .is_err());
    }

    #[test]
    fn drops_unknown_keys_on_create() {
        let user: User = validate_document(json!({
            "username": "a",
            "password": "b",
            "favourite_colour": "green"
        }))
        .unwrap();
        let value = serde_json::to_value(&user).unwrap();
        assert!(value.get("favourite_colour").is_none());
    }

    #[test]
    fn patch_changes_only_targeted_fields() {
        let updated = apply_patch(&james(), &patch(json!({"weight": 85}))).unwrap();
        assert_eq!(updated.weight, Some(85.into()));
        assert_eq!(updated.username, "James");
        assert_eq!(updated.password, "verysecurepassword66");
    }

    #[test]
    fn patch_cannot_null_required_fields() {
        let err = apply_patch(&james(), &patch(json!({"username": null}))).unwrap_err();
        assert!(matches!(err, SchemaError::Invalid(_)));
    }

    #[test]
    fn patch_keeps_exercise_defaults_untouched() {
        let exercise: Exercise = validate_document(json!({
            "exercise_name": "Squat",
            "bodyweightBoolean": false,
            "reps": [5, 5, 5],
            "finishedBoolean": false
        }))
        .unwrap();
        let updated = apply_patch(&exercise, &patch(json!({"finishedBoolean": true}))).unwrap();
        assert!(updated.finished);
        assert_eq!(updated.reps, exercise.reps);
        assert!(updated.weights.is_empty());
    }

    #[test]
    fn workout_requires_exercises() {
        assert!(validate_document::<Workout>(json!({
            "workout_name": "Push",
            "finishedBoolean": false
        }))
        .is_err());
    }
}
