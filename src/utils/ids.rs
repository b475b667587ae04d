use mongodb::bson::oid::ObjectId;

use super::error::AppError;

/// Parses a 24-char hex object id coming from a path or a body field.
pub fn parse_object_id(value: &str, field: &str) -> Result<ObjectId, AppError> {
    ObjectId::parse_str(value.trim())
        .map_err(|_| AppError::Validation(format!("{} must be a valid object id", field)))
}

/// Validates the format of an optional reference field.
pub fn check_reference(value: &Option<String>, field: &str) -> Result<(), AppError> {
    if let Some(v) = value {
        parse_object_id(v, field)?;
    }
    Ok(())
}

/// Lowercase hex form of a reference id, so that every spelling of one id is stored
/// and matched the same way. Values that are not ids come back trimmed.
pub fn canonical_id(value: &str) -> String {
    let trimmed = value.trim();
    ObjectId::parse_str(trimmed)
        .map(|oid| oid.to_hex())
        .unwrap_or_else(|_| trimmed.to_string())
}

pub fn canonical_ref(value: Option<String>) -> Option<String> {
    value.map(|v| canonical_id(&v))
}

/// Fields holding references to other documents.
pub fn is_reference_field(key: &str) -> bool {
    key.ends_with("_id") || key == "assigned_to"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_ids() {
        let id = ObjectId::new();
        assert_eq!(parse_object_id(&id.to_hex(), "id").unwrap(), id);
    }

    #[test]
    fn rejects_malformed_ids_with_field_name() {
        let err = parse_object_id("not-an-id", "project_id").unwrap_err();
        assert_eq!(err.to_string(), "project_id must be a valid object id");
    }

    #[test]
    fn optional_reference_accepts_none() {
        assert!(check_reference(&None, "lead_id").is_ok());
        assert!(check_reference(&Some("xyz".to_string()), "lead_id").is_err());
    }

    #[test]
    fn canonical_form_is_lowercase_and_trimmed() {
        let id = ObjectId::new().to_hex();
        assert_eq!(canonical_id(&id.to_uppercase()), id);
        assert_eq!(canonical_id(&format!("  {}\n", id)), id);
        assert_eq!(canonical_ref(Some(id.to_uppercase())), Some(id));
        assert_eq!(canonical_ref(None), None);
    }

    #[test]
    fn reference_fields() {
        assert!(is_reference_field("project_id"));
        assert!(is_reference_field("assigned_to"));
        assert!(!is_reference_field("status"));
    }
}
