// Validation utilities module
// Provides custom validation functions for domain-specific rules

use validator::ValidationError;

/// Validates that an experience level is one of the accepted values
/// Valid values: "beginner", "intermediate", "advanced" (case-insensitive)
pub fn validate_experience_level(level: &str) -> Result<(), ValidationError> {
    let valid_levels = ["beginner", "intermediate", "advanced"];
    if valid_levels.contains(&level.to_lowercase().as_str()) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_experience_level"))
    }
}

/// Validates that a preferred contact method is one of the accepted values
/// Valid values: "whatsapp", "email", "phone" (case-insensitive)
pub fn validate_contact_method(method: &str) -> Result<(), ValidationError> {
    let valid_methods = ["whatsapp", "email", "phone"];
    if valid_methods.contains(&method.to_lowercase().as_str()) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_contact_method"))
    }
}
