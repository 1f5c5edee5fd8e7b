//! Input validation for service profiles
//!
//! These checks run at the caller boundary (operator CLI, API layer) before an
//! orchestrator call. The network-server remains the authority on what it
//! accepts; a document passing here may still be rejected remotely.

use validator::{ValidationError, ValidationErrors};

use crate::model::{PolicyDocument, ServiceProfile};

/// Maximum length for a service-profile name
pub const MAX_PROFILE_NAME_LENGTH: usize = 100;

/// Highest data-rate index defined by the regional parameters
pub const MAX_DATA_RATE: u32 = 15;

/// Maximum target packet error rate, in percent
pub const MAX_TARGET_PER: u32 = 100;

/// Validate service-profile name
///
/// Name must:
/// - Not be empty or whitespace only
/// - Not exceed MAX_PROFILE_NAME_LENGTH characters
pub fn validate_profile_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::new("name_empty"));
    }
    if name.chars().count() > MAX_PROFILE_NAME_LENGTH {
        return Err(ValidationError::new("name_too_long"));
    }
    Ok(())
}

/// Validate the data-rate bounds of a policy document
pub fn validate_data_rate_range(policy: &PolicyDocument) -> Result<(), ValidationError> {
    if policy.dr_max > MAX_DATA_RATE {
        return Err(ValidationError::new("dr_max_out_of_range"));
    }
    if policy.dr_min > policy.dr_max {
        return Err(ValidationError::new("dr_min_greater_than_dr_max"));
    }
    Ok(())
}

/// Validate the target packet error rate of a policy document
pub fn validate_target_per(policy: &PolicyDocument) -> Result<(), ValidationError> {
    if policy.target_per > MAX_TARGET_PER {
        return Err(ValidationError::new("target_per_out_of_range"));
    }
    Ok(())
}

/// Validate a whole service profile, collecting every failing field
pub fn validate_service_profile(profile: &ServiceProfile) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if let Err(e) = validate_profile_name(&profile.name) {
        errors.add("name", e);
    }
    if profile.organization_id <= 0 {
        errors.add(
            "organizationId",
            ValidationError::new("organization_id_missing"),
        );
    }
    if profile.network_server_id <= 0 {
        errors.add(
            "networkServerId",
            ValidationError::new("network_server_id_missing"),
        );
    }
    if let Err(e) = validate_data_rate_range(&profile.policy) {
        errors.add("drMin", e);
    }
    if let Err(e) = validate_target_per(&profile.policy) {
        errors.add("targetPer", e);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
