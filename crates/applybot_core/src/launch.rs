use std::ops::RangeInclusive;

use serde::Serialize;

use crate::error::ValidationError;

pub const MIN_LIMIT: u32 = 1;
pub const MAX_LIMIT: u32 = 100;
pub const TIMEOUT_SEC_RANGE: RangeInclusive<u32> = 5..=120;
pub const CAPTCHA_WAIT_SEC_RANGE: RangeInclusive<u32> = 0..=900;
pub const SLOW_MO_MS_RANGE: RangeInclusive<u32> = 0..=2000;

/// Raw launch input as typed by the user.
///
/// Blank optional text fields are left out of the request; blank tuning
/// numbers leave the backend default in place.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LaunchForm {
    pub specialization: String,
    pub full_name: String,
    pub location: String,
    pub experience_level: String,
    pub user_request: String,
    pub results_limit: String,
    pub max_applications: String,
    pub resume_on_file: bool,
    pub llm_model: String,
    pub headless: Option<bool>,
    pub timeout_sec: String,
    pub captcha_wait_sec: String,
    pub slow_mo_ms: String,
}

/// Validated parameters, serialised as the body of the start request.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct LaunchParams {
    pub specialization: String,
    pub full_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_request: Option<String>,
    #[serde(rename = "limit")]
    pub results_limit: u32,
    #[serde(rename = "max_apply")]
    pub max_applications: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub llm_model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headless: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_sec: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub captcha_wait_sec: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slow_mo_ms: Option<u32>,
}

impl LaunchForm {
    /// Checks every rule locally; all violations are returned in a fixed order.
    pub fn validate(&self) -> Result<LaunchParams, Vec<ValidationError>> {
        let mut errors = Vec::new();

        let specialization = self.specialization.trim();
        if specialization.is_empty() {
            errors.push(ValidationError::SpecializationRequired);
        }
        let full_name = self.full_name.trim();
        if full_name.is_empty() {
            errors.push(ValidationError::FullNameRequired);
        }
        if !self.resume_on_file {
            errors.push(ValidationError::ResumeMissing);
        }
        let limit_range = MIN_LIMIT..=MAX_LIMIT;
        let results_limit = parse_bounded(&self.results_limit, &limit_range);
        if results_limit.is_none() {
            errors.push(ValidationError::ResultsLimitOutOfRange);
        }
        let max_applications = parse_bounded(&self.max_applications, &limit_range);
        if max_applications.is_none() {
            errors.push(ValidationError::MaxApplicationsOutOfRange);
        }
        let timeout_sec = parse_optional(&self.timeout_sec, &TIMEOUT_SEC_RANGE)
            .unwrap_or_else(|| {
                errors.push(ValidationError::TimeoutOutOfRange);
                None
            });
        let captcha_wait_sec = parse_optional(&self.captcha_wait_sec, &CAPTCHA_WAIT_SEC_RANGE)
            .unwrap_or_else(|| {
                errors.push(ValidationError::CaptchaWaitOutOfRange);
                None
            });
        let slow_mo_ms = parse_optional(&self.slow_mo_ms, &SLOW_MO_MS_RANGE).unwrap_or_else(|| {
            errors.push(ValidationError::SlowMoOutOfRange);
            None
        });

        match (results_limit, max_applications) {
            (Some(results_limit), Some(max_applications)) if errors.is_empty() => {
                Ok(LaunchParams {
                    specialization: specialization.to_string(),
                    full_name: full_name.to_string(),
                    location: non_blank(&self.location),
                    experience_level: non_blank(&self.experience_level),
                    user_request: non_blank(&self.user_request),
                    results_limit,
                    max_applications,
                    llm_model: non_blank(&self.llm_model),
                    headless: self.headless,
                    timeout_sec,
                    captcha_wait_sec,
                    slow_mo_ms,
                })
            }
            _ => Err(errors),
        }
    }
}

fn non_blank(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// A finite whole number within `range`.
fn parse_bounded(raw: &str, range: &RangeInclusive<u32>) -> Option<u32> {
    let value: f64 = raw.trim().parse().ok()?;
    if !value.is_finite() || value.fract() != 0.0 {
        return None;
    }
    if value < f64::from(*range.start()) || value > f64::from(*range.end()) {
        return None;
    }
    Some(value as u32)
}

/// `Some(None)` for a blank field, `None` when the value is out of range.
fn parse_optional(raw: &str, range: &RangeInclusive<u32>) -> Option<Option<u32>> {
    if raw.trim().is_empty() {
        return Some(None);
    }
    parse_bounded(raw, range).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn valid_form() -> LaunchForm {
        LaunchForm {
            specialization: "  Backend engineer ".to_string(),
            full_name: "Ada Lovelace".to_string(),
            results_limit: "20".to_string(),
            max_applications: "10".to_string(),
            resume_on_file: true,
            ..LaunchForm::default()
        }
    }

    #[test]
    fn valid_form_is_trimmed_into_params() {
        let params = valid_form().validate().unwrap();
        assert_eq!(
            params,
            LaunchParams {
                specialization: "Backend engineer".to_string(),
                full_name: "Ada Lovelace".to_string(),
                results_limit: 20,
                max_applications: 10,
                ..LaunchParams::default()
            }
        );
    }

    #[test]
    fn results_limit_bounds() {
        for bad in ["0", "101", "abc", "", "NaN", "inf", "2.5", "-1"] {
            let form = LaunchForm {
                results_limit: bad.to_string(),
                ..valid_form()
            };
            assert_eq!(
                form.validate(),
                Err(vec![ValidationError::ResultsLimitOutOfRange]),
                "input {bad:?}"
            );
        }
        for good in ["1", "100", " 50 ", "7.0"] {
            let form = LaunchForm {
                results_limit: good.to_string(),
                ..valid_form()
            };
            assert!(form.validate().is_ok(), "input {good:?}");
        }
    }

    #[test]
    fn max_applications_has_its_own_code() {
        let form = LaunchForm {
            max_applications: "101".to_string(),
            ..valid_form()
        };
        assert_eq!(
            form.validate(),
            Err(vec![ValidationError::MaxApplicationsOutOfRange])
        );
    }

    #[test]
    fn every_violation_is_reported_in_order() {
        let form = LaunchForm {
            specialization: "   ".to_string(),
            full_name: "\t".to_string(),
            results_limit: "0".to_string(),
            max_applications: "x".to_string(),
            resume_on_file: false,
            timeout_sec: "4".to_string(),
            captcha_wait_sec: "901".to_string(),
            slow_mo_ms: "-5".to_string(),
            ..LaunchForm::default()
        };
        assert_eq!(
            form.validate(),
            Err(vec![
                ValidationError::SpecializationRequired,
                ValidationError::FullNameRequired,
                ValidationError::ResumeMissing,
                ValidationError::ResultsLimitOutOfRange,
                ValidationError::MaxApplicationsOutOfRange,
                ValidationError::TimeoutOutOfRange,
                ValidationError::CaptchaWaitOutOfRange,
                ValidationError::SlowMoOutOfRange,
            ])
        );
    }

    #[test]
    fn tuning_bounds_are_inclusive() {
        let form = LaunchForm {
            timeout_sec: "120".to_string(),
            captcha_wait_sec: "0".to_string(),
            slow_mo_ms: "2000".to_string(),
            headless: Some(false),
            ..valid_form()
        };
        let params = form.validate().unwrap();
        assert_eq!(params.timeout_sec, Some(120));
        assert_eq!(params.captcha_wait_sec, Some(0));
        assert_eq!(params.slow_mo_ms, Some(2000));
        assert_eq!(params.headless, Some(false));

        let too_short = LaunchForm {
            timeout_sec: "4.5".to_string(),
            ..valid_form()
        };
        assert_eq!(
            too_short.validate(),
            Err(vec![ValidationError::TimeoutOutOfRange])
        );
    }

    #[test]
    fn params_serialise_with_wire_names() {
        let params = LaunchForm {
            location: " Berlin ".to_string(),
            experience_level: "senior".to_string(),
            user_request: "  remote only ".to_string(),
            max_applications: "7".to_string(),
            ..valid_form()
        }
        .validate()
        .unwrap();
        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "specialization": "Backend engineer",
                "full_name": "Ada Lovelace",
                "location": "Berlin",
                "experience_level": "senior",
                "user_request": "remote only",
                "limit": 20,
                "max_apply": 7
            })
        );
    }

    #[test]
    fn tuning_fields_appear_only_when_set() {
        let params = LaunchForm {
            llm_model: "gpt-4o-mini".to_string(),
            headless: Some(true),
            slow_mo_ms: "250".to_string(),
            ..valid_form()
        }
        .validate()
        .unwrap();
        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(json["llm_model"], "gpt-4o-mini");
        assert_eq!(json["headless"], true);
        assert_eq!(json["slow_mo_ms"], 250);
        assert!(json.get("timeout_sec").is_none());
        assert!(json.get("captcha_wait_sec").is_none());
        assert!(json.get("max_applications").is_none());
    }
}
