//! Per-step payload validation for employee paperwork.
//!
//! Each step's JSON body is deserialized into a typed form and checked with
//! `validator`. Cross-field rules that `validator` cannot express (conditional
//! requirements) are checked by hand afterwards. Only the validated JSON is
//! stored; the typed structs are not persisted.

use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::error::CoreError;
use crate::onboarding::OnboardingStep;

/// Minimum employee age at the date of validation.
pub const MINIMUM_EMPLOYEE_AGE: i32 = 16;

static ZIP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{5}(-\d{4})?$").expect("valid zip regex"));
static SSN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{3})-?(\d{2})-?(\d{4})$").expect("valid ssn regex"));
static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\+?1?[\s.-]?\(?\d{3}\)?[\s.-]?\d{3}[\s.-]?\d{4}$").expect("valid phone regex")
});
static STATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{2}$").expect("valid state regex"));
static DIGITS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4,17}$").expect("valid account regex"));

// ---------------------------------------------------------------------------
// Field validators
// ---------------------------------------------------------------------------

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

fn validate_zip(value: &str) -> Result<(), ValidationError> {
    if ZIP_RE.is_match(value) {
        Ok(())
    } else {
        Err(invalid("zip", "ZIP code must be 5 digits or ZIP+4"))
    }
}

fn validate_state(value: &str) -> Result<(), ValidationError> {
    if STATE_RE.is_match(value) {
        Ok(())
    } else {
        Err(invalid("state", "State must be a two-letter code"))
    }
}

fn validate_phone(value: &str) -> Result<(), ValidationError> {
    if PHONE_RE.is_match(value) {
        Ok(())
    } else {
        Err(invalid("phone", "Phone number is not a valid US number"))
    }
}

/// SSNs never start with 000, 666 or 9xx, and neither group may be zeros.
pub fn validate_ssn(value: &str) -> Result<(), ValidationError> {
    let caps = SSN_RE
        .captures(value)
        .ok_or_else(|| invalid("ssn", "SSN must be 9 digits (XXX-XX-XXXX)"))?;
    let area = &caps[1];
    if area == "000" || area == "666" || area.starts_with('9') || &caps[2] == "00" || &caps[3] == "0000"
    {
        return Err(invalid("ssn", "SSN is not a valid number"));
    }
    Ok(())
}

/// ABA routing numbers are nine digits with a 3-7-1 weighted checksum.
pub fn validate_routing_number(value: &str) -> Result<(), ValidationError> {
    let digits: Vec<u32> = value.chars().filter_map(|c| c.to_digit(10)).collect();
    if digits.len() != 9 || value.len() != 9 {
        return Err(invalid("routing_number", "Routing number must be 9 digits"));
    }
    let weights = [3, 7, 1, 3, 7, 1, 3, 7, 1];
    let sum: u32 = digits.iter().zip(weights).map(|(d, w)| d * w).sum();
    if sum % 10 != 0 {
        return Err(invalid("routing_number", "Routing number checksum is invalid"));
    }
    Ok(())
}

fn validate_account_number(value: &str) -> Result<(), ValidationError> {
    if DIGITS_RE.is_match(value) {
        Ok(())
    } else {
        Err(invalid("account_number", "Account number must be 4-17 digits"))
    }
}

fn require_true(value: &bool) -> Result<(), ValidationError> {
    if *value {
        Ok(())
    } else {
        Err(invalid("acknowledged", "This acknowledgment is required"))
    }
}

fn one_of(value: &str, allowed: &[&str], code: &'static str) -> Result<(), CoreError> {
    if allowed.contains(&value) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid {code} '{value}'. Must be one of: {}",
            allowed.join(", ")
        )))
    }
}

fn age_on(date_of_birth: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - date_of_birth.year();
    if (today.month(), today.day()) < (date_of_birth.month(), date_of_birth.day()) {
        age -= 1;
    }
    age
}

// ---------------------------------------------------------------------------
// Forms
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
pub struct PersonalInfoForm {
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    #[validate(length(min = 1, max = 200))]
    pub address: String,
    #[validate(length(min = 1, max = 100))]
    pub city: String,
    #[validate(custom(function = "validate_state"))]
    pub state: String,
    #[validate(custom(function = "validate_zip"))]
    pub zip_code: String,
    #[validate(custom(function = "validate_phone"))]
    pub phone: Option<String>,
    #[validate(email)]
    pub personal_email: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct EmergencyContact {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(min = 1, max = 50))]
    pub relationship: String,
    #[validate(custom(function = "validate_phone"))]
    pub phone: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct EmergencyContactsForm {
    #[validate(length(min = 1, max = 3), nested)]
    pub contacts: Vec<EmergencyContact>,
}

pub const CITIZENSHIP_STATUSES: &[&str] = &[
    "citizen",
    "noncitizen_national",
    "permanent_resident",
    "authorized_alien",
];

#[derive(Debug, Deserialize, Validate)]
pub struct I9Section1Form {
    pub citizenship_status: String,
    #[validate(custom(function = "validate_ssn"))]
    pub ssn: Option<String>,
    pub uscis_number: Option<String>,
    pub work_authorization_expires: Option<NaiveDate>,
    #[validate(length(min = 1, max = 200))]
    pub signature: String,
    pub attested: bool,
}

pub const FILING_STATUSES: &[&str] = &["single", "married_filing_jointly", "head_of_household"];

#[derive(Debug, Deserialize, Validate)]
pub struct W4Form {
    pub filing_status: String,
    #[serde(default)]
    pub multiple_jobs: bool,
    #[validate(range(min = 0.0))]
    #[serde(default)]
    pub dependents_amount: f64,
    #[validate(range(min = 0.0))]
    #[serde(default)]
    pub other_income: f64,
    #[validate(range(min = 0.0))]
    #[serde(default)]
    pub deductions: f64,
    #[validate(range(min = 0.0))]
    #[serde(default)]
    pub extra_withholding: f64,
    #[validate(length(min = 1, max = 200))]
    pub signature: String,
}

pub const PAYMENT_METHODS: &[&str] = &["direct_deposit", "paper_check"];
pub const ACCOUNT_TYPES: &[&str] = &["checking", "savings"];

#[derive(Debug, Deserialize, Validate)]
pub struct DirectDepositForm {
    pub payment_method: String,
    pub bank_name: Option<String>,
    #[validate(custom(function = "validate_routing_number"))]
    pub routing_number: Option<String>,
    #[validate(custom(function = "validate_account_number"))]
    pub account_number: Option<String>,
    pub account_type: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub signature: String,
}

pub const COVERAGE_TIERS: &[&str] = &[
    "employee",
    "employee_spouse",
    "employee_children",
    "family",
];

#[derive(Debug, Deserialize, Validate)]
pub struct HealthInsuranceForm {
    /// `enroll` or `decline`.
    pub election: String,
    pub plan: Option<String>,
    pub coverage_tier: Option<String>,
    pub waiver_reason: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub signature: String,
}

/// Policy pages share one shape: read, acknowledge, sign.
#[derive(Debug, Deserialize, Validate)]
pub struct AcknowledgmentForm {
    #[validate(custom(function = "require_true"))]
    pub acknowledged: bool,
    #[validate(length(min = 1, max = 200))]
    pub signature: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct FinalReviewForm {
    #[validate(custom(function = "require_true"))]
    pub certified: bool,
    #[validate(length(min = 1, max = 200))]
    pub signature: String,
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn parse<T: for<'de> Deserialize<'de> + Validate>(
    step: OnboardingStep,
    data: &serde_json::Value,
) -> Result<T, CoreError> {
    let form: T = serde_json::from_value(data.clone()).map_err(|e| {
        CoreError::Validation(format!("Invalid payload for step '{step}': {e}"))
    })?;
    form.validate()?;
    Ok(form)
}

/// Validate the submitted JSON for `step`. `today` anchors age checks.
pub fn validate_step_data(
    step: OnboardingStep,
    data: &serde_json::Value,
    today: NaiveDate,
) -> Result<(), CoreError> {
    reject_nul(data)?;
    match step {
        OnboardingStep::PersonalInfo => {
            let form: PersonalInfoForm = parse(step, data)?;
            if age_on(form.date_of_birth, today) < MINIMUM_EMPLOYEE_AGE {
                return Err(CoreError::Validation(format!(
                    "Employee must be at least {MINIMUM_EMPLOYEE_AGE} years old"
                )));
            }
        }
        OnboardingStep::EmergencyContacts => {
            parse::<EmergencyContactsForm>(step, data)?;
        }
        OnboardingStep::I9Section1 => {
            let form: I9Section1Form = parse(step, data)?;
            one_of(&form.citizenship_status, CITIZENSHIP_STATUSES, "citizenship_status")?;
            if !form.attested {
                return Err(CoreError::Validation(
                    "I-9 Section 1 requires the employee attestation".into(),
                ));
            }
            match form.citizenship_status.as_str() {
                "permanent_resident" if form.uscis_number.is_none() => {
                    return Err(CoreError::Validation(
                        "Permanent residents must provide a USCIS/A-Number".into(),
                    ));
                }
                "authorized_alien" => match form.work_authorization_expires {
                    None => {
                        return Err(CoreError::Validation(
                            "Authorized aliens must provide a work authorization expiration date"
                                .into(),
                        ));
                    }
                    Some(expires) if expires < today => {
                        return Err(CoreError::Validation(
                            "Work authorization has already expired".into(),
                        ));
                    }
                    Some(_) => {}
                },
                _ => {}
            }
        }
        OnboardingStep::W4Form => {
            let form: W4Form = parse(step, data)?;
            one_of(&form.filing_status, FILING_STATUSES, "filing_status")?;
        }
        OnboardingStep::DirectDeposit => {
            let form: DirectDepositForm = parse(step, data)?;
            one_of(&form.payment_method, PAYMENT_METHODS, "payment_method")?;
            if form.payment_method == "direct_deposit" {
                if form.routing_number.is_none() || form.account_number.is_none() {
                    return Err(CoreError::Validation(
                        "Direct deposit requires routing_number and account_number".into(),
                    ));
                }
                let account_type = form.account_type.as_deref().ok_or_else(|| {
                    CoreError::Validation("Direct deposit requires account_type".into())
                })?;
                one_of(account_type, ACCOUNT_TYPES, "account_type")?;
            }
        }
        OnboardingStep::HealthInsurance => {
            let form: HealthInsuranceForm = parse(step, data)?;
            match form.election.as_str() {
                "enroll" => {
                    if form.plan.as_deref().is_none_or(|p| p.trim().is_empty()) {
                        return Err(CoreError::Validation(
                            "A plan must be selected to enroll".into(),
                        ));
                    }
                    let tier = form.coverage_tier.as_deref().ok_or_else(|| {
                        CoreError::Validation("coverage_tier is required to enroll".into())
                    })?;
                    one_of(tier, COVERAGE_TIERS, "coverage_tier")?;
                }
                "decline" => {}
                other => {
                    return Err(CoreError::Validation(format!(
                        "Invalid election '{other}'. Must be one of: enroll, decline"
                    )));
                }
            }
        }
        OnboardingStep::CompanyPolicies
        | OnboardingStep::TraffickingAwareness
        | OnboardingStep::WeaponsPolicy => {
            parse::<AcknowledgmentForm>(step, data)?;
        }
        OnboardingStep::FinalReview => {
            parse::<FinalReviewForm>(step, data)?;
        }
    }
    Ok(())
}

/// Reject any string in `value`, key or element, that contains U+0000.
///
/// Postgres refuses NUL in both `text` and `jsonb`, so it has to be caught
/// before anything reaches a query.
pub fn reject_nul(value: &serde_json::Value) -> Result<(), CoreError> {
    match value {
        serde_json::Value::String(s) => reject_nul_str(s),
        serde_json::Value::Array(items) => items.iter().try_for_each(reject_nul),
        serde_json::Value::Object(map) => map.iter().try_for_each(|(key, item)| {
            reject_nul_str(key)?;
            reject_nul(item)
        }),
        _ => Ok(()),
    }
}

pub fn reject_nul_str(s: &str) -> Result<(), CoreError> {
    if s.contains('\0') {
        return Err(CoreError::Validation(
            "Text must not contain NUL characters".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 15).unwrap()
    }

    fn personal_info() -> serde_json::Value {
        json!({
            "first_name": "Maria",
            "last_name": "Lopez",
            "date_of_birth": "1994-03-02",
            "address": "12 Harbor Way",
            "city": "Monterey",
            "state": "CA",
            "zip_code": "93940",
            "phone": "(831) 555-0134"
        })
    }

    #[test]
    fn personal_info_accepts_valid_payload() {
        assert!(validate_step_data(OnboardingStep::PersonalInfo, &personal_info(), today()).is_ok());
    }

    #[test]
    fn personal_info_rejects_bad_zip() {
        let mut data = personal_info();
        data["zip_code"] = json!("9394");
        assert_matches!(
            validate_step_data(OnboardingStep::PersonalInfo, &data, today()),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn personal_info_rejects_underage_employee() {
        let mut data = personal_info();
        data["date_of_birth"] = json!("2012-01-01");
        let err = validate_step_data(OnboardingStep::PersonalInfo, &data, today()).unwrap_err();
        assert!(err.to_string().contains("at least 16"));
    }

    #[test]
    fn missing_field_is_validation_error() {
        let data = json!({ "first_name": "Maria" });
        assert_matches!(
            validate_step_data(OnboardingStep::PersonalInfo, &data, today()),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn ssn_rules() {
        assert!(validate_ssn("123-45-6789").is_ok());
        assert!(validate_ssn("123456789").is_ok());
        assert!(validate_ssn("000-45-6789").is_err());
        assert!(validate_ssn("666-45-6789").is_err());
        assert!(validate_ssn("912-45-6789").is_err());
        assert!(validate_ssn("123-00-6789").is_err());
        assert!(validate_ssn("12-345-6789").is_err());
    }

    #[test]
    fn routing_number_checksum() {
        // 021000021 is a well-known valid ABA number.
        assert!(validate_routing_number("021000021").is_ok());
        assert!(validate_routing_number("021000022").is_err());
        assert!(validate_routing_number("02100002").is_err());
        assert!(validate_routing_number("02100002a").is_err());
    }

    #[test]
    fn direct_deposit_requires_account_details() {
        let data = json!({ "payment_method": "direct_deposit", "signature": "M. Lopez" });
        assert!(validate_step_data(OnboardingStep::DirectDeposit, &data, today()).is_err());

        let data = json!({
            "payment_method": "direct_deposit",
            "routing_number": "021000021",
            "account_number": "000123456789",
            "account_type": "checking",
            "signature": "M. Lopez"
        });
        assert!(validate_step_data(OnboardingStep::DirectDeposit, &data, today()).is_ok());
    }

    #[test]
    fn paper_check_needs_no_bank_details() {
        let data = json!({ "payment_method": "paper_check", "signature": "M. Lopez" });
        assert!(validate_step_data(OnboardingStep::DirectDeposit, &data, today()).is_ok());
    }

    #[test]
    fn i9_permanent_resident_needs_uscis_number() {
        let data = json!({
            "citizenship_status": "permanent_resident",
            "signature": "M. Lopez",
            "attested": true
        });
        let err = validate_step_data(OnboardingStep::I9Section1, &data, today()).unwrap_err();
        assert!(err.to_string().contains("USCIS"));
    }

    #[test]
    fn i9_requires_attestation() {
        let data = json!({
            "citizenship_status": "citizen",
            "ssn": "123-45-6789",
            "signature": "M. Lopez",
            "attested": false
        });
        assert!(validate_step_data(OnboardingStep::I9Section1, &data, today()).is_err());
    }

    #[test]
    fn i9_rejects_expired_work_authorization() {
        let data = json!({
            "citizenship_status": "authorized_alien",
            "work_authorization_expires": "2026-01-01",
            "signature": "M. Lopez",
            "attested": true
        });
        let err = validate_step_data(OnboardingStep::I9Section1, &data, today()).unwrap_err();
        assert!(err.to_string().contains("expired"));
    }

    #[test]
    fn w4_rejects_unknown_filing_status() {
        let data = json!({ "filing_status": "married", "signature": "M. Lopez" });
        assert!(validate_step_data(OnboardingStep::W4Form, &data, today()).is_err());
        let data = json!({ "filing_status": "single", "signature": "M. Lopez" });
        assert!(validate_step_data(OnboardingStep::W4Form, &data, today()).is_ok());
    }

    #[test]
    fn w4_rejects_negative_amounts() {
        let data = json!({
            "filing_status": "single",
            "dependents_amount": -500.0,
            "signature": "M. Lopez"
        });
        assert!(validate_step_data(OnboardingStep::W4Form, &data, today()).is_err());
    }

    #[test]
    fn health_insurance_enroll_needs_plan_and_tier() {
        let data = json!({ "election": "enroll", "signature": "M. Lopez" });
        assert!(validate_step_data(OnboardingStep::HealthInsurance, &data, today()).is_err());

        let data = json!({
            "election": "enroll",
            "plan": "hmo_basic",
            "coverage_tier": "family",
            "signature": "M. Lopez"
        });
        assert!(validate_step_data(OnboardingStep::HealthInsurance, &data, today()).is_ok());

        let data = json!({ "election": "decline", "signature": "M. Lopez" });
        assert!(validate_step_data(OnboardingStep::HealthInsurance, &data, today()).is_ok());
    }

    #[test]
    fn policy_acknowledgment_must_be_true() {
        let data = json!({ "acknowledged": false, "signature": "M. Lopez" });
        assert!(validate_step_data(OnboardingStep::CompanyPolicies, &data, today()).is_err());
        let data = json!({ "acknowledged": true, "signature": "M. Lopez" });
        assert!(validate_step_data(OnboardingStep::WeaponsPolicy, &data, today()).is_ok());
    }

    #[test]
    fn emergency_contacts_need_at_least_one() {
        let data = json!({ "contacts": [] });
        assert!(validate_step_data(OnboardingStep::EmergencyContacts, &data, today()).is_err());
        let data = json!({
            "contacts": [{ "name": "Ana Lopez", "relationship": "sister", "phone": "831-555-0199" }]
        });
        assert!(validate_step_data(OnboardingStep::EmergencyContacts, &data, today()).is_ok());
    }

    #[test]
    fn age_calculation_respects_birthday() {
        let dob = NaiveDate::from_ymd_opt(2000, 10, 16).unwrap();
        assert_eq!(age_on(dob, today()), 25);
        let dob = NaiveDate::from_ymd_opt(2000, 10, 15).unwrap();
        assert_eq!(age_on(dob, today()), 26);
    }

    #[test]
    fn nul_characters_are_rejected_anywhere_in_the_payload() {
        let mut data = json!({ "acknowledged": true, "signature": "Maria\u{0}Lopez" });
        assert_matches!(
            validate_step_data(OnboardingStep::CompanyPolicies, &data, today()),
            Err(CoreError::Validation(_))
        );

        data = json!({
            "contacts": [{ "name": "Ana", "relationship": "sister", "phone": "831-555-0199" }],
            "notes": { "nested\u{0}key": 1 }
        });
        assert_matches!(
            validate_step_data(OnboardingStep::EmergencyContacts, &data, today()),
            Err(CoreError::Validation(_))
        );

        assert!(reject_nul(&json!(["fine", 1, null, { "a": "b" }])).is_ok());
    }

    #[test]
    fn emergency_contact_list_length_is_checked() {
        let contact = json!({
            "name": "Ana Lopez",
            "relationship": "sister",
            "phone": "831-555-0199"
        });
        let data = json!({ "contacts": [contact.clone(), contact.clone(), contact.clone(), contact] });
        assert_matches!(
            validate_step_data(OnboardingStep::EmergencyContacts, &data, today()),
            Err(CoreError::Validation(_))
        );
    }
}
