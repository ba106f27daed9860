//! Pure domain services for the e-Residency flow.
//!
//! Name derivation and token generation used by mock sign-in, form
//! validation run before a submission reaches the session, and the
//! composition of the digital ID card shown on the dashboard.

use super::errors::{DomainError, DomainResult};
use super::models::{Application, ApplicationDraft, Business, BusinessDraft, CompanyType, Purpose};
use chrono::{Datelike, NaiveDate};
use rand::Rng;

/// Earliest date of birth the application form accepts.
pub const EARLIEST_BIRTH_DATE: (i32, u32, u32) = (1900, 1, 1);

/// Length of a phone number on the application form.
pub const PHONE_NUMBER_DIGITS: usize = 10;

/// Years a digital ID stays valid after it is displayed.
pub const ID_VALIDITY_YEARS: i32 = 5;

const TOKEN_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const TOKEN_LENGTH: usize = 9;

/// Derives a display name from the local part of an email address.
///
/// Everything after the first `@` is dropped, characters other than ASCII
/// letters and whitespace are removed, and the first letter of every word
/// is upper-cased.
///
/// # Examples
///
/// ```
/// use eresidency::domain::derive_display_name;
///
/// assert_eq!(derive_display_name("ps@example.com"), "Ps");
/// assert_eq!(derive_display_name("tenzin.norbu99@example.com"), "Tenzinnorbu");
/// ```
pub fn derive_display_name(email: &str) -> String {
    let local_part = email.split('@').next().unwrap_or_default();
    let mut name = String::with_capacity(local_part.len());
    let mut at_word_start = true;

    for ch in local_part.chars() {
        if ch.is_whitespace() {
            name.push(ch);
            at_word_start = true;
        } else if ch.is_ascii_alphabetic() {
            if at_word_start {
                name.push(ch.to_ascii_uppercase());
            } else {
                name.push(ch);
            }
            at_word_start = false;
        }
    }

    name
}

/// Generates a random opaque lowercase base-36 token used as a user id.
pub fn generate_token() -> String {
    let mut rng = rand::rng();
    (0..TOKEN_LENGTH)
        .map(|_| char::from(TOKEN_ALPHABET[rng.random_range(0..TOKEN_ALPHABET.len())]))
        .collect()
}

/// Raw application form input as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplicationForm {
    pub full_name: String,
    pub date_of_birth: String,
    pub phone_number: String,
    pub purpose: Option<Purpose>,
    pub id_number: String,
}

impl ApplicationForm {
    /// Validates the form and produces the submission payload.
    ///
    /// Rules are checked in form order and the first failure is returned.
    /// `today` bounds the date of birth from above.
    pub fn validate(&self, today: NaiveDate) -> DomainResult<ApplicationDraft> {
        if self.full_name.trim().is_empty() {
            return Err(DomainError::MissingFullName);
        }

        let date_of_birth = parse_birth_date(&self.date_of_birth, today)?;

        if !is_valid_phone_number(&self.phone_number) {
            return Err(DomainError::InvalidPhoneNumber);
        }

        let purpose = self.purpose.ok_or(DomainError::MissingPurpose)?;

        if self.id_number.trim().is_empty() {
            return Err(DomainError::MissingIdNumber);
        }

        Ok(ApplicationDraft {
            full_name: self.full_name.clone(),
            date_of_birth: date_of_birth.format("%Y-%m-%d").to_string(),
            phone_number: self.phone_number.clone(),
            purpose_of_application: purpose,
            id_number: self.id_number.clone(),
        })
    }
}

fn parse_birth_date(input: &str, today: NaiveDate) -> DomainResult<NaiveDate> {
    let date = NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map_err(|_| DomainError::InvalidDateOfBirth)?;
    let (year, month, day) = EARLIEST_BIRTH_DATE;
    let earliest =
        NaiveDate::from_ymd_opt(year, month, day).ok_or(DomainError::InvalidDateOfBirth)?;

    if date < earliest || date > today {
        return Err(DomainError::InvalidDateOfBirth);
    }
    Ok(date)
}

/// Returns true for exactly ten ASCII digits.
pub fn is_valid_phone_number(phone: &str) -> bool {
    phone.len() == PHONE_NUMBER_DIGITS && phone.chars().all(|c| c.is_ascii_digit())
}

/// Raw business registration input. `id_number` is prefilled and read-only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BusinessForm {
    pub full_name: String,
    pub company_id: String,
    pub company_investment: String,
    pub company_goal: String,
    pub company_type: Option<CompanyType>,
    pub id_number: String,
}

impl BusinessForm {
    /// Creates an empty form bound to an application's id number.
    pub fn for_application(application: &Application) -> Self {
        Self {
            id_number: application.id_number.clone(),
            ..Self::default()
        }
    }

    /// Validates the form and produces the submission payload.
    pub fn validate(&self) -> DomainResult<BusinessDraft> {
        if self.full_name.trim().is_empty() {
            return Err(DomainError::MissingFullName);
        }
        if self.company_id.trim().is_empty() {
            return Err(DomainError::MissingCompanyId);
        }
        if !is_positive_amount(&self.company_investment) {
            return Err(DomainError::InvalidInvestment);
        }
        if self.company_goal.trim().is_empty() {
            return Err(DomainError::MissingCompanyGoal);
        }
        let company_type = self.company_type.ok_or(DomainError::MissingCompanyType)?;

        Ok(BusinessDraft {
            full_name: self.full_name.clone(),
            company_id: self.company_id.clone(),
            company_investment: self.company_investment.clone(),
            company_goal: self.company_goal.clone(),
            company_type,
            id_number: self.id_number.clone(),
        })
    }
}

fn is_positive_amount(input: &str) -> bool {
    input
        .trim()
        .parse::<f64>()
        .map(|amount| amount.is_finite() && amount > 0.0)
        .unwrap_or(false)
}

/// Everything printed on the digital ID card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigitalIdCard {
    pub full_name: String,
    pub initial: Option<char>,
    pub id_number: String,
    pub date_of_birth: String,
    pub valid_until_year: i32,
    pub business_approved: bool,
}

impl DigitalIdCard {
    /// Composes the card for an application, as seen on `today`.
    pub fn issue(application: &Application, business: Option<&Business>, today: NaiveDate) -> Self {
        let date_of_birth = NaiveDate::parse_from_str(&application.date_of_birth, "%Y-%m-%d")
            .map(|date| date.format("%d %b %Y").to_string())
            .unwrap_or_else(|_| application.date_of_birth.clone());

        Self {
            full_name: application.full_name.clone(),
            initial: application.full_name.chars().next(),
            id_number: application.id_number.clone(),
            date_of_birth,
            valid_until_year: today.year() + ID_VALIDITY_YEARS,
            business_approved: business.is_some_and(|b| b.approved),
        }
    }
}
