use thiserror::Error;

/// A form field failed validation. The message is shown to the user as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("Please enter your full name")]
    MissingFullName,
    #[error("Please select your date of birth")]
    InvalidDateOfBirth,
    #[error("Please enter a valid 10-digit phone number")]
    InvalidPhoneNumber,
    #[error("Please specify the purpose of your application")]
    MissingPurpose,
    #[error("Please enter your ID number")]
    MissingIdNumber,
    #[error("Please enter company ID")]
    MissingCompanyId,
    #[error("Please enter a valid investment amount")]
    InvalidInvestment,
    #[error("Please describe your company goals")]
    MissingCompanyGoal,
    #[error("Please select company type")]
    MissingCompanyType,
}

pub type DomainResult<T> = Result<T, DomainError>;
