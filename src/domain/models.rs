use serde::{Deserialize, Serialize};

/// The signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub email: String,
    pub name: String,
    pub id: String,
}

/// Adjudication state of an e-Residency application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApplicationStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "Pending",
            ApplicationStatus::Approved => "Approved",
            ApplicationStatus::Rejected => "Rejected",
        }
    }
}

/// Reason given for applying. Stored by its lowercase code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Purpose {
    Business,
    Investment,
    Education,
    Research,
    Tourism,
    Other,
}

impl Purpose {
    pub const ALL: [Purpose; 6] = [
        Purpose::Business,
        Purpose::Investment,
        Purpose::Education,
        Purpose::Research,
        Purpose::Tourism,
        Purpose::Other,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Purpose::Business => "Business Development",
            Purpose::Investment => "Investment Opportunities",
            Purpose::Education => "Educational Purpose",
            Purpose::Research => "Research & Development",
            Purpose::Tourism => "Tourism & Travel",
            Purpose::Other => "Other",
        }
    }
}

/// Legal form of a registered business. Stored by its display name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompanyType {
    #[serde(rename = "Private Limited")]
    PrivateLimited,
    #[serde(rename = "Partnership")]
    Partnership,
    #[serde(rename = "NGO")]
    Ngo,
    #[serde(rename = "Cooperative")]
    Cooperative,
    #[serde(rename = "Sole Proprietor")]
    SoleProprietor,
}

impl CompanyType {
    pub const ALL: [CompanyType; 5] = [
        CompanyType::PrivateLimited,
        CompanyType::Partnership,
        CompanyType::Ngo,
        CompanyType::Cooperative,
        CompanyType::SoleProprietor,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            CompanyType::PrivateLimited => "Private Limited",
            CompanyType::Partnership => "Partnership",
            CompanyType::Ngo => "NGO",
            CompanyType::Cooperative => "Cooperative",
            CompanyType::SoleProprietor => "Sole Proprietor",
        }
    }
}

/// Application form contents as submitted, before a status is attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationDraft {
    pub full_name: String,
    pub date_of_birth: String,
    pub phone_number: String,
    pub purpose_of_application: Purpose,
    pub id_number: String,
}

/// A submitted e-Residency application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub full_name: String,
    pub date_of_birth: String,
    pub phone_number: String,
    pub purpose_of_application: Purpose,
    pub id_number: String,
    pub status: ApplicationStatus,
}

impl Application {
    pub fn from_draft(draft: ApplicationDraft, status: ApplicationStatus) -> Self {
        Self {
            full_name: draft.full_name,
            date_of_birth: draft.date_of_birth,
            phone_number: draft.phone_number,
            purpose_of_application: draft.purpose_of_application,
            id_number: draft.id_number,
            status,
        }
    }
}

/// Business registration form contents, before approval is attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessDraft {
    pub full_name: String,
    pub company_id: String,
    pub company_investment: String,
    pub company_goal: String,
    pub company_type: CompanyType,
    pub id_number: String,
}

/// A registered business. `id_number` is copied from the owning application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Business {
    pub full_name: String,
    pub company_id: String,
    pub company_investment: String,
    pub company_goal: String,
    pub company_type: CompanyType,
    pub id_number: String,
    pub approved: bool,
}

impl Business {
    pub fn from_draft(draft: BusinessDraft, approved: bool) -> Self {
        Self {
            full_name: draft.full_name,
            company_id: draft.company_id,
            company_investment: draft.company_investment,
            company_goal: draft.company_goal,
            company_type: draft.company_type,
            id_number: draft.id_number,
            approved,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_application() -> Application {
        Application::from_draft(
            ApplicationDraft {
                full_name: "Pema Sherpa".to_string(),
                date_of_birth: "1990-04-12".to_string(),
                phone_number: "1234567890".to_string(),
                purpose_of_application: Purpose::Research,
                id_number: "BT-001".to_string(),
            },
            ApplicationStatus::Approved,
        )
    }

    #[test]
    fn test_application_serializes_camel_case() {
        let json = serde_json::to_value(sample_application()).unwrap();
        assert_eq!(json["fullName"], "Pema Sherpa");
        assert_eq!(json["dateOfBirth"], "1990-04-12");
        assert_eq!(json["purposeOfApplication"], "research");
        assert_eq!(json["status"], "approved");
    }

    #[test]
    fn test_application_reads_browser_record() {
        let raw = r#"{"fullName":"Karma","dateOfBirth":"1985-01-01","phoneNumber":"0987654321",
            "purposeOfApplication":"tourism","idNumber":"X9","status":"pending"}"#;
        let app: Application = serde_json::from_str(raw).unwrap();
        assert_eq!(app.purpose_of_application, Purpose::Tourism);
        assert_eq!(app.status, ApplicationStatus::Pending);
    }

    #[test]
    fn test_company_type_uses_display_names() {
        let json = serde_json::to_string(&CompanyType::PrivateLimited).unwrap();
        assert_eq!(json, "\"Private Limited\"");
        let parsed: CompanyType = serde_json::from_str("\"Sole Proprietor\"").unwrap();
        assert_eq!(parsed, CompanyType::SoleProprietor);
        assert!(serde_json::from_str::<CompanyType>("\"LLC\"").is_err());
    }

    #[test]
    fn test_labels_match_all_variants() {
        assert_eq!(Purpose::ALL.len(), 6);
        assert_eq!(Purpose::Research.label(), "Research & Development");
        for company_type in CompanyType::ALL {
            let json = serde_json::to_string(&company_type).unwrap();
            assert_eq!(json, format!("\"{}\"", company_type.label()));
        }
    }

    #[test]
    fn test_business_from_draft_keeps_fields() {
        let draft = BusinessDraft {
            full_name: "Pema Sherpa".to_string(),
            company_id: "DRUK42".to_string(),
            company_investment: "50000".to_string(),
            company_goal: "Export handicrafts".to_string(),
            company_type: CompanyType::Cooperative,
            id_number: "BT-001".to_string(),
        };
        let business = Business::from_draft(draft.clone(), true);
        assert_eq!(business.company_id, draft.company_id);
        assert_eq!(business.id_number, "BT-001");
        assert!(business.approved);
    }
}
