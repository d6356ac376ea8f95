//! The validated intake payload: the four sections a client fills in.
//!
//! Field names on the wire follow the client's camelCase convention. These
//! types are only ever produced by [`crate::validate::validate`]; constructing
//! them by hand skips the rule checks.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString, VariantNames};

// ─── Case type ───────────────────────────────────────────────────────────────

/// The fixed set of case categories a client may select.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  AsRefStr,
  Display,
  EnumString,
  VariantNames,
)]
pub enum CaseType {
  #[serde(rename = "Family-Based")]
  #[strum(serialize = "Family-Based")]
  FamilyBased,
  #[serde(rename = "Removal Defense")]
  #[strum(serialize = "Removal Defense")]
  RemovalDefense,
  #[serde(rename = "Asylum")]
  #[strum(serialize = "Asylum")]
  Asylum,
  #[serde(rename = "Employment-Based")]
  #[strum(serialize = "Employment-Based")]
  EmploymentBased,
  #[serde(rename = "U Visa / VAWA")]
  #[strum(serialize = "U Visa / VAWA")]
  UVisaVawa,
  #[serde(rename = "Naturalization")]
  #[strum(serialize = "Naturalization")]
  Naturalization,
  #[serde(rename = "FOIA / Records")]
  #[strum(serialize = "FOIA / Records")]
  FoiaRecords,
  #[serde(rename = "Other")]
  #[strum(serialize = "Other")]
  Other,
}

// ─── Sections ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalInfo {
  pub first_name:         String,
  pub last_name:          String,
  pub email:              String,
  pub phone:              String,
  pub preferred_language: String,
  pub dob:                String,
  /// Alien registration number, if the client has one.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub a_number:           Option<String>,
  pub country_of_birth:   String,
  pub address_line1:      String,
  pub city:               String,
  pub state:              String,
  pub zip:                String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImmigrationInfo {
  pub case_type:        CaseType,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub entry_date:       Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub manner_of_entry:  Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub status_history:   Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub prior_filings:    Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub criminal_history: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentNotes {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Consent {
  /// Always `true` once validated.
  pub consent:     bool,
  pub signature:   String,
  pub date_signed: String,
}

/// A complete, validated intake payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntakePayload {
  pub personal:    PersonalInfo,
  pub immigration: ImmigrationInfo,
  /// Absent sections normalise to an empty object.
  #[serde(default)]
  pub documents:   DocumentNotes,
  pub consent:     Consent,
}

#[cfg(test)]
mod tests {
  use std::str::FromStr as _;

  use strum::VariantNames as _;

  use super::*;

  #[test]
  fn case_type_has_eight_categories() {
    assert_eq!(CaseType::VARIANTS.len(), 8);
  }

  #[test]
  fn case_type_wire_names_match_strum_names() {
    for name in CaseType::VARIANTS {
      let parsed = CaseType::from_str(name).unwrap();
      let json = serde_json::to_value(parsed).unwrap();
      assert_eq!(json, serde_json::Value::String((*name).to_string()));
      assert_eq!(parsed.as_ref(), *name);
    }
  }

  #[test]
  fn absent_documents_default_to_empty() {
    let value = serde_json::json!({
      "personal": {
        "firstName": "Ana", "lastName": "Ruiz", "email": "ana@example.com",
        "phone": "6105550100", "preferredLanguage": "Spanish", "dob": "1990-01-01",
        "countryOfBirth": "Mexico", "addressLine1": "1 Main St", "city": "Allentown",
        "state": "PA", "zip": "18101"
      },
      "immigration": { "caseType": "Asylum" },
      "consent": { "consent": true, "signature": "Ana Ruiz", "dateSigned": "2026-01-02" }
    });
    let payload: IntakePayload = serde_json::from_value(value).unwrap();
    assert_eq!(payload.documents, DocumentNotes::default());
    assert_eq!(payload.immigration.case_type, CaseType::Asylum);
  }
}
