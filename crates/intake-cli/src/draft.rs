//! Draft files: the JSON document a client fills in before submitting.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use intake_core::{
  payload::CaseType,
  validate::{Step, Violation, validate_step},
};
use serde_json::{Value, json};

/// An empty draft with the defaults a new intake starts from.
pub fn template(today: NaiveDate) -> Value {
  json!({
    "personal": {
      "firstName": "",
      "lastName": "",
      "email": "",
      "phone": "",
      "preferredLanguage": "English",
      "dob": "",
      "aNumber": "",
      "countryOfBirth": "",
      "addressLine1": "",
      "city": "",
      "state": "",
      "zip": ""
    },
    "immigration": {
      "caseType": CaseType::FamilyBased.to_string(),
      "entryDate": "",
      "mannerOfEntry": "",
      "statusHistory": "",
      "priorFilings": "",
      "criminalHistory": ""
    },
    "documents": { "notes": "" },
    "consent": {
      "consent": false,
      "signature": "",
      "dateSigned": today.format("%Y-%m-%d").to_string()
    }
  })
}

pub fn load(path: &Path) -> Result<Value> {
  let raw = std::fs::read_to_string(path)
    .with_context(|| format!("reading draft {}", path.display()))?;
  serde_json::from_str(&raw).with_context(|| format!("parsing draft {}", path.display()))
}

/// Run one step view, or every step in wizard order when `step` is `None`.
pub fn check(draft: &Value, step: Option<Step>) -> Vec<Violation> {
  match step {
    Some(step) => validate_step(step, draft),
    None => Step::ALL.into_iter().flat_map(|s| validate_step(s, draft)).collect(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn today() -> NaiveDate { NaiveDate::from_ymd_opt(2026, 10, 18).unwrap() }

  fn filled() -> Value {
    let mut draft = template(today());
    let personal = &mut draft["personal"];
    personal["firstName"] = json!("Ana");
    personal["lastName"] = json!("Ruiz");
    personal["email"] = json!("ana@example.com");
    personal["phone"] = json!("6105550100");
    personal["dob"] = json!("1990-04-12");
    personal["countryOfBirth"] = json!("Honduras");
    personal["addressLine1"] = json!("12 Hamilton St");
    personal["city"] = json!("Allentown");
    personal["state"] = json!("PA");
    personal["zip"] = json!("18101");
    draft["consent"]["consent"] = json!(true);
    draft["consent"]["signature"] = json!("Ana Ruiz");
    draft
  }

  #[test]
  fn template_defaults() {
    let draft = template(today());
    assert_eq!(draft["personal"]["preferredLanguage"], "English");
    assert_eq!(draft["immigration"]["caseType"], "Family-Based");
    assert_eq!(draft["consent"]["consent"], false);
    assert_eq!(draft["consent"]["dateSigned"], "2026-10-18");
  }

  #[test]
  fn empty_template_passes_only_the_optional_steps() {
    let draft = template(today());
    assert!(check(&draft, Some(Step::Immigration)).is_empty());
    assert!(check(&draft, Some(Step::Documents)).is_empty());

    let personal = check(&draft, Some(Step::Personal));
    assert!(personal.iter().any(|v| v.path == "personal.firstName"));
    assert!(personal.iter().all(|v| v.path.starts_with("personal.")));

    let consent = check(&draft, Some(Step::Consent));
    assert!(consent.iter().any(|v| v.path == "consent.consent" && v.message == "Consent required"));
  }

  #[test]
  fn filled_template_passes_every_step() {
    assert_eq!(check(&filled(), None), vec![]);
    assert!(intake_core::validate::validate(&filled()).is_ok());
  }

  #[test]
  fn load_reads_json_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("draft.json");
    std::fs::write(&path, template(today()).to_string()).unwrap();
    assert_eq!(load(&path).unwrap(), template(today()));

    std::fs::write(&path, "{").unwrap();
    assert!(load(&path).is_err());
  }
}
