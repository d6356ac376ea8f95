//! Schema validation for intake drafts.
//!
//! There is exactly one rule table per section. Step-scoped checks (one wizard
//! page at a time) and the full pre-persistence check both iterate the same
//! tables, so the two passes can never disagree.
//!
//! Validation is whole-object: every violated rule is reported, each with a
//! dotted path back to the offending field.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{Display, EnumString, VariantNames as _};

use crate::payload::{CaseType, IntakePayload};

// ─── Violations ──────────────────────────────────────────────────────────────

/// One failed rule, addressed by a dotted field path (`personal.email`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
  pub path:    String,
  pub message: String,
}

impl Violation {
  fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
    Self { path: path.into(), message: message.into() }
  }
}

impl fmt::Display for Violation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if self.path.is_empty() {
      f.write_str(&self.message)
    } else {
      write!(f, "{}: {}", self.path, self.message)
    }
  }
}

/// The complete set of violations found in one pass. Never empty when
/// returned as an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Violations(Vec<Violation>);

impl Violations {
  pub fn as_slice(&self) -> &[Violation] { &self.0 }

  pub fn into_vec(self) -> Vec<Violation> { self.0 }

  /// Whether any violation is reported at exactly `path`.
  pub fn contains_path(&self, path: &str) -> bool {
    self.0.iter().any(|v| v.path == path)
  }
}

impl fmt::Display for Violations {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (i, v) in self.0.iter().enumerate() {
      if i > 0 {
        f.write_str("; ")?;
      }
      write!(f, "{v}")?;
    }
    Ok(())
  }
}

impl std::error::Error for Violations {}

// ─── Rules ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
enum Rule {
  /// Required string with at least this many UTF-16 code units, the unit
  /// browsers report for `string.length`.
  MinLen(usize),
  /// Required string shaped like an email address.
  Email,
  /// String if present; absence is fine.
  Optional,
  /// Required string drawn from a closed set.
  OneOf(&'static [&'static str]),
  /// Required boolean that must be `true`.
  MustBeTrue(&'static str),
}

/// A single field and the rule it must satisfy.
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
  pub field: &'static str,
  rule:      Rule,
}

const fn field(field: &'static str, rule: Rule) -> FieldRule {
  FieldRule { field, rule }
}

const PERSONAL: &[FieldRule] = &[
  field("firstName", Rule::MinLen(1)),
  field("lastName", Rule::MinLen(1)),
  field("email", Rule::Email),
  field("phone", Rule::MinLen(7)),
  field("preferredLanguage", Rule::MinLen(1)),
  field("dob", Rule::MinLen(1)),
  field("aNumber", Rule::Optional),
  field("countryOfBirth", Rule::MinLen(1)),
  field("addressLine1", Rule::MinLen(1)),
  field("city", Rule::MinLen(1)),
  field("state", Rule::MinLen(1)),
  field("zip", Rule::MinLen(3)),
];

const IMMIGRATION: &[FieldRule] = &[
  field("caseType", Rule::OneOf(CaseType::VARIANTS)),
  field("entryDate", Rule::Optional),
  field("mannerOfEntry", Rule::Optional),
  field("statusHistory", Rule::Optional),
  field("priorFilings", Rule::Optional),
  field("criminalHistory", Rule::Optional),
];

const DOCUMENTS: &[FieldRule] = &[field("notes", Rule::Optional)];

const CONSENT: &[FieldRule] = &[
  field("consent", Rule::MustBeTrue("Consent required")),
  field("signature", Rule::MinLen(2)),
  field("dateSigned", Rule::MinLen(1)),
];

// ─── Steps ───────────────────────────────────────────────────────────────────

/// One section of the intake, validated on its own while the client is still
/// filling in the draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Step {
  Personal,
  Immigration,
  Documents,
  Consent,
}

impl Step {
  pub const ALL: [Step; 4] =
    [Step::Personal, Step::Immigration, Step::Documents, Step::Consent];

  /// The key of this step's section in the payload object.
  pub fn section(self) -> &'static str {
    match self {
      Step::Personal => "personal",
      Step::Immigration => "immigration",
      Step::Documents => "documents",
      Step::Consent => "consent",
    }
  }

  pub fn rules(self) -> &'static [FieldRule] {
    match self {
      Step::Personal => PERSONAL,
      Step::Immigration => IMMIGRATION,
      Step::Documents => DOCUMENTS,
      Step::Consent => CONSENT,
    }
  }

  fn required(self) -> bool { !matches!(self, Step::Documents) }
}

// ─── Entry points ────────────────────────────────────────────────────────────

/// Validate one step of a draft. `draft` is the whole draft object; only the
/// step's own section is inspected.
pub fn validate_step(step: Step, draft: &Value) -> Vec<Violation> {
  match draft.as_object() {
    Some(root) => check_section(step, root.get(step.section())),
    None => vec![Violation::new("", expected("object", draft))],
  }
}

/// Validate a complete payload and normalise it into an [`IntakePayload`].
pub fn validate(value: &Value) -> Result<IntakePayload, Violations> {
  let root = value
    .as_object()
    .ok_or_else(|| Violations(vec![Violation::new("", expected("object", value))]))?;

  let violations: Vec<Violation> = Step::ALL
    .into_iter()
    .flat_map(|step| check_section(step, root.get(step.section())))
    .collect();

  if !violations.is_empty() {
    return Err(Violations(violations));
  }

  // Every field has been checked above, so this only fails if the rule tables
  // and the payload types drift apart.
  serde_json::from_value(Value::Object(root.clone()))
    .map_err(|e| Violations(vec![Violation::new("", e.to_string())]))
}

// ─── Internals ───────────────────────────────────────────────────────────────

fn check_section(step: Step, section: Option<&Value>) -> Vec<Violation> {
  let path = step.section();
  let obj: &Map<String, Value> = match section {
    None if step.required() => return vec![Violation::new(path, "Required")],
    None => return vec![],
    Some(Value::Object(obj)) => obj,
    Some(other) => return vec![Violation::new(path, expected("object", other))],
  };

  step
    .rules()
    .iter()
    .filter_map(|r| {
      check_field(r.rule, obj.get(r.field))
        .map(|msg| Violation::new(format!("{path}.{}", r.field), msg))
    })
    .collect()
}

fn check_field(rule: Rule, value: Option<&Value>) -> Option<String> {
  match (rule, value) {
    (Rule::Optional, None) => None,
    (_, None) => Some("Required".to_string()),

    (Rule::MustBeTrue(_), Some(Value::Bool(true))) => None,
    (Rule::MustBeTrue(msg), Some(Value::Bool(false))) => Some(msg.to_string()),
    (Rule::MustBeTrue(_), Some(other)) => Some(expected("boolean", other)),

    (_, Some(Value::String(s))) => check_string(rule, s),
    (_, Some(other)) => Some(expected("string", other)),
  }
}

fn check_string(rule: Rule, s: &str) -> Option<String> {
  match rule {
    Rule::MinLen(n) if s.encode_utf16().count() < n => {
      Some(format!("String must contain at least {n} character(s)"))
    }
    Rule::Email if !is_email_shaped(s) => Some("Invalid email".to_string()),
    Rule::OneOf(allowed) if !allowed.contains(&s) => {
      let options = allowed
        .iter()
        .map(|a| format!("'{a}'"))
        .collect::<Vec<_>>()
        .join(" | ");
      Some(format!("Invalid enum value. Expected {options}, received '{s}'"))
    }
    _ => None,
  }
}

/// Address shape accepted by the intake form's email field.
///
/// Local part: `[A-Za-z0-9_'+.-]`, no leading dot, no `..`, and ending in
/// `[A-Za-z0-9_+-]`. Domain: dot-separated labels that start alphanumeric and
/// continue with alphanumerics or `-`, then a top-level domain of two or more
/// letters.
fn is_email_shaped(s: &str) -> bool {
  let Some((local, domain)) = s.split_once('@') else {
    return false;
  };
  is_email_local(local) && is_email_domain(domain)
}

fn is_email_local(local: &str) -> bool {
  let Some(last) = local.chars().last() else {
    return false;
  };
  !local.starts_with('.')
    && !local.contains("..")
    && local
      .chars()
      .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '\'' | '+' | '-' | '.'))
    && (last.is_ascii_alphanumeric() || matches!(last, '_' | '+' | '-'))
}

fn is_email_domain(domain: &str) -> bool {
  let Some((labels, tld)) = domain.rsplit_once('.') else {
    return false;
  };
  tld.len() >= 2
    && tld.chars().all(|c| c.is_ascii_alphabetic())
    && labels.split('.').all(|label| {
      label.chars().next().is_some_and(|c| c.is_ascii_alphanumeric())
        && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    })
}

fn expected(want: &str, got: &Value) -> String {
  let got = match got {
    Value::Null => "null",
    Value::Bool(_) => "boolean",
    Value::Number(_) => "number",
    Value::String(_) => "string",
    Value::Array(_) => "array",
    Value::Object(_) => "object",
  };
  format!("Expected {want}, received {got}")
}
