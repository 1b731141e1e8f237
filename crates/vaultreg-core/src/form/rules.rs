//! Validation rule table for the registration form.
//!
//! Each required field maps to exactly one rule. Rules look only at the raw
//! text of their field, so a field can be re-validated on its own after every
//! edit.

use chrono::NaiveDate;

use super::ValidationErrors;
use crate::models::member::DATE_FORMAT;
use crate::models::{Field, Group, MemberDraft};

pub const REQUIRED_MESSAGE: &str = "Required";
pub const INVALID_DATE_MESSAGE: &str = "Enter a valid date (YYYY-MM-DD)";
pub const INVALID_GROUP_MESSAGE: &str = "Select a valid group";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Non-empty after trimming.
    RequiredText,
    /// Non-empty and a valid `YYYY-MM-DD` calendar date.
    RequiredDate,
    /// Non-empty and one of the known group ids.
    GroupChoice,
}

pub const RULES: [(Field, Rule); 7] = [
    (Field::FirstName, Rule::RequiredText),
    (Field::LastName, Rule::RequiredText),
    (Field::DateOfBirth, Rule::RequiredDate),
    (Field::Location, Rule::RequiredText),
    (Field::Phone, Rule::RequiredText),
    (Field::Occupation, Rule::RequiredText),
    (Field::Group, Rule::GroupChoice),
];

impl Rule {
    /// Check a raw value, returning the message to show if it fails.
    pub fn check(&self, raw: &str) -> Option<&'static str> {
        let value = raw.trim();
        if value.is_empty() {
            return Some(REQUIRED_MESSAGE);
        }
        match self {
            Rule::RequiredText => None,
            Rule::RequiredDate => match NaiveDate::parse_from_str(value, DATE_FORMAT) {
                Ok(_) => None,
                Err(_) => Some(INVALID_DATE_MESSAGE),
            },
            Rule::GroupChoice => match Group::from_id(value) {
                Some(_) => None,
                None => Some(INVALID_GROUP_MESSAGE),
            },
        }
    }
}

/// The rule attached to a field, if it has one.
pub fn rule_for(field: Field) -> Option<Rule> {
    RULES.iter().find(|(f, _)| *f == field).map(|(_, rule)| *rule)
}

/// Validate one field of a draft.
pub fn validate_field(draft: &MemberDraft, field: Field) -> Option<&'static str> {
    let rule = rule_for(field)?;
    rule.check(draft.text(field).unwrap_or_default())
}

/// Validate every ruled field. Empty when the draft can be submitted.
pub fn validate(draft: &MemberDraft) -> ValidationErrors {
    RULES
        .iter()
        .filter_map(|(field, _)| {
            validate_field(draft, *field).map(|message| (*field, message.to_string()))
        })
        .collect()
}
