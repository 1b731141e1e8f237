use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Field, FieldValue, Group};
use crate::form::{rules, FormError, ValidationErrors};

/// Date format accepted for the date of birth.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// In-progress registration data, exactly as the user entered it.
///
/// Text inputs are kept raw (including the date of birth and the group id)
/// so that invalid input can be reported by validation rather than lost.
/// Conditional fields keep their value when their controlling flag is turned
/// off; `MemberPayload` decides what is actually transmitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberDraft {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: String,
    pub location: String,
    pub phone: String,
    pub is_student: bool,
    pub school: String,
    pub is_visitor: bool,
    pub will_return: bool,
    pub occupation: String,
    pub group: String,
    pub is_leader: bool,
}

impl MemberDraft {
    /// Write a value into a field. The value must match the field's kind.
    pub fn apply(&mut self, field: Field, value: FieldValue) -> Result<(), FormError> {
        let mismatch = FormError::KindMismatch { field, expected: field.kind() };
        match value {
            FieldValue::Flag(b) => {
                let slot = match field {
                    Field::IsStudent => &mut self.is_student,
                    Field::IsVisitor => &mut self.is_visitor,
                    Field::WillReturn => &mut self.will_return,
                    Field::IsLeader => &mut self.is_leader,
                    _ => return Err(mismatch),
                };
                *slot = b;
            }
            FieldValue::Text(s) => {
                let slot = match field {
                    Field::FirstName => &mut self.first_name,
                    Field::LastName => &mut self.last_name,
                    Field::DateOfBirth => &mut self.date_of_birth,
                    Field::Location => &mut self.location,
                    Field::Phone => &mut self.phone,
                    Field::School => &mut self.school,
                    Field::Occupation => &mut self.occupation,
                    Field::Group => &mut self.group,
                    _ => return Err(mismatch),
                };
                *slot = s;
            }
        }
        Ok(())
    }

    /// Raw text of a text, date or choice field. `None` for flags.
    pub fn text(&self, field: Field) -> Option<&str> {
        match field {
            Field::FirstName => Some(&self.first_name),
            Field::LastName => Some(&self.last_name),
            Field::DateOfBirth => Some(&self.date_of_birth),
            Field::Location => Some(&self.location),
            Field::Phone => Some(&self.phone),
            Field::School => Some(&self.school),
            Field::Occupation => Some(&self.occupation),
            Field::Group => Some(&self.group),
            Field::IsStudent | Field::IsVisitor | Field::WillReturn | Field::IsLeader => None,
        }
    }

    /// Value of a flag field. `None` for anything else.
    pub fn flag(&self, field: Field) -> Option<bool> {
        match field {
            Field::IsStudent => Some(self.is_student),
            Field::IsVisitor => Some(self.is_visitor),
            Field::WillReturn => Some(self.will_return),
            Field::IsLeader => Some(self.is_leader),
            _ => None,
        }
    }

    /// Whether a field is currently part of the form. Conditional fields are
    /// hidden while their controlling flag is off.
    pub fn is_visible(&self, field: Field) -> bool {
        match field.depends_on() {
            Some(flag) => self.flag(flag).unwrap_or(false),
            None => true,
        }
    }

    /// Parsed date of birth, if the entered text is a valid calendar date.
    pub fn parsed_date_of_birth(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.date_of_birth.trim(), DATE_FORMAT).ok()
    }

    pub fn selected_group(&self) -> Option<Group> {
        Group::from_id(&self.group)
    }
}

/// Registration body in the registry's wire format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberPayload {
    pub first_name: String,
    pub last_name: String,
    pub dob: NaiveDate,
    pub location: String,
    pub phone: String,
    pub leader: bool,
    pub is_student: bool,
    pub school: String,
    pub is_visitor: bool,
    pub will_be_coming: bool,
    pub occupation: String,
    /// Group id; sent twice, as `group` and `group_id`.
    pub group: String,
    pub group_id: String,
}

impl TryFrom<&MemberDraft> for MemberPayload {
    type Error = ValidationErrors;

    fn try_from(draft: &MemberDraft) -> Result<Self, Self::Error> {
        let errors = rules::validate(draft);
        if !errors.is_empty() {
            return Err(errors);
        }

        let (Some(dob), Some(group)) = (draft.parsed_date_of_birth(), draft.selected_group())
        else {
            // The rule table already rejects both cases
            return Err(rules::validate(draft));
        };

        Ok(Self {
            first_name: draft.first_name.trim().to_string(),
            last_name: draft.last_name.trim().to_string(),
            dob,
            location: draft.location.trim().to_string(),
            phone: draft.phone.trim().to_string(),
            leader: draft.is_leader,
            is_student: draft.is_student,
            school: if draft.is_student {
                draft.school.trim().to_string()
            } else {
                String::new()
            },
            is_visitor: draft.is_visitor,
            will_be_coming: draft.is_visitor && draft.will_return,
            occupation: draft.occupation.trim().to_string(),
            group: group.id_string(),
            group_id: group.id_string(),
        })
    }
}
