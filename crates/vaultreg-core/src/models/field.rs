use std::fmt;
use std::str::FromStr;

use crate::form::FormError;

/// Every input on the registration form, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    FirstName,
    LastName,
    DateOfBirth,
    Location,
    Phone,
    IsStudent,
    School,
    IsVisitor,
    WillReturn,
    Occupation,
    Group,
    IsLeader,
}

/// How a field is edited and which `FieldValue` variant it accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Date,
    Flag,
    Choice,
}

/// A value written into a draft field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Flag(bool),
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Flag(b)
    }
}

impl Field {
    pub const ALL: [Field; 12] = [
        Field::FirstName,
        Field::LastName,
        Field::DateOfBirth,
        Field::Location,
        Field::Phone,
        Field::IsStudent,
        Field::School,
        Field::IsVisitor,
        Field::WillReturn,
        Field::Occupation,
        Field::Group,
        Field::IsLeader,
    ];

    /// Fields that must be filled before a draft can be submitted.
    pub const REQUIRED: [Field; 7] = [
        Field::FirstName,
        Field::LastName,
        Field::DateOfBirth,
        Field::Location,
        Field::Phone,
        Field::Occupation,
        Field::Group,
    ];

    pub fn kind(&self) -> FieldKind {
        match self {
            Field::DateOfBirth => FieldKind::Date,
            Field::Group => FieldKind::Choice,
            Field::IsStudent | Field::IsVisitor | Field::WillReturn | Field::IsLeader => {
                FieldKind::Flag
            }
            _ => FieldKind::Text,
        }
    }

    pub fn is_required(&self) -> bool {
        Self::REQUIRED.contains(self)
    }

    /// Stable camelCase key used when fields are addressed by name.
    pub fn key(&self) -> &'static str {
        match self {
            Field::FirstName => "firstName",
            Field::LastName => "lastName",
            Field::DateOfBirth => "dateOfBirth",
            Field::Location => "location",
            Field::Phone => "phone",
            Field::IsStudent => "isStudent",
            Field::School => "school",
            Field::IsVisitor => "isVisitor",
            Field::WillReturn => "willReturn",
            Field::Occupation => "occupation",
            Field::Group => "groupId",
            Field::IsLeader => "isLeader",
        }
    }

    /// Label shown next to the input.
    pub fn label(&self) -> &'static str {
        match self {
            Field::FirstName => "First Name",
            Field::LastName => "Last Name",
            Field::DateOfBirth => "Date of Birth",
            Field::Location => "Location",
            Field::Phone => "Phone",
            Field::IsStudent => "Is Student?",
            Field::School => "School Name",
            Field::IsVisitor => "Is Visitor?",
            Field::WillReturn => "Will be coming again?",
            Field::Occupation => "Occupation",
            Field::Group => "AG Group",
            Field::IsLeader => "Is Leader?",
        }
    }

    /// The flag that controls whether this field is shown, if any.
    pub fn depends_on(&self) -> Option<Field> {
        match self {
            Field::School => Some(Field::IsStudent),
            Field::WillReturn => Some(Field::IsVisitor),
            _ => None,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl FromStr for Field {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::ALL
            .iter()
            .copied()
            .find(|f| f.key() == s)
            .ok_or_else(|| FormError::UnknownField(s.to_string()))
    }
}
