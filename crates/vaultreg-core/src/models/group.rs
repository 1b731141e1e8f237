use std::fmt;

/// Group a member is assigned to. The numeric id is what the registry stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Group {
    Transformers = 1,
    Relentless = 2,
    Radiant = 3,
    Rooted = 4,
    Revolutionaries = 5,
}

impl Group {
    pub const ALL: [Group; 5] = [
        Group::Transformers,
        Group::Relentless,
        Group::Radiant,
        Group::Rooted,
        Group::Revolutionaries,
    ];

    /// Parse a group id as entered ("1" through "5"). Surrounding whitespace
    /// is ignored; anything else yields `None`.
    pub fn from_id(s: &str) -> Option<Self> {
        match s.trim() {
            "1" => Some(Group::Transformers),
            "2" => Some(Group::Relentless),
            "3" => Some(Group::Radiant),
            "4" => Some(Group::Rooted),
            "5" => Some(Group::Revolutionaries),
            _ => None,
        }
    }

    pub fn id(&self) -> u8 {
        *self as u8
    }

    /// Id in the string form the registry expects for `group` / `group_id`.
    pub fn id_string(&self) -> String {
        self.id().to_string()
    }

    pub fn name(&self) -> &'static str {
        match self {
            Group::Transformers => "Transformers",
            Group::Relentless => "Relentless",
            Group::Radiant => "Radiant",
            Group::Rooted => "Rooted",
            Group::Revolutionaries => "Revolutionaries",
        }
    }

    /// Get the next group (wrapping around)
    pub fn next(&self) -> Self {
        match self {
            Group::Transformers => Group::Relentless,
            Group::Relentless => Group::Radiant,
            Group::Radiant => Group::Rooted,
            Group::Rooted => Group::Revolutionaries,
            Group::Revolutionaries => Group::Transformers,
        }
    }

    /// Get the previous group (wrapping around)
    pub fn prev(&self) -> Self {
        match self {
            Group::Transformers => Group::Revolutionaries,
            Group::Relentless => Group::Transformers,
            Group::Radiant => Group::Relentless,
            Group::Rooted => Group::Radiant,
            Group::Revolutionaries => Group::Rooted,
        }
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
