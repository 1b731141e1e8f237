//! Data models for member registration.
//!
//! - `MemberDraft`: the in-progress, unsaved form data for one registration
//! - `Field`, `FieldKind`, `FieldValue`: the field catalogue used to address
//!   and update a draft
//! - `Group`: the fixed list of groups a member can join
//! - `MemberPayload`: the JSON body sent to the registration endpoint

pub mod field;
pub mod group;
pub mod member;

pub use field::{Field, FieldKind, FieldValue};
pub use group::Group;
pub use member::{MemberDraft, MemberPayload};
