//-
// Copyright (c) 2026, the Corral authors
//
// This file is part of Corral.
//
// Corral is free software: you can  redistribute it and/or modify it under the
// terms of  the GNU General Public  License as published by  the Free Software
// Foundation, either version  3 of the License, or (at  your option) any later
// version.
//
// Corral is distributed  in the hope that  it will be useful,  but WITHOUT ANY
// WARRANTY; without  even the implied  warranty of MERCHANTABILITY  or FITNESS
// FOR  A PARTICULAR  PURPOSE.  See the  GNU General  Public  License for  more
// details.
//
// You should have received a copy of the GNU General Public License along with
// Corral. If not, see <http://www.gnu.org/licenses/>.

//! The canonical message record every converter produces.
//!
//! A `Record` is strictly format-agnostic: no field carries format-specific
//! transport syntax. In particular, message identifiers and references are
//! stored without their angle brackets; converters strip them at the
//! boundary. A record is built once by its converter and never mutated after
//! it has been handed to a sink.

use chrono::{DateTime, Utc};
use serde::Serialize;

pub const MEDIUM_USENET: &str = "usenet";
pub const MEDIUM_TWITTER: &str = "twitter";

pub const FORMAT_MBOX: &str = "mbox";
pub const FORMAT_NEWS: &str = "news";
pub const FORMAT_ANEWS: &str = "anews";
pub const FORMAT_HAMSTER: &str = "hamster";
pub const FORMAT_TWITTER: &str = "twitter";

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Record {
    /// Archive policy: `Some(false)` if the author opted out, `None` if
    /// unspecified. Converters never produce `Some(true)`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archived: Option<bool>,
    /// Author identifier: an email address or a numeric user id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_name: Option<String>,
    /// Two-letter country code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
    /// Origin format tag, one of the `FORMAT_*` constants.
    pub format: &'static str,
    /// Group/forum names, normalised, first-occurrence order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
    /// Medium tag, one of the `MEDIUM_*` constants.
    pub medium: &'static str,
    /// Format-specific canonical identifier, transport syntax stripped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_ip: Option<String>,
    /// Numeric form of `post_ip` when it resolves as a dotted quad.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_ip_num: Option<u32>,
    /// Referenced message identifiers, oldest first.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sent: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    /// Free-text tags extracted from the subject, lowercased, ordered.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Names the fields of a `Record` for renderers that walk records without
/// knowing the struct.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Field {
    Archived,
    AuthorId,
    AuthorName,
    CountryCode,
    Format,
    Groups,
    Lang,
    Medium,
    MessageId,
    Organization,
    PostHost,
    PostIp,
    PostIpNum,
    References,
    Sent,
    Subject,
    Tags,
    Text,
}

/// A typed view of one field's value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FieldValue<'a> {
    Bool(bool),
    Str(&'a str),
    List(&'a [String]),
    Num(u32),
    Time(DateTime<Utc>),
}

impl Field {
    pub const ALL: &'static [Field] = &[
        Field::Archived,
        Field::AuthorId,
        Field::AuthorName,
        Field::CountryCode,
        Field::Format,
        Field::Groups,
        Field::Lang,
        Field::Medium,
        Field::MessageId,
        Field::Organization,
        Field::PostHost,
        Field::PostIp,
        Field::PostIpNum,
        Field::References,
        Field::Sent,
        Field::Subject,
        Field::Tags,
        Field::Text,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Field::Archived => "archived",
            Field::AuthorId => "author_id",
            Field::AuthorName => "author_name",
            Field::CountryCode => "country_code",
            Field::Format => "format",
            Field::Groups => "groups",
            Field::Lang => "lang",
            Field::Medium => "medium",
            Field::MessageId => "message_id",
            Field::Organization => "organization",
            Field::PostHost => "post_host",
            Field::PostIp => "post_ip",
            Field::PostIpNum => "post_ip_num",
            Field::References => "references",
            Field::Sent => "sent",
            Field::Subject => "subject",
            Field::Tags => "tags",
            Field::Text => "text",
        }
    }
}

impl Record {
    /// Returns the given field's value, or `None` if the field is unset (or,
    /// for list fields, empty).
    pub fn field(&self, field: Field) -> Option<FieldValue<'_>> {
        fn some_str(s: &Option<String>) -> Option<FieldValue<'_>> {
            s.as_deref().map(FieldValue::Str)
        }
        fn some_list(l: &[String]) -> Option<FieldValue<'_>> {
            if l.is_empty() {
                None
            } else {
                Some(FieldValue::List(l))
            }
        }

        match field {
            Field::Archived => self.archived.map(FieldValue::Bool),
            Field::AuthorId => some_str(&self.author_id),
            Field::AuthorName => some_str(&self.author_name),
            Field::CountryCode => some_str(&self.country_code),
            Field::Format => Some(FieldValue::Str(self.format)),
            Field::Groups => some_list(&self.groups),
            Field::Lang => some_str(&self.lang),
            Field::Medium => Some(FieldValue::Str(self.medium)),
            Field::MessageId => some_str(&self.message_id),
            Field::Organization => some_str(&self.organization),
            Field::PostHost => some_str(&self.post_host),
            Field::PostIp => some_str(&self.post_ip),
            Field::PostIpNum => self.post_ip_num.map(FieldValue::Num),
            Field::References => some_list(&self.references),
            Field::Sent => self.sent.map(FieldValue::Time),
            Field::Subject => some_str(&self.subject),
            Field::Tags => some_list(&self.tags),
            Field::Text => some_str(&self.text),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn field_accessor_matches_struct() {
        let record = Record {
            format: FORMAT_NEWS,
            medium: MEDIUM_USENET,
            subject: Some("hello".to_owned()),
            groups: vec!["alt.test".to_owned()],
            post_ip_num: Some(0x7F000001),
            ..Record::default()
        };

        assert_eq!(
            Some(FieldValue::Str("hello")),
            record.field(Field::Subject)
        );
        assert_eq!(Some(FieldValue::Str("news")), record.field(Field::Format));
        assert_eq!(
            Some(FieldValue::Num(0x7F000001)),
            record.field(Field::PostIpNum)
        );
        assert_eq!(None, record.field(Field::Tags));
        assert_eq!(None, record.field(Field::Archived));

        // Every field is reachable through the accessor
        for &field in Field::ALL {
            record.field(field);
        }
    }
}
