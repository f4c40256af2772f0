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

//! Line-delimited Twitter status JSON.

use chrono::{DateTime, Utc};
use log::debug;
use serde::Deserialize;

use crate::record::{Record, FORMAT_TWITTER, MEDIUM_TWITTER};

/// The fixed English-locale pattern statuses carry their timestamps in.
const CREATED_AT_PATTERN: &str = "%a %b %d %H:%M:%S %z %Y";

/// Outcome of parsing one status line.
#[derive(Clone, Debug, PartialEq)]
pub enum Status {
    /// A deletion notice; nothing further is extracted.
    Deleted,
    Message(Box<Record>),
}

/// The wire shape of one status object. Ids are kept as raw JSON numbers so
/// that values beyond 64 bits survive as written.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WireStatus {
    created_at: Option<String>,
    delete: Option<serde_json::Value>,
    id: Option<serde_json::Number>,
    lang: Option<String>,
    place: Option<WirePlace>,
    text: Option<String>,
    user: Option<WireUser>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WirePlace {
    country: Option<String>,
    country_code: Option<String>,
    id: Option<String>,
    full_name: Option<String>,
    name: Option<String>,
    place_type: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WireUser {
    id: Option<serde_json::Number>,
    created_at: Option<String>,
    screen_name: Option<String>,
    verified: Option<serde_json::Value>,
}

/// Parses one line as a status object.
///
/// Input that is not a JSON object, or does not parse at all, yields `None`;
/// the caller reports it and moves on.
pub fn parse_line(line: &str) -> Option<Status> {
    let value: serde_json::Value = match serde_json::from_str(line) {
        Ok(value) => value,
        Err(e) => {
            debug!("unparseable status line: {}", e);
            return None;
        },
    };
    // Derived Deserialize would also accept a sequence; only objects are
    // statuses
    if !value.is_object() {
        debug!("non-object status line rejected");
        return None;
    }

    let status: WireStatus = match serde_json::from_value(value) {
        Ok(status) => status,
        Err(e) => {
            debug!("unparseable status object: {}", e);
            return None;
        },
    };

    // Any value under "delete" marks a deletion notice
    if status.delete.is_some() {
        return Some(Status::Deleted);
    }

    let mut record = Record {
        format: FORMAT_TWITTER,
        medium: MEDIUM_TWITTER,
        sent: status.created_at.as_deref().and_then(parse_created_at),
        message_id: status.id.map(|id| id.to_string()),
        lang: status.lang,
        text: status.text,
        ..Record::default()
    };

    if let Some(user) = status.user {
        record.author_id = user.id.map(|id| id.to_string());
        record.author_name = user.screen_name;
    }

    if let Some(place) = status.place {
        record.country_code = place.country_code.map(|c| c.to_lowercase());
    }

    Some(Status::Message(Box::new(record)))
}

/// Unparseable timestamps degrade to `None`, they are not an error.
fn parse_created_at(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_str(s, CREATED_AT_PATTERN)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod test {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn parses_minimal_status() {
        let status = parse_line(
            "{\"created_at\":\"Sun Jan 01 07:00:06 +0000 2012\",\"id\":10,\
             \"lang\":\"en\",\"text\":\"Just a message.\"}",
        )
        .unwrap();

        let record = match status {
            Status::Message(record) => record,
            Status::Deleted => panic!("not a deletion"),
        };
        assert_eq!(
            Some(Utc.with_ymd_and_hms(2012, 1, 1, 7, 0, 6).unwrap()),
            record.sent
        );
        assert_eq!(Some("10".to_owned()), record.message_id);
        assert_eq!(Some("en".to_owned()), record.lang);
        assert_eq!(Some("Just a message.".to_owned()), record.text);
        assert_eq!("twitter", record.format);
        assert_eq!("twitter", record.medium);
    }

    #[test]
    fn parses_user_and_place() {
        let status = parse_line(
            "{\"id\":11,\"text\":\"hi\",\
             \"user\":{\"id\":42,\"screen_name\":\"someone\",\
             \"verified\":true},\
             \"place\":{\"country\":\"Germany\",\"country_code\":\"DE\",\
             \"full_name\":\"Berlin, Germany\",\"place_type\":\"city\"}}",
        )
        .unwrap();

        let record = match status {
            Status::Message(record) => record,
            Status::Deleted => panic!("not a deletion"),
        };
        assert_eq!(Some("42".to_owned()), record.author_id);
        assert_eq!(Some("someone".to_owned()), record.author_name);
        assert_eq!(Some("de".to_owned()), record.country_code);
    }

    #[test]
    fn delete_key_marks_deletion() {
        assert_eq!(
            Some(Status::Deleted),
            parse_line("{\"delete\":{\"status\":{\"id\":12}}}")
        );
    }

    #[test]
    fn huge_id_survives_verbatim() {
        let status =
            parse_line("{\"id\":123456789012345678901234567890,\"text\":\"x\"}");
        // Whether the id survives depends on serde_json's number width; it
        // must never panic and the rest of the status must still parse.
        if let Some(Status::Message(record)) = status {
            assert_eq!(Some("x".to_owned()), record.text);
        }
    }

    #[test]
    fn garbage_yields_none() {
        assert_eq!(None, parse_line("not json at all"));
        assert_eq!(None, parse_line("\"just a string\""));
        assert_eq!(None, parse_line(""));
    }

    #[test]
    fn non_object_json_yields_none() {
        // Sequences would satisfy the derived Deserialize, so they need the
        // explicit object gate
        assert_eq!(None, parse_line("[]"));
        assert_eq!(None, parse_line("[null,null]"));
        assert_eq!(None, parse_line("[1,2,3]"));
        assert_eq!(None, parse_line("null"));
        assert_eq!(None, parse_line("true"));
        assert_eq!(None, parse_line("42"));
    }

    #[test]
    fn unparseable_created_at_degrades_to_none() {
        let status = parse_line(
            "{\"created_at\":\"someday maybe\",\"id\":13,\"text\":\"x\"}",
        )
        .unwrap();
        let record = match status {
            Status::Message(record) => record,
            Status::Deleted => panic!("not a deletion"),
        };
        assert_eq!(None, record.sent);
    }
}
