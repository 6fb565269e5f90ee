//! Comma-delimited line codec.
//!
//! Three record shapes, one per file:
//!
//! ```text
//! requester:  id,name,urgency,arrivalEpochMillis,assignedFlag,dischargedFlag
//! discharged: id,name,urgency,arrivalEpochMillis,dischargeEpochMillis
//! resource:   id,location,type,occupiedFlag
//! ```
//!
//! Flags are written as `true` / `false`. Fields are not quoted, so text
//! containing a comma or line break is rejected on encode.

use crate::model::{Requester, RequesterState, Resource, ResourceKind};

use super::error::PersistenceError;

pub fn encode_requester(r: &Requester) -> Result<String, PersistenceError> {
    check_text("requester name", &r.name)?;
    Ok(format!(
        "{},{},{},{},{},{}",
        r.id,
        r.name,
        r.urgency,
        r.arrival,
        r.is_assigned(),
        r.is_discharged()
    ))
}

pub fn encode_discharged(r: &Requester) -> Result<String, PersistenceError> {
    check_text("requester name", &r.name)?;
    Ok(format!(
        "{},{},{},{},{}",
        r.id,
        r.name,
        r.urgency,
        r.arrival,
        r.discharged_at.unwrap_or(-1)
    ))
}

pub fn encode_resource(r: &Resource) -> Result<String, PersistenceError> {
    check_text("resource location", &r.location)?;
    check_text("resource type", r.kind.label())?;
    Ok(format!("{},{},{},{}", r.id, r.location, r.kind, r.occupied))
}

/// Decodes a requester line. A set discharged flag wins over the assigned
/// flag; the discharge time itself lives in the discharge file.
pub fn decode_requester(line: &str) -> Result<Requester, String> {
    let fields = split(line, 6)?;
    let mut r = Requester::new(
        parse_num(fields[0], "id")?,
        fields[1],
        parse_num(fields[2], "urgency")?,
    );
    r.arrival = parse_num(fields[3], "arrival")?;
    let assigned = parse_flag(fields[4], "assigned")?;
    let discharged = parse_flag(fields[5], "discharged")?;
    r.state = if discharged {
        RequesterState::Discharged
    } else if assigned {
        RequesterState::Assigned
    } else {
        RequesterState::Waiting
    };
    Ok(r)
}

pub fn decode_discharged(line: &str) -> Result<Requester, String> {
    let fields = split(line, 5)?;
    let mut r = Requester::new(
        parse_num(fields[0], "id")?,
        fields[1],
        parse_num(fields[2], "urgency")?,
    );
    r.arrival = parse_num(fields[3], "arrival")?;
    r.state = RequesterState::Discharged;
    let at: i64 = parse_num(fields[4], "discharge time")?;
    r.discharged_at = (at >= 0).then_some(at);
    Ok(r)
}

pub fn decode_resource(line: &str) -> Result<Resource, String> {
    let fields = split(line, 4)?;
    let mut r = Resource::with_kind(
        parse_num(fields[0], "id")?,
        fields[1],
        ResourceKind::from_label(fields[2]),
    );
    r.occupied = parse_flag(fields[3], "occupied")?;
    Ok(r)
}

fn check_text(field: &'static str, value: &str) -> Result<(), PersistenceError> {
    if value.contains([',', '\n', '\r']) {
        return Err(PersistenceError::UnencodableField {
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}

fn split(line: &str, expected: usize) -> Result<Vec<&str>, String> {
    let fields: Vec<&str> = line.split(',').collect();
    if fields.len() != expected {
        return Err(format!(
            "expected {expected} fields, found {}",
            fields.len()
        ));
    }
    Ok(fields)
}

fn parse_num<T: std::str::FromStr>(raw: &str, what: &str) -> Result<T, String> {
    raw.trim()
        .parse()
        .map_err(|_| format!("invalid {what}: {raw:?}"))
}

fn parse_flag(raw: &str, what: &str) -> Result<bool, String> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if raw.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(format!("invalid {what} flag: {raw:?}"))
    }
}
