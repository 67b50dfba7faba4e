use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Shown for every attribute the backend did not send.
pub const PLACEHOLDER: &str = "N/A";

/// `archived_by_label` when no actor is attached to the record.
pub const SYSTEM_ACTOR: &str = "System";

/// A field that decodes to `None` instead of failing the whole record.
#[derive(Debug, Clone)]
pub struct Lenient<T>(pub Option<T>);

impl<T> Default for Lenient<T> {
    fn default() -> Self {
        Self(None)
    }
}

impl<T> Lenient<T> {
    pub fn get(&self) -> Option<&T> {
        self.0.as_ref()
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Lenient<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(Self(serde_json::from_value(value).ok()))
    }
}

/// Decodes a raw backend document into a typed shape, falling back to all-empty.
pub fn decode<T: DeserializeOwned + Default>(raw: &Value) -> T {
    T::deserialize(raw).unwrap_or_default()
}

/// Loosely typed leaf value: backends send numbers as strings and vice versa.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Scalar {
    pub fn to_text(&self) -> Option<String> {
        match self {
            Scalar::Bool(flag) => Some(if *flag { "Yes" } else { "No" }.to_string()),
            Scalar::Int(number) => Some(number.to_string()),
            Scalar::Float(number) => Some(trim_float(*number)),
            Scalar::Text(text) => non_blank(text),
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Int(number) => Some(*number as f64),
            Scalar::Float(number) => Some(*number),
            Scalar::Text(text) => text.trim().replace(',', "").parse().ok(),
            Scalar::Bool(_) => None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PartyProfile {
    pub full_name: Lenient<String>,
    pub name: Lenient<String>,
    pub first_name: Lenient<String>,
    pub last_name: Lenient<String>,
    pub company_name: Lenient<String>,
    pub title: Lenient<String>,
    pub code: Lenient<Scalar>,
    pub unit_number: Lenient<Scalar>,
    pub email: Lenient<String>,
    pub phone: Lenient<Scalar>,
}

impl PartyProfile {
    pub fn name(&self) -> Option<String> {
        first_text([
            text(&self.full_name),
            text(&self.name),
            join_name(&self.first_name, &self.last_name),
            text(&self.company_name),
            text(&self.title),
            scalar(&self.code),
            scalar(&self.unit_number),
        ])
    }

    pub fn email(&self) -> Option<String> {
        text(&self.email)
    }

    pub fn phone(&self) -> Option<String> {
        scalar(&self.phone)
    }
}

/// Reference to a related party: either populated or just a backend id.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PartyRef {
    Reference(String),
    Profile(PartyProfile),
}

impl PartyRef {
    /// Human name, only when the reference was populated.
    pub fn name(&self) -> Option<String> {
        match self {
            PartyRef::Reference(_) => None,
            PartyRef::Profile(profile) => profile.name(),
        }
    }

    /// Name when populated, otherwise the raw reference text.
    pub fn label(&self) -> Option<String> {
        match self {
            PartyRef::Reference(reference) => non_blank(reference),
            PartyRef::Profile(profile) => profile.name(),
        }
    }

    pub fn profile(&self) -> Option<&PartyProfile> {
        match self {
            PartyRef::Reference(_) => None,
            PartyRef::Profile(profile) => Some(profile),
        }
    }
}

/// Soft-delete bookkeeping every source attaches to its documents.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ArchiveMeta {
    #[serde(rename = "_id")]
    pub object_id: Lenient<Scalar>,
    pub id: Lenient<Scalar>,
    pub deleted_at: Lenient<Scalar>,
    pub archived_at: Lenient<Scalar>,
    pub updated_at: Lenient<Scalar>,
    pub deleted_by: Lenient<PartyRef>,
    pub archived_by: Lenient<PartyRef>,
    pub delete_reason: Lenient<String>,
    pub archive_reason: Lenient<String>,
    pub reason: Lenient<String>,
}

impl ArchiveMeta {
    pub fn native_id(&self) -> String {
        first_text([scalar(&self.object_id), scalar(&self.id)]).unwrap_or_default()
    }

    pub fn archived_at(&self) -> Option<DateTime<Utc>> {
        [&self.deleted_at, &self.archived_at, &self.updated_at]
            .into_iter()
            .find_map(|candidate| candidate.get().and_then(parse_timestamp))
    }

    pub fn archived_by_label(&self) -> String {
        first_text([
            self.deleted_by.get().and_then(PartyRef::name),
            self.archived_by.get().and_then(PartyRef::name),
        ])
        .unwrap_or_else(|| SYSTEM_ACTOR.to_string())
    }

    pub fn reason_text(&self) -> String {
        first_text([
            text(&self.delete_reason),
            text(&self.archive_reason),
            text(&self.reason),
        ])
        .unwrap_or_else(|| PLACEHOLDER.to_string())
    }
}

pub fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

pub fn text(field: &Lenient<String>) -> Option<String> {
    field.get().and_then(|value| non_blank(value))
}

pub fn scalar(field: &Lenient<Scalar>) -> Option<String> {
    field.get().and_then(Scalar::to_text)
}

pub fn party(field: &Lenient<PartyRef>) -> Option<String> {
    field.get().and_then(PartyRef::label)
}

/// First related party that carries a name or reference; blank ones are skipped.
pub fn first_party<'a, I>(candidates: I) -> Option<&'a Lenient<PartyRef>>
where
    I: IntoIterator<Item = &'a Lenient<PartyRef>>,
{
    candidates
        .into_iter()
        .find(|candidate| party(candidate).is_some())
}

pub fn party_name(field: &Lenient<PartyRef>) -> Option<String> {
    field.get().and_then(PartyRef::name)
}

pub fn party_profile(field: &Lenient<PartyRef>) -> Option<&PartyProfile> {
    field.get().and_then(PartyRef::profile)
}

pub fn join_name(first: &Lenient<String>, last: &Lenient<String>) -> Option<String> {
    match (text(first), text(last)) {
        (Some(first), Some(last)) => Some(format!("{} {}", first, last)),
        (Some(only), None) | (None, Some(only)) => Some(only),
        (None, None) => None,
    }
}

pub fn first_text<I>(candidates: I) -> Option<String>
where
    I: IntoIterator<Item = Option<String>>,
{
    candidates.into_iter().flatten().next()
}

/// Money with thousands separators; free text passes through.
pub fn money(field: &Lenient<Scalar>) -> Option<String> {
    let value = field.get()?;
    match value {
        Scalar::Text(raw) if value.as_f64().is_none() => non_blank(raw),
        _ => value.as_f64().map(group_thousands),
    }
}

/// Calendar date (`YYYY-MM-DD`) when parseable, raw text otherwise.
pub fn date(field: &Lenient<Scalar>) -> Option<String> {
    let value = field.get()?;
    parse_timestamp(value)
        .map(|at| at.format("%Y-%m-%d").to_string())
        .or_else(|| value.to_text())
}

/// Date and time in UTC when parseable, raw text otherwise.
pub fn date_time(field: &Lenient<Scalar>) -> Option<String> {
    let value = field.get()?;
    parse_timestamp(value)
        .map(|at| at.format("%Y-%m-%d %H:%M UTC").to_string())
        .or_else(|| value.to_text())
}

/// RFC 3339, naive ISO or SQL-style datetimes (taken as UTC), plain dates or
/// epoch milliseconds.
pub fn parse_timestamp(value: &Scalar) -> Option<DateTime<Utc>> {
    match value {
        Scalar::Int(millis) => Utc.timestamp_millis_opt(*millis).single(),
        Scalar::Float(millis) => Utc.timestamp_millis_opt(*millis as i64).single(),
        Scalar::Bool(_) => None,
        Scalar::Text(raw) => {
            let raw = raw.trim();
            if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
                return Some(parsed.with_timezone(&Utc));
            }
            for layout in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
                if let Ok(naive) = NaiveDateTime::parse_from_str(raw, layout) {
                    return Some(naive.and_utc());
                }
            }
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|day| day.and_hms_opt(0, 0, 0))
                .map(|naive| naive.and_utc())
        }
    }
}

fn trim_float(number: f64) -> String {
    if number.fract() == 0.0 && number.abs() < 1e15 {
        format!("{}", number as i64)
    } else {
        format!("{:.2}", number)
    }
}

fn group_thousands(number: f64) -> String {
    let rendered = trim_float(number);
    let (sign, unsigned) = match rendered.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", rendered.as_str()),
    };
    let (whole, fraction) = match unsigned.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (unsigned, None),
    };
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (index, digit) in whole.chars().enumerate() {
        if index > 0 && (whole.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    match fraction {
        Some(fraction) => format!("{}{}.{}", sign, grouped, fraction),
        None => format!("{}{}", sign, grouped),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn lenient_field_swallows_wrong_types() {
        let meta: ArchiveMeta = decode(&json!({
            "_id": "abc",
            "deletedAt": ["not", "a", "date"],
            "deletedBy": 42,
        }));
        assert_eq!(meta.native_id(), "abc");
        assert!(meta.archived_at().is_none());
        assert_eq!(meta.archived_by_label(), SYSTEM_ACTOR);
        assert_eq!(meta.reason_text(), PLACEHOLDER);
    }

    #[test]
    fn timestamps_accept_common_spellings() {
        let rfc = parse_timestamp(&Scalar::Text("2024-03-01T10:00:00Z".into())).unwrap();
        let naive = parse_timestamp(&Scalar::Text("2024-03-01T10:00:00.000".into())).unwrap();
        let millis = parse_timestamp(&Scalar::Int(rfc.timestamp_millis())).unwrap();
        assert_eq!(rfc, naive);
        assert_eq!(rfc, millis);
        let spaced = parse_timestamp(&Scalar::Text("2024-03-01 10:00:00".into())).unwrap();
        assert_eq!(rfc, spaced);
        assert!(parse_timestamp(&Scalar::Text("yesterday".into())).is_none());
    }

    #[test]
    fn money_groups_digits() {
        assert_eq!(money(&Lenient(Some(Scalar::Int(1_250_000)))).unwrap(), "1,250,000");
        assert_eq!(money(&Lenient(Some(Scalar::Float(-999.5)))).unwrap(), "-999.50");
        assert_eq!(
            money(&Lenient(Some(Scalar::Text("negotiable".into())))).unwrap(),
            "negotiable"
        );
    }

    #[test]
    fn archive_meta_prefers_deletion_actor() {
        let meta: ArchiveMeta = decode(&json!({
            "id": 17,
            "archivedAt": "2024-05-02T08:30:00Z",
            "deletedBy": {"firstName": "Mona", "lastName": "Adel"},
            "archiveReason": "duplicate"
        }));
        assert_eq!(meta.native_id(), "17");
        assert_eq!(meta.archived_by_label(), "Mona Adel");
        assert_eq!(meta.reason_text(), "duplicate");
        assert!(meta.archived_at().is_some());
    }
}
