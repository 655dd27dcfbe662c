use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// Ticket type tag whose due-by value drives the resolution hint.
pub const SERVICE_REQUEST_TYPE: &str = "SERVICE_REQUEST";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
/// Stable ticket identifier; the backend may send it as a string or an integer.
pub struct TicketId(String);

impl TicketId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for TicketId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for TicketId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::String(raw) => Ok(Self(raw)),
            Value::Number(number) => Ok(Self(number.to_string())),
            other => Err(serde::de::Error::custom(format!(
                "unsupported ticket id value: {other}"
            ))),
        }
    }
}

fn optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(raw)) => Some(raw),
        Some(Value::Number(number)) => Some(number.to_string()),
        Some(Value::Bool(flag)) => Some(flag.to_string()),
        Some(other) => Some(other.to_string()),
    })
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|raw| !raw.is_empty())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
/// One ticket record as served by `/api/tickets/{slug}`.
pub struct TicketItem {
    #[serde(default)]
    pub id: Option<TicketId>,
    #[serde(default, deserialize_with = "optional_text")]
    pub subject: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub requester_name: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub agent_name: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub priority_text: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub sla_text: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub sla_class: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub updated_friendly: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub created_days_old: Option<String>,
    #[serde(default, rename = "type", deserialize_with = "optional_text")]
    pub ticket_type: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub first_responded_at_iso: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub fr_due_by_str: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub due_by_str: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub created_at_str: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub updated_at_str: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub description_text: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq)]
/// A sortable field value; missing fields are represented by `None` at the call site.
pub enum FieldValue<'a> {
    Number(f64),
    Text(Cow<'a, str>),
}

fn field_value_from_json(value: &Value) -> Option<FieldValue<'_>> {
    match value {
        Value::Null => None,
        Value::Number(number) => number.as_f64().map(FieldValue::Number),
        Value::String(raw) => Some(FieldValue::Text(Cow::Borrowed(raw.as_str()))),
        Value::Bool(flag) => Some(FieldValue::Text(Cow::Owned(flag.to_string()))),
        other => Some(FieldValue::Text(Cow::Owned(other.to_string()))),
    }
}

impl FieldValue<'_> {
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            Self::Number(number) => Cow::Owned(number.to_string()),
            Self::Text(raw) => Cow::Borrowed(raw.as_ref()),
        }
    }
}

impl TicketItem {
    pub fn id_str(&self) -> Option<&str> {
        self.id.as_ref().map(TicketId::as_str)
    }

    pub fn subject_text(&self) -> Option<&str> {
        non_empty(&self.subject)
    }

    pub fn requester_text(&self) -> Option<&str> {
        non_empty(&self.requester_name)
    }

    pub fn agent_text(&self) -> Option<&str> {
        non_empty(&self.agent_name)
    }

    pub fn priority_label(&self) -> Option<&str> {
        non_empty(&self.priority_text)
    }

    pub fn sla_label(&self) -> Option<&str> {
        non_empty(&self.sla_text)
    }

    pub fn sla_class_name(&self) -> Option<&str> {
        non_empty(&self.sla_class)
    }

    pub fn updated_friendly_text(&self) -> Option<&str> {
        non_empty(&self.updated_friendly)
    }

    pub fn created_days_old_text(&self) -> Option<&str> {
        non_empty(&self.created_days_old)
    }

    pub fn has_first_response(&self) -> bool {
        non_empty(&self.first_responded_at_iso).is_some()
    }

    pub fn first_response_due(&self) -> Option<&str> {
        non_empty(&self.fr_due_by_str)
    }

    pub fn resolution_due(&self) -> Option<&str> {
        non_empty(&self.due_by_str)
    }

    pub fn is_service_request(&self) -> bool {
        self.ticket_type.as_deref() == Some(SERVICE_REQUEST_TYPE)
    }

    /// Looks up a field by its wire name for sorting. Numeric-looking ids sort as numbers.
    pub fn field_value(&self, key: &str) -> Option<FieldValue<'_>> {
        let known = match key {
            "id" => {
                let id = self.id.as_ref()?;
                return Some(match id.as_str().parse::<f64>() {
                    Ok(number) if number.is_finite() => FieldValue::Number(number),
                    _ => FieldValue::Text(Cow::Borrowed(id.as_str())),
                });
            }
            "subject" => &self.subject,
            "requester_name" => &self.requester_name,
            "agent_name" => &self.agent_name,
            "priority_text" => &self.priority_text,
            "sla_text" => &self.sla_text,
            "sla_class" => &self.sla_class,
            "updated_friendly" => &self.updated_friendly,
            "created_days_old" => &self.created_days_old,
            "type" => &self.ticket_type,
            "first_responded_at_iso" => &self.first_responded_at_iso,
            "fr_due_by_str" => &self.fr_due_by_str,
            "due_by_str" => &self.due_by_str,
            "created_at_str" => &self.created_at_str,
            "updated_at_str" => &self.updated_at_str,
            "description_text" => &self.description_text,
            _ => return self.extra.get(key).and_then(field_value_from_json),
        };
        known
            .as_deref()
            .map(|raw| FieldValue::Text(Cow::Borrowed(raw)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// The four fixed severity buckets, highest severity first.
pub enum SectionId {
    S1,
    S2,
    S3,
    S4,
}

impl SectionId {
    pub const ALL: [SectionId; 4] = [Self::S1, Self::S2, Self::S3, Self::S4];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::S1 => "s1",
            Self::S2 => "s2",
            Self::S3 => "s3",
            Self::S4 => "s4",
        }
    }

    pub fn index(self) -> usize {
        match self {
            Self::S1 => 0,
            Self::S2 => 1,
            Self::S3 => 2,
            Self::S4 => 3,
        }
    }

    /// Accepts `s1`..`s4` (any case) and the `s1-item-table` element-id form.
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_ascii_lowercase();
        let prefix = normalized
            .strip_suffix("-item-table")
            .unwrap_or(normalized.as_str());
        Self::ALL
            .into_iter()
            .find(|section| section.as_str() == prefix)
    }

    pub fn default_title(self) -> &'static str {
        match self {
            Self::S1 => "Open Tickets",
            Self::S2 => "Customer Replied",
            Self::S3 => "Needs Agent / Update Overdue",
            Self::S4 => "Other Active Tickets",
        }
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
/// One complete response from the polling endpoint. Replaced whole, never patched.
pub struct DashboardSnapshot {
    #[serde(default, deserialize_with = "optional_text")]
    pub error: Option<String>,
    #[serde(default)]
    pub agent_mapping: Option<Map<String, Value>>,
    #[serde(default)]
    pub total_active_items: Option<u64>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub s1_items: Vec<TicketItem>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub s2_items: Vec<TicketItem>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub s3_items: Vec<TicketItem>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub s4_items: Vec<TicketItem>,
    #[serde(default, deserialize_with = "optional_text")]
    pub dashboard_generated_time_iso: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub view: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub section1_name_js: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub section2_name_js: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub section3_name_js: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub section4_name_js: Option<String>,
}

impl DashboardSnapshot {
    pub fn items(&self, section: SectionId) -> &[TicketItem] {
        match section {
            SectionId::S1 => &self.s1_items,
            SectionId::S2 => &self.s2_items,
            SectionId::S3 => &self.s3_items,
            SectionId::S4 => &self.s4_items,
        }
    }

    pub fn section_title(&self, section: SectionId) -> Option<&str> {
        let title = match section {
            SectionId::S1 => &self.section1_name_js,
            SectionId::S2 => &self.section2_name_js,
            SectionId::S3 => &self.section3_name_js,
            SectionId::S4 => &self.section4_name_js,
        };
        non_empty(title)
    }

    /// Server-reported total, falling back to the sum of all sections.
    pub fn total_active_items(&self) -> u64 {
        self.total_active_items.unwrap_or_else(|| {
            SectionId::ALL
                .iter()
                .map(|section| self.items(*section).len() as u64)
                .sum()
        })
    }

    pub fn application_error(&self) -> Option<&str> {
        self.error
            .as_deref()
            .map(str::trim)
            .filter(|message| !message.is_empty())
    }

    pub fn find_item(&self, section: SectionId, item_id: &TicketId) -> Option<&TicketItem> {
        self.items(section)
            .iter()
            .find(|item| item.id.as_ref() == Some(item_id))
    }
}
