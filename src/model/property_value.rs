use crate::types::*;
use serde::{Deserialize, Serialize};

/// A page property: its id plus the typed value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyValue {
    pub id: PropertyName,
    #[serde(flatten)]
    pub value: PropertyTypeValue,
}

impl PropertyValue {
    pub fn new(id: impl Into<String>, value: PropertyTypeValue) -> Self {
        Self {
            id: PropertyName::new(id),
            value,
        }
    }

    /// Returns the Notion API type name for this property value.
    pub fn type_name(&self) -> &str {
        match &self.value {
            PropertyTypeValue::Title { .. } => "title",
            PropertyTypeValue::RichText { .. } => "rich_text",
            PropertyTypeValue::Number { .. } => "number",
            PropertyTypeValue::Select { .. } => "select",
            PropertyTypeValue::MultiSelect { .. } => "multi_select",
            PropertyTypeValue::Status { .. } => "status",
            PropertyTypeValue::Date { .. } => "date",
            PropertyTypeValue::Relation { .. } => "relation",
            PropertyTypeValue::People { .. } => "people",
            PropertyTypeValue::Files { .. } => "files",
            PropertyTypeValue::Checkbox { .. } => "checkbox",
            PropertyTypeValue::Url { .. } => "url",
            PropertyTypeValue::Email { .. } => "email",
            PropertyTypeValue::PhoneNumber { .. } => "phone_number",
            PropertyTypeValue::CreatedTime { .. } => "created_time",
            PropertyTypeValue::LastEditedTime { .. } => "last_edited_time",
            PropertyTypeValue::Other { kind } => kind,
        }
    }

    /// Title items, only for title properties.
    pub fn as_title(&self) -> Option<&[RichTextItem]> {
        match &self.value {
            PropertyTypeValue::Title { title } => Some(title),
            _ => None,
        }
    }

    /// Rich text items, only for rich text properties.
    pub fn as_rich_text(&self) -> Option<&[RichTextItem]> {
        match &self.value {
            PropertyTypeValue::RichText { rich_text } => Some(rich_text),
            _ => None,
        }
    }

    /// Plain text of a title or rich text property.
    pub fn text(&self) -> Option<String> {
        self.as_title()
            .or_else(|| self.as_rich_text())
            .map(plain_text_of)
    }

    pub fn as_url(&self) -> Option<&str> {
        match &self.value {
            PropertyTypeValue::Url { url } => url.as_deref(),
            _ => None,
        }
    }

    pub fn as_select(&self) -> Option<&SelectOption> {
        match &self.value {
            PropertyTypeValue::Select { select } => select.as_ref(),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<&DateValue> {
        match &self.value {
            PropertyTypeValue::Date { date } => date.as_ref(),
            _ => None,
        }
    }

    pub fn as_files(&self) -> Option<&[File]> {
        match &self.value {
            PropertyTypeValue::Files { files } => Some(files),
            _ => None,
        }
    }
}

/// The typed payload of a page property, tagged by its Notion type name.
///
/// Property kinds this service never reads collapse into `Other`, which keeps
/// the raw type name so conversion never fails on them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PropertyTypeValue {
    Title {
        title: Vec<RichTextItem>,
    },
    RichText {
        rich_text: Vec<RichTextItem>,
    },
    Number {
        number: Option<f64>,
    },
    Select {
        select: Option<SelectOption>,
    },
    MultiSelect {
        multi_select: Vec<SelectOption>,
    },
    Status {
        status: Option<SelectOption>,
    },
    Date {
        date: Option<DateValue>,
    },
    Relation {
        relation: Vec<PageId>,
    },
    People {
        people: Vec<User>,
    },
    Files {
        files: Vec<File>,
    },
    Checkbox {
        checkbox: bool,
    },
    Url {
        url: Option<String>,
    },
    Email {
        email: Option<String>,
    },
    PhoneNumber {
        phone_number: Option<String>,
    },
    CreatedTime {
        created_time: chrono::DateTime<chrono::Utc>,
    },
    LastEditedTime {
        last_edited_time: Option<chrono::DateTime<chrono::Utc>>,
    },
    Other {
        kind: String,
    },
}
