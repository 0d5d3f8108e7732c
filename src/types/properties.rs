use super::{Color, NotionId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of rich text content.
///
/// Each variant carries its own data; `plain_text` on the enclosing item is
/// the fallback rendering for every variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RichTextType {
    Text {
        content: String,
        link: Option<Link>,
    },
    Mention {
        mention: MentionType,
    },
    Equation {
        expression: String,
    },
}

/// Rich text item with formatting annotations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RichTextItem {
    #[serde(flatten)]
    pub text_type: RichTextType,
    pub annotations: Annotations,
    pub plain_text: String,
    pub href: Option<String>,
}

impl RichTextItem {
    /// Create an unannotated text item.
    pub fn plain_text(text: &str) -> Self {
        Self {
            text_type: RichTextType::Text {
                content: text.to_string(),
                link: None,
            },
            annotations: Annotations::default(),
            plain_text: text.to_string(),
            href: None,
        }
    }
}

/// Concatenates the plain text of a rich text run.
pub fn plain_text_of(items: &[RichTextItem]) -> String {
    items.iter().map(|item| item.plain_text.as_str()).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Annotations {
    pub bold: bool,
    pub italic: bool,
    pub strikethrough: bool,
    pub underline: bool,
    pub code: bool,
    pub color: Color,
}

/// What an inline mention points at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MentionType {
    User { name: Option<String> },
    Page { id: NotionId },
    Database { id: NotionId },
    Date { date: DateValue },
    Link { url: String },
}

/// Select, multi-select and status option
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectOption {
    pub id: String,
    pub name: String,
    pub color: Color,
}

/// Date value with optional end date.
///
/// `start` and `end` keep the text Notion sent (`2024-03-09` or an ISO
/// datetime with its original offset).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateValue {
    pub start: String,
    pub end: Option<String>,
    pub time_zone: Option<String>,
}

impl DateValue {
    /// The calendar date of `start`, as written in its own offset.
    pub fn start_date(&self) -> &str {
        self.start.get(..10).unwrap_or(&self.start)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: Option<String>,
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{}", name),
            None => write!(f, "User {}", self.id),
        }
    }
}

/// A file attached to a files property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct File {
    pub name: String,
    pub url: String,
    pub expiry_time: Option<chrono::DateTime<chrono::Utc>>,
}
