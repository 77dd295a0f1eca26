//! Notices sent to members
//!
//! The core only decides the text and the delivery hints; how a notice is
//! rendered is up to the messaging adapter.

use serde::{Deserialize, Serialize};

/// Which notification channel a notice belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeCategory {
    Government,
    Notifications,
    Reputation,
}

/// How prominently a notice is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeStyle {
    Chat,
    InfoBox,
}

/// A message plus its delivery hints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub text: String,
    pub category: NoticeCategory,
    pub style: NoticeStyle,
}

impl Notice {
    /// A regular company chat notice
    pub fn government(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            category: NoticeCategory::Government,
            style: NoticeStyle::Chat,
        }
    }

    /// A general notification, used for mail to settlement approvers
    pub fn notification(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            category: NoticeCategory::Notifications,
            style: NoticeStyle::Chat,
        }
    }

    /// A reputation change shown in an info box
    pub fn reputation(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            category: NoticeCategory::Reputation,
            style: NoticeStyle::InfoBox,
        }
    }
}
