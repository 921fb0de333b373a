use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    Companion,
}

impl std::fmt::Display for Sender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Sender::User => write!(f, "user"),
            Sender::Companion => write!(f, "companion"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttachmentKind {
    Image,
    Audio,
}

impl std::fmt::Display for AttachmentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttachmentKind::Image => write!(f, "image"),
            AttachmentKind::Audio => write!(f, "audio"),
        }
    }
}

/// File attached to a message (photo or voice note)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub kind: AttachmentKind,
    pub file_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

impl Attachment {
    /// Describe a local file; the MIME type is guessed from the extension
    pub fn from_path(kind: AttachmentKind, path: &Path) -> Self {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase());
        let mime_type = match (kind, extension.as_deref()) {
            (AttachmentKind::Image, Some("jpg" | "jpeg")) => Some("image/jpeg"),
            (AttachmentKind::Image, Some("png")) => Some("image/png"),
            (AttachmentKind::Image, Some("gif")) => Some("image/gif"),
            (AttachmentKind::Image, Some("webp")) => Some("image/webp"),
            (AttachmentKind::Audio, Some("mp3")) => Some("audio/mpeg"),
            (AttachmentKind::Audio, Some("wav")) => Some("audio/wav"),
            (AttachmentKind::Audio, Some("ogg")) => Some("audio/ogg"),
            (AttachmentKind::Audio, Some("m4a")) => Some("audio/mp4"),
            _ => None,
        };

        Attachment {
            kind,
            file_name,
            mime_type: mime_type.map(str::to_string),
        }
    }
}

/// One chat message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub sender: Sender,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment: Option<Attachment>,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(sender: Sender, content: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            sender,
            content: content.into(),
            attachment: None,
            timestamp,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Sender::User, content, Utc::now())
    }

    pub fn companion(content: impl Into<String>) -> Self {
        Self::new(Sender::Companion, content, Utc::now())
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachment = Some(attachment);
        self
    }

    /// Short single-line preview for listings
    pub fn preview(&self, max_chars: usize) -> String {
        let line = self.content.lines().next().unwrap_or("");
        if line.chars().count() > max_chars {
            let cut: String = line.chars().take(max_chars).collect();
            format!("{}...", cut)
        } else {
            line.to_string()
        }
    }
}
