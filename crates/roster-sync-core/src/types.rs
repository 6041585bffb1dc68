use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a roster member (the platform user id).
pub type MemberId = String;

/// Primary key of a stored record.
pub type RecordId = u64;

// ---------------------------------------------------------------------------
// MessageRef
// ---------------------------------------------------------------------------

/// Reference to a message previously published on the messaging platform.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageRef(pub String);

impl MessageRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Surface / SurfaceBindings
// ---------------------------------------------------------------------------

/// A kind of record that is published to its own channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Surface {
    Lecture,
    Question,
    Practice,
    Quiz,
}

impl Surface {
    pub fn all() -> &'static [Surface] {
        &[
            Surface::Lecture,
            Surface::Question,
            Surface::Practice,
            Surface::Quiz,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Surface::Lecture => "lecture",
            Surface::Question => "question",
            Surface::Practice => "practice",
            Surface::Quiz => "quiz",
        }
    }
}

impl fmt::Display for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The channel a surface's messages are published to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SurfaceBinding {
    pub channel_id: String,
}

impl SurfaceBinding {
    pub fn new(channel_id: impl Into<String>) -> Self {
        Self {
            channel_id: channel_id.into(),
        }
    }
}

/// Optional per-surface bindings for a sync run.
///
/// An omitted slot disables stale-reference verification and best-effort
/// message deletion for that surface only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurfaceBindings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lecture: Option<SurfaceBinding>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question: Option<SurfaceBinding>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub practice: Option<SurfaceBinding>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quiz: Option<SurfaceBinding>,
}

impl SurfaceBindings {
    pub fn get(&self, surface: Surface) -> Option<&SurfaceBinding> {
        match surface {
            Surface::Lecture => self.lecture.as_ref(),
            Surface::Question => self.question.as_ref(),
            Surface::Practice => self.practice.as_ref(),
            Surface::Quiz => self.quiz.as_ref(),
        }
    }

    pub fn with(mut self, surface: Surface, binding: SurfaceBinding) -> Self {
        let slot = match surface {
            Surface::Lecture => &mut self.lecture,
            Surface::Question => &mut self.question,
            Surface::Practice => &mut self.practice,
            Surface::Quiz => &mut self.quiz,
        };
        *slot = Some(binding);
        self
    }

    pub fn is_empty(&self) -> bool {
        Surface::all().iter().all(|s| self.get(*s).is_none())
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberRecord {
    pub id: MemberId,
    pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LectureRecord {
    pub id: RecordId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub attendees: Vec<MemberId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_ref: Option<MessageRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionRecord {
    pub id: RecordId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub attendees: Vec<MemberId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_ref: Option<MessageRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PracticePlanRecord {
    pub id: RecordId,
    pub owner: MemberId,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_ref: Option<MessageRef>,
}

/// A single practice session belonging to a [`PracticePlanRecord`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PracticeRecord {
    pub plan_id: RecordId,
    pub seq: u64,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityPointRecord {
    pub owner: MemberId,
    #[serde(default)]
    pub points: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccumulationLogRecord {
    pub id: RecordId,
    pub owner: MemberId,
    pub amount: i64,
    #[serde(default)]
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizPublishHistoryRecord {
    pub id: RecordId,
    pub question_id: RecordId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_ref: Option<MessageRef>,
    pub published_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
