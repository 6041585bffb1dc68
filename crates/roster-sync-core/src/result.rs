//! Per-run outcome counters.
//!
//! A [`SyncResult`] is created fresh for every run, owned by that run, and
//! handed back to the caller when the run completes. Counters can only grow:
//! the mutators either increment, add a batch count, or (for the single
//! bulk orphan query) assign once.

use serde::{Deserialize, Serialize};

use crate::sync::Phase;
use crate::types::Surface;

/// Number of counters tracked per run.
pub const COUNTER_COUNT: usize = 13;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncResult {
    members_added: u64,
    members_removed: u64,
    lecture_attendees_removed: u64,
    question_attendees_removed: u64,
    lecture_messages_cleaned: u64,
    question_messages_cleaned: u64,
    practice_messages_cleaned: u64,
    quiz_messages_cleaned: u64,
    points_removed: u64,
    accumulation_logs_removed: u64,
    practices_removed: u64,
    practice_records_removed: u64,
    orphan_quiz_history_removed: u64,
    skipped_surfaces: Vec<Surface>,
}

impl SyncResult {
    pub fn new() -> Self {
        Self::default()
    }

    // -----------------------------------------------------------------------
    // Mutators
    // -----------------------------------------------------------------------

    pub fn record_member_added(&mut self) {
        self.members_added += 1;
    }

    pub fn record_member_removed(&mut self) {
        self.members_removed += 1;
    }

    pub fn record_lecture_attendee_removed(&mut self) {
        self.lecture_attendees_removed += 1;
    }

    pub fn record_question_attendee_removed(&mut self) {
        self.question_attendees_removed += 1;
    }

    /// Count one cleared message reference on the given surface.
    pub fn record_message_cleaned(&mut self, surface: Surface) {
        match surface {
            Surface::Lecture => self.lecture_messages_cleaned += 1,
            Surface::Question => self.question_messages_cleaned += 1,
            Surface::Practice => self.practice_messages_cleaned += 1,
            Surface::Quiz => self.quiz_messages_cleaned += 1,
        }
    }

    pub fn add_points_removed(&mut self, rows: u64) {
        self.points_removed += rows;
    }

    pub fn add_accumulation_logs_removed(&mut self, rows: u64) {
        self.accumulation_logs_removed += rows;
    }

    pub fn record_practice_removed(&mut self) {
        self.practices_removed += 1;
    }

    pub fn add_practice_records_removed(&mut self, rows: u64) {
        self.practice_records_removed += rows;
    }

    /// Assign the orphan-history count reported by the bulk delete.
    pub fn set_orphan_quiz_history_removed(&mut self, rows: u64) {
        self.orphan_quiz_history_removed = rows;
    }

    /// Note that verification was skipped for a surface with no binding.
    pub fn record_skipped_surface(&mut self, surface: Surface) {
        if !self.skipped_surfaces.contains(&surface) {
            self.skipped_surfaces.push(surface);
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn members_added(&self) -> u64 {
        self.members_added
    }

    pub fn members_removed(&self) -> u64 {
        self.members_removed
    }

    pub fn lecture_attendees_removed(&self) -> u64 {
        self.lecture_attendees_removed
    }

    pub fn question_attendees_removed(&self) -> u64 {
        self.question_attendees_removed
    }

    pub fn messages_cleaned(&self, surface: Surface) -> u64 {
        match surface {
            Surface::Lecture => self.lecture_messages_cleaned,
            Surface::Question => self.question_messages_cleaned,
            Surface::Practice => self.practice_messages_cleaned,
            Surface::Quiz => self.quiz_messages_cleaned,
        }
    }

    pub fn points_removed(&self) -> u64 {
        self.points_removed
    }

    pub fn accumulation_logs_removed(&self) -> u64 {
        self.accumulation_logs_removed
    }

    pub fn practices_removed(&self) -> u64 {
        self.practices_removed
    }

    pub fn practice_records_removed(&self) -> u64 {
        self.practice_records_removed
    }

    pub fn orphan_quiz_history_removed(&self) -> u64 {
        self.orphan_quiz_history_removed
    }

    pub fn skipped_surfaces(&self) -> &[Surface] {
        &self.skipped_surfaces
    }

    /// Every counter labelled with its phase, in phase order.
    pub fn counters(&self) -> [(Phase, &'static str, u64); COUNTER_COUNT] {
        [
            (Phase::Members, "added", self.members_added),
            (Phase::Members, "removed", self.members_removed),
            (Phase::Attendees, "lecture", self.lecture_attendees_removed),
            (Phase::Attendees, "question", self.question_attendees_removed),
            (Phase::Messages, "lecture", self.lecture_messages_cleaned),
            (Phase::Messages, "question", self.question_messages_cleaned),
            (Phase::Messages, "practice", self.practice_messages_cleaned),
            (Phase::Messages, "quiz", self.quiz_messages_cleaned),
            (Phase::Points, "points", self.points_removed),
            (Phase::Points, "accumulation_logs", self.accumulation_logs_removed),
            (Phase::Practices, "plans", self.practices_removed),
            (Phase::Practices, "records", self.practice_records_removed),
            (Phase::Quiz, "orphan_history", self.orphan_quiz_history_removed),
        ]
    }

    pub fn total_changes(&self) -> u64 {
        self.counters().iter().map(|(_, _, n)| n).sum()
    }

    pub fn has_changes(&self) -> bool {
        self.total_changes() > 0
    }

    pub fn summary(&self) -> SyncSummary {
        SyncSummary {
            members: MemberCounts {
                added: self.members_added,
                removed: self.members_removed,
            },
            attendees: AttendeeCounts {
                lecture: self.lecture_attendees_removed,
                question: self.question_attendees_removed,
            },
            messages: MessageCounts {
                lecture: self.lecture_messages_cleaned,
                question: self.question_messages_cleaned,
                practice: self.practice_messages_cleaned,
                quiz: self.quiz_messages_cleaned,
            },
            points: PointCounts {
                points: self.points_removed,
                accumulation_logs: self.accumulation_logs_removed,
            },
            practices: PracticeCounts {
                plans: self.practices_removed,
                records: self.practice_records_removed,
            },
            quiz: QuizCounts {
                orphan_history: self.orphan_quiz_history_removed,
            },
            total: self.total_changes(),
            skipped_surfaces: self.skipped_surfaces.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// SyncSummary: structured export grouped by phase
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberCounts {
    pub added: u64,
    pub removed: u64,
}

/// Attendees removed from lectures and questions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendeeCounts {
    pub lecture: u64,
    pub question: u64,
}

/// Stale message references cleared, per surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageCounts {
    pub lecture: u64,
    pub question: u64,
    pub practice: u64,
    pub quiz: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointCounts {
    pub points: u64,
    pub accumulation_logs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PracticeCounts {
    pub plans: u64,
    pub records: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizCounts {
    pub orphan_history: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncSummary {
    pub members: MemberCounts,
    pub attendees: AttendeeCounts,
    pub messages: MessageCounts,
    pub points: PointCounts,
    pub practices: PracticeCounts,
    pub quiz: QuizCounts,
    pub total: u64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped_surfaces: Vec<Surface>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
