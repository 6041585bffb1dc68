//! Persistence capability consumed by the sync engine.
//!
//! The engine never touches storage directly: every read and write goes
//! through a [`Repository`]. Operations are synchronous; the engine only
//! suspends on messaging calls.

use crate::error::StoreError;
use crate::types::{
    ActivityPointRecord, LectureRecord, MemberRecord, PracticePlanRecord, PracticeRecord,
    QuestionRecord, QuizPublishHistoryRecord, RecordId,
};

pub type StoreResult<T> = std::result::Result<T, StoreError>;

pub trait Repository: Send + Sync {
    // -- members ------------------------------------------------------------

    /// Insert a member row if none exists. Returns `true` if a row was added.
    fn insert_member_if_missing(&self, member: &str) -> StoreResult<bool>;
    fn list_members(&self) -> StoreResult<Vec<MemberRecord>>;
    fn delete_member(&self, member: &str) -> StoreResult<()>;

    // -- attendees ----------------------------------------------------------

    fn list_lectures(&self) -> StoreResult<Vec<LectureRecord>>;
    fn remove_lecture_attendee(&self, lecture_id: RecordId, member: &str) -> StoreResult<()>;
    fn list_questions(&self) -> StoreResult<Vec<QuestionRecord>>;
    fn remove_question_attendee(&self, question_id: RecordId, member: &str) -> StoreResult<()>;

    // -- message references -------------------------------------------------

    fn clear_lecture_message_ref(&self, lecture_id: RecordId) -> StoreResult<()>;
    fn clear_question_message_ref(&self, question_id: RecordId) -> StoreResult<()>;
    fn clear_practice_message_ref(&self, plan_id: RecordId) -> StoreResult<()>;
    fn clear_quiz_history_message_ref(&self, history_id: RecordId) -> StoreResult<()>;

    // -- activity points ----------------------------------------------------

    fn list_activity_points(&self) -> StoreResult<Vec<ActivityPointRecord>>;
    /// Returns the number of rows deleted.
    fn delete_activity_points_by_owner(&self, owner: &str) -> StoreResult<u64>;
    /// Returns the number of rows deleted.
    fn delete_accumulation_logs_by_owner(&self, owner: &str) -> StoreResult<u64>;

    // -- practices ----------------------------------------------------------

    fn list_practice_plans(&self) -> StoreResult<Vec<PracticePlanRecord>>;
    fn list_practice_records(&self, plan_id: RecordId) -> StoreResult<Vec<PracticeRecord>>;
    /// Delete a plan. Implementations may cascade to its practice records.
    fn delete_practice_plan(&self, plan_id: RecordId) -> StoreResult<()>;

    // -- quiz history -------------------------------------------------------

    fn list_quiz_history(&self) -> StoreResult<Vec<QuizPublishHistoryRecord>>;
    /// Delete every history row whose question no longer exists.
    /// Returns the number of rows deleted.
    fn delete_orphan_quiz_history(&self) -> StoreResult<u64>;
}
