//! Persistent record store using redb.
//!
//! # Table design
//!
//! One table per record kind, values JSON-encoded. Practices use a 16-byte
//! composite key:
//! ```text
//! [ plan_id: u64 big-endian (8 bytes) | seq: u64 big-endian (8 bytes) ]
//! ```
//! so byte ordering groups a plan's practices together and a single range
//! scan returns all of them. Deleting a plan removes that range in the same
//! write transaction.

mod snapshot;

pub use snapshot::Snapshot;

use std::collections::HashSet;
use std::path::Path;

use chrono::Utc;
use redb::{Database, ReadableTable, ReadableTableMetadata, TableDefinition};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::repository::{Repository, StoreResult};
use crate::types::{
    AccumulationLogRecord, ActivityPointRecord, LectureRecord, MemberRecord, PracticePlanRecord,
    PracticeRecord, QuestionRecord, QuizPublishHistoryRecord, RecordId,
};

// ---------------------------------------------------------------------------
// Table definitions
// ---------------------------------------------------------------------------

const MEMBERS: TableDefinition<&str, &[u8]> = TableDefinition::new("members");
const LECTURES: TableDefinition<u64, &[u8]> = TableDefinition::new("lectures");
const QUESTIONS: TableDefinition<u64, &[u8]> = TableDefinition::new("questions");
const PRACTICE_PLANS: TableDefinition<u64, &[u8]> = TableDefinition::new("practice_plans");
/// Key: 16-byte composite (plan_id big-endian ++ seq big-endian)
const PRACTICES: TableDefinition<&[u8], &[u8]> = TableDefinition::new("practices");
const ACTIVITY_POINTS: TableDefinition<&str, &[u8]> = TableDefinition::new("activity_points");
const ACCUMULATION_LOGS: TableDefinition<u64, &[u8]> = TableDefinition::new("accumulation_logs");
const QUIZ_HISTORY: TableDefinition<u64, &[u8]> = TableDefinition::new("quiz_history");

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn db(e: impl std::fmt::Display) -> StoreError {
    StoreError::Db(e.to_string())
}

fn practice_key(plan_id: RecordId, seq: u64) -> [u8; 16] {
    let mut key = [0u8; 16];
    key[..8].copy_from_slice(&plan_id.to_be_bytes());
    key[8..].copy_from_slice(&seq.to_be_bytes());
    key
}

/// Row counts per table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreCounts {
    pub members: u64,
    pub lectures: u64,
    pub questions: u64,
    pub practice_plans: u64,
    pub practices: u64,
    pub activity_points: u64,
    pub accumulation_logs: u64,
    pub quiz_history: u64,
}

// ---------------------------------------------------------------------------
// RecordStore
// ---------------------------------------------------------------------------

/// redb-backed [`Repository`].
pub struct RecordStore {
    db: Database,
}

impl RecordStore {
    /// Open or create the database at `path`, creating every table.
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(db)?;
        }
        let database = Database::create(path).map_err(db)?;
        let wt = database.begin_write().map_err(db)?;
        wt.open_table(MEMBERS).map_err(db)?;
        wt.open_table(LECTURES).map_err(db)?;
        wt.open_table(QUESTIONS).map_err(db)?;
        wt.open_table(PRACTICE_PLANS).map_err(db)?;
        wt.open_table(PRACTICES).map_err(db)?;
        wt.open_table(ACTIVITY_POINTS).map_err(db)?;
        wt.open_table(ACCUMULATION_LOGS).map_err(db)?;
        wt.open_table(QUIZ_HISTORY).map_err(db)?;
        wt.commit().map_err(db)?;
        Ok(Self { db: database })
    }

    fn read_all<K, T>(&self, def: TableDefinition<K, &'static [u8]>) -> StoreResult<Vec<T>>
    where
        K: redb::Key + 'static,
        T: DeserializeOwned,
    {
        let rt = self.db.begin_read().map_err(db)?;
        let table = rt.open_table(def).map_err(db)?;
        let mut result = Vec::new();
        for entry in table.iter().map_err(db)? {
            let (_, v) = entry.map_err(db)?;
            result.push(serde_json::from_slice(v.value())?);
        }
        Ok(result)
    }

    /// Read-modify-write a single id-keyed record.
    fn update<T, F>(
        &self,
        def: TableDefinition<u64, &'static [u8]>,
        kind: &'static str,
        id: RecordId,
        f: F,
    ) -> StoreResult<()>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(&mut T),
    {
        let wt = self.db.begin_write().map_err(db)?;
        {
            let mut table = wt.open_table(def).map_err(db)?;
            let mut record: T = match table.get(id).map_err(db)? {
                Some(v) => serde_json::from_slice(v.value())?,
                None => {
                    return Err(StoreError::NotFound {
                        kind,
                        id: id.to_string(),
                    })
                }
            };
            f(&mut record);
            let value = serde_json::to_vec(&record)?;
            table.insert(id, value.as_slice()).map_err(db)?;
        }
        wt.commit().map_err(db)?;
        Ok(())
    }

    fn put(
        &self,
        def: TableDefinition<u64, &'static [u8]>,
        id: RecordId,
        value: &[u8],
    ) -> StoreResult<()> {
        let wt = self.db.begin_write().map_err(db)?;
        {
            let mut table = wt.open_table(def).map_err(db)?;
            table.insert(id, value).map_err(db)?;
        }
        wt.commit().map_err(db)?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Writers (used by import and tests)
    // -----------------------------------------------------------------------

    pub fn insert_lecture(&self, lecture: &LectureRecord) -> StoreResult<()> {
        self.put(LECTURES, lecture.id, &serde_json::to_vec(lecture)?)
    }

    pub fn insert_question(&self, question: &QuestionRecord) -> StoreResult<()> {
        self.put(QUESTIONS, question.id, &serde_json::to_vec(question)?)
    }

    pub fn insert_practice_plan(&self, plan: &PracticePlanRecord) -> StoreResult<()> {
        self.put(PRACTICE_PLANS, plan.id, &serde_json::to_vec(plan)?)
    }

    pub fn insert_accumulation_log(&self, log: &AccumulationLogRecord) -> StoreResult<()> {
        self.put(ACCUMULATION_LOGS, log.id, &serde_json::to_vec(log)?)
    }

    pub fn insert_quiz_history(&self, history: &QuizPublishHistoryRecord) -> StoreResult<()> {
        self.put(QUIZ_HISTORY, history.id, &serde_json::to_vec(history)?)
    }

    pub fn insert_practice(&self, practice: &PracticeRecord) -> StoreResult<()> {
        let key = practice_key(practice.plan_id, practice.seq);
        let value = serde_json::to_vec(practice)?;
        let wt = self.db.begin_write().map_err(db)?;
        {
            let mut table = wt.open_table(PRACTICES).map_err(db)?;
            table.insert(key.as_slice(), value.as_slice()).map_err(db)?;
        }
        wt.commit().map_err(db)?;
        Ok(())
    }

    pub fn upsert_activity_points(&self, record: &ActivityPointRecord) -> StoreResult<()> {
        let value = serde_json::to_vec(record)?;
        let wt = self.db.begin_write().map_err(db)?;
        {
            let mut table = wt.open_table(ACTIVITY_POINTS).map_err(db)?;
            table.insert(record.owner.as_str(), value.as_slice()).map_err(db)?;
        }
        wt.commit().map_err(db)?;
        Ok(())
    }

    /// Load every record in `snapshot`, overwriting rows with the same key.
    pub fn import(&self, snapshot: &Snapshot) -> StoreResult<()> {
        for member in &snapshot.members {
            self.insert_member_if_missing(member)?;
        }
        for lecture in &snapshot.lectures {
            self.insert_lecture(lecture)?;
        }
        for question in &snapshot.questions {
            self.insert_question(question)?;
        }
        for plan in &snapshot.practice_plans {
            self.insert_practice_plan(plan)?;
        }
        for practice in &snapshot.practices {
            self.insert_practice(practice)?;
        }
        for points in &snapshot.activity_points {
            self.upsert_activity_points(points)?;
        }
        for log in &snapshot.accumulation_logs {
            self.insert_accumulation_log(log)?;
        }
        for history in &snapshot.quiz_history {
            self.insert_quiz_history(history)?;
        }
        Ok(())
    }

    pub fn counts(&self) -> StoreResult<StoreCounts> {
        let rt = self.db.begin_read().map_err(db)?;
        Ok(StoreCounts {
            members: rt.open_table(MEMBERS).map_err(db)?.len().map_err(db)?,
            lectures: rt.open_table(LECTURES).map_err(db)?.len().map_err(db)?,
            questions: rt.open_table(QUESTIONS).map_err(db)?.len().map_err(db)?,
            practice_plans: rt.open_table(PRACTICE_PLANS).map_err(db)?.len().map_err(db)?,
            practices: rt.open_table(PRACTICES).map_err(db)?.len().map_err(db)?,
            activity_points: rt.open_table(ACTIVITY_POINTS).map_err(db)?.len().map_err(db)?,
            accumulation_logs: rt
                .open_table(ACCUMULATION_LOGS)
                .map_err(db)?
                .len()
                .map_err(db)?,
            quiz_history: rt.open_table(QUIZ_HISTORY).map_err(db)?.len().map_err(db)?,
        })
    }

    pub fn list_accumulation_logs(&self) -> StoreResult<Vec<AccumulationLogRecord>> {
        self.read_all(ACCUMULATION_LOGS)
    }
}

// ---------------------------------------------------------------------------
// Repository impl
// ---------------------------------------------------------------------------

impl Repository for RecordStore {
    fn insert_member_if_missing(&self, member: &str) -> StoreResult<bool> {
        let wt = self.db.begin_write().map_err(db)?;
        let inserted = {
            let mut table = wt.open_table(MEMBERS).map_err(db)?;
            let exists = table.get(member).map_err(db)?.is_some();
            if !exists {
                let record = MemberRecord {
                    id: member.to_string(),
                    joined_at: Utc::now(),
                };
                let value = serde_json::to_vec(&record)?;
                table.insert(member, value.as_slice()).map_err(db)?;
            }
            !exists
        };
        wt.commit().map_err(db)?;
        Ok(inserted)
    }

    fn list_members(&self) -> StoreResult<Vec<MemberRecord>> {
        self.read_all(MEMBERS)
    }

    fn delete_member(&self, member: &str) -> StoreResult<()> {
        let wt = self.db.begin_write().map_err(db)?;
        {
            let mut table = wt.open_table(MEMBERS).map_err(db)?;
            table.remove(member).map_err(db)?;
        }
        wt.commit().map_err(db)?;
        Ok(())
    }

    fn list_lectures(&self) -> StoreResult<Vec<LectureRecord>> {
        self.read_all(LECTURES)
    }

    fn remove_lecture_attendee(&self, lecture_id: RecordId, member: &str) -> StoreResult<()> {
        self.update(LECTURES, "lecture", lecture_id, |l: &mut LectureRecord| {
            l.attendees.retain(|a| a != member)
        })
    }

    fn list_questions(&self) -> StoreResult<Vec<QuestionRecord>> {
        self.read_all(QUESTIONS)
    }

    fn remove_question_attendee(&self, question_id: RecordId, member: &str) -> StoreResult<()> {
        self.update(QUESTIONS, "question", question_id, |q: &mut QuestionRecord| {
            q.attendees.retain(|a| a != member)
        })
    }

    fn clear_lecture_message_ref(&self, lecture_id: RecordId) -> StoreResult<()> {
        self.update(LECTURES, "lecture", lecture_id, |l: &mut LectureRecord| {
            l.message_ref = None
        })
    }

    fn clear_question_message_ref(&self, question_id: RecordId) -> StoreResult<()> {
        self.update(QUESTIONS, "question", question_id, |q: &mut QuestionRecord| {
            q.message_ref = None
        })
    }

    fn clear_practice_message_ref(&self, plan_id: RecordId) -> StoreResult<()> {
        self.update(PRACTICE_PLANS, "practice plan", plan_id, |p: &mut PracticePlanRecord| {
            p.message_ref = None
        })
    }

    fn clear_quiz_history_message_ref(&self, history_id: RecordId) -> StoreResult<()> {
        self.update(
            QUIZ_HISTORY,
            "quiz history",
            history_id,
            |h: &mut QuizPublishHistoryRecord| h.message_ref = None,
        )
    }

    fn list_activity_points(&self) -> StoreResult<Vec<ActivityPointRecord>> {
        self.read_all(ACTIVITY_POINTS)
    }

    fn delete_activity_points_by_owner(&self, owner: &str) -> StoreResult<u64> {
        let wt = self.db.begin_write().map_err(db)?;
        let removed = {
            let mut table = wt.open_table(ACTIVITY_POINTS).map_err(db)?;
            let removed = table.remove(owner).map_err(db)?.is_some();
            u64::from(removed)
        };
        wt.commit().map_err(db)?;
        Ok(removed)
    }

    fn delete_accumulation_logs_by_owner(&self, owner: &str) -> StoreResult<u64> {
        let wt = self.db.begin_write().map_err(db)?;
        let removed = {
            let mut table = wt.open_table(ACCUMULATION_LOGS).map_err(db)?;
            let mut ids = Vec::new();
            for entry in table.iter().map_err(db)? {
                let (k, v) = entry.map_err(db)?;
                let log: AccumulationLogRecord = serde_json::from_slice(v.value())?;
                if log.owner == owner {
                    ids.push(k.value());
                }
            }
            for id in &ids {
                table.remove(*id).map_err(db)?;
            }
            ids.len() as u64
        };
        wt.commit().map_err(db)?;
        Ok(removed)
    }

    fn list_practice_plans(&self) -> StoreResult<Vec<PracticePlanRecord>> {
        self.read_all(PRACTICE_PLANS)
    }

    fn list_practice_records(&self, plan_id: RecordId) -> StoreResult<Vec<PracticeRecord>> {
        let lower = practice_key(plan_id, 0);
        let upper = practice_key(plan_id, u64::MAX);
        let rt = self.db.begin_read().map_err(db)?;
        let table = rt.open_table(PRACTICES).map_err(db)?;

        let mut result = Vec::new();
        for entry in table
            .range(lower.as_slice()..=upper.as_slice())
            .map_err(db)?
        {
            let (_, v) = entry.map_err(db)?;
            result.push(serde_json::from_slice(v.value())?);
        }
        Ok(result)
    }

    fn delete_practice_plan(&self, plan_id: RecordId) -> StoreResult<()> {
        let lower = practice_key(plan_id, 0);
        let upper = practice_key(plan_id, u64::MAX);
        let wt = self.db.begin_write().map_err(db)?;
        {
            let mut plans = wt.open_table(PRACTICE_PLANS).map_err(db)?;
            if plans.remove(plan_id).map_err(db)?.is_none() {
                return Err(StoreError::NotFound {
                    kind: "practice plan",
                    id: plan_id.to_string(),
                });
            }

            // Cascade to the plan's practices.
            let mut practices = wt.open_table(PRACTICES).map_err(db)?;
            let mut keys = Vec::new();
            for entry in practices
                .range(lower.as_slice()..=upper.as_slice())
                .map_err(db)?
            {
                let (k, _) = entry.map_err(db)?;
                keys.push(k.value().to_vec());
            }
            for key in &keys {
                practices.remove(key.as_slice()).map_err(db)?;
            }
        }
        wt.commit().map_err(db)?;
        Ok(())
    }

    fn list_quiz_history(&self) -> StoreResult<Vec<QuizPublishHistoryRecord>> {
        self.read_all(QUIZ_HISTORY)
    }

    fn delete_orphan_quiz_history(&self) -> StoreResult<u64> {
        let wt = self.db.begin_write().map_err(db)?;
        let removed = {
            let questions = wt.open_table(QUESTIONS).map_err(db)?;
            let mut live = HashSet::new();
            for entry in questions.iter().map_err(db)? {
                let (k, _) = entry.map_err(db)?;
                live.insert(k.value());
            }

            let mut history = wt.open_table(QUIZ_HISTORY).map_err(db)?;
            let mut orphans = Vec::new();
            for entry in history.iter().map_err(db)? {
                let (k, v) = entry.map_err(db)?;
                let record: QuizPublishHistoryRecord = serde_json::from_slice(v.value())?;
                if !live.contains(&record.question_id) {
                    orphans.push(k.value());
                }
            }
            for id in &orphans {
                history.remove(*id).map_err(db)?;
            }
            orphans.len() as u64
        };
        wt.commit().map_err(db)?;
        Ok(removed)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
