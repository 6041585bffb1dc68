//! Reconciliation orchestrator.
//!
//! [`SyncEngine::execute_full_sync`] runs six phases strictly in order
//! against a [`Repository`] and a [`Messaging`] platform:
//!
//! ```text
//! Members → Attendees → Messages → Points → Practices → Quiz
//! ```
//!
//! Each phase reads what the previous phases persisted. There is no
//! transaction across phases: a repository failure aborts the run, but
//! whatever earlier phases wrote stays written.

mod phase;

pub use phase::Phase;
pub(crate) use phase::RunState;

use std::collections::HashSet;

use tracing::{debug, error, info, warn, Instrument, Span};

use crate::error::{Result, SyncError};
use crate::messaging::Messaging;
use crate::repository::{Repository, StoreResult};
use crate::result::SyncResult;
use crate::roster::Roster;
use crate::types::{MessageRef, RecordId, Surface, SurfaceBindings};

// ---------------------------------------------------------------------------
// SyncEngine
// ---------------------------------------------------------------------------

pub struct SyncEngine<'a, R: ?Sized, M: ?Sized> {
    repo: &'a R,
    messaging: &'a M,
    span: Span,
}

impl<'a, R, M> SyncEngine<'a, R, M>
where
    R: Repository + ?Sized,
    M: Messaging + ?Sized,
{
    pub fn new(repo: &'a R, messaging: &'a M) -> Self {
        Self {
            repo,
            messaging,
            span: tracing::info_span!("roster_sync"),
        }
    }

    /// Log every phase of every run inside `span`.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Run all six phases and return the counters for this run.
    ///
    /// The first repository failure stops the run and is returned as
    /// [`SyncError::PhaseFailed`]; no [`SyncResult`] is produced in that case.
    pub async fn execute_full_sync(
        &self,
        roster: &Roster,
        surfaces: &SurfaceBindings,
    ) -> Result<SyncResult> {
        let span = self.span.clone();
        self.run(roster, surfaces).instrument(span).await
    }

    async fn run(&self, roster: &Roster, surfaces: &SurfaceBindings) -> Result<SyncResult> {
        let mut result = SyncResult::new();
        let mut state = RunState::NotStarted;
        info!(roster = roster.len(), "starting full sync");

        for phase in Phase::all() {
            state = state.enter(*phase);
            debug!(%phase, "phase started");
            let outcome = match phase {
                Phase::Members => self.sync_members(roster, &mut result),
                Phase::Attendees => self.clean_attendees(roster, &mut result),
                Phase::Messages => self.verify_message_refs(surfaces, &mut result).await,
                Phase::Points => self.clean_activity_points(roster, &mut result),
                Phase::Practices => self.clean_practices(roster, surfaces, &mut result).await,
                Phase::Quiz => self.clean_orphan_quiz_history(&mut result),
            };
            if let Err(source) = outcome {
                state = state.abort();
                debug_assert!(state.is_terminal());
                error!(%phase, %state, error = %source, "sync aborted");
                return Err(SyncError::PhaseFailed {
                    phase: *phase,
                    source,
                });
            }
        }

        state = state.complete();
        debug_assert!(state.is_terminal());
        info!(
            %state,
            total = result.total_changes(),
            skipped = ?result.skipped_surfaces(),
            "full sync finished"
        );
        Ok(result)
    }

    // -----------------------------------------------------------------------
    // Phase 1: members
    // -----------------------------------------------------------------------

    fn sync_members(&self, roster: &Roster, result: &mut SyncResult) -> StoreResult<()> {
        for member in roster.iter() {
            if self.repo.insert_member_if_missing(member)? {
                debug!(member, "member added");
                result.record_member_added();
            }
        }

        // Re-read after inserting so fresh rows are never removal candidates.
        for record in self.repo.list_members()? {
            if !roster.contains(&record.id) {
                self.repo.delete_member(&record.id)?;
                info!(member = %record.id, "member removed");
                result.record_member_removed();
            }
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Phase 2: attendees
    // -----------------------------------------------------------------------

    fn clean_attendees(&self, roster: &Roster, result: &mut SyncResult) -> StoreResult<()> {
        for lecture in self.repo.list_lectures()? {
            for member in stale_attendees(&lecture.attendees, roster) {
                self.repo.remove_lecture_attendee(lecture.id, member)?;
                debug!(lecture_id = lecture.id, member, "lecture attendee removed");
                result.record_lecture_attendee_removed();
            }
        }

        for question in self.repo.list_questions()? {
            for member in stale_attendees(&question.attendees, roster) {
                self.repo.remove_question_attendee(question.id, member)?;
                debug!(question_id = question.id, member, "question attendee removed");
                result.record_question_attendee_removed();
            }
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Phase 3: stale message references
    // -----------------------------------------------------------------------

    async fn verify_message_refs(
        &self,
        surfaces: &SurfaceBindings,
        result: &mut SyncResult,
    ) -> StoreResult<()> {
        for surface in Surface::all() {
            let Some(binding) = surfaces.get(*surface) else {
                debug!(%surface, "no binding configured, skipping verification");
                result.record_skipped_surface(*surface);
                continue;
            };

            for (id, message_ref) in self.published_refs(*surface)? {
                match self.messaging.fetch_message(binding, &message_ref).await {
                    Ok(_) => {}
                    Err(e) if e.is_not_found() => {
                        self.clear_message_ref(*surface, id)?;
                        info!(%surface, id, message = %message_ref, "stale message reference cleared");
                        result.record_message_cleaned(*surface);
                    }
                    Err(e) => {
                        warn!(%surface, id, message = %message_ref, error = %e, "message check failed, keeping reference");
                    }
                }
            }
        }
        Ok(())
    }

    /// Every `(record id, message ref)` pair stored for a surface.
    fn published_refs(&self, surface: Surface) -> StoreResult<Vec<(RecordId, MessageRef)>> {
        let refs = match surface {
            Surface::Lecture => self
                .repo
                .list_lectures()?
                .into_iter()
                .filter_map(|r| r.message_ref.map(|m| (r.id, m)))
                .collect(),
            Surface::Question => self
                .repo
                .list_questions()?
                .into_iter()
                .filter_map(|r| r.message_ref.map(|m| (r.id, m)))
                .collect(),
            Surface::Practice => self
                .repo
                .list_practice_plans()?
                .into_iter()
                .filter_map(|r| r.message_ref.map(|m| (r.id, m)))
                .collect(),
            Surface::Quiz => self
                .repo
                .list_quiz_history()?
                .into_iter()
                .filter_map(|r| r.message_ref.map(|m| (r.id, m)))
                .collect(),
        };
        Ok(refs)
    }

    fn clear_message_ref(&self, surface: Surface, id: RecordId) -> StoreResult<()> {
        match surface {
            Surface::Lecture => self.repo.clear_lecture_message_ref(id),
            Surface::Question => self.repo.clear_question_message_ref(id),
            Surface::Practice => self.repo.clear_practice_message_ref(id),
            Surface::Quiz => self.repo.clear_quiz_history_message_ref(id),
        }
    }

    // -----------------------------------------------------------------------
    // Phase 4: activity points
    // -----------------------------------------------------------------------

    fn clean_activity_points(&self, roster: &Roster, result: &mut SyncResult) -> StoreResult<()> {
        let owners: HashSet<String> = self
            .repo
            .list_activity_points()?
            .into_iter()
            .map(|r| r.owner)
            .filter(|owner| !roster.contains(owner))
            .collect();

        for owner in owners {
            let points = self.repo.delete_activity_points_by_owner(&owner)?;
            let logs = self.repo.delete_accumulation_logs_by_owner(&owner)?;
            info!(member = %owner, points, logs, "activity points removed");
            result.add_points_removed(points);
            result.add_accumulation_logs_removed(logs);
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Phase 5: practice plans
    // -----------------------------------------------------------------------

    async fn clean_practices(
        &self,
        roster: &Roster,
        surfaces: &SurfaceBindings,
        result: &mut SyncResult,
    ) -> StoreResult<()> {
        for plan in self.repo.list_practice_plans()? {
            if roster.contains(&plan.owner) {
                continue;
            }

            if let (Some(message_ref), Some(binding)) = (&plan.message_ref, &surfaces.practice) {
                // Best effort: the plan is deleted whatever happens here.
                match self.messaging.fetch_message(binding, message_ref).await {
                    Ok(message) => {
                        if let Err(e) = self.messaging.delete_message(&message).await {
                            warn!(plan_id = plan.id, message = %message_ref, error = %e, "failed to delete practice message");
                        }
                    }
                    Err(e) => {
                        warn!(plan_id = plan.id, message = %message_ref, error = %e, "failed to fetch practice message");
                    }
                }
            }

            // Count children before the delete cascades them away.
            let records = u64::try_from(self.repo.list_practice_records(plan.id)?.len())
                .unwrap_or(u64::MAX);
            self.repo.delete_practice_plan(plan.id)?;
            info!(plan_id = plan.id, owner = %plan.owner, records, "practice plan removed");
            result.add_practice_records_removed(records);
            result.record_practice_removed();
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Phase 6: orphan quiz history
    // -----------------------------------------------------------------------

    fn clean_orphan_quiz_history(&self, result: &mut SyncResult) -> StoreResult<()> {
        let removed = self.repo.delete_orphan_quiz_history()?;
        if removed > 0 {
            info!(removed, "orphan quiz history removed");
        }
        result.set_orphan_quiz_history_removed(removed);
        Ok(())
    }
}

/// Attendees outside the roster, each listed once.
fn stale_attendees<'r>(attendees: &'r [String], roster: &Roster) -> Vec<&'r str> {
    let mut seen = HashSet::new();
    attendees
        .iter()
        .map(String::as_str)
        .filter(|a| !roster.contains(a) && seen.insert(*a))
        .collect()
}
