//! Reminder handler: parse, persist, schedule.

use tracing::{info, warn};

use super::{ActionContext, Reply};
use crate::error::{AssistantError, Result};
use crate::intent::ReminderRequest;
use crate::scheduler::{JobId, TimeOfDay};

/// Spoken whenever a reminder cannot be set.
pub const REMINDER_APOLOGY: &str = "Sorry, I couldn't set that reminder. Please try again.";

/// Sets daily reminders: appends them to the store and registers a callback
/// that speaks `"Reminder: <message>"` each day.
pub struct ReminderAction<'a> {
    ctx: &'a ActionContext,
}

impl<'a> ReminderAction<'a> {
    pub fn new(ctx: &'a ActionContext) -> Self {
        Self { ctx }
    }

    /// Handle a `"... reminder at <time> to <message>"` command.
    pub fn set(&self, command: &str) -> Reply {
        match self.try_set(command) {
            Ok(request) => Reply::say(format!(
                "I'll remind you to {} at {}",
                request.message, request.time
            )),
            Err(e) => {
                warn!("reminder not set: {e}");
                Reply::say(REMINDER_APOLOGY)
            }
        }
    }

    /// The time is validated before anything is written, so a rejected
    /// reminder leaves neither a row nor a job behind.
    fn try_set(&self, command: &str) -> Result<ReminderRequest> {
        let request = ReminderRequest::parse(command)?;
        let time = TimeOfDay::parse(&request.time)?;

        let stored = self.ctx.store.add(&request.time, &request.message)?;
        let id = self.schedule(time, &request.message)?;
        info!("reminder {} registered as {id}", stored.id);
        Ok(request)
    }

    fn schedule(&self, time: TimeOfDay, message: &str) -> Result<JobId> {
        let speaker = self.ctx.speaker.clone();
        let spoken = format!("Reminder: {message}");
        self.ctx
            .scheduler
            .schedule_at(self.ctx.now(), time, message, move || speaker.say(&spoken))
            .map_err(AssistantError::from)
    }

    /// Re-register every stored reminder with the scheduler.
    ///
    /// Rows whose time no longer parses are skipped. Returns how many were
    /// registered.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn restore_from_store(&self) -> Result<usize> {
        let mut restored = 0;
        for reminder in self.ctx.store.list()? {
            let time = match TimeOfDay::parse(&reminder.fire_spec) {
                Ok(time) => time,
                Err(e) => {
                    warn!("skipping stored reminder {}: {e}", reminder.id);
                    continue;
                }
            };
            self.schedule(time, &reminder.message)?;
            restored += 1;
        }
        info!("restored {restored} reminders");
        Ok(restored)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use crate::testing::{TestHarness, fixed_now};
    use chrono::Duration;

    #[test]
    fn confirms_stores_and_schedules() {
        let harness = TestHarness::new();
        let ctx = harness.context();
        let reply = ReminderAction::new(&ctx).set("set a reminder at 3 pm to call mom");

        assert_eq!(reply.lines(), ["I'll remind you to call mom at 3 pm"]);

        let stored = harness.store.list().unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].fire_spec, "3 pm");
        assert_eq!(stored[0].message, "call mom");

        let jobs = harness.scheduler.jobs().unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].label, "call mom");
        assert_eq!(jobs[0].next_fire, fixed_now().date().and_hms_opt(15, 0, 0).unwrap());
    }

    #[test]
    fn firing_speaks_the_message() {
        let harness = TestHarness::new();
        let ctx = harness.context();
        ReminderAction::new(&ctx).set("reminder at 3 pm to call mom");
        harness.voice.clear();

        let fire_at = fixed_now().date().and_hms_opt(15, 0, 0).unwrap();
        assert_eq!(harness.scheduler.tick_at(fire_at).unwrap(), 1);
        assert_eq!(harness.spoken(), vec!["Reminder: call mom"]);
    }

    #[test]
    fn passed_time_waits_until_tomorrow() {
        let harness = TestHarness::new();
        let ctx = harness.context();
        ReminderAction::new(&ctx).set("reminder at 9 am to stretch");

        let jobs = harness.scheduler.jobs().unwrap();
        let tomorrow_nine = fixed_now().date().and_hms_opt(9, 0, 0).unwrap() + Duration::days(1);
        assert_eq!(jobs[0].next_fire, tomorrow_nine);
        assert_eq!(harness.scheduler.tick_at(fixed_now()).unwrap(), 0);
    }

    #[test]
    fn malformed_command_apologises_without_side_effects() {
        for command in [
            "set a reminder at 3 pm",
            "set a reminder to call mom",
            "reminder at noonish to call mom",
        ] {
            let harness = TestHarness::new();
            let ctx = harness.context();
            let reply = ReminderAction::new(&ctx).set(command);
            assert_eq!(reply.lines(), [REMINDER_APOLOGY], "command: {command}");
            assert_eq!(harness.store.count().unwrap(), 0);
            assert!(harness.scheduler.is_empty());
        }
    }

    #[test]
    fn restore_registers_parseable_rows() {
        let harness = TestHarness::new();
        harness.store.add("3 pm", "call mom").unwrap();
        harness.store.add("whenever", "someday").unwrap();
        harness.store.add("08:30", "standup").unwrap();

        let ctx = harness.context();
        let restored = ReminderAction::new(&ctx).restore_from_store().unwrap();
        assert_eq!(restored, 2);

        let labels: Vec<String> = harness
            .scheduler
            .jobs()
            .unwrap()
            .into_iter()
            .map(|j| j.label)
            .collect();
        assert_eq!(labels, vec!["call mom", "standup"]);
    }
}
