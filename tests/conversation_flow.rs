//! End-to-end conversation sessions driven by scripted input.
//!
//! Each test runs a full session through `ConversationController::run` and
//! checks what the assistant said and which collaborators it touched.

use aide::actions::reminder::REMINDER_APOLOGY;
use aide::actions::{GREETING, calendar};
use aide::conversation::ConversationController;
use aide::services::CollaboratorError;
use aide::speech::RecognitionError;
use aide::testing::{MockBrowser, MockCalendar, MockLauncher, ScriptedListener, TestHarness};

fn run_session(harness: &TestHarness, script: ScriptedListener) {
    let mut controller = ConversationController::new(script, harness.context());
    controller.run();
}

#[test]
fn mixed_session_ends_on_goodbye() {
    let harness = TestHarness::new();
    run_session(
        &harness,
        ScriptedListener::new([
            "what time is it",
            "open notepad",
            "search rust programming",
            "goodbye",
            "news",
        ]),
    );

    assert_eq!(
        harness.spoken(),
        vec![
            GREETING,
            "The current time is 02:05 PM",
            "Opening notepad",
            "Searching for rust programming",
            "Goodbye!",
        ]
    );
    assert_eq!(harness.launcher.launched(), vec!["notepad"]);
    assert_eq!(
        harness.browser.opened(),
        vec!["https://www.google.com/search?q=rust%20programming"]
    );
}

#[test]
fn weather_location_keeps_inner_whitespace() {
    let harness = TestHarness::new();
    run_session(&harness, ScriptedListener::new(["What's the weather in Boston"]));

    assert_eq!(harness.weather.queries(), vec!["what's the  in boston"]);
}

#[test]
fn news_reads_three_headlines() {
    let harness = TestHarness::new();
    run_session(&harness, ScriptedListener::new(["any news today"]));

    assert_eq!(
        harness.spoken()[1..],
        [
            "Here are today's top headlines:",
            "Headline one",
            "Headline two",
            "Headline three",
        ]
    );
}

#[test]
fn reminder_is_confirmed_persisted_and_scheduled() {
    let harness = TestHarness::new();
    run_session(
        &harness,
        ScriptedListener::new(["Set a reminder at 6 pm to water the plants"]),
    );

    assert_eq!(
        harness.spoken()[1],
        "I'll remind you to water the plants at 6 pm"
    );
    let stored = harness.store.list().unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].message, "water the plants");
    assert_eq!(harness.scheduler.len(), 1);
}

#[test]
fn malformed_reminder_is_refused() {
    let harness = TestHarness::new();
    run_session(&harness, ScriptedListener::new(["set a reminder for later"]));

    assert_eq!(harness.spoken()[1], REMINDER_APOLOGY);
    assert_eq!(harness.store.count().unwrap(), 0);
    assert!(harness.scheduler.is_empty());
}

#[test]
fn unknown_app_and_failing_browser_are_reported() {
    let harness = TestHarness::new()
        .with_launcher(MockLauncher::new())
        .with_browser(MockBrowser::failing());
    run_session(
        &harness,
        ScriptedListener::new(["open slack", "search weekend plans"]),
    );

    assert_eq!(
        harness.spoken()[1..],
        [
            "Sorry, I don't know how to open that application",
            "Sorry, I couldn't open the browser for that search",
        ]
    );
    assert!(harness.launcher.launched().is_empty());
}

#[test]
fn calendar_listing_and_creation() {
    let harness = TestHarness::new();
    run_session(
        &harness,
        ScriptedListener::new([
            "show my calendar events",
            "add event",
            "Dentist",
            "2025-01-20T09:00:00",
            "2025-01-20T10:00:00",
            "exit",
        ]),
    );

    assert_eq!(
        harness.spoken(),
        vec![
            GREETING,
            "Here are your upcoming events:",
            "2025-01-12T09:00:00Z: Standup",
            calendar::TITLE_PROMPT,
            calendar::START_PROMPT,
            calendar::END_PROMPT,
            "I've added Dentist to your calendar.",
            "Goodbye!",
        ]
    );
    let added = harness.calendar.added();
    assert_eq!(added.len(), 1);
    assert_eq!(added[0].summary, "Dentist");
    assert_eq!(added[0].start, "2025-01-20T09:00:00");
    assert_eq!(added[0].end, "2025-01-20T10:00:00");
}

#[test]
fn empty_calendar_is_announced() {
    let harness = TestHarness::new().with_calendar(MockCalendar::new(Vec::<String>::new()));
    run_session(&harness, ScriptedListener::new(["calendar events please"]));

    assert_eq!(harness.spoken()[1], "You have no upcoming events.");
}

#[test]
fn calendar_outage_is_reported() {
    let harness = TestHarness::new().with_calendar(MockCalendar::failing(
        CollaboratorError::Http("connection refused".to_owned()),
    ));
    run_session(&harness, ScriptedListener::new(["calendar events"]));

    assert_eq!(
        harness.spoken()[1],
        "Sorry, I couldn't fetch your calendar events."
    );
}

#[test]
fn recognition_failures_do_not_end_the_session() {
    let harness = TestHarness::new();
    let script = ScriptedListener::from_results([
        Err(RecognitionError::NoSpeechDetected),
        Err(RecognitionError::Service("offline".to_owned())),
        Ok("what time is it".to_owned()),
    ]);
    run_session(&harness, script);

    let spoken = harness.spoken();
    assert_eq!(spoken.len(), 3);
    assert_eq!(spoken[2], "The current time is 02:05 PM");
}

#[test]
fn closed_input_ends_without_farewell() {
    let harness = TestHarness::new();
    run_session(&harness, ScriptedListener::new(["tell me a joke"]));

    assert_eq!(harness.spoken(), vec![GREETING]);
}
