use cook_mode_lib::narration::{EndReason, NarrationChannel, VoicePreferences};
use cook_mode_lib::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn pasta() -> Vec<String> {
    vec![
        "Bring a large pot of water to a boil".to_string(),
        "Cook the spaghetti for 9 minutes".to_string(),
        "Toss with the sauce and serve".to_string(),
    ]
}

fn session() -> (CookSession, ManualClock, SpeechLog) {
    let clock = ManualClock::new();
    let (speech, log) = RecordingSpeech::new();
    let host = HostCapabilities::new(Box::new(speech), Arc::new(clock.clone()));
    let session = CookSession::new(pasta(), host, &CookModeConfig::default());
    (session, clock, log)
}

#[test]
fn one_minute_timer_completes_once() {
    let (mut session, clock, log) = session();
    session.start();
    let id = session.create_timer(1.0, Some("Garlic")).unwrap();

    clock.advance_secs(60);
    session.pump();
    let timer = session.timer(id).unwrap();
    assert_eq!(timer.remaining_seconds, 0);
    assert!(!timer.is_running);

    clock.advance_secs(5);
    session.pump();
    assert_eq!(session.timer(id).unwrap().remaining_seconds, 0);

    let completions = log
        .spoken()
        .iter()
        .filter(|text| text.as_str() == "Timer complete! Garlic")
        .count();
    assert_eq!(completions, 1);
}

#[test]
fn timers_of_different_lengths_are_independent() {
    let (mut session, clock, _log) = session();
    session.start();
    let a = session.create_timer(1.0, None).unwrap();
    let b = session.create_timer(2.0, None).unwrap();

    clock.advance_secs(60);
    session.pump();

    assert!(session.timer(a).unwrap().is_finished());
    assert_eq!(session.timer(b).unwrap().remaining_seconds, 60);
    assert!(session.timer(b).unwrap().is_running);
}

#[test]
fn second_utterance_supersedes_first() {
    let (speech, log) = RecordingSpeech::new();
    let (tx, mut rx) = cook_mode_lib::events::channel();
    let mut narration = NarrationChannel::new(Box::new(speech), tx, VoicePreferences::default());

    assert_eq!(narration.speak("A"), None);
    let ended_a = narration.speak("B").expect("A is cut off");
    assert_eq!(ended_a.reason, EndReason::Cancelled);

    let mut ends = vec![ended_a];
    while let Ok(SessionEvent::Speech(event)) = rx.try_recv() {
        ends.extend(narration.handle(event));
    }
    assert!(narration.is_speaking());

    log.finish_current();
    while let Ok(SessionEvent::Speech(event)) = rx.try_recv() {
        ends.extend(narration.handle(event));
    }
    assert!(!narration.is_speaking());

    assert_eq!(ends.len(), 2);
    assert_eq!(ends[0].reason, EndReason::Cancelled);
    assert_eq!(ends[1].reason, EndReason::Finished);
    assert_ne!(ends[0].id, ends[1].id);
}

#[test]
fn exit_tears_down_timers_and_speech() {
    let (mut session, clock, log) = session();
    session.start();
    clock.advance(Duration::from_millis(500));
    session.next();
    session.create_timer(5.0, None).unwrap();
    session.create_timer(10.0, None).unwrap();
    clock.advance_secs(3);
    session.pump();
    assert!(session.is_speaking());

    session.exit();

    assert!(session.timers().is_empty());
    assert!(!session.is_speaking());
    assert_eq!(session.current_step_index(), 0);
    assert!(!session.is_active());

    log.clear();
    clock.advance_secs(600);
    session.pump();
    assert!(session.timers().is_empty());
    assert!(log.spoken().is_empty());
}

#[test]
fn next_on_last_step_reports_completion_and_stays_active() {
    let (mut session, _clock, _log) = session();
    let completions = Arc::new(AtomicUsize::new(0));
    let counter = completions.clone();
    session.set_on_complete(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    session.start();
    session.go_to_step(2);
    session.next();

    assert_eq!(session.current_step_index(), 2);
    assert_eq!(completions.load(Ordering::SeqCst), 1);
    assert!(session.is_active());
}

#[test]
fn out_of_range_targets_leave_step_unchanged() {
    let (mut session, _clock, _log) = session();
    session.start();
    session.go_to_step(1);

    session.go_to_step(session.total_steps());
    session.go_to_step(usize::MAX);
    assert_eq!(session.current_step_index(), 1);
}

#[test]
fn paused_timer_holds_then_finishes_after_resume() {
    let (mut session, clock, log) = session();
    session.start();
    let id = session.create_timer(1.0, Some("Rest dough")).unwrap();

    clock.advance_secs(20);
    session.pump();
    assert_eq!(session.toggle_timer(id), Some(false));

    clock.advance_secs(100);
    session.pump();
    assert_eq!(session.timer(id).unwrap().remaining_seconds, 40);

    assert_eq!(session.toggle_timer(id), Some(true));
    clock.advance_secs(10);
    session.pump();
    assert_eq!(log.last().as_deref(), Some("30 seconds remaining"));

    clock.advance_secs(30);
    session.pump();
    assert!(session.timer(id).unwrap().is_finished());
    assert_eq!(log.last().as_deref(), Some("Timer complete! Rest dough"));
}

#[test]
fn removed_timer_stops_ticking() {
    let (mut session, clock, _log) = session();
    session.start();
    let keep = session.create_timer(3.0, None).unwrap();
    let gone = session.create_timer(3.0, None).unwrap();

    clock.advance_secs(10);
    assert!(session.remove_timer(gone));
    session.pump();

    assert!(session.timer(gone).is_none());
    assert_eq!(session.timer(keep).unwrap().remaining_seconds, 170);
    assert!(!session.remove_timer(gone));
}

#[test]
fn scaled_ingredients_for_recipe() {
    let recipe = Recipe {
        id: "pasta".to_string(),
        name: "Weeknight pasta".to_string(),
        servings: Some(2),
        ingredients: vec![
            "1/2 tsp salt".to_string(),
            "3-4 cloves garlic".to_string(),
            "Pepper to taste".to_string(),
        ],
        instructions: pasta(),
    };

    let mut scaler = ServingsScaler::for_recipe(&recipe);
    scaler.set_target(4);
    assert_eq!(
        scaler.scale_ingredients(&recipe.ingredients),
        vec!["1 tsp salt", "7 cloves garlic", "Pepper to taste"]
    );
}

#[tokio::test(start_paused = true)]
async fn tokio_clock_drives_a_session() {
    let clock = TokioClock::current().unwrap();
    let (speech, log) = RecordingSpeech::new();
    let host = HostCapabilities::new(Box::new(speech), Arc::new(clock));
    let mut session = CookSession::new(pasta(), host, &CookModeConfig::default());

    session.start();
    let id = session.create_timer(1.0, Some("Pasta water")).unwrap();

    let mut completed = None;
    while completed.is_none() {
        if let Some(TimerEvent::Completed { id, .. }) = session.process_next().await {
            completed = Some(id);
        }
    }

    assert_eq!(completed, Some(id));
    assert!(session.timer(id).unwrap().is_finished());
    assert!(log
        .spoken()
        .contains(&"Let's start cooking! Step 1: Bring a large pot of water to a boil".to_string()));
}
