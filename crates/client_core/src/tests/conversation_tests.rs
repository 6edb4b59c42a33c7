use super::*;
use shared::protocol::SourceRef;

#[test]
fn successful_submission_appends_user_then_assistant() {
    let mut log = ConversationLog::new();

    let user_turn = log.begin("What is scope 2 emissions?");
    assert!(log.is_submitting());
    assert_eq!(user_turn.role, TurnRole::User);
    assert!(user_turn.sources.is_empty());

    let sources = vec![SourceRef {
        filename: "esg.pdf".to_string(),
        chunk_index: 3,
    }];
    let answer = log.complete("Purchased electricity.".to_string(), sources.clone());
    assert!(!log.is_submitting());
    assert_eq!(answer.role, TurnRole::Assistant);
    assert_eq!(answer.sources, sources);

    let turns = log.turns();
    assert_eq!(turns.len(), 2);
    assert_eq!(turns[0].role, TurnRole::User);
    assert_eq!(turns[1].role, TurnRole::Assistant);
}

#[test]
fn failed_submission_keeps_question_marked_unanswered() {
    let mut log = ConversationLog::new();
    log.begin("anything in the report?");
    log.fail();

    assert!(!log.is_submitting());
    let turns = log.turns();
    assert_eq!(turns.len(), 1);
    assert_eq!(turns[0].role, TurnRole::User);
    assert!(turns[0].unanswered);
}

#[test]
fn turn_ids_increase_across_submissions() {
    let mut log = ConversationLog::new();
    log.begin("first");
    log.complete("one".to_string(), Vec::new());
    log.begin("second");
    log.fail();
    log.begin("third");
    log.complete("three".to_string(), Vec::new());

    let ids: Vec<_> = log.turns().iter().map(|turn| turn.id.0).collect();
    assert_eq!(ids, vec![0, 1, 2, 3, 4]);
}

#[test]
fn fail_without_pending_submission_is_a_no_op() {
    let mut log = ConversationLog::new();
    log.begin("kept");
    log.complete("answered".to_string(), Vec::new());
    log.fail();

    assert!(log.turns().iter().all(|turn| !turn.unanswered));
    assert_eq!(log.len(), 2);
}
