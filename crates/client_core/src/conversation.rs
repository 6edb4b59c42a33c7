use chrono::{DateTime, Utc};
use shared::{
    domain::{TurnId, TurnRole},
    protocol::SourceRef,
};

/// One entry in the conversation log. `sources` is empty for user turns
/// and carries the cited passages on assistant turns.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationTurn {
    pub id: TurnId,
    pub role: TurnRole,
    pub content: String,
    pub sources: Vec<SourceRef>,
    pub timestamp: DateTime<Utc>,
    /// Set on a user turn whose query failed before an answer arrived.
    /// The question stays visible in the log.
    pub unanswered: bool,
}

/// Append-only conversation log with the per-submission state machine.
///
/// A submission moves `Idle -> Submitting -> Idle`. The user turn is
/// appended optimistically on entry and is either followed by exactly
/// one assistant turn (`complete`) or marked unanswered (`fail`).
#[derive(Debug, Default)]
pub struct ConversationLog {
    turns: Vec<ConversationTurn>,
    next_turn_id: u64,
    pending: Option<TurnId>,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// True while a question is awaiting its answer.
    pub fn is_submitting(&self) -> bool {
        self.pending.is_some()
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    fn next_id(&mut self) -> TurnId {
        let id = TurnId(self.next_turn_id);
        self.next_turn_id += 1;
        id
    }

    /// Appends the optimistic user turn and enters `Submitting`. Gating
    /// (blank input, ready documents, no in-flight submission) is the
    /// caller's responsibility.
    pub(crate) fn begin(&mut self, question: &str) -> ConversationTurn {
        debug_assert!(self.pending.is_none(), "submission already in flight");
        let id = self.next_id();
        let turn = ConversationTurn {
            id,
            role: TurnRole::User,
            content: question.to_string(),
            sources: Vec::new(),
            timestamp: Utc::now(),
            unanswered: false,
        };
        self.pending = Some(id);
        self.turns.push(turn.clone());
        turn
    }

    /// Appends the assistant turn for the pending submission and
    /// returns to `Idle`.
    pub(crate) fn complete(
        &mut self,
        answer: String,
        sources: Vec<SourceRef>,
    ) -> ConversationTurn {
        self.pending = None;
        let id = self.next_id();
        let turn = ConversationTurn {
            id,
            role: TurnRole::Assistant,
            content: answer,
            sources,
            timestamp: Utc::now(),
            unanswered: false,
        };
        self.turns.push(turn.clone());
        turn
    }

    /// Marks the pending user turn unanswered and returns to `Idle`.
    pub(crate) fn fail(&mut self) {
        if let Some(id) = self.pending.take() {
            if let Some(turn) = self.turns.iter_mut().find(|turn| turn.id == id) {
                turn.unanswered = true;
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/conversation_tests.rs"]
mod tests;
