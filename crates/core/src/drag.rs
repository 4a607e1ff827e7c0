use std::collections::HashMap;

use crate::api::ApiError;
use crate::board::{BoardProjection, CardPosition};
use crate::model::TaskStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveState {
    Idle,
    Pending,
    OptimisticallyApplied,
    Reconciled,
    RolledBack,
}

/// What the card looked like before the optimistic change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveSnapshot {
    pub status: TaskStatus,
    pub label: String,
    pub position: CardPosition,
    pub generation: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    pub task_id: String,
    pub status: TaskStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    /// Dropped onto the column it already belongs to.
    Unchanged,
    /// No valid target. The card stays where it was.
    Rejected(RejectReason),
    /// Card moved optimistically; the update must be sent.
    Applied(StatusUpdate),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    UnknownColumn(String),
    UnknownCard,
    MoveInFlight,
}

#[derive(Debug, Clone)]
struct InFlightMove {
    state: MoveState,
    snapshot: MoveSnapshot,
}

/// Per-card drag state machine with snapshot rollback.
#[derive(Debug, Default)]
pub struct DragController {
    moves: HashMap<String, InFlightMove>,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, task_id: &str) -> MoveState {
        self.moves
            .get(task_id)
            .map(|entry| entry.state)
            .unwrap_or(MoveState::Idle)
    }

    pub fn in_flight(&self) -> usize {
        self.moves.len()
    }

    /// Handles a card landing on `column_id` at `index` (end of column when `None`).
    pub fn drop_card(
        &mut self,
        board: &mut BoardProjection,
        task_id: &str,
        column_id: &str,
        index: Option<usize>,
    ) -> DropOutcome {
        if self.moves.contains_key(task_id) {
            tracing::debug!(task_id, "card already has a move in flight; ignoring drop");
            return DropOutcome::Rejected(RejectReason::MoveInFlight);
        }
        let Some(card) = board.card(task_id) else {
            return DropOutcome::Rejected(RejectReason::UnknownCard);
        };
        let Some(position) = board.locate(task_id) else {
            return DropOutcome::Rejected(RejectReason::UnknownCard);
        };
        let snapshot = MoveSnapshot {
            status: card.status,
            label: card.label.clone(),
            position,
            generation: board.generation(),
        };
        let current = snapshot.status;

        self.moves.insert(
            task_id.to_string(),
            InFlightMove {
                state: MoveState::Pending,
                snapshot,
            },
        );

        let target = match TaskStatus::from_column_id(column_id) {
            Some(target) if target == current => {
                self.moves.remove(task_id);
                return DropOutcome::Unchanged;
            }
            Some(target) => target,
            None => {
                self.moves.remove(task_id);
                tracing::debug!(task_id, column_id, "drop target is not a status column");
                return DropOutcome::Rejected(RejectReason::UnknownColumn(column_id.to_string()));
            }
        };

        if let Some((_, mut card)) = board.take(task_id) {
            card.show_status(target);
            board.insert(target, index.unwrap_or(usize::MAX), card);
        }
        if let Some(entry) = self.moves.get_mut(task_id) {
            entry.state = MoveState::OptimisticallyApplied;
        }

        DropOutcome::Applied(StatusUpdate {
            task_id: task_id.to_string(),
            status: target,
        })
    }

    /// Applies the backend verdict and returns the settled state.
    pub fn settle(
        &mut self,
        board: &mut BoardProjection,
        task_id: &str,
        result: Result<(), ApiError>,
    ) -> MoveState {
        let Some(entry) = self.moves.remove(task_id) else {
            tracing::debug!(task_id, "status result for a card with no pending move");
            return MoveState::Idle;
        };

        match result {
            Ok(()) => {
                tracing::debug!(task_id, "status update confirmed");
                MoveState::Reconciled
            }
            Err(err) => {
                tracing::error!(task_id, error = %err, "status update failed; reverting card");
                Self::restore(board, task_id, &entry.snapshot);
                MoveState::RolledBack
            }
        }
    }

    fn restore(board: &mut BoardProjection, task_id: &str, snapshot: &MoveSnapshot) {
        // A newer query response already reflects the server's state.
        if board.generation() != snapshot.generation {
            return;
        }
        if let Some((_, mut card)) = board.take(task_id) {
            card.show_status(snapshot.status);
            card.label = snapshot.label.clone();
            board.insert(snapshot.position.column, snapshot.position.index, card);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Task;
    use pretty_assertions::assert_eq;

    fn board() -> BoardProjection {
        BoardProjection::from_tasks(&[
            Task::new("1", TaskStatus::Backlog),
            Task::new("2", TaskStatus::Backlog),
            Task::new("3", TaskStatus::InProgress),
        ])
    }

    #[test]
    fn drop_on_other_column_applies_optimistically() {
        let mut board = board();
        let mut drag = DragController::new();

        let outcome = drag.drop_card(&mut board, "1", "done", None);

        assert_eq!(
            outcome,
            DropOutcome::Applied(StatusUpdate {
                task_id: "1".into(),
                status: TaskStatus::Done,
            })
        );
        let card = board.card("1").unwrap();
        assert_eq!(card.label, "Status: Done");
        assert_eq!(card.status, TaskStatus::Done);
        assert_eq!(board.locate("1").unwrap().column, TaskStatus::Done);
        assert_eq!(drag.state("1"), MoveState::OptimisticallyApplied);
        assert!(board.is_consistent());
    }

    #[test]
    fn failure_restores_status_label_and_position() {
        let mut board = board();
        let before = board.clone();
        let mut drag = DragController::new();

        drag.drop_card(&mut board, "1", "todo", Some(0));
        let state = drag.settle(
            &mut board,
            "1",
            Err(ApiError::rejected("Task not found")),
        );

        assert_eq!(state, MoveState::RolledBack);
        assert_eq!(board, before);
        assert_eq!(drag.state("1"), MoveState::Idle);
    }

    #[test]
    fn success_keeps_the_new_status() {
        let mut board = board();
        let mut drag = DragController::new();

        drag.drop_card(&mut board, "3", "backlog", Some(1));
        let state = drag.settle(&mut board, "3", Ok(()));

        assert_eq!(state, MoveState::Reconciled);
        let ids: Vec<&str> = board
            .column(TaskStatus::Backlog)
            .cards
            .iter()
            .map(|card| card.id())
            .collect();
        assert_eq!(ids, vec!["1", "3", "2"]);
        assert!(board.is_consistent());
        assert_eq!(drag.in_flight(), 0);
    }

    #[test]
    fn same_column_is_a_no_op() {
        let mut board = board();
        let before = board.clone();
        let mut drag = DragController::new();

        assert_eq!(
            drag.drop_card(&mut board, "3", "inprogress", None),
            DropOutcome::Unchanged
        );
        assert_eq!(board, before);
        assert_eq!(drag.in_flight(), 0);
    }

    #[test]
    fn unknown_column_leaves_card_in_place() {
        let mut board = board();
        let before = board.clone();
        let mut drag = DragController::new();

        assert_eq!(
            drag.drop_card(&mut board, "2", "archive", None),
            DropOutcome::Rejected(RejectReason::UnknownColumn("archive".into()))
        );
        assert_eq!(board, before);
    }

    #[test]
    fn second_drop_waits_for_first_to_settle() {
        let mut board = board();
        let mut drag = DragController::new();

        drag.drop_card(&mut board, "2", "todo", None);
        assert_eq!(
            drag.drop_card(&mut board, "2", "done", None),
            DropOutcome::Rejected(RejectReason::MoveInFlight)
        );
    }

    #[test]
    fn rollback_skips_rebuilt_projection() {
        let mut board = board();
        let mut drag = DragController::new();

        drag.drop_card(&mut board, "1", "done", None);
        let fresh = BoardProjection::from_tasks(&[Task::new("1", TaskStatus::Backlog)]);
        board.replace_with(fresh.clone());

        let state = drag.settle(&mut board, "1", Err(ApiError::Transport("timeout".into())));

        assert_eq!(state, MoveState::RolledBack);
        assert_eq!(board.columns(), fresh.columns());
    }
}
