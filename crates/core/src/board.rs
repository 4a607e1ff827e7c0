use crate::model::{format_date, Task, TaskStatus};

pub const NOT_AVAILABLE: &str = "n/a";
pub const LIST_EMPTY_MARKER: &str = "No tasks found";

pub const LIST_HEADERS: [&str; 13] = [
    "Task ID",
    "POS ID",
    "POS Name",
    "Rec Date",
    "Certified",
    "Description",
    "Status",
    "Priority",
    "Blocker",
    "Responsible",
    "Start Date",
    "Due Date",
    "Notes",
];

/// A rendered card. `label` and `status` mirror the visible text and the
/// stored status attribute of the card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub task: Task,
    pub label: String,
    pub status: TaskStatus,
}

impl Card {
    fn from_task(task: Task) -> Self {
        Self {
            label: task.status.card_label(),
            status: task.status,
            task,
        }
    }

    pub fn id(&self) -> &str {
        &self.task.id
    }

    pub(crate) fn show_status(&mut self, status: TaskStatus) {
        self.label = status.card_label();
        self.status = status;
        self.task.status = status;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardColumn {
    pub status: TaskStatus,
    pub cards: Vec<Card>,
}

impl BoardColumn {
    fn new(status: TaskStatus) -> Self {
        Self {
            status,
            cards: Vec::new(),
        }
    }

    pub fn id(&self) -> &'static str {
        self.status.column_id()
    }

    pub fn empty_marker(&self) -> Option<String> {
        self.cards.is_empty().then(|| self.status.empty_marker())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardPosition {
    pub column: TaskStatus,
    pub index: usize,
}

/// Four-column projection of one query response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardProjection {
    columns: [BoardColumn; 4],
    generation: u64,
}

impl Default for BoardProjection {
    fn default() -> Self {
        Self {
            columns: TaskStatus::ALL.map(BoardColumn::new),
            generation: 0,
        }
    }
}

impl BoardProjection {
    /// Partitions tasks by status, keeping server order within each column.
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let mut board = Self::default();
        for task in tasks {
            board.columns[task.status.index()]
                .cards
                .push(Card::from_task(task.clone()));
        }
        board
    }

    /// Swaps in a freshly built projection, bumping the generation.
    pub fn replace_with(&mut self, next: BoardProjection) {
        let generation = self.generation + 1;
        *self = next;
        self.generation = generation;
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn columns(&self) -> &[BoardColumn] {
        &self.columns
    }

    pub fn column(&self, status: TaskStatus) -> &BoardColumn {
        &self.columns[status.index()]
    }

    pub fn task_count(&self) -> usize {
        self.columns.iter().map(|column| column.cards.len()).sum()
    }

    pub fn locate(&self, task_id: &str) -> Option<CardPosition> {
        self.columns.iter().find_map(|column| {
            column
                .cards
                .iter()
                .position(|card| card.id() == task_id)
                .map(|index| CardPosition {
                    column: column.status,
                    index,
                })
        })
    }

    pub fn card(&self, task_id: &str) -> Option<&Card> {
        let position = self.locate(task_id)?;
        self.columns[position.column.index()]
            .cards
            .get(position.index)
    }

    pub(crate) fn take(&mut self, task_id: &str) -> Option<(CardPosition, Card)> {
        let position = self.locate(task_id)?;
        let card = self.columns[position.column.index()]
            .cards
            .remove(position.index);
        Some((position, card))
    }

    /// Inserts at `index`, clamped to the column length.
    pub(crate) fn insert(&mut self, column: TaskStatus, index: usize, card: Card) {
        let cards = &mut self.columns[column.index()].cards;
        let index = index.min(cards.len());
        cards.insert(index, card);
    }

    /// True when every card sits in the column its stored status names.
    pub fn is_consistent(&self) -> bool {
        self.columns.iter().all(|column| {
            column
                .cards
                .iter()
                .all(|card| card.status == column.status && card.label == column.status.card_label())
        })
    }

    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.columns
            .iter()
            .flat_map(|column| column.cards.iter().map(|card| &card.task))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRow {
    pub task_id: String,
    pub cells: [String; 13],
}

impl ListRow {
    fn from_task(task: &Task) -> Self {
        let text = |value: Option<&str>| value.unwrap_or(NOT_AVAILABLE).to_string();
        let date = |value| format_date(value).unwrap_or_else(|| NOT_AVAILABLE.to_string());
        Self {
            task_id: task.id.clone(),
            cells: [
                task.id.clone(),
                text(task.pos_id.as_deref()),
                text(task.pos_name.as_deref()),
                date(task.reconciliation_date),
                task.certified.to_string(),
                text(task.description.as_deref()),
                task.status.as_str().to_string(),
                text(task.priority.as_deref()),
                text(task.blocker_description.as_deref()),
                text(task.blocker_responsible.as_deref()),
                date(task.start_date),
                date(task.due_date),
                text(task.notes.as_deref()),
            ],
        }
    }
}

/// Tabular projection of the same response, in server order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListProjection {
    rows: Vec<ListRow>,
}

impl ListProjection {
    pub fn from_tasks<'a, I>(tasks: I) -> Self
    where
        I: IntoIterator<Item = &'a Task>,
    {
        Self {
            rows: tasks.into_iter().map(ListRow::from_task).collect(),
        }
    }

    pub fn rows(&self) -> &[ListRow] {
        &self.rows
    }

    pub fn empty_marker(&self) -> Option<&'static str> {
        self.rows.is_empty().then_some(LIST_EMPTY_MARKER)
    }
}
