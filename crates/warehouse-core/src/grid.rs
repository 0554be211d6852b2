//! # Table Grid
//!
//! Browser-side state of a loaded table: the rows as read, the rows as
//! edited, and which of them need an UPDATE or an INSERT on save.
//!
//! ## Row States
//! ```text
//!            load()                 set_cell()
//!   ───────────────► Unchanged ─────────────────► Modified ──┐
//!                        ▲                                    │
//!                        │          accept_changes()          │
//!                        └────────────────────────────────────┤
//!   add_row()                                                 │
//!   ───────────────► Added ───────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::schema::{Cell, RowSet};
use crate::value::cell_to_string;

/// Edit state of a grid row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RowState {
    Unchanged,
    Modified,
    Added,
}

/// An UPDATE the grid needs on save.
#[derive(Debug, Clone, PartialEq)]
pub struct RowUpdate {
    pub row: usize,
    pub key: Cell,
    pub changes: Vec<(String, Cell)>,
}

/// An INSERT the grid needs on save.
#[derive(Debug, Clone, PartialEq)]
pub struct RowInsert {
    pub row: usize,
    pub values: Vec<(String, Cell)>,
}

/// A loaded table with edit tracking.
#[derive(Debug, Clone)]
pub struct TableGrid {
    table: String,
    current: RowSet,
    original: Vec<Option<Vec<Cell>>>,
    states: Vec<RowState>,
    selected: Option<usize>,
}

impl TableGrid {
    /// Wraps freshly loaded rows; nothing is selected.
    pub fn load(table: impl Into<String>, rows: RowSet) -> Self {
        let original = rows.rows.iter().cloned().map(Some).collect();
        let states = vec![RowState::Unchanged; rows.len()];
        TableGrid {
            table: table.into(),
            current: rows,
            original,
            states,
            selected: None,
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn rows(&self) -> &RowSet {
        &self.current
    }

    pub fn state(&self, row: usize) -> Option<RowState> {
        self.states.get(row).copied()
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Edit and delete are only offered with a row selected.
    pub fn is_row_selected(&self) -> bool {
        self.selected.is_some()
    }

    pub fn select(&mut self, row: Option<usize>) -> CoreResult<()> {
        if let Some(index) = row {
            self.check_row(index)?;
        }
        self.selected = row;
        Ok(())
    }

    /// Appends a blank row and selects it.
    pub fn add_row(&mut self) -> usize {
        let blank = vec![Cell::Null; self.current.columns.len()];
        self.current.rows.push(blank);
        self.original.push(None);
        self.states.push(RowState::Added);

        let index = self.current.len() - 1;
        self.selected = Some(index);
        index
    }

    /// Changes one cell. Unchanged rows become Modified.
    pub fn set_cell(&mut self, row: usize, column: &str, value: Cell) -> CoreResult<()> {
        self.check_row(row)?;
        let col = self
            .current
            .column_index(column)
            .ok_or_else(|| CoreError::UnknownColumn(column.to_string()))?;

        self.current.rows[row][col] = value;
        if self.states[row] == RowState::Unchanged {
            self.states[row] = RowState::Modified;
        }
        Ok(())
    }

    /// UPDATEs for modified rows: the non-key columns whose text changed.
    /// Rows whose edits cancel out are skipped.
    pub fn pending_updates(&self, primary_key: &str) -> CoreResult<Vec<RowUpdate>> {
        let pk_index = self
            .current
            .column_index(primary_key)
            .ok_or_else(|| CoreError::NoPrimaryKey(self.table.clone()))?;

        let mut updates = Vec::new();

        for (row, state) in self.states.iter().enumerate() {
            if *state != RowState::Modified {
                continue;
            }
            let Some(original) = &self.original[row] else {
                continue;
            };
            let current = &self.current.rows[row];

            let changes: Vec<(String, Cell)> = self
                .current
                .columns
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != pk_index)
                .filter(|(i, _)| cell_to_string(&current[*i]) != cell_to_string(&original[*i]))
                .map(|(i, name)| (name.clone(), current[i].clone()))
                .collect();

            if !changes.is_empty() {
                updates.push(RowUpdate {
                    row,
                    key: original[pk_index].clone(),
                    changes,
                });
            }
        }

        Ok(updates)
    }

    /// INSERTs for added rows. The key column and null cells are left to
    /// the database defaults.
    pub fn pending_inserts(&self, primary_key: Option<&str>) -> Vec<RowInsert> {
        self.states
            .iter()
            .enumerate()
            .filter(|(_, state)| **state == RowState::Added)
            .map(|(row, _)| RowInsert {
                row,
                values: self
                    .current
                    .columns
                    .iter()
                    .zip(&self.current.rows[row])
                    .filter(|(name, _)| !primary_key.is_some_and(|pk| pk.eq_ignore_ascii_case(name)))
                    .filter(|(_, cell)| !cell.is_null())
                    .map(|(name, cell)| (name.clone(), cell.clone()))
                    .collect(),
            })
            .collect()
    }

    pub fn has_pending_changes(&self) -> bool {
        self.states.iter().any(|s| *s != RowState::Unchanged)
    }

    /// Marks every row as saved.
    pub fn accept_changes(&mut self) {
        self.original = self.current.rows.iter().cloned().map(Some).collect();
        self.states = vec![RowState::Unchanged; self.current.len()];
    }

    fn check_row(&self, index: usize) -> CoreResult<()> {
        if index >= self.current.len() {
            return Err(CoreError::RowOutOfRange {
                index,
                len: self.current.len(),
            });
        }
        Ok(())
    }
}
