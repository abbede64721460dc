use tracing::info;

use crate::client::{ChatTurn, RefineRequest};
use crate::table::{Row, Selection, Table};

/// Precondition check; nothing may go on the wire unless this passes.
pub fn validate(selection: &Selection, prompt: &str) -> Result<(), &'static str> {
    if selection.is_empty() {
        return Err("Select at least one row to refine.");
    }
    if prompt.trim().is_empty() {
        return Err("Enter a refinement prompt.");
    }
    Ok(())
}

/// Assembles the outgoing request. The chat history inside it is the
/// speculative log: the existing turns plus one new user turn. The caller
/// commits it only after the backend answered 2xx.
pub fn build_request(table: &Table, selection: &Selection, history: &[ChatTurn], prompt: &str) -> RefineRequest {
    let mut chat_history = history.to_vec();
    chat_history.push(ChatTurn::user(prompt.trim()));

    let selected_rows = selection
        .ordered()
        .into_iter()
        .filter_map(|index| table.row(index).cloned())
        .collect();

    RefineRequest {
        selected_rows,
        full_table: table.rows().to_vec(),
        chat_history,
        all_rows: None,
    }
}

/// How a `/refine` answer is folded back into the table. The backend does
/// not say which shape it returned, so the split below is a documented
/// heuristic on the row count, not a protocol guarantee.
#[derive(Debug, Clone, PartialEq)]
pub enum Reconciliation {
    /// Returned rows replace the table wholesale.
    ReplaceAll(Vec<Row>),
    /// Returned rows are index-aligned with the selection order: the i-th
    /// row overwrites the i-th selected global index.
    MergeByIndex(Vec<Row>),
}

pub fn plan(current_rows: usize, returned: Vec<Row>) -> Reconciliation {
    if returned.len() >= current_rows {
        info!(
            "Refine returned {} rows for a table of {current_rows}, replacing wholesale",
            returned.len()
        );
        Reconciliation::ReplaceAll(returned)
    } else {
        info!(
            "Refine returned {} rows for a table of {current_rows}, merging by selection index",
            returned.len()
        );
        Reconciliation::MergeByIndex(returned)
    }
}

/// Applies a reconciliation. `ordered_selection` must be the same ordering
/// the request was built with. Rows missing from a short merge answer leave
/// their targets untouched; surplus rows are dropped.
pub fn apply(table: &mut Table, ordered_selection: &[usize], plan: Reconciliation) {
    match plan {
        Reconciliation::ReplaceAll(rows) => table.replace_rows(rows),
        Reconciliation::MergeByIndex(rows) => {
            for (row, &index) in rows.into_iter().zip(ordered_selection) {
                table.set_row(index, row);
            }
        }
    }
}
