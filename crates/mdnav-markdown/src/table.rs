//! Table subtrees flattened into header and body grids.

use crate::node::BlockKind;
use crate::node::BlockNode;
use crate::node::TableGrid;
use crate::style::StyleRun;

/// Flattens a freshly closed table subtree into its [`TableGrid`].
///
/// Header cells become the header row wherever they appear. Every `tr` starts a new body row and
/// data cells go into the most recent one (a data cell seen before any row starts one). Rows that
/// end up with no data cells, such as the header's own `tr`, are dropped. The node's children are
/// consumed: afterwards the grid is the only representation of the table.
pub fn assemble(table: &mut BlockNode) {
    let mut grid = TableGrid::default();
    let mut rows: Vec<Vec<StyleRun>> = Vec::new();

    let children = std::mem::take(&mut table.children);
    for child in &children {
        child.walk(&mut |node| match &node.kind {
            BlockKind::TableHeaderCell { align } => {
                grid.headers.push(cell_content(node));
                grid.aligns.push(*align);
            }
            BlockKind::TableRow => rows.push(Vec::new()),
            BlockKind::TableDataCell { align } => {
                if rows.is_empty() {
                    rows.push(Vec::new());
                }
                if let Some(row) = rows.last_mut() {
                    if row.len() >= grid.aligns.len() {
                        grid.aligns.push(*align);
                    }
                    row.push(cell_content(node));
                }
            }
            _ => {}
        });
    }

    grid.rows = rows.into_iter().filter(|row| !row.is_empty()).collect();
    table.kind = BlockKind::Table(grid);
}

fn cell_content(cell: &BlockNode) -> StyleRun {
    cell.content.clone().unwrap_or_default()
}
