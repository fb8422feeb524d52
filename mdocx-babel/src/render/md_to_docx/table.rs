use super::BLOCK_PRIORITY;
use crate::error::FormatError;
use crate::ir::docx;
use crate::ir::markdown::Table;
use crate::render::{write_container, Parent, RenderContext};

/// Both table forms lower to the same grid; pipe alignment has no counterpart.
pub(super) fn render_table(
    table: &Table,
    ctx: &mut RenderContext,
) -> Result<docx::Table, FormatError> {
    let mut rows = Vec::with_capacity(table.rows.len());
    for row in &table.rows {
        let mut cells = Vec::with_capacity(row.cells.len());
        for cell in &row.cells {
            let mut blocks = Vec::new();
            ctx.scoped(Parent::TableCell, |ctx| {
                ctx.detached_from_lists(|ctx| {
                    write_container(BLOCK_PRIORITY, &cell.blocks, ctx, &mut blocks)
                })
            })?;
            cells.push(docx::TableCell::spanning(cell.span, blocks));
        }
        rows.push(docx::TableRow { cells });
    }
    Ok(docx::Table { rows })
}
