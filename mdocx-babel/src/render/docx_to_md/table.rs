//! Table rendering: pipe table when the grid is simple, `:::row:::` table otherwise.

use super::render_blocks;
use crate::error::FormatError;
use crate::ir::docx;
use crate::ir::markdown::{Block, Inline, Table, TableCell, TableForm, TableRow};
use crate::render::{Parent, RenderContext};

pub(super) fn render_table(
    table: &docx::Table,
    ctx: &mut RenderContext,
) -> Result<Table, FormatError> {
    let mut rows = Vec::with_capacity(table.rows.len());
    for row in &table.rows {
        let mut cells = Vec::with_capacity(row.cells.len());
        for cell in &row.cells {
            let blocks = ctx.scoped(Parent::TableCell, |ctx| {
                ctx.detached_from_lists(|ctx| render_blocks(&cell.blocks, ctx))
            })?;
            cells.push(TableCell::new(cell.span, blocks));
        }
        rows.push(TableRow { cells });
    }

    let form = if rows.iter().all(|row| row.cells.iter().all(is_pipe_cell)) {
        TableForm::Pipe
    } else {
        TableForm::Directive
    };
    Ok(Table {
        form,
        alignments: Vec::new(),
        rows,
    })
}

/// A cell a pipe table can hold: no span, at most one single-line paragraph.
fn is_pipe_cell(cell: &TableCell) -> bool {
    if cell.span != 1 {
        return false;
    }
    match cell.blocks.as_slice() {
        [] => true,
        [Block::Paragraph(inlines)] => !inlines.iter().any(|inline| matches!(inline, Inline::LineBreak)),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::docx::{Paragraph, Run};

    fn cell(text: &str) -> docx::TableCell {
        docx::TableCell::new(vec![docx::Block::Paragraph(
            Paragraph::new().with_run(Run::text(text)),
        )])
    }

    fn render(rows: Vec<Vec<docx::TableCell>>) -> Table {
        let table = docx::Table {
            rows: rows
                .into_iter()
                .map(|cells| docx::TableRow { cells })
                .collect(),
        };
        render_table(&table, &mut RenderContext::default()).unwrap()
    }

    #[test]
    fn simple_grid_is_pipe_table() {
        let table = render(vec![vec![cell("A"), cell("B")], vec![cell("1"), cell("2")]]);
        assert_eq!(table.form, TableForm::Pipe);
        assert_eq!(table.rows.len(), 2);
    }

    #[test]
    fn span_forces_directive_table() {
        let wide = docx::TableCell::spanning(2, vec![]);
        let table = render(vec![vec![wide], vec![cell("1"), cell("2")]]);
        assert_eq!(table.form, TableForm::Directive);
        assert_eq!(table.rows[0].cells[0].span, 2);
    }

    #[test]
    fn block_content_forces_directive_table() {
        let two_paragraphs = docx::TableCell::new(vec![
            docx::Block::Paragraph(Paragraph::new().with_run(Run::text("one"))),
            docx::Block::Paragraph(Paragraph::new().with_run(Run::text("two"))),
        ]);
        let table = render(vec![vec![two_paragraphs]]);
        assert_eq!(table.form, TableForm::Directive);
    }

    #[test]
    fn list_depth_does_not_leak_into_cells() {
        let mut ctx = RenderContext::default();
        ctx.list_depth = 3;
        let table = docx::Table {
            rows: vec![docx::TableRow {
                cells: vec![cell("x")],
            }],
        };
        render_table(&table, &mut ctx).unwrap();
        assert_eq!(ctx.list_depth, 3);
    }
}
