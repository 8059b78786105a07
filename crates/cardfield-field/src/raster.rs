//! Draw the field into a terminal cell grid.

use cardfield_core::{CellSize, Rgb};
use glam::Vec2;
use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::body::Body;
use crate::chars::shade_char;
use crate::simulator::Simulator;

/// How much darker a card's rim is than its face.
const RIM_SHADE: f32 = 0.6;

/// Thickness of the rim, as a fraction of a cell.
const RIM_CELLS: f32 = 0.75;

/// One painted terminal cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellPaint {
    pub ch: char,
    pub color: Rgb,
}

/// A rasterized frame of the field.
#[derive(Debug, Clone)]
pub struct FieldRaster {
    columns: u16,
    rows: u16,
    cells: Vec<Option<CellPaint>>,
}

impl FieldRaster {
    fn new(columns: u16, rows: u16) -> Self {
        Self {
            columns,
            rows,
            cells: vec![None; usize::from(columns) * usize::from(rows)],
        }
    }

    pub fn get(&self, column: u16, row: u16) -> Option<CellPaint> {
        if column >= self.columns || row >= self.rows {
            return None;
        }
        self.cells[self.index(column, row)]
    }

    fn index(&self, column: u16, row: u16) -> usize {
        usize::from(row) * usize::from(self.columns) + usize::from(column)
    }

    fn paint(&mut self, column: u16, row: u16, paint: CellPaint) {
        let index = self.index(column, row);
        self.cells[index] = Some(paint);
    }

    /// Convert to styled lines, one per row.
    pub fn to_lines(&self) -> Vec<Line<'static>> {
        (0..self.rows)
            .map(|row| {
                let spans: Vec<Span> = (0..self.columns)
                    .map(|column| match self.get(column, row) {
                        Some(paint) => {
                            Span::styled(paint.ch.to_string(), Style::new().fg(paint.color.into()))
                        }
                        None => Span::raw(" "),
                    })
                    .collect();
                Line::from(spans)
            })
            .collect()
    }

    /// Number of painted cells.
    pub fn painted(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_some()).count()
    }
}

/// Rasterize every card, later cards painting over earlier ones.
pub fn rasterize(simulator: &Simulator, columns: u16, rows: u16, cell: CellSize) -> FieldRaster {
    let mut raster = FieldRaster::new(columns, rows);
    for body in simulator.bodies() {
        paint_body(&mut raster, body, cell);
    }
    raster
}

fn paint_body(raster: &mut FieldRaster, body: &Body, cell: CellSize) {
    let opacity = body.sprite().opacity();
    let Some(ch) = shade_char(opacity) else {
        return;
    };

    let face = body.sprite().asset().color().scaled(opacity);
    let rim = face.scaled(RIM_SHADE);
    let half = body.size() / 2.0;
    let rim_width = Vec2::new(cell.width, cell.height) * RIM_CELLS;

    // Only visit the cells under the rotated card's bounding box.
    let center = body.center();
    let extents = body.rotated_half_extents();
    let first_column = cell_index(center.x - extents.x, cell.width, raster.columns);
    let last_column = cell_index(center.x + extents.x, cell.width, raster.columns);
    let first_row = cell_index(center.y - extents.y, cell.height, raster.rows);
    let last_row = cell_index(center.y + extents.y, cell.height, raster.rows);
    let (Some(first_column), Some(last_column), Some(first_row), Some(last_row)) =
        (first_column, last_column, first_row, last_row)
    else {
        return;
    };

    for row in first_row..=last_row {
        for column in first_column..=last_column {
            let (x, y) = cell.cell_center(column, row);
            let local = body.to_local(Vec2::new(x, y));
            let inset = half - local.abs();
            if inset.x < 0.0 || inset.y < 0.0 {
                continue;
            }
            let color = if inset.x < rim_width.x || inset.y < rim_width.y {
                rim
            } else {
                face
            };
            raster.paint(column, row, CellPaint { ch, color });
        }
    }
}

/// Cell index containing a field coordinate, clamped to the grid. `None` when the grid
/// is empty on that axis.
fn cell_index(coordinate: f32, cell_size: f32, count: u16) -> Option<u16> {
    let last = count.checked_sub(1)?;
    let index = (coordinate / cell_size).floor();
    Some(index.clamp(0.0, f32::from(last)) as u16)
}

/// Render the field to the whole frame area.
pub fn render(frame: &mut Frame, simulator: &Simulator, cell: CellSize) {
    let area = frame.area();
    render_area(frame, area, simulator, cell);
}

/// Render the field into part of a frame.
pub fn render_area(frame: &mut Frame, area: Rect, simulator: &Simulator, cell: CellSize) {
    let raster = rasterize(simulator, area.width, area.height, cell);
    frame.render_widget(Paragraph::new(raster.to_lines()), area);
}
