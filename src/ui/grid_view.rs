/// Grid view
///
/// Turns the coordinator's sections into rows of square thumbnail cells.
/// Geometry comes from whichever layout backend the section supports; the
/// same resolved numbers also drive the visible-window math the host uses
/// to decide which slots to bind.

use iced::widget::{canvas, column, container, image, mouse_area, row, stack, text, Column};
use iced::{alignment, Color, ContentFit, Element, Length};

use super::badge::SelectionBadge;
use crate::grid::cell::ThumbnailCell;
use crate::grid::coordinator::GridCoordinator;
use crate::grid::layout::{
    GridLayoutSection, LayoutBackend, LayoutEnvironment, WidthClass,
};
use crate::grid::section::GridSection;
use crate::state::data::AssetKind;
use crate::Message;

/// Geometry shared by rendering and window binding
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedGrid {
    pub columns: usize,
    pub item_side: f32,
    pub item_spacing: f32,
    pub line_spacing: f32,
    pub inset: f32,
}

/// Resolve a section's geometry through its layout capability. A section
/// without the selected backend degrades to one full-width column.
pub fn resolve(
    section: &dyn GridSection,
    env: &LayoutEnvironment,
    backend: LayoutBackend,
) -> ResolvedGrid {
    let fallback = GridLayoutSection {
        column_count: 1,
        item_spacing: 0.0,
        line_spacing: 0.0,
        inset: 0.0,
    };

    match backend {
        LayoutBackend::Compositional => {
            let descriptor = section
                .compositional_layout()
                .map(|layout| layout.layout_section(env))
                .unwrap_or(fallback);
            ResolvedGrid {
                columns: descriptor.column_count,
                item_side: descriptor.item_side(env.container.width),
                item_spacing: descriptor.item_spacing,
                line_spacing: descriptor.line_spacing,
                inset: descriptor.inset,
            }
        }
        LayoutBackend::Flow => match section.flow_layout() {
            Some(flow) => {
                let metrics = flow.flow_metrics(env);
                let strategy = flow.sizing_strategy(0, env);
                ResolvedGrid {
                    columns: strategy.column_count,
                    item_side: strategy.item_size(env.container.width).width,
                    item_spacing: metrics.minimum_interitem_spacing,
                    line_spacing: metrics.minimum_line_spacing,
                    inset: metrics.content_insets.left,
                }
            }
            None => ResolvedGrid {
                columns: fallback.column_count,
                item_side: fallback.item_side(env.container.width),
                item_spacing: 0.0,
                line_spacing: 0.0,
                inset: 0.0,
            },
        },
    }
}

/// Content indices worth keeping bound for the current scroll position:
/// the rows in view plus two rows of overscan on each side.
pub fn visible_window(
    resolved: &ResolvedGrid,
    len: usize,
    scroll_y: f32,
    viewport_height: f32,
) -> std::ops::Range<usize> {
    const OVERSCAN_ROWS: usize = 2;

    if len == 0 {
        return 0..0;
    }
    let row_height = resolved.item_side + resolved.line_spacing;
    if row_height <= 0.0 {
        return 0..len;
    }

    let first_row = ((scroll_y - resolved.inset) / row_height).floor().max(0.0) as usize;
    let rows_in_view = (viewport_height / row_height).ceil() as usize + 1;

    let start = first_row.saturating_sub(OVERSCAN_ROWS) * resolved.columns;
    let end = (first_row + rows_in_view + OVERSCAN_ROWS) * resolved.columns;
    start.min(len)..end.min(len)
}

pub fn view<'a>(
    grid: &'a GridCoordinator,
    env: &LayoutEnvironment,
    backend: LayoutBackend,
) -> Element<'a, Message> {
    let provider = grid.provider();

    let total: usize = (0..provider.len())
        .filter_map(|s| provider.get(s))
        .map(|s| s.len())
        .sum();
    if total == 0 {
        return container(text("No media yet. Import a folder to get started.").size(14))
            .width(Length::Fill)
            .padding(24.0)
            .align_x(alignment::Horizontal::Center)
            .into();
    }

    // Regular width shows whole assets letterboxed; compact crops to fill
    let fit = match env.device.width_class {
        WidthClass::Regular => ContentFit::Contain,
        WidthClass::Compact => ContentFit::Cover,
    };

    let mut sections: Column<'a, Message> = column![];

    for s in 0..provider.len() {
        let Some(section) = provider.get(s) else {
            continue;
        };
        let resolved = resolve(section, env, backend);

        let indices: Vec<usize> = (0..section.len()).collect();
        let mut rows: Column<'a, Message> = column![].spacing(resolved.line_spacing);
        for chunk in indices.chunks(resolved.columns.max(1)) {
            let mut cells = row![].spacing(resolved.item_spacing);
            for &index in chunk {
                cells = cells.push(cell_view(
                    s,
                    index,
                    section.asset(index).kind,
                    grid.cell_at(s, index),
                    resolved.item_side,
                    fit,
                ));
            }
            rows = rows.push(cells);
        }

        sections = sections.push(container(rows).padding(resolved.inset));
    }

    sections.width(Length::Fill).into()
}

fn cell_view<'a>(
    section_index: usize,
    index: usize,
    kind: AssetKind,
    cell: Option<&'a ThumbnailCell>,
    side: f32,
    fit: ContentFit,
) -> Element<'a, Message> {
    let content: Element<'a, Message> = match cell.and_then(|c| c.image()) {
        Some(handle) => image(handle.clone())
            .width(Length::Fixed(side))
            .height(Length::Fixed(side))
            .content_fit(fit)
            .opacity(cell.map(|c| c.alpha()).unwrap_or(1.0))
            .into(),
        None => placeholder(kind, side),
    };

    let mut layers = stack![content];
    if let Some(cell) = cell {
        if cell.shows_selection_badge() {
            layers = layers.push(
                container(
                    canvas(SelectionBadge {
                        selected: cell.is_selected(),
                    })
                    .width(Length::Fixed(20.0))
                    .height(Length::Fixed(20.0)),
                )
                .width(Length::Fixed(side))
                .height(Length::Fixed(side))
                .align_x(alignment::Horizontal::Right)
                .align_y(alignment::Vertical::Bottom)
                .padding(10.0),
            );
        }
    }

    mouse_area(layers)
        .on_press(Message::CellPressed(section_index, index))
        .into()
}

fn placeholder<'a>(kind: AssetKind, side: f32) -> Element<'a, Message> {
    let label: Element<'a, Message> = match kind {
        AssetKind::Video => text("VIDEO")
            .size(11)
            .color(Color::from_rgb(0.75, 0.75, 0.78))
            .into(),
        AssetKind::Photo => text("").into(),
    };

    container(label)
        .width(Length::Fixed(side))
        .height(Length::Fixed(side))
        .align_x(alignment::Horizontal::Center)
        .align_y(alignment::Vertical::Center)
        .style(|_theme| iced::widget::container::Style {
            background: Some(Color::from_rgb(0.12, 0.12, 0.13).into()),
            ..iced::widget::container::Style::default()
        })
        .into()
}
