//! Greedy row-fill fit with overflow-indicator backoff.
//!
//! Given measured item sizes, the indicator size, the available width, the
//! item spacing and a row budget, [`fit`] decides how many leading items are
//! shown and whether the overflow indicator follows them.
//!
//! # Algorithm
//!
//! 1. Items are placed in order. The first item of a row costs its width; each
//!    later item costs `spacing + width`. An item that would push a non-empty
//!    row past `available_width` opens the next row. Opening a row beyond
//!    `max_rows` stops packing.
//! 2. If everything was packed there is no overflow.
//! 3. Otherwise the indicator is seated, in order of preference:
//!    in the remaining width of the last row, on a spare row, or in place of
//!    the last packed item (one fewer visible item).
//!
//! A row may hold a single item wider than `available_width`; it is never
//! split or dropped. The forced replacement in step 3 may also overrun the
//! width when the indicator is wider than the item it replaced.
//!
//! # Invariants
//!
//! - `visible_count <= N`
//! - `has_overflow == (visible_count < N)`
//! - Output depends only on the input (no hidden state).

use std::ops::Range;

use wrapcap_core::Size;

use crate::config::EmptyOverflow;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Inputs to one fit computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FitInput<'a> {
    /// Item sizes in display order.
    pub sizes: &'a [Size],
    /// Size of the overflow indicator, measured with the placeholder count.
    pub indicator: Size,
    /// Width of one row.
    pub available_width: u16,
    /// Gap between consecutive items in a row.
    pub spacing: u16,
    /// Row budget. `0` is treated as `1`.
    pub max_rows: u16,
    /// What to do when eviction leaves no item.
    pub empty_overflow: EmptyOverflow,
}

/// Where the overflow indicator ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum IndicatorSlot {
    /// Everything fit; no indicator.
    #[default]
    None,
    /// After the last visible item, on the same row.
    SameRow,
    /// Alone on the row after the last visible item.
    OwnRow,
    /// In place of the last packed item, which was evicted.
    Replacing,
    /// Truncated, but the indicator is hidden ([`EmptyOverflow::Collapse`]).
    Suppressed,
}

impl IndicatorSlot {
    /// Whether the indicator is actually rendered.
    #[must_use]
    pub const fn is_shown(self) -> bool {
        matches!(self, Self::SameRow | Self::OwnRow | Self::Replacing)
    }
}

/// How many items to show and whether to show the overflow indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LayoutDecision {
    /// Number of leading items to render.
    pub visible_count: usize,
    /// True exactly when `visible_count` is less than the item count.
    pub has_overflow: bool,
    /// Tallest height among the rows in use.
    pub row_height: u16,
    /// Placement of the overflow indicator.
    pub indicator: IndicatorSlot,
}

impl LayoutDecision {
    /// Decision for an empty sequence.
    pub const EMPTY: Self = Self {
        visible_count: 0,
        has_overflow: false,
        row_height: 0,
        indicator: IndicatorSlot::None,
    };

    /// Number of items hidden behind the indicator.
    #[must_use]
    pub const fn remainder(&self, item_count: usize) -> usize {
        item_count.saturating_sub(self.visible_count)
    }
}

/// One predicted display row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowSpan {
    /// Items on this row.
    pub items: Range<usize>,
    /// Occupied width including spacing (and the indicator, if seated here).
    pub width: u32,
    /// Tallest member of the row.
    pub height: u16,
    /// Whether the overflow indicator sits at the end of this row.
    pub indicator: bool,
}

impl RowSpan {
    fn open(start: usize) -> Self {
        Self {
            items: start..start,
            width: 0,
            height: 0,
            indicator: false,
        }
    }

    fn holds_items(&self) -> bool {
        !self.items.is_empty()
    }

    fn place(&mut self, size: Size, spacing: u32) {
        if self.holds_items() {
            self.width += spacing;
        }
        self.width += u32::from(size.width);
        self.height = self.height.max(size.height);
    }

    fn push_item(&mut self, size: Size, spacing: u32) {
        self.place(size, spacing);
        self.items.end += 1;
    }

    fn seat_indicator(&mut self, size: Size, spacing: u32) {
        self.place(size, spacing);
        self.indicator = true;
    }

    /// Rebuild this row without its last item.
    fn without_last(&self, sizes: &[Size], spacing: u32) -> Self {
        let mut row = Self::open(self.items.start);
        let end = self.items.end.saturating_sub(1).max(self.items.start);
        for size in &sizes[self.items.start..end] {
            row.push_item(*size, spacing);
        }
        row
    }
}

/// A decision together with the row assignment it predicts.
///
/// The rows describe what a flow layout with the same width and spacing will
/// produce for the visible items plus the indicator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FitReport {
    pub decision: LayoutDecision,
    pub rows: Vec<RowSpan>,
}

impl FitReport {
    /// Height of the whole block, with `run_spacing` between rows.
    #[must_use]
    pub fn total_height(&self, run_spacing: u16) -> u32 {
        let rows: u32 = self.rows.iter().map(|row| u32::from(row.height)).sum();
        let gaps = self.rows.len().saturating_sub(1) as u32;
        rows + gaps * u32::from(run_spacing)
    }
}

/// Compute the layout decision.
#[must_use]
pub fn fit(input: &FitInput<'_>) -> LayoutDecision {
    fit_report(input).decision
}

/// Compute the layout decision and the predicted rows.
#[must_use]
pub fn fit_report(input: &FitInput<'_>) -> FitReport {
    let total = input.sizes.len();
    if total == 0 {
        return FitReport {
            decision: LayoutDecision::EMPTY,
            rows: Vec::new(),
        };
    }

    let available = u32::from(input.available_width);
    let spacing = u32::from(input.spacing);
    let max_rows = usize::from(input.max_rows.max(1));

    let mut rows = Vec::with_capacity(max_rows.min(total));
    let mut row = RowSpan::open(0);
    let mut count = 0;

    for (index, &size) in input.sizes.iter().enumerate() {
        let width = u32::from(size.width);
        if row.holds_items() && row.width + width + spacing > available {
            if rows.len() + 1 >= max_rows {
                break;
            }
            rows.push(row);
            row = RowSpan::open(index);
        }
        row.push_item(size, spacing);
        count = index + 1;
    }

    if count == total {
        rows.push(row);
        return finish(rows, total, IndicatorSlot::None);
    }

    let indicator_width = u32::from(input.indicator.width);
    let slot = if row.width + indicator_width + spacing <= available {
        row.seat_indicator(input.indicator, spacing);
        rows.push(row);
        IndicatorSlot::SameRow
    } else if rows.len() + 1 < max_rows {
        rows.push(row);
        let mut own = RowSpan::open(count);
        own.seat_indicator(input.indicator, spacing);
        rows.push(own);
        IndicatorSlot::OwnRow
    } else {
        let mut shrunk = row.without_last(input.sizes, spacing);
        count = count.saturating_sub(1);
        if count == 0 && input.empty_overflow == EmptyOverflow::Collapse {
            return FitReport {
                decision: LayoutDecision {
                    visible_count: 0,
                    has_overflow: true,
                    row_height: 0,
                    indicator: IndicatorSlot::Suppressed,
                },
                rows: Vec::new(),
            };
        }
        shrunk.seat_indicator(input.indicator, spacing);
        rows.push(shrunk);
        IndicatorSlot::Replacing
    };

    finish(rows, count, slot)
}

fn finish(rows: Vec<RowSpan>, visible_count: usize, indicator: IndicatorSlot) -> FitReport {
    let row_height = rows.iter().map(|row| row.height).max().unwrap_or(0);
    FitReport {
        decision: LayoutDecision {
            visible_count,
            has_overflow: indicator != IndicatorSlot::None,
            row_height,
            indicator,
        },
        rows,
    }
}
