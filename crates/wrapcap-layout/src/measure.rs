//! Measurement collection for the probe pass.
//!
//! [`MeasurementCoordinator`] gathers one size per item, the indicator size
//! and the available width. Slots are a fixed-length table allocated for the
//! configured item count; reports write directly into their slot. Once every
//! slot is filled the coordinator converts into [`MeasuredInputs`], the only
//! type a fit can be computed from.
//!
//! An empty size (zero width or height) means "not laid out yet" and clears
//! the slot it is reported for.
//!
//! There is no timeout: an item that never reports keeps the coordinator
//! incomplete. Hosts must not leave probe items unmounted.

use std::num::NonZeroU16;

use wrapcap_core::Size;

use crate::config::OverflowConfig;
use crate::fit::FitInput;

/// Source of rendered sizes for host items.
///
/// Returns an empty [`Size`] while the item has not been laid out.
pub trait SizeOracle<I: ?Sized> {
    fn size_of(&self, item: &I) -> Size;
}

impl<I: ?Sized, F> SizeOracle<I> for F
where
    F: Fn(&I) -> Size,
{
    fn size_of(&self, item: &I) -> Size {
        self(item)
    }
}

/// Effect of a single report on a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotChange {
    /// Same value as before (including empty over empty).
    Unchanged,
    /// Previously empty slot now holds a size.
    Filled,
    /// Slot held a size and now holds a different one.
    Updated,
    /// Slot held a size and was emptied.
    Cleared,
}

fn write_slot<T: PartialEq>(slot: &mut Option<T>, value: Option<T>) -> SlotChange {
    if *slot == value {
        return SlotChange::Unchanged;
    }
    let change = match (slot.is_some(), value.is_some()) {
        (false, _) => SlotChange::Filled,
        (true, true) => SlotChange::Updated,
        (true, false) => SlotChange::Cleared,
    };
    *slot = value;
    change
}

#[track_caller]
pub(crate) fn out_of_range(index: usize, len: usize) -> ! {
    panic!("item index {index} out of range for {len} items")
}

/// Sizes collected so far for one probe pass.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MeasurementCoordinator {
    items: Vec<Option<Size>>,
    measured: usize,
    indicator: Option<Size>,
    available_width: Option<NonZeroU16>,
}

impl MeasurementCoordinator {
    /// Empty coordinator for `item_count` items.
    #[must_use]
    pub fn new(item_count: usize) -> Self {
        Self {
            items: vec![None; item_count],
            measured: 0,
            indicator: None,
            available_width: None,
        }
    }

    /// Number of item slots.
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Record the rendered size of item `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not below the configured item count.
    #[track_caller]
    pub fn record_item_size(&mut self, index: usize, size: Size) -> SlotChange {
        let len = self.items.len();
        let Some(slot) = self.items.get_mut(index) else {
            out_of_range(index, len);
        };
        let change = write_slot(slot, size.measured());
        match change {
            SlotChange::Filled => self.measured += 1,
            SlotChange::Cleared => self.measured -= 1,
            SlotChange::Unchanged | SlotChange::Updated => {}
        }
        change
    }

    /// Record the rendered size of the overflow indicator.
    pub fn record_overflow_size(&mut self, size: Size) -> SlotChange {
        write_slot(&mut self.indicator, size.measured())
    }

    /// Record the width available to the rows. `0` means unknown.
    pub fn record_available_width(&mut self, width: u16) -> SlotChange {
        write_slot(&mut self.available_width, NonZeroU16::new(width))
    }

    /// Every item, the indicator and the width are known.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.measured == self.items.len()
            && self.indicator.is_some()
            && self.available_width.is_some()
    }

    /// `(measured items, total items)`.
    #[must_use]
    pub fn progress(&self) -> (usize, usize) {
        (self.measured, self.items.len())
    }

    /// Indices still waiting for a size.
    pub fn missing_items(&self) -> impl Iterator<Item = usize> + '_ {
        self.items
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.is_none().then_some(index))
    }

    /// Whether the indicator size is still missing.
    #[must_use]
    pub fn indicator_missing(&self) -> bool {
        self.indicator.is_none()
    }

    /// Available width recorded so far.
    #[must_use]
    pub fn available_width(&self) -> Option<u16> {
        self.available_width.map(NonZeroU16::get)
    }

    /// Convert into complete inputs, or give `self` back if anything is missing.
    pub fn into_inputs(self) -> Result<MeasuredInputs, Self> {
        if !self.is_complete() {
            return Err(self);
        }
        let (Some(indicator), Some(available_width)) = (self.indicator, self.available_width)
        else {
            return Err(self);
        };
        let sizes: Option<Vec<Size>> = self.items.iter().copied().collect();
        match sizes {
            Some(sizes) => Ok(MeasuredInputs {
                sizes,
                indicator,
                available_width,
            }),
            None => Err(self),
        }
    }
}

/// A complete set of measurements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeasuredInputs {
    sizes: Vec<Size>,
    indicator: Size,
    available_width: NonZeroU16,
}

impl MeasuredInputs {
    /// Item sizes in display order.
    #[must_use]
    pub fn sizes(&self) -> &[Size] {
        &self.sizes
    }

    /// Indicator size.
    #[must_use]
    pub fn indicator(&self) -> Size {
        self.indicator
    }

    /// Available width (always positive).
    #[must_use]
    pub fn available_width(&self) -> u16 {
        self.available_width.get()
    }

    /// Replace the size of item `index` with a non-empty size.
    ///
    /// Returns whether the value changed.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    #[track_caller]
    pub fn replace_item(&mut self, index: usize, size: NonEmpty) -> bool {
        let len = self.sizes.len();
        let Some(slot) = self.sizes.get_mut(index) else {
            out_of_range(index, len);
        };
        let changed = *slot != size.0;
        *slot = size.0;
        changed
    }

    /// Replace the indicator size. Returns whether the value changed.
    pub fn replace_indicator(&mut self, size: NonEmpty) -> bool {
        let changed = self.indicator != size.0;
        self.indicator = size.0;
        changed
    }

    /// Replace the available width. Returns whether the value changed.
    pub fn replace_available_width(&mut self, width: NonZeroU16) -> bool {
        let changed = self.available_width != width;
        self.available_width = width;
        changed
    }

    /// Back to an incomplete coordinator with every slot still filled.
    #[must_use]
    pub fn reopen(self) -> MeasurementCoordinator {
        MeasurementCoordinator {
            measured: self.sizes.len(),
            items: self.sizes.into_iter().map(Some).collect(),
            indicator: Some(self.indicator),
            available_width: Some(self.available_width),
        }
    }

    /// Fit input for these measurements under `config`.
    #[must_use]
    pub fn fit_input(&self, config: &OverflowConfig) -> FitInput<'_> {
        FitInput {
            sizes: &self.sizes,
            indicator: self.indicator,
            available_width: self.available_width.get(),
            spacing: config.spacing,
            max_rows: config.max_rows,
            empty_overflow: config.empty_overflow,
        }
    }
}

/// A size known to be non-empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NonEmpty(Size);

impl NonEmpty {
    /// `None` for an empty size.
    #[must_use]
    pub const fn new(size: Size) -> Option<Self> {
        if size.is_empty() { None } else { Some(Self(size)) }
    }

    /// The wrapped size.
    #[must_use]
    pub const fn get(self) -> Size {
        self.0
    }
}
