//! Overflow layout configuration and its validation errors.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Largest item count accepted by [`OverflowConfig::validate`].
///
/// The per-item size table is allocated eagerly at configuration time.
pub const MAX_ITEM_COUNT: usize = 1 << 20;

/// What to show when the indicator has evicted every visible item.
///
/// Only reachable with a single row whose sole item had to make room for the
/// indicator. Hosts disagree on the right answer, so it is configured rather
/// than inferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum EmptyOverflow {
    /// The indicator occupies the row on its own.
    #[default]
    IndicatorAlone,
    /// Nothing is shown; the indicator is suppressed and the row collapses.
    Collapse,
}

/// Parameters of one overflow layout.
///
/// `indicator_placeholder` is the count the overflow indicator is rendered
/// with during the probe pass. Its measured width stands in for every real
/// count, so pick a worst case (e.g. `99` for a two-digit label). A real label
/// much wider or narrower than the placeholder makes the fit slightly
/// pessimistic or optimistic.
///
/// # Example
///
/// ```
/// use wrapcap_layout::{EmptyOverflow, OverflowConfig};
///
/// let config = OverflowConfig::new(12, 99)
///     .max_rows(2)
///     .spacing(1)
///     .run_spacing(1)
///     .empty_overflow(EmptyOverflow::Collapse);
/// assert!(config.validate().is_ok());
/// assert!(OverflowConfig::new(12, 99).max_rows(0).validate().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OverflowConfig {
    /// Row budget (must be at least 1).
    pub max_rows: u16,
    /// Horizontal gap between consecutive items in a row.
    pub spacing: u16,
    /// Vertical gap between rows. Does not affect the fit, only total height.
    pub run_spacing: u16,
    /// Number of items in the sequence.
    pub item_count: usize,
    /// Count used to render the indicator for measurement (must be non-zero).
    pub indicator_placeholder: usize,
    /// Behavior when eviction leaves no visible item.
    #[cfg_attr(feature = "serde", serde(default))]
    pub empty_overflow: EmptyOverflow,
}

impl OverflowConfig {
    /// Single-row configuration with no spacing.
    #[must_use]
    pub const fn new(item_count: usize, indicator_placeholder: usize) -> Self {
        Self {
            max_rows: 1,
            spacing: 0,
            run_spacing: 0,
            item_count,
            indicator_placeholder,
            empty_overflow: EmptyOverflow::IndicatorAlone,
        }
    }

    /// Set the row budget.
    #[must_use]
    pub const fn max_rows(mut self, max_rows: u16) -> Self {
        self.max_rows = max_rows;
        self
    }

    /// Set the gap between items in a row.
    #[must_use]
    pub const fn spacing(mut self, spacing: u16) -> Self {
        self.spacing = spacing;
        self
    }

    /// Set the gap between rows.
    #[must_use]
    pub const fn run_spacing(mut self, run_spacing: u16) -> Self {
        self.run_spacing = run_spacing;
        self
    }

    /// Set the item count.
    #[must_use]
    pub const fn item_count(mut self, item_count: usize) -> Self {
        self.item_count = item_count;
        self
    }

    /// Set the empty-overflow policy.
    #[must_use]
    pub const fn empty_overflow(mut self, policy: EmptyOverflow) -> Self {
        self.empty_overflow = policy;
        self
    }

    /// Reject configurations the fit cannot honor.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_rows == 0 {
            return Err(ConfigError::ZeroMaxRows);
        }
        if self.indicator_placeholder == 0 {
            return Err(ConfigError::ZeroIndicatorPlaceholder);
        }
        if self.item_count > MAX_ITEM_COUNT {
            return Err(ConfigError::ItemCountTooLarge {
                count: self.item_count,
                max: MAX_ITEM_COUNT,
            });
        }
        Ok(())
    }
}

/// Configuration rejected by [`OverflowConfig::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    ZeroMaxRows,
    ZeroIndicatorPlaceholder,
    ItemCountTooLarge { count: usize, max: usize },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroMaxRows => write!(f, "max_rows must be >= 1 (got 0)"),
            Self::ZeroIndicatorPlaceholder => write!(
                f,
                "indicator placeholder count must be > 0; it sizes the overflow indicator"
            ),
            Self::ItemCountTooLarge { count, max } => {
                write!(f, "item count {count} exceeds the supported maximum of {max}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
