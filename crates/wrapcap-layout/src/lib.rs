#![forbid(unsafe_code)]

//! Overflow decisions for row-bounded flow layouts.
//!
//! A flow layout places items left to right and wraps them onto new rows.
//! When the row budget runs out, the trailing items are replaced by an
//! overflow indicator ("+3"). This crate decides how many items stay visible
//! and where the indicator goes:
//!
//! - [`fit`] - pure greedy row-fill with indicator backoff
//! - [`measure`] - collection of item, indicator and width measurements
//! - [`controller`] - the `Measuring`/`Ready` state machine tying both together
//! - [`observer`] - explicit subscriptions to published decisions
//! - [`config`] - validated layout parameters
//!
//! Item sizes are unknown until the host has rendered them once, so the
//! host runs a probe pass: render every item and the indicator (built with
//! [`OverflowController::probe_indicator`]) unconstrained, report their sizes,
//! and render the final layout from the published [`LayoutDecision`].
//!
//! The flow renderer itself belongs to the host. [`FitReport::rows`] predicts
//! what it will do but does not drive it.

pub mod config;
pub mod controller;
pub mod fit;
pub mod measure;
pub mod observer;

pub use config::{ConfigError, EmptyOverflow, MAX_ITEM_COUNT, OverflowConfig};
pub use controller::{ControllerState, OverflowController, ProbePass, ReportOutcome};
pub use fit::{FitInput, FitReport, IndicatorSlot, LayoutDecision, RowSpan, fit, fit_report};
pub use measure::{MeasuredInputs, MeasurementCoordinator, NonEmpty, SizeOracle, SlotChange};
pub use observer::{Observers, SubscriptionId};
pub use wrapcap_core::geometry::Size;
