//! Measure-then-decide controller.
//!
//! [`OverflowController`] is a two-state machine:
//!
//! ```text
//!            all sizes + width known
//!  Measuring ───────────────────────▶ Ready
//!      ▲                                │  width / size change: refit in place
//!      └──── configure() or a size ─────┘
//!            report cleared (empty)
//! ```
//!
//! While `Measuring` the controller only holds a [`MeasurementCoordinator`];
//! while `Ready` it holds [`MeasuredInputs`] and the current decision. A
//! decision cannot exist without complete measurements.
//!
//! Every [`configure`](OverflowController::configure) starts a new
//! [`ProbePass`]. Size reports carry the pass they were measured under, and
//! reports from an older pass are dropped, so nothing measured under a
//! previous configuration is ever published.
//!
//! The available width is not a probe measurement; it survives
//! reconfiguration.
//!
//! Each published decision is delivered to subscribers and, when the
//! indicator is shown, the indicator factory is invoked once with the number
//! of hidden items.

use std::fmt;

use wrapcap_core::{Size, debug, debug_span, trace, warn};

use crate::config::{ConfigError, OverflowConfig};
use crate::fit::{self, FitReport, LayoutDecision};
use crate::measure::{
    MeasuredInputs, MeasurementCoordinator, NonEmpty, SizeOracle, SlotChange, out_of_range,
};
use crate::observer::{Observers, SubscriptionId};

/// Generation of measurements, bumped by every `configure`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProbePass(u64);

impl ProbePass {
    /// Raw numeric value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// Public state tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControllerState {
    Measuring,
    Ready,
}

/// What a report did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportOutcome {
    /// Recorded; measurements are still incomplete.
    Pending,
    /// The reported value was already known; nothing was recomputed.
    Unchanged,
    /// A new decision was computed and published.
    Published(LayoutDecision),
    /// A measurement was cleared; the controller is back to measuring.
    Invalidated,
    /// The report belonged to an earlier probe pass and was dropped.
    Stale,
}

#[derive(Debug, Clone, Copy)]
enum Report {
    Item { index: usize, size: Size },
    Indicator(Size),
    Width(u16),
}

impl Report {
    #[track_caller]
    fn record(self, coordinator: &mut MeasurementCoordinator) -> SlotChange {
        match self {
            Self::Item { index, size } => coordinator.record_item_size(index, size),
            Self::Indicator(size) => coordinator.record_overflow_size(size),
            Self::Width(width) => coordinator.record_available_width(width),
        }
    }

    /// `Some(changed)` for a usable value, `None` if the value clears its slot.
    ///
    /// Item indices are checked before anything is touched.
    #[track_caller]
    fn replace(self, inputs: &mut MeasuredInputs) -> Option<bool> {
        match self {
            Self::Item { index, size } => {
                let len = inputs.sizes().len();
                if index >= len {
                    out_of_range(index, len);
                }
                NonEmpty::new(size).map(|size| inputs.replace_item(index, size))
            }
            Self::Indicator(size) => {
                NonEmpty::new(size).map(|size| inputs.replace_indicator(size))
            }
            Self::Width(width) => std::num::NonZeroU16::new(width)
                .map(|width| inputs.replace_available_width(width)),
        }
    }
}

enum Phase {
    Measuring(MeasurementCoordinator),
    Ready {
        inputs: MeasuredInputs,
        decision: LayoutDecision,
    },
}

impl Phase {
    fn vacant() -> Self {
        Self::Measuring(MeasurementCoordinator::default())
    }
}

fn compute(config: &OverflowConfig, inputs: &MeasuredInputs) -> LayoutDecision {
    let _span = debug_span!(
        "wrapcap.fit",
        items = inputs.sizes().len(),
        available_width = inputs.available_width(),
        max_rows = config.max_rows
    )
    .entered();
    fit::fit(&inputs.fit_input(config))
}

/// Drives the probe pass and publishes layout decisions.
///
/// `I` is the host's renderable item type; the factory builds the overflow
/// indicator for a given hidden-item count.
///
/// # Example
///
/// ```
/// use wrapcap_core::Size;
/// use wrapcap_layout::{ControllerState, OverflowConfig, OverflowController};
///
/// let config = OverflowConfig::new(5, 99).spacing(10);
/// let mut controller = OverflowController::new(config, |hidden| format!("+{hidden}"))?;
/// let pass = controller.pass();
///
/// controller.record_available_width(200);
/// controller.record_overflow_size(pass, Size::new(40, 20));
/// for index in 0..5 {
///     controller.record_item_size(pass, index, Size::new(50, 20));
/// }
///
/// assert_eq!(controller.state(), ControllerState::Ready);
/// let decision = controller.decision().expect("ready");
/// assert_eq!(decision.visible_count, 2);
/// assert_eq!(controller.indicator().map(String::as_str), Some("+3"));
/// # Ok::<(), wrapcap_layout::ConfigError>(())
/// ```
pub struct OverflowController<I> {
    config: OverflowConfig,
    pass: ProbePass,
    phase: Phase,
    observers: Observers<LayoutDecision>,
    factory: Box<dyn FnMut(usize) -> I>,
    indicator: Option<I>,
}

impl<I: fmt::Debug> fmt::Debug for OverflowController<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OverflowController")
            .field("config", &self.config)
            .field("pass", &self.pass)
            .field("state", &self.state())
            .field("decision", &self.decision())
            .field("indicator", &self.indicator)
            .field("observers", &self.observers)
            .finish()
    }
}

impl<I> OverflowController<I> {
    /// Validate `config` and start the first probe pass.
    pub fn new(
        config: OverflowConfig,
        indicator_factory: impl FnMut(usize) -> I + 'static,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let pass = ProbePass(1);
        debug!(
            pass = pass.get(),
            items = config.item_count,
            max_rows = config.max_rows,
            spacing = config.spacing,
            "probe pass started"
        );
        Ok(Self {
            config,
            pass,
            phase: Phase::Measuring(MeasurementCoordinator::new(config.item_count)),
            observers: Observers::new(),
            factory: Box::new(indicator_factory),
            indicator: None,
        })
    }

    /// Replace the configuration and start a new probe pass.
    ///
    /// Always returns to `Measuring`; every recorded size is discarded and
    /// reports tagged with older passes are dropped from now on. On error the
    /// current configuration, state and pass are left untouched.
    pub fn configure(&mut self, config: OverflowConfig) -> Result<ProbePass, ConfigError> {
        config.validate()?;
        let mut coordinator = MeasurementCoordinator::new(config.item_count);
        if let Some(width) = self.available_width() {
            coordinator.record_available_width(width);
        }
        self.config = config;
        self.pass = self.pass.next();
        self.phase = Phase::Measuring(coordinator);
        self.indicator = None;
        debug!(
            pass = self.pass.get(),
            items = config.item_count,
            max_rows = config.max_rows,
            spacing = config.spacing,
            "probe pass started"
        );
        Ok(self.pass)
    }

    /// Current configuration.
    #[must_use]
    pub fn config(&self) -> &OverflowConfig {
        &self.config
    }

    /// Current probe pass; tag size reports with it.
    #[must_use]
    pub fn pass(&self) -> ProbePass {
        self.pass
    }

    /// Current state tag.
    #[must_use]
    pub fn state(&self) -> ControllerState {
        match self.phase {
            Phase::Measuring(_) => ControllerState::Measuring,
            Phase::Ready { .. } => ControllerState::Ready,
        }
    }

    /// The current decision, when `Ready`.
    #[must_use]
    pub fn decision(&self) -> Option<LayoutDecision> {
        match &self.phase {
            Phase::Ready { decision, .. } => Some(*decision),
            Phase::Measuring(_) => None,
        }
    }

    /// Measurement progress, when `Measuring`.
    #[must_use]
    pub fn measurements(&self) -> Option<&MeasurementCoordinator> {
        match &self.phase {
            Phase::Measuring(coordinator) => Some(coordinator),
            Phase::Ready { .. } => None,
        }
    }

    /// Last known available width.
    #[must_use]
    pub fn available_width(&self) -> Option<u16> {
        match &self.phase {
            Phase::Measuring(coordinator) => coordinator.available_width(),
            Phase::Ready { inputs, .. } => Some(inputs.available_width()),
        }
    }

    /// Indicator built for the current decision, if it shows one.
    #[must_use]
    pub fn indicator(&self) -> Option<&I> {
        self.indicator.as_ref()
    }

    /// Build the indicator for the probe pass, using the placeholder count.
    pub fn probe_indicator(&mut self) -> I {
        (self.factory)(self.config.indicator_placeholder)
    }

    /// Decision plus predicted rows, when `Ready`.
    #[must_use]
    pub fn fit_report(&self) -> Option<FitReport> {
        match &self.phase {
            Phase::Ready { inputs, .. } => Some(fit::fit_report(&inputs.fit_input(&self.config))),
            Phase::Measuring(_) => None,
        }
    }

    /// Height of the laid-out block including `run_spacing`, when `Ready`.
    #[must_use]
    pub fn total_height(&self) -> Option<u32> {
        self.fit_report()
            .map(|report| report.total_height(self.config.run_spacing))
    }

    /// Subscribe to published decisions.
    pub fn subscribe(&mut self, observer: impl FnMut(&LayoutDecision) + 'static) -> SubscriptionId {
        self.observers.subscribe(observer)
    }

    /// Stop delivering decisions to `id`. Returns `false` if unknown.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    /// Record the size of item `index`, measured under `pass`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not below the configured item count.
    #[track_caller]
    pub fn record_item_size(&mut self, pass: ProbePass, index: usize, size: Size) -> ReportOutcome {
        if !self.accepts(pass) {
            return ReportOutcome::Stale;
        }
        trace!(index, width = size.width, height = size.height, "item size reported");
        self.apply(Report::Item { index, size })
    }

    /// Record the size of the overflow indicator, measured under `pass`.
    pub fn record_overflow_size(&mut self, pass: ProbePass, size: Size) -> ReportOutcome {
        if !self.accepts(pass) {
            return ReportOutcome::Stale;
        }
        trace!(width = size.width, height = size.height, "indicator size reported");
        self.apply(Report::Indicator(size))
    }

    /// Record the width available to the rows. `0` means unknown.
    pub fn record_available_width(&mut self, width: u16) -> ReportOutcome {
        trace!(width, "available width reported");
        self.apply(Report::Width(width))
    }

    /// Pull every size from `oracle` and record it under the current pass.
    ///
    /// Returns the decision afterwards, if `Ready`.
    ///
    /// # Panics
    ///
    /// Panics if `items` is longer than the configured item count.
    #[track_caller]
    pub fn sync_from(
        &mut self,
        oracle: &impl SizeOracle<I>,
        items: &[I],
        indicator: &I,
    ) -> Option<LayoutDecision> {
        let pass = self.pass;
        for (index, item) in items.iter().enumerate() {
            self.record_item_size(pass, index, oracle.size_of(item));
        }
        self.record_overflow_size(pass, oracle.size_of(indicator));
        self.decision()
    }

    fn accepts(&self, pass: ProbePass) -> bool {
        if pass == self.pass {
            return true;
        }
        warn!(
            stale = pass.get(),
            current = self.pass.get(),
            "dropping size report from an earlier probe pass"
        );
        false
    }

    #[track_caller]
    fn apply(&mut self, report: Report) -> ReportOutcome {
        match &mut self.phase {
            Phase::Measuring(coordinator) => {
                report.record(coordinator);
                self.try_complete()
            }
            Phase::Ready { inputs, .. } => match report.replace(inputs) {
                Some(true) => self.recompute(),
                Some(false) => ReportOutcome::Unchanged,
                None => {
                    self.reopen(report);
                    ReportOutcome::Invalidated
                }
            },
        }
    }

    fn try_complete(&mut self) -> ReportOutcome {
        match std::mem::replace(&mut self.phase, Phase::vacant()) {
            Phase::Measuring(coordinator) => match coordinator.into_inputs() {
                Ok(inputs) => {
                    let decision = compute(&self.config, &inputs);
                    self.phase = Phase::Ready { inputs, decision };
                    self.publish(decision);
                    ReportOutcome::Published(decision)
                }
                Err(coordinator) => {
                    self.phase = Phase::Measuring(coordinator);
                    ReportOutcome::Pending
                }
            },
            ready => {
                self.phase = ready;
                ReportOutcome::Unchanged
            }
        }
    }

    fn recompute(&mut self) -> ReportOutcome {
        let Phase::Ready { inputs, decision } = &mut self.phase else {
            return ReportOutcome::Pending;
        };
        let next = compute(&self.config, inputs);
        *decision = next;
        self.publish(next);
        ReportOutcome::Published(next)
    }

    #[track_caller]
    fn reopen(&mut self, report: Report) {
        let mut coordinator = match std::mem::replace(&mut self.phase, Phase::vacant()) {
            Phase::Ready { inputs, .. } => inputs.reopen(),
            Phase::Measuring(coordinator) => coordinator,
        };
        report.record(&mut coordinator);
        self.phase = Phase::Measuring(coordinator);
        self.indicator = None;
        debug!(pass = self.pass.get(), "measurement cleared, decision withdrawn");
    }

    fn publish(&mut self, decision: LayoutDecision) {
        let remainder = decision.remainder(self.config.item_count);
        self.indicator = decision
            .indicator
            .is_shown()
            .then(|| (self.factory)(remainder));
        debug!(
            pass = self.pass.get(),
            visible = decision.visible_count,
            overflow = decision.has_overflow,
            remainder,
            row_height = decision.row_height,
            "layout decision published"
        );
        self.observers.publish(&decision);
    }
}
