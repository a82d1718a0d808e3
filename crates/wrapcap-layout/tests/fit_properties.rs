#![forbid(unsafe_code)]

//! Property-based and scenario tests for the overflow fit.
//!
//! Properties checked for arbitrary sizes, widths, spacing and row budgets:
//!
//! 1. `visible_count <= N`.
//! 2. `has_overflow` exactly when `visible_count < N`.
//! 3. Identical input gives identical output.
//! 4. More width never shows fewer items.
//! 5. More rows never show fewer items.
//! 6. Rows stay within the width unless they hold a single member or are the
//!    forced replacement row.
//! 7. Predicted rows cover exactly the visible items, in order.
//!
//! ```sh
//! cargo test -p wrapcap-layout --test fit_properties
//! ```

use proptest::prelude::*;
use wrapcap_layout::{
    EmptyOverflow, FitInput, IndicatorSlot, LayoutDecision, Size, fit, fit_report,
};

// ── Helpers ─────────────────────────────────────────────────────────────

fn size_strategy() -> impl Strategy<Value = Size> {
    (1u16..=120, 1u16..=40).prop_map(|(w, h)| Size::new(w, h))
}

fn sizes_strategy() -> impl Strategy<Value = Vec<Size>> {
    prop::collection::vec(size_strategy(), 0..40)
}

fn policy_strategy() -> impl Strategy<Value = EmptyOverflow> {
    prop_oneof![
        Just(EmptyOverflow::IndicatorAlone),
        Just(EmptyOverflow::Collapse)
    ]
}

fn input(
    sizes: &[Size],
    indicator: Size,
    available_width: u16,
    spacing: u16,
    max_rows: u16,
    empty_overflow: EmptyOverflow,
) -> FitInput<'_> {
    FitInput {
        sizes,
        indicator,
        available_width,
        spacing,
        max_rows,
        empty_overflow,
    }
}

fn uniform(count: usize) -> Vec<Size> {
    vec![Size::new(50, 20); count]
}

fn scenario(sizes: &[Size], available_width: u16, max_rows: u16) -> LayoutDecision {
    fit(&input(
        sizes,
        Size::new(40, 20),
        available_width,
        10,
        max_rows,
        EmptyOverflow::IndicatorAlone,
    ))
}

// ═════════════════════════════════════════════════════════════════════════
// Scenarios
// ═════════════════════════════════════════════════════════════════════════

#[test]
fn single_row_budget_evicts_for_indicator() {
    let decision = scenario(&uniform(5), 200, 1);
    assert_eq!(decision.visible_count, 2);
    assert!(decision.has_overflow);
}

#[test]
fn two_row_budget_fits_everything() {
    let decision = scenario(&uniform(5), 200, 2);
    assert_eq!(decision.visible_count, 5);
    assert!(!decision.has_overflow);
}

#[test]
fn empty_sequence_for_any_parameters() {
    for (width, rows) in [(1, 1), (200, 1), (200, 9), (u16::MAX, u16::MAX)] {
        let decision = scenario(&[], width, rows);
        assert_eq!(decision.visible_count, 0);
        assert!(!decision.has_overflow);
    }
}

#[test]
fn indicator_fills_exact_remainder_of_row() {
    let full_pack = scenario(&uniform(3), 220, 1);
    assert_eq!(full_pack.visible_count, 3);

    let decision = scenario(&uniform(5), 220, 1);
    assert_eq!(decision.visible_count, full_pack.visible_count);
    assert!(decision.has_overflow);
    assert_eq!(decision.indicator, IndicatorSlot::SameRow);
}

#[test]
fn indicator_row_height_counts() {
    let sizes = vec![Size::new(50, 10); 5];
    let tall_indicator = fit(&input(
        &sizes,
        Size::new(40, 33),
        220,
        10,
        1,
        EmptyOverflow::IndicatorAlone,
    ));
    assert_eq!(tall_indicator.row_height, 33);
}

// ═════════════════════════════════════════════════════════════════════════
// 1 + 2. Bounds and overflow flag
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn visible_count_bounded_and_flag_consistent(
        sizes in sizes_strategy(),
        indicator in size_strategy(),
        width in 1u16..=400,
        spacing in 0u16..=20,
        rows in 1u16..=6,
        policy in policy_strategy(),
    ) {
        let decision = fit(&input(&sizes, indicator, width, spacing, rows, policy));
        prop_assert!(decision.visible_count <= sizes.len());
        prop_assert_eq!(
            decision.has_overflow,
            decision.visible_count < sizes.len(),
            "flag mismatch: {:?} for {} items", decision, sizes.len()
        );
        prop_assert_eq!(
            decision.indicator == IndicatorSlot::None,
            !decision.has_overflow
        );
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Idempotence
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn identical_input_identical_output(
        sizes in sizes_strategy(),
        indicator in size_strategy(),
        width in 1u16..=400,
        spacing in 0u16..=20,
        rows in 1u16..=6,
    ) {
        let fit_input = input(&sizes, indicator, width, spacing, rows, EmptyOverflow::IndicatorAlone);
        prop_assert_eq!(fit_report(&fit_input), fit_report(&fit_input));
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Monotone in width
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn wider_never_shows_fewer(
        sizes in sizes_strategy(),
        indicator in size_strategy(),
        width in 1u16..=400,
        extra in 0u16..=200,
        spacing in 0u16..=20,
        rows in 1u16..=6,
        policy in policy_strategy(),
    ) {
        let narrow = fit(&input(&sizes, indicator, width, spacing, rows, policy));
        let wide = fit(&input(&sizes, indicator, width + extra, spacing, rows, policy));
        prop_assert!(
            wide.visible_count >= narrow.visible_count,
            "width {} -> {} dropped {} -> {}",
            width, width + extra, narrow.visible_count, wide.visible_count
        );
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Monotone in row budget
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn more_rows_never_show_fewer(
        sizes in sizes_strategy(),
        indicator in size_strategy(),
        width in 1u16..=400,
        spacing in 0u16..=20,
        rows in 1u16..=6,
        extra in 0u16..=4,
        policy in policy_strategy(),
    ) {
        let few = fit(&input(&sizes, indicator, width, spacing, rows, policy));
        let many = fit(&input(&sizes, indicator, width, spacing, rows + extra, policy));
        prop_assert!(many.visible_count >= few.visible_count);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 6 + 7. Row shape
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn rows_respect_width_and_cover_visible_items(
        sizes in sizes_strategy(),
        indicator in size_strategy(),
        width in 1u16..=400,
        spacing in 0u16..=20,
        rows in 1u16..=6,
    ) {
        let report = fit_report(&input(&sizes, indicator, width, spacing, rows, EmptyOverflow::IndicatorAlone));
        let decision = report.decision;
        prop_assert!(report.rows.len() <= usize::from(rows));

        let last = report.rows.len().saturating_sub(1);
        for (position, row) in report.rows.iter().enumerate() {
            let members = row.items.len() + usize::from(row.indicator);
            let forced = decision.indicator == IndicatorSlot::Replacing && position == last;
            prop_assert!(
                row.width <= u32::from(width) || members == 1 || forced,
                "row {} over width: {:?}", position, row
            );
            prop_assert_eq!(row.indicator, decision.indicator.is_shown() && position == last);
        }

        let mut next = 0;
        for row in &report.rows {
            prop_assert_eq!(row.items.start, next);
            next = row.items.end;
        }
        prop_assert_eq!(next, decision.visible_count);

        let tallest = report.rows.iter().map(|row| row.height).max().unwrap_or(0);
        prop_assert_eq!(decision.row_height, tallest);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// Extreme values
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn no_panic_on_extreme_values(
        sizes in prop::collection::vec(
            (any::<u16>(), any::<u16>()).prop_map(|(w, h)| Size::new(w, h)),
            0..20,
        ),
        indicator in (any::<u16>(), any::<u16>()).prop_map(|(w, h)| Size::new(w, h)),
        width in any::<u16>(),
        spacing in any::<u16>(),
        rows in any::<u16>(),
        policy in policy_strategy(),
    ) {
        let decision = fit(&input(&sizes, indicator, width, spacing, rows, policy));
        prop_assert!(decision.visible_count <= sizes.len());
    }
}
