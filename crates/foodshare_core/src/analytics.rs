//! crates/foodshare_core/src/analytics.rs
//!
//! Read-only aggregation over historical status transitions. Everything here
//! is a pure function of the items passed in, recomputed per request; there
//! is no caching layer at this data scale.

use chrono::{Datelike, NaiveDate};

use crate::domain::{FoodCategory, FoodItem, FoodStatus};

/// Per-month counts of terminal transitions, index-aligned across the three
/// vectors. Months are keyed `YYYY-MM`, oldest first, and zero-filled so a
/// month with no transitions still appears.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthlyTrend {
    pub months: Vec<String>,
    pub consumed: Vec<u32>,
    pub wasted: Vec<u32>,
}

/// Consumed/wasted tallies for one category.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryWaste {
    pub category: FoodCategory,
    pub consumed: u32,
    pub wasted: u32,
    /// `wasted / (wasted + consumed) * 100`, with 0/0 defined as 0%.
    pub waste_percentage: f64,
}

/// Summary counts across a user's whole inventory.
#[derive(Debug, Clone, PartialEq)]
pub struct WasteStats {
    pub total_items: u32,
    pub active: u32,
    pub consumed: u32,
    pub wasted: u32,
    pub waste_percentage: f64,
    pub consumption_percentage: f64,
}

/// Rough environmental estimates derived from the wasted item count.
#[derive(Debug, Clone, PartialEq)]
pub struct EnvironmentalImpact {
    pub co2_saved_kg: f64,
    pub water_saved_liters: u64,
    pub meals_saved: u32,
}

// Per-item estimates; calibrated roughly, like the dashboards they feed.
const CO2_KG_PER_ITEM: f64 = 2.5;
const WATER_LITERS_PER_ITEM: u64 = 1000;
const MEALS_PER_ITEM: u32 = 3;

/// Steps `back` whole months before `(year, month)`.
fn months_back(year: i32, month: u32, back: u32) -> (i32, u32) {
    let total = year * 12 + (month as i32 - 1) - back as i32;
    (total.div_euclid(12), (total.rem_euclid(12) + 1) as u32)
}

/// Counts terminal transitions per month over the last `n_months`, the
/// current month included. Items still `active`, or terminal items missing a
/// transition timestamp, are ignored.
pub fn monthly_trend(items: &[FoodItem], today: NaiveDate, n_months: u32) -> MonthlyTrend {
    let mut months = Vec::with_capacity(n_months as usize);
    let mut consumed = vec![0u32; n_months as usize];
    let mut wasted = vec![0u32; n_months as usize];

    let slots: Vec<(i32, u32)> = (0..n_months)
        .rev()
        .map(|back| months_back(today.year(), today.month(), back))
        .collect();
    for &(year, month) in &slots {
        months.push(format!("{year:04}-{month:02}"));
    }

    for item in items {
        let Some(at) = item.status_changed_at else {
            continue;
        };
        let bucket = (at.year(), at.month());
        let Some(idx) = slots.iter().position(|&slot| slot == bucket) else {
            continue;
        };
        match item.status {
            FoodStatus::Consumed => consumed[idx] += 1,
            FoodStatus::Wasted => wasted[idx] += 1,
            FoodStatus::Active => {}
        }
    }

    MonthlyTrend {
        months,
        consumed,
        wasted,
    }
}

/// Waste share per category over terminal items. Every category appears,
/// including those with no recorded outcomes (0%).
pub fn category_breakdown(items: &[FoodItem]) -> Vec<CategoryWaste> {
    FoodCategory::ALL
        .iter()
        .map(|&category| {
            let mut consumed = 0u32;
            let mut wasted = 0u32;
            for item in items.iter().filter(|i| i.category == category) {
                match item.status {
                    FoodStatus::Consumed => consumed += 1,
                    FoodStatus::Wasted => wasted += 1,
                    FoodStatus::Active => {}
                }
            }
            CategoryWaste {
                category,
                consumed,
                wasted,
                waste_percentage: percentage(wasted, consumed + wasted),
            }
        })
        .collect()
}

/// Status tallies over a user's full inventory, percentages against the
/// total item count.
pub fn waste_stats(items: &[FoodItem]) -> WasteStats {
    let total_items = items.len() as u32;
    let active = items
        .iter()
        .filter(|i| i.status == FoodStatus::Active)
        .count() as u32;
    let consumed = items
        .iter()
        .filter(|i| i.status == FoodStatus::Consumed)
        .count() as u32;
    let wasted = items
        .iter()
        .filter(|i| i.status == FoodStatus::Wasted)
        .count() as u32;

    WasteStats {
        total_items,
        active,
        consumed,
        wasted,
        waste_percentage: percentage(wasted, total_items),
        consumption_percentage: percentage(consumed, total_items),
    }
}

/// Environmental impact of avoiding `wasted_count` more wasted items.
pub fn environmental_impact(wasted_count: u32) -> EnvironmentalImpact {
    EnvironmentalImpact {
        co2_saved_kg: wasted_count as f64 * CO2_KG_PER_ITEM,
        water_saved_liters: wasted_count as u64 * WATER_LITERS_PER_ITEM,
        meals_saved: wasted_count * MEALS_PER_ITEM,
    }
}

fn percentage(part: u32, whole: u32) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    (part as f64 / whole as f64) * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn terminal_item(
        category: FoodCategory,
        status: FoodStatus,
        year: i32,
        month: u32,
    ) -> FoodItem {
        FoodItem {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            name: "x".to_string(),
            quantity: "1".to_string(),
            category,
            storage_location: None,
            purchase_date: NaiveDate::from_ymd_opt(year, month, 1).unwrap(),
            expiry_date: NaiveDate::from_ymd_opt(year, month, 20).unwrap(),
            notes: None,
            status,
            status_changed_at: Some(Utc.with_ymd_and_hms(year, month, 15, 9, 0, 0).unwrap()),
            created_at: Utc.with_ymd_and_hms(year, month, 1, 9, 0, 0).unwrap(),
        }
    }

    #[test]
    fn trend_buckets_by_transition_month_and_zero_fills() {
        let items = vec![
            terminal_item(FoodCategory::Dairy, FoodStatus::Wasted, 2025, 3),
            terminal_item(FoodCategory::Fruits, FoodStatus::Consumed, 2025, 2),
            terminal_item(FoodCategory::Fruits, FoodStatus::Consumed, 2025, 2),
            // Outside the window, must not be counted.
            terminal_item(FoodCategory::Meat, FoodStatus::Wasted, 2024, 11),
        ];
        let today = NaiveDate::from_ymd_opt(2025, 3, 20).unwrap();

        let trend = monthly_trend(&items, today, 3);
        assert_eq!(trend.months, vec!["2025-01", "2025-02", "2025-03"]);
        assert_eq!(trend.consumed, vec![0, 2, 0]);
        assert_eq!(trend.wasted, vec![0, 0, 1]);
    }

    #[test]
    fn trend_window_crosses_year_boundary() {
        let items = vec![terminal_item(
            FoodCategory::Grains,
            FoodStatus::Consumed,
            2024,
            12,
        )];
        let today = NaiveDate::from_ymd_opt(2025, 1, 5).unwrap();

        let trend = monthly_trend(&items, today, 2);
        assert_eq!(trend.months, vec!["2024-12", "2025-01"]);
        assert_eq!(trend.consumed, vec![1, 0]);
    }

    #[test]
    fn breakdown_defines_zero_over_zero_as_zero_percent() {
        let breakdown = category_breakdown(&[]);
        assert_eq!(breakdown.len(), FoodCategory::ALL.len());
        for entry in breakdown {
            assert_eq!(entry.waste_percentage, 0.0);
        }
    }

    #[test]
    fn breakdown_computes_waste_share_per_category() {
        let items = vec![
            terminal_item(FoodCategory::Dairy, FoodStatus::Wasted, 2025, 3),
            terminal_item(FoodCategory::Dairy, FoodStatus::Consumed, 2025, 3),
            terminal_item(FoodCategory::Dairy, FoodStatus::Consumed, 2025, 3),
            terminal_item(FoodCategory::Meat, FoodStatus::Wasted, 2025, 3),
        ];
        let breakdown = category_breakdown(&items);

        let dairy = breakdown
            .iter()
            .find(|e| e.category == FoodCategory::Dairy)
            .unwrap();
        assert_eq!(dairy.consumed, 2);
        assert_eq!(dairy.wasted, 1);
        assert!((dairy.waste_percentage - 100.0 / 3.0).abs() < 1e-9);

        let meat = breakdown
            .iter()
            .find(|e| e.category == FoodCategory::Meat)
            .unwrap();
        assert_eq!(meat.waste_percentage, 100.0);
    }

    #[test]
    fn stats_handle_empty_inventory() {
        let stats = waste_stats(&[]);
        assert_eq!(stats.total_items, 0);
        assert_eq!(stats.waste_percentage, 0.0);
        assert_eq!(stats.consumption_percentage, 0.0);
    }

    #[test]
    fn impact_scales_with_wasted_count() {
        let impact = environmental_impact(4);
        assert_eq!(impact.co2_saved_kg, 10.0);
        assert_eq!(impact.water_saved_liters, 4000);
        assert_eq!(impact.meals_saved, 12);
    }
}
