//! Estimate total aggregation.
//!
//! An estimate's `total_cost` and `total_price` always equal the sum of its
//! line items' `total_price`. They are recomputed from scratch after every
//! line item mutation; no markup is applied.

use tracing::debug;
use uuid::Uuid;

use crate::error::Result;
use crate::money::sum_prices;
use crate::storage::{LineItem, StorageEngine};

/// Sum of the items' prices.
pub fn line_items_total(items: &[LineItem]) -> f64 {
    sum_prices(items.iter().map(|item| Some(item.total_price)))
}

/// Recompute and store an estimate's totals, returning the new total.
pub fn recalculate<S>(storage: &mut S, estimate_id: &Uuid) -> Result<f64>
where
    S: StorageEngine + ?Sized,
{
    let items = storage.list_line_items(estimate_id)?;
    let total = line_items_total(&items);
    storage.set_estimate_totals(estimate_id, total, total)?;
    debug!(%estimate_id, items = items.len(), total, "recalculated totals");
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{
        EstimateStatus, LineItemValues, NewEstimate, NewLineItem, ProjectFields, SqliteStorage,
    };

    fn seeded() -> (SqliteStorage, Uuid) {
        let mut storage = SqliteStorage::open_in_memory().unwrap();
        let actor = Uuid::new_v4();
        let project_id = storage
            .insert_project(
                &ProjectFields {
                    name: "Deck".to_string(),
                    ..Default::default()
                },
                &actor,
            )
            .unwrap();
        let estimate_id = storage
            .insert_estimate(&NewEstimate {
                project_id,
                name: "Base".to_string(),
                status: EstimateStatus::Draft,
                notes: None,
                created_by: actor,
            })
            .unwrap();
        (storage, estimate_id)
    }

    #[test]
    fn test_recalculate_sums_items() {
        let (mut storage, estimate_id) = seeded();
        let items: Vec<NewLineItem> = [1200.0, 350.5, 0.0]
            .iter()
            .enumerate()
            .map(|(i, value)| NewLineItem {
                estimate_id,
                values: LineItemValues::new(format!("Item {}", i), *value),
                sort_order: i as i64,
            })
            .collect();
        storage.insert_line_items(&items).unwrap();

        let total = recalculate(&mut storage, &estimate_id).unwrap();
        assert_eq!(total, 1550.5);

        let estimate = storage.get_estimate(&estimate_id).unwrap().unwrap();
        assert_eq!(estimate.total_cost, 1550.5);
        assert_eq!(estimate.total_price, 1550.5);
        assert_eq!(estimate.markup_percentage, 0.0);
    }

    #[test]
    fn test_recalculate_is_idempotent_and_zero_when_empty() {
        let (mut storage, estimate_id) = seeded();
        assert_eq!(recalculate(&mut storage, &estimate_id).unwrap(), 0.0);
        assert_eq!(recalculate(&mut storage, &estimate_id).unwrap(), 0.0);
    }
}
