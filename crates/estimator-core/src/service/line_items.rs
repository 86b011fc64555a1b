//! Line item operations.
//!
//! Every item is a lump sum: quantity 1, unit `LS`, and a single value copied
//! into `unit_cost`, `total_cost` and `total_price`. Any change to the set of
//! items or their values recomputes the estimate totals before returning.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use super::{required, totals, EstimateService};
use crate::auth::Session;
use crate::error::{EstimatorError, Result};
use crate::generation::DraftLineItem;
use crate::invalidation::Invalidation;
use crate::money::entered_value;
use crate::storage::{LineItemValues, NewLineItem, SortUpdate, StorageEngine};

/// User-supplied line item fields.
#[derive(Debug, Clone, PartialEq)]
pub struct LineItemInput {
    pub description: String,
    pub proposal_description: Option<String>,
    pub value: f64,
}

impl LineItemInput {
    pub fn new(description: impl Into<String>, value: f64) -> Self {
        Self {
            description: description.into(),
            proposal_description: None,
            value,
        }
    }

    pub fn proposal(mut self, text: impl Into<String>) -> Self {
        self.proposal_description = Some(text.into());
        self
    }

    fn to_values(&self) -> Result<LineItemValues> {
        let description = required(&self.description, "Line item description")?;
        let values = LineItemValues::new(description, entered_value(self.value));
        Ok(match &self.proposal_description {
            Some(text) => values.with_proposal(text.as_str()),
            None => values,
        })
    }
}

/// Direction for [`EstimateService::move_line_item`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Up,
    Down,
}

/// How [`EstimateService::bulk_create_line_items`] treats existing items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkMode {
    /// Delete every existing item first
    #[default]
    Replace,
    /// Keep existing items and add after them
    Append,
}

impl BulkMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            BulkMode::Replace => "replace",
            BulkMode::Append => "append",
        }
    }
}

impl FromStr for BulkMode {
    type Err = EstimatorError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim() {
            "replace" => Ok(BulkMode::Replace),
            "append" => Ok(BulkMode::Append),
            other => Err(EstimatorError::InvalidInput(format!(
                "Unknown mode '{}' (expected replace or append)",
                other
            ))),
        }
    }
}

impl<S: StorageEngine> EstimateService<S> {
    fn next_sort_order(&self, estimate_id: &Uuid) -> Result<i64> {
        Ok(self
            .storage
            .max_sort_order(estimate_id)?
            .map_or(0, |max| max + 1))
    }

    fn after_line_item_change(&mut self, project_id: Uuid, estimate_id: &Uuid) -> Result<f64> {
        let total = totals::recalculate(&mut self.storage, estimate_id)?;
        self.emit(&Invalidation::for_estimate(project_id, Some(*estimate_id)));
        Ok(total)
    }

    /// Append a line item after the current last one.
    pub fn add_line_item(
        &mut self,
        session: &Session,
        estimate_id: &Uuid,
        input: &LineItemInput,
    ) -> Result<Uuid> {
        session.require_actor()?;
        let values = input.to_values()?;
        let estimate = self.require_estimate(estimate_id)?;

        let sort_order = self.next_sort_order(estimate_id)?;
        let ids = self.storage.insert_line_items(&[NewLineItem {
            estimate_id: *estimate_id,
            values,
            sort_order,
        }])?;
        let id = ids.into_iter().next().ok_or_else(|| {
            EstimatorError::Persistence("Line item insert returned no id".to_string())
        })?;

        let total = self.after_line_item_change(estimate.project_id, estimate_id)?;
        info!(%id, %estimate_id, sort_order, total, "added line item");
        Ok(id)
    }

    /// Overwrite a line item's description, proposal text and value.
    pub fn update_line_item(
        &mut self,
        session: &Session,
        line_item_id: &Uuid,
        estimate_id: &Uuid,
        input: &LineItemInput,
    ) -> Result<()> {
        session.require_actor()?;
        let values = input.to_values()?;
        let estimate = self.require_estimate(estimate_id)?;
        self.require_line_item(estimate_id, line_item_id)?;

        self.storage.update_line_item(line_item_id, &values)?;

        let total = self.after_line_item_change(estimate.project_id, estimate_id)?;
        info!(%line_item_id, %estimate_id, total, "updated line item");
        Ok(())
    }

    pub fn delete_line_item(
        &mut self,
        session: &Session,
        line_item_id: &Uuid,
        estimate_id: &Uuid,
    ) -> Result<()> {
        session.require_actor()?;
        let estimate = self.require_estimate(estimate_id)?;
        self.require_line_item(estimate_id, line_item_id)?;

        self.storage.delete_line_item(line_item_id)?;

        let total = self.after_line_item_change(estimate.project_id, estimate_id)?;
        info!(%line_item_id, %estimate_id, total, "deleted line item");
        Ok(())
    }

    /// Apply new sort orders one item at a time, in list order.
    ///
    /// Stops at the first failing item; updates already applied stay applied.
    pub fn reorder_line_items(
        &mut self,
        session: &Session,
        estimate_id: &Uuid,
        updates: &[SortUpdate],
    ) -> Result<()> {
        session.require_actor()?;
        let estimate = self.require_estimate(estimate_id)?;

        for update in updates {
            self.require_line_item(estimate_id, &update.id)?;
            self.storage.set_sort_order(&update.id, update.sort_order)?;
        }

        info!(%estimate_id, count = updates.len(), "reordered line items");
        self.emit(&Invalidation::for_estimate(
            estimate.project_id,
            Some(*estimate_id),
        ));
        Ok(())
    }

    /// Swap a line item with its neighbour in display order.
    ///
    /// Returns `false` without writing anything when the item is already
    /// first (moving up) or last (moving down).
    pub fn move_line_item(
        &mut self,
        session: &Session,
        estimate_id: &Uuid,
        line_item_id: &Uuid,
        direction: MoveDirection,
    ) -> Result<bool> {
        session.require_actor()?;
        let items = self.list_line_items(estimate_id)?;

        let index = items
            .iter()
            .position(|item| item.id == *line_item_id)
            .ok_or_else(|| {
                EstimatorError::NotFound(format!(
                    "Line item {} not found in estimate {}",
                    line_item_id, estimate_id
                ))
            })?;

        let neighbour = match direction {
            MoveDirection::Up if index > 0 => index - 1,
            MoveDirection::Down if index + 1 < items.len() => index + 1,
            _ => return Ok(false),
        };

        let current = &items[index];
        let other = &items[neighbour];
        let updates = if current.sort_order != other.sort_order {
            vec![
                SortUpdate {
                    id: current.id,
                    sort_order: other.sort_order,
                },
                SortUpdate {
                    id: other.id,
                    sort_order: current.sort_order,
                },
            ]
        } else {
            // Equal sort orders cannot be swapped; renumber by position instead.
            let mut order: Vec<Uuid> = items.iter().map(|item| item.id).collect();
            order.swap(index, neighbour);
            order
                .into_iter()
                .enumerate()
                .filter_map(|(position, id)| {
                    let position = position as i64;
                    items
                        .iter()
                        .find(|item| item.id == id)
                        .filter(|item| item.sort_order != position)
                        .map(|_| SortUpdate {
                            id,
                            sort_order: position,
                        })
                })
                .collect()
        };

        self.reorder_line_items(session, estimate_id, &updates)?;
        Ok(true)
    }

    /// Insert a batch of line items, replacing or appending to the existing
    /// ones, and return how many were inserted.
    ///
    /// Items with a blank description are dropped. Prices are rounded to cents
    /// and negative or non-finite prices stored as zero.
    pub fn bulk_create_line_items(
        &mut self,
        session: &Session,
        estimate_id: &Uuid,
        items: Vec<DraftLineItem>,
        mode: BulkMode,
    ) -> Result<usize> {
        session.require_actor()?;
        let estimate = self.require_estimate(estimate_id)?;

        let items: Vec<DraftLineItem> = items
            .into_iter()
            .filter_map(DraftLineItem::sanitized)
            .collect();

        let start = match mode {
            BulkMode::Replace => {
                let removed = self.storage.delete_line_items_for_estimate(estimate_id)?;
                info!(%estimate_id, removed, "cleared line items for replace");
                0
            }
            BulkMode::Append => self.next_sort_order(estimate_id)?,
        };

        let rows: Vec<NewLineItem> = items
            .into_iter()
            .enumerate()
            .map(|(index, item)| NewLineItem {
                estimate_id: *estimate_id,
                values: LineItemValues::new(item.description, item.total_price)
                    .with_proposal(item.proposal_description),
                sort_order: start + index as i64,
            })
            .collect();

        if !rows.is_empty() {
            if let Err(err) = self.storage.insert_line_items(&rows) {
                if mode == BulkMode::Replace {
                    // The old items are already gone; keep the totals in step.
                    warn!(%estimate_id, error = %err, "replace insert failed after clearing items");
                    self.after_line_item_change(estimate.project_id, estimate_id)?;
                }
                return Err(err);
            }
        }

        let total = self.after_line_item_change(estimate.project_id, estimate_id)?;
        info!(%estimate_id, mode = mode.as_str(), inserted = rows.len(), total, "bulk created line items");
        Ok(rows.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_requires_description() {
        let err = LineItemInput::new("  ", 10.0).to_values().unwrap_err();
        assert!(matches!(err, EstimatorError::Validation(_)));
    }

    #[test]
    fn test_input_normalizes_value_and_proposal() {
        let values = LineItemInput::new(" Tile ", f64::NAN)
            .proposal("")
            .to_values()
            .unwrap();
        assert_eq!(values.description, "Tile");
        assert_eq!(values.value, 0.0);
        assert!(values.proposal_description.is_none());
    }

    #[test]
    fn test_bulk_mode_parse() {
        assert_eq!("append".parse::<BulkMode>().unwrap(), BulkMode::Append);
        assert!(matches!(
            "merge".parse::<BulkMode>(),
            Err(EstimatorError::InvalidInput(_))
        ));
    }
}
