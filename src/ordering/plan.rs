use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

use crate::database::models::{NewItem, OrderedItem};

use super::error::{OrderError, ReorderMismatch};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderUpdate {
    pub item_id: Uuid,
    pub order: i64,
}

/// The writes one ordering operation needs. A store applies a plan all-or-nothing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderPlan {
    pub updates: Vec<OrderUpdate>,
    pub insert: Option<(NewItem, i64)>,
    pub delete: Option<Uuid>,
}

impl OrderPlan {
    pub fn is_noop(&self) -> bool {
        self.updates.is_empty() && self.insert.is_none() && self.delete.is_none()
    }

    /// Number of row writes the plan performs.
    pub fn write_count(&self) -> usize {
        self.updates.len() + usize::from(self.insert.is_some()) + usize::from(self.delete.is_some())
    }

    fn set(&mut self, item: &OrderedItem, order: i64) {
        if item.order != order {
            self.updates.push(OrderUpdate {
                item_id: item.id,
                order,
            });
        }
    }
}

/// Place `item` after the current maximum, or at 0 in an empty container.
pub fn plan_append(items: &[OrderedItem], item: NewItem) -> OrderPlan {
    let order = items
        .iter()
        .map(|i| i.order)
        .max()
        .map(|max| max.saturating_add(1))
        .unwrap_or(0);

    OrderPlan {
        insert: Some((item, order)),
        ..OrderPlan::default()
    }
}

/// Place `item` so it displays at index `position` of the sorted `items`.
///
/// Takes the integral midpoint of the neighbouring orders when one exists
/// (the slot before index 0 is treated as order -1, keeping orders
/// non-negative). Otherwise every item is renumbered to `index * step` with
/// the new item occupying the slot at `position`.
pub fn plan_insert_at(
    items: &[OrderedItem],
    item: NewItem,
    position: usize,
    step: i64,
) -> OrderPlan {
    if position >= items.len() {
        return plan_append(items, item);
    }

    let next = items[position].order;
    let prev = if position == 0 { -1 } else { items[position - 1].order };

    if next.saturating_sub(prev) >= 2 {
        let midpoint = prev + (next - prev) / 2;
        return OrderPlan {
            insert: Some((item, midpoint)),
            ..OrderPlan::default()
        };
    }

    let mut plan = OrderPlan::default();
    for (index, existing) in items.iter().enumerate() {
        let slot = if index < position { index } else { index + 1 };
        plan.set(existing, slot as i64 * step);
    }
    plan.insert = Some((item, position as i64 * step));
    plan
}

/// Swap `item_id` with its neighbour in `direction`. Already first/last is a no-op.
pub fn plan_move_step(
    items: &[OrderedItem],
    item_id: Uuid,
    direction: Direction,
    step: i64,
) -> Result<OrderPlan, OrderError> {
    let index = items
        .iter()
        .position(|i| i.id == item_id)
        .ok_or_else(|| OrderError::item_not_found(item_id))?;

    let neighbour = match direction {
        Direction::Up => index.checked_sub(1),
        Direction::Down => (index + 1 < items.len()).then_some(index + 1),
    };
    let Some(neighbour) = neighbour else {
        return Ok(OrderPlan::default());
    };

    let mut plan = OrderPlan::default();
    let (moving, other) = (&items[index], &items[neighbour]);

    if moving.order != other.order {
        plan.set(moving, other.order);
        plan.set(other, moving.order);
        return Ok(plan);
    }

    // Equal orders cannot be swapped; renumber the whole sequence with the pair exchanged.
    let mut sequence: Vec<&OrderedItem> = items.iter().collect();
    sequence.swap(index, neighbour);
    for (slot, existing) in sequence.into_iter().enumerate() {
        plan.set(existing, slot as i64 * step);
    }
    Ok(plan)
}

/// Compare a submitted id sequence against the container's current items.
pub fn reorder_mismatch(items: &[OrderedItem], ids: &[Uuid]) -> ReorderMismatch {
    let current: HashSet<Uuid> = items.iter().map(|i| i.id).collect();
    let mut seen = HashSet::with_capacity(ids.len());
    let mut mismatch = ReorderMismatch::default();

    for id in ids {
        if !seen.insert(*id) {
            if !mismatch.duplicated.contains(id) {
                mismatch.duplicated.push(*id);
            }
        } else if !current.contains(id) {
            mismatch.unexpected.push(*id);
        }
    }

    mismatch.missing = items
        .iter()
        .filter(|i| !seen.contains(&i.id))
        .map(|i| i.id)
        .collect();

    mismatch
}

/// Assign `order = index` following `ids`, which must name every current item exactly once.
pub fn plan_bulk_reorder(items: &[OrderedItem], ids: &[Uuid]) -> Result<OrderPlan, OrderError> {
    let mismatch = reorder_mismatch(items, ids);
    if !mismatch.is_empty() {
        return Err(OrderError::InvalidReorder(mismatch));
    }

    let mut plan = OrderPlan::default();
    for (index, id) in ids.iter().enumerate() {
        if let Some(existing) = items.iter().find(|i| i.id == *id) {
            plan.set(existing, index as i64);
        }
    }
    Ok(plan)
}

/// Remove `item_id`. Remaining orders are left untouched; gaps are fine.
pub fn plan_delete(items: &[OrderedItem], item_id: Uuid) -> Result<OrderPlan, OrderError> {
    if !items.iter().any(|i| i.id == item_id) {
        return Err(OrderError::item_not_found(item_id));
    }
    Ok(OrderPlan {
        delete: Some(item_id),
        ..OrderPlan::default()
    })
}

/// Apply a plan to an in-memory snapshot and return it sorted by `(order, id)`.
pub fn apply_to_snapshot(
    items: &[OrderedItem],
    plan: &OrderPlan,
    container_id: Uuid,
) -> Vec<OrderedItem> {
    let mut next: Vec<OrderedItem> = items
        .iter()
        .filter(|i| Some(i.id) != plan.delete)
        .cloned()
        .collect();

    for update in &plan.updates {
        if let Some(item) = next.iter_mut().find(|i| i.id == update.item_id) {
            item.order = update.order;
        }
    }

    if let Some((item, order)) = &plan.insert {
        next.push(OrderedItem {
            id: item.id,
            container_id,
            order: *order,
            active: true,
            payload: item.payload.clone(),
            created_at: chrono::Utc::now(),
        });
    }

    sort_items(&mut next);
    next
}

pub fn sort_items(items: &mut [OrderedItem]) {
    items.sort_by(|a, b| a.order.cmp(&b.order).then(a.id.cmp(&b.id)));
}
