use async_trait::async_trait;
use chrono::Weekday;
use dashmap::DashMap;

use crate::model::{DayHours, RestaurantId, Table, TableId, TableStatus};
use crate::store::StoreError;

/// Per-restaurant, per-weekday opening hours. The weekday key is the typed
/// [`chrono::Weekday`], derived from the reservation date, so callers never
/// pass locale-dependent day names.
#[async_trait]
pub trait HoursCatalog: Send + Sync {
    async fn day_hours(
        &self,
        restaurant_id: RestaurantId,
        weekday: Weekday,
    ) -> Result<Option<DayHours>, StoreError>;
}

#[async_trait]
pub trait TableCatalog: Send + Sync {
    /// All tables for a restaurant, in stable inventory order.
    async fn tables(&self, restaurant_id: RestaurantId) -> Result<Vec<Table>, StoreError>;
}

/// In-memory hours catalog for tests and embedders without a database.
#[derive(Default)]
pub struct StaticHours {
    days: DashMap<(RestaurantId, Weekday), DayHours>,
}

impl StaticHours {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, restaurant_id: RestaurantId, weekday: Weekday, hours: DayHours) {
        self.days.insert((restaurant_id, weekday), hours);
    }
}

#[async_trait]
impl HoursCatalog for StaticHours {
    async fn day_hours(
        &self,
        restaurant_id: RestaurantId,
        weekday: Weekday,
    ) -> Result<Option<DayHours>, StoreError> {
        Ok(self.days.get(&(restaurant_id, weekday)).map(|e| e.value().clone()))
    }
}

/// In-memory table inventory. Insertion order is preserved per restaurant;
/// that order is the tie-break for equal-capacity tables.
#[derive(Default)]
pub struct StaticTables {
    by_restaurant: DashMap<RestaurantId, Vec<Table>>,
}

impl StaticTables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, table: Table) {
        self.by_restaurant.entry(table.restaurant_id).or_default().push(table);
    }

    pub fn set_status(&self, restaurant_id: RestaurantId, table_id: TableId, status: TableStatus) {
        if let Some(mut tables) = self.by_restaurant.get_mut(&restaurant_id)
            && let Some(t) = tables.iter_mut().find(|t| t.id == table_id)
        {
            t.status = status;
        }
    }

    pub fn set_capacity(&self, restaurant_id: RestaurantId, table_id: TableId, capacity: u32) {
        if let Some(mut tables) = self.by_restaurant.get_mut(&restaurant_id)
            && let Some(t) = tables.iter_mut().find(|t| t.id == table_id)
        {
            t.capacity = capacity;
        }
    }
}

#[async_trait]
impl TableCatalog for StaticTables {
    async fn tables(&self, restaurant_id: RestaurantId) -> Result<Vec<Table>, StoreError> {
        Ok(self
            .by_restaurant
            .get(&restaurant_id)
            .map(|e| e.value().clone())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(id: TableId, capacity: u32) -> Table {
        Table { id, restaurant_id: 1, capacity, status: TableStatus::Available }
    }

    #[tokio::test]
    async fn tables_keep_insertion_order() {
        let cat = StaticTables::new();
        cat.add(table(10, 6));
        cat.add(table(11, 2));
        cat.add(table(12, 4));
        let tables = cat.tables(1).await.unwrap();
        assert_eq!(tables.iter().map(|t| t.id).collect::<Vec<_>>(), vec![10, 11, 12]);
        assert!(cat.tables(2).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn staff_mutations_visible_on_next_read() {
        let cat = StaticTables::new();
        cat.add(table(10, 6));
        cat.set_status(1, 10, TableStatus::Maintenance);
        cat.set_capacity(1, 10, 8);
        let tables = cat.tables(1).await.unwrap();
        assert_eq!(tables[0].status, TableStatus::Maintenance);
        assert_eq!(tables[0].capacity, 8);
    }

    #[tokio::test]
    async fn hours_miss_is_none() {
        let hours = StaticHours::new();
        assert!(hours.day_hours(1, Weekday::Mon).await.unwrap().is_none());
        hours.set(1, Weekday::Mon, DayHours::closed());
        let day = hours.day_hours(1, Weekday::Mon).await.unwrap().unwrap();
        assert!(!day.is_open);
    }
}
