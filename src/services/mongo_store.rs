use async_trait::async_trait;
use futures_util::StreamExt;
use mongodb::{
    Collection, Database,
    bson::{Document, doc},
    options::{FindOneAndUpdateOptions, FindOptions, ReturnDocument},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    error::StoreError,
    models::{Meal, NewMeal, NewOrder, Order, OrderStatus},
};

use super::store::{GuardedWrite, OrderQuery, Store};

const MEALS: &str = "meals";
const ORDERS: &str = "orders";
const COUNTERS: &str = "counters";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct MealDoc {
    #[serde(rename = "_id")]
    id: i64,
    name: String,
    // stored as its decimal string, e.g. "130.00"
    price: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct OrderDoc {
    #[serde(rename = "_id")]
    id: i64,
    table_number: i32,
    items: Vec<i64>,
    status: OrderStatus,
    created_at: i64,
}

impl From<&Meal> for MealDoc {
    fn from(m: &Meal) -> Self {
        Self {
            id: m.id,
            name: m.name.clone(),
            price: m.price,
        }
    }
}

impl From<MealDoc> for Meal {
    fn from(d: MealDoc) -> Self {
        Meal {
            id: d.id,
            name: d.name,
            price: d.price,
        }
    }
}

impl From<&Order> for OrderDoc {
    fn from(o: &Order) -> Self {
        Self {
            id: o.id,
            table_number: i32::from(o.table_number),
            items: o.items.clone(),
            status: o.status,
            created_at: o.created_at,
        }
    }
}

impl TryFrom<OrderDoc> for Order {
    type Error = StoreError;

    fn try_from(d: OrderDoc) -> Result<Self, Self::Error> {
        let table_number = u16::try_from(d.table_number)
            .map_err(|_| StoreError::Corrupt(format!("order {} has table {}", d.id, d.table_number)))?;
        Ok(Order {
            id: d.id,
            table_number,
            items: d.items,
            status: d.status,
            created_at: d.created_at,
        })
    }
}

fn order_filter(q: &OrderQuery) -> Document {
    let mut filter = Document::new();
    if let Some(t) = q.table_number {
        filter.insert("table_number", i32::from(t));
    }
    if let Some(s) = q.status {
        filter.insert("status", s.as_str());
    }
    if let Some((from, to)) = q.created_between {
        filter.insert("created_at", doc! { "$gte": from, "$lt": to });
    }
    filter
}

fn open_order(id: i64) -> Document {
    doc! { "_id": id, "status": { "$ne": OrderStatus::PaidFor.as_str() } }
}

pub struct MongoStore {
    db: Database,
}

impl MongoStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn meals(&self) -> Collection<MealDoc> {
        self.db.collection::<MealDoc>(MEALS)
    }

    fn orders(&self) -> Collection<OrderDoc> {
        self.db.collection::<OrderDoc>(ORDERS)
    }

    async fn next_id(&self, sequence: &str) -> Result<i64, StoreError> {
        let counters = self.db.collection::<Document>(COUNTERS);
        let opts = FindOneAndUpdateOptions::builder()
            .upsert(true)
            .return_document(ReturnDocument::After)
            .build();

        let counter = counters
            .find_one_and_update(doc! { "_id": sequence }, doc! { "$inc": { "seq": 1_i64 } }, opts)
            .await?
            .ok_or_else(|| StoreError::Corrupt(format!("counter {sequence} missing after upsert")))?;

        counter
            .get_i64("seq")
            .map_err(|e| StoreError::Corrupt(format!("counter {sequence}: {e}")))
    }

    // an unmatched guarded write is either a missing order or a paid one
    async fn classify_miss(&self, id: i64) -> Result<GuardedWrite, StoreError> {
        match self.orders().find_one(doc! { "_id": id }, None).await? {
            Some(_) => Ok(GuardedWrite::Finalized),
            None => Ok(GuardedWrite::Missing),
        }
    }
}

#[async_trait]
impl Store for MongoStore {
    async fn ping(&self) -> Result<(), StoreError> {
        self.db.run_command(doc! { "ping": 1 }, None).await?;
        Ok(())
    }

    async fn list_meals(&self) -> Result<Vec<Meal>, StoreError> {
        let opts = FindOptions::builder().sort(doc! { "_id": 1 }).build();
        let mut cursor = self.meals().find(None, opts).await?;

        let mut items: Vec<Meal> = Vec::new();
        while let Some(res) = cursor.next().await {
            items.push(res?.into());
        }
        Ok(items)
    }

    async fn get_meal(&self, id: i64) -> Result<Option<Meal>, StoreError> {
        let found = self.meals().find_one(doc! { "_id": id }, None).await?;
        Ok(found.map(Meal::from))
    }

    async fn find_meals(&self, ids: &[i64]) -> Result<Vec<Meal>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut cursor = self
            .meals()
            .find(doc! { "_id": { "$in": ids.to_vec() } }, None)
            .await?;

        let mut items: Vec<Meal> = Vec::new();
        while let Some(res) = cursor.next().await {
            items.push(res?.into());
        }
        Ok(items)
    }

    async fn insert_meal(&self, meal: NewMeal) -> Result<Meal, StoreError> {
        let meal = meal.with_id(self.next_id(MEALS).await?);
        self.meals().insert_one(MealDoc::from(&meal), None).await?;
        Ok(meal)
    }

    async fn replace_meal(&self, meal: &Meal) -> Result<bool, StoreError> {
        let res = self
            .meals()
            .replace_one(doc! { "_id": meal.id }, MealDoc::from(meal), None)
            .await?;
        Ok(res.matched_count > 0)
    }

    async fn delete_meal(&self, id: i64) -> Result<bool, StoreError> {
        let res = self.meals().delete_one(doc! { "_id": id }, None).await?;
        if res.deleted_count == 0 {
            return Ok(false);
        }

        self.orders()
            .update_many(doc! { "items": id }, doc! { "$pull": { "items": id } }, None)
            .await?;
        Ok(true)
    }

    async fn list_orders(&self, query: &OrderQuery) -> Result<Vec<Order>, StoreError> {
        let opts = FindOptions::builder().sort(doc! { "_id": 1 }).build();
        let mut cursor = self.orders().find(order_filter(query), opts).await?;

        let mut items: Vec<Order> = Vec::new();
        while let Some(res) = cursor.next().await {
            items.push(Order::try_from(res?)?);
        }
        Ok(items)
    }

    async fn get_order(&self, id: i64) -> Result<Option<Order>, StoreError> {
        match self.orders().find_one(doc! { "_id": id }, None).await? {
            Some(d) => Ok(Some(Order::try_from(d)?)),
            None => Ok(None),
        }
    }

    async fn insert_order(&self, order: NewOrder) -> Result<Order, StoreError> {
        let order = order.with_id(self.next_id(ORDERS).await?);
        self.orders().insert_one(OrderDoc::from(&order), None).await?;
        Ok(order)
    }

    async fn replace_open_order(&self, order: &Order) -> Result<GuardedWrite, StoreError> {
        let res = self
            .orders()
            .replace_one(open_order(order.id), OrderDoc::from(order), None)
            .await?;

        if res.matched_count > 0 {
            return Ok(GuardedWrite::Applied);
        }
        self.classify_miss(order.id).await
    }

    async fn delete_open_order(&self, id: i64) -> Result<GuardedWrite, StoreError> {
        let res = self.orders().delete_one(open_order(id), None).await?;

        if res.deleted_count > 0 {
            return Ok(GuardedWrite::Applied);
        }
        self.classify_miss(id).await
    }
}
