use mongodb::{Database, IndexModel, bson::doc};

use crate::error::StoreError;

pub async fn ensure_indexes(db: &Database) -> Result<(), StoreError> {
    let orders = db.collection::<mongodb::bson::Document>("orders");

    // revenue: paid orders within a day
    {
        let model = IndexModel::builder()
            .keys(doc! { "status": 1, "created_at": 1 })
            .build();
        orders.create_index(model, None).await?;
    }

    // search form: by table
    {
        let model = IndexModel::builder().keys(doc! { "table_number": 1 }).build();
        orders.create_index(model, None).await?;
    }

    // meal deletion pulls the id out of every order holding it
    {
        let model = IndexModel::builder().keys(doc! { "items": 1 }).build();
        orders.create_index(model, None).await?;
    }

    Ok(())
}
