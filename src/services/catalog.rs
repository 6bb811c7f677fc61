use crate::{
    auth::Actor,
    db::DbPool,
    entities::supply::{self, derive_quantity, Entity as Supply, SupplyCategory, SupplyUnit},
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    Set,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;
use validator::Validate;

/// Supply catalog CRUD. All mutations are staff-only; browsing is open to
/// any authenticated user.
#[derive(Clone)]
pub struct CatalogService {
    db: Arc<DbPool>,
    event_sender: EventSender,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SupplyInput {
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub name: String,
    #[serde(default)]
    pub size_spec: String,
    #[serde(default)]
    pub description: String,
    pub category: SupplyCategory,
    pub unit: SupplyUnit,
    #[validate(range(min = 0, message = "Boxes count must not be negative"))]
    #[serde(default)]
    pub boxes_count: i32,
    #[validate(range(min = 0, message = "Items per box must not be negative"))]
    #[serde(default)]
    pub items_per_box: i32,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct SupplyListQuery {
    /// Free-text search over name, description and size/spec
    pub q: Option<String>,
    pub category: Option<SupplyCategory>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

/// One page of catalog results, carrying the effective paging the service
/// actually applied after defaulting and clamping.
#[derive(Debug)]
pub struct SupplyPage {
    pub supplies: Vec<supply::Model>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

impl CatalogService {
    pub fn new(db: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    pub async fn create_supply(
        &self,
        actor: &Actor,
        input: SupplyInput,
    ) -> Result<supply::Model, ServiceError> {
        actor.require_staff()?;
        input.validate()?;
        self.ensure_unique_pair(&input.name, &input.size_spec, None)
            .await?;

        let quantity = derive_quantity(input.unit, input.boxes_count, input.items_per_box);
        let model = supply::ActiveModel {
            name: Set(input.name.trim().to_string()),
            size_spec: Set(input.size_spec.trim().to_string()),
            description: Set(input.description.trim().to_string()),
            category: Set(input.category),
            unit: Set(input.unit),
            boxes_count: Set(input.boxes_count),
            items_per_box: Set(input.items_per_box),
            quantity: Set(quantity),
            created_at: Set(Utc::now()),
            ..Default::default()
        };
        let created = model.insert(self.db.as_ref()).await?;

        info!(supply_id = created.id, name = %created.name, "supply added");
        self.event_sender.emit(Event::SupplyCreated(created.id)).await;
        Ok(created)
    }

    pub async fn update_supply(
        &self,
        actor: &Actor,
        id: i64,
        input: SupplyInput,
    ) -> Result<supply::Model, ServiceError> {
        actor.require_staff()?;
        input.validate()?;
        let existing = self.get_supply(id).await?;
        self.ensure_unique_pair(&input.name, &input.size_spec, Some(id))
            .await?;

        let quantity = derive_quantity(input.unit, input.boxes_count, input.items_per_box);
        let mut active: supply::ActiveModel = existing.into();
        active.name = Set(input.name.trim().to_string());
        active.size_spec = Set(input.size_spec.trim().to_string());
        active.description = Set(input.description.trim().to_string());
        active.category = Set(input.category);
        active.unit = Set(input.unit);
        active.boxes_count = Set(input.boxes_count);
        active.items_per_box = Set(input.items_per_box);
        active.quantity = Set(quantity);
        let updated = active.update(self.db.as_ref()).await?;

        info!(supply_id = updated.id, "supply updated");
        self.event_sender.emit(Event::SupplyUpdated(updated.id)).await;
        Ok(updated)
    }

    pub async fn delete_supply(&self, actor: &Actor, id: i64) -> Result<(), ServiceError> {
        actor.require_staff()?;
        let existing = self.get_supply(id).await?;
        Supply::delete_by_id(existing.id)
            .exec(self.db.as_ref())
            .await?;
        info!(supply_id = id, "supply deleted");
        self.event_sender.emit(Event::SupplyDeleted(id)).await;
        Ok(())
    }

    pub async fn get_supply(&self, id: i64) -> Result<supply::Model, ServiceError> {
        Supply::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Supply {} not found", id)))
    }

    /// Paginated catalog listing with optional search and category filter,
    /// ordered by name.
    pub async fn list_supplies(
        &self,
        query: &SupplyListQuery,
    ) -> Result<SupplyPage, ServiceError> {
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(50).clamp(1, 200);

        let mut select = Supply::find();
        if let Some(category) = query.category {
            select = select.filter(supply::Column::Category.eq(category));
        }
        if let Some(q) = query.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            select = select.filter(
                Condition::any()
                    .add(supply::Column::Name.contains(q))
                    .add(supply::Column::Description.contains(q))
                    .add(supply::Column::SizeSpec.contains(q)),
            );
        }
        let paginator = select
            .order_by_asc(supply::Column::Name)
            .paginate(self.db.as_ref(), per_page);
        let total = paginator.num_items().await?;
        let supplies = paginator.fetch_page(page - 1).await?;
        Ok(SupplyPage {
            supplies,
            total,
            page,
            per_page,
        })
    }

    async fn ensure_unique_pair(
        &self,
        name: &str,
        size_spec: &str,
        exclude_id: Option<i64>,
    ) -> Result<(), ServiceError> {
        let mut select = Supply::find()
            .filter(supply::Column::Name.eq(name.trim()))
            .filter(supply::Column::SizeSpec.eq(size_spec.trim()));
        if let Some(id) = exclude_id {
            select = select.filter(supply::Column::Id.ne(id));
        }
        if select.one(self.db.as_ref()).await?.is_some() {
            return Err(ServiceError::Conflict(format!(
                "A supply named '{}' with size/spec '{}' already exists",
                name.trim(),
                size_spec.trim()
            )));
        }
        Ok(())
    }
}
