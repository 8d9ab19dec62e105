// src/repository/incident_repository.rs

use crate::domain::geo_point::BoundingBox;
use crate::domain::incident_category::IncidentCategory;
use crate::domain::incident_model::{
    self, ActiveModel as IncidentActiveModel, Entity as IncidentEntity,
};
use crate::domain::incident_status::IncidentStatus;
use crate::domain::incident_validation::ValidatedIncident;
use crate::domain::user_model::{self, Entity as UserEntity};
use sea_orm::sea_query::{Expr, Func, LikeExpr};
use sea_orm::{
    entity::*, query::*, Condition, ConnectionTrait, DbConn, DbErr, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

/// 管理者向け一覧の絞り込み条件
#[derive(Debug, Clone, Default)]
pub struct IncidentFilter {
    pub status: Option<IncidentStatus>,
    pub category: Option<IncidentCategory>,
    /// タイトル・説明・報告者名に対する部分一致（大文字小文字を区別しない）
    pub search: Option<String>,
}

pub struct IncidentRepository {
    db: DbConn,
}

impl IncidentRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    pub async fn create(
        &self,
        incident: ValidatedIncident,
        reported_by: Uuid,
    ) -> Result<incident_model::Model, DbErr> {
        let mut active_model = <IncidentActiveModel as ActiveModelBehavior>::new();
        active_model.title = Set(incident.title);
        active_model.description = Set(incident.description);
        active_model.category = Set(incident.category);
        active_model.severity = Set(incident.severity);
        active_model.longitude = Set(incident.location.longitude());
        active_model.latitude = Set(incident.location.latitude());
        active_model.images = Set(serde_json::json!(incident.images));
        active_model.reported_by = Set(reported_by);

        active_model.insert(&self.db).await
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<incident_model::Model>, DbErr> {
        IncidentEntity::find_by_id(id).one(&self.db).await
    }

    /// 報告者ごとの一覧（新しい順）
    pub async fn find_by_reporter(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<incident_model::Model>, DbErr> {
        IncidentEntity::find()
            .filter(incident_model::Column::ReportedBy.eq(user_id))
            .order_by_desc(incident_model::Column::CreatedAt)
            .order_by_asc(incident_model::Column::Id)
            .all(&self.db)
            .await
    }

    /// 全ユーザーの最新インシデント
    pub async fn find_recent(&self, limit: u64) -> Result<Vec<incident_model::Model>, DbErr> {
        IncidentEntity::find()
            .order_by_desc(incident_model::Column::CreatedAt)
            .order_by_asc(incident_model::Column::Id)
            .limit(limit)
            .all(&self.db)
            .await
    }

    /// 緯度経度の矩形に含まれるインシデント（位置インデックスを利用）
    pub async fn find_within_bounds(
        &self,
        bounds: BoundingBox,
    ) -> Result<Vec<incident_model::Model>, DbErr> {
        IncidentEntity::find()
            .filter(incident_model::Column::Latitude.between(bounds.min_lat, bounds.max_lat))
            .filter(incident_model::Column::Longitude.between(bounds.min_lng, bounds.max_lng))
            .order_by_desc(incident_model::Column::CreatedAt)
            .all(&self.db)
            .await
    }

    /// 報告者情報付きの全件（管理者向け）
    pub async fn find_all_with_reporter(
        &self,
        filter: &IncidentFilter,
    ) -> Result<Vec<(incident_model::Model, Option<user_model::Model>)>, DbErr> {
        let mut conditions = Condition::all();

        if let Some(status) = filter.status {
            conditions = conditions.add(incident_model::Column::Status.eq(status));
        }

        if let Some(category) = filter.category {
            conditions = conditions.add(incident_model::Column::Category.eq(category));
        }

        if let Some(search) = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            let pattern = format!("%{}%", escape_like(&search.to_lowercase()));
            let lower_like = |expr: Expr| {
                Expr::expr(Func::lower(expr)).like(LikeExpr::new(pattern.clone()).escape('\\'))
            };

            conditions = conditions.add(
                Condition::any()
                    .add(lower_like(Expr::col((
                        IncidentEntity,
                        incident_model::Column::Title,
                    ))))
                    .add(lower_like(Expr::col((
                        IncidentEntity,
                        incident_model::Column::Description,
                    ))))
                    .add(lower_like(Expr::col((
                        UserEntity,
                        user_model::Column::Username,
                    )))),
            );
        }

        IncidentEntity::find()
            .find_also_related(UserEntity)
            .filter(conditions)
            .order_by_desc(incident_model::Column::CreatedAt)
            .order_by_asc(incident_model::Column::Id)
            .all(&self.db)
            .await
    }

    pub async fn update_status(
        &self,
        id: Uuid,
        status: IncidentStatus,
    ) -> Result<Option<incident_model::Model>, DbErr> {
        let Some(incident) = self.find_by_id(id).await? else {
            return Ok(None);
        };

        let mut active_model: IncidentActiveModel = incident.into();
        active_model.status = Set(status);
        active_model.update(&self.db).await.map(Some)
    }

    pub async fn delete_by_id(&self, id: Uuid) -> Result<u64, DbErr> {
        let result = IncidentEntity::delete_by_id(id).exec(&self.db).await?;
        Ok(result.rows_affected)
    }

    /// 指定ユーザーのインシデントを全削除（トランザクション内からも呼べる）
    pub async fn delete_all_by_reporter<C>(conn: &C, user_id: Uuid) -> Result<u64, DbErr>
    where
        C: ConnectionTrait,
    {
        let result = IncidentEntity::delete_many()
            .filter(incident_model::Column::ReportedBy.eq(user_id))
            .exec(conn)
            .await?;
        Ok(result.rows_affected)
    }

    pub async fn count_by_reporter(&self, user_id: Uuid) -> Result<u64, DbErr> {
        IncidentEntity::find()
            .filter(incident_model::Column::ReportedBy.eq(user_id))
            .count(&self.db)
            .await
    }
}

/// LIKE のワイルドカードをエスケープ
fn escape_like(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}
