// src/repository/user_repository.rs

use crate::domain::incident_model::{self, Entity as IncidentEntity};
use crate::domain::user_model::{self, ActiveModel as UserActiveModel, Entity as UserEntity};
use crate::domain::user_role::UserRole;
use sea_orm::entity::*;
use sea_orm::sea_query::Expr;
use sea_orm::{
    Condition, ConnectionTrait, DbConn, DbErr, FromQueryResult, JoinType, Order, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
};
use uuid::Uuid;

/// ユーザー作成用の入力
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub name: Option<String>,
    pub role: UserRole,
}

/// プロフィール更新用の入力（None は変更なし）
#[derive(Debug, Clone, Default)]
pub struct UpdateUser {
    pub email: Option<String>,
    pub username: Option<String>,
    pub name: Option<String>,
    pub profile_picture: Option<String>,
}

impl UpdateUser {
    pub fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.username.is_none()
            && self.name.is_none()
            && self.profile_picture.is_none()
    }
}

/// ランキング集計の1行
#[derive(Debug, Clone, PartialEq, FromQueryResult)]
pub struct LeaderboardRow {
    pub id: Uuid,
    pub username: String,
    pub name: Option<String>,
    pub report_count: i64,
}

#[derive(Debug)]
pub struct UserRepository {
    db: DbConn,
}

impl UserRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<user_model::Model>, DbErr> {
        UserEntity::find_by_id(id).one(&self.db).await
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<user_model::Model>, DbErr> {
        UserEntity::find()
            .filter(user_model::Column::Email.eq(email))
            .one(&self.db)
            .await
    }

    /// メールアドレスまたはユーザー名で検索
    pub async fn find_by_email_or_username(
        &self,
        identifier: &str,
    ) -> Result<Option<user_model::Model>, DbErr> {
        UserEntity::find()
            .filter(
                Condition::any()
                    .add(user_model::Column::Email.eq(identifier.to_lowercase()))
                    .add(user_model::Column::Username.eq(identifier)),
            )
            .one(&self.db)
            .await
    }

    pub async fn create(&self, create_user: CreateUser) -> Result<user_model::Model, DbErr> {
        let new_user = UserActiveModel {
            email: Set(create_user.email),
            username: Set(create_user.username),
            password_hash: Set(create_user.password_hash),
            name: Set(create_user.name),
            role: Set(create_user.role),
            ..Default::default()
        };

        new_user.insert(&self.db).await
    }

    pub async fn update(
        &self,
        id: Uuid,
        update_user: UpdateUser,
    ) -> Result<Option<user_model::Model>, DbErr> {
        let Some(user) = self.find_by_id(id).await? else {
            return Ok(None);
        };

        if update_user.is_empty() {
            return Ok(Some(user));
        }

        let mut active_model: UserActiveModel = user.into();

        if let Some(email) = update_user.email {
            active_model.email = Set(email);
        }
        if let Some(username) = update_user.username {
            active_model.username = Set(username);
        }
        if let Some(name) = update_user.name {
            active_model.name = Set(Some(name));
        }
        if let Some(profile_picture) = update_user.profile_picture {
            active_model.profile_picture = Set(Some(profile_picture));
        }

        Ok(Some(active_model.update(&self.db).await?))
    }

    pub async fn update_password_hash(
        &self,
        id: Uuid,
        password_hash: String,
    ) -> Result<Option<user_model::Model>, DbErr> {
        let Some(user) = self.find_by_id(id).await? else {
            return Ok(None);
        };

        let mut active_model: UserActiveModel = user.into();
        active_model.password_hash = Set(password_hash);
        Ok(Some(active_model.update(&self.db).await?))
    }

    pub async fn update_role(
        &self,
        id: Uuid,
        role: UserRole,
    ) -> Result<Option<user_model::Model>, DbErr> {
        let Some(user) = self.find_by_id(id).await? else {
            return Ok(None);
        };

        let mut active_model: UserActiveModel = user.into();
        active_model.role = Set(role);
        Ok(Some(active_model.update(&self.db).await?))
    }

    /// ユーザーを削除（トランザクション内からも呼べる）
    pub async fn delete_by_id<C>(conn: &C, id: Uuid) -> Result<u64, DbErr>
    where
        C: ConnectionTrait,
    {
        let result = UserEntity::delete_by_id(id).exec(conn).await?;
        Ok(result.rows_affected)
    }

    /// メールアドレスの重複チェック（指定IDを除く）
    pub async fn is_email_taken(
        &self,
        email: &str,
        exclude_user_id: Option<Uuid>,
    ) -> Result<bool, DbErr> {
        let mut condition = Condition::all().add(user_model::Column::Email.eq(email));
        if let Some(id) = exclude_user_id {
            condition = condition.add(user_model::Column::Id.ne(id));
        }

        let count = UserEntity::find().filter(condition).count(&self.db).await?;
        Ok(count > 0)
    }

    /// ユーザー名の重複チェック（指定IDを除く）
    pub async fn is_username_taken(
        &self,
        username: &str,
        exclude_user_id: Option<Uuid>,
    ) -> Result<bool, DbErr> {
        let mut condition = Condition::all().add(user_model::Column::Username.eq(username));
        if let Some(id) = exclude_user_id {
            condition = condition.add(user_model::Column::Id.ne(id));
        }

        let count = UserEntity::find().filter(condition).count(&self.db).await?;
        Ok(count > 0)
    }

    /// 報告件数ランキング（件数降順、同数はユーザー名昇順、報告ゼロのユーザーも含む）
    pub async fn leaderboard(&self, limit: Option<u64>) -> Result<Vec<LeaderboardRow>, DbErr> {
        let mut query = UserEntity::find()
            .select_only()
            .column(user_model::Column::Id)
            .column(user_model::Column::Username)
            .column(user_model::Column::Name)
            .column_as(
                Expr::col((IncidentEntity, incident_model::Column::Id)).count(),
                "report_count",
            )
            .join(JoinType::LeftJoin, user_model::Relation::Incidents.def())
            .group_by(user_model::Column::Id)
            .group_by(user_model::Column::Username)
            .group_by(user_model::Column::Name)
            .order_by(Expr::cust("report_count"), Order::Desc)
            .order_by(user_model::Column::Username, Order::Asc);

        if let Some(limit) = limit {
            query = query.limit(limit);
        }

        query.into_model::<LeaderboardRow>().all(&self.db).await
    }
}
