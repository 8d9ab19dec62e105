// src/client/session.rs

use crate::domain::user_model::SafeUser;
use serde::{Deserialize, Serialize};

/// 保存されたログイン状態
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: SafeUser,
}

impl Session {
    pub fn is_admin(&self) -> bool {
        self.user.is_admin()
    }
}

/// 起動直後に表示する画面
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    AdminDashboard,
    Home,
}

pub fn landing_route(session: Option<&Session>) -> Route {
    match session {
        None => Route::Login,
        Some(session) if session.is_admin() => Route::AdminDashboard,
        Some(_) => Route::Home,
    }
}
