use askama::Template;
use axum::response::IntoResponse;

use crate::models::AuthUser;

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub user: AuthUser,
    pub current_page: &'static str,
}

pub async fn dashboard_handler(user: AuthUser) -> impl IntoResponse {
    DashboardTemplate {
        user,
        current_page: "dashboard",
    }
}
