use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateRackRequest {
    #[validate(range(min = 1))]
    pub warehouse_id: i64,
    #[validate(length(min = 2, max = 50))]
    pub code: String,
    #[validate(length(max = 500))]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateRackRequest {
    #[validate(range(min = 1))]
    pub warehouse_id: Option<i64>,
    #[validate(length(min = 2, max = 50))]
    pub code: Option<String>,
    #[validate(length(max = 500))]
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RackListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub warehouse_id: Option<i64>,
}
