use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateWarehouseRequest {
    #[validate(length(min = 3, max = 100))]
    pub name: String,
    #[validate(length(min = 5, max = 255))]
    pub location: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateWarehouseRequest {
    #[validate(length(min = 3, max = 100))]
    pub name: Option<String>,
    #[validate(length(min = 5, max = 255))]
    pub location: Option<String>,
}
