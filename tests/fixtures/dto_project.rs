// Sample DTO and controller sources used by the integration tests
use axum::extract::{Json, Path, Query};
use serde::{Deserialize, Serialize};

pub mod dto {
    use super::*;

    #[derive(Debug, Deserialize)]
    pub struct UserQuery {
        #[api_model(value = "User id", required, example = 5)]
        pub id: i32,
        /// Filter by display name
        pub name: Option<String>,
        pub status: Option<UserStatus>,
        pub owner: Option<Department>,
    }

    #[derive(Debug, Serialize)]
    pub struct UserView {
        #[api_model(required)]
        pub id: i32,
        #[serde(rename = "displayName")]
        pub name: String,
        #[api_model(enum_view = "all")]
        pub status: UserStatus,
        #[api_model(enum_view = "name")]
        pub roles: Vec<Role>,
        /// The department the user works in
        pub department: Option<Department>,
        pub tags: Vec<String>,
        pub audit: AuditTrail,
        #[serde(skip)]
        pub password_hash: String,
        #[api_model(hidden)]
        pub internal_score: f64,
    }

    #[derive(Debug, Serialize)]
    pub struct Department {
        pub name: String,
        pub parent: Option<Box<Department>>,
        pub members: Vec<UserView>,
    }

    #[derive(Debug, Deserialize)]
    pub struct CreateUser {
        #[api_model(required, description = "Login name")]
        pub login: String,
        #[api_model(one_of = ["admin", "member"], default = "member")]
        pub kind: String,
    }

    pub enum UserStatus {
        /// Can sign in
        #[api_enum(value = 1)]
        Active,
        #[api_enum(value = 2, message = "Locked by an administrator")]
        Locked,
    }

    pub enum Role {
        Admin,
        Member,
    }
}

pub mod controller {
    use super::dto::*;
    use super::*;

    pub struct UserController;

    impl UserController {
        pub async fn show(&self, Query(query): Query<UserQuery>) -> Json<UserView> {
            todo!()
        }

        pub async fn store(&self, Json(payload): Json<CreateUser>) -> Result<Json<UserView>, String> {
            todo!()
        }

        pub async fn destroy(&self, Path(id): Path<u64>) {}
    }
}
