use infra::lang::nullable;
use infra::web::annotation::{delete, get, post, request_mapping, rest_controller};

use crate::paths::USERS_BASE;

pub struct UserHttpHandler {
    service: UserService,
}

/// User management endpoints.
#[rest_controller]
#[request_mapping(USERS_BASE)]
impl UserHttpHandler {
    const CREATE_METHOD: &'static str = "POST";

    /// Get a user by id.
    ///
    /// Returns 404 when the user does not exist.
    ///
    /// # Arguments
    ///
    /// * `id` - The user id
    #[get("/{id}")]
    pub fn get_by_id(&self, id: u64) -> User {
        self.service.find(id)
    }

    /// List users page by page.
    ///
    /// @param page zero-based page index
    /// @param size page size
    #[get("/")]
    pub fn list(&self, #[nullable] page: Option<u32>, size: u32) -> Vec<User> {
        self.service.list(page.unwrap_or_default(), size)
    }

    /// Create a user.
    #[request_mapping(path = "/", method = Self::CREATE_METHOD, consumes = "application/json")]
    pub fn create(&self, body: User) -> User {
        self.service.create(body)
    }

    #[post(concat!("/{id}", "/avatar"))]
    pub fn upload_avatar(&self, id: u64, #[nullable] #[deprecated] format: Option<String>) {}

    #[deprecated]
    #[delete("/{id}")]
    pub fn remove_v1(&self, id: u64) {}

    /// Delete a user.
    #[delete("/{id}")]
    pub fn remove(&self, id: u64) {
        self.service.remove(id)
    }

    fn audit(&self, action: &str) {}
}

struct InternalTools;

impl InternalTools {
    #[get("/internal/reindex")]
    pub fn reindex(&self) {}
}
