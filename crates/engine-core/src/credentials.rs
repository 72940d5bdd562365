use crate::error::HashError;

/// bcrypt with a fixed cost factor, run off the async workers.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hashes `plain` and drops it; only the hash leaves this call.
    pub async fn hash(&self, plain: String) -> Result<String, HashError> {
        let cost = self.cost;
        tokio::task::spawn_blocking(move || bcrypt::hash(plain, cost))
            .await
            .map_err(|e| HashError::Join(e.to_string()))?
            .map_err(HashError::from)
    }
}
