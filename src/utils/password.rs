use crate::utils::error::AppError;

/// bcrypt runs on the blocking pool.
pub async fn hash_password(plain: &str, cost: u32) -> Result<String, AppError> {
    let plain = plain.to_string();
    tokio::task::spawn_blocking(move || bcrypt::hash(plain, cost))
        .await
        .map_err(|e| AppError::DatabaseError(format!("Hashing task failed: {}", e)))?
        .map_err(AppError::from)
}

/// Checks a login attempt against the stored value. Documents written before
/// hashing was introduced hold the password as-is and are compared directly.
pub async fn verify_password(plain: &str, stored: &str) -> Result<bool, AppError> {
    if !is_hashed(stored) {
        return Ok(plain == stored);
    }

    let plain = plain.to_string();
    let stored = stored.to_string();
    tokio::task::spawn_blocking(move || bcrypt::verify(plain, &stored))
        .await
        .map_err(|e| AppError::DatabaseError(format!("Hashing task failed: {}", e)))?
        .map_err(AppError::from)
}

pub fn is_hashed(stored: &str) -> bool {
    stored.starts_with("$2")
}
