use anyhow::Context;
use tokio::task;
use tracing::error;

/// Work factor for new digests.
pub const BCRYPT_COST: u32 = 10;

/// Hashing runs on the blocking pool; a cost-10 digest takes tens of
/// milliseconds.
pub async fn hash_password(plain: &str) -> anyhow::Result<String> {
    let plain = plain.to_owned();
    let hash = task::spawn_blocking(move || bcrypt::hash(plain, BCRYPT_COST))
        .await
        .context("bcrypt hash task")?
        .map_err(|e| {
            error!(error = %e, "bcrypt hash error");
            anyhow::anyhow!(e.to_string())
        })?;
    Ok(hash)
}

/// `Ok(false)` on mismatch; `Err` only when `hash` is not a bcrypt digest.
pub async fn verify_password(plain: &str, hash: &str) -> anyhow::Result<bool> {
    let (plain, hash) = (plain.to_owned(), hash.to_owned());
    task::spawn_blocking(move || bcrypt::verify(plain, &hash))
        .await
        .context("bcrypt verify task")?
        .map_err(|e| {
            error!(error = %e, "bcrypt parse hash error");
            anyhow::anyhow!(e.to_string())
        })
}
