use anyhow::Result;

/// Every store operation is awaited on one thread. Nothing in the application needs more.
pub fn single_thread_runtime() -> Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?)
}
