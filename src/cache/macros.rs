/// A macro to simplify memoizing fallible async lookups in a [`TtlCache`].
///
/// If `$key` is present and unexpired, the cached value is returned.
/// Otherwise `$block` is awaited; on success its value is stored under `$key`
/// and returned, on error the error is propagated with `?` and nothing is cached.
///
/// # Arguments
/// * `$cache`: A `TtlCache` instance.
/// * `$key`: The key to look up and store under. Must be `Clone`.
/// * `$block`: A future resolving to `Result<V, E>`, run only on a miss.
///
/// # Example
/// ```rust,ignore
/// let metadata = cached!(self.cache, movie_id.clone(), async move {
///     provider.fetch_metadata(&movie_id).await
/// });
/// ```
///
/// [`TtlCache`]: crate::cache::TtlCache
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $block:expr) => {{
        let key = $key;
        if let Some(cached) = $cache.get(&key).await {
            Ok(cached)
        } else {
            let value = $block.await?;
            $cache.put(key, ::std::clone::Clone::clone(&value)).await;
            Ok(value)
        }
    }};
}
