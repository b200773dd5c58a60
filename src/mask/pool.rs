//! Process-wide cache of dedicated rayon pools.
//!
//! Pools are created lazily the first time a thread count is requested and
//! live for the rest of the process, so repeated calls never pay the thread
//! spawn cost again.

use crate::util::{NmsError, NmsResult};
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};

static POOLS: OnceLock<Mutex<HashMap<usize, Arc<ThreadPool>>>> = OnceLock::new();

/// Returns the cached pool with `threads` workers, building it on first use.
pub(crate) fn pool_for(threads: usize) -> NmsResult<Arc<ThreadPool>> {
    let pools = POOLS.get_or_init(|| Mutex::new(HashMap::new()));
    // A poisoned lock only means another caller panicked mid-insert; the map
    // itself is still valid.
    let mut pools = pools.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    if let Some(pool) = pools.get(&threads) {
        return Ok(Arc::clone(pool));
    }
    let pool = ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|idx| format!("boxnms-{idx}"))
        .build()
        .map_err(|err| NmsError::ThreadPool(err.to_string()))?;
    let pool = Arc::new(pool);
    pools.insert(threads, Arc::clone(&pool));
    Ok(pool)
}
