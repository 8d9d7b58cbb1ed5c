use rand::distributions::Alphanumeric;
use rand::Rng;

use crate::api::errors::ApiError;
use crate::assembly::{self, Question};
use crate::core::config::Settings;

const RANDOM_SEED_LEN: usize = 12;

/// Rejects oversized pools, the first question that breaks a shape invariant and
/// repeated ids.
pub(super) fn check_pool(settings: &Settings, pool: &[Question]) -> Result<(), ApiError> {
    let max_pool_size = settings.generation().max_pool_size;
    if pool.len() > max_pool_size {
        return Err(ApiError::PayloadTooLarge(format!(
            "Question pool has {} items; at most {} are accepted",
            pool.len(),
            max_pool_size
        )));
    }

    assembly::check_pool(pool).map_err(|err| ApiError::BadRequest(err.to_string()))
}

pub(super) fn random_seed() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(RANDOM_SEED_LEN)
        .map(char::from)
        .collect()
}
