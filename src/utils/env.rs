// src/utils/env.rs

use log::{debug, info};

/// Loads variables from a `.env` file in the working directory or one of its
/// parents. Variables already set in the process environment take precedence.
pub fn load_env() {
    match dotenv::dotenv() {
        Ok(path) => info!("Loaded environment variables from {}", path.display()),
        Err(e) => debug!(
            "No .env file loaded ({}). Proceeding with system environment variables.",
            e
        ),
    }
}
