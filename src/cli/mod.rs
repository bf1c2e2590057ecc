//! # CLI Module
//!
//! User-facing commands of the `songshop` binary. Each command resolves its
//! configuration, drives the library layers and reports through the console
//! macros; fatal problems end the process via `error!`.
//!
//! ## Commands
//!
//! - [`serve`] - Runs the login service (`/api/login`, callback, profile, status)
//! - [`token`] - Client-credentials grant, prints the access token
//! - [`fetch`] - Searches tracks per genre and stores them in SQLite
//! - [`status`] - Shows whether credentials are configured
//!
//! ## Usage Patterns
//!
//! ```bash
//! songshop status                         # Check configuration
//! songshop fetch --genre pop --genre rock # Import two genres
//! songshop fetch --timeout 10             # Import every known genre, 10s per call
//! songshop serve --open                   # Run the login service and open the browser
//! ```

mod fetch;
mod serve;
mod status;
mod token;

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

pub use fetch::fetch;
pub use serve::serve;
pub use status::status;
pub use token::token;

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_style(
        ProgressStyle::with_template("{spinner:.blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    pb
}
