// (C) Coralbits SL 2025
// This file is part of Pagepress and is licensed under the
// GNU Affero General Public License v3.0.
// A commercial license on request is also available;
// contact info@coralbits.com for details.

pub mod config;
pub mod job;
pub mod renderer;
pub mod server;
pub mod types;
pub mod utils;

pub use config::*;
pub use job::*;
pub use renderer::*;
pub use types::*;
