// (C) Coralbits SL 2025
// This file is part of Pagepress and is licensed under the
// GNU Affero General Public License v3.0.
// A commercial license on request is also available;
// contact info@coralbits.com for details.

mod types;

#[cfg(test)]
mod tests;

pub use types::*;
