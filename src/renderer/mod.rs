// (C) Coralbits SL 2025
// This file is part of Pagepress and is licensed under the
// GNU Affero General Public License v3.0.
// A commercial license on request is also available;
// contact info@coralbits.com for details.

pub mod backend;
pub mod pdf;
pub mod pipeline;
pub mod request;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use backend::*;
pub use pdf::*;
pub use pipeline::*;
pub use request::*;
pub use transport::*;
