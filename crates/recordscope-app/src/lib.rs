// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod cache;
pub mod chunk;
pub mod debounce;
pub mod filter;
pub mod ids;
pub mod label;
pub mod model;
pub mod project;
pub mod search;
pub mod session;

pub use cache::*;
pub use chunk::*;
pub use debounce::*;
pub use filter::*;
pub use ids::*;
pub use label::*;
pub use model::*;
pub use project::*;
pub use search::*;
pub use session::*;
