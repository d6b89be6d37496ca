//! Shared fakes and builders for the integration tests

#![allow(dead_code)]

mod builders;
mod fakes;

pub use builders::*;
pub use fakes::*;
