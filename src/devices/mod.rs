//! Device implementations

pub mod yas207;
