//! Agronomic calculation library
//!
//! Every function here is pure. Unit and catalog lookups degrade leniently (log and
//! fall back); structural problems return [`NmpError`](crate::NmpError).

pub mod animals;
pub mod balance;
pub mod crops;
pub mod fertigation;
pub mod fertilizer;
pub mod manure;
pub mod previous_manure;
pub mod units;
