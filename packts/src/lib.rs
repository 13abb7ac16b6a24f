#![cfg_attr(not(test), no_std)]

pub mod bounds;
pub mod classifier;
pub mod eth;
pub mod event;
pub mod pppoe;
pub mod smac;
