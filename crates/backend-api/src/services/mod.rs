pub mod access;
pub mod error;
pub mod exchange;
pub mod listing;
pub mod message;
pub mod notification;
pub mod rating;

#[cfg(test)]
pub mod test_utils;

pub use error::*;
