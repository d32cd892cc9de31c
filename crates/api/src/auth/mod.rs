//! Access-token handling. See [`jwt`].

pub mod jwt;
