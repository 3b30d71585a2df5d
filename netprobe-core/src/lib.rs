use serde::Serialize;
use std::fmt;
use thiserror::Error;

const USER_ID_PREFIX: &str = "user";


#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(String);


impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
}


impl UserId {
    /// Id for the n-th insertion into a registry (`user<n>`).
    pub fn from_seq(n: u64) -> Self {
        Self(format!("{USER_ID_PREFIX}{n}"))
    }

    /// Wraps whatever the client typed. Lookups on ids that were never
    /// issued simply miss, so no validation happens here.
    pub fn parse(s: &str) -> Self {
        Self(s.trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}


#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserRecord {
    pub name: String,
    pub age: i64,
}


#[derive(Debug, Error, PartialEq, Eq)]
pub enum AgeError {
    #[error("age must be a whole number, got {0:?}")]
    NotANumber(String),
}


impl UserRecord {
    pub fn new(name: impl Into<String>, age: i64) -> Self {
        Self { name: name.into(), age }
    }

    /// Parses an age the way a user would type it: surrounding whitespace
    /// and a leading sign are accepted.
    pub fn parse_age(s: &str) -> Result<i64, AgeError> {
        s.trim().parse::<i64>().map_err(|_| AgeError::NotANumber(s.to_string()))
    }
}
