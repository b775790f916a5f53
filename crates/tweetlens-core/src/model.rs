use chrono::{DateTime, NaiveDate};
use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};

/// The subset of a tweet line that the queries read. Unknown fields are
/// ignored and every field may be absent or of the wrong type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Tweet {
    #[serde(default, deserialize_with = "lenient")]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub user: Option<User>,
    #[serde(default, deserialize_with = "lenient")]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct User {
    #[serde(default, deserialize_with = "lenient")]
    pub username: Option<String>,
}

/// A value of the wrong shape reads as absent instead of failing the line.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).ok())
}

impl Tweet {
    pub fn parse_line(line: &str) -> serde_json::Result<Self> {
        serde_json::from_str(line)
    }

    /// Calendar date in the timestamp's own offset.
    pub fn day(&self) -> Option<NaiveDate> {
        let raw = self.date.as_deref()?;
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|ts| ts.date_naive())
    }

    pub fn username(&self) -> Option<&str> {
        self.user.as_ref()?.username.as_deref()
    }

    /// Non-empty content only.
    pub fn text(&self) -> Option<&str> {
        self.content.as_deref().filter(|c| !c.is_empty())
    }
}

/// q1 row: a date and the user who posted most that day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateLeader {
    pub date: NaiveDate,
    pub username: String,
    /// Tweets on `date` across all users.
    pub tweets: u64,
}

/// q2/q3 row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ranked {
    pub key: String,
    pub count: u64,
}

impl Ranked {
    pub fn new(key: impl Into<String>, count: u64) -> Self {
        Self {
            key: key.into(),
            count,
        }
    }
}
