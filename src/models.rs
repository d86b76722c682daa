use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HubRecord {
    pub id: String,
    pub name: String,
    pub subscribers: u64,
    pub posts: u64,
}

/// Up/down counters of a post. `value` is always `up - down`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Votes {
    pub up: i64,
    pub down: i64,
    pub value: i64,
}

impl Votes {
    pub fn new(up: i64, down: i64) -> Self {
        Self {
            up,
            down,
            value: up - down,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostRecord {
    pub url: String,
    pub title: String,
    pub date: Option<NaiveDate>, // None for legacy posts without a parseable date
    pub hubs: Vec<String>,
    pub company: Option<String>,
    pub votes: Votes,
    pub views: u64,
    pub stars: u64,
    pub user: Option<String>, // None for bot-authored posts
    pub comments: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_votes_value_is_difference() {
        let votes = Votes::new(15, 5);
        assert_eq!(votes.value, 10);
        assert_eq!(Votes::default(), Votes::new(0, 0));
    }

    #[test]
    fn test_votes_can_go_negative() {
        assert_eq!(Votes::new(2, 7).value, -5);
    }
}
