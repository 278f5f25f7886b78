use rest_queryset::Model;
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Author {
    pub id: u64,
    pub name: String,
}

impl Model for Author {
    fn name() -> &'static str {
        "Author"
    }
}

impl Author {
    pub fn record(id: u64, name: &str) -> Value {
        json!({ "id": id, "name": name })
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Post {
    pub id: u64,
    pub author_id: u64,
    pub title: String,
    pub views: u64,
    #[serde(default)]
    pub subtitle: Option<String>,
}

impl Model for Post {
    fn name() -> &'static str {
        "Post"
    }
}

impl Post {
    pub fn record(id: u64, author_id: u64, views: u64) -> Value {
        json!({
            "id": id,
            "author_id": author_id,
            "title": format!("post {}", id),
            "views": views,
            "subtitle": if id % 5 == 0 { Value::Null } else { json!("sub") },
        })
    }
}

/// Same records as [`Post`], exposed through a differently named model.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct BlogPost {
    pub id: u64,
}

impl Model for BlogPost {
    fn name() -> &'static str {
        "BlogPost"
    }

    fn collection() -> String {
        "post".to_string()
    }
}
