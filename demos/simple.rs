//! Building, freezing and reading a spore.
//!
//! Run with: cargo run --example simple

use serde::{Deserialize, Serialize};
use spore::{from_str, to_string, Freeze, Spore, SporeBuilder, Thaw};
use std::error::Error;

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct User {
    id: u32,
    name: String,
    email: Option<String>,
}

fn main() -> Result<(), Box<dyn Error>> {
    // Writer side: append children in a fixed order.
    let tags = vec!["admin".to_string(), "ops".to_string()];
    let spore = SporeBuilder::with_version("1")
        .append("Alice Johnson")
        .append(&42)
        .append(&None::<String>)
        .append_as_collection(Some(&tags), |tag| tag.freeze())
        .build();

    let frozen = spore.to_string();
    println!("Frozen spore:\n{}\n", frozen);

    // Reader side: the same order, one child per call.
    let thawed = Spore::from_frozen(&frozen)?;
    let mut reader = thawed.reader();
    let name = reader.next_as_string()?;
    let age = reader.next_as_i32()?;
    let nickname = reader.next_as_string()?;
    let tags_back = reader.next_as_list(String::thaw)?;

    println!("version:  {:?}", thawed.version()?);
    println!("name:     {:?}", name);
    println!("age:      {:?}", age);
    println!("nickname: {:?}", nickname);
    println!("tags:     {:?}\n", tags_back);
    assert_eq!(tags_back, Some(tags));

    // The serde bridge writes structs positionally.
    let users = vec![
        User {
            id: 42,
            name: "Alice Johnson".to_string(),
            email: Some("alice@example.com".to_string()),
        },
        User {
            id: 43,
            name: "Bob Smith".to_string(),
            email: None,
        },
    ];

    let frozen = to_string(&users)?;
    println!("Serde output:\n{}\n", frozen);

    let users_back: Vec<User> = from_str(&frozen)?;
    assert_eq!(users, users_back);
    println!("✓ Round-trip successful");

    Ok(())
}
