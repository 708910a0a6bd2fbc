#![allow(dead_code)]

use simple_search::Model;
use sqlx::{FromRow, SqlitePool, sqlite::SqlitePoolOptions};

#[derive(FromRow, Debug, Clone, PartialEq)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub contact: String,
    pub address: String,
    pub age: i64,
}

impl Model for User {
    const TABLE: &'static str = "users";
    const COLUMNS: &'static [&'static str] = &["id", "name", "email", "contact", "address", "age"];
}

// same table, but never registered for search
#[derive(FromRow, Debug, Clone, PartialEq)]
pub struct User2 {
    pub id: i64,
    pub name: String,
    pub contact: String,
}

impl Model for User2 {
    const TABLE: &'static str = "users";
    const COLUMNS: &'static [&'static str] = &["id", "name", "contact"];
}

const USERS: &[(&str, &str, &str, &str, i64)] = &[
    ("alice", "alice@example.com", "9876543210", "usa", 60),
    ("bob", "bob@example.com", "1234567890", "india", 30),
    ("bobby", "bobby@example.com", "5555555555", "usa", 40),
    ("acer", "acer@example.org", "1111111111", "uk", 55),
    ("grace", "grace@example.com", "2222222222", "canada", 70),
];

/// A single-connection in-memory database seeded with `USERS`; more than one
/// connection would mean more than one database.
pub async fn seeded_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("failed to open in-memory database");

    sqlx::query(
        "CREATE TABLE users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            email TEXT NOT NULL,
            contact TEXT NOT NULL,
            address TEXT NOT NULL,
            age INTEGER NOT NULL
        )",
    )
    .execute(&pool)
    .await
    .expect("failed to create users table");

    for &(name, email, contact, address, age) in USERS {
        sqlx::query(
            "INSERT INTO users (name, email, contact, address, age) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(name)
        .bind(email)
        .bind(contact)
        .bind(address)
        .bind(age)
        .execute(&pool)
        .await
        .expect("failed to seed users");
    }

    pool
}

pub fn ids(users: &[User]) -> Vec<i64> {
    let mut ids: Vec<_> = users.iter().map(|u| u.id).collect();
    ids.sort_unstable();
    ids
}
