#![doc = include_str!("RUSTDOC.md")]

pub mod changes;

pub mod database;

pub mod firestore;

pub mod observable;
