//! IEC 62056-21 meter readout client
//!
//! This crate provides client-side functionality for reading utility
//! meters: session wiring, reading persistence and a known-meter
//! directory.
//!
//! # TODO
//!
//! ## 客户端功能
//! - [x] 读表客户端（串口和通知链路）
//! - [x] 客户端构建器（Builder）模式实现
//! - [x] 会话事件订阅
//! - [x] 读数存储（内存和 JSON 文件）
//! - [x] 已知电表目录
//! - [ ] 数据库存储后端（高级功能）
//! - [ ] 定时自动读表（高级功能）

pub mod builder;
pub mod client;
pub mod directory;
pub mod error;
pub mod store;

pub use builder::ReadoutBuilder;
pub use client::MeterClient;
pub use directory::{KnownMeter, MeterDirectory};
pub use error::{Iec21Error, Iec21Result};
pub use store::{JsonFileStore, MemoryStore, ReadingStore};
