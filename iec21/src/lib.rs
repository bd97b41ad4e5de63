//! Rust implementation of the IEC 62056-21 mode C meter readout protocol
//!
//! This library reads utility meters over their optical or current-loop
//! interface: it sends the identification request, selects data readout
//! mode and collects the dataset block, verifying the checksum trailer
//! when the meter sends one.
//!
//! # Architecture
//!
//! This library is organized as a workspace with multiple crates:
//!
//! - `iec21-core`: Data model, error handling, and session events
//! - `iec21-transport`: Transport layer (serial, notification links)
//! - `iec21-session`: Session layer (handshake, framing, parsing, BCC)
//! - `iec21-client`: Client implementation with persistence
//!
//! # Implementation Status
//!
//! ## ✅ 已完成
//! - 核心数据类型（Dataset, Reading, 会话事件）
//! - 传输层（串口、通知链路桥接）
//! - 会话层（握手、行重组、数据集解析、BCC 校验、状态机）
//! - 客户端（构建器、读数存储、已知电表目录）
//!
//! ## 📋 待实现
//! - 编程模式命令（R/W 命令）
//! - 波特率切换（模式 C 高速阶段）
//!
//! # Usage
//!
//! ```no_run
//! use iec21::client::ReadoutBuilder;
//! ```

// Re-export core types
pub use iec21_core::{
    ChecksumStatus, Dataset, DatasetRecord, Iec21Error, Iec21Result, Reading, SessionEvent,
};

// Re-export transport API
pub mod transport {
    pub use iec21_transport::*;
}

// Re-export session API
pub mod session {
    pub use iec21_session::*;
}

// Re-export client API
pub mod client {
    pub use iec21_client::*;
}
