//! Session layer module for IEC 62056-21 mode C readout
//!
//! This crate drives the meter exchange: identification handshake,
//! readout select, dataset block consumption and checksum verification.
//!
//! # TODO
//!
//! ## 读表会话
//! - [x] 握手请求和识别应答解析
//! - [x] 数据行重组（任意分块）
//! - [x] 数据集行解析
//! - [x] BCC 计算和验证
//! - [x] 状态机管理
//! - [x] 会话统计信息收集
//! - [x] 会话事件通知
//! - [ ] 编程模式命令（R/W 命令，高级功能）

pub mod bcc;
pub mod dataset;
pub mod error;
pub mod framer;
pub mod ident;
pub mod readout;
pub mod state;
pub mod statistics;

pub use bcc::{verify_capture, BccCalc};
pub use dataset::parse_line;
pub use error::{Iec21Error, Iec21Result};
pub use framer::LineFramer;
pub use ident::Identification;
pub use readout::{ReadoutSession, SessionConfig, REQUEST_MESSAGE, STX, TERMINATOR_LINE};
pub use state::ReadoutState;
pub use statistics::ReadoutStatistics;
