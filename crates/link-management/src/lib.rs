//! 链接管理核心库
//!
//! 提供短链、客户、合作伙伴计划相关的领域模型、仓储和服务：
//!
//! - `models`: 领域实体
//! - `repository`: 基于 SQLx 的数据访问
//! - `service`: 客户活动、Program 查询、A/B 测试完成、分析查询
//! - `links`: 大小写敏感 key 编解码、A/B 测试变体
//! - `analytics`: 时间范围、分桶与悬浮提示格式
//! - `webhook`: 工作区 Webhook 签名与投递

pub mod analytics;
pub mod error;
pub mod links;
pub mod models;
pub mod repository;
pub mod service;
pub mod webhook;

pub use error::{LinkError, Result};
