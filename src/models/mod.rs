//! 数据模型模块

pub mod account;
pub mod contact;
