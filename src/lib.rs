//! 联系人服务库
//! 账户注册登录（JWT 会话令牌）与联系人 CRUD

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repository;
pub mod routes;
pub mod services;
pub mod telemetry;
