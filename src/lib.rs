//! # LLM Provider / 模型管理后台
//!
//! provider 与模型的增删改查、分组可见性、远端模型列表拉取以及模型编辑表单

pub mod actions;
pub mod config;
pub mod dao;
pub mod error;
pub mod logger;
pub mod web;
