// src/application/mod.rs
// Use cases, DTOs and application services

pub mod dto;
pub mod service;
pub mod usecase;
