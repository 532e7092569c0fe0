//! Devop Core
//!
//! Core types shared by the devop crates.
//!
//! This crate contains:
//! - Domain types: Jobs, job results, release items and environments
//! - DTOs: Wire formats of the TeamCity, Octopus Deploy and Jira REST APIs
//! - Manifests: Parsing of build and deploy files

pub mod domain;
pub mod dto;
pub mod manifest;
