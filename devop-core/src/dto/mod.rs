//! Data Transfer Objects for the external REST APIs
//!
//! Each submodule mirrors the JSON shapes of one vendor API. Only the fields
//! devop reads or writes are modelled; everything else is ignored on decode.

pub mod jira;
pub mod octopus;
pub mod teamcity;
