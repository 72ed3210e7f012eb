//! Utilities for downloading, cleaning and quality-filtering GLOBE Observer
//! Mosquito Habitat Mapper and Landcover data.

pub mod cleanup;
pub mod config;
pub mod diagnostics;
pub mod download;
pub mod filtering;
pub mod geoenrich;
pub mod lc;
pub mod logging;
pub mod mhm;
pub mod model;
pub mod photo_download;
pub mod regions;
pub mod table;
pub mod verify;
