extern crate serde;
extern crate serde_json;

extern crate clap;
extern crate include_dir;
extern crate itertools;
#[macro_use]
extern crate lazy_static;
extern crate liquid;
extern crate regex;
#[macro_use]
extern crate tracing;
extern crate tracing_subscriber;
extern crate uuid;

pub mod backend;
pub mod config;
pub mod logging;
pub mod records;
pub mod session;
pub mod templating;
pub mod views;
pub mod web;
