//! Limbwright - Anatomical Body Graphs for Simulation Servers

pub mod anatomy;
pub mod core;
pub mod ecs;
