//! Grid navigation for arena bots: a probed `NavGrid`, a pool-backed A*
//! `PathFinder`, and a waypoint `PathFollower`.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod cell;
pub mod config;
pub mod follower;
pub mod grid;
pub mod navigator;
pub mod pathfinder;
mod pool;

pub use cell::{Cell, Direction, MoveMask};
pub use config::{GridError, NavGridConfig};
pub use follower::{FollowStatus, PathFollower, ARRIVAL_DISTANCE};
pub use grid::{NavGrid, UNKNOWN_HEIGHT};
pub use navigator::{GridNavigator, NavPath, Navigator};
pub use pathfinder::{PathFinder, SearchError, Waypoints};
