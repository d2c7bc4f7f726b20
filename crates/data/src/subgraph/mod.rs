//! GraphQL access to the DEX and analytics subgraphs.
//!
//! This module provides:
//! - a thin GraphQL-over-HTTP client
//! - the query documents and their response shapes
//! - [`SubgraphProvider`], which turns subgraph records into domain entities

mod client;
mod dto;
mod provider;
pub mod queries;

pub use client::{GraphQlError, GraphQlRequest, GraphQlResponse, SubgraphClient};
pub use dto::{
    PoolDayDataDto, PoolDto, PositionDto, PositionIdDto, PositionTimestampsDto, TokenDto,
};
pub use provider::{SubgraphProvider, merge_position_page};
