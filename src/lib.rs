//! # Amharic RAG
//!
//! Retrieval-augmented question answering over Amharic documents.
//!
//! Documents (`.pdf`, `.txt`) are cleaned of page furniture and symbol
//! noise, reduced to Ethiopic script, split into sentences on Amharic and
//! Latin terminators, and grouped into fixed-size sentence chunks. Each
//! chunk is embedded and stored in a named collection. Questions are
//! answered by retrieving the nearest chunks and asking a generator to
//! answer from that context only.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌──────────────────────────┐   ┌──────────┐
//! │ .pdf/.txt│──▶│ strip → normalize →      │──▶│  Vector  │
//! │          │   │ script → segment → chunk │   │  store   │
//! └──────────┘   └──────────────────────────┘   └────┬─────┘
//!                        embed                       │
//!                      ┌─────────────────────────────┤
//!                      ▼                             ▼
//!                 ┌──────────┐                 ┌──────────┐
//!                 │   CLI    │                 │   HTTP   │
//!                 │ (amrag)  │                 │  (chat)  │
//!                 └──────────┘                 └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! amrag init                      # create database
//! amrag chunks book.pdf           # preview chunks
//! amrag ingest book.pdf           # replace the collection with book.pdf
//! amrag ask "የኢትዮጵያ ዋና ከተማ ማን ናት?"
//! amrag serve                     # start the chat server
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`charset`] | Character-class tables |
//! | [`clean`] | Header stripping, normalization, script extraction |
//! | [`segment`] | Sentence segmentation |
//! | [`chunk`] | Sentence chunking |
//! | [`extract`] | PDF and text loading |
//! | [`models`] | Core data types |
//! | [`embedding`] | Embedding provider abstraction |
//! | [`store`] | Vector store abstraction and backends |
//! | [`generation`] | Answer generation providers |
//! | [`context`] | Application context built at startup |
//! | [`ingest`] | Ingestion orchestration |
//! | [`answer`] | Retrieval and answer orchestration |
//! | [`server`] | HTTP chat server |
//! | [`config`] | TOML configuration parsing |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema migrations |

pub mod answer;
pub mod charset;
pub mod chunk;
pub mod clean;
pub mod config;
pub mod context;
pub mod db;
pub mod embedding;
pub mod extract;
pub mod generation;
pub mod ingest;
pub mod migrate;
pub mod models;
pub mod segment;
pub mod server;
pub mod store;

#[cfg(test)]
mod test_support;
