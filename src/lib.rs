//! # Outreach
//!
//! Drafts cold outreach emails from job postings.
//!
//! A run fetches a careers page and reduces it to visible text. A language
//! model extracts the role, experience, skills and description as JSON. The
//! skills are matched against a local embedding index of portfolio projects.
//! A second model call then writes an email that cites the closest projects.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌────────────┐   ┌──────────────┐   ┌──────────┐
//! │  Fetch   │──▶│  Extract   │──▶│  Portfolio   │──▶│  Email   │──▶ .md
//! │  (HTML)  │   │  (LLM→JSON)│   │  Index (k=2) │   │  (LLM)   │
//! └──────────┘   └────────────┘   └──────┬───────┘   └──────────┘
//!                                        │
//!                                  ┌─────┴─────┐
//!                                  │  SQLite   │ ◀── portfolio CSV
//!                                  │  vectors  │
//!                                  └───────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! export GROQ_API_KEY=...
//! outreach init                             # create the store
//! outreach portfolio load                   # embed my_portfolio.csv
//! outreach generate https://careers.example.com/jobs/123
//! outreach generate --test-data --no-save   # skip fetch and extraction
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`error`] | Stage error types |
//! | [`fetch`] | Page fetcher and HTML → text |
//! | [`llm`] | Chat model trait and OpenAI-compatible client |
//! | [`prompts`] | Prompt templates |
//! | [`extract`] | Job extraction stage |
//! | [`embedding`] | Embedding provider abstraction |
//! | [`index`] | Portfolio index (load, query, status) |
//! | [`email`] | Email generation stage |
//! | [`output`] | Saving drafts |
//! | [`pipeline`] | End-to-end run |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema migrations |
//! | [`logging`] | Tracing subscriber setup |

pub mod config;
pub mod db;
pub mod email;
pub mod embedding;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod index;
pub mod llm;
pub mod logging;
pub mod migrate;
pub mod models;
pub mod output;
pub mod pipeline;
pub mod prompts;
