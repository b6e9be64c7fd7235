//! Reckon: a math & search agent.
//!
//! Answers quantitative questions by letting a language model call two
//! tools, `search_web` for facts and `calculator` for arithmetic, in a
//! bounded assistant ⇄ tools loop. Progress is surfaced as a stream of
//! updates, mapped onto tasks, and served over JSON-RPC with SSE.
//!
//! # Quick Start
//!
//! ```no_run
//! use reckon::prelude::*;
//!
//! # async fn example() -> reckon::error::Result<()> {
//! let config = ReckonConfig::load()?;
//! let agent = Agent::from_config(&config)?;
//! let answer = agent.ask("What is 100 / 4?", "demo").await?;
//! println!("{answer}");
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod agent_loop;
pub mod arith;
pub mod config;
pub mod error;
pub mod executor;
pub mod prelude;
pub mod provider;
pub mod server;
pub mod session;
pub mod task;
pub mod tools;
pub mod types;
pub mod util;

#[cfg(feature = "cli")]
pub mod cli;
