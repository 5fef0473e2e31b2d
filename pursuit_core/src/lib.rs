//! # pursuit_core - Pro-Forma Underwriting Engine
//!
//! `pursuit_core` turns a one-pager's unit mix, operating assumptions, and
//! cost assumptions into development-return metrics (NOI, yield on cost,
//! cost per unit, ...), and re-runs that pipeline under perturbed inputs for
//! sensitivity tables.
//!
//! ## Design Philosophy
//!
//! - **Stateless**: The engine is a chain of pure functions; nothing is cached
//! - **Total**: Ratios with a zero denominator are `0.0`, never NaN or an error
//! - **JSON-First**: Inputs and results implement Serialize/Deserialize
//! - **Rich Errors**: Validation and file I/O use structured [`CalcError`]s
//!
//! ## Quick Start
//!
//! ```rust
//! use pursuit_core::calculations::{calculate_all, CalculationInputs};
//! use pursuit_core::one_pager::{OnePager, UnitMixRow};
//!
//! let mut one_pager = OnePager::new("Base Case");
//! one_pager.land_cost = 2_000_000.0;
//! one_pager.unit_mix.push(UnitMixRow::per_sf("1BR", 60, 725.0, 2.35));
//! one_pager.unit_mix.push(UnitMixRow::whole_dollar("2BR", 40, 1_050.0, 2_400.0));
//!
//! let results = calculate_all(&CalculationInputs::from_one_pager(&one_pager, 65_000.0));
//! assert_eq!(results.total_units, 100);
//!
//! let json = serde_json::to_string_pretty(&results).unwrap();
//! ```
//!
//! ## Modules
//!
//! - [`calculations`] - The pipeline stages, orchestrator, and sensitivity engine
//! - [`one_pager`] - Assumption records and row types
//! - [`pursuit`] - Pursuit container with one-pagers and cached summaries
//! - [`settings`] - Default assumptions, sensitivity steps, base-case policy
//! - [`errors`] - Structured error types
//! - [`file_io`] - Atomic saves and file locking for `.pursuit` files

pub mod calculations;
pub mod errors;
pub mod file_io;
pub mod one_pager;
pub mod pursuit;
pub mod settings;

// Re-export commonly used types at crate root for convenience
pub use calculations::{calculate_all, CalculationInputs, CalculationResults};
pub use errors::{CalcError, CalcResult};
pub use file_io::{load_pursuit, save_pursuit, FileLock};
pub use one_pager::OnePager;
pub use pursuit::{PipelineStage, Pursuit, PursuitMetadata};
pub use settings::{BaseCasePolicy, PursuitSettings};
