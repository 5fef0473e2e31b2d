//! # Pursuit CLI
//!
//! Command-line front end for pursuit files: create one, validate its
//! one-pagers, print the underwriting summary, and print sensitivity tables.
//! Every report can also be emitted as JSON for scripting.

mod report;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use pursuit_core::errors::{CalcError, CalcResult};
use pursuit_core::file_io::{load_pursuit, load_pursuit_with_lock_check, save_pursuit, FileLock};
use pursuit_core::pursuit::Pursuit;
use tracing::warn;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "pursuit")]
#[command(about = "Pro-forma underwriting for development pursuits")]
struct Cli {
    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(short, long, default_value = "info", env = "PURSUIT_LOG", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a pursuit file with one default one-pager
    New {
        path: PathBuf,

        #[arg(long)]
        name: String,

        #[arg(long, default_value = "")]
        address: String,

        /// Site area in square feet
        #[arg(long, default_value_t = 0.0)]
        site_area: f64,

        /// Lock holder recorded while writing
        #[arg(long, env = "USER", default_value = "unknown")]
        user: String,
    },

    /// Validate every one-pager in a pursuit
    Validate { path: PathBuf },

    /// Print the underwriting summary for a one-pager
    Calc {
        path: PathBuf,

        /// One-pager name or UUID (defaults to the primary)
        #[arg(long)]
        one_pager: Option<String>,

        #[arg(long)]
        json: bool,

        /// Store the refreshed summary back into the file
        #[arg(long)]
        save: bool,

        #[arg(long, env = "USER", default_value = "unknown")]
        user: String,
    },

    /// Print rent, hard cost, and land cost sweeps and the YOC matrix
    Sensitivity {
        path: PathBuf,

        #[arg(long)]
        one_pager: Option<String>,

        #[arg(long)]
        json: bool,

        /// Fail when a step array has no 0 entry
        #[arg(long)]
        require_base_case: bool,
    },
}

fn init_logging(level: &str) {
    let default_filter = format!("pursuit_cli={level},pursuit_core={level}");
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn resolve_one_pager(pursuit: &Pursuit, key: Option<&str>) -> CalcResult<Uuid> {
    match key {
        Some(key) => pursuit.find_one_pager(key),
        None => pursuit.primary_id(),
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> CalcResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn cmd_new(path: &Path, name: &str, address: &str, site_area: f64, user: &str) -> CalcResult<()> {
    if path.exists() {
        return Err(CalcError::file_error(
            "create",
            path.display().to_string(),
            "file already exists",
        ));
    }
    let mut pursuit = Pursuit::new(name, address, site_area);
    let id = pursuit.new_one_pager("Base Case");
    pursuit.refresh_summary(&id)?;

    let _lock = FileLock::acquire(path, user)?;
    save_pursuit(&pursuit, path)?;
    println!("Created {} ({})", path.display(), pursuit.meta.name);
    Ok(())
}

fn cmd_validate(path: &Path) -> CalcResult<bool> {
    let pursuit = load_pursuit(path)?;
    let mut all_valid = true;

    for (id, one_pager) in pursuit.one_pagers_sorted() {
        let checks = one_pager
            .validate()
            .and_then(|_| one_pager.sensitivity.require_base_case());
        match checks {
            Ok(()) => println!("[OK]   {} ({id})", one_pager.name),
            Err(e) => {
                all_valid = false;
                println!("[FAIL] {} ({id}): {} [{}]", one_pager.name, e, e.error_code());
            }
        }
    }
    Ok(all_valid)
}

fn cmd_calc(path: &Path, key: Option<&str>, json: bool, save: bool, user: &str) -> CalcResult<()> {
    // A saving run holds the lock from load through save
    let lock = if save {
        Some(FileLock::acquire(path, user)?)
    } else {
        None
    };
    let mut pursuit = if lock.is_some() {
        load_pursuit(path)?
    } else {
        let (pursuit, lock_info) = load_pursuit_with_lock_check(path)?;
        if let Some(info) = lock_info {
            warn!(
                path = %path.display(),
                holder = %info.user_id,
                "pursuit is open for editing; results may change"
            );
        }
        pursuit
    };

    let id = resolve_one_pager(&pursuit, key)?;
    let one_pager = pursuit
        .get_one_pager(&id)
        .ok_or_else(|| CalcError::not_found("OnePager", id.to_string()))?;
    one_pager.validate()?;

    let results = pursuit.calculate(&id)?;
    if json {
        print_json(&results)?;
    } else {
        print!("{}", report::summary(&pursuit, one_pager, &results));
    }

    if lock.is_some() {
        pursuit.refresh_summary(&id)?;
        save_pursuit(&pursuit, path)?;
    }
    Ok(())
}

fn cmd_sensitivity(
    path: &Path,
    key: Option<&str>,
    json: bool,
    require_base_case: bool,
) -> CalcResult<()> {
    let pursuit = load_pursuit(path)?;
    let id = resolve_one_pager(&pursuit, key)?;
    let one_pager = pursuit
        .get_one_pager(&id)
        .ok_or_else(|| CalcError::not_found("OnePager", id.to_string()))?;
    one_pager.validate()?;
    if require_base_case {
        one_pager.sensitivity.require_base_case()?;
    }

    let analysis = pursuit.sensitivity(&id)?;
    if json {
        print_json(&analysis)?;
    } else {
        print!("{}", report::sensitivity(one_pager, &analysis));
    }
    Ok(())
}

/// Run a command. `Ok(false)` means it finished but found problems.
fn run(cli: Cli) -> CalcResult<bool> {
    match cli.command {
        Command::New {
            path,
            name,
            address,
            site_area,
            user,
        } => cmd_new(&path, &name, &address, site_area, &user)?,
        Command::Validate { path } => return cmd_validate(&path),
        Command::Calc {
            path,
            one_pager,
            json,
            save,
            user,
        } => cmd_calc(&path, one_pager.as_deref(), json, save, &user)?,
        Command::Sensitivity {
            path,
            one_pager,
            json,
            require_base_case,
        } => cmd_sensitivity(&path, one_pager.as_deref(), json, require_base_case)?,
    }
    Ok(true)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!(code = e.error_code(), "{e}");
            eprintln!("Error: {e}");
            if let Ok(json) = serde_json::to_string_pretty(&e) {
                eprintln!();
                eprintln!("Error JSON:");
                eprintln!("{json}");
            }
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use pursuit_core::one_pager::{OnePager, UnitMixRow};

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_calc() {
        let cli = Cli::parse_from([
            "pursuit",
            "calc",
            "maple.pursuit",
            "--one-pager",
            "Base Case",
            "--json",
        ]);
        match cli.command {
            Command::Calc { one_pager, json, save, .. } => {
                assert_eq!(one_pager.as_deref(), Some("Base Case"));
                assert!(json);
                assert!(!save);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    fn write_pursuit(dir: &Path, edit: impl FnOnce(&mut OnePager)) -> PathBuf {
        let path = dir.join("maple.pursuit");
        let mut pursuit = Pursuit::new("Maple Street", "", 87_120.0);
        let id = pursuit.new_one_pager("Base Case");
        let one_pager = pursuit.get_one_pager_mut(&id).unwrap();
        one_pager.unit_mix.push(UnitMixRow::per_sf("1BR", 100, 750.0, 2.40));
        edit(one_pager);
        save_pursuit(&pursuit, &path).unwrap();
        path
    }

    #[test]
    fn test_validate_exit_status() {
        let good_dir = tempfile::tempdir().unwrap();
        let good = write_pursuit(good_dir.path(), |_| {}).display().to_string();
        assert!(run(Cli::parse_from(["pursuit", "validate", good.as_str()])).unwrap());

        let bad_dir = tempfile::tempdir().unwrap();
        let bad = write_pursuit(bad_dir.path(), |op| op.vacancy_rate = 1.5);
        assert!(!cmd_validate(&bad).unwrap());
        let bad = bad.display().to_string();
        assert!(!run(Cli::parse_from(["pursuit", "validate", bad.as_str()])).unwrap());
    }

    #[test]
    fn test_validate_flags_missing_base_case() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_pursuit(dir.path(), |op| op.sensitivity.rent = vec![-0.1, 0.1]);
        assert!(!cmd_validate(&path).unwrap());
    }

    #[test]
    fn test_sensitivity_require_base_case() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_pursuit(dir.path(), |op| op.sensitivity.hard_cost = vec![-10.0, 10.0]);

        let err = cmd_sensitivity(&path, None, true, true).unwrap_err();
        assert_eq!(err.error_code(), "MISSING_BASE_CASE");
        assert!(cmd_sensitivity(&path, None, true, false).is_ok());

        let path = path.display().to_string();
        let cli = Cli::parse_from([
            "pursuit",
            "sensitivity",
            path.as_str(),
            "--json",
            "--require-base-case",
        ]);
        assert_eq!(run(cli).unwrap_err().error_code(), "MISSING_BASE_CASE");
    }

    #[test]
    fn test_calc_save_stores_summary_and_releases_lock() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_pursuit(dir.path(), |_| {});

        cmd_calc(&path, None, true, true, "analyst").unwrap();

        let saved = load_pursuit(&path).unwrap();
        assert_eq!(saved.primary_summary().unwrap().total_units, 100);
        assert!(FileLock::check(&path).is_none());
    }

    #[test]
    fn test_calc_save_refuses_while_someone_else_holds_the_lock() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_pursuit(dir.path(), |_| {});
        let _held = FileLock::acquire(&path, "colleague").unwrap();

        let err = cmd_calc(&path, None, true, true, "analyst").unwrap_err();
        assert_eq!(err.error_code(), "FILE_LOCKED");
        assert!(load_pursuit(&path).unwrap().primary_summary().is_none());

        // Read-only runs still work while the file is locked
        assert!(cmd_calc(&path, None, true, false, "analyst").is_ok());
    }

    #[test]
    fn test_resolve_defaults_to_primary() {
        let mut pursuit = Pursuit::new("Site", "", 0.0);
        let first = pursuit.new_one_pager("Base Case");
        pursuit.new_one_pager("Upside");
        assert_eq!(resolve_one_pager(&pursuit, None).unwrap(), first);
        assert_ne!(resolve_one_pager(&pursuit, Some("Upside")).unwrap(), first);
    }
}
