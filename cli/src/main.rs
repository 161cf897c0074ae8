//! `arso`: configuration checks and offline evaluation of governance rules.

use anyhow::{bail, Context};
use arso_service::{init_logging, LogFormat, ServiceConfig};
use arso_types::{AcceptanceCriteria, CriteriaSnapshot, QuorumRule};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "arso", about = "ARSO standards balloting tools")]
struct Cli {
    /// Path to a TOML configuration file. Without one, no governance rules
    /// are configured.
    #[arg(long, env = "ARSO_CONFIG")]
    config: Option<PathBuf>,

    /// Log filter; overrides the file's `log_level`.
    #[arg(long, env = "ARSO_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format, "human" or "json"; overrides the file's `log_format`.
    #[arg(long, env = "ARSO_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Validate the configuration and print it with defaults filled in.
    CheckConfig,

    /// Evaluate the acceptance criteria against response counts.
    EvaluateAcceptance {
        #[arg(long)]
        approvals: u32,
        #[arg(long)]
        disapprovals: u32,
        /// Total responses; defaults to approvals + disapprovals.
        #[arg(long)]
        responses: Option<u32>,
        #[arg(long)]
        eligible: u32,
    },

    /// Evaluate the quorum rule against participation counts.
    CheckQuorum {
        #[arg(long)]
        eligible: u32,
        #[arg(long)]
        participating: u32,
    },
}

fn load_config(cli: &Cli) -> anyhow::Result<ServiceConfig> {
    let mut config = match &cli.config {
        Some(path) => ServiceConfig::from_toml_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => ServiceConfig::default(),
    };
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(format) = cli.log_format {
        config.log_format = format;
    }
    config.validate()?;
    Ok(config)
}

fn evaluate_acceptance(
    criteria: Option<AcceptanceCriteria>,
    snapshot: CriteriaSnapshot,
) -> anyhow::Result<String> {
    let Some(criteria) = criteria else {
        bail!("acceptance criteria are not configured ([rules.acceptance])");
    };
    if snapshot.total_eligible == 0 {
        bail!("no eligible members");
    }
    if snapshot.approvals.saturating_add(snapshot.disapprovals) > snapshot.total_responses {
        bail!(
            "{} approvals and {} disapprovals exceed {} responses",
            snapshot.approvals,
            snapshot.disapprovals,
            snapshot.total_responses
        );
    }
    if snapshot.total_responses > snapshot.total_eligible {
        bail!(
            "{} responses exceed {} eligible members",
            snapshot.total_responses,
            snapshot.total_eligible
        );
    }
    let decision = criteria.evaluate(&snapshot);
    Ok(format!(
        "decision: {decision}\n\
         approvals: {} (required {})\n\
         disapprovals: {} (max {})\n\
         approval rate: {:.1}%",
        snapshot.approvals,
        criteria.required_approvals(snapshot.total_eligible),
        snapshot.disapprovals,
        criteria.max_disapprovals,
        snapshot.approval_rate() * 100.0,
    ))
}

fn check_quorum(
    rule: Option<QuorumRule>,
    eligible: u32,
    participating: u32,
) -> anyhow::Result<String> {
    let Some(rule) = rule else {
        bail!("quorum rule is not configured ([rules.quorum])");
    };
    if eligible == 0 {
        bail!("no eligible members");
    }
    if participating > eligible {
        bail!("{participating} participants exceed {eligible} eligible members");
    }
    let report = rule.evaluate(eligible, participating);
    Ok(format!(
        "quorum: {}\nparticipating: {} of {} (required {})",
        if report.met { "met" } else { "not met" },
        report.participating,
        report.eligible,
        report.required,
    ))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    init_logging(config.log_format, &config.log_level);
    tracing::debug!(config = ?cli.config, "configuration loaded");

    let output = match cli.command {
        Command::CheckConfig => config.to_toml_string()?,
        Command::EvaluateAcceptance {
            approvals,
            disapprovals,
            responses,
            eligible,
        } => evaluate_acceptance(
            config.rules.acceptance,
            CriteriaSnapshot {
                approvals,
                disapprovals,
                total_responses: responses.unwrap_or(approvals.saturating_add(disapprovals)),
                total_eligible: eligible,
            },
        )?,
        Command::CheckQuorum {
            eligible,
            participating,
        } => check_quorum(config.rules.quorum, eligible, participating)?,
    };
    println!("{output}");
    Ok(())
}
