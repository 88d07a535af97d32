// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! roster-authz: inspect scope authorization decisions for the Roster
//! employee directory.

use anyhow::Result;
use clap::{Args as ClapArgs, Parser, Subcommand};
use serde::Serialize;
use std::fmt::Display;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::Subscriber;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{
	layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter, Registry,
};

mod commands;
mod context;
mod version;

use commands::AssignedFrom;
use context::AuthzContext;

#[derive(Parser, Debug)]
#[command(
	name = "roster-authz",
	about = "Inspect Roster scope authorization",
	version
)]
struct Args {
	/// Config file to use instead of /etc/roster/server.toml
	#[arg(long, global = true, env = "ROSTER_SERVER_CONFIG")]
	config: Option<PathBuf>,

	/// Emit JSON instead of text
	#[arg(long, global = true)]
	json: bool,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// List catalogued scopes with descriptions and inclusions
	Catalogue,

	/// Show the description of a scope
	Describe {
		scope: String,
	},

	/// Decide whether assigned scopes satisfy required scopes
	Check {
		/// Required scopes, comma-separated
		#[arg(long, value_delimiter = ',')]
		required: Vec<String>,

		#[command(flatten)]
		assigned: AssignedArgs,
	},

	/// Show which scope-gated UI controls are enabled
	Affordances {
		/// Candidate scopes, comma-separated
		#[arg(long, value_delimiter = ',', required = true)]
		candidates: Vec<String>,

		#[command(flatten)]
		assigned: AssignedArgs,

		/// Enable every control regardless of assigned scopes
		#[arg(long)]
		bypass: bool,
	},

	/// List route scope requirements
	Routes,

	/// Show version and build information
	Version,
}

#[derive(ClapArgs, Debug)]
struct AssignedArgs {
	/// Assigned scopes, comma-separated
	#[arg(long, value_delimiter = ',', conflicts_with = "principal")]
	assigned: Vec<String>,

	/// Look up assigned scopes for this principal
	#[arg(long)]
	principal: Option<String>,
}

/// Level used until the configured one is known.
const BOOTSTRAP_LOG_LEVEL: &str = "info";

type FilterHandle = reload::Handle<EnvFilter, Registry>;

/// Subscriber with a reloadable filter, so logging can start before
/// configuration is loaded and pick up the configured level afterwards.
fn logging<W>(
	make_writer: W,
	filter: EnvFilter,
) -> (impl Subscriber + Send + Sync + 'static, FilterHandle)
where
	W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
	let (filter, handle) = reload::Layer::new(filter);
	let subscriber = tracing_subscriber::registry()
		.with(filter)
		.with(tracing_subscriber::fmt::layer().with_writer(make_writer));
	(subscriber, handle)
}

fn bootstrap_filter() -> EnvFilter {
	EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(BOOTSTRAP_LOG_LEVEL))
}

/// Switch to the configured level unless `RUST_LOG` already decided.
fn apply_configured_level(handle: &FilterHandle, level: &str) -> Result<()> {
	if std::env::var_os(EnvFilter::DEFAULT_ENV).is_none() {
		handle.reload(EnvFilter::new(level))?;
	}
	Ok(())
}

impl From<AssignedArgs> for AssignedFrom {
	fn from(args: AssignedArgs) -> Self {
		match args.principal {
			Some(principal) => AssignedFrom::Principal(principal),
			None => AssignedFrom::Explicit(args.assigned),
		}
	}
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
	let args = Args::parse();

	if let Command::Version = args.command {
		println!("{}", version::format_version_info());
		return Ok(ExitCode::SUCCESS);
	}

	let (subscriber, filter_handle) = logging(std::io::stderr, bootstrap_filter());
	subscriber.init();

	let config = match &args.config {
		Some(path) => roster_server_config::load_config_with_file(path)?,
		None => roster_server_config::load_config()?,
	};
	apply_configured_level(&filter_handle, &config.logging.level)?;

	let ctx = AuthzContext::from_config(&config)?;

	match args.command {
		Command::Catalogue => emit(&commands::catalogue(&ctx), args.json)?,
		Command::Describe { scope } => {
			let report = commands::describe(&ctx, &scope)?;
			if report.description.is_none() {
				eprintln!("unknown scope: {}", report.scope);
			}
			emit(&report, args.json)?;
		}
		Command::Check { required, assigned } => {
			let report = commands::check(&ctx, &required, assigned.into()).await?;
			emit(&report, args.json)?;
			if !report.permitted {
				return Ok(ExitCode::FAILURE);
			}
		}
		Command::Affordances {
			candidates,
			assigned,
			bypass,
		} => {
			let report = commands::affordances(&ctx, &candidates, assigned.into(), bypass).await?;
			emit(&report, args.json)?;
		}
		Command::Routes => emit(&commands::routes(&ctx), args.json)?,
		// Printed before configuration is loaded.
		Command::Version => {}
	}

	Ok(ExitCode::SUCCESS)
}

fn emit<T: Serialize + Display>(report: &T, json: bool) -> Result<()> {
	if json {
		println!("{}", serde_json::to_string_pretty(report)?);
	} else {
		print!("{report}");
	}
	Ok(())
}
