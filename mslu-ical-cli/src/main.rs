mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use mslu_ical_core::ScheduleTarget;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "mslu-ical")]
#[command(about = "MSLU schedule export tool")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Timetable backend base URL
    #[arg(long, default_value = "http://schedule.mslu.by/backend", global = true)]
    base_url: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a schedule and generate an ICS file
    Generate {
        /// Student group ID
        #[arg(short, long, conflicts_with = "teacher", required_unless_present = "teacher")]
        group: Option<u32>,

        /// Teacher ID
        #[arg(short, long)]
        teacher: Option<u32>,

        /// Prefix for event titles, e.g. "🎒 " (keep the trailing space)
        #[arg(short = 'p', long)]
        title_prefix: Option<String>,

        /// Output file path; prints to stdout when omitted
        #[arg(short, long)]
        output: Option<String>,

        /// Calendar name
        #[arg(long)]
        calendar_name: Option<String>,
    },

    /// Print the group listing for a faculty and education form
    Groups {
        /// Faculty ID
        #[arg(short, long)]
        faculty_id: u32,

        /// Education form ID (1 = full-time, 2 = part-time)
        #[arg(short, long, default_value = "1")]
        education_form: u32,
    },

    /// Print the teacher-name listing
    Teachers,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("mslu_ical_cli={}", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Generate {
            group,
            teacher,
            title_prefix,
            output,
            calendar_name,
        } => {
            let target = match (group, teacher) {
                (Some(id), None) => ScheduleTarget::Group(id),
                (None, Some(id)) => ScheduleTarget::Teacher(id),
                _ => anyhow::bail!("pass exactly one of --group or --teacher"),
            };

            commands::generate_command(commands::GenerateParams {
                target,
                title_prefix,
                output,
                calendar_name,
                base_url: cli.base_url,
            })
            .await
        }

        Commands::Groups {
            faculty_id,
            education_form,
        } => commands::groups_command(cli.base_url, faculty_id, education_form).await,

        Commands::Teachers => commands::teachers_command(cli.base_url).await,
    }
}
