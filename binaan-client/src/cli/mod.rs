//! The `binaan` command line

pub mod render;
pub mod watch;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use crate::api::FileAttachment;
use crate::config::{
    ClientConfig, ConfigError, DEFAULT_BASE_URL, ENV_API_URL, ENV_INIT_POLICY, ENV_LOG_ACTIONS,
    ENV_LOG_FILTER, ENV_TOKEN, InitPolicy,
};
use crate::context::AppContext;
use crate::features::kurikulum::api::MateriUpload;
use crate::features::kurikulum::{self, KurikulumFilterPatch, KurikulumStatus};
use crate::features::laporan_anak::{self, AnakFilterPatch};
use crate::features::raport::{self, RaportFilterPatch};
use crate::features::survey::{self, SurveyFilterPatch, Validation, ValidationStatus};
use crate::features::tutor::{self, TutorFilterPatch};

pub use watch::{Report, WatchArgs, WatchCommand};

/// Admin reports for the binaan child-sponsorship backend
#[derive(Parser, Debug)]
#[command(name = "binaan", version, about)]
pub struct Cli {
    /// Backend base URL
    #[arg(long, env = ENV_API_URL, default_value = DEFAULT_BASE_URL, global = true)]
    pub api_url: String,

    /// Bearer token of the signed-in admin
    #[arg(long, env = ENV_TOKEN, hide_env_values = true, global = true)]
    pub token: Option<String>,

    /// What page initialization does when a filter-options request fails
    #[arg(long, env = ENV_INIT_POLICY, default_value = "best-effort", global = true)]
    pub init_policy: InitPolicy,

    /// Print the dispatched actions after the command
    #[arg(long, env = ENV_LOG_ACTIONS, global = true)]
    pub log_actions: bool,

    /// Only log actions matching these comma-separated globs, e.g.
    /// `*DidError,Initialize*` (implies --log-actions)
    #[arg(long, env = ENV_LOG_FILTER, value_name = "PATTERNS", global = true)]
    pub log_filter: Option<String>,

    /// How many logged actions to print
    #[arg(long, default_value_t = 50, global = true)]
    pub log_tail: usize,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Print the page state as JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn client_config(&self) -> Result<ClientConfig, ConfigError> {
        let mut config = ClientConfig::new(&self.api_url)?.with_init_policy(self.init_policy);
        if let Some(token) = self.token.as_deref().filter(|t| !t.trim().is_empty()) {
            config = config.with_token(token);
        }
        if self.log_actions || self.log_filter.is_some() {
            config = config.with_action_log(self.log_filter.as_deref());
        }
        Ok(config)
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Curriculum management
    Kurikulum {
        #[command(subcommand)]
        command: KurikulumCommand,
    },
    /// Attendance report per child
    Anak(AttendanceArgs),
    /// Report cards
    Raport(RaportArgs),
    /// Attendance report per tutor
    Tutor(AttendanceArgs),
    /// Family survey validation
    Survey {
        #[command(subcommand)]
        command: SurveyCommand,
    },
    /// Keep one report open and edit its filters from stdin
    Watch(WatchArgs),
}

#[derive(Subcommand, Debug)]
pub enum KurikulumCommand {
    List {
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        status: Option<KurikulumStatus>,
        #[arg(long)]
        search: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    Show {
        id: u64,
    },
    Delete {
        id: u64,
    },
    /// Make this the only active kurikulum
    Activate {
        id: u64,
    },
    /// Attach a materi, optionally with a file
    Upload {
        id: u64,
        #[arg(long)]
        nama: String,
        #[arg(long)]
        deskripsi: Option<String>,
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
pub enum SurveyCommand {
    List {
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        status: Option<ValidationStatus>,
        #[arg(long)]
        shelter: Option<u64>,
        #[arg(long)]
        search: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    Show {
        id: u64,
    },
    /// Record a verdict: layak, tidak-layak, tambah-kelayakan or pending
    Validate {
        id: u64,
        status: ValidationStatus,
        #[arg(long)]
        catatan: Option<String>,
    },
}

#[derive(Args, Debug, Clone)]
pub struct AttendanceArgs {
    #[arg(long)]
    pub year: Option<i32>,
    #[arg(long)]
    pub jenis_kegiatan: Option<String>,
    #[arg(long)]
    pub search: Option<String>,
    #[arg(long, default_value_t = 1)]
    pub page: u32,
    /// Also load the detail report for this id
    #[arg(long)]
    pub detail: Option<u64>,
}

impl AttendanceArgs {
    fn anak_patch(&self) -> AnakFilterPatch {
        AnakFilterPatch {
            year: self.year,
            jenis_kegiatan: self.jenis_kegiatan.clone().map(Some),
            search: self.search.clone().map(Some),
        }
    }

    fn tutor_patch(&self) -> TutorFilterPatch {
        TutorFilterPatch {
            year: self.year,
            jenis_kegiatan: self.jenis_kegiatan.clone().map(Some),
            search: self.search.clone().map(Some),
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct RaportArgs {
    #[arg(long)]
    pub year: Option<i32>,
    /// Semester id, see the semester list printed above the table
    #[arg(long)]
    pub semester: Option<u64>,
    #[arg(long)]
    pub status: Option<String>,
    #[arg(long)]
    pub search: Option<String>,
    #[arg(long, default_value_t = 1)]
    pub page: u32,
    /// Also load the report cards of this child
    #[arg(long)]
    pub detail: Option<u64>,
}

impl RaportArgs {
    fn patch(&self) -> RaportFilterPatch {
        RaportFilterPatch {
            year: self.year,
            semester_id: self.semester.map(Some),
            status: self.status.clone().map(Some),
            search: self.search.clone().map(Some),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Output {
    json: bool,
}

impl Output {
    fn print<T: Serialize>(self, value: &T, text: impl FnOnce(&T) -> String) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            println!("{}", text(value));
        }
        Ok(())
    }
}

pub async fn run(cli: Cli) -> Result<()> {
    let config = cli.client_config()?;
    let ctx = AppContext::from_config(&config)?;
    tracing::debug!(base_url = %config.base_url, policy = config.init_policy.as_str(), "starting");
    let result = execute(&ctx, cli.command, cli.json).await;
    if let Some(entries) = ctx.recent_actions(cli.log_tail) {
        eprintln!("{}", render::action_log(&entries));
    }
    result
}

/// Run one command against an already built context
pub async fn execute(ctx: &AppContext, command: Command, json: bool) -> Result<()> {
    let out = Output { json };
    match command {
        Command::Kurikulum { command } => run_kurikulum(ctx, command, out).await,
        Command::Anak(args) => {
            laporan_anak::initialize(ctx, Some(args.anak_patch())).await?;
            if args.page > 1 {
                laporan_anak::fetch_list(ctx, args.page).await?;
            }
            if let Some(id) = args.detail {
                laporan_anak::fetch_child_detail(ctx, id).await?;
            }
            out.print(&ctx.select(|s| s.anak.clone()), render::anak)
        }
        Command::Raport(args) => {
            raport::initialize(ctx, Some(args.patch())).await?;
            if args.page > 1 {
                raport::fetch_list(ctx, args.page).await?;
            }
            if let Some(id) = args.detail {
                raport::fetch_child_detail(ctx, id).await?;
            }
            out.print(&ctx.select(|s| s.raport.clone()), render::raport)
        }
        Command::Tutor(args) => {
            tutor::initialize(ctx, Some(args.tutor_patch())).await?;
            if args.page > 1 {
                tutor::fetch_list(ctx, args.page).await?;
            }
            if let Some(id) = args.detail {
                tutor::fetch_detail(ctx, id).await?;
            }
            out.print(&ctx.select(|s| s.tutor.clone()), render::tutor)
        }
        Command::Survey { command } => run_survey(ctx, command, out).await,
        Command::Watch(args) => watch::run(ctx, &args, json).await,
    }
}

async fn run_kurikulum(ctx: &AppContext, command: KurikulumCommand, out: Output) -> Result<()> {
    match command {
        KurikulumCommand::List {
            year,
            status,
            search,
            page,
        } => {
            let patch = KurikulumFilterPatch {
                year,
                status: status.map(Some),
                search: search.map(Some),
            };
            kurikulum::initialize(ctx, Some(patch)).await?;
            if page > 1 {
                kurikulum::fetch_list(ctx, page).await?;
            }
            out.print(&ctx.select(|s| s.kurikulum.clone()), render::kurikulum)
        }
        KurikulumCommand::Show { id } => {
            let detail = kurikulum::fetch_detail(ctx, id).await?;
            out.print(&detail, render::kurikulum_detail)
        }
        KurikulumCommand::Delete { id } => {
            kurikulum::delete(ctx, id).await?;
            println!("Kurikulum {id} deleted");
            Ok(())
        }
        KurikulumCommand::Activate { id } => {
            let activation = kurikulum::set_active(ctx, id).await?;
            println!("Kurikulum {} is now {}", activation.id, activation.status);
            Ok(())
        }
        KurikulumCommand::Upload {
            id,
            nama,
            deskripsi,
            file,
        } => {
            let file = match file {
                Some(path) => Some(FileAttachment::read(&path).await?),
                None => None,
            };
            let upload = MateriUpload {
                nama_materi: nama,
                deskripsi,
                file,
            };
            let uploaded = kurikulum::upload_materi(ctx, id, upload).await?;
            println!(
                "Materi {} ({}) added to kurikulum {}",
                uploaded.materi.nama_materi, uploaded.materi.id, uploaded.kurikulum_id
            );
            Ok(())
        }
    }
}

async fn run_survey(ctx: &AppContext, command: SurveyCommand, out: Output) -> Result<()> {
    match command {
        SurveyCommand::List {
            year,
            status,
            shelter,
            search,
            page,
        } => {
            let patch = SurveyFilterPatch {
                year,
                status: status.map(Some),
                shelter_id: shelter.map(Some),
                search: search.map(Some),
            };
            survey::initialize(ctx, Some(patch)).await?;
            if page > 1 {
                survey::fetch_list(ctx, page).await?;
            }
            out.print(&ctx.select(|s| s.survey.clone()), render::survey)
        }
        SurveyCommand::Show { id } => {
            let detail = survey::fetch_detail(ctx, id).await?;
            out.print(&detail, render::survey_detail)
        }
        SurveyCommand::Validate {
            id,
            status,
            catatan,
        } => {
            let validation = Validation {
                status_validasi: status,
                catatan_validasi: catatan.filter(|c| !c.trim().is_empty()),
            };
            let record = survey::validate(ctx, id, validation).await?;
            println!("Survey {} is now {}", record.id_survey, record.status_validasi);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Method;
    use crate::testing::{FakeBackend, kurikulum_json, test_context};
    use clap::CommandFactory;
    use serde_json::json;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_attendance_flags() {
        let cli = Cli::try_parse_from([
            "binaan",
            "--api-url",
            "https://binaan.example.org/api",
            "anak",
            "--year",
            "2023",
            "--search",
            "rina",
            "--detail",
            "5",
        ])
        .unwrap();

        let Command::Anak(args) = &cli.command else {
            panic!("expected anak, got {:?}", cli.command);
        };
        let patch = args.anak_patch();
        assert_eq!(patch.year, Some(2023));
        assert_eq!(patch.search, Some(Some("rina".into())));
        assert_eq!(patch.jenis_kegiatan, None);
        assert_eq!(args.detail, Some(5));

        let config = cli.client_config().unwrap();
        assert_eq!(config.base_url.as_str(), "https://binaan.example.org/api/");
        assert_eq!(config.init_policy, InitPolicy::BestEffort);
        assert!(!config.log_actions);
    }

    #[test]
    fn test_log_filter_implies_log_actions() {
        let cli = Cli::try_parse_from([
            "binaan",
            "--log-filter",
            "*DidError, Initialize*",
            "tutor",
        ])
        .unwrap();

        let config = cli.client_config().unwrap();
        assert!(config.log_actions);
        assert_eq!(config.action_filter.as_deref(), Some("*DidError, Initialize*"));
        assert_eq!(cli.log_tail, 50);
    }

    #[test]
    fn test_parse_validate_and_policy() {
        let cli = Cli::try_parse_from([
            "binaan",
            "--init-policy",
            "fail-fast",
            "survey",
            "validate",
            "12",
            "tidak-layak",
            "--catatan",
            "Penghasilan cukup",
        ])
        .unwrap();

        assert_eq!(cli.init_policy, InitPolicy::FailFast);
        match cli.command {
            Command::Survey {
                command:
                    SurveyCommand::Validate {
                        id,
                        status,
                        catatan,
                    },
            } => {
                assert_eq!(id, 12);
                assert_eq!(status, ValidationStatus::TidakLayak);
                assert_eq!(catatan.as_deref(), Some("Penghasilan cukup"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_unknown_policy_rejected() {
        let err =
            Cli::try_parse_from(["binaan", "--init-policy", "sometimes", "anak"]).unwrap_err();
        assert!(err.to_string().contains("sometimes"));
    }

    #[tokio::test]
    async fn test_kurikulum_list_applies_flags() {
        let fake = FakeBackend::new();
        fake.respond(
            Method::Get,
            "admin-shelter/kurikulum/filter-options",
            json!({"success": true, "data": {"available_years": [2024]}}),
        );
        fake.respond(
            Method::Get,
            "admin-shelter/kurikulum",
            json!({
                "success": true,
                "data": {"data": [kurikulum_json(1, "aktif")], "current_page": 1, "last_page": 1, "total": 1}
            }),
        );
        let ctx = test_context(&fake, InitPolicy::BestEffort);

        let command = KurikulumCommand::List {
            year: Some(2024),
            status: Some(KurikulumStatus::Aktif),
            search: None,
            page: 1,
        };
        execute(&ctx, Command::Kurikulum { command }, true)
            .await
            .unwrap();

        let request = fake.last_request().unwrap();
        assert_eq!(request.query.get("tahun_berlaku"), Some("2024"));
        assert_eq!(request.query.get("status"), Some("aktif"));
        assert_eq!(ctx.select(|s| s.kurikulum.list.items.len()), 1);
    }
}
