//! `binaan watch`: one report kept open, filters edited from stdin
//!
//! Every filter change spawns the list reload under one task key, so a newer
//! change aborts the reload still in flight. An aborted thunk still settles
//! its operations as cancelled. Search edits are debounced.

use std::io::Write;
use std::str::FromStr;
use std::time::Duration;

use binaan_dispatch::{Rejection, TaskKey, TaskManager};
use clap::{Args, ValueEnum};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::render;
use crate::context::AppContext;
use crate::features::kurikulum::{self, KurikulumFilterPatch};
use crate::features::laporan_anak::{self, AnakFilterPatch};
use crate::features::raport::{self, RaportFilterPatch};
use crate::features::survey::{self, SurveyFilterPatch};
use crate::features::tutor::{self, TutorFilterPatch};
use crate::state::AppState;

const INIT_TASK: &str = "init";
const LIST_TASK: &str = "list";
/// How often a closed-input session checks whether its reloads are done
const SETTLE_POLL: Duration = Duration::from_millis(10);

#[derive(Args, Debug, Clone)]
pub struct WatchArgs {
    /// Report page to keep open
    #[arg(value_enum)]
    pub report: Report,

    /// Milliseconds to wait after a search edit before reloading
    #[arg(long, default_value_t = 400)]
    pub debounce_ms: u64,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Report {
    Kurikulum,
    Anak,
    Raport,
    Tutor,
    Survey,
}

/// One line of watch input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchCommand {
    Year(i32),
    /// `search` alone clears the search
    Search(Option<String>),
    Page(u32),
    Expand(u64),
    Reset,
    Refresh,
    Quit,
}

impl FromStr for WatchCommand {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };
        match word.to_ascii_lowercase().as_str() {
            "year" => argument(word, rest, "a year").map(WatchCommand::Year),
            "search" if rest.is_empty() => Ok(WatchCommand::Search(None)),
            "search" => Ok(WatchCommand::Search(Some(rest.to_string()))),
            "page" => argument(word, rest, "a page number").map(WatchCommand::Page),
            "expand" => argument(word, rest, "an id").map(WatchCommand::Expand),
            "reset" => Ok(WatchCommand::Reset),
            "refresh" => Ok(WatchCommand::Refresh),
            "quit" | "exit" | "q" => Ok(WatchCommand::Quit),
            _ => Err(format!(
                "unknown command `{line}` (year N, search TEXT, page N, expand ID, reset, refresh, quit)"
            )),
        }
    }
}

fn argument<T: FromStr>(word: &str, rest: &str, what: &str) -> Result<T, String> {
    rest.parse()
        .map_err(|_| format!("`{word}` expects {what}, got `{rest}`"))
}

#[derive(Debug, Clone, Default)]
struct FilterChange {
    year: Option<i32>,
    search: Option<Option<String>>,
}

impl Report {
    async fn initialize(self, ctx: &AppContext) -> Result<(), Rejection> {
        match self {
            Report::Kurikulum => kurikulum::initialize(ctx, None).await,
            Report::Anak => laporan_anak::initialize(ctx, None).await,
            Report::Raport => raport::initialize(ctx, None).await,
            Report::Tutor => tutor::initialize(ctx, None).await,
            Report::Survey => survey::initialize(ctx, None).await,
        }
    }

    async fn change(self, ctx: &AppContext, change: FilterChange) -> Result<(), Rejection> {
        let FilterChange { year, search } = change;
        match self {
            Report::Kurikulum => {
                let patch = KurikulumFilterPatch {
                    year,
                    search,
                    ..Default::default()
                };
                kurikulum::update_filters_and_refresh(ctx, patch).await.map(drop)
            }
            Report::Anak => {
                let patch = AnakFilterPatch {
                    year,
                    search,
                    ..Default::default()
                };
                laporan_anak::update_filters_and_refresh(ctx, patch).await.map(drop)
            }
            Report::Raport => {
                let patch = RaportFilterPatch {
                    year,
                    search,
                    ..Default::default()
                };
                raport::update_filters_and_refresh(ctx, patch).await.map(drop)
            }
            Report::Tutor => {
                let patch = TutorFilterPatch {
                    year,
                    search,
                    ..Default::default()
                };
                tutor::update_filters_and_refresh(ctx, patch).await.map(drop)
            }
            Report::Survey => {
                let patch = SurveyFilterPatch {
                    year,
                    search,
                    ..Default::default()
                };
                survey::update_filters_and_refresh(ctx, patch).await.map(drop)
            }
        }
    }

    async fn page(self, ctx: &AppContext, page: u32) -> Result<(), Rejection> {
        match self {
            Report::Kurikulum => kurikulum::fetch_list(ctx, page).await.map(drop),
            Report::Anak => laporan_anak::fetch_list(ctx, page).await.map(drop),
            Report::Raport => raport::fetch_list(ctx, page).await.map(drop),
            Report::Tutor => tutor::fetch_list(ctx, page).await.map(drop),
            Report::Survey => survey::fetch_list(ctx, page).await.map(drop),
        }
    }

    async fn refresh(self, ctx: &AppContext) -> Result<(), Rejection> {
        match self {
            Report::Kurikulum => kurikulum::refresh(ctx).await.map(drop),
            Report::Anak => laporan_anak::refresh(ctx).await.map(drop),
            Report::Raport => raport::refresh(ctx).await.map(drop),
            Report::Tutor => tutor::refresh(ctx).await.map(drop),
            Report::Survey => survey::refresh(ctx).await.map(drop),
        }
    }

    fn toggle(self, ctx: &AppContext, id: u64) {
        match self {
            Report::Kurikulum => kurikulum::toggle_card(ctx, id),
            Report::Anak => laporan_anak::toggle_card(ctx, id),
            Report::Raport => raport::toggle_card(ctx, id),
            Report::Tutor => tutor::toggle_card(ctx, id),
            Report::Survey => survey::toggle_card(ctx, id),
        }
    }

    fn reset(self, ctx: &AppContext) {
        match self {
            Report::Kurikulum => kurikulum::reset_filters(ctx),
            Report::Anak => laporan_anak::reset_filters(ctx),
            Report::Raport => raport::reset_filters(ctx),
            Report::Tutor => tutor::reset_filters(ctx),
            Report::Survey => survey::reset_filters(ctx),
        }
    }

    pub fn render(self, state: &AppState, json: bool) -> serde_json::Result<String> {
        if json {
            return match self {
                Report::Kurikulum => serde_json::to_string_pretty(&state.kurikulum),
                Report::Anak => serde_json::to_string_pretty(&state.anak),
                Report::Raport => serde_json::to_string_pretty(&state.raport),
                Report::Tutor => serde_json::to_string_pretty(&state.tutor),
                Report::Survey => serde_json::to_string_pretty(&state.survey),
            };
        }
        Ok(match self {
            Report::Kurikulum => render::kurikulum(&state.kurikulum),
            Report::Anak => render::anak(&state.anak),
            Report::Raport => render::raport(&state.raport),
            Report::Tutor => render::tutor(&state.tutor),
            Report::Survey => render::survey(&state.survey),
        })
    }
}

type Done = (TaskKey, Result<(), Rejection>);

struct Session<'a, W> {
    ctx: &'a AppContext,
    report: Report,
    debounce: Duration,
    json: bool,
    tasks: TaskManager<Result<(), Rejection>>,
    out: &'a mut W,
}

impl<W: Write> Session<'_, W> {
    fn spawn_change(&mut self, change: FilterChange, debounce: bool) {
        let ctx = self.ctx.clone();
        let report = self.report;
        let work = async move { report.change(&ctx, change).await };
        if debounce {
            self.tasks.debounce(LIST_TASK, self.debounce, work);
        } else {
            self.tasks.spawn(LIST_TASK, work);
        }
    }

    fn apply(&mut self, command: WatchCommand) -> anyhow::Result<()> {
        match command {
            WatchCommand::Year(year) => self.spawn_change(
                FilterChange {
                    year: Some(year),
                    ..Default::default()
                },
                false,
            ),
            WatchCommand::Search(search) => self.spawn_change(
                FilterChange {
                    search: Some(search),
                    ..Default::default()
                },
                true,
            ),
            WatchCommand::Page(page) => {
                let ctx = self.ctx.clone();
                let report = self.report;
                self.tasks
                    .spawn(LIST_TASK, async move { report.page(&ctx, page).await });
            }
            WatchCommand::Refresh => {
                let ctx = self.ctx.clone();
                let report = self.report;
                self.tasks
                    .spawn(LIST_TASK, async move { report.refresh(&ctx).await });
            }
            WatchCommand::Reset => {
                self.report.reset(self.ctx);
                self.spawn_change(FilterChange::default(), false);
            }
            WatchCommand::Expand(id) => {
                self.report.toggle(self.ctx, id);
                self.print()?;
            }
            WatchCommand::Quit => {}
        }
        Ok(())
    }

    fn finished(&mut self, (key, result): Done) -> anyhow::Result<()> {
        if let Err(e) = result {
            tracing::warn!(task = %key, error = %e, "watch reload failed");
        }
        self.print()
    }

    fn print(&mut self) -> anyhow::Result<()> {
        let text = self.ctx.select(|s| self.report.render(s, self.json))?;
        writeln!(self.out, "{text}")?;
        self.out.flush()?;
        Ok(())
    }
}

/// Drive a watch session from `input` until `quit`, end of input or
/// `shutdown`.
///
/// At end of input the session waits for reloads still running, so piped
/// scripts see their last result.
pub async fn run_with<R, W>(
    ctx: &AppContext,
    args: &WatchArgs,
    json: bool,
    input: R,
    out: &mut W,
    shutdown: CancellationToken,
) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let (done_tx, mut done_rx) = mpsc::unbounded_channel::<Done>();
    let mut session = Session {
        ctx,
        report: args.report,
        debounce: Duration::from_millis(args.debounce_ms),
        json,
        tasks: TaskManager::new(done_tx),
        out,
    };

    let init_ctx = ctx.clone();
    let report = args.report;
    session
        .tasks
        .spawn(INIT_TASK, async move { report.initialize(&init_ctx).await });

    let mut lines = input.lines();
    let mut input_open = true;
    loop {
        tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            line = lines.next_line(), if input_open => match line? {
                None => input_open = false,
                Some(line) if line.trim().is_empty() => {}
                Some(line) => match line.parse::<WatchCommand>() {
                    Ok(WatchCommand::Quit) => break,
                    Ok(command) => session.apply(command)?,
                    Err(e) => eprintln!("{e}"),
                },
            },
            Some(done) = done_rx.recv() => session.finished(done)?,
            _ = tokio::time::sleep(SETTLE_POLL), if !input_open => {}
        }
        session.tasks.prune();
        if !input_open && session.tasks.is_empty() {
            while let Ok(done) = done_rx.try_recv() {
                session.finished(done)?;
            }
            break;
        }
    }

    session.tasks.cancel_all();
    Ok(())
}

pub async fn run(ctx: &AppContext, args: &WatchArgs, json: bool) -> anyhow::Result<()> {
    let shutdown = CancellationToken::new();
    let on_interrupt = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();
    let result = run_with(ctx, args, json, stdin, &mut stdout, shutdown.clone()).await;
    shutdown.cancel();
    result
}
