use std::io::{IsTerminal, Write};

use clap::{Args, Parser, Subcommand, ValueEnum};

use plp_tasks::config::AppConfig;
use plp_tasks::core::task::TaskFilter;
use plp_tasks::core::task_list::TaskList;
use plp_tasks::remote::{FetchStatus, PostListing, PostsClient};
use plp_tasks::store::FileStore;
use plp_tasks::view::{self, Palette};

const RETRY_HINT: &str = "Run `plp-tasks posts` again to retry.";

#[derive(Parser, Debug)]
#[command(name = "plp-tasks")]
#[command(about = "Task list with a searchable remote post listing")]
struct Cli {
    /// Log at debug level
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
enum Commands {
    /// Add a task
    Add {
        #[arg(required = true)]
        text: Vec<String>,
    },
    /// Mark a task done / not done
    #[command(alias = "done")]
    Toggle { id: u64 },
    /// Remove a task
    #[command(alias = "rm")]
    Delete { id: u64 },
    /// Remove all completed tasks
    Clear,
    /// Show tasks
    #[command(alias = "ls")]
    List {
        #[arg(value_enum, default_value_t = FilterArg::All)]
        filter: FilterArg,
    },
    /// Show task counts
    Stats,
    /// Browse remote blog posts
    Posts(PostsArgs),
    /// Toggle dark mode
    Theme,
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
struct PostsArgs {
    /// Only show posts whose title or body contains this text
    #[arg(short, long)]
    search: Option<String>,

    /// Page to show, starting at 1
    #[arg(short, long, default_value_t = 1, value_parser = parse_page)]
    page: usize,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum FilterArg {
    All,
    Active,
    Completed,
}

impl From<FilterArg> for TaskFilter {
    fn from(arg: FilterArg) -> Self {
        match arg {
            FilterArg::All => TaskFilter::All,
            FilterArg::Active => TaskFilter::Active,
            FilterArg::Completed => TaskFilter::Completed,
        }
    }
}

fn parse_page(s: &str) -> Result<usize, String> {
    let page: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a page number", s))?;
    if page == 0 {
        return Err("pages start at 1".to_string());
    }
    Ok(page)
}

/// Send logs to the systemd user journal (`journalctl --user -t plp-tasks -f`).
/// Crate targets log at info (debug when enabled), everything else at warn.
fn init_logging(debug: bool) {
    struct FilteredJournal {
        inner: systemd_journal_logger::JournalLog,
    }

    impl log::Log for FilteredJournal {
        fn enabled(&self, metadata: &log::Metadata) -> bool {
            if metadata.target().starts_with("plp_tasks") {
                let max = if plp_tasks::debug_logging() {
                    log::LevelFilter::Debug
                } else {
                    log::LevelFilter::Info
                };
                metadata.level() <= max
            } else {
                metadata.level() <= log::LevelFilter::Warn
            }
        }
        fn log(&self, record: &log::Record) {
            if self.enabled(record.metadata()) {
                self.inner.log(record);
            }
        }
        fn flush(&self) {
            self.inner.flush();
        }
    }

    plp_tasks::set_debug_logging(debug);

    let journal = match systemd_journal_logger::JournalLog::new() {
        Ok(journal) => journal.with_syslog_identifier("plp-tasks".to_string()),
        // No journald (containers, macOS): run without a logger.
        Err(_) => return,
    };

    if log::set_boxed_logger(Box::new(FilteredJournal { inner: journal })).is_ok() {
        // Global max must be Debug so crate debug logs can pass through when enabled
        log::set_max_level(log::LevelFilter::Debug);
    }
}

fn run_tasks(
    command: Commands,
    config: &AppConfig,
    palette: &Palette,
) -> Result<(), Box<dyn std::error::Error>> {
    config.ensure_dirs()?;
    let mut list = TaskList::load(FileStore::new(config.tasks_path()));

    let filter = match command {
        Commands::Add { text } => {
            match list.add(&text.join(" ")) {
                Some(task) => println!("Added {}", view::render_task(&task, palette)),
                None => println!("Nothing to add: task text is empty"),
            }
            TaskFilter::All
        }
        Commands::Toggle { id } => {
            list.toggle(id);
            if list.get(id).is_none() {
                println!("No task with id {}", id);
            }
            TaskFilter::All
        }
        Commands::Delete { id } => {
            list.delete(id);
            TaskFilter::All
        }
        Commands::Clear => {
            list.clear_completed();
            TaskFilter::All
        }
        Commands::List { filter } => filter.into(),
        Commands::Stats => {
            let stats = list.stats();
            if stats.total == 0 {
                println!("No tasks yet");
            } else {
                println!("{}", view::render_stats(&stats, palette));
            }
            return Ok(());
        }
        Commands::Posts(_) | Commands::Theme => return Ok(()),
    };

    print!(
        "{}",
        view::render_tasks(&list.filter(filter), filter, &list.stats(), palette)
    );
    Ok(())
}

/// Show the loading line on `status` while the fetch is outstanding, then the
/// listing (or the error) on `out`. Returns false when the fetch failed.
async fn run_posts(
    args: &PostsArgs,
    config: &AppConfig,
    palette: &Palette,
    out: &mut impl Write,
    status: &mut impl Write,
) -> Result<bool, Box<dyn std::error::Error>> {
    let client = PostsClient::new(&config.posts_url)?;
    let mut listing = PostListing::new(config.posts_per_page);

    listing.begin_fetch();
    write!(status, "{}", view::render_listing(&listing, RETRY_HINT, palette))?;
    status.flush()?;
    let result = client.fetch_all().await;
    listing.finish_fetch(result);

    if matches!(listing.status(), FetchStatus::Failed(_)) {
        write!(out, "{}", view::render_listing(&listing, RETRY_HINT, palette))?;
        return Ok(false);
    }

    if let Some(term) = &args.search {
        listing.set_search(term.clone());
    }
    if args.page > 1 && !listing.go_to_page(args.page) {
        match listing.total_pages() {
            0 => writeln!(status, "No page {}: no posts match", args.page)?,
            total => writeln!(
                status,
                "Page {} is out of range (1-{}), showing page 1",
                args.page, total
            )?,
        }
    }

    write!(out, "{}", view::render_listing(&listing, RETRY_HINT, palette))?;
    Ok(true)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config_path = AppConfig::default_path();
    let (mut config, config_problem) = AppConfig::load_or_default(&config_path);
    init_logging(cli.debug || config.debug_logging);
    if let Some(e) = config_problem {
        log::warn!("Ignoring config at {}: {}", config_path.display(), e);
    }

    let command = cli.command.unwrap_or(Commands::List {
        filter: FilterArg::All,
    });
    log::debug!("Running {:?}", command);

    let palette = Palette::for_output(config.dark_mode, std::io::stdout().is_terminal());
    match command {
        Commands::Theme => {
            config.dark_mode = !config.dark_mode;
            config.save(&config_path)?;
            println!("Dark mode {}", if config.dark_mode { "on" } else { "off" });
        }
        Commands::Posts(args) => {
            let ok = run_posts(
                &args,
                &config,
                &palette,
                &mut std::io::stdout(),
                &mut std::io::stderr(),
            )
            .await?;
            if !ok {
                std::process::exit(1);
            }
        }
        other => run_tasks(other, &config, &palette)?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("plp-tasks").chain(args.iter().copied()))
    }

    fn command(args: &[&str]) -> Option<Commands> {
        parse(args).unwrap().command
    }

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_args_means_default_listing() {
        let cli = parse(&[]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.debug);
    }

    #[test]
    fn add_keeps_all_words() {
        assert_eq!(
            command(&["add", "Buy", "milk"]),
            Some(Commands::Add {
                text: vec!["Buy".into(), "milk".into()]
            })
        );
        assert!(parse(&["add"]).is_err());
    }

    #[test]
    fn ids_must_be_numbers() {
        assert_eq!(command(&["toggle", "17"]), Some(Commands::Toggle { id: 17 }));
        assert_eq!(command(&["rm", "3"]), Some(Commands::Delete { id: 3 }));
        assert!(parse(&["delete", "abc"]).is_err());
        assert!(parse(&["delete"]).is_err());
    }

    #[test]
    fn list_filters() {
        assert_eq!(
            command(&["list", "completed"]),
            Some(Commands::List {
                filter: FilterArg::Completed
            })
        );
        assert_eq!(
            command(&["ls"]),
            Some(Commands::List {
                filter: FilterArg::All
            })
        );
        assert_eq!(TaskFilter::from(FilterArg::Active), TaskFilter::Active);
        assert!(parse(&["list", "later"]).is_err());
    }

    #[test]
    fn posts_options() {
        assert_eq!(
            command(&["posts", "--search", "qui", "--page", "2"]),
            Some(Commands::Posts(PostsArgs {
                search: Some("qui".into()),
                page: 2
            }))
        );
        assert_eq!(
            command(&["posts"]),
            Some(Commands::Posts(PostsArgs {
                search: None,
                page: 1
            }))
        );
        assert!(parse(&["posts", "--page", "two"]).is_err());
        assert!(parse(&["posts", "--page", "0"]).is_err());
        assert!(parse(&["posts", "--search"]).is_err());
    }

    #[test]
    fn debug_flag_is_global() {
        assert!(parse(&["stats", "--debug"]).unwrap().debug);
        assert!(parse(&["--debug", "stats"]).unwrap().debug);
    }

    #[test]
    fn unknown_command() {
        assert!(parse(&["frobnicate"]).is_err());
    }

    fn config_for(url: &str) -> AppConfig {
        AppConfig {
            posts_url: url.to_string(),
            ..AppConfig::default()
        }
    }

    fn posts_args(page: usize) -> PostsArgs {
        PostsArgs { search: None, page }
    }

    async fn serve_posts(n: u64) -> MockServer {
        let server = MockServer::start().await;
        let posts: Vec<serde_json::Value> = (1..=n)
            .map(|i| serde_json::json!({"userId": 1, "id": i, "title": "t", "body": "b"}))
            .collect();
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(posts))
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn posts_show_loading_then_listing() {
        let server = serve_posts(8).await;
        let (mut out, mut status) = (Vec::new(), Vec::new());

        let ok = run_posts(
            &posts_args(2),
            &config_for(&server.uri()),
            &Palette::plain(),
            &mut out,
            &mut status,
        )
        .await
        .unwrap();

        assert!(ok);
        let status = String::from_utf8(status).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(status.starts_with("Loading posts..."));
        assert!(!out.contains("Loading"));
        assert!(out.contains("Showing 2 of 8 posts"));
    }

    #[tokio::test]
    async fn failed_fetch_skips_page_check() {
        let (mut out, mut status) = (Vec::new(), Vec::new());

        // Nothing listens on port 1.
        let ok = run_posts(
            &posts_args(3),
            &config_for("http://127.0.0.1:1/posts"),
            &Palette::plain(),
            &mut out,
            &mut status,
        )
        .await
        .unwrap();

        assert!(!ok);
        let status = String::from_utf8(status).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(status.starts_with("Loading posts..."));
        assert!(!status.contains("out of range"));
        assert!(out.starts_with("Error: Failed to fetch posts"));
        assert!(out.contains(RETRY_HINT));
    }

    #[tokio::test]
    async fn page_past_the_end_falls_back_to_first() {
        let server = serve_posts(8).await;
        let (mut out, mut status) = (Vec::new(), Vec::new());

        run_posts(
            &posts_args(5),
            &config_for(&server.uri()),
            &Palette::plain(),
            &mut out,
            &mut status,
        )
        .await
        .unwrap();

        let status = String::from_utf8(status).unwrap();
        assert!(status.contains("Page 5 is out of range (1-2)"));
        assert!(String::from_utf8(out).unwrap().contains("Showing 6 of 8 posts"));
    }
}
