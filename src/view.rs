//! Plain-text rendering of the task list and the posts page.
//!
//! Every function returns a `String` so the binary decides where it goes.

use crate::core::post::Post;
use crate::core::task::{Task, TaskFilter, TaskStats};
use crate::remote::listing::{FetchStatus, PostListing};

/// ANSI colours for the light or dark theme. `plain()` disables colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub heading: &'static str,
    pub accent: &'static str,
    pub muted: &'static str,
    pub done: &'static str,
    pub error: &'static str,
    pub reset: &'static str,
}

impl Palette {
    pub fn light() -> Self {
        Self {
            heading: "\x1b[1;30m",
            accent: "\x1b[34m",
            muted: "\x1b[90m",
            done: "\x1b[32m",
            error: "\x1b[31m",
            reset: "\x1b[0m",
        }
    }

    pub fn dark() -> Self {
        Self {
            heading: "\x1b[1;97m",
            accent: "\x1b[94m",
            muted: "\x1b[37m",
            done: "\x1b[92m",
            error: "\x1b[91m",
            reset: "\x1b[0m",
        }
    }

    pub fn plain() -> Self {
        Self {
            heading: "",
            accent: "",
            muted: "",
            done: "",
            error: "",
            reset: "",
        }
    }

    pub fn for_mode(dark_mode: bool) -> Self {
        if dark_mode {
            Self::dark()
        } else {
            Self::light()
        }
    }

    /// Colours only when writing to a terminal.
    pub fn for_output(dark_mode: bool, terminal: bool) -> Self {
        if terminal {
            Self::for_mode(dark_mode)
        } else {
            Self::plain()
        }
    }
}

pub fn render_task(task: &Task, p: &Palette) -> String {
    if task.completed {
        format!("{}[x] {}  {}{}", p.muted, task.id, task.text, p.reset)
    } else {
        format!("[ ] {}{}{}  {}", p.accent, task.id, p.reset, task.text)
    }
}

/// The filter bar, task rows (or an empty-state message) and the stats footer.
pub fn render_tasks(
    tasks: &[Task],
    filter: TaskFilter,
    stats: &TaskStats,
    p: &Palette,
) -> String {
    let mut out = String::new();

    let bar: Vec<String> = TaskFilter::ALL
        .iter()
        .map(|f| {
            if *f == filter {
                format!("{}[{}]{}", p.heading, f.as_label(), p.reset)
            } else {
                format!(" {} ", f.as_label())
            }
        })
        .collect();
    out.push_str(&bar.join(" "));
    out.push('\n');

    if tasks.is_empty() {
        let (headline, hint) = match filter {
            TaskFilter::All => (
                "No tasks yet".to_string(),
                "Add a task to get started!".to_string(),
            ),
            other => (
                format!("No {} tasks", other.as_label().to_lowercase()),
                "Try switching to a different filter.".to_string(),
            ),
        };
        out.push_str(&format!("\n  {}\n  {}{}{}\n", headline, p.muted, hint, p.reset));
    } else {
        for task in tasks {
            out.push_str("  ");
            out.push_str(&render_task(task, p));
            out.push('\n');
        }
    }

    let footer = render_stats(stats, p);
    if !footer.is_empty() {
        out.push('\n');
        out.push_str(&footer);
        out.push('\n');
    }
    out
}

/// Totals line, empty when there are no tasks at all.
pub fn render_stats(stats: &TaskStats, p: &Palette) -> String {
    if stats.total == 0 {
        return String::new();
    }
    let mut line = format!(
        "{} total  {}{}{} active  {}{}{} completed",
        stats.total, p.accent, stats.active, p.reset, p.done, stats.completed, p.reset
    );
    if stats.completed > 0 {
        line.push_str(&format!(
            "  {}(clear to remove {} completed){}",
            p.muted, stats.completed, p.reset
        ));
    }
    line
}

pub fn render_post(post: &Post, p: &Palette) -> String {
    format!(
        "{}{}{}\n{}{}{}\n{}",
        p.heading,
        post.title,
        p.reset,
        p.muted,
        post.byline(),
        p.reset,
        post.body
    )
}

/// Previous / numbered pages / Next. Empty when everything fits on one page.
pub fn render_pager(current: usize, total: usize, p: &Palette) -> String {
    if total <= 1 {
        return String::new();
    }
    let mut parts = Vec::with_capacity(total + 2);
    parts.push(if current > 1 {
        "< Previous".to_string()
    } else {
        format!("{}< Previous{}", p.muted, p.reset)
    });
    for page in 1..=total {
        if page == current {
            parts.push(format!("{}[{}]{}", p.accent, page, p.reset));
        } else {
            parts.push(page.to_string());
        }
    }
    parts.push(if current < total {
        "Next >".to_string()
    } else {
        format!("{}Next >{}", p.muted, p.reset)
    });
    parts.join(" ")
}

pub fn render_listing(listing: &PostListing, retry_hint: &str, p: &Palette) -> String {
    match listing.status() {
        FetchStatus::Loading => format!("{}Loading posts...{}\n", p.muted, p.reset),
        FetchStatus::Failed(msg) => format!(
            "{}Error: {}{}\n{}\n",
            p.error, msg, p.reset, retry_hint
        ),
        FetchStatus::Ready => {
            let mut out = String::new();
            if !listing.search_term().is_empty() {
                out.push_str(&format!("Search: \"{}\"\n", listing.search_term()));
            }
            out.push_str(&listing.summary());
            out.push('\n');
            for post in listing.visible() {
                out.push('\n');
                out.push_str(&render_post(&post, p));
                out.push('\n');
            }
            let pager = render_pager(listing.current_page(), listing.total_pages(), p);
            if !pager.is_empty() {
                out.push('\n');
                out.push_str(&pager);
                out.push('\n');
            }
            out
        }
    }
}
