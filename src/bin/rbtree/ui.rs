//! Text rendering for the `rbtree` reports.

use clap::ValueEnum;
use indicatif::{ProgressBar, ProgressStyle};
use nu_ansi_term::{Color, Style};
use paged_rbtree::admin::{StatsReport, VerifyReport, VerifySeverity};
use paged_rbtree::cli::LoadSummary;
use std::io::IsTerminal;
use std::time::Duration;

const BAR_WIDTH: usize = 24;

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum Theme {
    Auto,
    Light,
    Dark,
    Plain,
}

#[derive(Clone, Copy)]
struct Ink {
    title: Style,
    label: Style,
    ok: Style,
    bad: Style,
    dim: Style,
}

impl Ink {
    fn for_theme(theme: Theme) -> Self {
        let accent = match theme {
            Theme::Light => Color::Blue,
            _ => Color::LightCyan,
        };
        Self {
            title: Style::new().fg(accent).bold(),
            label: Style::new().fg(accent),
            ok: Style::new().fg(Color::Green).bold(),
            bad: Style::new().fg(Color::Red).bold(),
            dim: Style::new().dimmed(),
        }
    }
}

/// Renders reports to stdout and progress to stderr.
///
/// Colour is used only on a terminal; `quiet` drops colour, marks and the
/// spinner but keeps every value.
pub struct Ui {
    ink: Option<Ink>,
    quiet: bool,
}

impl Ui {
    pub fn new(theme: Theme, quiet: bool) -> Self {
        let paint = theme != Theme::Plain && !quiet && std::io::stdout().is_terminal();

        #[cfg(windows)]
        if paint {
            let _ = nu_ansi_term::enable_ansi_support();
        }

        Self {
            ink: paint.then(|| Ink::for_theme(theme)),
            quiet,
        }
    }

    pub fn load_summary(&self, summary: &LoadSummary) {
        self.title("load");
        self.fields(&[
            ("input", summary.input.clone()),
            ("records", summary.records_read.to_string()),
            ("nodes", summary.nodes_inserted.to_string()),
            ("took", format_ms(summary.duration_ms)),
        ]);
        if summary.trailing_bytes_ignored > 0 {
            self.notice(&format!(
                "last line has no newline; {} bytes skipped",
                summary.trailing_bytes_ignored
            ));
        }
        if let Some(path) = &summary.exported_to {
            self.verdict(true, &format!("DOT written to {path}"));
        }
    }

    pub fn verify_report(&self, report: &VerifyReport) {
        let counts = &report.counts;
        self.title(&format!("verify ({:?})", report.level).to_lowercase());
        self.fields(&[
            (
                "nodes",
                format!(
                    "{} ({} red, {} black)",
                    counts.nodes_reachable, counts.red_nodes, counts.black_nodes
                ),
            ),
            ("height", counts.height.to_string()),
            (
                "black height",
                counts
                    .black_height
                    .map_or_else(|| "differs between paths".to_string(), |h| h.to_string()),
            ),
        ]);
        for finding in &report.findings {
            let (mark, pick): (&str, fn(&Ink) -> Style) = match finding.severity {
                VerifySeverity::Info => ("·", |ink| ink.dim),
                VerifySeverity::Error => ("✘", |ink| ink.bad),
            };
            let mark = if self.quiet {
                match finding.severity {
                    VerifySeverity::Info => "info:",
                    VerifySeverity::Error => "error:",
                }
            } else {
                mark
            };
            println!("  {} {}", self.paint(pick, mark), finding.message);
        }
        if report.success {
            self.verdict(true, "all invariants hold");
        } else {
            self.verdict(
                false,
                &format!("{} invariant violations", report.errors().count()),
            );
        }
    }

    pub fn stats_report(&self, report: &StatsReport) {
        let tree = &report.tree;
        let key = |k: Option<u64>| k.map_or_else(|| "-".to_string(), |k| format!("{k:#018x}"));
        self.title("tree");
        self.fields(&[
            ("nodes", tree.len.to_string()),
            (
                "height",
                format!("{} (black height {})", tree.height, tree.black_height),
            ),
            ("red nodes", tree.red_nodes.to_string()),
            ("duplicates", tree.duplicate_keys.to_string()),
            ("root key", key(tree.root_key)),
            ("key range", format!("{} ..= {}", key(tree.min_key), key(tree.max_key))),
        ]);

        let storage = &report.storage;
        self.title("storage");
        self.fields(&[
            (
                "rows",
                format!(
                    "{} of {} table entries, {} slots each",
                    storage.rows, storage.row_table_capacity, storage.row_width
                ),
            ),
            (
                "slots",
                format!(
                    "{} / {} {} {:.1}%",
                    storage.slots,
                    storage.capacity,
                    occupancy_bar(storage.slots, storage.capacity, BAR_WIDTH),
                    storage.utilization * 100.0
                ),
            ),
        ]);
    }

    /// Spinner counting records while a load runs. Drawn only on a
    /// terminal and never when quiet.
    pub fn load_progress(&self) -> LoadProgress {
        let bar = (!self.quiet && std::io::stderr().is_terminal()).then(|| {
            let bar = ProgressBar::new_spinner();
            if let Ok(style) =
                ProgressStyle::with_template("{spinner} loading records: {pos} read ({elapsed})")
            {
                bar.set_style(style);
            }
            bar.enable_steady_tick(Duration::from_millis(100));
            bar
        });
        LoadProgress { bar }
    }

    fn title(&self, text: &str) {
        println!("{}", self.paint(|ink| ink.title, text));
    }

    fn fields(&self, rows: &[(&str, String)]) {
        let width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
        for (label, value) in rows {
            let label = format!("{label:<width$}");
            println!("  {}  {value}", self.paint(|ink| ink.label, label));
        }
    }

    fn verdict(&self, ok: bool, message: &str) {
        if self.quiet {
            println!("{message}");
            return;
        }
        let mark = if ok {
            self.paint(|ink| ink.ok, "✔")
        } else {
            self.paint(|ink| ink.bad, "✘")
        };
        println!("{mark} {message}");
    }

    fn notice(&self, message: &str) {
        eprintln!("{} {message}", self.paint(|ink| ink.bad, "note:"));
    }

    fn paint(&self, pick: fn(&Ink) -> Style, text: impl Into<String>) -> String {
        let text = text.into();
        match &self.ink {
            Some(ink) => pick(ink).paint(text).to_string(),
            None => text,
        }
    }
}

pub struct LoadProgress {
    bar: Option<ProgressBar>,
}

impl LoadProgress {
    pub fn records(&self, read: u64) {
        if let Some(bar) = &self.bar {
            bar.set_position(read);
        }
    }

    pub fn done(mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}

impl Drop for LoadProgress {
    fn drop(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.abandon_with_message("load aborted");
        }
    }
}

/// `[####....]` with `width` cells filled in proportion to `used / total`.
pub fn occupancy_bar(used: usize, total: usize, width: usize) -> String {
    let filled = if total == 0 {
        0
    } else {
        (used.min(total) * width).div_ceil(total)
    };
    format!("[{}{}]", "#".repeat(filled), ".".repeat(width - filled))
}

pub fn format_ms(ms: f64) -> String {
    if ms >= 1_000.0 {
        format!("{:.2}s", ms / 1_000.0)
    } else {
        format!("{ms:.1}ms")
    }
}
