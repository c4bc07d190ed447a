//! Command line surface. Without a subcommand the TUI starts; each subcommand
//! performs a single call against the API and prints the result.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use crate::api::TeacherClient;
use crate::config::Settings;
use crate::export::save_export;
use crate::models::{ExportFormat, Teacher, TeacherStatistics};

#[derive(Parser, Debug)]
#[command(name = "teacher-desk", version, about = "Manage teacher records over the teachers API")]
pub struct Cli {
    /// Scheme, host and port of the API, e.g. http://localhost:8000.
    #[arg(long)]
    pub base_url: Option<String>,
    /// Alternate configuration file.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Directory exports are written to.
    #[arg(long)]
    pub export_dir: Option<PathBuf>,
    /// Screen to open first, e.g. /teachers or /edit-teacher/3.
    #[arg(long, default_value = "/")]
    pub route: String,
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// Fold command line overrides into `settings`.
    pub fn apply_overrides(&self, settings: &mut Settings) {
        if let Some(url) = &self.base_url {
            settings.base_url = url.clone();
        }
        if let Some(dir) = &self.export_dir {
            settings.export_dir = dir.clone();
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print every teacher.
    List,
    /// Print the total teacher count and the average class load.
    Stats,
    /// Print teachers whose name contains QUERY.
    Search { query: String },
    /// Print teachers aged MIN to MAX inclusive.
    Ages {
        #[arg(long)]
        min: u32,
        #[arg(long)]
        max: u32,
    },
    /// Print teachers teaching MIN to MAX classes inclusive.
    Classes {
        #[arg(long)]
        min: u32,
        #[arg(long)]
        max: u32,
    },
    /// Download a server-generated export.
    Export {
        #[arg(value_enum)]
        format: FormatArg,
        /// Target directory; defaults to the configured export directory.
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatArg {
    Pdf,
    Excel,
}

impl From<FormatArg> for ExportFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Pdf => ExportFormat::Pdf,
            FormatArg::Excel => ExportFormat::Excel,
        }
    }
}

/// Run one subcommand and print its outcome to `out`.
pub async fn run_command(
    client: &TeacherClient,
    command: Command,
    export_dir: &Path,
    out: &mut impl Write,
) -> Result<()> {
    match command {
        Command::List => {
            let teachers = client.list_all().await.context("failed to list teachers")?;
            write!(out, "{}", format_teachers(&teachers))?;
        }
        Command::Stats => {
            let stats = client
                .statistics()
                .await
                .context("failed to load statistics")?;
            write!(out, "{}", format_statistics(&stats))?;
        }
        Command::Search { query } => {
            let teachers = client
                .search(&query)
                .await
                .context("failed to search teachers")?;
            writeln!(out, "Found {} teachers", teachers.len())?;
            write!(out, "{}", format_teachers(&teachers))?;
        }
        Command::Ages { min, max } => {
            let teachers = client
                .filter_by_age(min, max)
                .await
                .context("failed to filter teachers by age")?;
            write!(out, "{}", format_teachers(&teachers))?;
        }
        Command::Classes { min, max } => {
            let teachers = client
                .filter_by_classes(min, max)
                .await
                .context("failed to filter teachers by classes")?;
            write!(out, "{}", format_teachers(&teachers))?;
        }
        Command::Export { format, out: dir } => {
            let format = ExportFormat::from(format);
            let bytes = client
                .export(format)
                .await
                .with_context(|| format!("failed to export to {}", format.label()))?;
            let path = save_export(dir.as_deref().unwrap_or(export_dir), format, &bytes)?;
            writeln!(out, "{} exported to {}", format.label(), path.display())?;
        }
    }
    Ok(())
}

/// Aligned plain-text table of teachers.
pub fn format_teachers(teachers: &[Teacher]) -> String {
    if teachers.is_empty() {
        return "No teachers.\n".to_string();
    }
    let name_width = teachers
        .iter()
        .map(|teacher| teacher.full_name.chars().count())
        .max()
        .unwrap_or(0)
        .max("Full Name".len());

    let mut table = format!(
        "{:>5}  {:<name_width$}  {:>3}  {:<10}  {:>7}\n",
        "ID", "Full Name", "Age", "Born", "Classes"
    );
    for teacher in teachers {
        let id = teacher.id.map(|id| id.to_string()).unwrap_or_default();
        let age = teacher.age.map(|age| age.to_string()).unwrap_or_default();
        table.push_str(&format!(
            "{:>5}  {:<name_width$}  {:>3}  {:<10}  {:>7}\n",
            id, teacher.full_name, age, teacher.date_of_birth, teacher.number_of_classes
        ));
    }
    table
}

pub fn format_statistics(stats: &TeacherStatistics) -> String {
    format!(
        "Total teachers:  {}\nAverage classes: {:.2}\n",
        stats.total_teachers, stats.average_classes
    )
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn parses_subcommands() {
        let cli = Cli::try_parse_from(["teacher-desk", "ages", "--min", "30", "--max", "40"]).unwrap();
        assert!(matches!(cli.command, Some(Command::Ages { min: 30, max: 40 })));
        assert_eq!(cli.route, "/");

        let cli = Cli::try_parse_from(["teacher-desk", "export", "excel", "--out", "/tmp/x"]).unwrap();
        match cli.command {
            Some(Command::Export { format, out }) => {
                assert_eq!(ExportFormat::from(format), ExportFormat::Excel);
                assert_eq!(out, Some(PathBuf::from("/tmp/x")));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn overrides_replace_settings() {
        let cli = Cli::try_parse_from([
            "teacher-desk",
            "--base-url",
            "http://api.test:9000",
            "--route",
            "/teachers",
        ])
        .unwrap();
        let mut settings = Settings::default();
        let export_dir = settings.export_dir.clone();
        cli.apply_overrides(&mut settings);
        assert_eq!(settings.base_url, "http://api.test:9000");
        assert_eq!(settings.export_dir, export_dir);
        assert!(cli.command.is_none());
    }

    #[test]
    fn teacher_table_aligns_columns() {
        let mut teacher = Teacher::new(
            "Jane Doe",
            NaiveDate::from_ymd_opt(1980, 5, 1).unwrap(),
            5,
        );
        teacher.id = Some(3);
        teacher.age = Some(45);

        let table = format_teachers(&[teacher]);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "   ID  Full Name  Age  Born        Classes");
        assert_eq!(lines[1], "    3  Jane Doe    45  1980-05-01        5");
        assert_eq!(format_teachers(&[]), "No teachers.\n");
    }

    #[test]
    fn statistics_use_two_decimals() {
        let stats = TeacherStatistics {
            total_teachers: 3,
            average_classes: 4.0 / 3.0,
        };
        assert_eq!(
            format_statistics(&stats),
            "Total teachers:  3\nAverage classes: 1.33\n"
        );
    }
}
