//! Output rendering for CLI commands

use comfy_table::{presets, Attribute, Cell, Color, ContentArrangement, Table};
use std::io;
use tsdist_ops::{
    DistReport, OperationResult, StepOutcome, StepReport, TypeDefinition, TypingsReport,
};
use tsdist_types::OutputFormat;

/// Output renderer for CLI results
#[derive(Clone)]
pub struct OutputRenderer {
    format: OutputFormat,
    colors_enabled: bool,
}

impl OutputRenderer {
    /// Create new output renderer
    pub fn new(format: OutputFormat, colors_enabled: bool) -> Self {
        Self {
            format,
            colors_enabled,
        }
    }

    /// Render operation result
    pub fn render_result(&self, result: &OperationResult) -> io::Result<()> {
        if self.format == OutputFormat::Json {
            let json = result
                .to_json()
                .map_err(|e| io::Error::other(e.to_string()))?;
            println!("{json}");
            return Ok(());
        }

        match result {
            OperationResult::TypingsReport(report) => self.render_typings(report),
            OperationResult::DistReport(report) => self.render_dist(report),
            OperationResult::Definitions(definitions) => self.render_definitions(definitions),
        }
        Ok(())
    }

    fn render_typings(&self, report: &TypingsReport) {
        if report.steps.is_empty() {
            println!("No type definitions configured.");
            return;
        }
        self.print_steps(&report.steps);
        println!(
            "{} of {} definitions installed in {}",
            report.steps.len() - report.failed_steps(),
            report.steps.len(),
            format_duration(report.duration_ms)
        );
    }

    fn render_dist(&self, report: &DistReport) {
        let mut steps: Vec<StepReport> = report
            .typings
            .as_ref()
            .map(|t| t.steps.clone())
            .unwrap_or_default();
        steps.push(report.compile.clone());
        self.print_steps(&steps);

        let cleared = if report.removed_output {
            "cleared"
        } else {
            "was not present"
        };
        println!("Output {} {cleared}", report.output_dir.display());
        let verdict = if report.success() {
            "Build finished"
        } else {
            "Build finished with failures"
        };
        println!("{verdict} in {}", format_duration(report.duration_ms));
    }

    fn render_definitions(&self, definitions: &[TypeDefinition]) {
        if definitions.is_empty() {
            println!("No type definitions configured.");
            return;
        }

        let mut table = self.table();
        table.set_header(vec![
            self.header("Name"),
            self.header("Source"),
            self.header("Global"),
        ]);
        for definition in definitions {
            table.add_row(vec![
                Cell::new(&definition.name),
                Cell::new(&definition.source),
                Cell::new(if definition.global { "yes" } else { "no" }),
            ]);
        }
        println!("{table}");
    }

    fn print_steps(&self, steps: &[StepReport]) {
        let mut table = self.table();
        table.set_header(vec![
            self.header("Step"),
            self.header("Command"),
            self.header("Status"),
            self.header("Time"),
        ]);

        for step in steps {
            let mut status = Cell::new(status_label(step.outcome));
            if self.colors_enabled {
                status = status.fg(status_color(step.outcome));
            }
            table.add_row(vec![
                Cell::new(&step.step),
                Cell::new(step.command_line()),
                status,
                Cell::new(format_duration(step.duration_ms)),
            ]);
        }
        println!("{table}");
    }

    fn table(&self) -> Table {
        let mut table = Table::new();
        let preset = match self.format {
            OutputFormat::Plain => presets::NOTHING,
            _ => presets::UTF8_FULL,
        };
        table
            .load_preset(preset)
            .set_content_arrangement(ContentArrangement::Dynamic);
        table
    }

    fn header(&self, text: &str) -> Cell {
        if self.colors_enabled {
            Cell::new(text).add_attribute(Attribute::Bold)
        } else {
            Cell::new(text)
        }
    }
}

fn status_label(outcome: StepOutcome) -> String {
    match outcome {
        StepOutcome::Succeeded => "ok".to_string(),
        StepOutcome::Failed {
            exit_code: Some(code),
        } => format!("failed ({code})"),
        StepOutcome::Failed { exit_code: None } => "failed (signal)".to_string(),
        StepOutcome::Skipped => "skipped".to_string(),
    }
}

fn status_color(outcome: StepOutcome) -> Color {
    match outcome {
        StepOutcome::Succeeded => Color::Green,
        StepOutcome::Failed { .. } => Color::Red,
        StepOutcome::Skipped => Color::Yellow,
    }
}

fn format_duration(ms: u64) -> String {
    if ms < 1000 {
        format!("{ms}ms")
    } else {
        format!("{:.1}s", ms as f64 / 1000.0)
    }
}
