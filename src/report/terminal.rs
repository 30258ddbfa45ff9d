use crate::pipeline::RunReport;
use crate::removal::RemovalOutcome;
use colored::Colorize;
use miette::Result;

/// Terminal reporter with colored output
pub struct TerminalReporter {
    /// Show the classification partition, imported names and parse failures
    verbose: bool,
}

impl TerminalReporter {
    pub fn new() -> Self {
        Self { verbose: false }
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn report(&self, run: &RunReport) -> Result<()> {
        if run.skipped {
            println!(
                "{}",
                "No scan directories configured, skipping application scan.".yellow()
            );
            return Ok(());
        }

        if self.verbose {
            self.print_scan_details(run);
            self.print_partition(run);
        }

        let unused = run.unused();
        if unused.is_empty() {
            println!("{}", "No unused packages found.".green().bold());
            self.print_summary(run);
            return Ok(());
        }

        println!();
        println!(
            "{}",
            format!("Found {} potentially unused packages:", unused.len())
                .yellow()
                .bold()
        );
        for name in &unused {
            println!("  - {}", name);
        }
        println!();

        for refused in &run.refused {
            println!("  {} {}", "✗".red(), refused.reason.red());
        }

        self.print_removals(run);
        self.print_summary(run);

        Ok(())
    }

    fn print_scan_details(&self, run: &RunReport) {
        println!(
            "{} {} files scanned, {} parse failures",
            "Scan:".cyan().bold(),
            run.files_scanned,
            run.parse_failures.len()
        );

        for failure in &run.parse_failures {
            println!(
                "  {} Error parsing {}: {}",
                "!".yellow(),
                failure.path.display(),
                failure.message.dimmed()
            );
        }

        if !run.usage.used_namespaces.is_empty() {
            println!("{}", "Detected namespaces:".cyan().bold());
            for name in &run.usage.used_namespaces {
                println!("  {}", name.dimmed());
            }
        }
        println!();
    }

    fn print_partition(&self, run: &RunReport) {
        let classes = &run.classifications;

        println!("{}", "Used packages:".cyan().bold());
        for name in classes.used() {
            let evidence = classes
                .get(name)
                .and_then(|v| v.matched.as_deref())
                .unwrap_or("");
            println!("  {} {}", name.green(), format!("({})", evidence).dimmed());
        }

        let excluded = classes.excluded();
        if !excluded.is_empty() {
            println!("{}", "Excluded packages:".cyan().bold());
            for name in excluded {
                println!("  {}", name.blue());
            }
        }

        let protected = classes.protected_by_dependency();
        if !protected.is_empty() {
            println!("{}", "Kept as dependencies:".cyan().bold());
            for name in protected {
                let by = classes
                    .get(name)
                    .and_then(|v| v.protected_by.as_deref())
                    .unwrap_or("?");
                println!(
                    "  {} {}",
                    name.white(),
                    format!("(required through {})", by).dimmed()
                );
            }
        }

        if !classes.classmap_only.is_empty() {
            println!(
                "{}",
                "Note: these packages autoload only through classmap and are never matched by name:"
                    .yellow()
            );
            for name in &classes.classmap_only {
                println!("  {}", name);
            }
        }
        println!();
    }

    fn print_removals(&self, run: &RunReport) {
        for removal in &run.removal.packages {
            match &removal.outcome {
                RemovalOutcome::WouldRemove => {
                    println!(
                        "{} Would remove unused package: {}",
                        "[DRY RUN]".yellow().bold(),
                        removal.name
                    );
                }
                RemovalOutcome::Removed => {
                    println!(
                        "{} Removed unused package: {}",
                        "✓".green(),
                        removal.name
                    );
                }
                RemovalOutcome::Declined => {
                    println!("{} Skipped {}", "→".dimmed(), removal.name);
                }
                RemovalOutcome::Absent => {
                    if self.verbose {
                        println!(
                            "{} {} is not installed at {}",
                            "→".dimmed(),
                            removal.name,
                            removal.path.display()
                        );
                    }
                }
                RemovalOutcome::Failed { message, partial } => {
                    let state = if *partial { " (partially removed)" } else { "" };
                    println!(
                        "{} Failed to remove {}{}: {}",
                        "✗".red(),
                        removal.name.red(),
                        state,
                        message
                    );
                }
            }
        }
    }

    fn print_summary(&self, run: &RunReport) {
        let removal = &run.removal;

        println!("{}", "─".repeat(60).dimmed());

        let mut parts = vec![
            format!("{} packages installed", run.installed_packages),
            format!("{} unused", run.unused().len()),
        ];
        if run.dry_run {
            parts.push(format!("{} would be removed", removal.would_remove().len()).yellow().to_string());
        } else {
            parts.push(format!("{} removed", removal.removed().len()).green().to_string());
        }
        let failed = removal.failed().len();
        if failed > 0 {
            parts.push(format!("{} failed", failed).red().to_string());
        }
        println!("Summary: {}", parts.join(", "));

        if run.dry_run && !removal.would_remove().is_empty() {
            println!(
                "{}",
                "Dry run: nothing was deleted. Re-run with --force to remove these packages.".dimmed()
            );
        }
    }
}

impl Default for TerminalReporter {
    fn default() -> Self {
        Self::new()
    }
}
