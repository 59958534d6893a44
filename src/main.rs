use anyhow::Result;
use fdc_to_sqlite::{
    cli::Cli,
    logging::{self, init_tracing},
    schema::MANIFEST_FILE,
    ui::{ConsoleUi, Ui, UiApp},
    verify::{verify_database, VerificationReport},
    writer::import_directory,
};
use std::time::Instant;
use tracing::{error, info};

fn main() {
    let cli = Cli::parse_args();
    init_tracing(cli.verbose);

    if let Err(err) = run(&cli) {
        error!(error = %err, "import failed");
        for cause in err.chain().skip(1) {
            error!(cause = %cause, "caused by");
        }
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let (summary, report) = if cli.tui {
        // Dropped after the terminal is restored, before main reports errors
        let _quiet = logging::quiet();
        let mut ui = UiApp::new()?;
        match execute(cli, &mut ui) {
            Ok((summary, report)) => {
                ui.finish(&summary)?;
                (summary, report)
            }
            Err(err) => {
                ui.restore()?;
                return Err(err);
            }
        }
    } else {
        execute(cli, &mut ConsoleUi::new())?
    };

    info!("{}", summary);
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    Ok(())
}

fn execute(cli: &Cli, ui: &mut impl Ui) -> Result<(String, VerificationReport)> {
    let start = Instant::now();
    let options = cli.import_options();

    let mut summary = String::new();
    if !cli.check {
        let imported = import_directory(&options, ui)?;
        summary = format!(
            "Created {:?} ({} rows in {} tables). ",
            options.output,
            imported.total_rows(),
            imported.tables.len()
        );
    }

    let manifest = options.directory.join(MANIFEST_FILE);
    let report = verify_database(&options.output, &manifest, ui)?;

    summary.push_str(&format!(
        "Verified {} manifest entries ({} mismatched, {} missing) in {:.1}s",
        report.checks.len(),
        report.mismatches().count(),
        report.missing_tables().count(),
        start.elapsed().as_secs_f64()
    ));

    Ok((summary, report))
}
