use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use folio_impose::sequence::{PageSequencer, RetentionPolicy};
use folio_impose::{AppendSpec, ImpositionOptions, InputSpec};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "folio", about = "Signature imposition for PDF documents", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Impose PDF pages for bookbinding
    Impose(ImposeArgs),
}

#[derive(Args)]
struct ImposeArgs {
    /// Input PDF file(s) - can specify multiple
    #[arg(short, long, num_args = 1..)]
    input: Vec<PathBuf>,

    /// Output PDF file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// JSON options file; command-line flags override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Imposition format
    #[arg(long, value_enum)]
    format: Option<FormatArg>,

    /// Maximum sheets per booklet signature
    #[arg(long)]
    sheets: Option<usize>,

    /// Print the first page on the left
    #[arg(long)]
    first_page_as_even: bool,

    /// Physical page index of a fold-out (repeatable)
    #[arg(long = "fold-out")]
    fold_outs: Vec<usize>,

    /// Start a new signature at this physical page index (repeatable)
    #[arg(long = "break")]
    breaks: Vec<usize>,

    /// PDF file(s) appended verbatim after the imposition
    #[arg(long)]
    append: Vec<PathBuf>,

    /// Load each document only while its pages are read
    #[arg(long)]
    open_on_demand: bool,

    /// Show statistics only, don't generate PDF
    #[arg(long)]
    stats_only: bool,
}

impl ImposeArgs {
    /// Layer the command-line flags over `options`
    fn apply(&self, options: &mut ImpositionOptions) {
        options
            .inputs
            .extend(self.input.iter().map(InputSpec::new));
        options
            .append
            .extend(self.append.iter().map(AppendSpec::new));
        if let Some(format) = self.format {
            options.format = format.into();
        }
        if let Some(sheets) = self.sheets {
            options.max_sheets_per_signature = sheets;
        }
        options.first_page_as_even |= self.first_page_as_even;
        options.fold_outs.extend(&self.fold_outs);
        options.signature_breaks.extend(&self.breaks);
        if self.open_on_demand {
            options.retention = RetentionPolicy::OpenOnDemand;
        }
        log::debug!(
            "{} input(s), {} appended, format {}",
            options.inputs.len(),
            options.append.len(),
            options.format
        );
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    In4h,
    In4v,
    In8h,
    In8v,
    In16h,
    In16v,
    Booklet,
    None,
}

impl From<FormatArg> for folio_impose::Format {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::In4h => Self::In4h,
            FormatArg::In4v => Self::In4v,
            FormatArg::In8h => Self::In8h,
            FormatArg::In8v => Self::In8v,
            FormatArg::In16h => Self::In16h,
            FormatArg::In16v => Self::In16v,
            FormatArg::Booklet => Self::Booklet,
            FormatArg::None => Self::None,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Impose(args) => {
            let mut options = match &args.config {
                Some(path) => {
                    log::info!("Reading options from {}", path.display());
                    ImpositionOptions::load(path)
                        .await
                        .with_context(|| format!("reading options from {}", path.display()))?
                }
                None => ImpositionOptions::default(),
            };
            args.apply(&mut options);
            options.validate()?;

            // Calculate and show statistics
            let stats_options = options.clone();
            let stats = tokio::task::spawn_blocking(move || {
                let (primary, append) = stats_options.source_ranges();
                let sequencer = PageSequencer::open(primary, append, stats_options.retention)?;
                folio_impose::calculate_statistics(&sequencer, &stats_options)
            })
            .await??;
            println!("Imposition Statistics:");
            println!("  Source pages: {}", stats.source_pages);
            println!("  Signatures: {}", stats.signatures);
            if !stats.sheets_per_signature.is_empty() {
                println!("  Sheets per signature: {:?}", stats.sheets_per_signature);
            }
            println!("  Output sheets: {}", stats.output_sheets);
            println!("  Out-of-sequence pages: {}", stats.out_of_sequence_pages);
            println!("  Appended pages: {}", stats.appended_pages);
            println!("  Output pages: {}", stats.output_pages);

            if args.stats_only {
                return Ok(());
            }
            let Some(output) = args.output else {
                bail!("an output file is required unless --stats-only is given");
            };

            log::info!("Imposing {} input(s) as {}", options.inputs.len(), options.format);
            let imposed = folio_impose::impose(&options).await?;
            folio_impose::save_pdf(imposed, &output).await?;
            println!("Imposed → {}", output.display());
        }
    }

    Ok(())
}
