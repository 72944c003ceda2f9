use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use nullguard_core::{CompatibilityLevel, CompilationUnit};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "nullguard")]
#[command(about = "nullguard - lower compiler-inserted null assertions on IR receivers")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Lower nullability assertions in a .nir file, a directory of them, or a .json unit
    Lower {
        input: PathBuf,

        #[arg(short, long)]
        output: Option<PathBuf>,

        #[arg(long)]
        api_version: Option<CompatibilityLevel>,

        #[arg(long, value_enum)]
        policy: Option<Policy>,

        /// JSON compiler settings; flags given on the command line take precedence
        #[arg(long)]
        config: Option<PathBuf>,

        #[arg(long)]
        no_verify: bool,

        /// Write lowered units as JSON instead of text
        #[arg(long)]
        json: bool,

        #[arg(short, long)]
        verbose: bool,
    },

    Verify {
        input: PathBuf,

        #[arg(short, long)]
        verbose: bool,
    },

    /// Print a JSON unit in text form
    Dump { input: PathBuf },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Policy {
    VersionGated,
    DispatchOnly,
}

impl From<Policy> for nullguard_core::NullCheckPolicy {
    fn from(policy: Policy) -> Self {
        match policy {
            Policy::VersionGated => nullguard_core::NullCheckPolicy::VersionGated,
            Policy::DispatchOnly => nullguard_core::NullCheckPolicy::DispatchOnly,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Lower {
            input,
            output,
            api_version,
            policy,
            config,
            no_verify,
            json,
            verbose,
        } => cmd_lower(
            input,
            output,
            LowerOptions {
                api_version,
                policy,
                config,
                no_verify,
                json,
                verbose,
            },
        ),
        Commands::Verify { input, verbose } => cmd_verify(input, verbose),
        Commands::Dump { input } => cmd_dump(input),
    }
}

struct LowerOptions {
    api_version: Option<CompatibilityLevel>,
    policy: Option<Policy>,
    config: Option<PathBuf>,
    no_verify: bool,
    json: bool,
    verbose: bool,
}

fn load_units(input: &Path) -> Result<Vec<CompilationUnit>> {
    if input.is_dir() {
        let units = nullguard_parser::parse_dir(input)?;
        if units.is_empty() {
            bail!("No .nir files found under {}", input.display());
        }
        Ok(units)
    } else if input.extension().is_some_and(|ext| ext == "json") {
        Ok(vec![nullguard_core::ir_persist::load_unit(input)
            .with_context(|| format!("Failed to load {}", input.display()))?])
    } else {
        Ok(vec![nullguard_parser::parse_file(input)?])
    }
}

fn cmd_lower(input: PathBuf, output: Option<PathBuf>, options: LowerOptions) -> Result<()> {
    use colored::*;
    use nullguard_core::ir_persist::{changed_declarations, snapshot};
    use nullguard_core::{CompilationContext, CompilerSettings};
    use nullguard_lower::{pass_manager, ArgumentNullabilityAssertionsLowering, LOWERING_PHASES};
    use std::fs;
    use std::time::Instant;

    let mut settings = match &options.config {
        Some(path) => CompilerSettings::load(path)?,
        None => CompilerSettings::default(),
    };
    if let Some(level) = options.api_version {
        settings.api_version = level;
    }
    if let Some(policy) = options.policy {
        settings.null_check_policy = policy.into();
    }
    if options.no_verify {
        settings.verify_ir = false;
    }
    let context = CompilationContext::new(settings);

    if options.verbose {
        eprintln!("{}", " nullguard lower".bright_blue().bold());
        eprintln!("{}", "=".repeat(50).bright_blue());
        eprintln!(" Input: {}", input.display());
        if let Some(ref out) = output {
            eprintln!(" Output: {}", out.display());
        }
        eprintln!(" API version: {}", context.settings.api_version);
        eprintln!(" Policy: {}", context.settings.null_check_policy);
        eprintln!();
    }

    let start = Instant::now();
    let mut units = load_units(&input)?;

    for unit in &mut units {
        let before = snapshot(unit);

        if context.settings.dump_functions {
            for function in unit.functions().filter(|f| f.has_body()) {
                eprint!("{}", nullguard_core::format::format_function(function));
            }
        }

        let mut manager = pass_manager(LOWERING_PHASES, &context);
        manager
            .run_all(unit, &context)
            .with_context(|| format!("Lowering {} failed", unit.name))?;

        if options.verbose {
            let stats = manager
                .get_pass::<ArgumentNullabilityAssertionsLowering>()
                .map(|pass| pass.last_stats())
                .unwrap_or_default();
            let changed = changed_declarations(&before, &snapshot(unit));

            eprintln!("{}", format!(" Unit: {}", unit.name).bright_green().bold());
            eprintln!(
                "   Dispatch receivers: {} dropped, {} kept",
                stats.dispatch_dropped, stats.dispatch_kept
            );
            eprintln!(
                "   Extension receivers: {} dropped, {} kept",
                stats.extension_dropped, stats.extension_kept
            );
            eprintln!("   Changed declarations: {}", changed.len());
            for name in changed {
                eprintln!("     {}", name.bright_yellow());
            }
        }
    }

    let rendered = if options.json {
        match units.as_slice() {
            [unit] => serde_json::to_string_pretty(unit)?,
            units => serde_json::to_string_pretty(units)?,
        }
    } else {
        units
            .iter()
            .map(nullguard_core::format::format_unit)
            .collect::<Vec<_>>()
            .join("\n")
    };

    if let Some(output_path) = output {
        fs::write(&output_path, &rendered)?;
        if options.verbose {
            eprintln!(
                "\n {} Lowering successful!",
                "SUCCESS:".bright_green().bold()
            );
            eprintln!("   Time: {:.3}s", start.elapsed().as_secs_f64());
            eprintln!("   Output: {}", output_path.display());
        }
    } else {
        print!("{}", rendered);
    }

    Ok(())
}

fn cmd_verify(input: PathBuf, verbose: bool) -> Result<()> {
    use colored::*;
    use nullguard_core::verify::verify_unit;

    if verbose {
        println!("{}", " Verifying nullguard IR".bright_cyan().bold());
        println!("{}", "=".repeat(50).bright_cyan());
        println!(" Input: {}", input.display());
        println!();
    }

    let units = match load_units(&input) {
        Ok(units) => units,
        Err(e) => {
            println!("{}", " INVALID".bright_red().bold());
            println!("\n{}", "Parse Error:".bright_red());
            println!("{}", e);
            bail!("Verification failed");
        }
    };

    for unit in &units {
        if let Err(e) = verify_unit(unit) {
            println!("{}", " INVALID".bright_red().bold());
            println!("\n{}", format!("In unit {}:", unit.name).bright_red());
            println!("{}", e);
            bail!("Verification failed");
        }
    }

    println!("{}", " VALID".bright_green().bold());
    if verbose {
        for unit in &units {
            println!("   {}: {} declaration(s)", unit.name, unit.len());
        }
    }
    Ok(())
}

fn cmd_dump(input: PathBuf) -> Result<()> {
    let unit = nullguard_core::ir_persist::load_unit(&input)
        .with_context(|| format!("Failed to load {}", input.display()))?;
    print!("{}", nullguard_core::format::format_unit(&unit));
    Ok(())
}
